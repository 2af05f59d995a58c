//! Lead capture.
//!
//! Submitting the demo form is the product's central transaction: it
//! validates the form, persists the lead, and mints the access token that
//! unlocks the protected resource. Submission is the **only** path that
//! creates a user session token — there is no separate sign-up or login
//! for visitors.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::store::{KeyValueStore, StoreError};
use crate::token::TokenCodec;

pub(crate) const LEADS_KEY: &str = "revenue_nomad_leads";

/// Revenue-range options offered by the demo form.
pub const REVENUE_RANGES: [&str; 6] = [
    "Pre-revenue",
    "$0 - $10k",
    "$10k - $100k",
    "$100k - $1M",
    "$1M - $10M",
    "$10M+",
];

/// What the visitor types into the demo form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub revenue_range: String,
    pub phone: String,
    pub message: String,
}

/// A captured lead. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    #[serde(flatten)]
    pub form: LeadForm,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Returned to the caller on a successful submission. The token grants
/// access to the protected resource; storing it in the session is the
/// caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub lead: Lead,
    pub token: String,
    pub message: String,
}

/// Errors surfaced by lead submission.
#[derive(Debug, Error)]
pub enum LeadError {
    /// The email failed the demo's validation rule (no `@`). Nothing was
    /// persisted and no token was issued.
    #[error("invalid email address")]
    InvalidEmail,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("lead list encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Appends submitted leads to a persisted most-recent-first list.
#[derive(Clone)]
pub struct LeadRepository {
    kv: Arc<dyn KeyValueStore>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    submit_delay: std::time::Duration,
}

impl LeadRepository {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        codec: TokenCodec,
        clock: Arc<dyn Clock>,
        submit_delay: std::time::Duration,
    ) -> Self {
        Self {
            kv,
            codec,
            clock,
            submit_delay,
        }
    }

    /// Submit a lead: simulated network latency, then validate, persist,
    /// and mint an access token for the submitted email.
    pub async fn submit(&self, form: LeadForm) -> Result<SubmissionReceipt, LeadError> {
        let start = Instant::now();
        tokio::time::sleep(self.submit_delay).await;

        if !form.email.contains('@') {
            warn!(elapsed_ms = start.elapsed().as_millis() as u64, "lead_rejected_invalid_email");
            return Err(LeadError::InvalidEmail);
        }

        let lead = Lead {
            id: Uuid::new_v4(),
            timestamp: self.clock.now_millis(),
            form,
        };

        let mut stored = self.leads();
        stored.insert(0, lead.clone());
        self.kv.set(LEADS_KEY, &serde_json::to_string(&stored)?)?;

        let token = self.codec.issue(&lead.form.email, lead.timestamp);
        info!(
            lead_id = %lead.id,
            email = %lead.form.email,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "lead_captured"
        );

        Ok(SubmissionReceipt {
            lead,
            token,
            message: "Lead captured successfully".to_string(),
        })
    }

    /// All captured leads, most recent first. A missing or corrupt stored
    /// list degrades to empty rather than failing the read.
    pub fn leads(&self) -> Vec<Lead> {
        match self.kv.get(LEADS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}
