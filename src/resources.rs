//! Downloadable-resource metadata.
//!
//! The admin console manages a persisted list of files offered behind the
//! gate. File bytes are stored base64-encoded alongside the metadata; two
//! demo entries are seeded on first read so the protected view is never
//! empty.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::store::{KeyValueStore, StoreError};

pub(crate) const RESOURCES_KEY: &str = "revenue_nomad_resources";

/// Recognized resource categories. Unrecognized uploads become `Other`
/// rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pdf,
    Csv,
    Excel,
    Other,
}

impl ResourceKind {
    /// Map a MIME type to a resource kind.
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type {
            "application/pdf" => ResourceKind::Pdf,
            "text/csv" => ResourceKind::Csv,
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                ResourceKind::Excel
            }
            _ => ResourceKind::Other,
        }
    }
}

/// Metadata for one downloadable resource. Never mutated in place; the
/// only operations are create and delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Human-readable size, e.g. "2.4 MB".
    pub size: String,
    /// Upload time, milliseconds since the Unix epoch.
    pub upload_date: u64,
    /// Base64-encoded file content, when captured.
    #[serde(rename = "dataUrl", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// An incoming file upload.
#[derive(Debug, Clone)]
pub struct ResourceUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Errors surfaced by the resource repository.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Persistence failed; quota violations land here. The stored list is
    /// left unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("resource list codec failed: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Persisted list of downloadable resources, most recent first.
#[derive(Clone)]
pub struct ResourceRepository {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ResourceRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    fn demo_seed(&self) -> Vec<Resource> {
        let now = self.clock.now_millis();
        vec![
            Resource {
                id: "default-1".into(),
                name: "2024_Industry_Analysis.pdf".into(),
                kind: ResourceKind::Pdf,
                size: "2.4 MB".into(),
                upload_date: now,
                content: Some("#".into()),
            },
            Resource {
                id: "default-2".into(),
                name: "Raw_Lead_Data.csv".into(),
                kind: ResourceKind::Csv,
                size: "856 KB".into(),
                upload_date: now,
                content: Some("#".into()),
            },
        ]
    }

    /// The stored resource list, seeding the demo entries on first read.
    pub fn list(&self) -> Result<Vec<Resource>, ResourceError> {
        match self.kv.get(RESOURCES_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => {
                let seed = self.demo_seed();
                self.persist(&seed)?;
                Ok(seed)
            }
        }
    }

    fn persist(&self, resources: &[Resource]) -> Result<(), ResourceError> {
        let raw = serde_json::to_string(resources)?;
        self.kv.set(RESOURCES_KEY, &raw)?;
        Ok(())
    }

    /// Store an upload at the head of the list and return its metadata.
    /// A quota failure surfaces as [`ResourceError::Store`] and leaves the
    /// stored list as it was.
    pub fn add(&self, upload: ResourceUpload) -> Result<Resource, ResourceError> {
        let resource = Resource {
            id: Uuid::new_v4().to_string(),
            kind: ResourceKind::from_content_type(&upload.content_type),
            size: format_bytes(upload.bytes.len()),
            upload_date: self.clock.now_millis(),
            content: Some(BASE64.encode(&upload.bytes)),
            name: upload.file_name,
        };

        let mut stored = self.list()?;
        stored.insert(0, resource.clone());
        self.persist(&stored)?;

        info!(
            resource_id = %resource.id,
            name = %resource.name,
            size = %resource.size,
            "resource_added"
        );
        Ok(resource)
    }

    /// Delete by id and return the remaining list. Deleting an unknown id
    /// is a no-op.
    pub fn delete(&self, id: &str) -> Result<Vec<Resource>, ResourceError> {
        let mut stored = self.list()?;
        stored.retain(|r| r.id != id);
        self.persist(&stored)?;
        Ok(stored)
    }
}

/// Render a byte count with binary units, trimming trailing zeros
/// ("2.4 MB", "856 KB", "0 Bytes").
pub fn format_bytes(bytes: usize) -> String {
    const SIZES: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let i = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let i = i.min(SIZES.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(i as i32);
    let mut formatted = format!("{value:.2}");
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }
    format!("{formatted} {}", SIZES[i])
}
