//! Core services for a token-gated lead-capture demo.
//!
//! A marketing landing page gates a protected resource behind a simulated
//! token flow: submitting the demo form captures a lead and mints a
//! 30-minute access token; a separate admin console manages captured leads
//! and uploaded resources. This crate implements everything beneath the
//! presentation layer:
//!
//! - [`store`] — the string key-value persistence boundary and the bundled
//!   in-memory implementation
//! - [`token`] — the (deliberately unsigned) base64/JSON access-token codec
//! - [`session`] — user-token and admin-identity state with lazy expiry
//! - [`admin`] — the seeded admin credential directory
//! - [`leads`] / [`resources`] — CRUD over the persisted lists
//! - [`nav`] — the navigation guard table and the protected-view expiry
//!   watch
//!
//! [`Gate`] stitches the services together over one store, one clock, and
//! one [`GateConfig`]:
//!
//! ```
//! use leadgate::{Gate, GateConfig, LeadForm, ViewState};
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() {
//! let gate = Gate::new(GateConfig::default().with_submit_delay(std::time::Duration::ZERO))
//!     .expect("default config is valid");
//!
//! let receipt = gate
//!     .leads
//!     .submit(LeadForm {
//!         full_name: "Jane Doe".into(),
//!         email: "jane@co.com".into(),
//!         company_name: "Co".into(),
//!         revenue_range: "$10k - $100k".into(),
//!         phone: String::new(),
//!         message: String::new(),
//!     })
//!     .await
//!     .expect("valid submission");
//! gate.session.save_user_token(&receipt.token).expect("store is writable");
//!
//! let mut controller = gate.controller();
//! assert_eq!(
//!     controller.request_view(ViewState::Protected).expect("store is readable"),
//!     ViewState::Protected
//! );
//! # }
//! ```

pub mod admin;
pub mod clock;
pub mod config;
pub mod error;
pub mod leads;
pub mod nav;
pub mod resources;
pub mod session;
pub mod store;
pub mod token;

pub use admin::AdminDirectory;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GateConfig};
pub use error::GateError;
pub use leads::{Lead, LeadError, LeadForm, LeadRepository, SubmissionReceipt, REVENUE_RANGES};
pub use nav::{AccessController, ExpiryWatch, ViewState};
pub use resources::{
    format_bytes, Resource, ResourceError, ResourceKind, ResourceRepository, ResourceUpload,
};
pub use session::SessionStore;
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use token::{TokenCodec, TokenError, TokenPayload};

use std::sync::Arc;

/// All gate services wired over a single store, clock, and configuration.
pub struct Gate {
    config: GateConfig,
    pub session: SessionStore,
    pub admins: AdminDirectory,
    pub leads: LeadRepository,
    pub resources: ResourceRepository,
}

impl Gate {
    /// Wire the services over the bundled in-memory store and the system
    /// clock.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        let kv: Arc<dyn KeyValueStore> = match config.store_capacity_bytes {
            Some(capacity) => Arc::new(MemoryStore::with_capacity_bytes(capacity)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store_and_clock(config, kv, Arc::new(SystemClock))
    }

    /// Wire the services over a caller-provided store, keeping the system
    /// clock.
    pub fn with_store(config: GateConfig, kv: Arc<dyn KeyValueStore>) -> Result<Self, ConfigError> {
        Self::with_store_and_clock(config, kv, Arc::new(SystemClock))
    }

    /// Fully explicit wiring; tests pass a [`ManualClock`] here to drive
    /// virtual time.
    pub fn with_store_and_clock(
        config: GateConfig,
        kv: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let codec = TokenCodec::new(config.token_ttl);
        let session = SessionStore::new(kv.clone(), codec, clock.clone());
        let admins = AdminDirectory::new(
            kv.clone(),
            config.default_admin_username.clone(),
            config.default_admin_password.clone(),
        );
        let leads = LeadRepository::new(kv.clone(), codec, clock.clone(), config.submit_delay);
        let resources = ResourceRepository::new(kv, clock);
        Ok(Self {
            config,
            session,
            admins,
            leads,
            resources,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// A fresh navigation controller bound to this gate's session.
    pub fn controller(&self) -> AccessController {
        AccessController::new(self.session.clone(), self.config.expiry_poll_interval)
    }

    /// Admin login against this gate's directory.
    pub fn login_admin(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        self.session.login_admin(&self.admins, username, password)
    }

    /// Change the password of the currently logged-in admin. Returns
    /// `false` when no admin is logged in.
    pub fn change_admin_password(&self, new_password: &str) -> Result<bool, StoreError> {
        match self.session.current_admin()? {
            Some(username) => self.admins.change_password(&username, new_password),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate() -> Gate {
        Gate::with_store_and_clock(
            GateConfig::default().with_submit_delay(Duration::ZERO),
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(0)),
        )
        .expect("default config is valid")
    }

    #[test]
    fn invalid_config_is_rejected_at_wiring() {
        let result = Gate::new(GateConfig::default().with_token_ttl(Duration::ZERO));
        assert!(result.is_err());
    }

    #[test]
    fn change_password_requires_a_logged_in_admin() {
        let gate = gate();
        assert!(!gate.change_admin_password("new-pass").unwrap());

        assert!(gate.login_admin("admin", "password").unwrap());
        assert!(gate.change_admin_password("new-pass").unwrap());

        gate.session.logout_admin().unwrap();
        assert!(!gate.login_admin("admin", "password").unwrap());
        assert!(gate.login_admin("admin", "new-pass").unwrap());
    }

    #[test]
    fn services_share_one_store() {
        let gate = gate();
        gate.admins.seed_if_empty().unwrap();

        // The session sees the admin the directory seeded.
        assert!(gate.login_admin("admin", "password").unwrap());
        assert_eq!(
            gate.session.current_admin().unwrap(),
            Some("admin".to_string())
        );
    }
}
