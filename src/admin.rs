//! Admin credential directory.
//!
//! Credentials live in the key-value store as an ordered JSON list. An
//! empty directory is seeded with a single default account on first access,
//! so the admin console is reachable out of the box.
//!
//! The original demo kept plaintext passwords; this implementation stores
//! salted SHA-256 records instead. The external contract is unchanged:
//! `verify_credentials` answers a plain yes/no, and the seed account still
//! logs in with the configured default password.

use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::store::{KeyValueStore, StoreError};

pub(crate) const ADMIN_USERS_KEY: &str = "revenue_nomad_admin_users";

/// One stored credential record. No plaintext password is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct AdminRecord {
    username: String,
    /// Hex-encoded random salt.
    salt: String,
    /// Hex-encoded SHA-256 of `salt_bytes || password_bytes`.
    password_hash: String,
}

impl AdminRecord {
    fn new(username: &str, password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            username: username.to_string(),
            salt: hex::encode(salt),
            password_hash: hash_password(&salt, password),
        }
    }

    fn matches_password(&self, password: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt) else {
            return false;
        };
        hash_password(&salt, password) == self.password_hash
    }
}

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Manages the set of admin accounts.
///
/// Usernames are unique (case-sensitive) and accounts are never deleted;
/// the only mutation after creation is a password change.
#[derive(Clone)]
pub struct AdminDirectory {
    kv: Arc<dyn KeyValueStore>,
    seed_username: String,
    seed_password: String,
}

impl AdminDirectory {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        seed_username: impl Into<String>,
        seed_password: impl Into<String>,
    ) -> Self {
        Self {
            kv,
            seed_username: seed_username.into(),
            seed_password: seed_password.into(),
        }
    }

    /// Seed the default account if the directory is absent or empty.
    /// Idempotent; every read path calls this.
    pub fn seed_if_empty(&self) -> Result<(), StoreError> {
        let _ = self.load()?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<AdminRecord>, StoreError> {
        if let Some(raw) = self.kv.get(ADMIN_USERS_KEY)? {
            let records: Vec<AdminRecord> = serde_json::from_str(&raw)
                .map_err(|err| StoreError::backend(format!("corrupt admin directory: {err}")))?;
            if !records.is_empty() {
                return Ok(records);
            }
        }
        let seeded = vec![AdminRecord::new(&self.seed_username, &self.seed_password)];
        self.persist(&seeded)?;
        info!(username = %self.seed_username, "admin_directory_seeded");
        Ok(seeded)
    }

    fn persist(&self, records: &[AdminRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)
            .map_err(|err| StoreError::backend(format!("admin directory encode: {err}")))?;
        self.kv.set(ADMIN_USERS_KEY, &raw)
    }

    /// Check a username/password pair against the directory.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let records = self.load()?;
        Ok(records
            .iter()
            .any(|r| r.username == username && r.matches_password(password)))
    }

    /// Add a new account. Returns `false` (and changes nothing) when the
    /// username is already taken.
    pub fn create(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let mut records = self.load()?;
        if records.iter().any(|r| r.username == username) {
            return Ok(false);
        }
        records.push(AdminRecord::new(username, password));
        self.persist(&records)?;
        info!(%username, "admin_created");
        Ok(true)
    }

    /// Replace the password for `username`. Returns `false` when the
    /// username is unknown.
    pub fn change_password(&self, username: &str, new_password: &str) -> Result<bool, StoreError> {
        let mut records = self.load()?;
        let Some(record) = records.iter_mut().find(|r| r.username == username) else {
            return Ok(false);
        };
        *record = AdminRecord::new(username, new_password);
        self.persist(&records)?;
        info!(%username, "admin_password_changed");
        Ok(true)
    }

    /// All usernames in insertion order.
    pub fn usernames(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.into_iter().map(|r| r.username).collect())
    }
}
