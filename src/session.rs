//! Session state over the key-value store.
//!
//! A session is two independent flags: the visitor's access token (created
//! by a lead submission) and the admin identity (created by an admin
//! login). A visitor may hold both, either, or neither.
//!
//! There is no background sweep for expired tokens. Expiry is lazy: the
//! next check that observes an expired or malformed token clears it.
//! Admin sessions have no expiry at all, by design.

use std::sync::Arc;

use tracing::debug;

use crate::admin::AdminDirectory;
use crate::clock::Clock;
use crate::store::{KeyValueStore, StoreError};
use crate::token::{TokenCodec, TokenPayload};

pub(crate) const USER_TOKEN_KEY: &str = "secure_magnet_token";
pub(crate) const ADMIN_SESSION_KEY: &str = "revenue_nomad_admin_session";

/// Explicit session object, injected into the controller and any caller
/// that needs to consult or mutate session state. All state lives in the
/// key-value store; clones observe the same session.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, codec: TokenCodec, clock: Arc<dyn Clock>) -> Self {
        Self { kv, codec, clock }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    // --- user token ---

    pub fn save_user_token(&self, token: &str) -> Result<(), StoreError> {
        self.kv.set(USER_TOKEN_KEY, token)
    }

    pub fn user_token(&self) -> Result<Option<String>, StoreError> {
        self.kv.get(USER_TOKEN_KEY)
    }

    pub fn clear_user_token(&self) -> Result<(), StoreError> {
        self.kv.remove(USER_TOKEN_KEY)
    }

    /// Whether the visitor currently holds a live token.
    ///
    /// A token that is missing, malformed, or past its expiry counts as
    /// unauthenticated; malformed and expired tokens are cleared on the
    /// spot so state self-heals on the next check.
    pub fn is_user_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.live_payload()?.is_some())
    }

    /// The decoded payload of the current token, for display.
    ///
    /// Applies the same lazy-clear policy as [`is_user_authenticated`]:
    /// an expired or malformed token yields `None` and is removed.
    ///
    /// [`is_user_authenticated`]: SessionStore::is_user_authenticated
    pub fn current_payload(&self) -> Result<Option<TokenPayload>, StoreError> {
        self.live_payload()
    }

    fn live_payload(&self) -> Result<Option<TokenPayload>, StoreError> {
        let Some(token) = self.user_token()? else {
            return Ok(None);
        };
        match self.codec.decode(&token) {
            Ok(payload) => {
                if self.codec.is_expired(&payload, self.clock.now_millis()) {
                    debug!(email = %payload.email, "user_token_expired_cleared");
                    self.clear_user_token()?;
                    Ok(None)
                } else {
                    Ok(Some(payload))
                }
            }
            Err(err) => {
                debug!(error = %err, "user_token_malformed_cleared");
                self.clear_user_token()?;
                Ok(None)
            }
        }
    }

    // --- admin identity ---

    /// Attempt an admin login. On a credential match the username becomes
    /// the current admin identity and `true` is returned; otherwise `false`
    /// with no state change. The caller should surface a generic "invalid
    /// credentials" message either way.
    pub fn login_admin(
        &self,
        directory: &AdminDirectory,
        username: &str,
        password: &str,
    ) -> Result<bool, StoreError> {
        if !directory.verify_credentials(username, password)? {
            debug!("admin_login_rejected");
            return Ok(false);
        }
        self.kv.set(ADMIN_SESSION_KEY, username)?;
        debug!(%username, "admin_login");
        Ok(true)
    }

    pub fn logout_admin(&self) -> Result<(), StoreError> {
        self.kv.remove(ADMIN_SESSION_KEY)
    }

    /// Presence check only; admin sessions never expire.
    pub fn is_admin_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.current_admin()?.is_some())
    }

    pub fn current_admin(&self) -> Result<Option<String>, StoreError> {
        self.kv.get(ADMIN_SESSION_KEY)
    }
}
