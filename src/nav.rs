//! Navigation guards and the expiry watch.
//!
//! [`AccessController`] is the single source of navigation truth: every
//! view change goes through [`request_view`], which applies the guard
//! table synchronously. A session that expired while the visitor idled on
//! an unguarded view is therefore caught the moment they next try to enter
//! a guarded one.
//!
//! While the protected view is active the controller additionally runs an
//! [`ExpiryWatch`]: a repeating task that re-validates the user session on
//! a fixed interval and publishes a notification on its first failed
//! check. The watch is owned by the protected activation — any navigation
//! away aborts it, so a stale timer can never fire a redirect from an
//! unrelated view.
//!
//! [`request_view`]: AccessController::request_view

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::session::SessionStore;
use crate::store::StoreError;

/// The navigable views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    Landing,
    DemoForm,
    Protected,
    AdminLogin,
    AdminDashboard,
}

/// Repeating session re-check scoped to one protected-view activation.
///
/// Aborted on cancel and on drop; abort is idempotent, so forced
/// navigation paths can cancel unconditionally.
pub struct ExpiryWatch {
    handle: JoinHandle<()>,
    expired: watch::Receiver<bool>,
}

impl ExpiryWatch {
    /// Spawn the watch. Must be called within a tokio runtime.
    pub fn spawn(session: SessionStore, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately;
            // consume it so checks start one full interval in.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // A storage failure counts as "not authenticated": the
                // safe direction for a gate.
                let live = session.is_user_authenticated().unwrap_or(false);
                if !live {
                    info!("protected_session_expired");
                    let _ = tx.send(true);
                    break;
                }
            }
        });
        Self {
            handle,
            expired: rx,
        }
    }

    /// A receiver that flips to `true` once, when the session fails its
    /// periodic re-check. The caller should then force-navigate via
    /// [`AccessController::handle_expiry`].
    pub fn expired(&self) -> watch::Receiver<bool> {
        self.expired.clone()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Navigation state machine over the session guards.
///
/// Initial view is [`ViewState::Landing`]. The machine is cyclic: any view
/// is reachable from any view, subject to the guards.
pub struct AccessController {
    session: SessionStore,
    poll_interval: Duration,
    current: ViewState,
    guard: Option<ExpiryWatch>,
}

impl AccessController {
    pub fn new(session: SessionStore, poll_interval: Duration) -> Self {
        Self {
            session,
            poll_interval,
            current: ViewState::Landing,
            guard: None,
        }
    }

    pub fn current_view(&self) -> ViewState {
        self.current
    }

    /// Request a navigation to `target` and return the view actually
    /// reached:
    ///
    /// | target | guard | redirect |
    /// |---|---|---|
    /// | `Protected` | user token live | `DemoForm` |
    /// | `AdminDashboard` | admin identity present | `AdminLogin` |
    /// | anything else | — | granted unconditionally |
    ///
    /// Entering `Protected` starts the expiry watch; reaching any other
    /// view (redirects included) cancels it. At most one watch exists at
    /// a time.
    pub fn request_view(&mut self, target: ViewState) -> Result<ViewState, StoreError> {
        let actual = match target {
            ViewState::Protected => {
                if self.session.is_user_authenticated()? {
                    ViewState::Protected
                } else {
                    debug!("navigation_redirected_to_demo_form");
                    ViewState::DemoForm
                }
            }
            ViewState::AdminDashboard => {
                if self.session.is_admin_authenticated()? {
                    ViewState::AdminDashboard
                } else {
                    debug!("navigation_redirected_to_admin_login");
                    ViewState::AdminLogin
                }
            }
            other => other,
        };

        // Dropping the previous watch aborts it, covering both re-entry
        // into Protected and every way of leaving it.
        self.guard = None;
        if actual == ViewState::Protected {
            self.guard = Some(ExpiryWatch::spawn(
                self.session.clone(),
                self.poll_interval,
            ));
        }

        self.current = actual;
        Ok(actual)
    }

    /// Receiver for the active watch's expiry signal, when the protected
    /// view is the current view.
    pub fn expiry_signal(&self) -> Option<watch::Receiver<bool>> {
        self.guard.as_ref().map(ExpiryWatch::expired)
    }

    /// React to an expiry notification: clear the token and force-navigate
    /// to the demo form.
    pub fn handle_expiry(&mut self) -> Result<ViewState, StoreError> {
        self.session.clear_user_token()?;
        self.request_view(ViewState::DemoForm)
    }
}
