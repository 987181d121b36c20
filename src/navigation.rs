//! Redirect to the login route whenever the session is invalidated.
//!
//! DESIGN
//! ======
//! `SessionStore::logout` only mutates state and publishes
//! [`SessionEvent::Invalidated`]. This observer is the one place that turns
//! that event into navigation, so the data layer never depends on a router.
//! Each invalidation produces exactly one `navigate` call.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::session::{Session, SessionEvent, SessionStore};

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

/// Default route shown after the session is cleared.
pub const LOGIN_ROUTE: &str = "/login";

/// Performs a client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Listens for session invalidation and forwards it to a [`Navigator`].
pub struct NavigationObserver {
    events: broadcast::Receiver<SessionEvent>,
    /// Receivers do not keep the store alive, so `run` ends when it is dropped.
    state: watch::Receiver<Session>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl NavigationObserver {
    /// Subscribe to `session` now; events published before this call are not seen.
    #[must_use]
    pub fn new(session: &SessionStore, navigator: Arc<dyn Navigator>, login_route: impl Into<String>) -> Self {
        Self { events: session.events(), state: session.subscribe(), navigator, login_route: login_route.into() }
    }

    /// Run the observer on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drive the observer until the session's event channel closes.
    pub async fn run(mut self) {
        loop {
            match self.events.recv().await {
                Ok(SessionEvent::Invalidated { revision, reason }) => {
                    tracing::info!(revision, ?reason, route = %self.login_route, "redirecting after session invalidation");
                    self.navigator.navigate(&self.login_route);
                }
                Ok(SessionEvent::LoggedIn { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events may have included an invalidation.
                    tracing::warn!(skipped, "navigation observer lagged");
                    if !self.state.borrow().is_logged_in {
                        self.navigator.navigate(&self.login_route);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

/// Sets `window.location.href`, forcing a full page load of the route.
#[cfg(feature = "browser")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

#[cfg(feature = "browser")]
impl Navigator for BrowserNavigator {
    fn navigate(&self, route: &str) {
        let Some(window) = web_sys::window() else {
            tracing::warn!(route, "no window; cannot navigate");
            return;
        };
        if let Err(e) = window.location().set_href(route) {
            tracing::warn!(route, error = ?e, "navigation failed");
        }
    }
}
