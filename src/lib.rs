//! # sweatlo
//!
//! Client core for the sweatlo workout-logging service: the session store,
//! the authorized request gateway every REST call goes through, and typed
//! wrappers for the backend endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends (the wasm UI behind the `browser` feature, the `sweatlo` CLI)
//! build one [`SessionStore`], hand it to one [`Gateway`], and talk to the
//! backend through [`api::Api`]. A [`NavigationObserver`] turns session
//! invalidation into a redirect to the login route.

pub mod api;
pub mod config;
pub mod gateway;
pub mod navigation;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{ClientConfig, ConfigError};
pub use gateway::{Gateway, GatewayError};
pub use navigation::{LOGIN_ROUTE, NavigationObserver, Navigator};
pub use session::{LogoutReason, Session, SessionEvent, SessionStore, UserSummary};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};

#[cfg(feature = "browser")]
pub use navigation::BrowserNavigator;
#[cfg(feature = "browser")]
pub use storage::BrowserStorage;
