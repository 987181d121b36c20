//! Typed wrappers for the sweatlo REST endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every call goes through the shared [`Gateway`], so each one carries the
//! current bearer token and a `401` from any endpoint clears the session.
//! Paths here are relative to the configured base URL, which already ends in
//! `/api`.
//!
//! ERROR HANDLING
//! ==============
//! All wrappers return [`GatewayError`] unchanged; nothing is retried.

mod auth;
mod posts;
mod routines;
mod types;
mod upload;
mod users;

pub use types::{
    Comment, ExerciseDetail, Goal, ImageUpload, NewGoal, NewPost, Page, PageRequest, Post, Profile,
    ProfileSettings, RegisterRequest, Routine, RoutineInput,
};
pub use upload::{UPLOAD_CONTEXT_POST, UPLOAD_CONTEXT_PROFILE};

use crate::gateway::Gateway;
use crate::session::SessionStore;

/// Page size used when a single routine has to be found by scanning the list.
pub const ROUTINE_SEARCH_PAGE_SIZE: u32 = 1000;

/// Backend API bound to one gateway (and therefore one session).
#[derive(Clone, Debug)]
pub struct Api {
    gateway: Gateway,
}

impl Api {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }
}
