//! Saved workout routines.

use reqwest::Method;

use super::types::{Page, PageRequest, Routine, RoutineInput};
use super::{Api, ROUTINE_SEARCH_PAGE_SIZE};
use crate::gateway::GatewayError;

#[cfg(test)]
#[path = "routines_test.rs"]
mod routines_test;

impl Api {
    /// `GET /routine`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn routines(&self, page: PageRequest) -> Result<Page<Routine>, GatewayError> {
        self.gateway
            .get_json_with_query("/routine", &page)
            .await
    }

    /// Find one routine by id.
    ///
    /// The backend has no single-routine read, so this scans the first
    /// [`ROUTINE_SEARCH_PAGE_SIZE`] routines. `Ok(None)` when not found there.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the listing request.
    pub async fn routine(&self, routine_id: i64) -> Result<Option<Routine>, GatewayError> {
        let page = self
            .routines(PageRequest::new(0, ROUTINE_SEARCH_PAGE_SIZE))
            .await?;
        let found = page.content.into_iter().find(|r| r.id == routine_id);
        if found.is_none() {
            tracing::debug!(routine_id, scanned = page.size, "routine not in search page");
        }
        Ok(found)
    }

    /// `PUT /routine/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn update_routine(&self, routine_id: i64, input: &RoutineInput) -> Result<(), GatewayError> {
        let builder = self
            .gateway
            .request(Method::PUT, &format!("/routine/{routine_id}"))
            .json(input);
        self.gateway.send(builder).await?;
        Ok(())
    }
}
