//! Account endpoints and the session transitions they drive.

use reqwest::Method;

use super::Api;
use super::types::{LoginRequest, LoginResponse, RegisterRequest};
use crate::gateway::GatewayError;
use crate::session::{LogoutReason, UserSummary};

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

impl Api {
    /// Create an account via `POST /auth/register`. Does not log in.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), GatewayError> {
        let builder = self
            .gateway
            .request(Method::POST, "/auth/register")
            .json(request);
        self.gateway.send(builder).await?;
        Ok(())
    }

    /// Log in via `POST /auth/login` and store the returned identity and token.
    ///
    /// The backend returns `fullName`; it becomes the session nickname.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request, or [`GatewayError::Session`] if
    /// the new session could not be persisted (it is still active in memory).
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, GatewayError> {
        let response: LoginResponse = self
            .gateway
            .post_json("/auth/login", &LoginRequest { email, password })
            .await?;

        let user = UserSummary::new(response.user.id, response.user.full_name);
        self.session()
            .login(user.clone(), response.access_token)?;
        Ok(user)
    }

    /// Clear the local session. The backend keeps no session state to revoke.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Session`] if the cleared state could not be persisted.
    pub fn logout(&self) -> Result<(), GatewayError> {
        self.session().logout(LogoutReason::UserRequested)?;
        Ok(())
    }
}
