//! Profile, goal and follow endpoints.

use reqwest::Method;
use serde_json::json;

use super::Api;
use super::types::{Goal, NewGoal, Profile, ProfileSettings};
use crate::gateway::GatewayError;

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;

impl Api {
    /// `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn me(&self) -> Result<Profile, GatewayError> {
        self.gateway.get_json("/users/me").await
    }

    /// `PUT /users/profile/setting`, then refresh the session nickname.
    ///
    /// The session keeps its current token; only the nickname changes. When
    /// the caller is logged out the session is left alone.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request, or [`GatewayError::Session`]
    /// if the refreshed session could not be persisted.
    pub async fn update_profile(&self, settings: &ProfileSettings) -> Result<Profile, GatewayError> {
        let profile: Profile = self
            .gateway
            .put_json("/users/profile/setting", settings)
            .await?;

        let current = self.session().snapshot();
        if let (true, Some(mut user), Some(token)) = (current.is_logged_in, current.user, current.access_token) {
            if let Some(nickname) = &profile.nickname {
                user.nickname.clone_from(nickname);
            }
            self.session().login(user, token)?;
        }
        Ok(profile)
    }

    /// `GET /users/profile/goals`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn goals(&self) -> Result<Vec<Goal>, GatewayError> {
        self.gateway.get_json("/users/profile/goals").await
    }

    /// `POST /users/profile/goals`; returns the stored goal.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn add_goal(&self, goal: &NewGoal) -> Result<Goal, GatewayError> {
        self.gateway
            .post_json("/users/profile/goals", goal)
            .await
    }

    /// Point the profile at an already-uploaded image.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn set_profile_image(&self, image_url: &str) -> Result<(), GatewayError> {
        let builder = self
            .gateway
            .request(Method::PUT, "/users/profile/image")
            .json(&json!({ "imageUrl": image_url }));
        self.gateway.send(builder).await?;
        Ok(())
    }

    /// Follow `user_id`, or unfollow if already following.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn toggle_follow(&self, user_id: i64) -> Result<(), GatewayError> {
        self.gateway
            .post_empty(&format!("/follow/{user_id}"))
            .await
    }
}
