//! Workout posts and their comments.

use serde_json::json;

use super::Api;
use super::types::{Comment, NewPost, Page, PageRequest, Post, clean_details};
use crate::gateway::GatewayError;

#[cfg(test)]
#[path = "posts_test.rs"]
mod posts_test;

impl Api {
    /// `POST /posts`. Exercise rows with a blank name are dropped first.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        let body = NewPost { details: clean_details(post.details.iter().cloned()), ..post.clone() };
        self.gateway.post_json("/posts", &body).await
    }

    /// `GET /posts/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn post(&self, post_id: i64) -> Result<Post, GatewayError> {
        self.gateway
            .get_json(&format!("/posts/{post_id}"))
            .await
    }

    /// `GET /posts/user/{id}`; `total_elements` is the user's post count.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn posts_by_user(&self, user_id: i64, page: PageRequest) -> Result<Page<Post>, GatewayError> {
        self.gateway
            .get_json_with_query(&format!("/posts/user/{user_id}"), &page)
            .await
    }

    /// `GET /comments/posts/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn comments(&self, post_id: i64, page: PageRequest) -> Result<Page<Comment>, GatewayError> {
        self.gateway
            .get_json_with_query(&format!("/comments/posts/{post_id}"), &page)
            .await
    }

    /// `POST /comments/posts/{id}` with `{"text": ..}`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn add_comment(&self, post_id: i64, text: &str) -> Result<Comment, GatewayError> {
        self.gateway
            .post_json(&format!("/comments/posts/{post_id}"), &json!({ "text": text }))
            .await
    }

    /// `DELETE /comments/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), GatewayError> {
        self.gateway
            .delete(&format!("/comments/{comment_id}"))
            .await
    }
}
