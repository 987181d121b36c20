//! Image upload.

use reqwest::multipart::{Form, Part};

use super::Api;
use super::types::ImageUpload;
use crate::gateway::GatewayError;

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

/// Upload context for images attached to a post.
pub const UPLOAD_CONTEXT_POST: &str = "post";

/// Upload context for profile avatars.
pub const UPLOAD_CONTEXT_PROFILE: &str = "profile";

impl Api {
    /// `POST /upload/image` as multipart with `file` and `context` fields.
    ///
    /// Returns the hosted URL; pass it to [`Api::set_profile_image`] or a
    /// new post to use it.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] from the request.
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        context: &str,
    ) -> Result<ImageUpload, GatewayError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_owned()))
            .text("context", context.to_owned());
        self.gateway
            .post_multipart("/upload/image", form)
            .await
    }
}
