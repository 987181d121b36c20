//! Request and response bodies exchanged with the backend.
//!
//! Response types keep unrecognized fields in `extra` so callers can reach
//! data the backend adds without a client release.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

// =============================================================================
// PAGINATION
// =============================================================================

/// One page of a backend listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { content: Vec::new(), total_elements: 0, total_pages: 0, number: 0, size: 0 }
    }
}

/// `page` / `size` query parameters. Pages are zero-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub user: LoginUser,
    pub access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginUser {
    pub id: i64,
    pub full_name: String,
}

// =============================================================================
// USERS
// =============================================================================

/// The caller's own profile as returned by `/users/me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Avatar URL, whichever field name the backend used.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        ["profileImageUrl", "avatarUrl", "imageUrl"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
    }
}

/// Editable profile fields; `None` fields are left out of the request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub exercise_name: Option<String>,
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_name: Option<String>,
    pub target_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub image_url: String,
}

// =============================================================================
// WORKOUTS
// =============================================================================

/// One exercise row of a post or routine. Numeric fields are `null` when unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetail {
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl ExerciseDetail {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// Trim names and drop rows whose name is blank.
pub(crate) fn clean_details(details: impl IntoIterator<Item = ExerciseDetail>) -> Vec<ExerciseDetail> {
    details
        .into_iter()
        .filter_map(|mut detail| {
            let trimmed = detail.name.trim();
            if trimmed.is_empty() {
                return None;
            }
            detail.name = trimmed.to_owned();
            Some(detail)
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub memo: String,
    pub category: String,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM:SS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub details: Vec<ExerciseDetail>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub details: Vec<ExerciseDetail>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    /// Comment text; older responses call it `content` or `body`.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.text.as_deref().or_else(|| {
            ["content", "body"]
                .iter()
                .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
        })
    }

    /// Display name of the author, from `author` or `authorName`.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.author
            .as_deref()
            .or_else(|| self.extra.get("authorName").and_then(Value::as_str))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: i64,
    #[serde(default)]
    pub routine_name: Option<String>,
    #[serde(default)]
    pub details: Vec<ExerciseDetail>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Routine {
    /// `routineName`, falling back to a plain `name` field.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.routine_name
            .as_deref()
            .or_else(|| self.extra.get("name").and_then(Value::as_str))
            .unwrap_or("routine")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineInput {
    pub routine_name: String,
    pub details: Vec<ExerciseDetail>,
}

impl RoutineInput {
    /// Build an update body; blank rows are dropped.
    #[must_use]
    pub fn new(routine_name: impl Into<String>, details: impl IntoIterator<Item = ExerciseDetail>) -> Self {
        Self { routine_name: routine_name.into(), details: clean_details(details) }
    }
}
