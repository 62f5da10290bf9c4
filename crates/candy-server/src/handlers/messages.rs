// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Public message board.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use crate::error::{Result, ServerError};
use crate::persistence::MessageRecord;
use crate::state::SharedState;

use super::ApiJson;

const MAX_CONTENT_CHARS: usize = 1_000;
const MAX_AUTHOR_CHARS: usize = 100;
const DEFAULT_AUTHOR: &str = "Anonymous";

/// Body of `POST /messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMessageRequest {
    /// Message text.
    pub content: String,
    /// Display name; anonymous when missing.
    #[serde(default)]
    pub author: Option<String>,
}

impl CreateMessageRequest {
    fn validate(&self) -> Result<(&str, &str)> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ServerError::BadRequest("content must not be empty".to_string()));
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(ServerError::BadRequest(format!(
                "content must be at most {MAX_CONTENT_CHARS} characters"
            )));
        }

        let author = self
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_AUTHOR);
        if author.chars().count() > MAX_AUTHOR_CHARS {
            return Err(ServerError::BadRequest(format!(
                "author must be at most {MAX_AUTHOR_CHARS} characters"
            )));
        }
        Ok((content, author))
    }
}

/// `GET /messages`
pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<MessageRecord>>> {
    Ok(Json(state.persistence.list_messages().await?))
}

/// `POST /messages`
pub async fn create(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageRecord>)> {
    let (content, author) = body.validate()?;
    let record = state
        .persistence
        .insert_message(content, author, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str, author: Option<&str>) -> CreateMessageRequest {
        CreateMessageRequest {
            content: content.to_string(),
            author: author.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_trims_and_defaults_author() {
        let req = request("  hi there ", Some("   "));
        assert_eq!(req.validate().unwrap(), ("hi there", "Anonymous"));

        let req = request("hi", Some(" ada "));
        assert_eq!(req.validate().unwrap(), ("hi", "ada"));
    }

    #[test]
    fn test_validate_rejects_empty_and_long() {
        assert!(request("   ", None).validate().is_err());
        assert!(request(&"x".repeat(1_001), None).validate().is_err());
        assert!(request("ok", Some(&"y".repeat(101))).validate().is_err());
    }
}
