// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sync conflict policy.
//!
//! When a client pushes its document and the server already holds one, the
//! copy with more lifetime earnings wins. On a tie the stored copy wins if it
//! was saved after the client's game started. There are no vector clocks, so a
//! third concurrent writer can still be lost.

use serde_json::Value;

/// The fields of a raw document the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentMeta {
    /// `totalCandyEarned`, 0 when missing.
    pub total_candy_earned: f64,
    /// `startTime` in ms, 0 when missing.
    pub start_time: i64,
}

impl DocumentMeta {
    /// Read the policy fields from any JSON value. Missing or mistyped fields
    /// count as zero.
    pub fn from_document(doc: &Value) -> Self {
        let total_candy_earned = doc
            .get("totalCandyEarned")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        let start_time = doc
            .get("startTime")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(0);
        Self {
            total_candy_earned,
            start_time,
        }
    }
}

/// Which copy survives a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncWinner {
    /// The document the client sent.
    Client,
    /// The document already stored on the server.
    Server,
}

impl SyncWinner {
    /// True when the client must replace its copy with the server's.
    pub fn conflict_resolved(self) -> bool {
        self == SyncWinner::Server
    }
}

/// Decide between the client's document and the stored one.
///
/// `stored_last_saved` is the stored row's save time in ms.
pub fn resolve_conflict(client: &Value, stored: &Value, stored_last_saved: i64) -> SyncWinner {
    let client = DocumentMeta::from_document(client);
    let stored = DocumentMeta::from_document(stored);

    if client.total_candy_earned > stored.total_candy_earned {
        SyncWinner::Client
    } else if stored.total_candy_earned > client.total_candy_earned {
        SyncWinner::Server
    } else if stored_last_saved > client.start_time {
        SyncWinner::Server
    } else {
        SyncWinner::Client
    }
}
