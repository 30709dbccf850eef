use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::wow::{RequestParams, UpdateInterval};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// No cycle has completed yet.
    #[default]
    Pending,
    Ok,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Ok => "ok",
            UploadStatus::Error => "error",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a status display shows after each cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: UploadStatus,

    pub last_upload: Option<DateTime<Utc>>,

    pub last_error: Option<String>,

    pub next_upload: DateTime<Utc>,

    pub upload_count: u64,

    pub debug_mode: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_data: Option<IndexMap<String, String>>,
}

/// Outcome bookkeeping across cycles.
///
/// `upload_count` and `last_upload` only move on success. `last_error` is
/// set by every failed cycle and cleared by every successful one.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    status: UploadStatus,

    last_upload: Option<DateTime<Utc>>,

    last_error: Option<String>,

    upload_count: u64,

    debug_mode: bool,

    last_sent: Option<RequestParams>,
}

impl UploadState {
    pub fn new(debug_mode: bool) -> Self {
        Self {
            debug_mode,
            ..Self::default()
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn last_upload(&self) -> Option<DateTime<Utc>> {
        self.last_upload
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }

    /// Keeps `params` for the status display. Ignored unless debug mode is on.
    pub fn remember_sent(&mut self, params: &RequestParams) {
        if self.debug_mode {
            self.last_sent = Some(params.clone());
        }
    }

    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.status = UploadStatus::Ok;
        self.last_upload = Some(at);
        self.last_error = None;
        self.upload_count += 1;
    }

    pub fn record_failure(&mut self, error: impl fmt::Display) {
        self.status = UploadStatus::Error;
        self.last_error = Some(error.to_string());
    }

    pub fn snapshot(&self, now: DateTime<Utc>, interval: UpdateInterval) -> StatusSnapshot {
        let last_sent_data = if self.debug_mode {
            self.last_sent.as_ref().map(RequestParams::without_credentials)
        } else {
            None
        };

        StatusSnapshot {
            status: self.status,
            last_upload: self.last_upload,
            last_error: self.last_error.clone(),
            next_upload: now + interval.as_time_delta(),
            upload_count: self.upload_count,
            debug_mode: self.debug_mode,
            last_sent_data,
        }
    }
}
