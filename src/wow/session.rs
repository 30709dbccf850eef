use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::wow::{
    Config, SOFTWARE_TYPE, StateLookup, StatusSnapshot, Transport, UploadError, UploadState,
    Uploader, collect,
};

/// One configured upload site: its settings, uploader and upload history.
///
/// A cycle is driven from outside via [`Session::run_cycle`]. Cycles take
/// `&mut self`, so they can never overlap.
#[derive(Debug)]
pub struct Session<T> {
    config: Config,

    uploader: Uploader<T>,

    state: UploadState,

    clock: fn() -> DateTime<Utc>,
}

impl<T: Transport> Session<T> {
    pub fn new(config: Config, uploader: Uploader<T>) -> Self {
        let uploader = uploader.with_debug_mode(config.debug_mode);
        let state = UploadState::new(config.debug_mode);

        Self {
            config,
            uploader,
            state,
            clock: Utc::now,
        }
    }

    /// Replaces the clock that stamps `last_upload` once a reading is accepted.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> StatusSnapshot {
        self.state.snapshot(now, self.config.interval)
    }

    pub async fn run_cycle(&mut self, states: &impl StateLookup) -> StatusSnapshot {
        self.run_cycle_at(states, Utc::now()).await
    }

    /// Collects and uploads a reading timestamped `now`, then records the
    /// outcome. A success is stamped with the clock after the reply arrives.
    ///
    /// The tracker is only touched once the upload has returned, so dropping
    /// this future mid-request leaves the state as it was.
    pub async fn run_cycle_at(
        &mut self,
        states: &impl StateLookup,
        now: DateTime<Utc>,
    ) -> StatusSnapshot {
        match self.upload(states, now).await {
            Ok(()) => {
                self.state.record_success((self.clock)());
                info!(
                    upload_count = self.state.upload_count(),
                    "uploaded weather observation"
                );
            }
            Err(UploadError::NoData) => {
                warn!("no sensor data available to upload");
                self.state.record_failure(UploadError::NoData);
            }
            Err(err) => {
                error!(error = %err, "failed to upload weather observation");
                self.state.record_failure(err);
            }
        }

        self.snapshot(now)
    }

    /// Records a cycle that failed before it could reach the uploader, such
    /// as the state store being unreachable.
    pub fn fail_cycle(&mut self, error: impl fmt::Display, now: DateTime<Utc>) -> StatusSnapshot {
        let err = UploadError::Unexpected(error.to_string());
        error!(error = %err, "upload cycle failed");
        self.state.record_failure(err);

        self.snapshot(now)
    }

    async fn upload(
        &mut self,
        states: &impl StateLookup,
        now: DateTime<Utc>,
    ) -> Result<(), UploadError> {
        let observation = collect(&self.config.bindings, states);
        let params =
            self.uploader
                .prepare(&self.config.credentials, &observation, SOFTWARE_TYPE, now)?;

        let result = self.uploader.send(&params).await;
        self.state.remember_sent(&params);

        result
    }
}
