use std::fmt;
use std::time::Duration;

use anyhow::{Error, Result, bail};
use chrono::TimeDelta;

use crate::wow::{REDACTION_MASK, SensorBindings};

/// The API rejects stations that upload more often than this.
pub const MIN_UPDATE_INTERVAL_MINUTES: u32 = 10;
pub const MAX_UPDATE_INTERVAL_MINUTES: u32 = 60;
pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u32 = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    site_id: String,

    auth_key: String,
}

impl Credentials {
    pub fn new(site_id: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            auth_key: auth_key.into(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn auth_key(&self) -> &str {
        &self.auth_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("site_id", &self.site_id)
            .field("auth_key", &REDACTION_MASK)
            .finish()
    }
}

/// Minutes between uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateInterval(u32);

impl UpdateInterval {
    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.0))
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self(DEFAULT_UPDATE_INTERVAL_MINUTES)
    }
}

impl TryFrom<u32> for UpdateInterval {
    type Error = Error;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        if !(MIN_UPDATE_INTERVAL_MINUTES..=MAX_UPDATE_INTERVAL_MINUTES).contains(&minutes) {
            bail!(
                "update interval out of range: expected {MIN_UPDATE_INTERVAL_MINUTES}-{MAX_UPDATE_INTERVAL_MINUTES} minutes, got {minutes}"
            );
        }

        Ok(Self(minutes))
    }
}

/// Everything one upload site needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,

    pub interval: UpdateInterval,

    pub debug_mode: bool,

    pub bindings: SensorBindings,
}

impl Config {
    pub fn new(credentials: Credentials, bindings: SensorBindings) -> Result<Self> {
        if credentials.site_id().trim().is_empty() {
            bail!("site id must not be empty");
        }
        if credentials.auth_key().trim().is_empty() {
            bail!("authentication key must not be empty");
        }

        Ok(Self {
            credentials,
            interval: UpdateInterval::default(),
            debug_mode: false,
            bindings,
        })
    }

    pub fn with_interval(mut self, interval: UpdateInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }
}
