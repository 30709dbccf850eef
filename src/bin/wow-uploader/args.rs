use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use wow_uploader::wow::{
    Config, Credentials, DEFAULT_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES,
    MIN_UPDATE_INTERVAL_MINUTES, SensorBindings, Slot, UpdateInterval,
};

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "WOW_SITE_ID")]
    pub site_id: String,

    #[arg(long, env = "WOW_AUTH_KEY", hide_env_values = true)]
    pub auth_key: String,

    /// Minutes between uploads.
    #[arg(
        long,
        env = "WOW_UPDATE_INTERVAL",
        default_value_t = DEFAULT_UPDATE_INTERVAL_MINUTES,
        value_parser = clap::value_parser!(u32)
            .range(i64::from(MIN_UPDATE_INTERVAL_MINUTES)..=i64::from(MAX_UPDATE_INTERVAL_MINUTES)),
    )]
    pub update_interval: u32,

    /// Log outgoing requests and expose the last one in the status.
    #[arg(long, env = "WOW_DEBUG")]
    pub debug: bool,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Where to write the status after every cycle, as JSON.
    #[arg(long, env = "WOW_STATUS_FILE")]
    pub status_file: Option<PathBuf>,

    #[arg(long, env = "WOW_SENSOR_TEMPERATURE")]
    pub sensor_temperature: Option<String>,

    #[arg(long, env = "WOW_SENSOR_HUMIDITY")]
    pub sensor_humidity: Option<String>,

    #[arg(long, env = "WOW_SENSOR_PRESSURE")]
    pub sensor_pressure: Option<String>,

    #[arg(long, env = "WOW_SENSOR_RAIN")]
    pub sensor_rain: Option<String>,

    #[arg(long, env = "WOW_SENSOR_RAIN_DAILY")]
    pub sensor_rain_daily: Option<String>,

    #[arg(long, env = "WOW_SENSOR_WIND_SPEED")]
    pub sensor_wind_speed: Option<String>,

    #[arg(long, env = "WOW_SENSOR_WIND_DIR")]
    pub sensor_wind_dir: Option<String>,

    #[arg(long, env = "WOW_SENSOR_WIND_GUST")]
    pub sensor_wind_gust: Option<String>,

    #[arg(long, env = "WOW_SENSOR_DEW_POINT")]
    pub sensor_dew_point: Option<String>,
}

impl Args {
    pub fn bindings(&self) -> SensorBindings {
        let mut bindings = SensorBindings::new();
        for slot in Slot::ALL {
            if let Some(entity_id) = self.sensor(slot) {
                bindings.bind(slot, entity_id);
            }
        }

        bindings
    }

    pub fn config(&self) -> Result<Config> {
        let interval =
            UpdateInterval::try_from(self.update_interval).context("invalid update interval")?;
        let credentials = Credentials::new(&self.site_id, &self.auth_key);

        Ok(Config::new(credentials, self.bindings())
            .context("invalid site configuration")?
            .with_interval(interval)
            .with_debug_mode(self.debug))
    }

    fn sensor(&self, slot: Slot) -> Option<&str> {
        let entity_id = match slot {
            Slot::Temperature => &self.sensor_temperature,
            Slot::Humidity => &self.sensor_humidity,
            Slot::Pressure => &self.sensor_pressure,
            Slot::Rain => &self.sensor_rain,
            Slot::RainDaily => &self.sensor_rain_daily,
            Slot::WindSpeed => &self.sensor_wind_speed,
            Slot::WindDirection => &self.sensor_wind_dir,
            Slot::WindGust => &self.sensor_wind_gust,
            Slot::DewPoint => &self.sensor_dew_point,
        };

        entity_id.as_deref()
    }
}
