use crate::wow::SensorCategory;

/// A measurement role in the upload, independent of the sensor feeding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Temperature,
    Humidity,
    Pressure,
    Rain,
    RainDaily,
    WindSpeed,
    WindDirection,
    WindGust,
    DewPoint,
}

impl Slot {
    /// Every slot, in the order entries appear in an upload.
    pub const ALL: [Slot; 9] = [
        Slot::Temperature,
        Slot::Humidity,
        Slot::Pressure,
        Slot::Rain,
        Slot::RainDaily,
        Slot::WindSpeed,
        Slot::WindDirection,
        Slot::WindGust,
        Slot::DewPoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Temperature => "temperature",
            Slot::Humidity => "humidity",
            Slot::Pressure => "pressure",
            Slot::Rain => "rain",
            Slot::RainDaily => "rain_daily",
            Slot::WindSpeed => "wind_speed",
            Slot::WindDirection => "wind_dir",
            Slot::WindGust => "wind_gust",
            Slot::DewPoint => "dew_point",
        }
    }

    /// Query parameter name the ingestion API expects for this slot.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Slot::Temperature => "tempf",
            Slot::Humidity => "humidity",
            Slot::Pressure => "baromin",
            Slot::Rain => "rainin",
            Slot::RainDaily => "dailyrainin",
            Slot::WindSpeed => "windspeedmph",
            Slot::WindDirection => "winddir",
            Slot::WindGust => "windgustmph",
            Slot::DewPoint => "dewptf",
        }
    }

    pub fn category(&self) -> SensorCategory {
        match self {
            Slot::Temperature | Slot::DewPoint => SensorCategory::Temperature,
            Slot::Humidity => SensorCategory::Humidity,
            Slot::Pressure => SensorCategory::Pressure,
            Slot::Rain | Slot::RainDaily => SensorCategory::Rain,
            Slot::WindSpeed | Slot::WindGust => SensorCategory::WindSpeed,
            Slot::WindDirection => SensorCategory::WindDirection,
        }
    }
}
