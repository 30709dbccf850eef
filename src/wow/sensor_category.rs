/// Decides which conversion applies to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorCategory {
    Temperature,
    Humidity,
    Pressure,
    Rain,
    WindSpeed,
    WindDirection,
}

impl SensorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorCategory::Temperature => "temperature",
            SensorCategory::Humidity => "humidity",
            SensorCategory::Pressure => "pressure",
            SensorCategory::Rain => "rain",
            SensorCategory::WindSpeed => "wind_speed",
            SensorCategory::WindDirection => "wind_dir",
        }
    }
}
