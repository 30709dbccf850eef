use crate::wow::SensorCategory;

const HPA_TO_INHG: f64 = 0.02953;
const MM_TO_IN: f64 = 0.03937;
const MS_TO_MPH: f64 = 2.23694;
const KMH_TO_MPH: f64 = 0.621371;
const KNOTS_TO_MPH: f64 = 1.15078;

/// Converts `value`, reported in `unit`, into the unit the ingestion API
/// expects for `category`.
///
/// Unit strings are matched case-insensitively after trimming. A missing or
/// unrecognized unit falls back to the metric unit of the category: °C, hPa,
/// mm and m/s.
pub fn convert(value: f64, category: SensorCategory, unit: Option<&str>) -> f64 {
    let unit = unit.unwrap_or_default().trim().to_lowercase();

    match category {
        SensorCategory::Temperature => convert_temperature(value, &unit),
        SensorCategory::Humidity => value,
        SensorCategory::Pressure => convert_pressure(value, &unit),
        SensorCategory::Rain => convert_rain(value, &unit),
        SensorCategory::WindSpeed => convert_wind_speed(value, &unit),
        SensorCategory::WindDirection => value,
    }
}

/// Rounds to two decimal places from the exact binary value, so 2.675
/// (stored as 2.67499...) becomes 2.67. Exact ties go to the even digit.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

fn convert_temperature(value: f64, unit: &str) -> f64 {
    match unit {
        "°f" | "f" | "fahrenheit" => value,
        _ => celsius_to_fahrenheit(value),
    }
}

fn convert_pressure(value: f64, unit: &str) -> f64 {
    match unit {
        "inhg" | "in" => value,
        "mmhg" => value * MM_TO_IN,
        "pa" => hpa_to_inhg(value / 100.0),
        _ => hpa_to_inhg(value),
    }
}

fn convert_rain(value: f64, unit: &str) -> f64 {
    match unit {
        "in" | "inch" | "inches" => value,
        "cm" => mm_to_in(value * 10.0),
        _ => mm_to_in(value),
    }
}

fn convert_wind_speed(value: f64, unit: &str) -> f64 {
    match unit {
        "km/h" | "kmh" | "kph" => value * KMH_TO_MPH,
        "mph" => value,
        "kn" | "kt" | "knots" => value * KNOTS_TO_MPH,
        _ => value * MS_TO_MPH,
    }
}

fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * HPA_TO_INHG
}

fn mm_to_in(mm: f64) -> f64 {
    mm * MM_TO_IN
}
