mod config;
mod convert;
mod observation;
mod params;
mod sensor_category;
mod session;
mod slot;
mod tracker;
mod uploader;

pub use config::*;
pub use convert::*;
pub use observation::*;
pub use params::*;
pub use sensor_category::*;
pub use session::*;
pub use slot::*;
pub use tracker::*;
pub use uploader::*;

/// Ingestion endpoint of the Weather Observations Website.
pub const WOW_API_URL: &str = "http://wow.metoffice.gov.uk/automaticreading";

/// Value sent as `softwaretype` with every reading.
pub const SOFTWARE_TYPE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
