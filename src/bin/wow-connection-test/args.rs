use clap::Parser;
use url::Url;
use wow_uploader::wow::WOW_API_URL;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "WOW_SITE_ID")]
    pub site_id: String,

    #[arg(long, env = "WOW_AUTH_KEY", hide_env_values = true)]
    pub auth_key: String,

    /// Ingestion endpoint to test against.
    #[arg(long, env = "WOW_ENDPOINT", default_value = WOW_API_URL)]
    pub endpoint: Url,
}
