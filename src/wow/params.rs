use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use url::{Url, form_urlencoded};

use crate::wow::{Credentials, Observation};

pub const SITE_ID_PARAM: &str = "siteid";
pub const AUTH_KEY_PARAM: &str = "siteAuthenticationKey";
pub const DATE_PARAM: &str = "dateutc";
pub const SOFTWARE_TYPE_PARAM: &str = "softwaretype";

/// Replaces credentials in anything that gets logged.
pub const REDACTION_MASK: &str = "******";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exact query parameters of one upload request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams(IndexMap<&'static str, String>);

impl RequestParams {
    pub fn new(
        credentials: &Credentials,
        observation: &Observation,
        software_type: &str,
        at: DateTime<Utc>,
    ) -> Self {
        let mut params = IndexMap::with_capacity(4 + observation.len());
        params.insert(SITE_ID_PARAM, credentials.site_id().to_owned());
        params.insert(AUTH_KEY_PARAM, credentials.auth_key().to_owned());
        params.insert(DATE_PARAM, at.format(DATE_FORMAT).to_string());
        params.insert(SOFTWARE_TYPE_PARAM, software_type.to_owned());

        for (name, value) in observation.iter() {
            params.insert(name, format_value(value));
        }

        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with the site id and key replaced by [`REDACTION_MASK`].
    pub fn redacted(&self) -> Self {
        let mut params = self.0.clone();
        for name in [SITE_ID_PARAM, AUTH_KEY_PARAM] {
            if let Some(value) = params.get_mut(name) {
                *value = REDACTION_MASK.to_owned();
            }
        }

        Self(params)
    }

    /// Everything except the site id and key.
    pub fn without_credentials(&self) -> IndexMap<String, String> {
        self.0
            .iter()
            .filter(|(name, _)| !matches!(**name, SITE_ID_PARAM | AUTH_KEY_PARAM))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Form-encoded query string, with spaces as `%20`.
    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.set_query(Some(&self.to_query()));
        url
    }
}

impl fmt::Display for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

fn encode(s: &str) -> String {
    // byte_serialize escapes literal '+' as %2B, so any '+' left is a space.
    form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
