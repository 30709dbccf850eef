use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone as _, Utc};
use url::Url;
use wow_uploader::wow::{
    Config, Credentials, Observation, SensorBindings, SensorState, Session, Slot, Transport,
    TransportError, TransportResponse, UpdateInterval, UploadError, UploadStatus, Uploader,
};

const SITE_ID: &str = "site-8765";
const AUTH_KEY: &str = "very-secret-key";

/// Answers every request with a fixed result and remembers the URLs.
#[derive(Clone)]
struct FakeTransport {
    response: Arc<Mutex<Result<TransportResponse, TransportError>>>,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl FakeTransport {
    fn status(status: u16, body: &str) -> Self {
        Self::new(Ok(TransportResponse {
            status,
            body: body.into(),
        }))
    }

    fn new(response: Result<TransportResponse, TransportError>) -> Self {
        Self {
            response: Arc::new(Mutex::new(response)),
            requests: Arc::default(),
        }
    }

    fn respond_with(&self, status: u16, body: &str) {
        *self.response.lock().unwrap() = Ok(TransportResponse {
            status,
            body: body.into(),
        });
    }

    fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    async fn get(&self, url: Url) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(url);
        self.response.lock().unwrap().clone()
    }
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, minute, 0).unwrap()
}

/// When the fake server answers a cycle started at `at(0)`.
fn replied() -> DateTime<Utc> {
    at(0) + TimeDelta::seconds(2)
}

fn config(debug_mode: bool) -> Config {
    let bindings = SensorBindings::new()
        .with(Slot::Temperature, "sensor.garden_temperature")
        .with(Slot::Pressure, "sensor.garden_pressure")
        .with(Slot::Humidity, "sensor.garden_humidity");

    Config::new(Credentials::new(SITE_ID, AUTH_KEY), bindings)
        .unwrap()
        .with_debug_mode(debug_mode)
}

fn session(transport: &FakeTransport, debug_mode: bool) -> Session<FakeTransport> {
    let endpoint = Url::parse("http://wow.test/automaticreading").unwrap();
    Session::new(
        config(debug_mode),
        Uploader::with_endpoint(transport.clone(), endpoint),
    )
    .with_clock(replied)
}

fn garden() -> HashMap<String, SensorState> {
    [
        ("sensor.garden_temperature", SensorState::new("20.0", Some("°C"))),
        ("sensor.garden_pressure", SensorState::new("1013.25", Some("hPa"))),
        ("sensor.garden_humidity", SensorState::new("unavailable", Some("%"))),
    ]
    .into_iter()
    .map(|(id, state)| (id.to_string(), state))
    .collect()
}

#[tokio::test]
async fn successful_cycle() {
    // ---
    // Arrange
    // ---
    let transport = FakeTransport::status(200, "");
    let mut session = session(&transport, false);
    assert_eq!(session.snapshot(at(0)).status, UploadStatus::Pending);

    // ---
    // Act
    // ---
    let snapshot = session.run_cycle_at(&garden(), at(0)).await;

    // ---
    // Assert
    // ---
    assert_eq!(snapshot.status, UploadStatus::Ok);
    assert_eq!(snapshot.upload_count, 1);
    assert_eq!(snapshot.last_error, None);
    assert_eq!(snapshot.last_upload, Some(replied()));
    assert_eq!(snapshot.next_upload, at(0) + TimeDelta::minutes(10));
    assert_eq!(snapshot.last_sent_data, None);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let query: HashMap<_, _> = requests[0].query_pairs().into_owned().collect();
    assert_eq!(query["siteid"], SITE_ID);
    assert_eq!(query["siteAuthenticationKey"], AUTH_KEY);
    assert_eq!(query["dateutc"], "2026-10-16 08:00:00");
    assert_eq!(query["tempf"], "68.0");
    assert_eq!(query["baromin"], "29.92");
    assert!(!query.contains_key("humidity"));
    assert!(query["softwaretype"].starts_with("wow-uploader/"));
    assert!(requests[0].as_str().contains("dateutc=2026-10-16%2008%3A00%3A00"));
}

#[tokio::test]
async fn rate_limited_cycle_keeps_count() {
    let transport = FakeTransport::status(200, "");
    let mut session = session(&transport, false);
    session.run_cycle_at(&garden(), at(0)).await;

    transport.respond_with(429, "Too Many Requests");
    let snapshot = session.run_cycle_at(&garden(), at(10)).await;

    assert_eq!(snapshot.status, UploadStatus::Error);
    assert_eq!(snapshot.last_error.as_deref(), Some("Rate limit exceeded (429)"));
    assert_eq!(snapshot.upload_count, 1);
    assert_eq!(snapshot.last_upload, Some(replied()));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn failed_cycles_leave_success_history_empty() {
    let transport = FakeTransport::status(429, "");
    let mut session = session(&transport, false);

    let first = session.run_cycle_at(&garden(), at(0)).await;
    assert_eq!(first.status, UploadStatus::Error);
    assert_eq!(first.upload_count, 0);

    let snapshot = session.run_cycle_at(&HashMap::new(), at(10)).await;

    assert_eq!(snapshot.status, UploadStatus::Error);
    assert_eq!(snapshot.last_error.as_deref(), Some("No sensor data available"));
    assert_eq!(snapshot.last_upload, None);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn count_only_moves_on_success() {
    let ok = FakeTransport::status(200, "");
    let mut session = session(&ok, false);

    session.run_cycle_at(&garden(), at(0)).await;
    session.run_cycle_at(&garden(), at(10)).await;
    let failed = session.fail_cycle("failed to fetch sensor states", at(20));

    assert_eq!(failed.status, UploadStatus::Error);
    assert_eq!(failed.upload_count, 2);
    assert_eq!(failed.last_upload, Some(replied()));
    assert_eq!(failed.last_error.as_deref(), Some("failed to fetch sensor states"));

    let recovered = session.run_cycle_at(&garden(), at(30)).await;
    assert_eq!(recovered.status, UploadStatus::Ok);
    assert_eq!(recovered.upload_count, 3);
    assert_eq!(recovered.last_error, None);
}

#[tokio::test]
async fn last_upload_is_stamped_when_the_server_answers() {
    let transport = FakeTransport::status(200, "");
    let mut session = session(&transport, false);

    let snapshot = session.run_cycle_at(&garden(), at(0)).await;

    let stamped = snapshot.last_upload.unwrap();
    assert_ne!(stamped, at(0));
    assert_eq!(stamped, replied());
    assert_eq!(session.state().last_upload(), Some(replied()));

    let query: HashMap<_, _> = transport.requests()[0].query_pairs().into_owned().collect();
    assert_eq!(query["dateutc"], "2026-10-16 08:00:00");
}

#[tokio::test]
async fn empty_observation_is_not_sent() {
    let transport = FakeTransport::status(200, "");
    let mut session = session(&transport, false);

    let snapshot = session.run_cycle_at(&HashMap::new(), at(0)).await;

    assert_eq!(snapshot.status, UploadStatus::Error);
    assert_eq!(snapshot.last_error.as_deref(), Some("No sensor data available"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn uploader_refuses_empty_observation() {
    let transport = FakeTransport::status(200, "");
    let uploader = Uploader::with_endpoint(transport.clone(), Url::parse("http://wow.test/").unwrap());

    let result = uploader
        .upload(&Credentials::new(SITE_ID, AUTH_KEY), &Observation::new(), "sw", at(0))
        .await;

    assert_eq!(result, Err(UploadError::NoData));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn server_error_reports_status_and_body() {
    let transport = FakeTransport::status(500, "boom");
    let mut session = session(&transport, false);

    let snapshot = session.run_cycle_at(&garden(), at(0)).await;

    assert_eq!(snapshot.status, UploadStatus::Error);
    assert_eq!(snapshot.last_error.as_deref(), Some("HTTP 500: boom"));
}

#[tokio::test]
async fn transport_failures_become_cycle_errors() {
    let cases = [
        (TransportError::Timeout, "Request timed out"),
        (
            TransportError::Connection("connection refused".into()),
            "Connection error: connection refused",
        ),
    ];

    for (error, message) in cases {
        let transport = FakeTransport::new(Err(error));
        let mut session = session(&transport, false);

        let snapshot = session.run_cycle_at(&garden(), at(0)).await;

        assert_eq!(snapshot.status, UploadStatus::Error);
        assert_eq!(snapshot.last_error.as_deref(), Some(message));
        assert_eq!(snapshot.upload_count, 0);
    }
}

#[tokio::test]
async fn debug_mode_exposes_sent_data_without_credentials() {
    let transport = FakeTransport::status(500, "boom");
    let mut session = session(&transport, true);

    let snapshot = session.run_cycle_at(&garden(), at(0)).await;

    assert!(snapshot.debug_mode);
    let sent = snapshot.last_sent_data.clone().unwrap();
    assert_eq!(sent.get("tempf").map(String::as_str), Some("68.0"));
    assert!(!sent.contains_key("siteid"));
    assert!(!sent.contains_key("siteAuthenticationKey"));

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(!json.contains(SITE_ID));
    assert!(!json.contains(AUTH_KEY));
}

#[tokio::test]
async fn connection_test_sends_metadata_only() {
    let transport = FakeTransport::status(200, "");
    let uploader = Uploader::with_endpoint(transport.clone(), Url::parse("http://wow.test/").unwrap());

    let result = uploader
        .test_connection(&Credentials::new(SITE_ID, AUTH_KEY), at(0))
        .await;

    assert_eq!(result, Ok(()));
    let requests = transport.requests();
    let names: Vec<_> = requests[0].query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(names, ["siteid", "siteAuthenticationKey", "dateutc", "softwaretype"]);
    assert!(requests[0]
        .query_pairs()
        .any(|(k, v)| k == "softwaretype" && v.ends_with("-test")));
}

#[tokio::test]
async fn connection_test_reports_rate_limit_with_body() {
    let transport = FakeTransport::status(429, "slow down");
    let uploader = Uploader::with_endpoint(transport, Url::parse("http://wow.test/").unwrap());

    let err = uploader
        .test_connection(&Credentials::new(SITE_ID, AUTH_KEY), at(0))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        UploadError::Http {
            status: 429,
            body: "slow down".into()
        }
    );
    assert_eq!(err.to_string(), "HTTP 429: slow down");
}

#[tokio::test]
async fn interval_drives_next_upload() {
    let transport = FakeTransport::status(200, "");
    let config = config(false).with_interval(UpdateInterval::try_from(45).unwrap());
    let mut session = Session::new(
        config,
        Uploader::with_endpoint(transport, Url::parse("http://wow.test/").unwrap()),
    );

    let snapshot = session.run_cycle_at(&garden(), at(0)).await;

    assert_eq!(snapshot.next_upload, at(45));
}
