// --- File: crates/studyplan_gcal/src/auth.rs ---
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use std::path::Path;
use studyplan_common::{config_error, Context, StudyplanError};
use studyplan_config::GcalConfig;
use tracing::info;

type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds a calendar hub authenticated with the service account key at
/// `gcal.key_path`.
pub async fn create_calendar_hub(config: &GcalConfig) -> Result<HubType, StudyplanError> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or_else(|| config_error("gcal.key_path is required for the google provider"))?;

    let sa_key = read_service_account_key(Path::new(key_path))
        .await
        .map_err(|e| config_error(format!("cannot read service account key {}: {}", key_path, e)))?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .context("building service account authenticator")?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .context("loading native TLS roots")?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    info!("Google Calendar hub ready (key {})", key_path);
    Ok(CalendarHub::new(client, auth))
}
