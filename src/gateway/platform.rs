use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{error, info};

use super::error::PlatformError;
use telemetry_gateway::shared::activation::ActivationRecord;
use telemetry_gateway::shared::transform::{parse_response, RawObject};

/// Thing exposing the location services on the platform
const LOCATIONS_THING: &str = "Engie.Locations";

/// Parameters of a property history query
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub location_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Sampling interval in seconds
    pub frequency_seconds: i64,
}

/// Access to the industrial IoT platform
///
/// Location services return the platform's raw JSON object; shaping it into
/// the location model is left to the caller.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Topology of every location (`GetAllLocations`)
    async fn get_all_locations(&self) -> Result<RawObject, PlatformError>;

    /// Latest readings of one location (`GetLocationById`)
    async fn get_location_by_id(&self, location_id: &str) -> Result<RawObject, PlatformError>;

    /// Reading series of one location over a window (`GetLocationPropertyHistory`)
    async fn get_location_property_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<RawObject, PlatformError>;

    /// Write a single property of a thing, returning a confirmation message
    async fn set_property(
        &self,
        thing_id: &str,
        property: &str,
        value: &Value,
    ) -> Result<String, PlatformError>;

    /// Activations tracked by the platform
    async fn list_activations(&self) -> Result<Vec<ActivationRecord>, PlatformError> {
        Err(PlatformError::Unsupported("Activation listing"))
    }
}

/// Body shared by the location services
///
/// Asset and circuit names are left empty so the platform returns the whole
/// location; narrowing happens after the transform.
pub fn service_body(location_id: &str, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Value {
    let mut body = json!({
        "location_name": location_id,
        "asset_name": "",
        "circuit_name": "",
    });

    if let Some((from, to)) = window {
        body["from"] = json!(from.to_rfc3339_opts(SecondsFormat::Millis, true));
        body["to"] = json!(to.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    body
}

/// Confirmation returned after a successful property write
pub fn property_set_message(property: &str, value: &Value) -> String {
    match value {
        Value::String(text) => format!("Property {} set to {}", property, text),
        other => format!("Property {} set to {}", property, other),
    }
}

/// Live platform client speaking the ThingWorx REST API
#[derive(Debug, Clone)]
pub struct ThingworxClient {
    client: reqwest::Client,
    base_url: String,
    app_key: String,
}

impl ThingworxClient {
    pub fn new(base_url: &str, app_key: &str, timeout: Duration) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_key: app_key.to_string(),
        })
    }

    pub fn service_url(&self, service: &str) -> String {
        format!(
            "{}/Things/{}/Services/{}",
            self.base_url, LOCATIONS_THING, service
        )
    }

    pub fn property_url(&self, thing_id: &str, property: &str) -> String {
        format!("{}/Things/{}/Properties/{}", self.base_url, thing_id, property)
    }

    async fn call_service(&self, service: &str, body: &Value) -> Result<RawObject, PlatformError> {
        let url = self.service_url(service);

        info!(service = %service, "Calling platform service");

        let response = self
            .client
            .post(&url)
            .header("appKey", &self.app_key)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(service = %service, error = %e, "Platform request failed");
                PlatformError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(service = %service, status = status.as_u16(), "Platform service returned an error");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))?;

        info!(service = %service, status = status.as_u16(), "Platform service succeeded");

        Ok(parse_response(payload)?)
    }
}

#[async_trait]
impl PlatformClient for ThingworxClient {
    async fn get_all_locations(&self) -> Result<RawObject, PlatformError> {
        self.call_service("GetAllLocations", &json!({})).await
    }

    async fn get_location_by_id(&self, location_id: &str) -> Result<RawObject, PlatformError> {
        self.call_service("GetLocationById", &service_body(location_id, None))
            .await
    }

    async fn get_location_property_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<RawObject, PlatformError> {
        let body = service_body(&query.location_id, Some((query.from, query.to)));
        self.call_service("GetLocationPropertyHistory", &body).await
    }

    async fn set_property(
        &self,
        thing_id: &str,
        property: &str,
        value: &Value,
    ) -> Result<String, PlatformError> {
        let url = self.property_url(thing_id, property);

        let mut payload = serde_json::Map::new();
        payload.insert(property.to_string(), value.clone());

        info!(thing_id = %thing_id, property = %property, "Writing platform property");

        let response = self
            .client
            .put(&url)
            .header("appKey", &self.app_key)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(thing_id = %thing_id, property = %property, status = status.as_u16(), "Property write rejected");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(property_set_message(property, value))
    }
}
