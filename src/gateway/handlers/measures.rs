use chrono::{DateTime, Duration, Utc};
use lambda_http::{Body, Request, RequestExt, Response};
use tracing::{info, warn};

use super::{authorize, json_response, query_param};
use crate::error::{ApiError, NotFoundError};
use telemetry_gateway::shared::validators::ValidationError;
use crate::platform::HistoryQuery;
use crate::state::AppState;
use telemetry_gateway::shared::transform::transform_history;
use telemetry_gateway::shared::validators::{parse_positive_seconds, parse_rfc3339};

/// Window length when `from` is omitted
const DEFAULT_FROM_SECONDS: i64 = 900;
/// Sampling interval when `frequency` is omitted
const DEFAULT_FREQUENCY_SECONDS: i64 = 300;

/// Build the history query from the request's query string
///
/// `from` counts seconds back from `to`, which defaults to now.
pub fn history_query(
    event: &Request,
    location_id: &str,
    now: DateTime<Utc>,
) -> Result<HistoryQuery, ApiError> {
    let from_seconds = match query_param(event, "from") {
        Some(raw) => parse_positive_seconds("from", &raw)?,
        None => DEFAULT_FROM_SECONDS,
    };

    let to = match query_param(event, "to") {
        Some(raw) => parse_rfc3339("to", &raw)?,
        None => now,
    };

    let frequency_seconds = match query_param(event, "frequency") {
        Some(raw) => parse_positive_seconds("frequency", &raw)?,
        None => DEFAULT_FREQUENCY_SECONDS,
    };

    let from = Duration::try_seconds(from_seconds)
        .and_then(|window| to.checked_sub_signed(window))
        .ok_or_else(|| ValidationError::new("from", "Window exceeds the supported time range"))?;

    Ok(HistoryQuery {
        location_id: location_id.to_string(),
        from,
        to,
        frequency_seconds,
    })
}

/// Handler for GET /locations/{location_id}/measures endpoint
///
/// # Query Parameters
/// * `asset_id` - Keep only this asset
/// * `circuit_id` - Keep only this circuit within each remaining asset
/// * `from` - Window length in seconds before `to` (default 900)
/// * `to` - RFC 3339 end of the window (default now)
/// * `frequency` - Sampling interval in seconds (default 300)
pub async fn get_measures(
    event: Request,
    state: &AppState,
    location_id: &str,
) -> Result<Response<Body>, ApiError> {
    let request_id = event.lambda_context().request_id.clone();

    info!(
        request_id = %request_id,
        location_id = %location_id,
        "Processing location history request"
    );

    authorize(&event, state)?;

    let query = history_query(&event, location_id, state.clock.now())?;
    let asset_id = query_param(&event, "asset_id");
    let circuit_id = query_param(&event, "circuit_id");

    info!(
        request_id = %request_id,
        from = %query.from,
        to = %query.to,
        frequency_seconds = query.frequency_seconds,
        "Parsed history window"
    );

    let raw = state.platform.get_location_property_history(&query).await?;
    let history = transform_history(&raw);

    if history.id.is_empty() {
        warn!(request_id = %request_id, location_id = %location_id, "Location not found");
        return Err(NotFoundError::LocationNotFound(location_id.to_string()).into());
    }

    let history = history.narrowed(asset_id.as_deref(), circuit_id.as_deref());

    info!(
        request_id = %request_id,
        location_id = %location_id,
        assets = history.assets.len(),
        circuits = history.circuit_count(),
        "Transformed location history"
    );

    json_response(200, &history, &request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::handlers::test_support::{body_json, get, state, NOW};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(NOW).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_history_query_defaults() {
        let query = history_query(&get("/", &[]), "icepark-001", now()).unwrap();

        assert_eq!(query.to, now());
        assert_eq!(query.from, now() - Duration::seconds(900));
        assert_eq!(query.frequency_seconds, 300);
        assert_eq!(query.location_id, "icepark-001");
    }

    #[test]
    fn test_history_query_explicit_window() {
        let request = get(
            "/",
            &[
                ("from", "3600"),
                ("to", "2024-01-15T12:00:00+02:00"),
                ("frequency", "600"),
            ],
        );
        let query = history_query(&request, "icepark-001", now()).unwrap();

        assert_eq!(query.to.to_rfc3339(), "2024-01-15T10:00:00+00:00");
        assert_eq!(query.from.to_rfc3339(), "2024-01-15T09:00:00+00:00");
        assert_eq!(query.frequency_seconds, 600);
    }

    #[test]
    fn test_history_query_rejects_invalid_parameters() {
        let cases = [
            ("from", "-60"),
            ("from", "a while"),
            ("to", "yesterday"),
            ("frequency", "0"),
            ("from", "9223372036854775807"),
            ("from", "100000000000000"),
        ];

        for (name, value) in cases {
            let result = history_query(&get("/", &[(name, value)]), "icepark-001", now());
            match result {
                Err(ApiError::Validation(ValidationError::InvalidValue { field, .. })) => {
                    assert_eq!(field, name)
                }
                other => panic!("Expected validation error for {}={}, got {:?}", name, value, other),
            }
        }
    }

    #[tokio::test]
    async fn test_get_measures_default_window() {
        let request = get("/locations/icepark-001/measures", &[]);
        let response = get_measures(request, &state(), "icepark-001").await.unwrap();

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        let grid = body["grid_power"].as_array().unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0]["timestamp"], "2024-01-15T10:15:00Z");
        assert_eq!(grid[3]["timestamp"], "2024-01-15T10:30:00Z");
        assert_eq!(grid[0]["quality"], "GOOD");
    }

    #[tokio::test]
    async fn test_get_measures_narrowed_to_asset() {
        let request = get("/locations/icepark-001/measures", &[("asset_id", "pv-001")]);
        let response = get_measures(request, &state(), "icepark-001").await.unwrap();

        let body = body_json(&response);
        let assets = body["assets"].as_array().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0]["id"], "pv-001");
        assert_eq!(assets[0]["power"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_get_measures_window_beyond_time_range() {
        let request = get(
            "/locations/icepark-001/measures",
            &[("from", "100000000000000")],
        );
        let result = get_measures(request, &state(), "icepark-001").await;

        match result {
            Err(err @ ApiError::Validation(_)) => {
                assert_eq!(err.to_http_response("test-request").status(), 400)
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_measures_unknown_location() {
        let request = get("/locations/nowhere/measures", &[]);
        let result = get_measures(request, &state(), "nowhere").await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
