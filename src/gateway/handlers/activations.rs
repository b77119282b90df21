use lambda_http::{Body, Request, RequestExt, Response};
use tracing::info;

use super::{authorize, json_response, parse_json_body, query_param};
use crate::error::{ApiError, ValidationError};
use crate::state::AppState;
use telemetry_gateway::shared::activation::{ActivationFilter, ActivationRequest, ActivationStatus};

/// Parse the `activation_status` comma list
fn parse_statuses(raw: &str) -> Result<Vec<ActivationStatus>, ValidationError> {
    raw.split(',')
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .map(|status| {
            ActivationStatus::parse(status).ok_or_else(|| ValidationError::InvalidValue {
                field: "activation_status".to_string(),
                message: format!(
                    "Unknown status '{}'. Allowed: idle, waiting, active, cancelled, completed",
                    status
                ),
            })
        })
        .collect()
}

/// Build the listing filter from the request's query string
pub fn activation_filter(event: &Request) -> Result<ActivationFilter, ApiError> {
    let statuses = match query_param(event, "activation_status") {
        Some(raw) => Some(parse_statuses(&raw)?),
        None => None,
    };

    Ok(ActivationFilter {
        statuses,
        location_id: query_param(event, "location_id"),
        asset_id: query_param(event, "asset_id"),
        circuit_id: query_param(event, "circuit_id"),
    })
}

/// Handler for POST /activations endpoint
///
/// Every activation in the hierarchy gets its own acknowledgement; a bad
/// window rejects that activation only.
pub async fn send_activations(event: Request, state: &AppState) -> Result<Response<Body>, ApiError> {
    let request_id = event.lambda_context().request_id.clone();

    info!(request_id = %request_id, "Processing send activations request");

    authorize(&event, state)?;

    let request: ActivationRequest = parse_json_body(&event, &request_id)?;
    let acks = request.acknowledge();

    let rejected = acks.iter().filter(|ack| ack.response != 200).count();
    info!(
        request_id = %request_id,
        locations = request.locations.len(),
        activations = acks.len(),
        rejected = rejected,
        "Acknowledged activations"
    );

    json_response(200, &acks, &request_id)
}

/// Handler for GET /activations endpoint
///
/// # Query Parameters
/// * `activation_status` - Comma-separated statuses to keep
/// * `location_id`, `asset_id`, `circuit_id` - Keep only this node among records of its level
pub async fn list_activations(event: Request, state: &AppState) -> Result<Response<Body>, ApiError> {
    let request_id = event.lambda_context().request_id.clone();

    info!(request_id = %request_id, "Processing list activations request");

    authorize(&event, state)?;

    let filter = activation_filter(&event)?;
    let records = state.platform.list_activations().await?;
    let total = records.len();
    let records = filter.apply(records);

    info!(
        request_id = %request_id,
        total = total,
        returned = records.len(),
        "Filtered activations"
    );

    json_response(200, &records, &request_id)
}
