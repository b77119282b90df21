use lambda_http::{Body, Request, RequestExt, Response};
use tracing::{info, warn};

use super::{authorize, json_response, query_param};
use crate::error::{ApiError, NotFoundError};
use crate::state::AppState;
use telemetry_gateway::shared::transform::{transform_snapshot, transform_topology};

/// Handler for GET /locations endpoint
///
/// Returns every location with its assets and circuits (ids and names only).
pub async fn list_locations(event: Request, state: &AppState) -> Result<Response<Body>, ApiError> {
    let request_id = event.lambda_context().request_id.clone();

    info!(request_id = %request_id, "Processing list locations request");

    authorize(&event, state)?;

    let raw = state.platform.get_all_locations().await?;
    let topology = transform_topology(&raw);

    info!(
        request_id = %request_id,
        locations = topology.locations.len(),
        "Transformed location topology"
    );

    json_response(200, &topology, &request_id)
}

/// Handler for GET /locations/{location_id} endpoint
///
/// Returns the latest reading of every slot in the location tree.
///
/// # Query Parameters
/// * `asset_id` - Keep only this asset
/// * `circuit_id` - Keep only this circuit within each remaining asset
///
/// # Returns
/// * HTTP 200 with the location snapshot
/// * HTTP 401 if the bearer token is rejected
/// * HTTP 404 if the platform knows no such location
/// * HTTP 502 if the platform call fails
pub async fn get_location(
    event: Request,
    state: &AppState,
    location_id: &str,
) -> Result<Response<Body>, ApiError> {
    let request_id = event.lambda_context().request_id.clone();

    info!(
        request_id = %request_id,
        location_id = %location_id,
        "Processing location snapshot request"
    );

    authorize(&event, state)?;

    let asset_id = query_param(&event, "asset_id");
    let circuit_id = query_param(&event, "circuit_id");

    let raw = state.platform.get_location_by_id(location_id).await?;
    let snapshot = transform_snapshot(&raw);

    if snapshot.id.is_empty() {
        warn!(request_id = %request_id, location_id = %location_id, "Location not found");
        return Err(NotFoundError::LocationNotFound(location_id.to_string()).into());
    }

    let snapshot = snapshot.narrowed(asset_id.as_deref(), circuit_id.as_deref());

    info!(
        request_id = %request_id,
        location_id = %location_id,
        assets = snapshot.assets.len(),
        circuits = snapshot.circuit_count(),
        "Transformed location snapshot"
    );

    json_response(200, &snapshot, &request_id)
}
