use lambda_http::{http::Method, Body, Request, RequestExt, Response};
use tracing::{error, info, warn};

use super::cors;
use super::error::{ApiError, NotFoundError};
use super::handlers;
use super::state::AppState;

pub async fn route_request(
    event: Request,
    state: &AppState,
) -> Result<Response<Body>, lambda_http::Error> {
    let path = normalize_path(event.uri().path());
    let method = event.method().clone();

    let request_id = event.lambda_context().request_id.clone();
    let origin = state.config.cors_allowed_origin.as_str();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Routing gateway request"
    );

    if method == Method::OPTIONS {
        info!(request_id = %request_id, "Handling CORS preflight request");
        return Ok(cors::preflight_response(origin));
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let result = match (&method, segments.as_slice()) {
        (&Method::GET, ["health"]) => {
            info!(request_id = %request_id, "Health check endpoint");
            Ok(handle_health(&request_id))
        }

        (&Method::GET, ["locations"]) => handlers::locations::list_locations(event, state).await,
        (&Method::GET, ["locations", location_id]) => {
            handlers::locations::get_location(event, state, location_id).await
        }
        (&Method::GET, ["locations", location_id, "measures"]) => {
            handlers::measures::get_measures(event, state, location_id).await
        }
        (&Method::PUT, ["locations", thing_id, "properties", property_name]) => {
            handlers::properties::set_property(event, state, thing_id, property_name).await
        }

        (&Method::POST, ["activations"]) => {
            handlers::activations::send_activations(event, state).await
        }
        (&Method::GET, ["activations"]) => {
            handlers::activations::list_activations(event, state).await
        }

        _ => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Unknown route"
            );
            Err(NotFoundError::ResourceNotFound.into())
        }
    };

    let response = result.unwrap_or_else(|e| {
        match &e {
            ApiError::Platform(_) | ApiError::Internal(_) => {
                error!(request_id = %request_id, error = %e, "Request failed")
            }
            _ => warn!(request_id = %request_id, error = %e, "Request rejected"),
        }
        e.to_http_response(&request_id)
    });

    Ok(cors::add_cors_headers(response, origin))
}

/// Strip trailing slashes and the API Gateway stage prefix
fn normalize_path(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }

    let path = match path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };

    match path.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn handle_health(request_id: &str) -> Response<Body> {
    let body = serde_json::json!({
        "status": "healthy",
        "service": "telemetry-gateway",
        "request_id": request_id
    });

    let mut response = Response::new(Body::from(body.to_string()));
    response.headers_mut().insert(
        "content-type",
        lambda_http::http::HeaderValue::from_static("application/json"),
    );
    response
}
