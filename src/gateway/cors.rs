use lambda_http::http::HeaderValue;
use lambda_http::{Body, Response};

const ALLOWED_METHODS: &str = "GET, POST, PUT, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Add CORS headers to a response
///
/// An origin that is not a valid header value falls back to `*`.
pub fn add_cors_headers(mut response: Response<Body>, allowed_origin: &str) -> Response<Body> {
    let headers = response.headers_mut();

    let origin =
        HeaderValue::from_str(allowed_origin).unwrap_or_else(|_| HeaderValue::from_static("*"));

    headers.insert("Access-Control-Allow-Origin", origin);
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert("Access-Control-Max-Age", HeaderValue::from_static("3600"));

    response
}

/// Create a preflight response for OPTIONS requests
///
/// Returns a 200 OK response with CORS headers and an empty body.
pub fn preflight_response(allowed_origin: &str) -> Response<Body> {
    let mut response = Response::new(Body::Empty);
    *response.status_mut() = lambda_http::http::StatusCode::OK;

    add_cors_headers(response, allowed_origin)
}
