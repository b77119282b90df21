use lambda_http::{Body, Request, RequestExt, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{authorize, json_response, parse_json_body};
use crate::error::{ApiError, ValidationError};
use crate::state::AppState;
use telemetry_gateway::shared::validators::validate_property_name;

/// Request payload for a property write
#[derive(Debug, Deserialize)]
pub struct SetPropertyRequest {
    #[serde(default)]
    pub value: Option<Value>,
}

/// Response payload for a property write
#[derive(Debug, Serialize)]
pub struct SetPropertyResponse {
    pub success: bool,
    pub message: String,
    pub thing_id: String,
    pub property_name: String,
    pub value: Value,
}

/// Handler for PUT /locations/{thing_id}/properties/{property_name} endpoint
///
/// Only the equipment measurement slots are writable. The value must be a
/// number, string or boolean.
pub async fn set_property(
    event: Request,
    state: &AppState,
    thing_id: &str,
    property_name: &str,
) -> Result<Response<Body>, ApiError> {
    let request_id = event.lambda_context().request_id.clone();

    info!(
        request_id = %request_id,
        thing_id = %thing_id,
        property_name = %property_name,
        "Processing set property request"
    );

    authorize(&event, state)?;

    let slot = validate_property_name(property_name).map_err(|e| {
        warn!(request_id = %request_id, property_name = %property_name, "Property not writable");
        ValidationError::PropertyNotAllowed(e.message)
    })?;

    let request: SetPropertyRequest = parse_json_body(&event, &request_id)?;

    let value = match request.value {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingField("value".to_string()).into());
        }
        Some(value @ (Value::Number(_) | Value::String(_) | Value::Bool(_))) => value,
        Some(_) => {
            return Err(ValidationError::InvalidValue {
                field: "value".to_string(),
                message: "Must be a number, string or boolean".to_string(),
            }
            .into());
        }
    };

    let message = state
        .platform
        .set_property(thing_id, slot.key(), &value)
        .await?;

    info!(
        request_id = %request_id,
        thing_id = %thing_id,
        property_name = %property_name,
        "Property written"
    );

    let response = SetPropertyResponse {
        success: true,
        message,
        thing_id: thing_id.to_string(),
        property_name: slot.key().to_string(),
        value,
    };

    json_response(200, &response, &request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_json, request, state};
    use lambda_http::http::Method;

    fn put(property: &str, body: Body) -> Request {
        request(
            Method::PUT,
            &format!("/locations/LOC_0001/properties/{}", property),
            &[],
            body,
        )
    }

    #[tokio::test]
    async fn test_set_property_success() {
        let event = put("tempsp", Body::from(r#"{"value": 7.5}"#));
        let response = set_property(event, &state(), "LOC_0001", "tempsp")
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Property tempsp set to 7.5");
        assert_eq!(body["thing_id"], "LOC_0001");
        assert_eq!(body["value"], 7.5);
    }

    #[tokio::test]
    async fn test_set_property_text_value() {
        let event = put("operation_mode", Body::from(r#"{"value": "AUTO"}"#));
        let response = set_property(event, &state(), "LOC_0001", "operation_mode")
            .await
            .unwrap();

        assert_eq!(body_json(&response)["message"], "Property operation_mode set to AUTO");
    }

    #[tokio::test]
    async fn test_set_property_not_allowed() {
        let event = put("grid_power", Body::from(r#"{"value": 1}"#));
        let result = set_property(event, &state(), "LOC_0001", "grid_power").await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::PropertyNotAllowed(_)))
        ));
    }

    #[tokio::test]
    async fn test_set_property_missing_or_null_value() {
        for body in [r#"{}"#, r#"{"value": null}"#] {
            let event = put("tempsp", Body::from(body));
            let result = set_property(event, &state(), "LOC_0001", "tempsp").await;

            assert!(
                matches!(result, Err(ApiError::Validation(ValidationError::MissingField(ref f))) if f == "value"),
                "Expected missing value for {}",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_set_property_rejects_structured_value() {
        let event = put("tempsp", Body::from(r#"{"value": [1, 2]}"#));
        let result = set_property(event, &state(), "LOC_0001", "tempsp").await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_set_property_invalid_json() {
        let event = put("tempsp", Body::from("value=7"));
        let result = set_property(event, &state(), "LOC_0001", "tempsp").await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidBody(_)))
        ));
    }

    #[tokio::test]
    async fn test_set_property_empty_body() {
        let event = put("tempsp", Body::Empty);
        let result = set_property(event, &state(), "LOC_0001", "tempsp").await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidBody(_)))
        ));
    }
}
