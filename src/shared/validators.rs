use chrono::{DateTime, Utc};

use crate::activation::Activation;
use crate::domain::EquipmentSlot;

/// Validation error type
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation error for field '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Validate that a property may be written through the gateway
///
/// Only the nine equipment measurement slots are writable.
pub fn validate_property_name(property_name: &str) -> Result<EquipmentSlot, ValidationError> {
    EquipmentSlot::from_key(property_name).ok_or_else(|| {
        let allowed: Vec<&str> = EquipmentSlot::ALL.iter().map(|slot| slot.key()).collect();
        ValidationError::new(
            "property_name",
            format!(
                "Property '{}' is not allowed. Allowed properties: {}",
                property_name,
                allowed.join(", ")
            ),
        )
    })
}

/// Parse an RFC3339 timestamp into UTC
pub fn parse_rfc3339(field: &str, timestamp: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ValidationError::new(
                field,
                format!(
                    "{} must be in RFC3339 format (e.g., 2024-01-15T10:30:00Z)",
                    field
                ),
            )
        })
}

/// Parse a strictly positive number of seconds from a query parameter
pub fn parse_positive_seconds(field: &str, raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        Ok(_) => Err(ValidationError::new(field, "Must be a positive number of seconds")),
        Err(_) => Err(ValidationError::new(field, "Must be an integer number of seconds")),
    }
}

/// Validate that an activation window is well-formed and ends after it starts
pub fn validate_activation_window(activation: &Activation) -> Result<(), ValidationError> {
    let start = parse_rfc3339("requested_start_time", &activation.requested_start_time)?;
    let end = parse_rfc3339("requested_end_time", &activation.requested_end_time)?;

    if end <= start {
        return Err(ValidationError::new(
            "requested_end_time",
            "requested_end_time must be after requested_start_time",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activation(start: &str, end: &str) -> Activation {
        Activation {
            id: "act".to_string(),
            requested_start_time: start.to_string(),
            requested_end_time: end.to_string(),
            setpoint: Some(7.0),
            delta_setpoint: 1.0,
        }
    }

    #[test]
    fn test_validate_property_name_allowed() {
        assert_eq!(validate_property_name("tempsp").unwrap(), EquipmentSlot::TempSetpoint);
        assert_eq!(
            validate_property_name("operation_mode").unwrap(),
            EquipmentSlot::OperationMode
        );
    }

    #[test]
    fn test_validate_property_name_rejected() {
        let err = validate_property_name("firmware").unwrap_err();
        assert_eq!(err.field, "property_name");
        assert!(err.message.contains("'firmware'"));
        assert!(err.message.contains("deltatempsp"));

        assert!(validate_property_name("grid_power").is_err());
        assert!(validate_property_name("").is_err());
    }

    #[test]
    fn test_parse_rfc3339_converts_offsets() {
        let dt = parse_rfc3339("to", "2025-10-22T16:23:45+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-10-22T14:23:45+00:00");
    }

    #[test]
    fn test_parse_rfc3339_invalid() {
        let err = parse_rfc3339("to", "2025-10-22 14:23").unwrap_err();
        assert_eq!(err.field, "to");
        assert!(parse_rfc3339("to", "").is_err());
    }

    #[test]
    fn test_parse_positive_seconds() {
        assert_eq!(parse_positive_seconds("from", "900").unwrap(), 900);
        assert_eq!(parse_positive_seconds("from", " 60 ").unwrap(), 60);
        assert!(parse_positive_seconds("from", "0").is_err());
        assert!(parse_positive_seconds("from", "-5").is_err());
        assert!(parse_positive_seconds("frequency", "5m").is_err());
    }

    #[test]
    fn test_validate_activation_window() {
        assert!(validate_activation_window(&activation(
            "2025-01-13T12:00:00Z",
            "2025-01-13T12:15:00Z"
        ))
        .is_ok());

        let err = validate_activation_window(&activation(
            "2025-01-13T12:00:00Z",
            "2025-01-13T12:00:00Z",
        ))
        .unwrap_err();
        assert_eq!(err.field, "requested_end_time");

        let err = validate_activation_window(&activation("soon", "2025-01-13T12:00:00Z")).unwrap_err();
        assert_eq!(err.field, "requested_start_time");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("from", "bad");
        assert_eq!(err.to_string(), "Validation error for field 'from': bad");
    }
}
