use serde::{Deserialize, Serialize};

use crate::validators::validate_activation_window;

/// One requested setpoint change over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    /// RFC 3339 start of the window
    pub requested_start_time: String,
    /// RFC 3339 end of the window
    pub requested_end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint: Option<f64>,
    pub delta_setpoint: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitActivations {
    pub id: String,
    #[serde(default)]
    pub activations: Vec<Activation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetActivations {
    pub id: String,
    #[serde(default)]
    pub activations: Vec<Activation>,
    #[serde(default)]
    pub circuits: Vec<CircuitActivations>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationActivations {
    pub id: String,
    #[serde(default)]
    pub activations: Vec<Activation>,
    #[serde(default)]
    pub assets: Vec<AssetActivations>,
}

/// Request body for POST /activations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub locations: Vec<LocationActivations>,
}

/// Per-activation outcome returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationAck {
    pub id: String,
    /// HTTP status code for this activation
    pub response: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActivationRequest {
    /// All activations in depth-first order: location, its assets, their circuits
    pub fn iter(&self) -> impl Iterator<Item = &Activation> {
        self.locations.iter().flat_map(|location| {
            location.activations.iter().chain(location.assets.iter().flat_map(|asset| {
                asset.activations.iter().chain(
                    asset
                        .circuits
                        .iter()
                        .flat_map(|circuit| circuit.activations.iter()),
                )
            }))
        })
    }

    /// Acknowledge every activation, rejecting those with an invalid window
    pub fn acknowledge(&self) -> Vec<ActivationAck> {
        self.iter()
            .map(|activation| match validate_activation_window(activation) {
                Ok(()) => ActivationAck {
                    id: activation.id.clone(),
                    response: 200,
                    error: None,
                },
                Err(e) => ActivationAck {
                    id: activation.id.clone(),
                    response: 400,
                    error: Some(e.message),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationStatus {
    Idle,
    Waiting,
    Active,
    Cancelled,
    Completed,
}

impl ActivationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "idle" => Some(ActivationStatus::Idle),
            "waiting" => Some(ActivationStatus::Waiting),
            "active" => Some(ActivationStatus::Active),
            "cancelled" => Some(ActivationStatus::Cancelled),
            "completed" => Some(ActivationStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Location,
    Asset,
    Circuit,
}

/// An activation as tracked by the platform (GET /activations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub id: String,
    pub target_id: String,
    pub target_type: TargetType,
    pub requested_start_time: String,
    pub requested_end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint: Option<f64>,
    pub delta_setpoint: f64,
    pub activation_status: ActivationStatus,
}

/// Query filters for GET /activations
///
/// An id filter only constrains records targeting that level of the
/// hierarchy; records targeting other levels are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationFilter {
    pub statuses: Option<Vec<ActivationStatus>>,
    pub location_id: Option<String>,
    pub asset_id: Option<String>,
    pub circuit_id: Option<String>,
}

impl ActivationFilter {
    pub fn matches(&self, record: &ActivationRecord) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&record.activation_status) {
                return false;
            }
        }

        let level_filter = match record.target_type {
            TargetType::Location => &self.location_id,
            TargetType::Asset => &self.asset_id,
            TargetType::Circuit => &self.circuit_id,
        };

        match level_filter {
            Some(id) => record.target_id == *id,
            None => true,
        }
    }

    pub fn apply(&self, records: Vec<ActivationRecord>) -> Vec<ActivationRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
