use serde::{Deserialize, Serialize};

/// Reading value as reported by the platform
///
/// Physical measurements are numeric, enumerations such as the operating
/// mode arrive as text. Some equipment reports on/off flags as booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Number(serde_json::Number),
    Text(String),
    Flag(bool),
}

impl MeasureValue {
    /// Numeric view of the value, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MeasureValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Text view of the value, if it is textual
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MeasureValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(MeasureValue::Number)
            .unwrap_or_else(|| MeasureValue::Text(value.to_string()))
    }
}

impl From<i64> for MeasureValue {
    fn from(value: i64) -> Self {
        MeasureValue::Number(value.into())
    }
}

impl From<&str> for MeasureValue {
    fn from(value: &str) -> Self {
        MeasureValue::Text(value.to_string())
    }
}

/// A single reading at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointValue {
    /// Verbatim reading value
    pub value: MeasureValue,
    /// ISO-8601 UTC timestamp, e.g. "2024-10-23T16:13:20Z"
    pub timestamp: String,
    /// Platform confidence tag ("UNKNOWN" when not reported)
    pub quality: String,
}

/// Readings in the order the platform returned them
pub type TimeSeries = Vec<PointValue>;

/// Measurement slots shared by locations, assets and circuits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentSlot {
    TempSetpoint,
    DeltaTempSetpoint,
    Temp,
    Power,
    Humidity,
    Quality,
    Availability,
    OperationMode,
    Status,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 9] = [
        EquipmentSlot::TempSetpoint,
        EquipmentSlot::DeltaTempSetpoint,
        EquipmentSlot::Temp,
        EquipmentSlot::Power,
        EquipmentSlot::Humidity,
        EquipmentSlot::Quality,
        EquipmentSlot::Availability,
        EquipmentSlot::OperationMode,
        EquipmentSlot::Status,
    ];

    /// Field name used by both the platform and the public API
    pub fn key(self) -> &'static str {
        match self {
            EquipmentSlot::TempSetpoint => "tempsp",
            EquipmentSlot::DeltaTempSetpoint => "deltatempsp",
            EquipmentSlot::Temp => "temp",
            EquipmentSlot::Power => "power",
            EquipmentSlot::Humidity => "humidity",
            EquipmentSlot::Quality => "quality",
            EquipmentSlot::Availability => "availability",
            EquipmentSlot::OperationMode => "operation_mode",
            EquipmentSlot::Status => "status",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

/// Power aggregates that only exist on a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationSlot {
    GridPower,
    AggregatedPower,
    LocalGeneratedPower,
}

impl LocationSlot {
    pub const ALL: [LocationSlot; 3] = [
        LocationSlot::GridPower,
        LocationSlot::AggregatedPower,
        LocationSlot::LocalGeneratedPower,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LocationSlot::GridPower => "grid_power",
            LocationSlot::AggregatedPower => "aggregated_power",
            LocationSlot::LocalGeneratedPower => "local_generated_power",
        }
    }
}

// ---------------------------------------------------------------------------
// Topology shape (GET /locations)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: String,
    pub name: String,
    pub circuits: Vec<CircuitSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub id: String,
    pub name: String,
    pub assets: Vec<AssetSummary>,
}

/// Every location known to the platform with its asset/circuit hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationsList {
    pub locations: Vec<LocationSummary>,
}

// ---------------------------------------------------------------------------
// Snapshot and History shapes
//
// `M` is `PointValue` for realtime snapshots and `TimeSeries` for history.
// A node never mixes the two.
// ---------------------------------------------------------------------------

/// The nine equipment slots, each absent unless the platform reported a usable reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentMeasures<M> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempsp: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deltatempsp: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<M>,
}

impl<M> Default for EquipmentMeasures<M> {
    fn default() -> Self {
        Self {
            tempsp: None,
            deltatempsp: None,
            temp: None,
            power: None,
            humidity: None,
            quality: None,
            availability: None,
            operation_mode: None,
            status: None,
        }
    }
}

impl<M> EquipmentMeasures<M> {
    /// Build the slot set by asking `read` for each slot in turn
    pub fn from_slots(mut read: impl FnMut(EquipmentSlot) -> Option<M>) -> Self {
        Self {
            tempsp: read(EquipmentSlot::TempSetpoint),
            deltatempsp: read(EquipmentSlot::DeltaTempSetpoint),
            temp: read(EquipmentSlot::Temp),
            power: read(EquipmentSlot::Power),
            humidity: read(EquipmentSlot::Humidity),
            quality: read(EquipmentSlot::Quality),
            availability: read(EquipmentSlot::Availability),
            operation_mode: read(EquipmentSlot::OperationMode),
            status: read(EquipmentSlot::Status),
        }
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&M> {
        match slot {
            EquipmentSlot::TempSetpoint => self.tempsp.as_ref(),
            EquipmentSlot::DeltaTempSetpoint => self.deltatempsp.as_ref(),
            EquipmentSlot::Temp => self.temp.as_ref(),
            EquipmentSlot::Power => self.power.as_ref(),
            EquipmentSlot::Humidity => self.humidity.as_ref(),
            EquipmentSlot::Quality => self.quality.as_ref(),
            EquipmentSlot::Availability => self.availability.as_ref(),
            EquipmentSlot::OperationMode => self.operation_mode.as_ref(),
            EquipmentSlot::Status => self.status.as_ref(),
        }
    }

    /// Number of slots carrying a reading
    pub fn present_count(&self) -> usize {
        EquipmentSlot::ALL
            .iter()
            .filter(|slot| self.get(**slot).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitReadings<M> {
    pub id: String,
    #[serde(flatten)]
    pub measures: EquipmentMeasures<M>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReadings<M> {
    pub id: String,
    #[serde(flatten)]
    pub measures: EquipmentMeasures<M>,
    pub circuits: Vec<CircuitReadings<M>>,
}

/// Location with its power aggregates, equipment slots and asset subtree
///
/// Aggregates are positive for consumption and negative for injection, in kW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReadings<M> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_power: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated_power: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_generated_power: Option<M>,
    #[serde(flatten)]
    pub measures: EquipmentMeasures<M>,
    pub assets: Vec<AssetReadings<M>>,
}

impl<M> LocationReadings<M> {
    pub fn aggregate(&self, slot: LocationSlot) -> Option<&M> {
        match slot {
            LocationSlot::GridPower => self.grid_power.as_ref(),
            LocationSlot::AggregatedPower => self.aggregated_power.as_ref(),
            LocationSlot::LocalGeneratedPower => self.local_generated_power.as_ref(),
        }
    }

    /// Keep only the requested asset and/or circuit
    ///
    /// The asset filter drops every other asset. The circuit filter is
    /// applied inside each remaining asset. Order is preserved.
    pub fn narrowed(mut self, asset_id: Option<&str>, circuit_id: Option<&str>) -> Self {
        if let Some(asset_id) = asset_id {
            self.assets.retain(|asset| asset.id == asset_id);
        }

        if let Some(circuit_id) = circuit_id {
            for asset in &mut self.assets {
                asset.circuits.retain(|circuit| circuit.id == circuit_id);
            }
        }

        self
    }

    /// Total number of circuits across all assets
    pub fn circuit_count(&self) -> usize {
        self.assets.iter().map(|asset| asset.circuits.len()).sum()
    }
}

pub type CircuitSnapshot = CircuitReadings<PointValue>;
pub type AssetSnapshot = AssetReadings<PointValue>;
pub type LocationSnapshot = LocationReadings<PointValue>;

pub type CircuitHistory = CircuitReadings<TimeSeries>;
pub type AssetHistory = AssetReadings<TimeSeries>;
pub type LocationHistory = LocationReadings<TimeSeries>;

#[cfg(test)]
mod tests {
    use super::*;

    fn point(value: f64) -> PointValue {
        PointValue {
            value: value.into(),
            timestamp: "2024-10-23T16:13:20Z".to_string(),
            quality: "GOOD".to_string(),
        }
    }

    fn circuit(id: &str) -> CircuitSnapshot {
        CircuitReadings {
            id: id.to_string(),
            measures: EquipmentMeasures::default(),
        }
    }

    fn sample_location() -> LocationSnapshot {
        LocationReadings {
            id: "loc-1".to_string(),
            grid_power: Some(point(23.5)),
            aggregated_power: None,
            local_generated_power: None,
            measures: EquipmentMeasures::default(),
            assets: vec![
                AssetReadings {
                    id: "asset-1".to_string(),
                    measures: EquipmentMeasures::default(),
                    circuits: vec![circuit("c-1"), circuit("c-2")],
                },
                AssetReadings {
                    id: "asset-2".to_string(),
                    measures: EquipmentMeasures::default(),
                    circuits: vec![circuit("c-1"), circuit("c-3")],
                },
            ],
        }
    }

    #[test]
    fn test_equipment_slot_keys_round_trip() {
        for slot in EquipmentSlot::ALL {
            assert_eq!(EquipmentSlot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(EquipmentSlot::from_key("grid_power"), None);
        assert_eq!(EquipmentSlot::from_key("TEMP"), None);
    }

    #[test]
    fn test_absent_slots_are_omitted_from_json() {
        let location = sample_location();
        let json = serde_json::to_value(&location).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.contains_key("grid_power"));
        assert!(!object.contains_key("aggregated_power"));
        assert!(!object.contains_key("tempsp"));
        assert!(!object.contains_key("operation_mode"));
        assert_eq!(json["assets"][0]["circuits"][1]["id"], "c-2");
    }

    #[test]
    fn test_flattened_slots_serialize_alongside_id() {
        let asset = AssetReadings {
            id: "chiller-001".to_string(),
            measures: EquipmentMeasures {
                temp: Some(point(6.8)),
                operation_mode: Some(PointValue {
                    value: "EXTERNAL".into(),
                    timestamp: "2024-10-23T16:13:20Z".to_string(),
                    quality: "GOOD".to_string(),
                }),
                ..EquipmentMeasures::default()
            },
            circuits: vec![],
        };

        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["id"], "chiller-001");
        assert_eq!(json["temp"]["value"], 6.8);
        assert_eq!(json["operation_mode"]["value"], "EXTERNAL");
        assert_eq!(json["circuits"], serde_json::json!([]));
    }

    #[test]
    fn test_zero_value_serializes_as_zero() {
        let zero = PointValue {
            value: MeasureValue::from(0i64),
            timestamp: "1970-01-01T00:00:00Z".to_string(),
            quality: "UNKNOWN".to_string(),
        };
        let json = serde_json::to_string(&zero).unwrap();
        assert!(json.contains(r#""value":0"#));
    }

    #[test]
    fn test_snapshot_deserializes_from_public_json() {
        let json = serde_json::json!({
            "id": "loc-1",
            "grid_power": {"value": 23.5, "timestamp": "2024-10-23T16:13:20Z", "quality": "GOOD"},
            "assets": [{
                "id": "asset-1",
                "status": {"value": 1, "timestamp": "2024-10-23T16:13:20Z", "quality": "GOOD"},
                "circuits": []
            }]
        });

        let location: LocationSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(location.grid_power.unwrap().value.as_f64(), Some(23.5));
        assert!(location.aggregated_power.is_none());
        assert_eq!(location.assets[0].measures.present_count(), 1);
    }

    #[test]
    fn test_narrowed_by_asset() {
        let narrowed = sample_location().narrowed(Some("asset-2"), None);
        assert_eq!(narrowed.assets.len(), 1);
        assert_eq!(narrowed.assets[0].id, "asset-2");
        assert_eq!(narrowed.assets[0].circuits.len(), 2);
    }

    #[test]
    fn test_narrowed_by_circuit_applies_to_every_asset() {
        let narrowed = sample_location().narrowed(None, Some("c-1"));
        assert_eq!(narrowed.assets.len(), 2);
        assert!(narrowed
            .assets
            .iter()
            .all(|asset| asset.circuits.len() == 1 && asset.circuits[0].id == "c-1"));
    }

    #[test]
    fn test_narrowed_by_asset_and_circuit() {
        let narrowed = sample_location().narrowed(Some("asset-1"), Some("c-2"));
        assert_eq!(narrowed.assets.len(), 1);
        assert_eq!(narrowed.circuit_count(), 1);
        assert_eq!(narrowed.assets[0].circuits[0].id, "c-2");
    }

    #[test]
    fn test_narrowed_unknown_asset_keeps_location() {
        let narrowed = sample_location().narrowed(Some("missing"), None);
        assert_eq!(narrowed.id, "loc-1");
        assert!(narrowed.assets.is_empty());
        assert!(narrowed.grid_power.is_some());
    }

    #[test]
    fn test_measure_value_views() {
        assert_eq!(MeasureValue::from(7.5).as_f64(), Some(7.5));
        assert_eq!(MeasureValue::from("AUTO").as_str(), Some("AUTO"));
        assert_eq!(MeasureValue::Flag(true).as_f64(), None);
        assert_eq!(MeasureValue::from(f64::NAN).as_str(), Some("NaN"));
    }
}
