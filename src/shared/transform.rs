//! Rebuilds platform hierarchy payloads as the stable location model
//!
//! Three shapes are produced from the same location → asset → circuit walk:
//! topology (ids and names), realtime snapshot (one reading per slot) and
//! history (a series per slot). Partial or malformed nodes never fail a
//! transform; they degrade to empty ids, empty names and absent slots.

use serde_json::{Map, Value};

use crate::domain::{
    AssetReadings, AssetSummary, CircuitReadings, CircuitSummary, EquipmentMeasures,
    LocationHistory, LocationReadings, LocationSlot, LocationSnapshot, LocationSummary,
    LocationsList,
};
use crate::measure::{extract_point_value, extract_series, TimestampField};

/// A decoded platform JSON object
pub type RawObject = Map<String, Value>;

/// Errors raised before a platform payload can be transformed
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Platform response root must be a JSON object, found {0}")]
    NonObjectRoot(&'static str),
}

/// Accept a decoded platform response only if its root is an object
pub fn parse_response(value: Value) -> Result<RawObject, TransformError> {
    match value {
        Value::Object(object) => Ok(object),
        Value::Null => Err(TransformError::NonObjectRoot("null")),
        Value::Bool(_) => Err(TransformError::NonObjectRoot("boolean")),
        Value::Number(_) => Err(TransformError::NonObjectRoot("number")),
        Value::String(_) => Err(TransformError::NonObjectRoot("string")),
        Value::Array(_) => Err(TransformError::NonObjectRoot("array")),
    }
}

/// Read a display name that is either `"Name"` or `{ "value": "Name" }`
pub fn resolve_name(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Object(wrapper)) => match wrapper.get("value") {
            Some(Value::String(name)) => name.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Read a node identifier, defaulting to an empty string
pub fn resolve_id(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}

/// Object children listed under `key`, in platform order
///
/// A missing key or a non-list yields nothing; non-object entries are skipped.
fn children<'a>(node: &'a RawObject, key: &str) -> impl Iterator<Item = &'a RawObject> + 'a {
    node.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// The single location a by-id query wraps in a one-element `locations` list
fn first_location(response: &RawObject) -> Option<&RawObject> {
    response
        .get("locations")
        .and_then(Value::as_array)
        .and_then(|locations| locations.first())
        .and_then(Value::as_object)
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// Transform a `GetAllLocations` response into the location hierarchy
pub fn transform_topology(response: &RawObject) -> LocationsList {
    let locations = children(response, "locations")
        .map(|location| LocationSummary {
            id: resolve_id(location.get("id")),
            name: resolve_name(location.get("name")),
            assets: children(location, "assets")
                .map(|asset| AssetSummary {
                    id: resolve_id(asset.get("id")),
                    name: resolve_name(asset.get("name")),
                    circuits: children(asset, "circuits")
                        .map(|circuit| CircuitSummary {
                            id: resolve_id(circuit.get("id")),
                            name: resolve_name(circuit.get("name")),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    LocationsList { locations }
}

// ---------------------------------------------------------------------------
// Snapshot and History
// ---------------------------------------------------------------------------

/// Transform a `GetLocationById` response into a realtime snapshot
pub fn transform_snapshot(response: &RawObject) -> LocationSnapshot {
    let read = |raw: Option<&Value>| extract_point_value(raw, TimestampField::Time);
    build_location(response, &read)
}

/// Transform a `GetLocationPropertyHistory` response into per-slot series
pub fn transform_history(response: &RawObject) -> LocationHistory {
    let read = |raw: Option<&Value>| extract_series(raw, TimestampField::Timestamp);
    build_location(response, &read)
}

fn build_location<M, F>(response: &RawObject, read: &F) -> LocationReadings<M>
where
    F: Fn(Option<&Value>) -> Option<M>,
{
    let empty = RawObject::new();
    let location = first_location(response).unwrap_or(&empty);

    let aggregate = |slot: LocationSlot| read(location.get(slot.key()));

    LocationReadings {
        id: resolve_id(location.get("id")),
        grid_power: aggregate(LocationSlot::GridPower),
        aggregated_power: aggregate(LocationSlot::AggregatedPower),
        local_generated_power: aggregate(LocationSlot::LocalGeneratedPower),
        measures: build_measures(location, read),
        assets: children(location, "assets")
            .map(|asset| build_asset(asset, read))
            .collect(),
    }
}

fn build_asset<M, F>(asset: &RawObject, read: &F) -> AssetReadings<M>
where
    F: Fn(Option<&Value>) -> Option<M>,
{
    AssetReadings {
        id: resolve_id(asset.get("id")),
        measures: build_measures(asset, read),
        circuits: children(asset, "circuits")
            .map(|circuit| CircuitReadings {
                id: resolve_id(circuit.get("id")),
                measures: build_measures(circuit, read),
            })
            .collect(),
    }
}

fn build_measures<M, F>(node: &RawObject, read: &F) -> EquipmentMeasures<M>
where
    F: Fn(Option<&Value>) -> Option<M>,
{
    EquipmentMeasures::from_slots(|slot| read(node.get(slot.key())))
}
