//! Fixture tests: realistic platform payloads through the transformer
//!
//! Each payload mirrors what the platform's location services return,
//! including the irregularities seen in practice: wrapped and bare names,
//! null readings, stray non-object children and numeric identifiers.

use serde_json::{json, Value};
use telemetry_gateway::domain::EquipmentSlot;
use telemetry_gateway::transform::{
    parse_response, transform_history, transform_snapshot, transform_topology, RawObject,
};

fn raw(value: Value) -> RawObject {
    parse_response(value).unwrap()
}

fn get_all_locations_payload() -> Value {
    json!({
        "locations": [
            {
                "id": "icepark-001",
                "name": {"value": "IcePark Angers"},
                "assets": [
                    {
                        "id": "chiller-001",
                        "name": {"value": "Trane Chiller System"},
                        "circuits": [
                            {"id": "circuit-s1", "name": "Water Circuit S1"},
                            {"id": "circuit-s2", "name": {"value": "Ambient Sensor Zone 1"}},
                            "not-a-circuit",
                            {"id": 3, "name": null}
                        ]
                    },
                    {"id": "pv-001", "name": "Solar Panels"}
                ]
            },
            {"name": "Unnamed site"}
        ]
    })
}

fn get_location_by_id_payload() -> Value {
    json!({
        "locations": [{
            "id": "icepark-001",
            "name": {"value": "IcePark Angers"},
            "grid_power": {"value": 23.5, "time": 1729700000000i64, "quality": "GOOD"},
            "aggregated_power": {"value": null, "time": 1729700000000i64, "quality": "BAD"},
            "local_generated_power": {"value": -3.4, "time": 1729700000999i64},
            "assets": [
                {
                    "id": "chiller-001",
                    "tempsp": {"value": 7.0, "time": 1729700000000i64, "quality": "GOOD"},
                    "deltatempsp": {"value": 0, "time": 1729700000000i64, "quality": "GOOD"},
                    "temp": {"value": 6.8, "quality": "GOOD"},
                    "operation_mode": {"value": "EXTERNAL", "time": 1729700000000i64, "quality": 1},
                    "status": {},
                    "circuits": [
                        {
                            "id": "circuit-s1",
                            "power": {"value": 8.5, "time": 1729700000000i64, "quality": "GOOD"}
                        }
                    ]
                }
            ]
        }]
    })
}

fn get_location_property_history_payload() -> Value {
    json!({
        "locations": [{
            "id": "icepark-001",
            "grid_power": [
                {"value": 23.5, "timestamp": 1729700000000i64, "quality": "GOOD"},
                {"value": null, "timestamp": 1729700300000i64, "quality": "BAD"},
                {"value": 23.7, "timestamp": 1729700600000i64, "quality": "GOOD"}
            ],
            "aggregated_power": [],
            "local_generated_power": [{"value": null, "timestamp": 1729700000000i64}],
            "assets": [
                {
                    "id": "chiller-001",
                    "temp": [
                        {"value": 6.8, "timestamp": 1729700000000i64, "quality": "GOOD"},
                        {"value": 6.9, "time": 1729700300000i64, "quality": "GOOD"}
                    ],
                    "circuits": [
                        {
                            "id": "circuit-s1",
                            "power": [{"value": 8.5, "timestamp": 1729700000000i64}]
                        }
                    ]
                }
            ]
        }]
    })
}

#[test]
fn test_topology_from_platform_payload() {
    let topology = transform_topology(&raw(get_all_locations_payload()));

    assert_eq!(topology.locations.len(), 2);

    let icepark = &topology.locations[0];
    assert_eq!(icepark.name, "IcePark Angers");
    assert_eq!(icepark.assets[0].name, "Trane Chiller System");
    assert_eq!(icepark.assets[1].name, "Solar Panels");
    assert!(icepark.assets[1].circuits.is_empty());

    let circuits = &icepark.assets[0].circuits;
    assert_eq!(circuits.len(), 3);
    assert_eq!(circuits[0].name, "Water Circuit S1");
    assert_eq!(circuits[1].name, "Ambient Sensor Zone 1");
    assert_eq!(circuits[2].id, "3");
    assert_eq!(circuits[2].name, "");

    let unnamed = &topology.locations[1];
    assert_eq!(unnamed.id, "");
    assert_eq!(unnamed.name, "Unnamed site");
    assert!(unnamed.assets.is_empty());
}

#[test]
fn test_snapshot_from_platform_payload() {
    let snapshot = transform_snapshot(&raw(get_location_by_id_payload()));

    assert_eq!(snapshot.id, "icepark-001");

    let grid = snapshot.grid_power.as_ref().unwrap();
    assert_eq!(grid.timestamp, "2024-10-23T16:13:20Z");
    assert_eq!(grid.quality, "GOOD");

    assert!(snapshot.aggregated_power.is_none());

    let local = snapshot.local_generated_power.as_ref().unwrap();
    assert_eq!(local.timestamp, "2024-10-23T16:13:20Z");
    assert_eq!(local.quality, "UNKNOWN");

    let chiller = &snapshot.assets[0];
    assert_eq!(chiller.measures.get(EquipmentSlot::TempSetpoint).unwrap().value.as_f64(), Some(7.0));
    assert_eq!(
        chiller
            .measures
            .get(EquipmentSlot::DeltaTempSetpoint)
            .unwrap()
            .value
            .as_f64(),
        Some(0.0)
    );
    assert!(chiller.measures.get(EquipmentSlot::Temp).is_none());
    assert!(chiller.measures.get(EquipmentSlot::Status).is_none());

    let mode = chiller.measures.get(EquipmentSlot::OperationMode).unwrap();
    assert_eq!(mode.value.as_str(), Some("EXTERNAL"));
    assert_eq!(mode.quality, "1");

    assert_eq!(chiller.circuits[0].measures.present_count(), 1);
}

#[test]
fn test_snapshot_serialization_omits_absent_slots() {
    let snapshot = transform_snapshot(&raw(get_location_by_id_payload()));
    let json = serde_json::to_value(&snapshot).unwrap();

    assert!(json.get("aggregated_power").is_none());
    assert!(json["assets"][0].get("temp").is_none());
    assert_eq!(json["assets"][0]["deltatempsp"]["value"], 0);
    assert_eq!(json["assets"][0]["circuits"][0]["power"]["value"], 8.5);
}

#[test]
fn test_history_from_platform_payload() {
    let history = transform_history(&raw(get_location_property_history_payload()));

    let grid = history.grid_power.as_ref().unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0].timestamp, "2024-10-23T16:13:20Z");
    assert_eq!(grid[1].timestamp, "2024-10-23T16:23:20Z");
    assert_eq!(grid[1].value.as_f64(), Some(23.7));

    // Empty lists and lists with no usable entry are both absent
    assert!(history.aggregated_power.is_none());
    assert!(history.local_generated_power.is_none());

    // History entries are keyed by `timestamp`; `time` does not count
    let temp = history.assets[0].measures.get(EquipmentSlot::Temp).unwrap();
    assert_eq!(temp.len(), 1);

    let power = history.assets[0].circuits[0]
        .measures
        .get(EquipmentSlot::Power)
        .unwrap();
    assert_eq!(power[0].quality, "UNKNOWN");
}

#[test]
fn test_narrowing_platform_snapshot() {
    let snapshot = transform_snapshot(&raw(get_location_by_id_payload()));

    let narrowed = snapshot.clone().narrowed(Some("chiller-001"), Some("circuit-s9"));
    assert_eq!(narrowed.assets.len(), 1);
    assert!(narrowed.assets[0].circuits.is_empty());
    // Location-level readings survive narrowing
    assert!(narrowed.grid_power.is_some());

    let narrowed = snapshot.narrowed(Some("pv-001"), None);
    assert!(narrowed.assets.is_empty());
}
