//! Test utilities for property-based testing
//!
//! This module provides generators for platform-shaped payloads using the
//! proptest framework: epoch timestamps, reading values, measurement objects
//! (usable and unusable), name fields in both wire shapes, and whole
//! location hierarchies.

pub mod generators {
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    use crate::domain::{EquipmentSlot, LocationSlot};
    use crate::measure::TimestampField;

    /// Generate a timestamp in epoch milliseconds
    /// Range: 1970-01-01 to 2100-01-01, epoch zero included
    pub fn epoch_millis() -> impl Strategy<Value = i64> {
        prop_oneof![Just(0i64), 0i64..4102444800000i64]
    }

    /// Generate a reading value the platform may report
    pub fn reading_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            (-1_000_000i64..1_000_000i64).prop_map(|n| json!(n)),
            (-1000.0f64..1000.0f64).prop_map(|f| json!(f)),
            Just(json!(0)),
            prop::sample::select(vec!["AUTO", "EXTERNAL", "MANUAL", "OFF"]).prop_map(|s| json!(s)),
            any::<bool>().prop_map(|b| json!(b)),
        ]
    }

    /// Generate a quality tag, absent in roughly a third of cases
    pub fn quality() -> impl Strategy<Value = Option<String>> {
        prop::option::weighted(
            0.66,
            prop::sample::select(vec!["GOOD", "BAD", "UNCERTAIN", "1", "0"]).prop_map(String::from),
        )
    }

    /// Generate a usable measurement object under the given timestamp key
    pub fn usable_measurement(field: TimestampField) -> impl Strategy<Value = Value> {
        (reading_value(), epoch_millis(), quality()).prop_map(move |(value, millis, quality)| {
            let mut object = Map::new();
            object.insert("value".to_string(), value);
            object.insert(field.key().to_string(), json!(millis));
            if let Some(quality) = quality {
                object.insert("quality".to_string(), json!(quality));
            }
            Value::Object(object)
        })
    }

    /// Generate a measurement object that must be treated as absent
    pub fn unusable_measurement(field: TimestampField) -> impl Strategy<Value = Value> {
        let key = field.key();
        prop_oneof![
            // Null value
            epoch_millis().prop_map(move |millis| json!({"value": null, key: millis, "quality": "BAD"})),
            // Missing value
            epoch_millis().prop_map(move |millis| json!({key: millis})),
            // Missing timestamp
            reading_value().prop_map(|value| json!({"value": value, "quality": "GOOD"})),
            // Empty object
            Just(json!({})),
            // Null object
            Just(Value::Null),
        ]
    }

    /// Generate a measurement object that may or may not be usable
    pub fn any_measurement(field: TimestampField) -> BoxedStrategy<Value> {
        prop_oneof![usable_measurement(field), unusable_measurement(field)].boxed()
    }

    /// Generate a display name
    pub fn display_name() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z0-9 _-]{0,24}").expect("Valid regex for display name")
    }

    /// Generate a node identifier
    pub fn node_id() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-z0-9_-]{1,16}").expect("Valid regex for node id")
    }

    /// Wrap a name in either of the platform's two shapes
    pub fn wire_name(name: String) -> impl Strategy<Value = Value> {
        prop_oneof![Just(json!(name.clone())), Just(json!({"value": name}))]
    }

    /// Generate a topology node (`id` plus wire-shaped `name`) and the plain name it carries
    pub fn named_node() -> impl Strategy<Value = (String, String, Value)> {
        (node_id(), display_name()).prop_flat_map(|(id, name)| {
            wire_name(name.clone()).prop_map(move |wire| (id.clone(), name.clone(), wire))
        })
    }

    /// Generate a `GetAllLocations` payload with up to 3 locations, 3 assets and 3 circuits
    pub fn topology_response() -> impl Strategy<Value = Value> {
        let circuit = named_node().prop_map(|(id, _, name)| json!({"id": id, "name": name}));
        let asset = (named_node(), prop::collection::vec(circuit, 0..3))
            .prop_map(|((id, _, name), circuits)| json!({"id": id, "name": name, "circuits": circuits}));
        let location = (named_node(), prop::collection::vec(asset, 0..3))
            .prop_map(|((id, _, name), assets)| json!({"id": id, "name": name, "assets": assets}));

        prop::collection::vec(location, 0..3).prop_map(|locations| json!({"locations": locations}))
    }

    /// Generate an equipment node with every slot populated by `slot`
    fn equipment_node<S>(slot: S) -> impl Strategy<Value = Map<String, Value>>
    where
        S: Strategy<Value = Value> + Clone,
    {
        (node_id(), prop::collection::vec(slot, EquipmentSlot::ALL.len())).prop_map(|(id, values)| {
            let mut node = Map::new();
            node.insert("id".to_string(), json!(id));
            for (slot, value) in EquipmentSlot::ALL.iter().zip(values) {
                node.insert(slot.key().to_string(), value);
            }
            node
        })
    }

    /// Generate a by-id payload whose every slot holds whatever `slot` yields
    fn location_response<S>(slot: S) -> impl Strategy<Value = Value>
    where
        S: Strategy<Value = Value> + Clone,
    {
        let circuit = equipment_node(slot.clone()).prop_map(Value::Object);
        let asset = (equipment_node(slot.clone()), prop::collection::vec(circuit, 0..3)).prop_map(
            |(mut node, circuits)| {
                node.insert("circuits".to_string(), json!(circuits));
                Value::Object(node)
            },
        );

        (
            equipment_node(slot.clone()),
            prop::collection::vec(slot, LocationSlot::ALL.len()),
            prop::collection::vec(asset, 0..3),
        )
            .prop_map(|(mut node, aggregates, assets)| {
                for (slot, value) in LocationSlot::ALL.iter().zip(aggregates) {
                    node.insert(slot.key().to_string(), value);
                }
                node.insert("assets".to_string(), json!(assets));
                json!({"locations": [node]})
            })
    }

    /// Generate a `GetLocationById` payload mixing usable and unusable readings
    pub fn snapshot_response() -> impl Strategy<Value = Value> {
        location_response(any_measurement(TimestampField::Time))
    }

    /// Generate a `GetLocationPropertyHistory` payload with series of mixed entries
    pub fn history_response() -> impl Strategy<Value = Value> {
        let series = prop::collection::vec(any_measurement(TimestampField::Timestamp), 0..5)
            .prop_map(Value::Array)
            .boxed();
        location_response(series)
    }
}
