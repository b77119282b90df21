use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use super::error::PlatformError;
use super::platform::{property_set_message, HistoryQuery, PlatformClient};
use telemetry_gateway::shared::activation::{ActivationRecord, ActivationStatus, TargetType};
use telemetry_gateway::shared::time::Clock;
use telemetry_gateway::shared::transform::{parse_response, RawObject};

/// Upper bound on generated history points per slot (one day at 5 minutes)
pub const MAX_HISTORY_POINTS: i64 = 288;

const QUALITY_GOOD: &str = "GOOD";

#[derive(Debug, Clone, Copy)]
enum Fixture {
    Number(f64),
    Text(&'static str),
}

struct Node {
    id: &'static str,
    name: &'static str,
    readings: &'static [(&'static str, Fixture)],
    children: &'static [Node],
}

use Fixture::{Number, Text};

const CIRCUITS: &[Node] = &[
    Node {
        id: "circuit-s1",
        name: "Water Circuit S1",
        readings: &[
            ("tempsp", Number(7.0)),
            ("temp", Number(6.9)),
            ("power", Number(8.5)),
            ("availability", Number(1.0)),
            ("status", Number(1.0)),
        ],
        children: &[],
    },
    Node {
        id: "circuit-s2",
        name: "Ambient Sensor Zone 1",
        readings: &[
            ("temp", Number(13.4)),
            ("humidity", Number(45.2)),
            ("quality", Number(1.0)),
        ],
        children: &[],
    },
    Node {
        id: "circuit-s3",
        name: "Ambient Sensor Zone 2",
        readings: &[
            ("temp", Number(13.6)),
            ("humidity", Number(46.1)),
            ("quality", Number(1.0)),
        ],
        children: &[],
    },
];

const ASSETS: &[Node] = &[
    Node {
        id: "chiller-001",
        name: "Trane Chiller System",
        readings: &[
            ("tempsp", Number(7.0)),
            ("deltatempsp", Number(0.5)),
            ("temp", Number(6.8)),
            ("power", Number(15.2)),
            ("humidity", Number(45.5)),
            ("quality", Number(1.0)),
            ("availability", Number(1.0)),
            ("operation_mode", Text("EXTERNAL")),
            ("status", Number(1.0)),
        ],
        children: CIRCUITS,
    },
    Node {
        id: "pv-001",
        name: "Solar Panels",
        readings: &[("power", Number(-3.4)), ("status", Number(1.0))],
        children: &[],
    },
];

const LOCATIONS: &[Node] = &[Node {
    id: "icepark-001",
    name: "IcePark Angers",
    readings: &[
        ("grid_power", Number(23.5)),
        ("aggregated_power", Number(20.1)),
        ("local_generated_power", Number(-3.4)),
    ],
    children: ASSETS,
}];

/// Key holding the children of a node at `depth`
fn children_key(depth: usize) -> &'static str {
    match depth {
        0 => "assets",
        _ => "circuits",
    }
}

fn topology_node(node: &Node, depth: usize) -> Value {
    // The platform wraps location and asset names; circuit names come bare
    let name = if depth < 2 {
        json!({ "value": node.name })
    } else {
        json!(node.name)
    };

    let mut object = Map::new();
    object.insert("id".to_string(), json!(node.id));
    object.insert("name".to_string(), name);
    if depth < 2 {
        let children: Vec<Value> = node
            .children
            .iter()
            .map(|child| topology_node(child, depth + 1))
            .collect();
        object.insert(children_key(depth).to_string(), Value::Array(children));
    }

    Value::Object(object)
}

fn readings_node<F>(node: &Node, depth: usize, reading: &F) -> Value
where
    F: Fn(Fixture) -> Value,
{
    let mut object = Map::new();
    object.insert("id".to_string(), json!(node.id));
    for (key, fixture) in node.readings {
        object.insert(key.to_string(), reading(*fixture));
    }
    if depth < 2 {
        let children: Vec<Value> = node
            .children
            .iter()
            .map(|child| readings_node(child, depth + 1, reading))
            .collect();
        object.insert(children_key(depth).to_string(), Value::Array(children));
    }

    Value::Object(object)
}

fn fixture_value(fixture: Fixture, step: i64) -> Value {
    match fixture {
        Number(base) => {
            let drifted = ((base + step as f64 * 0.1) * 100.0).round() / 100.0;
            json!(drifted)
        }
        Text(text) => json!(text),
    }
}

/// Sample instants covering `[from, to]` at `frequency_seconds`, newest last
///
/// The series always ends at `to`; it is truncated from the front once it
/// would exceed [`MAX_HISTORY_POINTS`].
pub fn sample_instants(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    frequency_seconds: i64,
) -> Vec<DateTime<Utc>> {
    if to < from || frequency_seconds <= 0 {
        return Vec::new();
    }

    let span = (to - from).num_seconds();
    let count = (span / frequency_seconds + 1).min(MAX_HISTORY_POINTS);

    (0..count)
        .rev()
        .map(|back| to - Duration::seconds(back * frequency_seconds))
        .collect()
}

/// Platform stand-in serving raw fixtures for one ice park
///
/// Every payload has the platform's wire shape, so mock responses exercise
/// the same transform path as live ones.
#[derive(Clone)]
pub struct MockPlatform {
    clock: Arc<dyn Clock>,
}

impl MockPlatform {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn find_location(location_id: &str) -> Option<&'static Node> {
        LOCATIONS.iter().find(|location| location.id == location_id)
    }

    fn wrap(locations: Vec<Value>) -> Result<RawObject, PlatformError> {
        Ok(parse_response(json!({ "locations": locations }))?)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn get_all_locations(&self) -> Result<RawObject, PlatformError> {
        Self::wrap(
            LOCATIONS
                .iter()
                .map(|location| topology_node(location, 0))
                .collect(),
        )
    }

    async fn get_location_by_id(&self, location_id: &str) -> Result<RawObject, PlatformError> {
        let Some(location) = Self::find_location(location_id) else {
            return Self::wrap(Vec::new());
        };

        let time = self.clock.now_epoch_millis();
        let reading = |fixture: Fixture| {
            json!({
                "value": fixture_value(fixture, 0),
                "time": time,
                "quality": QUALITY_GOOD,
            })
        };

        Self::wrap(vec![readings_node(location, 0, &reading)])
    }

    async fn get_location_property_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<RawObject, PlatformError> {
        let Some(location) = Self::find_location(&query.location_id) else {
            return Self::wrap(Vec::new());
        };

        let instants = sample_instants(query.from, query.to, query.frequency_seconds);
        let series = |fixture: Fixture| {
            let points: Vec<Value> = instants
                .iter()
                .zip(0i64..)
                .map(|(instant, step)| {
                    json!({
                        "value": fixture_value(fixture, step),
                        "timestamp": instant.timestamp_millis(),
                        "quality": QUALITY_GOOD,
                    })
                })
                .collect();
            Value::Array(points)
        };

        Self::wrap(vec![readings_node(location, 0, &series)])
    }

    async fn set_property(
        &self,
        _thing_id: &str,
        property: &str,
        value: &Value,
    ) -> Result<String, PlatformError> {
        Ok(property_set_message(property, value))
    }

    async fn list_activations(&self) -> Result<Vec<ActivationRecord>, PlatformError> {
        let now = self.now();
        let stamp = |offset_minutes: i64| {
            (now + Duration::minutes(offset_minutes)).to_rfc3339_opts(SecondsFormat::Secs, true)
        };

        Ok(vec![
            ActivationRecord {
                id: "act-001".to_string(),
                target_id: "circuit-s1".to_string(),
                target_type: TargetType::Circuit,
                requested_start_time: stamp(-5),
                requested_end_time: stamp(10),
                actual_start_time: Some(stamp(-5)),
                actual_end_time: None,
                setpoint: Some(7.5),
                delta_setpoint: 0.5,
                activation_status: ActivationStatus::Active,
            },
            ActivationRecord {
                id: "act-002".to_string(),
                target_id: "chiller-001".to_string(),
                target_type: TargetType::Asset,
                requested_start_time: stamp(-24 * 60),
                requested_end_time: stamp(-24 * 60 + 15),
                actual_start_time: Some(stamp(-24 * 60)),
                actual_end_time: Some(stamp(-24 * 60 + 15)),
                setpoint: None,
                delta_setpoint: -1.0,
                activation_status: ActivationStatus::Completed,
            },
        ])
    }
}
