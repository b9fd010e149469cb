//! Render a plan against a snapshot.

use serde_json::{Map, Value};

use super::plan::Plan;
use super::snapshot::Snapshot;
use crate::db::Id;
use crate::db::schema::Cardinality;

/// Render row `id` at `plan` as a JSON object, or `null` if it was not loaded.
pub fn render(plan: &Plan, id: Id, snapshot: &Snapshot) -> Value {
    let Some(mut fields) = snapshot.fields(plan.kind, id) else {
        return Value::Null;
    };

    let mut object = Map::new();
    for column in &plan.columns {
        if let Some(value) = fields.remove(*column) {
            object.insert(column.to_string(), value);
        }
    }

    for edge in &plan.children {
        let related = snapshot.related(edge.relation, id);
        let value = match edge.relation.cardinality {
            Cardinality::Many => Value::Array(
                related
                    .into_iter()
                    .map(|child| render(&edge.node, child, snapshot))
                    .collect(),
            ),
            Cardinality::One => related
                .first()
                .map(|child| render(&edge.node, *child, snapshot))
                .unwrap_or(Value::Null),
        };
        object.insert(edge.relation.name.to_string(), value);
    }

    Value::Object(object)
}
