//! Schema introspection.
//!
//! `apoc.meta.data()` reports one row per (label, property) pair. Those rows
//! are folded into one [`SchemaSummary`] per label, which is compact enough
//! to hand to a query-generating agent.

use std::collections::HashMap;

use serde::Deserialize;

use bomgraph_core::{Params, Row, SchemaSummary};

use crate::client::GraphError;
use crate::executor::QueryExecutor;

/// Labels starting with this prefix are database bookkeeping.
pub const RESERVED_LABEL_PREFIX: &str = "_";

/// Meta-data type reported for relationship "properties".
const RELATIONSHIP_TYPE: &str = "RELATIONSHIP";

const SCHEMA_QUERY: &str = "CALL apoc.meta.data() \
     YIELD label, property, type, other, unique, index, elementType \
     WHERE elementType = 'node' \
     RETURN label, property, type, other, unique, index";

/// One row of `apoc.meta.data()` output.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetaEntry {
    pub label: String,
    pub property: String,
    #[serde(rename = "type")]
    pub value_type: String,
    /// Target labels, for relationship entries.
    #[serde(default)]
    pub other: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub index: bool,
}

impl MetaEntry {
    pub fn is_relationship(&self) -> bool {
        self.value_type == RELATIONSHIP_TYPE
    }

    /// Type string with optional ` unique` / ` indexed` suffixes.
    pub fn type_descriptor(&self) -> String {
        let mut descriptor = self.value_type.clone();
        if self.unique {
            descriptor.push_str(" unique");
        }
        if self.index {
            descriptor.push_str(" indexed");
        }
        descriptor
    }
}

impl QueryExecutor {
    /// Fetch and summarize the node schema. Recomputed on every call.
    pub async fn get_schema(&self) -> Result<Vec<SchemaSummary>, GraphError> {
        let rows = self.execute(SCHEMA_QUERY, &Params::new()).await?;
        let entries = rows
            .into_iter()
            .map(decode_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let summaries = summarize(entries);
        tracing::debug!(labels = summaries.len(), "Schema summarized");
        Ok(summaries)
    }
}

fn decode_entry(row: Row) -> Result<MetaEntry, GraphError> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| GraphError::Decode(format!("Unexpected schema row: {e}")))
}

/// Group meta entries by label, in first-seen label order.
///
/// Relationship entries map to their first target label; everything else
/// becomes an attribute. Reserved labels are dropped.
pub fn summarize(entries: impl IntoIterator<Item = MetaEntry>) -> Vec<SchemaSummary> {
    let mut summaries: Vec<SchemaSummary> = Vec::new();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        if entry.label.starts_with(RESERVED_LABEL_PREFIX) {
            continue;
        }

        let idx = *by_label.entry(entry.label.clone()).or_insert_with(|| {
            summaries.push(SchemaSummary::new(entry.label.clone()));
            summaries.len() - 1
        });
        let summary = &mut summaries[idx];

        if entry.is_relationship() {
            let target = entry.other.first().cloned();
            summary.relationships.insert(entry.property, target);
        } else {
            let descriptor = entry.type_descriptor();
            summary.attributes.insert(entry.property, descriptor);
        }
    }

    summaries
}
