//! Neo4j connection management and the query runner seam.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};

use bomgraph_core::{Neo4jSettings, Params, Row};

use crate::convert::build_query;
use crate::projection::{order_columns, return_columns};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Write queries are not supported: {query}")]
    WriteRejected { query: String },

    #[error("Failed to decode result: {0}")]
    Decode(String),
}

impl GraphError {
    pub fn is_write_rejected(&self) -> bool {
        matches!(self, Self::WriteRejected { .. })
    }
}

/// Runs query text with bound parameters and returns raw rows.
///
/// This is the only capability the rest of the crate needs from a database
/// connection. `GraphClient` is the production implementation; tests supply
/// their own.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, query: &str, params: &Params) -> Result<Vec<Row>, GraphError>;
}

/// Thread-safe Neo4j graph client.
///
/// One instance is created at process start and shared for the process
/// lifetime. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j and verify the server answers before returning.
    ///
    /// There is no retry: an unreachable database fails construction.
    pub async fn connect(settings: &Neo4jSettings) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&settings.uri)
            .user(&settings.username)
            .password(&settings.password)
            .max_connections(settings.max_connections as usize)
            .fetch_size(settings.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let client = Self { graph };
        client.verify_connectivity().await?;

        tracing::info!(uri = %settings.uri, "Connected to Neo4j");
        Ok(client)
    }

    /// Round-trip a trivial statement to prove the server is reachable and
    /// the credentials are accepted.
    pub async fn verify_connectivity(&self) -> Result<(), GraphError> {
        let row = self
            .query_one(neo4rs::query("RETURN 1 AS ok"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        match row {
            Some(_) => Ok(()),
            None => Err(GraphError::Connection(
                "connectivity check returned no rows".to_string(),
            )),
        }
    }

    /// Get a reference to the underlying neo4rs Graph for direct operations.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }

    /// Execute a query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }
}

#[async_trait]
impl QueryRunner for GraphClient {
    async fn run(&self, query: &str, params: &Params) -> Result<Vec<Row>, GraphError> {
        let rows = self.query_rows(build_query(query, params)).await?;
        let columns = return_columns(query);
        rows.iter().map(|row| row_to_map(row, &columns)).collect()
    }
}

/// Convert a neo4rs row into a JSON map keyed in `columns` order.
///
/// neo4rs keeps row fields in a hash map, so the order has to be restored
/// from the query's projection.
fn row_to_map(row: &neo4rs::Row, columns: &[String]) -> Result<Row, GraphError> {
    let map = row
        .to::<Row>()
        .map_err(|e| GraphError::Decode(format!("Failed to deserialize row: {e}")))?;
    Ok(order_columns(map, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltInteger, BoltList, BoltString, BoltType};

    fn bolt_row(fields: &[&str]) -> neo4rs::Row {
        let mut names = BoltList::with_capacity(fields.len());
        let mut values = BoltList::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            names.push(BoltType::String(BoltString::new(field)));
            values.push(BoltType::Integer(BoltInteger::new(i as i64)));
        }
        neo4rs::Row::new(names, values)
    }

    #[test]
    fn test_row_keeps_return_order() {
        let fields = ["z", "y", "x", "w", "v", "u", "t", "s"];
        let query = "RETURN 0 AS z, 1 AS y, 2 AS x, 3 AS w, 4 AS v, 5 AS u, 6 AS t, 7 AS s";
        let row = bolt_row(&fields);

        let map = row_to_map(&row, &return_columns(query)).unwrap();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, fields);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(map[*field], i as i64);
        }
    }

    #[test]
    fn test_unnamed_columns_sort_after_projection() {
        let row = bolt_row(&["b", "a", "c"]);

        let map = row_to_map(&row, &["c".to_string()]).unwrap();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }
}
