//! bomgraph-graph: Read-only access to the BOM supply-chain graph in Neo4j.
//!
//! All queries flow through [`QueryExecutor`], which classifies each
//! statement and refuses writes before the database is contacted. The
//! executor also hosts schema introspection and the fixed supply-chain
//! queries.

pub mod classifier;
pub mod client;
pub mod convert;
pub mod executor;
pub mod projection;
pub mod queries;
pub mod schema;

pub use classifier::{is_write_query, KeywordClassifier, QueryClassifier};
pub use client::{GraphClient, GraphError, QueryRunner};
pub use executor::QueryExecutor;
