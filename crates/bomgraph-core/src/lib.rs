//! bomgraph-core: Shared types, configuration, and error handling for the BOM graph tools.
//!
//! This crate provides the foundational pieces used by the graph and tool crates:
//! - Row and parameter aliases for query results
//! - Schema summary and domain result records for the supply-chain graph
//! - The in-band error record returned to agents
//! - Connection settings loading

pub mod config;
pub mod error;
pub mod types;

pub use config::Neo4jSettings;
pub use error::ConfigError;
pub use types::{
    render_chain, AltSupplier, ChainLink, DependencyRow, ErrorRecord, Params, Row,
    SchemaSummary, SubstitutionRow,
};
