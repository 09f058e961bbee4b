//! Error types for the bomgraph-tools crate.

use thiserror::Error;

use crate::catalog::Toolset;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Graph(#[from] bomgraph_graph::GraphError),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool {tool} is not available in the {toolset} toolset")]
    NotInToolset { tool: String, toolset: Toolset },

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}
