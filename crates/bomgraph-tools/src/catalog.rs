//! Tool names, descriptions, and argument schemas advertised to agents.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ToolError;

/// The tools this crate exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetSchema,
    ExecuteReadQuery,
    ProductDependencies,
    SupplierSubstitutions,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        Self::GetSchema,
        Self::ExecuteReadQuery,
        Self::ProductDependencies,
        Self::SupplierSubstitutions,
    ];

    /// Wire name used in tool calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetSchema => "get_schema",
            Self::ExecuteReadQuery => "execute_read_query",
            Self::ProductDependencies => "get_all_product_dependencies_on_supplier",
            Self::SupplierSubstitutions => "get_supplier_substitutions",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GetSchema => {
                "Get the schema of the database: node labels with their attribute types \
                 (annotated 'unique' and 'indexed' where applicable) and the outgoing \
                 relationship types to other labels. Example: \
                 [{\"label\": \"Supplier\", \"attributes\": {\"code\": \"STRING unique indexed\"}, \
                 \"relationships\": {\"SUPPLIES\": \"Item\"}}]"
            }
            Self::ExecuteReadQuery => {
                "Execute a read-only Cypher query and return the rows as a list of maps. \
                 Use named $parameters and pass their values in 'params'. Queries containing \
                 MERGE, CREATE, SET, DELETE, REMOVE or ADD are rejected. Failures come back \
                 as [{\"error\": message}] so the query can be revised and retried."
            }
            Self::ProductDependencies => {
                "Get all products that depend on components from a supplier, with the \
                 dependency chain from each product down to the supplied component, \
                 rendered as 'id(category) <- id(category) ...'."
            }
            Self::SupplierSubstitutions => {
                "Get all products and components from a supplier that other suppliers also \
                 provide, with each alternative supplier's code, tier and sub-type."
            }
        }
    }

    /// JSON Schema of the call arguments.
    pub fn input_schema(&self) -> Value {
        match self {
            Self::GetSchema => json!({
                "type": "object",
                "properties": {}
            }),
            Self::ExecuteReadQuery => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The Cypher query to execute"
                    },
                    "params": {
                        "type": "object",
                        "description": "Values for the query's $parameters; may be omitted"
                    }
                },
                "required": ["query"]
            }),
            Self::ProductDependencies | Self::SupplierSubstitutions => json!({
                "type": "object",
                "properties": {
                    "supplier_code": {
                        "type": "string",
                        "description": "Code uniquely identifying the supplier"
                    }
                },
                "required": ["supplier_code"]
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// A tool registration entry for an agent framework.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Which tools a given agent may call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Toolset {
    /// Every tool.
    #[default]
    All,
    /// Schema plus free-form read queries.
    Database,
    /// Schema plus the fixed supply-chain queries.
    Research,
}

impl Toolset {
    pub fn tools(&self) -> &'static [ToolName] {
        match self {
            Self::All => &ToolName::ALL,
            Self::Database => &[ToolName::GetSchema, ToolName::ExecuteReadQuery],
            Self::Research => &[
                ToolName::GetSchema,
                ToolName::ProductDependencies,
                ToolName::SupplierSubstitutions,
            ],
        }
    }

    pub fn contains(&self, tool: ToolName) -> bool {
        self.tools().contains(&tool)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools().iter().map(ToolName::definition).collect()
    }
}

impl fmt::Display for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Database => "database",
            Self::Research => "research",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        assert!(matches!(
            "drop_database".parse::<ToolName>(),
            Err(ToolError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_toolsets() {
        assert_eq!(Toolset::All.tools().len(), 4);
        assert!(Toolset::Database.contains(ToolName::ExecuteReadQuery));
        assert!(!Toolset::Database.contains(ToolName::SupplierSubstitutions));
        assert!(Toolset::Research.contains(ToolName::ProductDependencies));
        assert!(!Toolset::Research.contains(ToolName::ExecuteReadQuery));
        assert!(Toolset::Research.contains(ToolName::GetSchema));
    }

    #[test]
    fn test_definitions_serialize_for_agents() {
        let defs = serde_json::to_value(Toolset::Database.definitions()).unwrap();
        assert_eq!(defs[0]["name"], "get_schema");
        assert_eq!(defs[1]["name"], "execute_read_query");
        assert_eq!(defs[1]["inputSchema"]["required"], json!(["query"]));
    }
}
