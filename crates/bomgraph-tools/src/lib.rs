//! bomgraph-tools: Agent-facing tools over the BOM supply-chain graph.
//!
//! Each tool returns a JSON list. Failures never escape as errors: they are
//! flattened into a one-element list `[{"error": message}]` so the calling
//! agent always receives a well-formed result and can retry with a revised
//! query.

pub mod catalog;
pub mod error;

pub use catalog::{ToolDefinition, ToolName, Toolset};
pub use error::ToolError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bomgraph_core::{ErrorRecord, Params};
use bomgraph_graph::QueryExecutor;

/// Arguments of `execute_read_query`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadQueryArgs {
    query: String,
    #[serde(default)]
    params: Option<Params>,
}

/// Arguments of the supplier tools.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SupplierArgs {
    supplier_code: String,
}

/// A tool invocation as sent by an agent.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The tool façade handed to the agent layer.
///
/// Holds the executor it was constructed with; no global state.
#[derive(Clone)]
pub struct BomTools {
    executor: QueryExecutor,
    toolset: Toolset,
}

impl BomTools {
    /// Create a façade exposing every tool.
    pub fn new(executor: QueryExecutor) -> Self {
        Self {
            executor,
            toolset: Toolset::All,
        }
    }

    /// Restrict [`BomTools::call`] to one agent's toolset.
    pub fn with_toolset(mut self, toolset: Toolset) -> Self {
        self.toolset = toolset;
        self
    }

    pub fn toolset(&self) -> Toolset {
        self.toolset
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.toolset.definitions()
    }

    /// Node labels with attribute types and outgoing relationships.
    pub async fn get_schema(&self) -> Vec<Value> {
        let result = self.executor.get_schema().await.map_err(ToolError::from);
        flatten(ToolName::GetSchema, result)
    }

    /// Run a read-only Cypher query. Omitted parameters mean none.
    pub async fn execute_read_query(&self, query: &str, params: Option<Params>) -> Vec<Value> {
        let params = params.unwrap_or_default();
        let result = self
            .executor
            .execute(query, &params)
            .await
            .map_err(ToolError::from);
        flatten(ToolName::ExecuteReadQuery, result)
    }

    /// Products depending on components from the supplier, with chains.
    pub async fn get_all_product_dependencies_on_supplier(&self, supplier_code: &str) -> Vec<Value> {
        let result = self
            .executor
            .product_dependencies_on_supplier(supplier_code)
            .await
            .map_err(ToolError::from);
        flatten(ToolName::ProductDependencies, result)
    }

    /// Items from the supplier with their alternative suppliers.
    pub async fn get_supplier_substitutions(&self, supplier_code: &str) -> Vec<Value> {
        let result = self
            .executor
            .supplier_substitutions(supplier_code)
            .await
            .map_err(ToolError::from);
        flatten(ToolName::SupplierSubstitutions, result)
    }

    /// Dispatch a tool call by wire name with JSON arguments.
    ///
    /// Unknown tools, tools outside the toolset, and malformed arguments all
    /// produce an error record.
    pub async fn call(&self, name: &str, arguments: Value) -> Vec<Value> {
        let tool = match self.resolve(name) {
            Ok(tool) => tool,
            Err(e) => return error_rows(name, e),
        };

        match tool {
            ToolName::GetSchema => self.get_schema().await,
            ToolName::ExecuteReadQuery => match parse_args::<ReadQueryArgs>(tool, arguments) {
                Ok(args) => self.execute_read_query(&args.query, args.params).await,
                Err(e) => error_rows(name, e),
            },
            ToolName::ProductDependencies => match parse_args::<SupplierArgs>(tool, arguments) {
                Ok(args) => {
                    self.get_all_product_dependencies_on_supplier(&args.supplier_code)
                        .await
                }
                Err(e) => error_rows(name, e),
            },
            ToolName::SupplierSubstitutions => match parse_args::<SupplierArgs>(tool, arguments) {
                Ok(args) => self.get_supplier_substitutions(&args.supplier_code).await,
                Err(e) => error_rows(name, e),
            },
        }
    }

    /// Convenience wrapper over [`BomTools::call`].
    pub async fn dispatch(&self, call: ToolCall) -> Vec<Value> {
        self.call(&call.tool, call.arguments).await
    }

    fn resolve(&self, name: &str) -> Result<ToolName, ToolError> {
        let tool: ToolName = name.parse()?;
        if !self.toolset.contains(tool) {
            return Err(ToolError::NotInToolset {
                tool: name.to_string(),
                toolset: self.toolset,
            });
        }
        Ok(tool)
    }
}

/// Null or absent arguments are read as an empty object.
fn parse_args<T: serde::de::DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Flatten an internal result into the external list shape.
pub fn flatten<T: Serialize>(tool: ToolName, result: Result<Vec<T>, ToolError>) -> Vec<Value> {
    let encoded = result.and_then(|rows| {
        rows.iter()
            .map(|row| serde_json::to_value(row).map_err(ToolError::from))
            .collect::<Result<Vec<_>, _>>()
    });

    match encoded {
        Ok(rows) => rows,
        Err(e) => error_rows(tool.as_str(), e),
    }
}

fn error_rows(tool: &str, error: ToolError) -> Vec<Value> {
    tracing::warn!(tool, error = %error, "Tool call failed");
    ErrorRecord::new(error.to_string()).into_rows()
}
