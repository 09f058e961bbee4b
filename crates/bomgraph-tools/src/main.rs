//! CLI entry point for the bomgraph agent tools.
//!
//! Designed for subprocess invocation from an agent runtime: one-shot
//! subcommands print a JSON list to stdout, and `serve` answers one JSON
//! tool call per stdin line. Logs go to stderr.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use bomgraph_core::{ErrorRecord, Neo4jSettings};
use bomgraph_graph::{GraphClient, QueryExecutor};
use bomgraph_tools::{BomTools, ToolCall, ToolName, Toolset};

#[derive(Parser)]
#[command(name = "bomgraph")]
#[command(about = "Read-only tools over the BOM supply-chain knowledge graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: bomgraph).
    #[arg(short, long, default_value = "bomgraph", global = true)]
    config: String,

    /// Restrict the callable tools to one agent's toolset.
    #[arg(long, value_enum, default_value_t = Toolset::All, global = true)]
    toolset: Toolset,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print node labels with attributes and outgoing relationships.
    Schema,
    /// Run a read-only Cypher query (read from stdin when --query is omitted).
    Query {
        #[arg(short, long)]
        query: Option<String>,
        /// Query parameters as a JSON object.
        #[arg(short, long)]
        params: Option<String>,
    },
    /// Products depending on components from a supplier.
    Dependencies {
        #[arg(long)]
        supplier: String,
    },
    /// Items from a supplier with alternative suppliers.
    Substitutions {
        #[arg(long)]
        supplier: String,
    },
    /// Print the tool catalog for the selected toolset.
    Tools,
    /// Answer newline-delimited JSON tool calls on stdin until EOF.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let rows = match cli.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&cli.toolset.definitions())?);
            return Ok(());
        }
        Command::Schema => {
            let tools = connect(&cli.config, cli.toolset).await?;
            tools.call(ToolName::GetSchema.as_str(), Value::Null).await
        }
        Command::Query { query, params } => {
            let tools = connect(&cli.config, cli.toolset).await?;
            let query = match query {
                Some(q) => q,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            match parse_params(params.as_deref()) {
                Ok(params) => {
                    tools
                        .call(
                            ToolName::ExecuteReadQuery.as_str(),
                            json!({ "query": query, "params": params }),
                        )
                        .await
                }
                Err(e) => ErrorRecord::new(format!("Invalid --params JSON: {e}")).into_rows(),
            }
        }
        Command::Dependencies { supplier } => {
            let tools = connect(&cli.config, cli.toolset).await?;
            tools
                .call(
                    ToolName::ProductDependencies.as_str(),
                    json!({ "supplier_code": supplier }),
                )
                .await
        }
        Command::Substitutions { supplier } => {
            let tools = connect(&cli.config, cli.toolset).await?;
            tools
                .call(
                    ToolName::SupplierSubstitutions.as_str(),
                    json!({ "supplier_code": supplier }),
                )
                .await
        }
        Command::Serve => {
            let tools = connect(&cli.config, cli.toolset).await?;
            serve(&tools).await?;
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string(&rows)?);
    Ok(())
}

/// Load settings and open the shared connection.
///
/// Both failures are fatal: the tools never run against a dead connection.
async fn connect(config: &str, toolset: Toolset) -> anyhow::Result<BomTools> {
    let settings = Neo4jSettings::load(config)?;
    let client = GraphClient::connect(&settings).await?;
    Ok(BomTools::new(QueryExecutor::new(Arc::new(client))).with_toolset(toolset))
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_params(raw: Option<&str>) -> serde_json::Result<Value> {
    match raw {
        Some(text) => serde_json::from_str(text),
        None => Ok(Value::Null),
    }
}

/// One request per line in, one JSON list per line out.
async fn serve(tools: &BomTools) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!(toolset = %tools.toolset(), "Serving tool calls on stdin");

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let rows = match serde_json::from_str::<ToolCall>(trimmed) {
            Ok(call) => tools.dispatch(call).await,
            Err(e) => ErrorRecord::new(format!("Malformed tool call: {e}")).into_rows(),
        };

        let mut out = serde_json::to_vec(&rows)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_subcommand_takes_global_flags() {
        let cli = Cli::try_parse_from(["bomgraph", "tools", "--toolset", "research"]).unwrap();
        assert!(matches!(cli.command, Command::Tools));
        assert_eq!(cli.toolset, Toolset::Research);
        assert_eq!(cli.config, "bomgraph");
    }

    #[test]
    fn test_params_flag() {
        assert_eq!(parse_params(None).unwrap(), Value::Null);
        assert_eq!(parse_params(Some(r#"{"code": "S1"}"#)).unwrap()["code"], "S1");
        assert!(parse_params(Some("{not json")).is_err());
    }
}
