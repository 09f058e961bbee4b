//! Fixed supply-chain queries over the bill-of-materials graph.
//!
//! Graph shape: `(:Item)-[:BOM]->(:Item)` links a component to the assembly
//! it is part of, and `(:Item)-[:AT]->(:Supplier)` links an item to a
//! supplier that provides it.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use bomgraph_core::types::render_chain;
use bomgraph_core::{ChainLink, DependencyRow, Params, Row, SubstitutionRow};

use crate::client::GraphError;
use crate::executor::QueryExecutor;

const DEPENDENCY_QUERY: &str = "MATCH (s:Supplier {code: $code})
     MATCH path = (p:Item)<-[:BOM*]-(comp:Item)-[:AT]->(s)
     RETURN toString(p.sku_id) AS sku_id,
            p.type AS type,
            [n IN nodes(path) | {
               id: toString(coalesce(n.sku_id, n.code)),
               category: toString(coalesce(n.type, n.tier))
            }] AS chain";

const SUBSTITUTION_QUERY: &str = "MATCH (s:Supplier {code: $code})
     MATCH (s)<-[:AT]-(c:Item)-[:AT]->(alt:Supplier)
     WHERE s <> alt
     RETURN toString(c.sku_id) AS sku_id,
            c.type AS type,
            collect({
              SupplierCode: toString(alt.code),
              supplierTier: alt.tier,
              supplierSubType: alt.sub_type
            }) AS AltSuppliers";

/// Separates the chains of a product reachable through several paths.
pub const CHAIN_SEPARATOR: &str = "; ";

/// A dependency path as projected by [`DEPENDENCY_QUERY`].
#[derive(Debug, Deserialize)]
struct DependencyPath {
    sku_id: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    #[serde(default)]
    chain: Vec<ChainLink>,
}

/// Fold paths into one row per `(sku_id, type)`, keeping first-seen order.
///
/// Every path contributes its rendered chain, joined with
/// [`CHAIN_SEPARATOR`] in arrival order.
fn group_by_product(paths: Vec<DependencyPath>) -> Vec<DependencyRow> {
    let mut rows: Vec<DependencyRow> = Vec::new();
    let mut index: HashMap<(Option<String>, Option<String>), usize> = HashMap::new();

    for path in paths {
        let chain = render_chain(&path.chain);
        let key = (path.sku_id, path.item_type);
        match index.get(&key) {
            Some(&i) => {
                let row = &mut rows[i];
                row.supply_chain_dependencies.push_str(CHAIN_SEPARATOR);
                row.supply_chain_dependencies.push_str(&chain);
            }
            None => {
                index.insert(key.clone(), rows.len());
                rows.push(DependencyRow {
                    sku_id: key.0,
                    item_type: key.1,
                    supply_chain_dependencies: chain,
                });
            }
        }
    }

    rows
}

impl QueryExecutor {
    // ── Dependency Chains ────────────────────────────────────────

    /// Every item that depends, through one or more BOM hops, on a component
    /// supplied by `supplier_code`.
    ///
    /// One row per dependent item; an item reached through several paths
    /// carries all of its chains. Each chain reads from the dependent item
    /// down to the supplier. No match yields an empty list.
    pub async fn product_dependencies_on_supplier(
        &self,
        supplier_code: &str,
    ) -> Result<Vec<DependencyRow>, GraphError> {
        let rows = self
            .execute(DEPENDENCY_QUERY, &code_param(supplier_code))
            .await?;
        let paths: Vec<DependencyPath> = decode_rows(rows)?;
        Ok(group_by_product(paths))
    }

    // ── Substitutions ────────────────────────────────────────────

    /// Items from `supplier_code` that at least one other supplier also
    /// provides, with those alternates.
    ///
    /// Alternates are distinguished by node identity, so a second supplier
    /// node carrying the same code still counts.
    pub async fn supplier_substitutions(
        &self,
        supplier_code: &str,
    ) -> Result<Vec<SubstitutionRow>, GraphError> {
        let rows = self
            .execute(SUBSTITUTION_QUERY, &code_param(supplier_code))
            .await?;
        decode_rows(rows)
    }
}

fn code_param(supplier_code: &str) -> Params {
    let mut params = Params::new();
    params.insert(
        "code".to_string(),
        serde_json::Value::String(supplier_code.to_string()),
    );
    params
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, GraphError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| GraphError::Decode(format!("Unexpected result row: {e}")))
        })
        .collect()
}
