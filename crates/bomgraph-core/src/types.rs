//! Record types exchanged between the graph layer and the agent tools.
//!
//! Query rows are plain JSON maps so that arbitrary Cypher results can be
//! handed back to an agent untouched. The fixed supply-chain queries decode
//! into the typed records below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One result row: column alias → value, in RETURN-clause order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Named query parameters (`$name` in Cypher).
pub type Params = serde_json::Map<String, serde_json::Value>;

// ── Schema ────────────────────────────────────────────────────────

/// Per-label summary of a node category.
///
/// `attributes` maps property name to a type descriptor such as
/// `"STRING unique indexed"`. `relationships` maps each outgoing
/// relationship type to its target label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaSummary {
    pub label: String,
    pub attributes: BTreeMap<String, String>,
    pub relationships: BTreeMap<String, Option<String>>,
}

impl SchemaSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }
}

// ── Supply Chain ──────────────────────────────────────────────────

/// One node on a dependency path, as projected by the dependency query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainLink {
    /// `sku_id` for items, `code` for suppliers.
    #[serde(default)]
    pub id: Option<String>,
    /// `type` for items, `tier` for suppliers.
    #[serde(default)]
    pub category: Option<String>,
}

impl ChainLink {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            category: Some(category.into()),
        }
    }

    /// Render as `identifier(category)`.
    pub fn render(&self) -> String {
        format!(
            "{}({})",
            self.id.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default()
        )
    }
}

/// Join a path root-to-leaf, e.g. `P1(product) <- C7(component) <- S1(2)`.
pub fn render_chain(links: &[ChainLink]) -> String {
    links
        .iter()
        .map(ChainLink::render)
        .collect::<Vec<_>>()
        .join(" <- ")
}

/// A product that depends, through its bill of materials, on a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyRow {
    pub sku_id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    #[serde(rename = "supplyChainDependencies")]
    pub supply_chain_dependencies: String,
}

/// An alternate source for an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AltSupplier {
    #[serde(rename = "SupplierCode", default)]
    pub code: Option<String>,
    /// Tiers are numeric in some datasets and textual in others.
    #[serde(rename = "supplierTier", default)]
    pub tier: Option<serde_json::Value>,
    #[serde(rename = "supplierSubType", default)]
    pub sub_type: Option<String>,
}

/// An item from a supplier together with the other suppliers that carry it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubstitutionRow {
    pub sku_id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    #[serde(rename = "AltSuppliers", default)]
    pub alt_suppliers: Vec<AltSupplier>,
}

// ── Errors In-Band ────────────────────────────────────────────────

/// The soft-failure record handed to agents instead of raising.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// The one-element result list used at the tool boundary.
    pub fn into_rows(self) -> Vec<serde_json::Value> {
        vec![serde_json::json!({ "error": self.error })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_chain_root_to_leaf() {
        let chain = vec![
            ChainLink::new("P-100", "Product"),
            ChainLink::new("C-7", "Component"),
            ChainLink::new("S1", "2"),
        ];
        assert_eq!(
            render_chain(&chain),
            "P-100(Product) <- C-7(Component) <- S1(2)"
        );
    }

    #[test]
    fn test_render_missing_parts() {
        let link = ChainLink {
            id: Some("X".to_string()),
            category: None,
        };
        assert_eq!(link.render(), "X()");
        assert_eq!(render_chain(&[]), "");
    }

    #[test]
    fn test_substitution_row_wire_names() {
        let row = SubstitutionRow {
            sku_id: Some("C-7".to_string()),
            item_type: Some("Component".to_string()),
            alt_suppliers: vec![AltSupplier {
                code: Some("S2".to_string()),
                tier: Some(serde_json::json!(1)),
                sub_type: Some("Distributor".to_string()),
            }],
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["sku_id"], "C-7");
        assert_eq!(value["type"], "Component");
        assert_eq!(value["AltSuppliers"][0]["SupplierCode"], "S2");
        assert_eq!(value["AltSuppliers"][0]["supplierTier"], 1);
        assert_eq!(value["AltSuppliers"][0]["supplierSubType"], "Distributor");
    }

    #[test]
    fn test_schema_summary_shape() {
        let mut summary = SchemaSummary::new("Supplier");
        summary
            .attributes
            .insert("code".to_string(), "STRING unique indexed".to_string());
        summary
            .relationships
            .insert("SUPPLIES".to_string(), Some("Item".to_string()));

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "label": "Supplier",
                "attributes": {"code": "STRING unique indexed"},
                "relationships": {"SUPPLIES": "Item"}
            })
        );
    }

    #[test]
    fn test_error_record_rows() {
        let rows = ErrorRecord::new("boom").into_rows();
        assert_eq!(rows, vec![serde_json::json!({"error": "boom"})]);
    }
}
