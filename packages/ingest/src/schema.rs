//! Target schema and column remapping.
//!
//! The target schema is the fixed column layout every output document
//! uses, plus the name of the column that identifies the unit and the
//! signature section configuration. The [`ColumnMapping`] re-projects
//! rows from the uploaded file's layout onto the schema's layout.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::strict;
use crate::sheet::CellValue;

/// Signature role configuration: whether the role signs and under what
/// label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRole {
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub label: String,
}

impl SignatureRole {
    fn with_label(label: &str) -> Self {
        Self {
            enabled: true,
            label: label.to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Signature sections in rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSections {
    #[serde(default = "default_inspector")]
    pub inspector: SignatureRole,

    #[serde(default = "default_secretary")]
    pub secretary: SignatureRole,

    #[serde(default = "default_unit_head")]
    pub unit_head: SignatureRole,
}

fn default_inspector() -> SignatureRole {
    SignatureRole::with_label("Sector Education Inspector")
}

fn default_secretary() -> SignatureRole {
    SignatureRole::with_label("Executive Secretary of the Sector")
}

fn default_unit_head() -> SignatureRole {
    SignatureRole::with_label("Head Teacher")
}

impl Default for SignatureSections {
    fn default() -> Self {
        Self {
            inspector: default_inspector(),
            secretary: default_secretary(),
            unit_head: default_unit_head(),
        }
    }
}

/// The fixed output column layout for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSchema {
    #[serde(default)]
    pub name: String,

    /// Output header row, verbatim and in order.
    pub columns: Vec<String>,

    /// Which column names the unit.
    pub unit_column: String,

    #[serde(default)]
    pub signatures: SignatureSections,
}

impl TargetSchema {
    /// Parse a target schema from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }
}

/// Partial mapping from source column index to target column index.
///
/// At most one target per source; a target index is claimed by at most
/// one source (first match wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pairs: Vec<(usize, usize)>,
    target_width: usize,
}

impl ColumnMapping {
    /// Build a mapping by strict-normalized header equality.
    ///
    /// Unmatched source columns are dropped; unmatched target columns
    /// stay blank in every projected row.
    #[must_use]
    pub fn build(source_headers: &[String], target_headers: &[String]) -> Self {
        let target_keys: Vec<String> = target_headers.iter().map(|h| strict(h)).collect();
        let mut claimed = vec![false; target_headers.len()];
        let mut pairs = Vec::new();

        for (source_index, header) in source_headers.iter().enumerate() {
            let key = strict(header);
            if key.is_empty() {
                continue;
            }
            if let Some(target_index) = target_keys.iter().position(|t| t == &key) {
                if !claimed[target_index] {
                    claimed[target_index] = true;
                    pairs.push((source_index, target_index));
                }
            }
        }

        Self {
            pairs,
            target_width: target_headers.len(),
        }
    }

    /// Mapped (source, target) index pairs in source order.
    #[must_use]
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Project a source row onto the target layout.
    ///
    /// The result always has exactly one cell per target column.
    #[must_use]
    pub fn project(&self, row: &[CellValue]) -> Vec<CellValue> {
        let mut out = vec![CellValue::Empty; self.target_width];
        for &(source_index, target_index) in &self.pairs {
            if let Some(cell) = row.get(source_index) {
                out[target_index] = cell.clone();
            }
        }
        out
    }
}
