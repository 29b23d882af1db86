//! Canonical unit registry and role-holder directory.
//!
//! The registry is the ordered list of units a run is validated
//! against; its order defines output order. The signer directory holds
//! the sector-wide inspector/secretary and a legacy history of per-unit
//! head assignments. Both are immutable snapshots for the duration of
//! one run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::normalize::loose_unit_key;
use crate::segment::UnitRecordGroup;

/// Unit category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitCategory {
    Primary,
    Secondary,
    Tvet,
}

/// A named signer attached to signature blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHolder {
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

/// One unit in the canonical registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalUnit {
    /// Canonical display name.
    pub name: String,

    /// Position in the registry; defines output order.
    pub ordinal: usize,

    pub category: Option<UnitCategory>,

    /// Head assigned directly in the registry. Wins over any legacy
    /// directory record.
    pub head: Option<RoleHolder>,
}

impl CanonicalUnit {
    /// Loose comparison key for this unit's name.
    #[must_use]
    pub fn key(&self) -> String {
        loose_unit_key(&self.name)
    }
}

/// Registry entry as serialized in YAML (ordinal is positional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<UnitCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_teacher: Option<RoleHolder>,
}

/// The canonical ordered unit registry for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub units: Vec<RegistryEntry>,
}

impl Registry {
    /// Parse a registry from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Units with ordinals assigned from list position.
    #[must_use]
    pub fn canonical_units(&self) -> Vec<CanonicalUnit> {
        self.units
            .iter()
            .enumerate()
            .map(|(ordinal, entry)| CanonicalUnit {
                name: entry.name.clone(),
                ordinal,
                category: entry.category,
                head: entry.head_teacher.clone(),
            })
            .collect()
    }
}

/// A legacy head assignment kept outside the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitHeadRecord {
    pub unit_name: String,
    pub name: String,

    #[serde(default = "default_head_title")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_head_title() -> String {
    "Head Teacher".to_string()
}

fn default_true() -> bool {
    true
}

/// Sector-wide signers plus the legacy per-unit head history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerDirectory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<RoleHolder>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secretary: Option<RoleHolder>,

    #[serde(default)]
    pub unit_heads: Vec<UnitHeadRecord>,
}

impl SignerDirectory {
    /// Parse a signer directory from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// The active legacy head record for a unit name, if any.
    #[must_use]
    pub fn active_head_for(&self, unit_name: &str) -> Option<RoleHolder> {
        let key = loose_unit_key(unit_name);
        self.unit_heads
            .iter()
            .find(|record| record.active && loose_unit_key(&record.unit_name) == key)
            .map(|record| RoleHolder {
                name: record.name.clone(),
                title: record.title.clone(),
                telephone: record.telephone.clone(),
            })
    }
}

/// Resolve the head signer for one unit.
///
/// Precedence: the head assigned in the registry wins; the legacy
/// directory is consulted only when the registry carries none, and only
/// active records count.
#[must_use]
pub fn resolve_unit_head(
    unit: &CanonicalUnit,
    directory: &SignerDirectory,
) -> Option<RoleHolder> {
    if let Some(head) = &unit.head {
        return Some(head.clone());
    }
    directory.active_head_for(&unit.name)
}

/// One registry unit paired with its discovered record group.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedUnit {
    pub unit: CanonicalUnit,
    pub group: UnitRecordGroup,
}

/// Cross-check discovered groups against the registry.
///
/// Every discovered group must match a registry unit by loose key; any
/// miss fails the whole run listing every offending name. Matching
/// pairs come back in registry order. Registry units without data are
/// skipped silently; zero matches is an error of its own.
pub fn match_groups(
    groups: Vec<UnitRecordGroup>,
    units: &[CanonicalUnit],
) -> Result<Vec<MatchedUnit>> {
    let registry_keys: HashMap<String, ()> =
        units.iter().map(|u| (u.key(), ())).collect();

    let unknown: Vec<String> = groups
        .iter()
        .filter(|g| !registry_keys.contains_key(&g.key()))
        .map(|g| g.unit_name.clone())
        .collect();
    if !unknown.is_empty() {
        return Err(IngestError::UnknownUnits { names: unknown });
    }

    let mut groups_by_key: HashMap<String, UnitRecordGroup> = groups
        .into_iter()
        .map(|g| (g.key(), g))
        .collect();

    let mut matched = Vec::new();
    for unit in units {
        if let Some(group) = groups_by_key.remove(&unit.key()) {
            matched.push(MatchedUnit {
                unit: unit.clone(),
                group,
            });
        }
    }

    if matched.is_empty() {
        return Err(IngestError::NoUnitsMatched);
    }

    debug!(matched = matched.len(), "registry match complete");
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;
    use pretty_assertions::assert_eq;

    fn group(name: &str, order: usize) -> UnitRecordGroup {
        UnitRecordGroup {
            unit_name: name.to_string(),
            rows: vec![vec![CellValue::from(name)]],
            first_seen_order: order,
        }
    }

    fn units(names: &[&str]) -> Vec<CanonicalUnit> {
        Registry {
            name: "test".to_string(),
            units: names
                .iter()
                .map(|n| RegistryEntry {
                    name: (*n).to_string(),
                    category: None,
                    head_teacher: None,
                })
                .collect(),
        }
        .canonical_units()
    }

    #[test]
    fn test_registry_from_yaml_with_defaults() {
        let yaml = r"
name: Nyundo Sector
units:
  - name: GS Kigali
    category: Primary
    head_teacher:
      name: Alice Uwase
  - name: Nyamata Secondary
";
        let registry = Registry::from_yaml(yaml).unwrap();
        let canonical = registry.canonical_units();
        assert_eq!(canonical.len(), 2);
        assert_eq!(canonical[0].ordinal, 0);
        assert_eq!(canonical[0].category, Some(UnitCategory::Primary));
        assert_eq!(
            canonical[0].head.as_ref().map(|h| h.name.as_str()),
            Some("Alice Uwase")
        );
        assert_eq!(canonical[1].ordinal, 1);
        assert!(canonical[1].head.is_none());
    }

    #[test]
    fn test_match_groups_registry_order_wins() {
        let registry = units(&["Nyamata Secondary", "GS Kigali"]);
        // Discovery order is the reverse of registry order
        let groups = vec![group("gs kigali", 0), group("NYAMATA SECONDARY", 1)];
        let matched = match_groups(groups, &registry).unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].unit.name, "Nyamata Secondary");
        assert_eq!(matched[1].unit.name, "GS Kigali");
    }

    #[test]
    fn test_match_groups_unknown_unit_fails_listing_all() {
        let registry = units(&["GS Kigali"]);
        let groups = vec![
            group("GS Kigali", 0),
            group("Phantom One", 1),
            group("Phantom Two", 2),
        ];
        let err = match_groups(groups, &registry).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Phantom One"));
        assert!(msg.contains("Phantom Two"));
    }

    #[test]
    fn test_match_groups_registry_units_without_data_skipped() {
        let registry = units(&["GS Kigali", "Nyamata Secondary", "GS Rubavu"]);
        let groups = vec![group("GS Rubavu", 0)];
        let matched = match_groups(groups, &registry).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].unit.name, "GS Rubavu");
    }

    #[test]
    fn test_match_groups_empty_result_is_error() {
        let registry = units(&["GS Kigali"]);
        let err = match_groups(Vec::new(), &registry).unwrap_err();
        assert!(matches!(err, IngestError::NoUnitsMatched));
    }

    #[test]
    fn test_resolve_unit_head_registry_wins() {
        let unit = CanonicalUnit {
            name: "GS Kigali".to_string(),
            ordinal: 0,
            category: None,
            head: Some(RoleHolder {
                name: "Registry Head".to_string(),
                title: "Head Teacher".to_string(),
                telephone: None,
            }),
        };
        let directory = SignerDirectory {
            unit_heads: vec![UnitHeadRecord {
                unit_name: "GS Kigali".to_string(),
                name: "Legacy Head".to_string(),
                title: "Head Teacher".to_string(),
                telephone: None,
                active: true,
            }],
            ..SignerDirectory::default()
        };
        let head = resolve_unit_head(&unit, &directory).unwrap();
        assert_eq!(head.name, "Registry Head");
    }

    #[test]
    fn test_resolve_unit_head_legacy_fallback_active_only() {
        let unit = CanonicalUnit {
            name: "GS Kigali".to_string(),
            ordinal: 0,
            category: None,
            head: None,
        };
        let directory = SignerDirectory {
            unit_heads: vec![
                UnitHeadRecord {
                    unit_name: "gs kigali".to_string(),
                    name: "Former Head".to_string(),
                    title: "Head Teacher".to_string(),
                    telephone: None,
                    active: false,
                },
                UnitHeadRecord {
                    unit_name: "GS KIGALI".to_string(),
                    name: "Current Head".to_string(),
                    title: "Head Teacher".to_string(),
                    telephone: None,
                    active: true,
                },
            ],
            ..SignerDirectory::default()
        };
        let head = resolve_unit_head(&unit, &directory).unwrap();
        assert_eq!(head.name, "Current Head");
    }

    #[test]
    fn test_resolve_unit_head_none_when_unknown() {
        let unit = CanonicalUnit {
            name: "GS Kigali".to_string(),
            ordinal: 0,
            category: None,
            head: None,
        };
        assert!(resolve_unit_head(&unit, &SignerDirectory::default()).is_none());
    }
}
