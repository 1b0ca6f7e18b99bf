//! Comparison reports and their renderings

mod indent;
mod text;

pub use indent::Indenter;
pub use text::{TextRenderOptions, render_text};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::compare::{ChangeSet, CrdDiff};
use crate::error::Result;

/// Differences of all compared CRDs, keyed by CRD identifier
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Report {
    pub diffs: BTreeMap<String, CrdDiff>,
}

impl Report {
    pub fn has_changes(&self) -> bool {
        self.diffs.values().any(ChangeSet::has_changes)
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.diffs.values().any(ChangeSet::has_breaking_changes)
    }

    /// Pretty-printed JSON encoding
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid_json() {
        let report = Report::default();
        assert!(!report.has_changes());

        let json = report.to_json().unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, serde_json::json!({"diffs": {}}));
    }

    #[test]
    fn test_json_snapshot() {
        let report = Report {
            diffs: BTreeMap::from([
                ("example.com/Widget".to_string(), CrdDiff::removed()),
                ("example.com/Gadget".to_string(), CrdDiff::added()),
            ]),
        };

        assert!(report.has_breaking_changes());
        insta::assert_snapshot!(report.to_json().unwrap(), @r#"
        {
          "diffs": {
            "example.com/Gadget": {
              "generalChanges": [
                {
                  "breaking": false,
                  "description": "CRD has been added"
                }
              ]
            },
            "example.com/Widget": {
              "generalChanges": [
                {
                  "breaking": true,
                  "description": "CRD has been removed"
                }
              ]
            }
          }
        }
        "#);
    }
}
