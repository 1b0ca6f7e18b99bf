//! Turning checker findings into breaking changes

use serde_json::Value;

use super::types::{BreakingChange, BreakingChangeDetails, Limit};
use crate::checker::{Finding, FindingMessage};

/// Record every finding as a breaking change, keeping their order
pub(crate) fn correlate(findings: Vec<Finding>) -> Vec<BreakingChange> {
    findings
        .into_iter()
        .map(|finding| BreakingChange {
            details: details(finding.message),
            id: finding.id,
            level: finding.level,
        })
        .collect()
}

fn details(message: FindingMessage) -> BreakingChangeDetails {
    match message {
        FindingMessage::Text(text) => BreakingChangeDetails::Text(text),
        FindingMessage::Localized { key, args } => {
            disect(&key, &args).unwrap_or(BreakingChangeDetails::Message { key, args })
        }
    }
}

/// Structured details for a known message key
///
/// Returns `None` for unknown keys and for arguments of the wrong shape.
fn disect(key: &str, args: &[Value]) -> Option<BreakingChangeDetails> {
    use BreakingChangeDetails::*;

    let path = || string(args.first()?);

    let details = match key {
        "new-required-request-property" => NewRequiredProperty { path: path()? },
        "request-property-became-required" => PropertyBecameRequired { path: path()? },
        "request-property-removed" => PropertyRemoved { path: path()? },
        "request-property-became-enum" => PropertyBecameEnum { path: path()? },
        "request-property-became-not-nullable" => PropertyBecameNotNullable { path: path()? },
        "request-property-type-changed" => TypeChanged {
            path: path()?,
            from: type_name(args.get(1)?),
            to: type_name(args.get(2)?),
        },
        "request-property-enum-value-removed" => EnumValueRemoved {
            path: path()?,
            value: args.get(1)?.clone(),
        },
        "request-property-pattern-added" => PatternAdded {
            path: path()?,
            pattern: string(args.get(1)?)?,
        },
        "request-property-pattern-changed" => PatternChanged {
            path: path()?,
            from: string(args.get(1)?)?,
            to: string(args.get(2)?)?,
        },
        _ => {
            let (limit, change) = limit_key(key)?;
            match change {
                "set" => LimitSet {
                    path: path()?,
                    limit,
                    value: number(args.get(1)?)?,
                },
                _ => LimitChanged {
                    path: path()?,
                    limit,
                    from: number(args.get(1)?)?,
                    to: number(args.get(2)?)?,
                },
            }
        }
    };

    Some(details)
}

/// Split keys like `request-property-max-length-decreased` into limit and change
fn limit_key(key: &str) -> Option<(Limit, &str)> {
    let rest = key.strip_prefix("request-property-")?;
    let (name, change) = rest.rsplit_once('-')?;

    let limit = match name {
        "max-length" => Limit::MaxLength,
        "min-length" => Limit::MinLength,
        "max-items" => Limit::MaxItems,
        "min-items" => Limit::MinItems,
        "max" => Limit::Maximum,
        "min" => Limit::Minimum,
        _ => return None,
    };

    matches!(change, "set" | "increased" | "decreased").then_some((limit, change))
}

fn string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Numbers, also accepting numeric strings
fn number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => s.parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

/// Type names; an absent type is shown as "any"
fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "any".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Level;
    use serde_json::json;

    fn localized(key: &str, args: Vec<Value>) -> Finding {
        Finding {
            id: key.to_string(),
            level: Level::Error,
            message: FindingMessage::Localized {
                key: key.to_string(),
                args,
            },
        }
    }

    #[test]
    fn test_known_keys_become_structured() {
        let changes = correlate(vec![
            localized("new-required-request-property", vec![json!(".spec.replicas")]),
            localized(
                "request-property-type-changed",
                vec![json!(".spec.port"), json!("string"), json!(null)],
            ),
            localized(
                "request-property-min-items-increased",
                vec![json!(".spec.list"), json!("1"), json!(2)],
            ),
        ]);

        assert_eq!(
            changes[0].details,
            BreakingChangeDetails::NewRequiredProperty {
                path: ".spec.replicas".to_string()
            }
        );
        assert_eq!(
            changes[1].details.to_string(),
            "changed type of .spec.port from string to any"
        );
        assert_eq!(
            changes[2].details,
            BreakingChangeDetails::LimitChanged {
                path: ".spec.list".to_string(),
                limit: Limit::MinItems,
                from: json!(1),
                to: json!(2),
            }
        );
    }

    #[test]
    fn test_limit_keys() {
        assert_eq!(
            limit_key("request-property-max-length-set"),
            Some((Limit::MaxLength, "set"))
        );
        assert_eq!(
            limit_key("request-property-min-increased"),
            Some((Limit::Minimum, "increased"))
        );
        assert_eq!(limit_key("request-property-max-length-grew"), None);
        assert_eq!(limit_key("response-property-max-set"), None);
    }

    #[test]
    fn test_unknown_and_malformed_keep_raw_message() {
        let changes = correlate(vec![
            localized("request-property-exploded", vec![json!(".spec")]),
            localized("request-property-removed", vec![json!(42)]),
        ]);

        assert_eq!(
            changes[0].details,
            BreakingChangeDetails::Message {
                key: "request-property-exploded".to_string(),
                args: vec![json!(".spec")],
            }
        );
        assert!(matches!(changes[1].details, BreakingChangeDetails::Message { .. }));
    }

    #[test]
    fn test_text_is_kept() {
        let changes = correlate(vec![Finding {
            id: "request-property-composition-changed".to_string(),
            level: Level::Warning,
            message: FindingMessage::Text("changed oneOf".to_string()),
        }]);

        assert_eq!(changes[0].level, Level::Warning);
        assert_eq!(changes[0].details, BreakingChangeDetails::Text("changed oneOf".to_string()));
    }
}
