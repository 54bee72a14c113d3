//! Declarative form validation and normalization.
//!
//! Rules are field-scoped and pure: no network, no clock, no locale. The same
//! input always produces the same outcome. A passing input is returned as a
//! normalized field map ready for the repository (delimited tag strings become
//! arrays, empty optional URLs become absent).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// A single field-level rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Minimum character count for a required text field
    MinLen(usize),
    /// Well-formed absolute URL, or empty string (empty normalizes to absent)
    OptionalUrl,
    /// Well-formed email address
    Email,
    /// Tag list accepted as either a comma-delimited string or a string array
    Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Error)]
#[error("validation failed with {} violation(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violation_for(&self, field: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.field == field)
    }
}

/// Tag input as it arrives from a form: either one delimited string for editing
/// convenience, or an already-split list. Resolved to a canonical `Vec<String>`
/// during validation and never carried past that boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    Joined(String),
    List(Vec<String>),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::Joined(String::new())
    }
}

impl RawTags {
    pub fn resolve(&self) -> Vec<String> {
        match self {
            RawTags::Joined(s) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            RawTags::List(items) => items
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

struct FieldRules {
    name: &'static str,
    rules: Vec<Rule>,
}

/// Declarative validation schema for one entity's form input.
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, name: &'static str, rules: &[Rule]) -> Self {
        self.fields.push(FieldRules {
            name,
            rules: rules.to_vec(),
        });
        self
    }

    /// Validate a form input and produce the normalized field map.
    ///
    /// Fields without rules are not carried into the output; every persisted
    /// field must be declared. Missing fields are treated as empty strings.
    pub fn validate<T: Serialize>(&self, input: &T) -> Result<Map<String, Value>, ValidationError> {
        let raw = match serde_json::to_value(input) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(ValidationError {
                    violations: vec![Violation {
                        field: "_input".to_string(),
                        message: "Input could not be read as a record".to_string(),
                    }],
                })
            }
        };

        let mut normalized = Map::new();
        let mut violations = Vec::new();

        for field in &self.fields {
            let value = raw.get(field.name).cloned().unwrap_or(Value::Null);
            for rule in &field.rules {
                match apply_rule(field.name, *rule, &value) {
                    Ok(Some(out)) => {
                        normalized.insert(field.name.to_string(), out);
                    }
                    Ok(None) => {} // accepted but absent from the payload
                    Err(v) => violations.push(v),
                }
            }
        }

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError { violations })
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns Ok(Some(value)) for a field that belongs in the payload,
/// Ok(None) for an accepted-but-absent field (empty optional URL).
fn apply_rule(name: &str, rule: Rule, value: &Value) -> Result<Option<Value>, Violation> {
    match rule {
        Rule::MinLen(min) => {
            let text = value.as_str().unwrap_or("");
            if text.chars().count() < min {
                Err(Violation {
                    field: name.to_string(),
                    message: format!("{} must be at least {} characters", label(name), min),
                })
            } else {
                Ok(Some(Value::String(text.to_string())))
            }
        }
        Rule::OptionalUrl => {
            let text = value.as_str().unwrap_or("");
            if text.is_empty() {
                Ok(None)
            } else if Url::parse(text).is_ok() {
                Ok(Some(Value::String(text.to_string())))
            } else {
                Err(Violation {
                    field: name.to_string(),
                    message: "Please enter a valid URL".to_string(),
                })
            }
        }
        Rule::Email => {
            let text = value.as_str().unwrap_or("");
            if is_valid_email(text) {
                Ok(Some(Value::String(text.to_string())))
            } else {
                Err(Violation {
                    field: name.to_string(),
                    message: "Please enter a valid email address".to_string(),
                })
            }
        }
        Rule::Tags => {
            let tags = match value {
                Value::String(_) | Value::Array(_) => {
                    match serde_json::from_value::<RawTags>(value.clone()) {
                        Ok(raw) => raw.resolve(),
                        Err(_) => {
                            return Err(Violation {
                                field: name.to_string(),
                                message: format!("{} must be text or a list of text", label(name)),
                            })
                        }
                    }
                }
                Value::Null => Vec::new(),
                _ => {
                    return Err(Violation {
                        field: name.to_string(),
                        message: format!("{} must be text or a list of text", label(name)),
                    })
                }
            };
            let items = tags.into_iter().map(Value::String).collect();
            Ok(Some(Value::Array(items)))
        }
    }
}

/// Field name rendered for humans: "image_url" -> "Image url"
fn label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

fn is_valid_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return false;
    }
    !text.chars().any(char::is_whitespace)
}
