//! Structured validation issues mapped to translated messages.
//!
//! A schema validator reports [`ValidationIssue`]s. Each one maps to a
//! message key under the `errors.` namespace plus interpolation parameters;
//! a [`Translator`] turns that into text. Keys follow the shape
//! `errors.<code>[.<kind>][.<variant>]`, e.g. `errors.too_small.string.inclusive`.

use serde::Deserialize;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};

/// Namespace every built-in key lives under.
pub const ERRORS_NAMESPACE: &str = "errors";

/// Namespace for field labels used as message prefixes.
pub const FIELDS_NAMESPACE: &str = "fields";

/// What a size bound applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeKind {
    /// Character count.
    String,
    /// Numeric value.
    Number,
    /// Element count.
    Array,
    /// Element count.
    Set,
    /// Point in time.
    Date,
    /// Big integer value.
    BigInt,
}

impl SizeKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Set => "set",
            Self::Date => "date",
            Self::BigInt => "bigint",
        }
    }
}

/// One validation failure, tagged by `code`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Value had the wrong type. `received == "undefined"` means missing.
    InvalidType {
        /// Expected type name.
        expected: String,
        /// Received type name.
        received: String,
    },
    /// Value below its lower bound.
    TooSmall {
        /// What the bound measures.
        kind: SizeKind,
        /// The bound.
        minimum: Number,
        /// Whether the bound itself is allowed.
        #[serde(default)]
        inclusive: bool,
        /// Whether the value must equal the bound.
        #[serde(default)]
        exact: bool,
    },
    /// Value above its upper bound.
    TooBig {
        /// What the bound measures.
        kind: SizeKind,
        /// The bound.
        maximum: Number,
        /// Whether the bound itself is allowed.
        #[serde(default)]
        inclusive: bool,
        /// Whether the value must equal the bound.
        #[serde(default)]
        exact: bool,
    },
    /// String failed a format check (`email`, `url`, `uuid`, `regex`, ...).
    InvalidString {
        /// Name of the failed check.
        validation: String,
    },
    /// Value outside an enumeration.
    InvalidEnumValue {
        /// Allowed values.
        options: Vec<String>,
        /// Received value.
        #[serde(default)]
        received: String,
    },
    /// Unparseable date.
    InvalidDate,
    /// Number not a multiple of `multiple`.
    NotMultipleOf {
        /// Required divisor.
        multiple: Number,
    },
    /// Object carried keys the schema does not know.
    UnrecognizedKeys {
        /// The extra keys.
        keys: Vec<String>,
    },
    /// No union member matched.
    InvalidUnion,
    /// Application-defined check. `key` overrides the message key.
    Custom {
        /// Full message key, `errors.custom` when absent.
        #[serde(default)]
        key: Option<String>,
        /// Interpolation parameters.
        #[serde(default)]
        params: BTreeMap<String, String>,
    },
}

/// A validation issue located at a field path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldIssue {
    /// Path segments from the form root (`["address", "zip"]`).
    #[serde(default)]
    pub path: Vec<String>,
    /// The failure.
    #[serde(flatten)]
    pub issue: ValidationIssue,
}

/// Message key plus interpolation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedMessage {
    /// Fully qualified key.
    pub key: String,
    /// `{{name}}` substitutions.
    pub params: BTreeMap<String, String>,
}

impl TranslatedMessage {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: BTreeMap::new(),
        }
    }

    fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }
}

fn bound_variant(inclusive: bool, exact: bool) -> &'static str {
    match (exact, inclusive) {
        (true, _) => "exact",
        (false, true) => "inclusive",
        (false, false) => "not_inclusive",
    }
}

impl ValidationIssue {
    /// Message key and parameters for this issue.
    pub fn message(&self) -> TranslatedMessage {
        let key = |rest: &str| format!("{ERRORS_NAMESPACE}.{rest}");
        match self {
            Self::InvalidType { received, .. } if received == "undefined" => {
                TranslatedMessage::new(key("invalid_type_received_undefined"))
            }
            Self::InvalidType { expected, received } => TranslatedMessage::new(key("invalid_type"))
                .with("expected", expected)
                .with("received", received),
            Self::TooSmall {
                kind,
                minimum,
                inclusive,
                exact,
            } => TranslatedMessage::new(key(&format!(
                "too_small.{}.{}",
                kind.as_str(),
                bound_variant(*inclusive, *exact)
            )))
            .with("minimum", minimum),
            Self::TooBig {
                kind,
                maximum,
                inclusive,
                exact,
            } => TranslatedMessage::new(key(&format!(
                "too_big.{}.{}",
                kind.as_str(),
                bound_variant(*inclusive, *exact)
            )))
            .with("maximum", maximum),
            Self::InvalidString { validation } => {
                TranslatedMessage::new(key(&format!("invalid_string.{validation}")))
                    .with("validation", validation)
            }
            Self::InvalidEnumValue { options, received } => {
                TranslatedMessage::new(key("invalid_enum_value"))
                    .with("options", options.join(" | "))
                    .with("received", received)
            }
            Self::InvalidDate => TranslatedMessage::new(key("invalid_date")),
            Self::NotMultipleOf { multiple } => {
                TranslatedMessage::new(key("not_multiple_of")).with("multipleOf", multiple)
            }
            Self::UnrecognizedKeys { keys } => {
                TranslatedMessage::new(key("unrecognized_keys")).with("keys", keys.join(", "))
            }
            Self::InvalidUnion => TranslatedMessage::new(key("invalid_union")),
            Self::Custom { key: custom, params } => TranslatedMessage {
                key: custom.clone().unwrap_or_else(|| key("custom")),
                params: params.clone(),
            },
        }
    }
}

/// Looks up message templates by key.
pub trait Translator {
    /// Template for `key`, if known.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Render `message`. Unknown keys render as the key itself.
    fn translate(&self, message: &TranslatedMessage) -> String {
        match self.lookup(&message.key) {
            Some(template) => interpolate(template, &message.params),
            None => message.key.clone(),
        }
    }
}

/// Replace `{{name}}` placeholders. Unknown names are left as written.
pub fn interpolate(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// In-memory message catalog keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    /// Build from a nested JSON object; nested keys are joined with `.`.
    ///
    /// Non-string leaves are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        catalog.flatten("", &value);
        Ok(catalog)
    }

    fn flatten(&mut self, prefix: &str, value: &Value) {
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    self.flatten(&key, v);
                }
            }
            Value::String(s) if !prefix.is_empty() => self.insert(prefix, s.clone()),
            _ => {}
        }
    }

    /// Number of translated keys.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the catalog has no keys.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Translator for Catalog {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

/// Render `issue`, optionally prefixed with its field label.
///
/// The label is `fields.<dotted path>` from the translator, falling back to
/// the dotted path itself.
pub fn format_issue(translator: &impl Translator, issue: &FieldIssue, with_path: bool) -> String {
    let message = translator.translate(&issue.issue.message());
    if !with_path || issue.path.is_empty() {
        return message;
    }
    let path = issue.path.join(".");
    let label_key = format!("{FIELDS_NAMESPACE}.{path}");
    let label = translator.lookup(&label_key).unwrap_or(&path);
    format!("{label}: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{
                "errors": {
                    "invalid_type": "Expected {{expected}}, received {{received}}",
                    "invalid_type_received_undefined": "Required",
                    "too_small": {
                        "string": {
                            "inclusive": "Must contain at least {{minimum}} character(s)",
                            "exact": "Must contain exactly {{minimum}} character(s)"
                        }
                    },
                    "invalid_enum_value": "Expected {{options}}, received '{{received}}'"
                },
                "fields": { "user": { "email": "Email address" } },
                "version": 3
            }"#,
        )
        .unwrap()
    }

    fn issue(json: &str) -> ValidationIssue {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_value_maps_to_required_key() {
        let msg = issue(r#"{"code":"invalid_type","expected":"string","received":"undefined"}"#)
            .message();
        assert_eq!(msg.key, "errors.invalid_type_received_undefined");
        assert!(msg.params.is_empty());
    }

    #[test]
    fn wrong_type_carries_both_types() {
        let msg = issue(r#"{"code":"invalid_type","expected":"number","received":"string"}"#);
        assert_eq!(catalog().translate(&msg.message()), "Expected number, received string");
    }

    #[test]
    fn size_bounds_select_variant_key() {
        let cases = [
            (r#"{"code":"too_small","kind":"string","minimum":3,"inclusive":true}"#, "errors.too_small.string.inclusive"),
            (r#"{"code":"too_small","kind":"array","minimum":1}"#, "errors.too_small.array.not_inclusive"),
            (r#"{"code":"too_big","kind":"number","maximum":10,"inclusive":true,"exact":true}"#, "errors.too_big.number.exact"),
            (r#"{"code":"too_big","kind":"bigint","maximum":99}"#, "errors.too_big.bigint.not_inclusive"),
        ];
        for (json, key) in cases {
            assert_eq!(issue(json).message().key, key, "{json}");
        }
    }

    #[test]
    fn size_bound_is_interpolated() {
        let msg = issue(r#"{"code":"too_small","kind":"string","minimum":8,"inclusive":true}"#);
        assert_eq!(
            catalog().translate(&msg.message()),
            "Must contain at least 8 character(s)"
        );
    }

    #[test]
    fn string_format_key_includes_validation() {
        let msg = issue(r#"{"code":"invalid_string","validation":"email"}"#).message();
        assert_eq!(msg.key, "errors.invalid_string.email");
    }

    #[test]
    fn enum_options_are_joined() {
        let msg = issue(r#"{"code":"invalid_enum_value","options":["new","read"],"received":"x"}"#);
        assert_eq!(catalog().translate(&msg.message()), "Expected new | read, received 'x'");
    }

    #[test]
    fn remaining_codes_map_to_flat_keys() {
        assert_eq!(ValidationIssue::InvalidDate.message().key, "errors.invalid_date");
        assert_eq!(ValidationIssue::InvalidUnion.message().key, "errors.invalid_union");
        let msg = issue(r#"{"code":"not_multiple_of","multiple":5}"#).message();
        assert_eq!(msg.key, "errors.not_multiple_of");
        assert_eq!(msg.params["multipleOf"], "5");
        let msg = issue(r#"{"code":"unrecognized_keys","keys":["a","b"]}"#).message();
        assert_eq!(msg.params["keys"], "a, b");
    }

    #[test]
    fn custom_issue_uses_its_own_key() {
        let msg = issue(r#"{"code":"custom","key":"form.password_mismatch","params":{"n":"2"}}"#)
            .message();
        assert_eq!(msg.key, "form.password_mismatch");
        assert_eq!(msg.params["n"], "2");
        assert_eq!(issue(r#"{"code":"custom"}"#).message().key, "errors.custom");
    }

    #[test]
    fn untranslated_key_falls_back_to_key() {
        let msg = ValidationIssue::InvalidDate.message();
        assert_eq!(catalog().translate(&msg), "errors.invalid_date");
    }

    #[test]
    fn interpolate_leaves_unknown_and_unterminated_placeholders() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), "1".to_string());
        assert_eq!(interpolate("{{a}}-{{ b }}-{{a", &params), "1-{{ b }}-{{a");
        assert_eq!(interpolate("{{ a }}", &params), "1");
    }

    #[test]
    fn catalog_ignores_non_string_leaves() {
        let catalog = catalog();
        assert_eq!(catalog.lookup("version"), None);
        assert_eq!(catalog.lookup("fields.user.email"), Some("Email address"));
    }

    #[test]
    fn format_issue_prefixes_field_label() {
        let field: FieldIssue = serde_json::from_str(
            r#"{"path":["user","email"],"code":"invalid_type","expected":"string","received":"undefined"}"#,
        )
        .unwrap();
        let catalog = catalog();
        assert_eq!(format_issue(&catalog, &field, true), "Email address: Required");
        assert_eq!(format_issue(&catalog, &field, false), "Required");

        let unlabeled = FieldIssue {
            path: vec!["age".into()],
            issue: ValidationIssue::InvalidDate,
        };
        assert_eq!(format_issue(&catalog, &unlabeled, true), "age: errors.invalid_date");
    }
}
