//! Message translation for form validation.

pub mod validation;

pub use validation::{
    format_issue, Catalog, FieldIssue, SizeKind, TranslatedMessage, Translator, ValidationIssue,
};
