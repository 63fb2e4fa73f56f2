//! Kubernetes object metadata validators
//!
//! Names, namespaces, label and annotation keys follow the apimachinery
//! rules (RFC 1123 names, qualified names). Each check returns the list of
//! problems found; an empty list means the value is valid.

use plugin_framework::{AttributePath, AttributeValidator, Diagnostics, coerce};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const DNS1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const QUALIFIED_NAME_FMT: &str = "([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]";

pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
pub const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
pub const LABEL_VALUE_MAX_LENGTH: usize = 63;

/// Total size limit of all annotation keys and values
pub const TOTAL_ANNOTATION_SIZE_LIMIT: usize = 256 * 1024;

static DNS1123_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{DNS1123_LABEL_FMT}$")).expect("valid DNS-1123 label regex"));

static DNS1123_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DNS1123_LABEL_FMT}(\\.{DNS1123_LABEL_FMT})*$"))
        .expect("valid DNS-1123 subdomain regex")
});

static QUALIFIED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{QUALIFIED_NAME_FMT}$")).expect("valid qualified name regex"));

/// Problems with `value` as a lowercase RFC 1123 label (namespaces)
pub fn dns1123_label_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        errors.push(format!("must be no more than {DNS1123_LABEL_MAX_LENGTH} characters"));
    }
    if !DNS1123_LABEL_RE.is_match(value) {
        errors.push(format!(
            "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character (e.g. 'my-name', or '123-abc', regex used for validation is '{DNS1123_LABEL_FMT}')"
        ));
    }
    errors
}

/// Problems with `value` as a lowercase RFC 1123 subdomain (object names)
pub fn dns1123_subdomain_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        errors.push(format!("must be no more than {DNS1123_SUBDOMAIN_MAX_LENGTH} characters"));
    }
    if !DNS1123_SUBDOMAIN_RE.is_match(value) {
        errors.push(format!(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character (e.g. 'example.com', regex used for validation is '{DNS1123_LABEL_FMT}(\\.{DNS1123_LABEL_FMT})*')"
        ));
    }
    errors
}

/// Problems with `value` as a qualified name (`[prefix/]name`), the format
/// of label and annotation keys
pub fn qualified_name_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let parts: Vec<&str> = value.split('/').collect();
    let name = match parts.as_slice() {
        [name] => *name,
        [prefix, name] => {
            if prefix.is_empty() {
                errors.push("prefix part must be non-empty".to_string());
            } else {
                errors.extend(
                    dns1123_subdomain_errors(prefix)
                        .into_iter()
                        .map(|e| format!("prefix part {e}")),
                );
            }
            *name
        }
        _ => {
            errors.push(format!(
                "a qualified name must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyName', or 'my.name', or '123-abc', regex used for validation is '{QUALIFIED_NAME_FMT}') with an optional DNS subdomain prefix and '/' (e.g. 'example.com/MyName')"
            ));
            return errors;
        }
    };

    if name.is_empty() {
        errors.push("name part must be non-empty".to_string());
    } else if name.len() > QUALIFIED_NAME_MAX_LENGTH {
        errors.push(format!("name part must be no more than {QUALIFIED_NAME_MAX_LENGTH} characters"));
    }
    if !name.is_empty() && !QUALIFIED_NAME_RE.is_match(name) {
        errors.push(format!(
            "name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyName', or 'my.name', or '123-abc', regex used for validation is '{QUALIFIED_NAME_FMT}')"
        ));
    }
    errors
}

/// Problems with `value` as a label value (empty allowed)
pub fn label_value_errors(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > LABEL_VALUE_MAX_LENGTH {
        errors.push(format!("must be no more than {LABEL_VALUE_MAX_LENGTH} characters"));
    }
    if !value.is_empty() && !QUALIFIED_NAME_RE.is_match(value) {
        errors.push(format!(
            "a valid label must be an empty string or consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyValue', or 'my_value', or '12345', regex used for validation is '({QUALIFIED_NAME_FMT})?')"
        ));
    }
    errors
}

fn report(diagnostics: &mut Diagnostics, path: &AttributePath, what: &str, value: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    diagnostics.add_attribute_error(
        path,
        "Invalid Attribute Value",
        format!("{what} {value:?} is invalid: {}", errors.join("; ")),
    );
}

/// `metadata.name`: DNS-1123 subdomain
#[derive(Debug, Clone, Copy, Default)]
pub struct NameValidator;

impl AttributeValidator for NameValidator {
    fn description(&self) -> String {
        format!("must be a lowercase RFC 1123 subdomain of at most {DNS1123_SUBDOMAIN_MAX_LENGTH} characters")
    }

    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        if let Some(name) = coerce::to_string(value) {
            report(diagnostics, path, "name", &name, &dns1123_subdomain_errors(&name));
        }
    }
}

/// `metadata.namespace`: DNS-1123 label
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceValidator;

impl AttributeValidator for NamespaceValidator {
    fn description(&self) -> String {
        format!("must be a lowercase RFC 1123 label of at most {DNS1123_LABEL_MAX_LENGTH} characters")
    }

    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        if let Some(namespace) = coerce::to_string(value) {
            report(diagnostics, path, "namespace", &namespace, &dns1123_label_errors(&namespace));
        }
    }
}

/// `metadata.labels`: qualified-name keys, label values
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelValidator;

impl AttributeValidator for LabelValidator {
    fn description(&self) -> String {
        "keys must be qualified names and values valid label values".to_string()
    }

    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        let Some(labels) = value.as_object() else { return };
        for (key, label) in labels {
            let key_path = path.key(key);
            report(diagnostics, &key_path, "label key", key, &qualified_name_errors(key));
            if let Some(label) = coerce::to_string(label) {
                report(diagnostics, &key_path, "label value", &label, &label_value_errors(&label));
            }
        }
    }
}

/// `metadata.annotations`: qualified-name keys, bounded total size
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationValidator;

impl AttributeValidator for AnnotationValidator {
    fn description(&self) -> String {
        format!("keys must be qualified names; keys and values may total at most {TOTAL_ANNOTATION_SIZE_LIMIT} bytes")
    }

    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        let Some(annotations) = value.as_object() else { return };
        let mut total_size = 0;
        for (key, annotation) in annotations {
            report(diagnostics, &path.key(key), "annotation key", key, &qualified_name_errors(key));
            total_size += key.len() + coerce::to_string(annotation).map_or(0, |a| a.len());
        }
        if total_size > TOTAL_ANNOTATION_SIZE_LIMIT {
            diagnostics.add_attribute_error(
                path,
                "Invalid Attribute Value",
                format!("annotations may not have more than {TOTAL_ANNOTATION_SIZE_LIMIT} bytes in total, got {total_size}"),
            );
        }
    }
}

#[cfg(test)]
#[path = "validators_test.rs"]
mod validators_test;
