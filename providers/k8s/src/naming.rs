//! Attribute and type names
//!
//! CRD JSON keys become Terraform attribute names: snake_case, restricted to
//! `[a-z0-9_]`, never starting with a digit.

use crds::CrdKind;
use inflector::Inflector;

/// Terraform attribute name for a CRD JSON key
pub fn attribute_name(json_key: &str) -> String {
    let mut name: String = json_key
        .to_snake_case()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Full resource type name, e.g. `k8s_kiali_io_kiali_v1alpha1`
pub fn type_name(provider_type_name: &str, kind: &CrdKind) -> String {
    format!("{}_{}", provider_type_name, kind.type_suffix())
}
