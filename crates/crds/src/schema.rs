//! OpenAPI v3 schema nodes
//!
//! The subset of a CRD's `openAPIV3Schema` that drives attribute generation
//! and manifest rendering. Keywords the engine does not understand
//! (`allOf`, `x-kubernetes-validations`, ...) are ignored on read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single node of an OpenAPI v3 schema as found in a CRD version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiSchema {
    /// JSON type (`object`, `array`, `string`, `integer`, `number`, `boolean`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Format hint (e.g. `int32`, `date-time`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Documentation copied into the attribute description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Named children of an object
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, OpenApiSchema>,

    /// Names of required children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Element schema of an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaItems>,

    /// Value schema of a map-like object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    /// Allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    /// ECMA-262 pattern a string must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,

    /// Accepts either an integer or a string (resource quantities, ports)
    #[serde(rename = "x-kubernetes-int-or-string", default, skip_serializing_if = "is_false")]
    pub int_or_string: bool,

    /// Accepts arbitrary fields beyond the declared properties
    #[serde(rename = "x-kubernetes-preserve-unknown-fields", default, skip_serializing_if = "is_false")]
    pub preserve_unknown_fields: bool,
}

/// `items` is either one schema for every element or a tuple of schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaItems {
    Tuple(Vec<OpenApiSchema>),
    Schema(Box<OpenApiSchema>),
}

/// `additionalProperties` is either a boolean or a value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<OpenApiSchema>),
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes a reference
fn is_false(value: &bool) -> bool {
    !*value
}

impl OpenApiSchema {
    /// Returns the declared JSON type, if any
    pub fn type_name(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    /// Whether the child property `name` is listed as required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Returns the child property called `name`
    pub fn property(&self, name: &str) -> Option<&OpenApiSchema> {
        self.properties.get(name)
    }

    /// Element schema of an array (the first one for tuple arrays)
    pub fn item_schema(&self) -> Option<&OpenApiSchema> {
        match self.items.as_ref()? {
            SchemaItems::Schema(schema) => Some(schema),
            SchemaItems::Tuple(schemas) => schemas.first(),
        }
    }

    /// Value schema of a map-like object
    pub fn value_schema(&self) -> Option<&OpenApiSchema> {
        match self.additional_properties.as_ref()? {
            AdditionalProperties::Schema(schema) => Some(schema),
            AdditionalProperties::Allowed(_) => None,
        }
    }

    /// Whether `additionalProperties: true` was declared
    pub fn allows_any_properties(&self) -> bool {
        matches!(self.additional_properties, Some(AdditionalProperties::Allowed(true)))
    }

    /// String enum values; `None` when the enum is empty or holds non-strings
    pub fn string_enum(&self) -> Option<Vec<String>> {
        if self.enum_values.is_empty() {
            return None;
        }
        self.enum_values
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }
}
