//! Resource and provider schemas
//!
//! A [`Schema`] declares the attributes of a resource. The server checks
//! incoming configuration against it before any handler runs, so handlers
//! only ever see values of the declared shape.

use crate::coerce;
use crate::diagnostics::Diagnostics;
use crate::path::{AttributePath, PathStep};
use crate::validator::Validator;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Type of an attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int64,
    Float64,
    Bool,
    /// Whole number or string, kept as given
    IntOrString,
    /// Any value; not checked
    Dynamic,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Nested attributes
    Object(BTreeMap<String, Attribute>),
}

impl AttributeType {
    /// Terraform's wording for the type, used in type mismatch errors
    pub fn label(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Int64 | Self::Float64 => "number".to_string(),
            Self::Bool => "bool".to_string(),
            Self::IntOrString => "number or string".to_string(),
            Self::Dynamic => "any value".to_string(),
            Self::List(element) => format!("list of {}", element.label()),
            Self::Map(element) => format!("map of {}", element.label()),
            Self::Object(_) => "object".to_string(),
        }
    }

    /// Checks a non-null value; returns false when the value has the wrong type
    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) -> bool {
        let matches = match self {
            Self::String => coerce::to_string(value).is_some(),
            Self::Int64 => coerce::to_i64(value).is_some(),
            Self::Float64 => coerce::to_f64(value).is_some(),
            Self::Bool => coerce::to_bool(value).is_some(),
            Self::IntOrString => matches!(value, Value::String(_) | Value::Number(_)),
            Self::Dynamic => true,
            Self::List(element) => match value {
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if !item.is_null() {
                            element.validate(&path.index(index), item, diagnostics);
                        }
                    }
                    true
                }
                _ => false,
            },
            Self::Map(element) => match value {
                Value::Object(entries) => {
                    for (key, item) in entries {
                        if !item.is_null() {
                            element.validate(&path.key(key), item, diagnostics);
                        }
                    }
                    true
                }
                _ => false,
            },
            Self::Object(attributes) => match value {
                Value::Object(entries) => {
                    validate_attributes(attributes, entries, path, diagnostics);
                    true
                }
                _ => false,
            },
        };

        if !matches {
            diagnostics.add_attribute_error(
                path,
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute {path}: {} required, got {}.",
                    self.label(),
                    coerce::type_label(value)
                ),
            );
        }
        matches
    }
}

/// One attribute of a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub required: bool,
    pub optional: bool,

    /// Set by the provider rather than the configuration
    pub computed: bool,

    /// Changing the value destroys and recreates the resource
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_replace: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(kind: AttributeType) -> Self {
        Self {
            kind,
            description: None,
            required: false,
            optional: false,
            computed: false,
            requires_replace: false,
            validators: Vec::new(),
        }
    }

    /// Attribute that must be configured
    pub fn required(kind: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::new(kind)
        }
    }

    /// Attribute that may be configured
    pub fn optional(kind: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::new(kind)
        }
    }

    /// Read-only attribute set by the provider
    pub fn computed(kind: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::new(kind)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    #[must_use]
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Computed and neither required nor optional
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        if value.is_null() {
            if self.required {
                diagnostics.add_attribute_error(
                    path,
                    "Missing Configuration for Required Attribute",
                    format!(
                        "Must set a configuration value for the {path} attribute as the provider has marked it as required."
                    ),
                );
            }
            return;
        }

        if self.is_computed_only() {
            diagnostics.add_attribute_error(
                path,
                "Invalid Configuration for Read-Only Attribute",
                format!(
                    "Cannot set value for the {path} attribute as the provider has marked it as read-only. Remove the configuration line setting the value."
                ),
            );
            return;
        }

        if !self.kind.validate(path, value, diagnostics) {
            return;
        }
        for validator in &self.validators {
            validator.validate(path, value, diagnostics);
        }
    }
}

/// Attribute set of a resource (or of the provider block)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Schema version, bumped when stored state needs upgrading
    pub version: i64,

    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Attribute addressed by `path`
    ///
    /// List indexes and map keys step into the element type; `None` when the
    /// path ends on an element rather than a named attribute.
    pub fn attribute_at(&self, path: &AttributePath) -> Option<&Attribute> {
        let mut found: Option<&Attribute> = None;
        let mut kind: Option<&AttributeType> = None;
        for step in path.steps() {
            match (step, kind) {
                (PathStep::Attribute(name), None) => found = self.attributes.get(name),
                (PathStep::Attribute(name), Some(AttributeType::Object(nested))) => {
                    found = nested.get(name);
                }
                (PathStep::Index(_), Some(AttributeType::List(element)))
                | (PathStep::Key(_), Some(AttributeType::Map(element))) => {
                    found = None;
                    kind = Some(&**element);
                    continue;
                }
                _ => return None,
            }
            kind = Some(&found?.kind);
        }
        found
    }

    /// Names of the top-level read-only attributes
    pub fn computed_only(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, attribute)| attribute.is_computed_only())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Paths of every attribute marked `requires_replace`, following nested
    /// objects (not lists or maps)
    pub fn replace_paths(&self) -> Vec<AttributePath> {
        let mut paths = Vec::new();
        collect_replace_paths(&self.attributes, &AttributePath::new(), &mut paths);
        paths
    }

    /// Checks a configuration object against the schema
    ///
    /// Reports unknown arguments, missing required attributes, values set on
    /// read-only attributes, type mismatches and validator failures. Null
    /// values count as unset.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        match config {
            Value::Object(entries) => {
                validate_attributes(&self.attributes, entries, &AttributePath::new(), &mut diagnostics);
            }
            Value::Null => {
                validate_attributes(&self.attributes, &Map::new(), &AttributePath::new(), &mut diagnostics);
            }
            other => diagnostics.add_error(
                "Invalid resource configuration",
                format!("The configuration must be an object, got {}.", coerce::type_label(other)),
            ),
        }
        diagnostics
    }
}

fn validate_attributes(
    attributes: &BTreeMap<String, Attribute>,
    entries: &Map<String, Value>,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) {
    for key in entries.keys() {
        if !attributes.contains_key(key) {
            diagnostics.add_attribute_error(
                &path.attribute(key),
                "Unsupported argument",
                format!("An argument named {key:?} is not expected here."),
            );
        }
    }

    for (name, attribute) in attributes {
        let value = entries.get(name).unwrap_or(&Value::Null);
        attribute.validate(&path.attribute(name), value, diagnostics);
    }
}

fn collect_replace_paths(
    attributes: &BTreeMap<String, Attribute>,
    path: &AttributePath,
    paths: &mut Vec<AttributePath>,
) {
    for (name, attribute) in attributes {
        let child = path.attribute(name);
        if attribute.requires_replace {
            paths.push(child.clone());
        }
        if let AttributeType::Object(nested) = &attribute.kind {
            collect_replace_paths(nested, &child, paths);
        }
    }
}
