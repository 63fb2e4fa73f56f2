//! OpenAPI schema translation
//!
//! Builds the attribute schema of a CRD resource from the CRD's
//! `openAPIV3Schema`. The same shape classification drives manifest
//! conversion, so what the schema accepts is what the converter renders.

use crate::error::SchemaError;
use crate::naming::attribute_name;
use crate::validators::{AnnotationValidator, LabelValidator, NameValidator, NamespaceValidator};
use crds::{CatalogEntry, OpenApiSchema};
use plugin_framework::{Attribute, AttributeType, Schema, Validator};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How a schema node is represented as an attribute
#[derive(Debug, Clone, Copy)]
pub(crate) enum Shape<'a> {
    String,
    Int64,
    Float64,
    Bool,
    IntOrString,
    /// Free-form value, passed through untouched
    Dynamic,
    /// Array; `None` when the items are unspecified
    List(Option<&'a OpenApiSchema>),
    /// Map-like object; `None` means string values
    Map(Option<&'a OpenApiSchema>),
    /// Object with declared properties
    Object(&'a OpenApiSchema),
}

pub(crate) fn shape(schema: &OpenApiSchema) -> Shape<'_> {
    if schema.int_or_string {
        return Shape::IntOrString;
    }
    match schema.type_name() {
        Some("string") => Shape::String,
        Some("integer") => Shape::Int64,
        Some("number") => Shape::Float64,
        Some("boolean") => Shape::Bool,
        Some("array") => Shape::List(schema.item_schema()),
        Some("object") | None => {
            if !schema.properties.is_empty() {
                Shape::Object(schema)
            } else if let Some(values) = schema.value_schema() {
                Shape::Map(Some(values))
            } else if schema.allows_any_properties()
                || schema.preserve_unknown_fields
                || schema.type_name().is_none()
            {
                Shape::Dynamic
            } else {
                Shape::Map(None)
            }
        }
        Some(_) => Shape::Dynamic,
    }
}

/// Attribute name → (CRD JSON key, property schema) for an object node
pub(crate) fn property_names(schema: &OpenApiSchema) -> BTreeMap<String, (&str, &OpenApiSchema)> {
    schema
        .properties
        .iter()
        .map(|(key, property)| (attribute_name(key), (key.as_str(), property)))
        .collect()
}

/// Attribute schema of one CRD resource
///
/// `id`, `yaml`, `api_version` and `kind` are computed; `metadata` carries
/// the Kubernetes naming validators; `spec` mirrors the CRD.
pub fn resource_schema(entry: &CatalogEntry) -> Result<Schema, SchemaError> {
    let kind = &entry.kind;

    let mut metadata = BTreeMap::from([
        (
            "name".to_string(),
            Attribute::required(AttributeType::String)
                .with_description("Name of the object. Must be unique within its namespace. Cannot be updated.")
                .with_validator(Validator::custom(NameValidator))
                .requires_replace(),
        ),
        (
            "labels".to_string(),
            Attribute::optional(AttributeType::Map(Box::new(AttributeType::String)))
                .with_description("Map of string keys and values used to organize and categorize objects.")
                .with_validator(Validator::custom(LabelValidator)),
        ),
        (
            "annotations".to_string(),
            Attribute::optional(AttributeType::Map(Box::new(AttributeType::String)))
                .with_description("Unstructured key value map stored with the object.")
                .with_validator(Validator::custom(AnnotationValidator)),
        ),
    ]);
    if kind.namespaced {
        metadata.insert(
            "namespace".to_string(),
            Attribute::optional(AttributeType::String)
                .with_description("Namespace the object lives in. Cannot be updated.")
                .with_validator(Validator::custom(NamespaceValidator))
                .requires_replace(),
        );
    }

    let spec = match entry.spec_schema() {
        Some(spec) => {
            let mut attribute = property_attribute(spec, false, &kind.kind, "spec")?;
            if attribute.description.is_none() {
                attribute.description = Some(format!("Desired state of the {}.", kind.kind));
            }
            attribute
        }
        None => Attribute::optional(AttributeType::Dynamic),
    };

    let description = entry
        .description()
        .map_or_else(|| format!("{} ({})", kind.kind, kind.api_version()), str::to_string);

    let schema = Schema::new()
        .with_description(description)
        .with_attribute(
            "id",
            Attribute::computed(AttributeType::Int64)
                .with_description("Time of the last render in nanoseconds since the UNIX epoch."),
        )
        .with_attribute(
            "yaml",
            Attribute::computed(AttributeType::String).with_description("The rendered Kubernetes manifest."),
        )
        .with_attribute(
            "api_version",
            Attribute::computed(AttributeType::String)
                .with_description(format!("Always {}.", kind.api_version())),
        )
        .with_attribute(
            "kind",
            Attribute::computed(AttributeType::String).with_description(format!("Always {}.", kind.kind)),
        )
        .with_attribute(
            "metadata",
            Attribute::required(AttributeType::Object(metadata))
                .with_description("Standard Kubernetes object metadata."),
        )
        .with_attribute("spec", spec);

    debug!("Translated schema for {} ({} attributes)", kind.kind, schema.attributes.len());
    Ok(schema)
}

fn property_attribute(
    schema: &OpenApiSchema,
    required: bool,
    kind: &str,
    path: &str,
) -> Result<Attribute, SchemaError> {
    let attribute_type = attribute_type(schema, kind, path)?;
    let mut attribute = if required {
        Attribute::required(attribute_type)
    } else {
        Attribute::optional(attribute_type)
    };
    if let Some(description) = &schema.description {
        attribute = attribute.with_description(description.clone());
    }
    Ok(attribute.with_validators(validators(schema, kind, path)))
}

fn attribute_type(schema: &OpenApiSchema, kind: &str, path: &str) -> Result<AttributeType, SchemaError> {
    let attribute_type = match shape(schema) {
        Shape::String => AttributeType::String,
        Shape::Int64 => AttributeType::Int64,
        Shape::Float64 => AttributeType::Float64,
        Shape::Bool => AttributeType::Bool,
        Shape::IntOrString => AttributeType::IntOrString,
        Shape::Dynamic => AttributeType::Dynamic,
        Shape::List(Some(items)) => {
            AttributeType::List(Box::new(attribute_type(items, kind, &format!("{path}[]"))?))
        }
        Shape::List(None) => AttributeType::List(Box::new(AttributeType::Dynamic)),
        Shape::Map(Some(values)) => {
            AttributeType::Map(Box::new(attribute_type(values, kind, &format!("{path}{{}}"))?))
        }
        Shape::Map(None) => AttributeType::Map(Box::new(AttributeType::String)),
        Shape::Object(object) => AttributeType::Object(object_attributes(object, kind, path)?),
    };
    Ok(attribute_type)
}

fn object_attributes(
    schema: &OpenApiSchema,
    kind: &str,
    path: &str,
) -> Result<BTreeMap<String, Attribute>, SchemaError> {
    let mut attributes = BTreeMap::new();
    let mut keys: BTreeMap<String, &str> = BTreeMap::new();

    for (key, property) in &schema.properties {
        let name = attribute_name(key);
        if let Some(first) = keys.insert(name.clone(), key) {
            return Err(SchemaError::DuplicateAttribute {
                path: format!("{kind}.{path}"),
                name,
                first: first.to_string(),
                second: key.clone(),
            });
        }
        let child_path = format!("{path}.{name}");
        let attribute = property_attribute(property, schema.is_required(key), kind, &child_path)?;
        attributes.insert(name, attribute);
    }
    Ok(attributes)
}

#[allow(clippy::cast_possible_truncation)] // bounds are whole numbers in CRDs; saturating cast
fn validators(schema: &OpenApiSchema, kind: &str, path: &str) -> Vec<Validator> {
    let mut validators = Vec::new();
    let shape = shape(schema);

    match shape {
        Shape::String | Shape::IntOrString => {
            if let Some(values) = schema.string_enum() {
                validators.push(Validator::OneOf(values));
            }
            if let Some(pattern) = &schema.pattern {
                match Regex::new(pattern) {
                    Ok(regex) => validators.push(Validator::RegexMatches(regex)),
                    Err(e) => warn!("{}: skipping pattern of {}: {}", kind, path, e),
                }
            }
            if schema.min_length.is_some() || schema.max_length.is_some() {
                validators.push(Validator::LengthBetween {
                    min: schema.min_length.and_then(|n| usize::try_from(n).ok()),
                    max: schema.max_length.and_then(|n| usize::try_from(n).ok()),
                });
            }
        }
        Shape::Int64 => {
            if schema.minimum.is_some() || schema.maximum.is_some() {
                validators.push(Validator::Int64Between {
                    min: schema.minimum.map(|n| n.ceil() as i64),
                    max: schema.maximum.map(|n| n.floor() as i64),
                });
            }
        }
        Shape::Float64 => {
            if schema.minimum.is_some() || schema.maximum.is_some() {
                validators.push(Validator::Float64Between {
                    min: schema.minimum,
                    max: schema.maximum,
                });
            }
        }
        Shape::List(_) => {
            if schema.min_items.is_some() || schema.max_items.is_some() {
                validators.push(Validator::SizeBetween {
                    min: schema.min_items.and_then(|n| usize::try_from(n).ok()),
                    max: schema.max_items.and_then(|n| usize::try_from(n).ok()),
                });
            }
        }
        Shape::Bool | Shape::Dynamic | Shape::Map(_) | Shape::Object(_) => {}
    }
    validators
}
