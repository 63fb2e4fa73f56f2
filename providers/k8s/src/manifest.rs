//! Manifest conversion
//!
//! Turns a [`ResourceModel`] into the Kubernetes object it describes: fixed
//! `apiVersion`/`kind` from the catalog, metadata, and a `spec` whose keys are
//! the CRD's JSON names. Unset (null) values are omitted.

use crate::model::ResourceModel;
use crate::translate::{Shape, property_names, shape};
use crds::{CrdKind, OpenApiSchema};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::core::{DynamicObject, TypeMeta};
use plugin_framework::coerce;
use plugin_framework::{AttributePath, Diagnostics};
use serde_json::{Map, Value};

/// Builds manifests for one CRD kind
#[derive(Debug, Clone, Copy)]
pub struct ManifestBuilder<'a> {
    kind: &'a CrdKind,
    spec_schema: Option<&'a OpenApiSchema>,
}

impl<'a> ManifestBuilder<'a> {
    /// `spec_schema` of `None` passes `spec` through unchanged
    pub fn new(kind: &'a CrdKind, spec_schema: Option<&'a OpenApiSchema>) -> Self {
        Self { kind, spec_schema }
    }

    pub fn build(&self, model: &ResourceModel) -> Result<DynamicObject, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut object = DynamicObject::new(&model.metadata.name, &self.kind.api_resource());

        match (&model.metadata.namespace, self.kind.namespaced) {
            (Some(namespace), true) => object = object.within(namespace),
            (Some(_), false) => diagnostics.add_attribute_error(
                &AttributePath::root("metadata").attribute("namespace"),
                "Invalid Attribute Value",
                format!("{} is cluster-scoped; namespace must not be set", self.kind.kind),
            ),
            (None, _) => {}
        }
        object.metadata.labels.clone_from(&model.metadata.labels);
        object.metadata.annotations.clone_from(&model.metadata.annotations);

        // always the catalog literals, whatever the config holds
        object.types = Some(TypeMeta {
            api_version: self.kind.api_version(),
            kind: self.kind.kind.clone(),
        });

        let mut data = Map::new();
        if let Some(spec) = model.spec.as_ref().filter(|spec| !spec.is_null()) {
            let spec = match self.spec_schema {
                Some(schema) => convert_value(schema, spec, &AttributePath::root("spec"), &mut diagnostics),
                None => spec.clone(),
            };
            data.insert("spec".to_string(), spec);
        }
        object.data = Value::Object(data);

        if diagnostics.has_error() {
            return Err(diagnostics);
        }
        Ok(object)
    }
}

/// Serializes a manifest to YAML
pub fn render_yaml(object: &DynamicObject) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(object)
}

/// Converts a configured value into its manifest form
///
/// Objects map attribute names back to JSON keys and drop null entries;
/// scalars are converted to the schema type; int-or-string values become
/// integers when they fit in 32 bits.
fn convert_value(schema: &OpenApiSchema, value: &Value, path: &AttributePath, diagnostics: &mut Diagnostics) -> Value {
    let converted = match shape(schema) {
        Shape::String => coerce::to_string(value).map(Value::String),
        Shape::Int64 => coerce::to_i64(value).map(Value::from),
        Shape::Float64 => coerce::to_f64(value)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Shape::Bool => coerce::to_bool(value).map(Value::Bool),
        Shape::IntOrString => int_or_string(value).and_then(|v| serde_json::to_value(v).ok()),
        Shape::Dynamic => Some(value.clone()),
        Shape::List(items) => value.as_array().map(|elements| {
            let elements = elements
                .iter()
                .enumerate()
                .map(|(index, element)| match items {
                    Some(items) if !element.is_null() => {
                        convert_value(items, element, &path.index(index), diagnostics)
                    }
                    _ => element.clone(),
                })
                .collect();
            Value::Array(elements)
        }),
        Shape::Map(values) => value.as_object().map(|entries| {
            let entries = entries
                .iter()
                .filter(|(_, entry)| !entry.is_null())
                .map(|(key, entry)| {
                    let entry = match values {
                        Some(values) => convert_value(values, entry, &path.key(key), diagnostics),
                        None => coerce::to_string(entry).map_or_else(|| entry.clone(), Value::String),
                    };
                    (key.clone(), entry)
                })
                .collect();
            Value::Object(entries)
        }),
        Shape::Object(object) => value.as_object().map(|entries| convert_object(object, entries, path, diagnostics)),
    };

    converted.unwrap_or_else(|| {
        diagnostics.add_attribute_error(
            path,
            "Value Conversion Error",
            format!(
                "Could not convert {} value at {path} to the type declared by the CRD",
                coerce::type_label(value)
            ),
        );
        Value::Null
    })
}

fn convert_object(
    schema: &OpenApiSchema,
    entries: &Map<String, Value>,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) -> Value {
    let names = property_names(schema);
    let mut object = Map::new();
    for (name, entry) in entries {
        if entry.is_null() {
            continue;
        }
        let child_path = path.attribute(name);
        match names.get(name) {
            Some((key, property)) => {
                let converted = convert_value(property, entry, &child_path, diagnostics);
                object.insert((*key).to_string(), converted);
            }
            None => diagnostics.add_attribute_error(
                &child_path,
                "Unsupported argument",
                format!("An argument named {name:?} is not expected here."),
            ),
        }
    }
    Value::Object(object)
}

fn int_or_string(value: &Value) -> Option<IntOrString> {
    match value {
        Value::Number(n) => Some(
            n.as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map_or_else(|| IntOrString::String(n.to_string()), IntOrString::Int),
        ),
        Value::String(s) => Some(
            s.parse::<i32>()
                .map_or_else(|_| IntOrString::String(s.clone()), IntOrString::Int),
        ),
        _ => None,
    }
}
