//! Resource model
//!
//! Typed view of a CRD resource's configuration and state. `spec` stays an
//! opaque JSON value here; its shape comes from the CRD schema.

use plugin_framework::coerce;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Configuration/state of one CRD resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceModel {
    /// Nanosecond timestamp of the last render
    #[serde(default)]
    pub id: Option<i64>,

    /// Rendered manifest
    #[serde(default)]
    pub yaml: Option<String>,

    #[serde(default)]
    pub api_version: Option<String>,

    #[serde(default)]
    pub kind: Option<String>,

    pub metadata: MetadataModel,

    #[serde(default)]
    pub spec: Option<Value>,
}

/// `metadata` block
///
/// Scalars are read the way the schema accepts them: numbers and bools in
/// string attributes (`version: 2` in YAML) become their string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataModel {
    #[serde(deserialize_with = "string")]
    pub name: String,

    #[serde(default, deserialize_with = "optional_string", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, deserialize_with = "optional_string_map")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, deserialize_with = "optional_string_map")]
    pub annotations: Option<BTreeMap<String, String>>,
}

fn coerced<E: serde::de::Error>(value: &Value) -> Result<String, E> {
    coerce::to_string(value)
        .ok_or_else(|| E::custom(format!("expected a string, got {}", coerce::type_label(value))))
}

fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    coerced(&Value::deserialize(deserializer)?)
}

fn optional_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => coerced(&value).map(Some),
    }
}

/// Null entries are dropped, as an unset map element
fn optional_string_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Object(entries) => entries
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| Ok((key.clone(), coerced(value)?)))
            .collect::<Result<_, D::Error>>()
            .map(Some),
        other => Err(D::Error::custom(format!("expected a map, got {}", coerce::type_label(&other)))),
    }
}

/// Current time in nanoseconds since the UNIX epoch
pub fn now_nanos() -> i64 {
    // saturates past year 2262
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_config() {
        let model: ResourceModel = serde_json::from_value(json!({
            "id": null,
            "yaml": null,
            "metadata": { "name": "my-kiali", "namespace": "istio-system", "labels": null },
            "spec": { "istio_namespace": "istio-system" }
        }))
        .expect("config decodes");

        assert_eq!(model.id, None);
        assert_eq!(model.metadata.name, "my-kiali");
        assert_eq!(model.metadata.namespace.as_deref(), Some("istio-system"));
        assert_eq!(model.metadata.labels, None);
        assert_eq!(model.spec, Some(json!({ "istio_namespace": "istio-system" })));
    }

    #[test]
    fn test_decode_coerces_metadata_scalars() {
        let model: ResourceModel = serde_json::from_value(json!({
            "metadata": {
                "name": 123,
                "labels": { "version": 2, "canary": true, "track": null },
                "annotations": { "replicas": 1.5 }
            }
        }))
        .expect("config decodes");

        assert_eq!(model.metadata.name, "123");
        assert_eq!(
            model.metadata.labels,
            Some(BTreeMap::from([
                ("canary".to_string(), "true".to_string()),
                ("version".to_string(), "2".to_string()),
            ]))
        );
        assert_eq!(
            model.metadata.annotations,
            Some(BTreeMap::from([("replicas".to_string(), "1.5".to_string())]))
        );
    }

    #[test]
    fn test_decode_rejects_structured_label_value() {
        let err = serde_json::from_value::<ResourceModel>(json!({
            "metadata": { "name": "db", "labels": { "app": ["a"] } }
        }))
        .expect_err("list is not a label value");
        assert!(err.to_string().contains("expected a string, got list"), "{err}");
    }

    #[test]
    fn test_null_spec_is_none() {
        let model: ResourceModel =
            serde_json::from_value(json!({ "metadata": { "name": "db" }, "spec": null })).expect("config decodes");
        assert_eq!(model.spec, None);
    }

    #[test]
    fn test_state_keeps_computed_fields() {
        let model = ResourceModel {
            id: Some(1),
            metadata: MetadataModel {
                name: "db".to_string(),
                ..MetadataModel::default()
            },
            ..ResourceModel::default()
        };
        let state = serde_json::to_value(&model).expect("model serializes");
        assert_eq!(
            state,
            json!({
                "id": 1,
                "yaml": null,
                "api_version": null,
                "kind": null,
                "metadata": { "name": "db", "labels": null, "annotations": null },
                "spec": null
            })
        );
    }

    #[test]
    fn test_now_nanos_is_monotonic_enough() {
        let first = now_nanos();
        let second = now_nanos();
        assert!(second >= first);
        assert!(first > 1_600_000_000_000_000_000);
    }
}
