//! ScyllaCluster resource end to end

use plugin_framework::ProviderServer;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use terraform_provider_k8s::{K8sProvider, ProviderConfig};

const SCYLLA: &str = "k8s_scylla_scylladb_com_scylla_cluster_v1";

fn server() -> ProviderServer {
    let provider = K8sProvider::from_config(ProviderConfig::default()).expect("provider builds");
    ProviderServer::new(Arc::new(provider)).expect("server starts")
}

fn config() -> Value {
    json!({
        "metadata": { "name": "scylla", "namespace": "scylla" },
        "spec": {
            "version": "5.4.0",
            "agent_version": "3.2.0",
            "datacenter": {
                "name": "dc1",
                "racks": [{
                    "name": "rack1",
                    "members": 3,
                    "storage": { "capacity": "10Gi", "storage_class_name": "local-raid" },
                    "resources": {
                        "limits": { "cpu": 1, "memory": "4Gi" },
                        "requests": { "cpu": "500m", "memory": "4Gi" }
                    }
                }]
            }
        }
    })
}

fn manifest(state: &Value) -> Value {
    serde_yaml::from_str(state["yaml"].as_str().expect("yaml set")).expect("manifest parses")
}

#[tokio::test]
async fn test_scylla_cluster_manifest() {
    let server = server();

    let diagnostics = server.validate_resource_config(SCYLLA, &config()).await;
    assert!(diagnostics.is_empty(), "{diagnostics}");

    let applied = server.apply_resource_change(SCYLLA, None, Some(config())).await;
    assert!(applied.diagnostics.is_empty(), "{}", applied.diagnostics);
    let state = applied.new_state.expect("state after create");
    assert_eq!(state["api_version"], json!("scylla.scylladb.com/v1"));
    assert_eq!(state["kind"], json!("ScyllaCluster"));

    let manifest = manifest(&state);
    assert_eq!(manifest["spec"]["datacenter"]["racks"][0]["members"], json!(3));
    assert_eq!(manifest["spec"]["agentVersion"], json!("3.2.0"));
    assert_eq!(
        manifest["spec"]["datacenter"]["racks"][0]["storage"],
        json!({ "capacity": "10Gi", "storageClassName": "local-raid" })
    );
    assert_eq!(
        manifest["spec"]["datacenter"]["racks"][0]["resources"],
        json!({
            "limits": { "cpu": 1, "memory": "4Gi" },
            "requests": { "cpu": "500m", "memory": "4Gi" }
        })
    );
    assert_eq!(manifest["metadata"]["namespace"], json!("scylla"));
}

#[tokio::test]
async fn test_scylla_cluster_required_fields() {
    let server = server();
    let config = json!({
        "metadata": { "name": "scylla" },
        "spec": {
            "datacenter": { "name": "dc1", "racks": [{ "name": "rack1", "members": -1 }] }
        }
    });

    let diagnostics = server.validate_resource_config(SCYLLA, &config).await;
    let errors: Vec<(String, String)> = diagnostics
        .errors()
        .map(|d| {
            let path = d.attribute.as_ref().map(ToString::to_string).unwrap_or_default();
            (path, d.summary.clone())
        })
        .collect();
    assert_eq!(
        errors,
        vec![
            (
                "spec.datacenter.racks[0].members".to_string(),
                "Invalid Attribute Value".to_string()
            ),
            (
                "spec.datacenter.racks[0].storage".to_string(),
                "Missing Configuration for Required Attribute".to_string()
            ),
            (
                "spec.version".to_string(),
                "Missing Configuration for Required Attribute".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_scylla_cluster_rejects_unknown_field() {
    let server = server();
    let mut config = config();
    config["spec"]["datacenter"]["zone"] = json!("a");

    let diagnostics = server.validate_resource_config(SCYLLA, &config).await;
    let summaries: Vec<&str> = diagnostics.errors().map(|d| d.summary.as_str()).collect();
    assert_eq!(summaries, vec!["Unsupported argument"]);
}
