//! Lifecycle through the provider server: plan/apply dispatch, no-op reads
//! and deletes, unknown types

use plugin_framework::{PlannedAction, ProviderServer};
use serde_json::{Value, json};
use std::sync::Arc;
use terraform_provider_k8s::{K8sProvider, ProviderConfig};

const KIALI: &str = "k8s_kiali_io_kiali_v1alpha1";

fn server() -> ProviderServer {
    let provider = K8sProvider::from_config(ProviderConfig::default()).expect("provider builds");
    ProviderServer::new(Arc::new(provider)).expect("server starts")
}

fn config() -> Value {
    json!({
        "metadata": { "name": "my-kiali", "namespace": "istio-system" },
        "spec": { "istio_namespace": "istio-system" }
    })
}

#[tokio::test]
async fn test_ids_do_not_decrease() {
    let server = server();
    let mut last = 0;
    let mut prior = None;
    for replicas in 1..=5 {
        let mut config = config();
        config["spec"]["deployment"] = json!({ "replicas": replicas });
        let applied = server.apply_resource_change(KIALI, prior.take(), Some(config)).await;
        let state = applied.new_state.expect("state after apply");
        let id = state["id"].as_i64().expect("id set");
        assert!(id >= last);
        last = id;
        prior = Some(state);
    }
}

#[tokio::test]
async fn test_unchanged_config_plans_no_op() {
    let server = server();
    let created = server.apply_resource_change(KIALI, None, Some(config())).await;
    let prior = created.new_state.expect("state after create");

    let plan = server.plan_resource_change(KIALI, Some(&prior), Some(&config()));
    assert_eq!(plan.action, PlannedAction::NoOp);
    let planned = plan.planned_state.expect("planned state");
    assert_eq!(planned["id"], prior["id"]);
    assert_eq!(planned["yaml"], prior["yaml"]);

    let applied = server.apply_resource_change(KIALI, Some(prior.clone()), Some(config())).await;
    assert_eq!(applied.new_state, Some(prior));
}

#[tokio::test]
async fn test_read_keeps_state() {
    let server = server();
    let created = server.apply_resource_change(KIALI, None, Some(config())).await;
    let state = created.new_state.expect("state after create");

    let read = server.read_resource(KIALI, state.clone()).await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.state.raw(), &state);
}

#[tokio::test]
async fn test_delete_drops_state() {
    let server = server();
    let created = server.apply_resource_change(KIALI, None, Some(config())).await;
    let state = created.new_state.expect("state after create");

    let deleted = server.apply_resource_change(KIALI, Some(state), None).await;
    assert_eq!(deleted.action, PlannedAction::Delete);
    assert!(deleted.diagnostics.is_empty());
    assert_eq!(deleted.new_state, None);
}

#[tokio::test]
async fn test_create_plans_computed_as_unknown() {
    let server = server();
    let plan = server.plan_resource_change(KIALI, None, Some(&config()));
    assert_eq!(plan.action, PlannedAction::Create);
    let unknown: Vec<String> = plan.unknown.iter().map(ToString::to_string).collect();
    assert_eq!(unknown, vec!["api_version", "id", "kind", "yaml"]);
}

#[tokio::test]
async fn test_unknown_resource_type() {
    let server = server();
    let diagnostics = server.validate_resource_config("k8s_kiali_io_kiali_v2", &config()).await;
    let summaries: Vec<&str> = diagnostics.errors().map(|d| d.summary.as_str()).collect();
    assert_eq!(summaries, vec!["Resource Type Not Found"]);
}
