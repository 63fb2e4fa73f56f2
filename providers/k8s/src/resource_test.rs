//! Unit tests for resource module

#[cfg(test)]
mod tests {
    use crate::resource::CrdResource;
    use crds::{CrdCatalog, CrdDocument};
    use plugin_framework::{
        Config, CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, MetadataRequest,
        MetadataResponse, ReadRequest, ReadResponse, Resource, SchemaResponse, UpdateRequest,
        UpdateResponse, ValidateConfigRequest, ValidateConfigResponse,
    };
    use serde_json::{Value, json};

    fn resource(suffix: &str) -> CrdResource {
        let catalog = CrdCatalog::builtin().expect("builtin CRDs load");
        CrdResource::new(catalog.get(suffix).expect("catalog entry")).expect("resource builds")
    }

    fn kiali() -> CrdResource {
        resource("kiali_io_kiali_v1alpha1")
    }

    fn kiali_config() -> Value {
        json!({
            "metadata": { "name": "my-kiali" },
            "spec": { "istio_namespace": "istio-system" }
        })
    }

    async fn create(resource: &CrdResource, config: Value) -> CreateResponse {
        let req = CreateRequest {
            config: Config::new(config),
        };
        let mut resp = CreateResponse::default();
        resource.create(&req, &mut resp).await;
        resp
    }

    #[test]
    fn test_metadata_type_names() {
        let req = MetadataRequest {
            provider_type_name: "k8s".to_string(),
        };

        let mut resp = MetadataResponse::default();
        kiali().metadata(&req, &mut resp);
        assert_eq!(resp.type_name, "k8s_kiali_io_kiali_v1alpha1");

        let mut resp = MetadataResponse::default();
        resource("scylla_scylladb_com_scylla_cluster_v1").metadata(&req, &mut resp);
        assert_eq!(resp.type_name, "k8s_scylla_scylladb_com_scylla_cluster_v1");
    }

    #[test]
    fn test_schema_is_constant() {
        let resource = kiali();
        let mut first = SchemaResponse::default();
        let mut second = SchemaResponse::default();
        resource.schema(&mut first);
        resource.schema(&mut second);
        assert_eq!(first.schema, second.schema);
        assert!(first.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_create_renders_kiali_manifest() {
        let resource = kiali();
        let resp = create(&resource, kiali_config()).await;
        assert!(resp.diagnostics.is_empty(), "{}", resp.diagnostics);

        let state = resp.state.raw();
        assert_eq!(state["api_version"], json!("kiali.io/v1alpha1"));
        assert_eq!(state["kind"], json!("Kiali"));
        assert_eq!(state["spec"], json!({ "istio_namespace": "istio-system" }));

        let yaml = state["yaml"].as_str().expect("yaml is set");
        assert!(yaml.contains("apiVersion: kiali.io/v1alpha1"), "{yaml}");
        assert!(yaml.contains("kind: Kiali"), "{yaml}");
        assert!(yaml.contains("metadata:\n  name: my-kiali"), "{yaml}");
        assert!(yaml.contains("spec:\n  istio_namespace: istio-system"), "{yaml}");
    }

    #[tokio::test]
    async fn test_create_overrides_type_fields() {
        let mut config = kiali_config();
        config["api_version"] = json!("example.com/v1");
        config["kind"] = json!("NotKiali");

        let resp = create(&kiali(), config).await;
        assert!(!resp.diagnostics.has_error());
        assert_eq!(resp.state.raw()["api_version"], json!("kiali.io/v1alpha1"));
        assert_eq!(resp.state.raw()["kind"], json!("Kiali"));
    }

    #[tokio::test]
    async fn test_create_decode_failure_leaves_state_empty() {
        let resp = create(&kiali(), json!({ "spec": {} })).await;
        assert!(resp.diagnostics.has_error());
        assert!(resp.state.is_empty());
    }

    #[tokio::test]
    async fn test_update_matches_create() {
        let resource = kiali();
        let created = create(&resource, kiali_config()).await;
        let created_id = created.state.raw()["id"].as_i64().expect("id set");

        let req = UpdateRequest {
            config: Config::new(kiali_config()),
            prior_state: created.state.clone(),
        };
        let mut resp = UpdateResponse::default();
        resource.update(&req, &mut resp).await;
        assert!(resp.diagnostics.is_empty());

        let updated_id = resp.state.raw()["id"].as_i64().expect("id set");
        assert!(updated_id >= created_id);
        assert_eq!(resp.state.raw()["yaml"], created.state.raw()["yaml"]);
        assert_eq!(resp.state.raw()["api_version"], json!("kiali.io/v1alpha1"));
    }

    #[tokio::test]
    async fn test_read_and_delete_are_no_ops() {
        let resource = kiali();
        let state = create(&resource, kiali_config()).await.state;

        let req = ReadRequest { state: state.clone() };
        let mut resp = ReadResponse {
            state: state.clone(),
            ..ReadResponse::default()
        };
        resource.read(&req, &mut resp).await;
        assert_eq!(resp.state, state);
        assert!(resp.diagnostics.is_empty());

        let req = DeleteRequest { state };
        let mut resp = DeleteResponse::default();
        resource.delete(&req, &mut resp).await;
        assert!(resp.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_validate_config_rejects_unknown_spec_field() {
        let req = ValidateConfigRequest {
            config: Config::new(json!({
                "metadata": { "name": "my-kiali" },
                "spec": { "istio_ns": "istio-system" }
            })),
        };
        let mut resp = ValidateConfigResponse::default();
        kiali().validate_config(&req, &mut resp).await;
        assert!(resp.diagnostics.has_error());
    }

    const DEPRECATED_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: gadgets.example.com
spec:
  group: example.com
  names:
    kind: Gadget
    plural: gadgets
  scope: Namespaced
  versions:
    - name: v1
      served: true
      storage: true
      deprecated: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              properties:
                size:
                  type: integer
"#;

    #[tokio::test]
    async fn test_validate_config_warns_on_deprecated_version() {
        let document = CrdDocument::parse("gadgets", DEPRECATED_CRD).expect("CRD parses");
        let catalog = CrdCatalog::from_documents([document]).expect("catalog builds");
        let entry = catalog.iter().next().expect("one entry");
        let resource = CrdResource::new(entry).expect("resource builds");

        let req = ValidateConfigRequest {
            config: Config::new(json!({ "metadata": { "name": "gadget" }, "spec": { "size": 3 } })),
        };
        let mut resp = ValidateConfigResponse::default();
        resource.validate_config(&req, &mut resp).await;

        assert!(!resp.diagnostics.has_error(), "{}", resp.diagnostics);
        let warnings: Vec<(&str, &str)> = resp
            .diagnostics
            .iter()
            .map(|d| (d.summary.as_str(), d.detail.as_str()))
            .collect();
        assert_eq!(
            warnings,
            vec![("Deprecated API version", "Gadget example.com/v1 is deprecated by its CRD")]
        );
    }

    #[tokio::test]
    async fn test_validate_config_current_version_has_no_warning() {
        let req = ValidateConfigRequest {
            config: Config::new(kiali_config()),
        };
        let mut resp = ValidateConfigResponse::default();
        kiali().validate_config(&req, &mut resp).await;
        assert!(resp.diagnostics.is_empty(), "{}", resp.diagnostics);
    }
}
