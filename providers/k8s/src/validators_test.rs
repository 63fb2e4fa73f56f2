//! Unit tests for validators module

#[cfg(test)]
mod tests {
    use crate::validators::*;
    use plugin_framework::{AttributePath, AttributeValidator, Diagnostics};
    use serde_json::{Value, json};

    fn run(validator: &dyn AttributeValidator, path: &AttributePath, value: Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        validator.validate(path, &value, &mut diagnostics);
        diagnostics
    }

    fn name_path() -> AttributePath {
        AttributePath::root("metadata").attribute("name")
    }

    #[test]
    fn test_name_accepts_subdomains() {
        for name in ["my-kiali", "scylla.db.example.com", "a", "0abc"] {
            assert!(run(&NameValidator, &name_path(), json!(name)).is_empty(), "{name}");
        }
    }

    #[test]
    fn test_name_rejects_invalid() {
        for name in ["My-Kiali", "-kiali", "kiali-", "kiali_db", ""] {
            let diagnostics = run(&NameValidator, &name_path(), json!(name));
            assert!(diagnostics.has_error(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_name_length_limit() {
        let long = "a".repeat(DNS1123_SUBDOMAIN_MAX_LENGTH + 1);
        let diagnostics = run(&NameValidator, &name_path(), json!(long));
        let detail = &diagnostics.iter().next().expect("one diagnostic").detail;
        assert!(detail.contains("must be no more than 253 characters"), "{detail}");

        let max = "a".repeat(DNS1123_SUBDOMAIN_MAX_LENGTH);
        assert!(run(&NameValidator, &name_path(), json!(max)).is_empty());
    }

    #[test]
    fn test_namespace_is_a_label() {
        let path = AttributePath::root("metadata").attribute("namespace");
        assert!(run(&NamespaceValidator, &path, json!("istio-system")).is_empty());
        assert!(run(&NamespaceValidator, &path, json!("istio.system")).has_error());
        assert!(run(&NamespaceValidator, &path, json!("a".repeat(64))).has_error());
    }

    #[test]
    fn test_labels_report_at_key() {
        let path = AttributePath::root("metadata").attribute("labels");
        let labels = json!({
            "app.kubernetes.io/name": "kiali",
            "tier": "",
            "bad key": "x",
            "team": "-oops"
        });
        let diagnostics = run(&LabelValidator, &path, labels);
        let paths: Vec<String> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
            .collect();
        assert_eq!(
            paths,
            vec![
                r#"metadata.labels["bad key"]"#.to_string(),
                r#"metadata.labels["team"]"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_scalar_values_checked_as_strings() {
        let path = AttributePath::root("metadata").attribute("labels");
        assert!(run(&LabelValidator, &path, json!({ "version": 2, "canary": true })).is_empty());

        let diagnostics = run(&LabelValidator, &path, json!({ "offset": -1.5 }));
        let paths: Vec<String> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
            .collect();
        assert_eq!(paths, vec![r#"metadata.labels["offset"]"#.to_string()]);

        assert!(run(&NameValidator, &name_path(), json!(123)).is_empty());
    }

    #[test]
    fn test_qualified_name_prefix() {
        assert!(qualified_name_errors("example.com/my-name").is_empty());
        assert!(!qualified_name_errors("/name").is_empty());
        assert!(!qualified_name_errors("Example.com/name").is_empty());
        assert!(!qualified_name_errors("a/b/c").is_empty());
        assert!(!qualified_name_errors("example.com/").is_empty());
    }

    #[test]
    fn test_label_value_length() {
        assert!(label_value_errors(&"v".repeat(63)).is_empty());
        assert!(!label_value_errors(&"v".repeat(64)).is_empty());
    }

    #[test]
    fn test_annotations_total_size() {
        let path = AttributePath::root("metadata").attribute("annotations");
        assert!(run(&AnnotationValidator, &path, json!({ "note": "hello" })).is_empty());

        let big = "x".repeat(TOTAL_ANNOTATION_SIZE_LIMIT);
        let diagnostics = run(&AnnotationValidator, &path, json!({ "note": big }));
        assert!(diagnostics.has_error());
        assert_eq!(
            diagnostics.iter().next().and_then(|d| d.attribute.clone()),
            Some(path)
        );
    }

    #[test]
    fn test_annotation_keys_are_qualified_names() {
        let path = AttributePath::root("metadata").attribute("annotations");
        let diagnostics = run(&AnnotationValidator, &path, json!({ "not/a/key": "v" }));
        assert!(diagnostics.has_error());
    }
}
