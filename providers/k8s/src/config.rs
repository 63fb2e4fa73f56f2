//! Provider configuration
//!
//! The provider type name prefixes every resource type name. CRDs come from
//! the builtin catalog plus any extra CRD files listed here.

use crate::error::ProviderError;
use crds::{CrdCatalog, CrdDocument};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::info;

/// Type name used when none is configured
pub const DEFAULT_TYPE_NAME: &str = "k8s";

/// Environment variable overriding the provider type name
pub const TYPE_NAME_ENV: &str = "TF_K8S_PROVIDER_TYPE_NAME";

static TYPE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid type name regex"));

/// Provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Prefix of every resource type name (e.g. `k8s`)
    pub type_name: String,

    /// Extra CRD files loaded on top of the builtin catalog
    pub crd_files: Vec<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            type_name: DEFAULT_TYPE_NAME.to_string(),
            crd_files: Vec::new(),
        }
    }
}

impl ProviderConfig {
    pub fn new(type_name: impl Into<String>) -> Result<Self, ProviderError> {
        let config = Self {
            type_name: type_name.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_crd_files(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.crd_files.extend(files);
        self
    }

    /// Type names must be lowercase identifiers
    pub fn validate(&self) -> Result<(), ProviderError> {
        if !TYPE_NAME_RE.is_match(&self.type_name) {
            return Err(ProviderError::InvalidConfig(format!(
                "provider type name {:?} must match {}",
                self.type_name,
                TYPE_NAME_RE.as_str()
            )));
        }
        Ok(())
    }

    /// Builtin catalog plus every CRD in `crd_files`
    pub fn load_catalog(&self) -> Result<CrdCatalog, ProviderError> {
        let mut catalog = CrdCatalog::builtin()?;
        for path in &self.crd_files {
            let source_name = path.display().to_string();
            let source = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
                path: source_name.clone(),
                source,
            })?;
            for document in CrdDocument::parse_all(&source_name, &source)? {
                catalog.add_document(&document)?;
            }
            info!("Loaded CRDs from {}", source_name);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_type_name() {
        let config = ProviderConfig::default();
        assert_eq!(config.type_name, "k8s");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_type_name() {
        for name in ["", "K8s", "1k8s", "k8s-provider"] {
            let err = ProviderConfig::new(name).expect_err("type name should be rejected");
            assert!(matches!(err, ProviderError::InvalidConfig(_)), "{name}: {err}");
        }
        assert!(ProviderConfig::new("kube_manifests").is_ok());
    }

    #[test]
    fn test_load_builtin_catalog() {
        let catalog = ProviderConfig::default().load_catalog().expect("builtin catalog loads");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_missing_crd_file() {
        let config = ProviderConfig::default().with_crd_files([PathBuf::from("/nonexistent/crd.yaml")]);
        let err = config.load_catalog().expect_err("file does not exist");
        assert!(matches!(err, ProviderError::Io { .. }));
    }
}
