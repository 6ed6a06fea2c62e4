//! # App Registry
//!
//! Loads the managed-app catalog from `data/apps.yaml`, validates each entry
//! and resolves names (or no name at all) to an [`AppConfig`]. Built once at
//! startup and read-only afterward.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::app::AppConfig;

/// Fatal at startup: the bot must not serve requests without a valid catalog.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Apps config file not found: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("Failed to read apps config {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid apps config: {0}")]
    Invalid(#[from] serde_yaml::Error),
    #[error("No apps configured")]
    NoApps,
    #[error("Configured default_app '{0}' is not a registered app")]
    UnknownDefault(String),
}

/// Recoverable: reported back to the caller with the list of valid names.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown app: '{requested}'. Available apps: {}", .available.join(", "))]
pub struct AppNotFoundError {
    pub requested: String,
    /// Sorted list of registered names.
    pub available: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryDoc {
    #[serde(default)]
    default_app: Option<String>,
    #[serde(default)]
    apps: Vec<AppConfig>,
}

/// Registry of managed applications, in configuration-file order.
#[derive(Debug, Clone)]
pub struct AppRegistry {
    apps: Vec<AppConfig>,
    default_app: String,
}

impl AppRegistry {
    /// Load the registry from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            return Err(ConfigurationError::MissingSource(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| {
            ConfigurationError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_yaml(&text)
    }

    /// Build the registry from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigurationError> {
        let doc: RegistryDoc = serde_yaml::from_str(text)?;

        let mut apps: Vec<AppConfig> = Vec::new();
        for app in doc.apps {
            // Advisory only: a broken app stays registered so the operator
            // sees a clear "script not found" error at execution time.
            if let Err(issue) = app.validate() {
                tracing::warn!("Invalid configuration for app '{}': {}", app.name, issue);
            }

            match apps.iter_mut().find(|existing| existing.name == app.name) {
                Some(existing) => {
                    // Last write wins, keeping the original position.
                    tracing::warn!("Duplicate app '{}', keeping the later entry", app.name);
                    *existing = app;
                }
                None => {
                    tracing::info!("Registered app '{}' at {}", app.name, app.path.display());
                    apps.push(app);
                }
            }
        }

        if apps.is_empty() {
            return Err(ConfigurationError::NoApps);
        }

        let default_app = match doc.default_app {
            Some(name) => {
                if !apps.iter().any(|app| app.name == name) {
                    return Err(ConfigurationError::UnknownDefault(name));
                }
                name
            }
            None => {
                let first = apps[0].name.clone();
                tracing::info!("No default_app configured, using first app '{}'", first);
                first
            }
        };

        Ok(Self { apps, default_app })
    }

    /// Resolve a name to an app; `None` or an empty name resolves the
    /// default app.
    pub fn resolve(&self, name: Option<&str>) -> Result<&AppConfig, AppNotFoundError> {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => self.default_app.as_str(),
        };

        self.apps
            .iter()
            .find(|app| app.name == name)
            .ok_or_else(|| {
                let mut available: Vec<String> =
                    self.apps.iter().map(|app| app.name.clone()).collect();
                available.sort();
                AppNotFoundError {
                    requested: name.to_string(),
                    available,
                }
            })
    }

    pub fn default_app(&self) -> &str {
        &self.default_app
    }

    /// All apps in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AppConfig> {
        self.apps.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_APPS: &str = "\
apps:
  - name: web
    path: /srv/web
  - name: api
    path: /srv/api
";

    #[test]
    fn load_fails_on_missing_file() {
        let err = AppRegistry::load(Path::new("/nonexistent/apps.yaml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingSource(_)));
    }

    #[test]
    fn load_fails_on_unparseable_document() {
        let err = AppRegistry::from_yaml("apps: [not, a, mapping]").unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(_)));
    }

    #[test]
    fn load_fails_on_empty_app_list() {
        let err = AppRegistry::from_yaml("apps: []").unwrap_err();
        assert!(matches!(err, ConfigurationError::NoApps));
    }

    #[test]
    fn first_app_becomes_default_when_unset() {
        let registry = AppRegistry::from_yaml(TWO_APPS).unwrap();
        assert_eq!(registry.default_app(), "web");
        assert_eq!(registry.names(), vec!["web", "api"]);
    }

    #[test]
    fn explicit_default_is_honored() {
        let yaml = format!("default_app: api\n{TWO_APPS}");
        let registry = AppRegistry::from_yaml(&yaml).unwrap();
        assert_eq!(registry.default_app(), "api");
    }

    #[test]
    fn explicit_default_must_be_registered() {
        let yaml = format!("default_app: ghost\n{TWO_APPS}");
        let err = AppRegistry::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownDefault(name) if name == "ghost"));
    }

    #[test]
    fn resolve_none_and_empty_return_default() {
        let registry = AppRegistry::from_yaml(TWO_APPS).unwrap();
        assert_eq!(registry.resolve(None).unwrap().name, "web");
        assert_eq!(registry.resolve(Some("")).unwrap().name, "web");
        assert_eq!(
            registry.resolve(None).unwrap().name,
            registry.resolve(Some("web")).unwrap().name
        );
    }

    #[test]
    fn resolve_unknown_lists_known_names() {
        let registry = AppRegistry::from_yaml(TWO_APPS).unwrap();
        let err = registry.resolve(Some("nope")).unwrap_err();
        assert_eq!(err.requested, "nope");
        assert_eq!(err.available, vec!["api", "web"]);
        assert_eq!(
            err.to_string(),
            "Unknown app: 'nope'. Available apps: api, web"
        );
    }

    #[test]
    fn duplicate_name_is_last_write_wins_in_place() {
        let yaml = "\
apps:
  - name: web
    path: /srv/web-old
  - name: api
    path: /srv/api
  - name: web
    path: /srv/web-new
";
        let registry = AppRegistry::from_yaml(yaml).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["web", "api"]);
        assert_eq!(
            registry.resolve(Some("web")).unwrap().path,
            PathBuf::from("/srv/web-new")
        );
    }
}
