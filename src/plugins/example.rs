//! Example plugin demonstrating the plugin interface: reading configuration,
//! per-entity parameters, persistent storage, image access and event handling.

use crate::error::Error;
use crate::host::{PhotoData, Photoserv, Plugin, PluginMetadata};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

const CALL_COUNT: &str = "call_count";
const THUMBNAIL_SIZE: &str = "photoserv_ui_small";
const API_KEY_NOT_SET: &str = "not_set";

pub static METADATA: PluginMetadata = PluginMetadata {
    name: "Example Plugin",
    uuid: "00000000-0000-0000-0000-000000000000",
    version: "0.1.0",
    author: "Max Loiacono",
    website: "https://github.com/photoserv/python-plugins/blob/main/plugins/example_plugin.md",
    config: &[
        ("example_param", "An example configuration parameter"),
        ("api_key", "An API key for external service (can use ${ENV_VAR} syntax)"),
        ("max_retries", "Maximum number of retry attempts (numeric value)"),
        ("enabled_features", "List of enabled features (array of strings)"),
    ],
    entity_parameters: &[
        ("custom_field", "A custom field specific to this photo"),
        ("priority", "Priority level for this entity (numeric, e.g., 1-10)"),
        ("tags", "Array of tags to apply to this photo"),
    ],
};

/// Settings read from the host configuration. Values of an unexpected type
/// fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleConfig {
    pub api_key: String,
    pub max_retries: u64,
    pub enabled_features: Vec<String>,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        ExampleConfig {
            api_key: API_KEY_NOT_SET.to_string(),
            max_retries: 3,
            enabled_features: Vec::new(),
        }
    }
}

impl ExampleConfig {
    pub fn from_value(config: &Value) -> Self {
        let defaults = ExampleConfig::default();
        ExampleConfig {
            api_key: config
                .get("api_key")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.api_key),
            max_retries: config
                .get("max_retries")
                .and_then(|v| match v {
                    Value::String(s) => s.trim().parse().ok(),
                    other => other.as_u64(),
                })
                .unwrap_or(defaults.max_retries),
            enabled_features: config
                .get("enabled_features")
                .and_then(Value::as_array)
                .map(|features| {
                    features
                        .iter()
                        .map(|f| match f {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .unwrap_or(defaults.enabled_features),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct ExampleParams {
    custom_field: Option<String>,
    priority: i64,
    tags: Vec<String>,
}

pub struct ExamplePlugin<H> {
    config: ExampleConfig,
    host: H,
}

impl<H: Photoserv> ExamplePlugin<H> {
    pub fn new(config: &Value, mut host: H) -> Result<Self, Error> {
        let keys = config
            .as_object()
            .map(|m| m.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        info!(keys = ?keys, "Plugin initialized with config keys");
        for (key, value) in config.as_object().into_iter().flatten() {
            info!(key = %key, value = %value, kind = json_kind(value), "config value");
        }

        let parsed = ExampleConfig::from_value(config);
        info!(
            configured = parsed.api_key != API_KEY_NOT_SET,
            "API key configured"
        );
        info!(max_retries = parsed.max_retries, "Max retries");
        info!(enabled_features = ?parsed.enabled_features, "Enabled features");

        let call_count = host
            .config()
            .get(CALL_COUNT)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        info!(call_count, "Plugin call count");
        host.config_mut().set(CALL_COUNT, json!(call_count + 1))?;

        Ok(ExamplePlugin {
            config: parsed,
            host,
        })
    }

    pub fn config(&self) -> &ExampleConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn has_params(params: &Value) -> bool {
    match params {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        _ => true,
    }
}

impl<H: Photoserv> Plugin for ExamplePlugin<H> {
    fn metadata(&self) -> &'static PluginMetadata {
        &METADATA
    }

    fn on_global_change(&mut self) -> Result<(), Error> {
        info!("Global change event received");
        Ok(())
    }

    fn on_photo_publish(&mut self, data: &PhotoData, params: &Value) -> Result<(), Error> {
        info!(title = ?data.title, uuid = %data.uuid, "Photo published");

        if has_params(params) {
            info!(params = %params, "Entity parameters");
            match serde_json::from_value::<ExampleParams>(params.clone()) {
                Ok(p) => {
                    if let Some(custom_field) = p.custom_field.filter(|f| !f.is_empty()) {
                        info!(custom_field = %custom_field, "Custom field");
                    }
                    if p.priority > 0 {
                        info!(priority = p.priority, "Priority");
                    }
                    if !p.tags.is_empty() {
                        info!(tags = %p.tags.join(", "), "Tags");
                    }
                }
                Err(e) => error!(error = %e, "Unexpected entity parameter types"),
            }
        }

        match self.host.get_photo_image(data, THUMBNAIL_SIZE) {
            Ok(Some(thumbnail)) => {
                info!("Retrieved thumbnail image stream");
                drop(thumbnail);
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "Error getting thumbnail"),
        }
        Ok(())
    }

    fn on_photo_unpublish(&mut self, data: &PhotoData, params: &Value) -> Result<(), Error> {
        info!(title = ?data.title, uuid = %data.uuid, "Photo unpublished");
        if has_params(params) {
            info!(params = %params, "Entity parameters");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::KeyValueStore;
    use crate::testing::{init_tracing, TestHost};

    fn photo() -> PhotoData {
        serde_json::from_value(json!({"uuid": "p-1", "title": "Harbour"})).unwrap()
    }

    #[test]
    fn test_config_defaults_and_call_count() {
        init_tracing();
        let plugin = ExamplePlugin::new(&json!({}), TestHost::default()).unwrap();
        assert_eq!(plugin.config(), &ExampleConfig::default());
        assert_eq!(plugin.host().store.get(CALL_COUNT).unwrap(), Some(json!(1)));

        let mut host = TestHost::default();
        host.store.set(CALL_COUNT, json!(4)).unwrap();
        let config = json!({
            "example_param": "some value",
            "api_key": "k-123",
            "max_retries": 5,
            "enabled_features": ["feature1", "feature2"]
        });
        let plugin = ExamplePlugin::new(&config, host).unwrap();
        assert_eq!(plugin.config().api_key, "k-123");
        assert_eq!(plugin.config().max_retries, 5);
        assert_eq!(plugin.config().enabled_features, vec!["feature1", "feature2"]);
        assert_eq!(plugin.host().store.get(CALL_COUNT).unwrap(), Some(json!(5)));
    }

    #[test]
    fn test_loosely_typed_config_falls_back() {
        let plugin =
            ExamplePlugin::new(&json!({"max_retries": "3"}), TestHost::default()).unwrap();
        assert_eq!(plugin.config().max_retries, 3);

        let config = json!({
            "api_key": null,
            "max_retries": 2.5,
            "enabled_features": ["a", 1]
        });
        let plugin = ExamplePlugin::new(&config, TestHost::default()).unwrap();
        assert_eq!(plugin.config().api_key, API_KEY_NOT_SET);
        assert_eq!(plugin.config().max_retries, 3);
        assert_eq!(plugin.config().enabled_features, vec!["a", "1"]);

        let plugin = ExamplePlugin::new(&json!(["not", "a", "map"]), TestHost::default()).unwrap();
        assert_eq!(plugin.config(), &ExampleConfig::default());
    }

    #[test]
    fn test_publish_fetches_and_closes_thumbnail() {
        init_tracing();
        let mut plugin = ExamplePlugin::new(&json!({}), TestHost::with_image(b"thumb")).unwrap();
        let params = json!({"custom_field": "special_value", "priority": 5, "tags": ["featured"]});
        plugin.on_photo_publish(&photo(), &params).unwrap();
        assert_eq!(*plugin.host().requested_sizes.borrow(), vec![THUMBNAIL_SIZE]);
        assert_eq!(plugin.host().closed_streams.get(), 1);
    }

    #[test]
    fn test_publish_tolerates_image_errors() {
        let host = TestHost {
            image_error: true,
            ..TestHost::default()
        };
        let mut plugin = ExamplePlugin::new(&json!({}), host).unwrap();
        plugin
            .on_photo_publish(&photo(), &json!({"priority": "high"}))
            .unwrap();
        plugin.on_photo_unpublish(&photo(), &Value::Null).unwrap();
        plugin.on_global_change().unwrap();
        assert_eq!(plugin.metadata().name, "Example Plugin");
    }
}
