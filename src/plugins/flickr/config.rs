use crate::error::Error;
use crate::flickr::Credentials;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_PHOTO_LIMIT: u64 = 1000;
pub const DEFAULT_UPLOAD_SIZE: &str = "original";

const REQUIRED_KEYS: [&str; 5] = [
    "flickr_api_key",
    "flickr_api_secret",
    "flickr_oauth_token",
    "flickr_oauth_token_secret",
    "flickr_user_id",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    flickr_api_key: Option<String>,
    flickr_api_secret: Option<String>,
    flickr_oauth_token: Option<String>,
    flickr_oauth_token_secret: Option<String>,
    flickr_user_id: Option<String>,
    flickr_photo_limit: Option<u64>,
    flickr_photo_limit_initial_count: Option<u64>,
    upload_size: Option<String>,
    photo_description_footer: Option<String>,
    group_sets: Vec<GroupSet>,
}

/// Validated plugin configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FlickrConfig {
    pub credentials: Credentials,
    pub user_id: String,
    pub photo_limit: u64,
    pub photo_limit_initial_count: u64,
    pub upload_size: String,
    pub photo_description_footer: Option<String>,
    pub group_sets: Vec<GroupSet>,
}

/// Groups a photo is added to, and the rules that select the set automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupSet {
    pub name: Option<String>,
    pub groups: Vec<String>,
    /// The photo must carry all of these tags.
    pub auto_tags: Vec<String>,
    /// The photo must be in one of these albums, by uuid or slug.
    pub auto_albums: Vec<String>,
}

impl FlickrConfig {
    pub fn from_value(config: &Value) -> Result<Self, Error> {
        let raw: RawConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::Config(format!("invalid Flickr configuration: {}", e)))?;

        let required = [
            &raw.flickr_api_key,
            &raw.flickr_api_secret,
            &raw.flickr_oauth_token,
            &raw.flickr_oauth_token_secret,
            &raw.flickr_user_id,
        ];
        if required
            .iter()
            .any(|v| v.as_deref().map_or(true, str::is_empty))
        {
            return Err(Error::Config(format!(
                "{} are required",
                REQUIRED_KEYS.join(", ")
            )));
        }

        Ok(FlickrConfig {
            credentials: Credentials {
                consumer_key: raw.flickr_api_key.unwrap_or_default(),
                consumer_secret: raw.flickr_api_secret.unwrap_or_default(),
                access_token: raw.flickr_oauth_token.unwrap_or_default(),
                access_token_secret: raw.flickr_oauth_token_secret.unwrap_or_default(),
            },
            user_id: raw.flickr_user_id.unwrap_or_default(),
            photo_limit: raw.flickr_photo_limit.unwrap_or(DEFAULT_PHOTO_LIMIT),
            photo_limit_initial_count: raw.flickr_photo_limit_initial_count.unwrap_or(0),
            upload_size: raw
                .upload_size
                .unwrap_or_else(|| DEFAULT_UPLOAD_SIZE.to_string()),
            photo_description_footer: raw.photo_description_footer.filter(|f| !f.is_empty()),
            group_sets: raw.group_sets,
        })
    }
}

/// Per-photo parameters. Read leniently: a value of the wrong type counts as
/// absent, and `force` follows JSON truthiness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityParams {
    pub override_description: Option<String>,
    /// Only honoured when it is a list; elements are stringified.
    pub additional_tags: Value,
    /// Only honoured when it is a list of names.
    pub additional_group_sets: Value,
    pub force: bool,
    pub safety_level: Option<Value>,
}

impl EntityParams {
    pub fn from_value(params: &Value) -> Self {
        let field = |key: &str| params.get(key).cloned().unwrap_or(Value::Null);
        EntityParams {
            override_description: params
                .get("override_description")
                .and_then(Value::as_str)
                .map(str::to_string),
            additional_tags: field("additional_tags"),
            additional_group_sets: field("additional_group_sets"),
            force: params.get("force").map_or(false, is_truthy),
            safety_level: params.get("safety_level").filter(|v| !v.is_null()).cloned(),
        }
    }

    pub fn override_description(&self) -> Option<&str> {
        self.override_description
            .as_deref()
            .filter(|d| !d.is_empty())
    }

    pub fn additional_tags(&self) -> impl Iterator<Item = String> + '_ {
        self.additional_tags
            .as_array()
            .into_iter()
            .flatten()
            .map(|tag| match tag {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    pub fn additional_group_sets(&self) -> impl Iterator<Item = &str> + '_ {
        self.additional_group_sets
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

/// null, false, 0, "" and empty containers are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials_json() -> Value {
        json!({
            "flickr_api_key": "ck",
            "flickr_api_secret": "cs",
            "flickr_oauth_token": "tok",
            "flickr_oauth_token_secret": "ts",
            "flickr_user_id": "12345678@N01",
        })
    }

    #[test]
    fn test_defaults() {
        let config = FlickrConfig::from_value(&credentials_json()).unwrap();
        assert_eq!(config.credentials.consumer_key, "ck");
        assert_eq!(config.credentials.access_token_secret, "ts");
        assert_eq!(config.user_id, "12345678@N01");
        assert_eq!(config.photo_limit, 1000);
        assert_eq!(config.photo_limit_initial_count, 0);
        assert_eq!(config.upload_size, "original");
        assert_eq!(config.photo_description_footer, None);
        assert!(config.group_sets.is_empty());
    }

    #[test]
    fn test_full_config() {
        let mut value = credentials_json();
        let extra = json!({
            "flickr_photo_limit": 200,
            "flickr_photo_limit_initial_count": 12,
            "upload_size": "large",
            "photo_description_footer": "© Me",
            "group_sets": [
                {"name": "landscapes", "groups": ["g1", "g2"], "auto_tags": ["mountain"]},
                {"groups": ["g3"]}
            ],
            "unknown_key": true
        });
        value
            .as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        let config = FlickrConfig::from_value(&value).unwrap();
        assert_eq!(config.photo_limit, 200);
        assert_eq!(config.photo_limit_initial_count, 12);
        assert_eq!(config.upload_size, "large");
        assert_eq!(config.photo_description_footer.as_deref(), Some("© Me"));
        assert_eq!(config.group_sets.len(), 2);
        assert_eq!(config.group_sets[0].groups, vec!["g1", "g2"]);
        assert_eq!(config.group_sets[1].name, None);
    }

    #[test]
    fn test_missing_credentials() {
        for key in REQUIRED_KEYS {
            let mut value = credentials_json();
            value.as_object_mut().unwrap().remove(key);
            let err = FlickrConfig::from_value(&value).unwrap_err();
            assert!(matches!(err, Error::Config(ref m) if m.contains("are required")), "{}", key);
        }
        let mut value = credentials_json();
        value["flickr_api_secret"] = json!("");
        assert!(matches!(
            FlickrConfig::from_value(&value),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_entity_params() {
        let params = EntityParams::from_value(&json!({
            "override_description": "",
            "additional_tags": ["black and white", 35],
            "additional_group_sets": ["street", 7],
            "force": true,
            "safety_level": 2
        }));
        assert_eq!(params.override_description(), None);
        assert_eq!(
            params.additional_tags().collect::<Vec<_>>(),
            vec!["black and white", "35"]
        );
        assert_eq!(params.additional_group_sets().collect::<Vec<_>>(), vec!["street"]);
        assert_eq!(params.safety_level, Some(json!(2)));
        assert!(params.force);

        let params = EntityParams::from_value(&json!({"additional_tags": "not-a-list"}));
        assert_eq!(params.additional_tags().count(), 0);
        assert!(!params.force);

        assert_eq!(EntityParams::from_value(&Value::Null), EntityParams::default());
        assert_eq!(EntityParams::from_value(&json!(["force"])), EntityParams::default());
    }

    #[test]
    fn test_entity_params_loose_types() {
        let params = EntityParams::from_value(&json!({
            "override_description": 5,
            "force": null,
            "safety_level": null
        }));
        assert_eq!(params.override_description(), None);
        assert_eq!(params.safety_level, None);
        assert!(!params.force);

        for falsy in [json!(false), json!(0), json!(0.0), json!(""), json!([])] {
            assert!(!EntityParams::from_value(&json!({ "force": falsy })).force);
        }
        for truthy in [json!(true), json!(1), json!(-2.5), json!("yes"), json!({"a": 1})] {
            assert!(EntityParams::from_value(&json!({ "force": truthy })).force);
        }
    }
}
