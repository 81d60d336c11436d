//! Publishes photos to Flickr.
//!
//! Uploads carry the photo's title, description and tags; afterwards the
//! photo is added to the groups of every matching group set. The Flickr id of
//! each upload and a running count of published photos are kept in the host's
//! key-value store.

mod config;

pub use config::{EntityParams, FlickrConfig, GroupSet, DEFAULT_PHOTO_LIMIT, DEFAULT_UPLOAD_SIZE};

use crate::builder::ApiRequest;
use crate::error::{Error, PolicyError};
#[cfg(feature = "reqwest")]
use crate::flickr::ReqwestTransport;
use crate::flickr::{FlickrClient, Transport};
use crate::host::{PhotoData, Photoserv, Plugin, PluginMetadata};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io::Read;
use tracing::{error, info, warn};

pub const PUBLISHED_PHOTO_COUNT: &str = "published_photo_count";

const PHOTO_FIELD: &str = "photo";
const PHOTO_FILENAME: &str = "photo.jpg";

pub static METADATA: PluginMetadata = PluginMetadata {
    name: "Flickr",
    uuid: "dd5efb7c-4f55-4203-b261-468ccecc0f46",
    version: "0.1.0",
    author: "Max Loiacono",
    website: "https://github.com/photoserv/python-plugins/blob/main/plugins/flickr.md",
    config: &[
        ("flickr_api_key", "Flickr API Key (Consumer Key)"),
        ("flickr_api_secret", "Flickr API Secret (Consumer Secret)"),
        ("flickr_oauth_token", "Flickr OAuth Access Token (obtain via OAuth flow)"),
        ("flickr_oauth_token_secret", "Flickr OAuth Token Secret (obtain via OAuth flow)"),
        ("flickr_user_id", "Flickr User ID (NSID format, e.g., 12345678@N01)"),
        ("flickr_photo_limit", "(int) Maximum number of photos to publish (default: 1000)"),
        (
            "flickr_photo_limit_initial_count",
            "(int) Number of photos already in Flickr before installing this plugin (default: 0)",
        ),
        ("upload_size", "(string) Size of photo to upload to Flickr (default: 'original')"),
        ("photo_description_footer", "Optional footer text to append to photo descriptions"),
        (
            "group_sets",
            "Array of group set configurations with name, groups, auto_tags, and auto_albums",
        ),
    ],
    entity_parameters: &[
        ("override_description", "Override the default photo description"),
        ("additional_tags", "Additional tags to add to this photo"),
        ("additional_group_sets", "Additional group set names to apply to this photo"),
        (
            "force",
            "(bool) Force the operation to run without checking existing Flickr state (default: false)",
        ),
        (
            "safety_level",
            "(int) Safety level: 1 for Safe, 2 for Moderate, or 3 for Restricted (default: user's default)",
        ),
    ],
};

/// Store key holding the Flickr id of an uploaded photo.
pub fn upload_key(photo_uuid: &str) -> String {
    format!("{}_uploaded", photo_uuid)
}

pub struct FlickrPlugin<H, T> {
    config: FlickrConfig,
    host: H,
    client: FlickrClient<T>,
}

#[cfg(feature = "reqwest")]
impl<H: Photoserv> FlickrPlugin<H, ReqwestTransport> {
    pub fn new(config: &Value, host: H) -> Result<Self, Error> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, host, transport)
    }
}

impl<H: Photoserv, T: Transport> FlickrPlugin<H, T> {
    pub fn with_transport(config: &Value, mut host: H, transport: T) -> Result<Self, Error> {
        let config = FlickrConfig::from_value(config).map_err(|e| {
            error!(error = %e, "Missing required Flickr credentials in configuration");
            e
        })?;

        info!(user_id = %config.user_id, "Flickr plugin initialized");
        info!(
            photo_limit = config.photo_limit,
            initial_count = config.photo_limit_initial_count,
            upload_size = %config.upload_size,
            group_sets = config.group_sets.len(),
            "Flickr plugin settings"
        );

        if host.config().get(PUBLISHED_PHOTO_COUNT)?.is_none() {
            host.config_mut()
                .set(PUBLISHED_PHOTO_COUNT, json!(config.photo_limit_initial_count))?;
            info!(
                count = config.photo_limit_initial_count,
                "Initialized published_photo_count"
            );
        }

        let client = FlickrClient::new(config.credentials.clone(), transport);
        Ok(FlickrPlugin {
            config,
            host,
            client,
        })
    }

    pub fn config(&self) -> &FlickrConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn client(&self) -> &FlickrClient<T> {
        &self.client
    }

    fn published_count(&self) -> Result<u64, Error> {
        match self.host.config().get(PUBLISHED_PHOTO_COUNT)? {
            None => Ok(0),
            Some(v) => v.as_u64().ok_or_else(|| {
                Error::Store(format!("{} is not a count: {}", PUBLISHED_PHOTO_COUNT, v))
            }),
        }
    }

    fn stored_photo_id(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(match self.host.config().get(key)? {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
    }

    /// Override or photo description, followed by the configured footer.
    pub fn build_description(&self, data: &PhotoData, params: &EntityParams) -> String {
        let mut description = params
            .override_description()
            .or(data.description.as_deref())
            .unwrap_or_default()
            .to_string();
        if let Some(footer) = &self.config.photo_description_footer {
            if description.is_empty() {
                description = footer.clone();
            } else {
                description.push_str("\n\n");
                description.push_str(footer);
            }
        }
        description
    }

    /// Group sets whose rules match the photo, then those named in `params`.
    pub fn applicable_group_sets(&self, data: &PhotoData, params: &EntityParams) -> Vec<&GroupSet> {
        let tag_names: HashSet<&str> = data.tags.iter().map(|t| t.name.as_str()).collect();
        let album_keys: HashSet<&str> = data
            .albums
            .iter()
            .flat_map(|a| a.uuid.as_deref().into_iter().chain(a.slug.as_deref()))
            .collect();

        let mut applicable = Vec::new();
        for group_set in &self.config.group_sets {
            let name = match group_set.name.as_deref() {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };

            if !group_set.auto_tags.is_empty()
                && group_set
                    .auto_tags
                    .iter()
                    .all(|t| tag_names.contains(t.as_str()))
            {
                info!(group_set = name, "Auto-matched group set via tags");
                applicable.push(group_set);
                continue;
            }

            if group_set
                .auto_albums
                .iter()
                .any(|a| album_keys.contains(a.as_str()))
            {
                info!(group_set = name, "Auto-matched group set via albums");
                applicable.push(group_set);
            }
        }

        for name in params.additional_group_sets() {
            let found = self
                .config
                .group_sets
                .iter()
                .find(|s| s.name.as_deref() == Some(name));
            if let Some(group_set) = found {
                if !applicable.contains(&group_set) {
                    info!(group_set = name, "Added group set via entity params");
                    applicable.push(group_set);
                }
            }
        }
        applicable
    }

    /// Adds the photo to every group; a failing group is logged and skipped.
    fn add_photo_to_groups(&self, flickr_photo_id: &str, group_sets: &[&GroupSet]) {
        for group_set in group_sets {
            let set_name = group_set.name.as_deref().unwrap_or("unnamed");
            for group_id in &group_set.groups {
                info!(group_id = %group_id, group_set = set_name, "Adding photo to group");
                let request = ApiRequest::method("flickr.groups.pools.add")
                    .param("photo_id", flickr_photo_id)
                    .param("group_id", group_id.as_str());
                if let Err(e) = self.client.call_method(request) {
                    error!(group_id = %group_id, error = %e, "Failed to add photo to group");
                }
            }
        }
    }

    fn upload_and_record(
        &mut self,
        data: &PhotoData,
        params: &EntityParams,
        image: Box<dyn Read>,
        existing_flickr_id: Option<&str>,
        published_count: u64,
    ) -> Result<(), Error> {
        let description = self.build_description(data, params);
        let tags = build_tags(data, params);
        info!(
            title = data.title_or_untitled(),
            description = %description,
            tags = %tags.join(", "),
            "Uploading photo to Flickr"
        );

        // the stream is dropped, and so closed, when this block exits
        let photo_bytes = {
            let mut image = image;
            let mut buf = Vec::new();
            image.read_to_end(&mut buf)?;
            buf
        };

        let mut request = ApiRequest::upload()
            .param("title", data.title_or_untitled())
            .param("description", description.as_str())
            .param("tags", tags.join(" "))
            .param("is_public", "1")
            .param("is_friend", "0")
            .param("is_family", "0")
            .param("hidden", if data.hidden { "2" } else { "1" });
        if let Some(level) = &params.safety_level {
            match level.as_i64() {
                Some(level @ 1..=3) => {
                    info!(safety_level = level, "Safety level");
                    request = request.param("safety_level", level);
                }
                _ => warn!(safety_level = %level, "Invalid safety_level, using user default"),
            }
        }
        let request = request.param_bytes(PHOTO_FIELD, PHOTO_FILENAME, photo_bytes);

        let flickr_photo_id = self.client.upload(request)?;
        info!(flickr_id = %flickr_photo_id, "Photo uploaded successfully");

        let new_count = if existing_flickr_id.is_none() {
            let new_count = published_count + 1;
            self.host
                .config_mut()
                .set(PUBLISHED_PHOTO_COUNT, json!(new_count))?;
            new_count
        } else {
            published_count
        };
        self.host
            .config_mut()
            .set(&upload_key(&data.uuid), json!(flickr_photo_id))?;

        let group_sets = self.applicable_group_sets(data, params);
        if group_sets.is_empty() {
            info!("No group sets applicable for this photo");
        } else {
            info!(count = group_sets.len(), "Adding photo to group sets");
            self.add_photo_to_groups(&flickr_photo_id, &group_sets);
        }

        info!(
            published = new_count,
            limit = self.config.photo_limit,
            "Publish complete"
        );
        Ok(())
    }

    fn delete_and_forget(&mut self, key: &str, flickr_photo_id: &str) -> Result<(), Error> {
        info!(flickr_id = flickr_photo_id, "Deleting photo from Flickr");
        self.client.call_method(
            ApiRequest::method("flickr.photos.delete").param("photo_id", flickr_photo_id),
        )?;
        info!("Photo deleted successfully from Flickr");

        self.host.config_mut().delete(key)?;

        let published_count = self.published_count()?;
        if published_count > 0 {
            let new_count = published_count - 1;
            self.host
                .config_mut()
                .set(PUBLISHED_PHOTO_COUNT, json!(new_count))?;
            info!(published = new_count, "Unpublish complete");
        }
        Ok(())
    }
}

/// Photo tag names then additional tags, without spaces, empties or duplicates.
pub fn build_tags(data: &PhotoData, params: &EntityParams) -> Vec<String> {
    let mut seen = HashSet::new();
    data.tags
        .iter()
        .map(|t| t.name.clone())
        .chain(params.additional_tags())
        .map(|t| t.replace(' ', ""))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

impl<H: Photoserv, T: Transport> Plugin for FlickrPlugin<H, T> {
    fn metadata(&self) -> &'static PluginMetadata {
        &METADATA
    }

    fn on_photo_publish(&mut self, data: &PhotoData, params: &Value) -> Result<(), Error> {
        let params = EntityParams::from_value(params);
        let title = data.title_or_untitled();
        info!(title, uuid = %data.uuid, "Publishing photo to Flickr");

        let key = upload_key(&data.uuid);
        let existing_flickr_id = self.stored_photo_id(&key)?;
        if let Some(id) = &existing_flickr_id {
            if !params.force {
                info!(flickr_id = %id, "Photo already uploaded to Flickr, skipping");
                return Ok(());
            }
            info!(flickr_id = %id, "Photo already uploaded to Flickr, but force=true, proceeding anyway");
        }

        let published_count = self.published_count()?;
        if published_count >= self.config.photo_limit {
            error!(limit = self.config.photo_limit, "Photo limit reached, cannot publish");
            return Err(PolicyError::PhotoLimitReached {
                limit: self.config.photo_limit,
            }
            .into());
        }

        let image = self
            .host
            .get_photo_image(data, &self.config.upload_size)
            .and_then(|image| {
                image.ok_or_else(|| {
                    PolicyError::MissingImage {
                        size: self.config.upload_size.clone(),
                    }
                    .into()
                })
            })
            .map_err(|e| {
                error!(error = %e, "Error getting photo image");
                e
            })?;

        self.upload_and_record(
            data,
            &params,
            image,
            existing_flickr_id.as_deref(),
            published_count,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to publish photo");
            e
        })
    }

    fn on_photo_unpublish(&mut self, data: &PhotoData, params: &Value) -> Result<(), Error> {
        let params = EntityParams::from_value(params);
        info!(title = data.title_or_untitled(), uuid = %data.uuid, "Unpublishing photo from Flickr");

        let key = upload_key(&data.uuid);
        let flickr_photo_id = match self.stored_photo_id(&key)? {
            Some(id) => id,
            None if params.force => {
                warn!("No Flickr photo ID found, but force=true specified. Cannot unpublish without photo ID.");
                return Ok(());
            }
            None => {
                info!("Photo was not uploaded to Flickr, skipping");
                return Ok(());
            }
        };

        self.delete_and_forget(&key, &flickr_photo_id).map_err(|e| {
            error!(error = %e, "Failed to unpublish photo");
            e
        })
    }
}
