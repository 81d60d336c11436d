//! The contract between Photoserv and its plugins.
//!
//! The host constructs a plugin with its configuration and a [`Photoserv`]
//! handle, then delivers lifecycle events one at a time. Handlers take
//! `&mut self`, so a host sharing one instance between threads has to put it
//! behind a lock.

use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

/// Static description of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub uuid: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub website: &'static str,
    /// Configuration keys and their descriptions.
    pub config: &'static [(&'static str, &'static str)],
    /// Per-entity parameter keys and their descriptions.
    pub entity_parameters: &'static [(&'static str, &'static str)],
}

pub trait Plugin {
    fn metadata(&self) -> &'static PluginMetadata;

    fn on_global_change(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn on_photo_publish(&mut self, data: &PhotoData, params: &Value) -> Result<(), Error>;

    fn on_photo_unpublish(&mut self, data: &PhotoData, params: &Value) -> Result<(), Error>;
}

/// Persistent key-value storage scoped to one plugin instance.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, Error>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), Error>;
    fn delete(&mut self, key: &str) -> Result<(), Error>;
}

/// Services the host exposes to a plugin.
pub trait Photoserv {
    /// Opens the image of `photo` at `size`, `None` when there is no such size.
    fn get_photo_image(&self, photo: &PhotoData, size: &str)
        -> Result<Option<Box<dyn Read>>, Error>;

    fn config(&self) -> &dyn KeyValueStore;

    fn config_mut(&mut self) -> &mut dyn KeyValueStore;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), Error> {
        self.values.remove(key);
        Ok(())
    }
}

/// Photo fields as serialized by the host's public API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhotoData {
    pub uuid: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<Tag>,
    pub albums: Vec<Album>,
    pub hidden: bool,
}

impl PhotoData {
    pub fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Album {
    pub uuid: Option<String>,
    pub slug: Option<String>,
}
