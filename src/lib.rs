//! # photoserv-plugins
//!
//! Plugins for the Photoserv photo-publishing server.
//!
//! - [`plugins::ExamplePlugin`] shows the plugin contract.
//! - [`plugins::FlickrPlugin`] uploads published photos to Flickr, tags them,
//!   adds them to groups and deletes them again on unpublish.
//!
//! Flickr calls are signed with OAuth 1.0a ([`oauth1`]). Obtaining the access
//! token and secret is left to the user; the plugin only signs requests.
//!
//! ```no_run
//! use photoserv_plugins::host::{KeyValueStore, MemoryStore, PhotoData, Photoserv, Plugin};
//! use photoserv_plugins::plugins::FlickrPlugin;
//! use photoserv_plugins::Error;
//! use serde_json::json;
//! use std::io::Read;
//!
//! struct Host {
//!     store: MemoryStore,
//! }
//!
//! impl Photoserv for Host {
//!     fn get_photo_image(&self, _photo: &PhotoData, _size: &str)
//!         -> Result<Option<Box<dyn Read>>, Error> {
//!         Ok(Some(Box::new(std::fs::File::open("photo.jpg")?)))
//!     }
//!
//!     fn config(&self) -> &dyn KeyValueStore {
//!         &self.store
//!     }
//!
//!     fn config_mut(&mut self) -> &mut dyn KeyValueStore {
//!         &mut self.store
//!     }
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let config = json!({
//!         "flickr_api_key": "key",
//!         "flickr_api_secret": "secret",
//!         "flickr_oauth_token": "token",
//!         "flickr_oauth_token_secret": "token secret",
//!         "flickr_user_id": "12345678@N01",
//!     });
//!     let host = Host { store: MemoryStore::new() };
//!     let mut plugin = FlickrPlugin::new(&config, host)?;
//!
//!     let photo = PhotoData {
//!         uuid: "3f1c".into(),
//!         title: Some("Dunes".into()),
//!         ..PhotoData::default()
//!     };
//!     plugin.on_photo_publish(&photo, &json!({"force": false}))
//! }
//! ```

pub mod builder;
pub mod error;
pub mod flickr;
pub mod host;
pub mod oauth1;
pub mod parameters;
pub mod plugins;

mod util;

#[cfg(test)]
mod testing;

pub use builder::ApiRequest;
pub use error::{Error, PolicyError, ProviderError, TransportError};
pub use parameters::OAuthParameter;
