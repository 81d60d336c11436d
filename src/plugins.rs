//! Plugins shipped with this crate.

pub mod example;
pub mod flickr;

pub use example::ExamplePlugin;
pub use flickr::FlickrPlugin;
