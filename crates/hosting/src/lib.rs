//! Public hosting for uploaded room photos.
//!
//! The staging provider fetches the source image by URL, so an uploaded
//! photo must first be made publicly reachable. Hosts implement
//! [`ImageHost`]; [`HostChain`] tries them in rank order and keeps the first
//! URL that comes back.

pub mod chain;
pub mod data_url;
pub mod file_io;
pub mod host;
pub mod imgbb;
pub mod self_host;

pub use chain::{HostChain, HostedImage};
pub use data_url::{decode_data_url, ImageUpload};
pub use host::{HostError, ImageHost};
pub use self_host::{ImageCache, SelfHost};
