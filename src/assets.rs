//! Asset embedding: the default bounding-box table and the colour palettes.

use crate::error::StartupError;
use rust_embed::RustEmbed;
use std::borrow::Cow;

/// Files under `assets/`, read from disk in debug builds and compressed
/// into the binary in release builds.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

/// Path of the default bounding-box table inside the embedded assets.
pub const BOXES_CSV: &str = "country-boundingboxes.csv";

/// Returns the bytes of an embedded asset.
pub fn load_bytes(path: &str) -> Result<Cow<'static, [u8]>, StartupError> {
    Assets::get(path)
        .map(|file| file.data)
        .ok_or_else(|| StartupError::AssetNotFound(path.to_string()))
}
