use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CropError {
    /// A color the pipeline depends on has no range in the configuration.
    #[error("color configuration has no range for `{0}`")]
    MissingColor(String),
    #[error("failed to load HUD mask {path:?}: {source}")]
    HudMask {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
