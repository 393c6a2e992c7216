// Crate error type. Every variant states *where* things went wrong.
// The mosaic core itself never fails; these only come from startup and the window.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),
    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    /// Reading the config file failed
    #[error("Config read error ({path}): {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for our schema
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// Opening/decoding a mask image failed
    #[error("Mask load error ({path}): {source}")]
    MaskLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
