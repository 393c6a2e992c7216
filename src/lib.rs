// Live text mosaic: grayscale masks gate where characters appear, characters
// stream from sentiment-bucketed pools of submitted lines, and the mosaic
// cross-fades between masks.

pub mod classify;
pub mod config;
pub mod draw;
pub mod error;
pub mod fade;
pub mod gamma;
pub mod highlight;
pub mod input;
pub mod mask;
pub mod mosaic;
pub mod noise;
pub mod pool;
pub mod reveal;
pub mod rng;
pub mod types;

pub use classify::{Bucket, Classification, Classifier};
pub use config::Config;
pub use error::Error;
pub use mask::MaskSet;
pub use mosaic::{FrameStats, Mosaic};
pub use types::FrameBuffer;
