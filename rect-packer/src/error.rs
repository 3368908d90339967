use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bin dimensions must be positive, got {width}x{height}")]
    InvalidBin { width: u32, height: u32 },

    #[error("item dimensions must be positive, got {width}x{height}")]
    InvalidItem { width: u32, height: u32 },

    #[error("render scale must be at least 1")]
    InvalidScale,

    #[error("render scale {scale} makes the image too large")]
    ImageTooLarge { scale: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
