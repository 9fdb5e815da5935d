use std::path::PathBuf;

/// Top-level error for the demo programs.
///
/// `ContextInit` is fatal: the binaries log it and exit. `Asset` is recoverable and is
/// normally downgraded to a placeholder resource by the caller.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to initialise graphics context: {0}")]
    ContextInit(String),

    #[error("failed to load asset {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
}

impl DemoError {
    pub fn asset(path: impl Into<PathBuf>, source: impl Into<AssetError>) -> Self {
        Self::Asset {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContextInit(_))
    }
}

/// Why a single asset could not be used.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("mesh {0} has no vertex positions")]
    MissingPositions(String),

    #[error("file contains no drawable primitives")]
    NoPrimitives,

    #[error("file contains no skin")]
    NoSkin,

    #[error("file contains no animation")]
    NoAnimation,
}
