use lz4_flex::block::DecompressError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] vcsgym_core::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    #[error("decompression failed: {0}")]
    Decompress(#[from] DecompressError),

    #[error("invalid {kind} data: {reason}")]
    InvalidData { kind: &'static str, reason: String },

    #[error("replay diverged at frame {frame}")]
    Desync { frame: usize },
}
