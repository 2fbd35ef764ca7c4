//! Contract between the environment and an emulation engine.
//!
//! The environment never looks inside the engine: it feeds control lines,
//! reads working memory and the frame buffer, and moves opaque state blobs
//! in and out. [`crate::machine::Console`] is the bundled implementation.

use std::fmt::Debug;

use thiserror::Error;

use crate::controller::ControlLines;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to encode engine state: {0}")]
    Encode(#[source] postcard::Error),
    #[error("failed to decode engine state: {0}")]
    Decode(#[source] postcard::Error),
    #[error("corrupt engine state: {0}")]
    CorruptState(&'static str),
}

/// An emulated machine that advances in whole video frames.
pub trait Engine: Debug + Send {
    /// Runs exactly one video frame with `lines` held on the input port.
    fn advance_frame(&mut self, lines: ControlLines);

    /// Working memory as of the end of the last frame.
    fn memory(&self) -> &[u8];

    /// Frame buffer as of the end of the last frame.
    fn screen(&self) -> Screen<'_>;

    /// Captures every piece of dynamic state into a self-contained blob.
    ///
    /// Must not change observable state.
    fn capture_state(&self) -> Result<Vec<u8>, EngineError>;

    /// Overwrites all dynamic state from a blob produced by [`Engine::capture_state`].
    ///
    /// On error the engine is left untouched.
    fn restore_state(&mut self, blob: &[u8]) -> Result<(), EngineError>;
}

/// Read-only view of a palette-indexed frame buffer (one byte per pixel,
/// row-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen<'a> {
    width: usize,
    height: usize,
    pixels: &'a [u8],
}

impl<'a> Screen<'a> {
    pub fn new(width: usize, height: usize, pixels: &'a [u8]) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        let start = y.checked_mul(self.width)?;
        self.pixels.get(start..start + self.width)
    }
}
