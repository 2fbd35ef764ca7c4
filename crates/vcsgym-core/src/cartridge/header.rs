//! Cartridge header parsing.
//!
//! Every VCS-8 cartridge starts with a fixed 16-byte header:
//!
//! ```text
//! 0..4   magic "VCS\x1A"
//! 4      format version (currently 1)
//! 5      flags (reserved, must be 0)
//! 6..8   program length, u16 little-endian
//! 8..16  title tag, ASCII, NUL-padded
//! ```
//!
//! The title tag is the cartridge identity used to pick a title adapter.

use std::fmt;

use crate::cartridge::CartridgeError;

const VCS_MAGIC: &[u8; 4] = b"VCS\x1A";

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 16;

/// Header format version understood by this crate.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum number of characters in a title tag.
pub const TITLE_TAG_LEN: usize = 8;

/// Cartridge identity stored in the header.
///
/// Tags are 1..=8 characters from `A-Z`, `0-9`, `-` and `_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TitleTag {
    bytes: [u8; TITLE_TAG_LEN],
    len: u8,
}

impl TitleTag {
    pub fn new(name: &str) -> Result<Self, CartridgeError> {
        let raw = name.as_bytes();
        if raw.is_empty() || raw.len() > TITLE_TAG_LEN || !raw.iter().all(|&b| is_tag_byte(b)) {
            return Err(CartridgeError::InvalidTitleTag);
        }
        let mut bytes = [0u8; TITLE_TAG_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    fn parse(field: &[u8]) -> Result<Self, CartridgeError> {
        let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        if field[len..].iter().any(|&b| b != 0) {
            return Err(CartridgeError::InvalidTitleTag);
        }
        let name = std::str::from_utf8(&field[..len]).map_err(|_| CartridgeError::InvalidTitleTag)?;
        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    fn raw(&self) -> [u8; TITLE_TAG_LEN] {
        self.bytes
    }
}

impl fmt::Display for TitleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-' || b == b'_'
}

/// Parsed representation of the 16-byte cartridge header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub version: u8,
    pub flags: u8,
    /// Length of the program image that follows the header.
    pub program_len: usize,
    pub title: TitleTag,
}

impl Header {
    pub fn new(title: TitleTag, program_len: usize) -> Result<Self, CartridgeError> {
        if program_len > u16::MAX as usize {
            return Err(CartridgeError::ProgramTooLarge { len: program_len });
        }
        Ok(Self {
            version: FORMAT_VERSION,
            flags: 0,
            program_len,
            title,
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, CartridgeError> {
        let header = bytes.get(..HEADER_LEN).ok_or(CartridgeError::TooShort {
            actual: bytes.len(),
        })?;
        if &header[..4] != VCS_MAGIC {
            return Err(CartridgeError::InvalidMagic);
        }
        let version = header[4];
        if version != FORMAT_VERSION {
            return Err(CartridgeError::UnsupportedVersion(version));
        }
        let flags = header[5];
        if flags != 0 {
            return Err(CartridgeError::UnsupportedFlags(flags));
        }
        let program_len = u16::from_le_bytes([header[6], header[7]]) as usize;
        let title = TitleTag::parse(&header[8..HEADER_LEN])?;
        Ok(Self {
            version,
            flags,
            program_len,
            title,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(VCS_MAGIC);
        out[4] = self.version;
        out[5] = self.flags;
        out[6..8].copy_from_slice(&(self.program_len as u16).to_le_bytes());
        out[8..].copy_from_slice(&self.title.raw());
        out
    }
}
