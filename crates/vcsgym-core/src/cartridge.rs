use std::sync::Arc;

use thiserror::Error;

use crate::machine::AsmError;

pub mod header;

pub use header::{HEADER_LEN, Header, TitleTag};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("header expected {HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },
    #[error("missing VCS magic bytes")]
    InvalidMagic,
    #[error("unsupported cartridge format version {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported header flags {0:#04x}")]
    UnsupportedFlags(u8),
    #[error("title tag must be 1-8 characters of A-Z, 0-9, '-' or '_'")]
    InvalidTitleTag,
    #[error("program section expected {expected} bytes, got {actual}")]
    ProgramTooShort { expected: usize, actual: usize },
    #[error("program of {len} bytes does not fit the 64 KiB address space")]
    ProgramTooLarge { len: usize },
    #[error("program assembly failed: {0}")]
    Assembly(#[from] AsmError),
}

/// A parsed cartridge image: header plus the read-only program.
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    program: Arc<[u8]>,
    crc32: u32,
}

impl Cartridge {
    /// Parses a cartridge image. Trailing bytes after the program are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(bytes)?;
        let body = &bytes[HEADER_LEN..];
        let program = body
            .get(..header.program_len)
            .ok_or(CartridgeError::ProgramTooShort {
                expected: header.program_len,
                actual: body.len(),
            })?;
        let crc32 = crc32fast::hash(&bytes[..HEADER_LEN + header.program_len]);
        Ok(Self {
            header,
            program: Arc::from(program),
            crc32,
        })
    }

    /// Wraps an assembled program with a header, producing a loadable image.
    pub fn build(title: &str, program: &[u8]) -> Result<Vec<u8>, CartridgeError> {
        let header = Header::new(TitleTag::new(title)?, program.len())?;
        let mut image = Vec::with_capacity(HEADER_LEN + program.len());
        image.extend_from_slice(&header.to_bytes());
        image.extend_from_slice(program);
        Ok(image)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn title(&self) -> TitleTag {
        self.header.title
    }

    pub fn program(&self) -> &Arc<[u8]> {
        &self.program
    }

    /// CRC-32 over header and program; identifies the exact image.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_then_parse_keeps_program() {
        let image = Cartridge::build("DEMO", &[0x44, 0x30, 0x00, 0x00]).expect("build");
        let cart = Cartridge::parse(&image).expect("parse");
        assert_eq!(cart.title().as_str(), "DEMO");
        assert_eq!(&cart.program()[..], &[0x44, 0x30, 0x00, 0x00]);
        assert_eq!(cart.crc32(), crc32fast::hash(&image));
    }

    #[test]
    fn truncated_program_is_rejected() {
        let mut image = Cartridge::build("DEMO", &[0; 10]).expect("build");
        image.truncate(HEADER_LEN + 4);
        assert_eq!(
            Cartridge::parse(&image).map(|_| ()),
            Err(CartridgeError::ProgramTooShort {
                expected: 10,
                actual: 4
            })
        );
    }

    #[test]
    fn crc_distinguishes_programs_with_same_tag() {
        let a = Cartridge::parse(&Cartridge::build("DEMO", &[1]).expect("build")).expect("parse");
        let b = Cartridge::parse(&Cartridge::build("DEMO", &[2]).expect("build")).expect("parse");
        assert_ne!(a.crc32(), b.crc32());
    }

    #[test]
    fn oversized_programs_cannot_be_built() {
        let program = vec![0u8; u16::MAX as usize + 1];
        assert_eq!(
            Cartridge::build("BIG", &program),
            Err(CartridgeError::ProgramTooLarge {
                len: program.len()
            })
        );
    }
}
