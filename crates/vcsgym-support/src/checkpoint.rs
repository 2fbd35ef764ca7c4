//! Persisted snapshots.
//!
//! On disk a checkpoint is an 8-byte magic followed by the postcard-encoded
//! [`Snapshot`], compressed with LZ4 (size-prepended block format).

use std::{fs, path::Path};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use vcsgym_core::Snapshot;

use crate::error::SupportError;

pub const MAGIC: &[u8; 8] = b"VCSSNAP\x01";

pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, SupportError> {
    Ok(pack(MAGIC, &snapshot.to_bytes()?))
}

pub fn decode(bytes: &[u8]) -> Result<Snapshot, SupportError> {
    let raw = unpack(MAGIC, "checkpoint", bytes)?;
    Ok(Snapshot::from_bytes(&raw)?)
}

pub fn save_to_file(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<(), SupportError> {
    let path = path.as_ref();
    let bytes = encode(snapshot)?;
    fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "checkpoint written");
    Ok(())
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<Snapshot, SupportError> {
    decode(&fs::read(path)?)
}

/// Prefixes `magic` and LZ4-compresses `raw`.
pub(crate) fn pack(magic: &[u8], raw: &[u8]) -> Vec<u8> {
    let compressed = compress_prepend_size(raw);
    let mut out = Vec::with_capacity(magic.len() + compressed.len());
    out.extend_from_slice(magic);
    out.extend_from_slice(&compressed);
    out
}

pub(crate) fn unpack(
    magic: &[u8],
    kind: &'static str,
    bytes: &[u8],
) -> Result<Vec<u8>, SupportError> {
    let body = bytes
        .strip_prefix(magic)
        .ok_or_else(|| SupportError::InvalidData {
            kind,
            reason: "missing magic bytes".to_string(),
        })?;
    Ok(decompress_size_prepended(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcsgym_core::{Action, Interface, demo};

    fn snapshot() -> Snapshot {
        let mut ale = Interface::new();
        ale.load_rom_bytes(&demo::gallery_cartridge().expect("cartridge"))
            .expect("load");
        for _ in 0..7 {
            ale.act(Action::Fire).expect("act");
        }
        ale.clone_state().expect("snapshot")
    }

    #[test]
    fn encode_decode_keeps_snapshot() {
        let snap = snapshot();
        let bytes = encode(&snap).expect("encode");
        assert!(bytes.starts_with(MAGIC));
        assert_eq!(decode(&bytes).expect("decode"), snap);
    }

    #[test]
    fn foreign_bytes_are_rejected() {
        assert!(matches!(
            decode(b"PNG\0\0\0\0\0\0\0"),
            Err(SupportError::InvalidData { .. })
        ));

        let mut bytes = encode(&snapshot()).expect("encode");
        bytes.truncate(MAGIC.len() + 6);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("vcsgym-checkpoint-{}.bin", std::process::id()));
        let snap = snapshot();
        save_to_file(&path, &snap).expect("save");
        let loaded = load_from_file(&path).expect("load");
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, snap);
    }
}
