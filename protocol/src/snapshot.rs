//! Whole-protocol snapshots.
//!
//! A snapshot is a bincode-encoded [`Envelope`] holding the format version, a
//! Blake2b checksum and the encoded [`Protocol`]. Loading rejects unknown
//! versions and payloads whose checksum does not match.

use crate::error::ProtocolError;
use crate::protocol::Protocol;
use serde::{Deserialize, Serialize};
use sova_types::blake2b_256_multi;
use std::path::Path;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

const CHECKSUM_DOMAIN: &[u8] = b"sova-snapshot";

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    checksum: [u8; 32],
    payload: Vec<u8>,
}

fn checksum(payload: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[CHECKSUM_DOMAIN, payload])
}

impl Protocol {
    pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let payload = bincode::serialize(self).map_err(|e| ProtocolError::Snapshot(e.to_string()))?;
        let envelope = Envelope {
            version: SNAPSHOT_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        bincode::serialize(&envelope).map_err(|e| ProtocolError::Snapshot(e.to_string()))
    }

    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            bincode::deserialize(bytes).map_err(|e| ProtocolError::Snapshot(e.to_string()))?;
        if envelope.version != SNAPSHOT_VERSION {
            return Err(ProtocolError::UnsupportedSnapshotVersion(envelope.version));
        }
        if checksum(&envelope.payload) != envelope.checksum {
            return Err(ProtocolError::ChecksumMismatch);
        }
        bincode::deserialize(&envelope.payload).map_err(|e| ProtocolError::Snapshot(e.to_string()))
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), ProtocolError> {
        let bytes = self.to_snapshot_bytes()?;
        std::fs::write(path.as_ref(), &bytes)
            .map_err(|e| ProtocolError::Snapshot(format!("{}: {e}", path.as_ref().display())))?;
        tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "snapshot saved");
        Ok(())
    }

    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| ProtocolError::Snapshot(format!("{}: {e}", path.as_ref().display())))?;
        let protocol = Self::from_snapshot_bytes(&bytes)?;
        tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "snapshot loaded");
        Ok(protocol)
    }
}
