//! Host-level errors.

use sova_queue::QueueError;
use sova_staking::StakingError;
use sova_types::{AccessError, AssetError};
use sova_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Staking(#[from] StakingError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("snapshot checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u32),

    #[error("arithmetic overflow")]
    Overflow,
}
