//! Value ledger: the vault.
//!
//! Users deposit any supported asset and receive shares, a canonical
//! 8-decimal claim on the vault's total value. Shares can be redeemed three
//! ways:
//!
//! - for the reward asset, at the spot exchange rate set by the last yield
//!   deposit ([`ValueLedger::redeem_for_rewards`]);
//! - for the primary asset, immediately ([`ValueLedger::redeem`],
//!   [`ValueLedger::withdraw`]);
//! - for the primary asset through the redemption queue: the shares move into
//!   vault custody at request time and are burned (commit) or returned
//!   (release) later.
//!
//! The vault owns the custodied shares for the whole life of a queued request;
//! the queue only records the request's state.

pub mod custody;
pub mod error;
pub mod ledger;
pub mod supported;

pub use custody::{CustodyEntry, ShareCustody};
pub use error::VaultError;
pub use ledger::{ValueLedger, SHARE_SYMBOL};
pub use supported::SupportedAssetSet;
