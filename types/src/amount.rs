//! Fixed-point amount arithmetic.
//!
//! Amounts are raw `u128` integers in the smallest unit of their asset.
//! Shares use a canonical 8-decimal precision; rates use a 1e18 denominator;
//! multipliers and penalties are basis points out of 10 000.
//!
//! All helpers are checked: `None` means overflow or division by zero.

/// Decimal precision of the canonical share unit.
pub const SHARE_DECIMALS: u8 = 8;

/// Denominator of the reward exchange rate (1e18 = 1:1).
pub const RATE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator (10 000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Accrual year length used by the reward engine.
pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;

/// Largest decimals value whose power of ten fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

/// `10^exp`, or `None` if it does not fit in a `u128`.
pub fn pow10(exp: u32) -> Option<u128> {
    10u128.checked_pow(exp)
}

/// Rescale a native-precision amount to the canonical 8-decimal precision.
///
/// Assets with more than 8 decimals lose the excess digits (truncation toward
/// zero); assets with fewer are scaled up exactly.
pub fn normalize(amount: u128, decimals: u8) -> Option<u128> {
    if decimals > SHARE_DECIMALS {
        Some(amount / pow10(u32::from(decimals - SHARE_DECIMALS))?)
    } else {
        amount.checked_mul(pow10(u32::from(SHARE_DECIMALS - decimals))?)
    }
}

/// Like [`normalize`] but rounds up when digits are discarded.
///
/// Used when a caller asks for an exact native amount and the ledger must not
/// under-charge for it.
pub fn normalize_up(amount: u128, decimals: u8) -> Option<u128> {
    if decimals > SHARE_DECIMALS {
        div_ceil(amount, pow10(u32::from(decimals - SHARE_DECIMALS))?)
    } else {
        normalize(amount, decimals)
    }
}

/// Rescale a canonical 8-decimal amount back to an asset's native precision.
///
/// The inverse of [`normalize`]; converting to an asset with fewer than 8
/// decimals truncates.
pub fn denormalize(amount: u128, decimals: u8) -> Option<u128> {
    if decimals > SHARE_DECIMALS {
        amount.checked_mul(pow10(u32::from(decimals - SHARE_DECIMALS))?)
    } else {
        Some(amount / pow10(u32::from(SHARE_DECIMALS - decimals))?)
    }
}

/// `a * b / c` rounded down.
pub fn mul_div(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    a.checked_mul(b).map(|p| p / c)
}

/// `a * b / c` rounded up.
pub fn mul_div_up(a: u128, b: u128, c: u128) -> Option<u128> {
    div_ceil(a.checked_mul(b)?, c)
}

/// `amount * bps / 10 000` rounded down.
pub fn apply_bps(amount: u128, bps: u128) -> Option<u128> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

fn div_ceil(n: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let q = n / d;
    if n % d == 0 {
        Some(q)
    } else {
        q.checked_add(1)
    }
}
