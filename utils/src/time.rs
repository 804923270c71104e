//! Human-readable durations for logs.

use std::fmt::Write;

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render a window length largest unit first, skipping zero components:
/// `86400` is `"1d"`, `5400` is `"1h30m"`.
pub fn format_window(secs: u64) -> String {
    if secs == 0 {
        return "0s".to_string();
    }
    let mut rest = secs;
    let mut out = String::new();
    for (size, suffix) in UNITS {
        let count = rest / size;
        if count > 0 {
            let _ = write!(out, "{count}{suffix}");
            rest %= size;
        }
    }
    out
}
