//! Remaining-time display text.

/// `mm:ss`. Minutes are not capped at 59.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Seconds-only display used during micro-breaks, e.g. `07s`.
pub fn format_seconds(secs: u64) -> String {
    format!("{secs:02}s")
}
