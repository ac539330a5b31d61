//! Shared formatting utilities for console output

use console::Emoji;

/// Rocket emoji for launch/start operations
pub const ROCKET: Emoji = Emoji("🚀", ">");

/// Checkmark emoji for success
pub const CHECKMARK: Emoji = Emoji("✅", "[OK]");

/// Crossmark emoji for failure
pub const CROSSMARK: Emoji = Emoji("❌", "[FAIL]");

/// Sparkles emoji for completion/success
pub const SPARKLES: Emoji = Emoji("✨", "*");

/// Info emoji for informational messages
pub const INFO: Emoji = Emoji("ℹ️", "i");

/// Chart emoji for metrics/statistics
pub const CHART: Emoji = Emoji("📊", "~");

/// Warning emoji for caution/alerts
pub const WARNING: Emoji = Emoji("⚠️", "!");

/// Pick the emoji or its plain fallback
///
/// `console` already falls back on terminals that cannot render emoji;
/// this additionally honors an explicit opt-out.
pub fn icon(emoji: Emoji<'static, 'static>, enabled: bool) -> String {
    if enabled {
        emoji.to_string()
    } else {
        emoji.1.to_string()
    }
}

/// Format a percentage with two decimals
///
/// # Examples
///
/// ```
/// use pixel_parity::fmt::format_percent;
///
/// assert_eq!(format_percent(0.0), "0.00%");
/// assert_eq!(format_percent(15.0), "15.00%");
/// assert_eq!(format_percent(100.0 / 3.0), "33.33%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Format a signed percentage-point change
///
/// # Examples
///
/// ```
/// use pixel_parity::fmt::format_delta;
///
/// assert_eq!(format_delta(2.5), "+2.50pp");
/// assert_eq!(format_delta(-0.126), "-0.13pp");
/// ```
pub fn format_delta(value: f64) -> String {
    format!("{:+.2}pp", value)
}
