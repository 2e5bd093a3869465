//! Time formatting helpers.

/// Render a span of seconds compactly, keeping the two largest units.
pub fn format_duration(secs: u64) -> String {
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3_599 => format!("{}m {}s", secs / 60, secs % 60),
        3_600..=86_399 => format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60),
        _ => format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600),
    }
}
