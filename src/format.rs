use chrono::{DateTime, Utc};

/// Literal shown for unknown/missing values. Never rendered as "0" or "NaN"
/// so a gap in the data is not mistaken for a measurement.
pub const PLACEHOLDER: &str = "--";

/// OUI prefix table for display-only vendor lookup (first three octets).
const OUI_TABLE: &[(&str, &str)] = &[
    ("00:00:5E", "IANA"),
    ("00:01:02", "3Com"),
    ("00:03:93", "Apple"),
    ("00:05:02", "Apple"),
    ("00:0A:27", "Apple"),
    ("00:0A:95", "Apple"),
    ("00:0D:93", "Apple"),
    ("00:10:FA", "Apple"),
    ("00:11:24", "Apple"),
    ("00:17:F2", "Apple"),
    ("00:19:E3", "Apple"),
    ("00:1B:63", "Apple"),
    ("00:1E:52", "Apple"),
    ("00:23:12", "Apple"),
    ("00:25:00", "Apple"),
    ("00:26:4A", "Apple"),
    ("00:0C:F1", "Intel"),
    ("00:13:E0", "Intel"),
    ("00:15:00", "Intel"),
    ("00:16:6F", "Intel"),
    ("00:1B:21", "Intel"),
    ("00:1E:64", "Intel"),
    ("00:21:5C", "Intel"),
    ("00:24:D6", "Intel"),
    ("00:50:F2", "Microsoft"),
    ("08:00:27", "PCS Systemtechnik"),
    ("0C:47:C9", "Samsung"),
    ("10:08:B1", "Samsung"),
    ("10:1D:C0", "Samsung"),
    ("14:49:E0", "Samsung"),
    ("18:3A:2D", "Samsung"),
    ("1C:62:B8", "Samsung"),
    ("20:64:32", "Samsung"),
    ("28:39:5E", "Samsung"),
    ("2C:44:01", "Samsung"),
    ("34:23:BA", "Samsung"),
    ("40:0E:85", "Samsung"),
    ("50:32:75", "Samsung"),
];

/// Vendor name for a MAC address, by its OUI prefix.
pub fn lookup_oui(mac: &str) -> &'static str {
    if mac.len() < 8 {
        return "Unknown";
    }
    let prefix = mac[..8].to_uppercase();
    OUI_TABLE
        .iter()
        .find(|(oui, _)| *oui == prefix)
        .map(|(_, vendor)| *vendor)
        .unwrap_or("Unknown")
}

/// Relative age label, computed against a caller-supplied `now` so it can
/// be re-derived on every render instead of stored.
pub fn time_ago(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - when).num_seconds().max(0);
    if seconds < 60 {
        "Just now".to_string()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86400)
    }
}

/// Elapsed-time label for the session uptime display.
pub fn duration_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}h {}m {}s", hours, minutes, secs)
}

/// Wall-clock label (HH:MM) for "last scan" style fields.
pub fn clock(when: Option<DateTime<Utc>>) -> String {
    match when {
        Some(ts) => ts.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Integer count, or the placeholder when absent.
pub fn count(value: Option<u64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// Signed integer (RSSI and friends), or the placeholder.
pub fn signed(value: Option<i32>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// Ratio rendered to one decimal place as a percentage.
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.1}%", v))
}

/// One decimal place, unitless.
pub fn decimal(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.1}", v))
}

/// Share of `count` in `total` as a one-decimal percentage.
pub fn share(count: u64, total: u64) -> String {
    if total == 0 {
        return PLACEHOLDER.to_string();
    }
    format!("{:.1}%", (count as f64 / total as f64) * 100.0)
}

/// Device display name with the conventional fallback.
pub fn device_name(name: Option<&str>) -> &str {
    match name {
        Some(n) if !n.is_empty() => n,
        _ => "Unknown Device",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn oui_lookup_known_and_unknown() {
        assert_eq!(lookup_oui("00:03:93:11:22:33"), "Apple");
        assert_eq!(lookup_oui("0c:47:c9:00:00:01"), "Samsung");
        assert_eq!(lookup_oui("FF:FF:FF:00:00:01"), "Unknown");
        assert_eq!(lookup_oui("short"), "Unknown");
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(10), now), "Just now");
        assert_eq!(time_ago(now - Duration::seconds(180), now), "3m ago");
        assert_eq!(time_ago(now - Duration::hours(2), now), "2h ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3d ago");
    }

    #[test]
    fn time_ago_never_negative() {
        let now = Utc::now();
        assert_eq!(time_ago(now + Duration::seconds(30), now), "Just now");
    }

    #[test]
    fn share_renders_one_decimal() {
        assert_eq!(share(50, 200), "25.0%");
        assert_eq!(share(1, 3), "33.3%");
    }

    #[test]
    fn share_of_empty_total_is_placeholder() {
        assert_eq!(share(0, 0), "--");
    }

    #[test]
    fn missing_values_render_placeholder() {
        assert_eq!(count(None), "--");
        assert_eq!(signed(None), "--");
        assert_eq!(percent(None), "--");
        assert_eq!(count(Some(120)), "120");
        assert_eq!(percent(Some(12.34)), "12.3%");
    }

    #[test]
    fn duration_and_clock() {
        assert_eq!(duration_hms(3723), "1h 2m 3s");
        assert_eq!(clock(None), "--:--");
    }

    #[test]
    fn device_name_fallback() {
        assert_eq!(device_name(None), "Unknown Device");
        assert_eq!(device_name(Some("")), "Unknown Device");
        assert_eq!(device_name(Some("Pixel")), "Pixel");
    }
}
