use crate::api::ApiClient;
use crate::filter::TimeFilter;
use crate::format;
use crate::model::ExtendedStats;
use chrono::Utc;

/// Fetches every stats endpoint once and renders them as a plain-text report.
pub async fn generate_report(client: &ApiClient, time: TimeFilter) -> anyhow::Result<String> {
    let (overview, top, hourly, daily, weekday, extended, advanced) = tokio::join!(
        client.stats_overview(time),
        client.stats_top_devices(time),
        client.stats_hourly(time),
        client.stats_daily(time),
        client.stats_weekday(time),
        client.stats_extended(time),
        client.stats_advanced(time),
    );
    let overview = overview?;
    let top = top?;
    let hourly = hourly?;
    let daily = daily?;
    let weekday = weekday?;
    let extended = extended?;
    let advanced = advanced?;

    let mut report = String::new();

    // Header
    report.push_str("═══════════════════════════════════════════════════════════════════\n");
    report.push_str("                     Device Scanner Activity Report                  \n");
    report.push_str("═══════════════════════════════════════════════════════════════════\n\n");
    report.push_str(&format!("Generated:   {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
    report.push_str(&format!("Time Filter: {}\n", time.label()));
    report.push_str(&format!("Backend:     {}\n\n", client.base_url()));

    // Overview
    section(&mut report, "OVERVIEW");
    report.push_str(&format!("  Total Scans:          {:>8}\n", format::count(overview.total_scans)));
    report.push_str(&format!("  Unique Devices:       {:>8}\n", format::count(overview.unique_devices)));
    report.push_str(&format!("  Scans (last 24h):     {:>8}\n", format::count(overview.last_24h)));
    report.push_str(&format!("  Scans (last hour):    {:>8}\n\n", format::count(overview.last_hour)));

    // Activity
    section(&mut report, "ACTIVITY PATTERNS");
    if let Some(peak) = hourly.peak_hour {
        report.push_str(&format!("  Peak Hour:            {:>8}\n", format!("{}:00", peak)));
    }
    if let Some(quiet) = hourly.quiet_hour {
        report.push_str(&format!("  Quietest Hour:        {:>8}\n", format!("{}:00", quiet)));
    }
    if let Some(avg) = hourly.average {
        report.push_str(&format!("  Avg Scans per Hour:   {:>8.1}\n", avg));
    }
    if let Some(day) = &daily.max_day {
        report.push_str(&format!("  Busiest Day:          {:>8}\n", day));
    }
    if let Some(avg) = daily.average {
        report.push_str(&format!("  Avg Scans per Day:    {:>8.1}\n", avg));
    }
    if let Some(day) = &weekday.most_active {
        report.push_str(&format!("  Most Active Weekday:  {:>8}\n", day));
    }
    if let (Some(week), Some(weekend)) = (weekday.weekday_total, weekday.weekend_total) {
        report.push_str(&format!("  Weekday / Weekend:    {:>5} / {}\n", week, weekend));
    }
    report.push('\n');

    // Top devices
    section(&mut report, "TOP DEVICES");
    if top.devices.is_empty() {
        report.push_str("  No devices recorded for this period.\n");
    } else {
        for device in &top.devices {
            report.push_str(&format!(
                "  #{:<3} {:<18} {:<22} {:>6}  {:>6}\n",
                device.rank,
                device.mac,
                truncate(format::device_name(device.name.as_deref()), 22),
                device.count,
                format::share(device.count, top.total),
            ));
        }
    }
    report.push('\n');

    signal_section(&mut report, &extended);

    // Device lifetime
    section(&mut report, "DEVICE LIFETIME");
    if let Some(avg) = extended.lifetime.avg_lifetime_minutes {
        report.push_str(&format!("  Average Lifetime:     {:>8.1} min\n", avg));
    }
    if let Some(median) = extended.lifetime.median_lifetime_minutes {
        report.push_str(&format!("  Median Lifetime:      {:>8.1} min\n", median));
    }
    if let Some(max) = extended.lifetime.max_lifetime_minutes {
        report.push_str(&format!("  Longest Lifetime:     {:>8.1} min\n", max));
    }
    if let Some(repeat) = extended.lifetime.devices_with_multiple_sightings {
        report.push_str(&format!("  Repeat Devices:       {:>8}\n", repeat));
    }
    report.push('\n');

    // Trends
    section(&mut report, "TRENDS");
    if let Some(days) = advanced.timespan_days {
        report.push_str(&format!("  Data Timespan:        {:>8.1} days\n", days));
    }
    if let Some(avg) = advanced.avg_scans_per_device {
        report.push_str(&format!("  Avg Scans/Device:     {:>8.1}\n", avg));
    }
    if let Some(median) = advanced.median_scans {
        report.push_str(&format!("  Median Scans/Device:  {:>8.1}\n", median));
    }
    if let Some(growth) = advanced.growth_rate_24h {
        report.push_str(&format!("  24h Growth Rate:      {:>7.1}%\n", growth));
    }

    report.push_str("\n═══════════════════════════════════════════════════════════════════\n");
    Ok(report)
}

fn signal_section(report: &mut String, extended: &ExtendedStats) {
    section(report, "SIGNAL & VENDORS");
    if let Some(median) = extended.rssi.median {
        report.push_str(&format!("  RSSI Median:          {:>6} dBm\n", median));
    }
    if let Some(mean) = extended.rssi.mean {
        report.push_str(&format!("  RSSI Mean:            {:>6.1} dBm\n", mean));
    }
    if let (Some(min), Some(max)) = (extended.rssi.min, extended.rssi.max) {
        report.push_str(&format!("  RSSI Range:           {} to {} dBm\n", min, max));
    }
    for vendor in extended.oui.vendors.iter().take(5) {
        report.push_str(&format!(
            "  {:<22}{:>6}  {}\n",
            truncate(&vendor.name, 22),
            vendor.count,
            vendor
                .percentage
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| format::PLACEHOLDER.to_string()),
        ));
    }
    if let Some(unknown) = extended.oui.unknown_count {
        report.push_str(&format!("  Unknown Vendors:      {:>6}\n", unknown));
    }
    for protocol in &extended.protocol.protocols {
        report.push_str(&format!("  {:<22}{:>6}\n", truncate(&protocol.name, 22), protocol.count));
    }
    report.push('\n');
}

fn section(report: &mut String, title: &str) {
    report.push_str("───────────────────────────────────────────────────────────────────\n");
    report.push_str(&format!("{:^67}\n", title));
    report.push_str("───────────────────────────────────────────────────────────────────\n\n");
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("Apple, Inc.", 22), "Apple, Inc.");
    }

    #[test]
    fn truncate_shortens_long_strings() {
        let long = "A very long vendor name that overflows";
        let out = truncate(long, 10);
        assert!(out.chars().count() <= 10);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn section_centers_title() {
        let mut report = String::new();
        section(&mut report, "OVERVIEW");
        assert!(report.contains("OVERVIEW"));
        assert!(report.starts_with("───"));
    }
}
