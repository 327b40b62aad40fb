use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed-device record, fetched fresh on every poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSighting {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub rssi: Option<i32>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    #[default]
    Offline,
}

/// Per-scanner state as reported by `/api/status`. Replaced wholesale on
/// each poll, never merged field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScannerStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub device_count: u64,
    #[serde(default)]
    pub last_scan: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scanners {
    #[serde(default)]
    pub bluetooth: Option<ScannerStatus>,
    #[serde(default)]
    pub wifi: Option<ScannerStatus>,
    #[serde(default)]
    pub rf: Option<ScannerStatus>,
}

impl Scanners {
    pub fn get(&self, kind: ScannerKind) -> Option<&ScannerStatus> {
        match kind {
            ScannerKind::Bluetooth => self.bluetooth.as_ref(),
            ScannerKind::Wifi => self.wifi.as_ref(),
            ScannerKind::Rf => self.rf.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scanners: Scanners,
}

impl StatusResponse {
    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerKind {
    Bluetooth,
    Wifi,
    Rf,
}

impl ScannerKind {
    pub const ALL: [ScannerKind; 3] =
        [ScannerKind::Bluetooth, ScannerKind::Wifi, ScannerKind::Rf];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScannerKind::Bluetooth => "bluetooth",
            ScannerKind::Wifi => "wifi",
            ScannerKind::Rf => "rf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScannerKind::Bluetooth => "BLUETOOTH",
            ScannerKind::Wifi => "WIFI",
            ScannerKind::Rf => "RF",
        }
    }
}

impl fmt::Display for ScannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    Start,
    Stop,
    Manual,
}

impl ScanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanAction::Start => "start",
            ScanAction::Stop => "stop",
            ScanAction::Manual => "manual",
        }
    }
}

/// Result envelope of the scanner-control endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ControlResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub device_count: Option<u64>,
}

/// One entry of the raw scan log (`/api/logs`). The backend keeps its
/// own log-line timestamp format, so it stays a string here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scanner: Option<String>,
}

// ---------------------------------------------------------------------------
// Statistics payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OverviewStats {
    #[serde(default)]
    pub total_scans: Option<u64>,
    #[serde(default)]
    pub unique_devices: Option<u64>,
    #[serde(default)]
    pub last_24h: Option<u64>,
    #[serde(default)]
    pub last_hour: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopDevice {
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopDevicesStats {
    #[serde(default)]
    pub devices: Vec<TopDevice>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HourlyStats {
    #[serde(default)]
    pub hours: Vec<u32>,
    #[serde(default)]
    pub counts: Vec<u64>,
    #[serde(default)]
    pub peak_hour: Option<u32>,
    #[serde(default)]
    pub quiet_hour: Option<u32>,
    #[serde(default)]
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DailyStats {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub counts: Vec<u64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub max_day: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeekdayStats {
    #[serde(default)]
    pub weekdays: Vec<String>,
    #[serde(default)]
    pub counts: Vec<u64>,
    #[serde(default)]
    pub most_active: Option<String>,
    #[serde(default)]
    pub least_active: Option<String>,
    #[serde(default)]
    pub weekday_total: Option<u64>,
    #[serde(default)]
    pub weekend_total: Option<u64>,
}

/// Hour-of-day x day-of-week activity matrix, indexed `matrix[hour][weekday]`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HeatmapStats {
    #[serde(default)]
    pub matrix: Vec<Vec<u64>>,
    #[serde(default)]
    pub hours: Vec<u32>,
    #[serde(default)]
    pub weekdays: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RssiStats {
    #[serde(default)]
    pub bins: Vec<i32>,
    #[serde(default)]
    pub counts: Vec<u64>,
    #[serde(default)]
    pub median: Option<i32>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
    #[serde(default)]
    pub total_samples: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OuiStats {
    #[serde(default)]
    pub vendors: Vec<NamedCount>,
    #[serde(default)]
    pub total_devices: Option<u64>,
    #[serde(default)]
    pub unknown_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProtocolStats {
    #[serde(default)]
    pub protocols: Vec<NamedCount>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LifetimeStats {
    #[serde(default)]
    pub avg_lifetime_minutes: Option<f64>,
    #[serde(default)]
    pub median_lifetime_minutes: Option<f64>,
    #[serde(default)]
    pub max_lifetime_minutes: Option<f64>,
    #[serde(default)]
    pub devices_with_multiple_sightings: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtendedStats {
    #[serde(default)]
    pub rssi: RssiStats,
    #[serde(default)]
    pub oui: OuiStats,
    #[serde(default)]
    pub protocol: ProtocolStats,
    #[serde(default)]
    pub lifetime: LifetimeStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdvancedStats {
    #[serde(default)]
    pub timespan_days: Option<f64>,
    #[serde(default)]
    pub avg_scans_per_device: Option<f64>,
    #[serde(default)]
    pub median_scans: Option<f64>,
    #[serde(default)]
    pub growth_rate_24h: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}' (expected csv or json)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sighting_tolerates_missing_fields() {
        let s: DeviceSighting =
            serde_json::from_str(r#"{"mac":"AA:BB:CC:00:00:01"}"#).unwrap();
        assert_eq!(s.mac, "AA:BB:CC:00:00:01");
        assert_eq!(s.rssi, None);
        assert_eq!(s.status, DeviceStatus::Offline);
    }

    #[test]
    fn sighting_parses_full_payload() {
        let s: DeviceSighting = serde_json::from_str(
            r#"{"mac":"AA:BB:CC:00:00:01","name":"Pixel","type":"smartphone",
                "rssi":-61,"timestamp":"2025-10-14T12:30:00Z","status":"online"}"#,
        )
        .unwrap();
        assert_eq!(s.name.as_deref(), Some("Pixel"));
        assert_eq!(s.kind.as_deref(), Some("smartphone"));
        assert_eq!(s.rssi, Some(-61));
        assert_eq!(s.status, DeviceStatus::Online);
    }

    #[test]
    fn status_response_scanner_access() {
        let status: StatusResponse = serde_json::from_str(
            r#"{"status":"online","scanners":{
                "bluetooth":{"running":true,"device_count":7,"last_scan":"2025-10-14T12:30:00Z"},
                "wifi":{"running":false,"device_count":0}}}"#,
        )
        .unwrap();
        assert!(status.is_online());
        let bt = status.scanners.get(ScannerKind::Bluetooth).unwrap();
        assert!(bt.running);
        assert_eq!(bt.device_count, 7);
        assert!(status.scanners.get(ScannerKind::Rf).is_none());
    }

    #[test]
    fn overview_keeps_absent_fields_as_none() {
        let o: OverviewStats = serde_json::from_str(r#"{"total_scans":120}"#).unwrap();
        assert_eq!(o.total_scans, Some(120));
        assert_eq!(o.unique_devices, None);
    }

    #[test]
    fn control_response_failure_shape() {
        let r: ControlResponse =
            serde_json::from_str(r#"{"success":false,"error":"Scanner not available"}"#).unwrap();
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("Scanner not available"));
    }

    #[test]
    fn heatmap_matrix_shape() {
        let h: HeatmapStats = serde_json::from_str(
            r#"{"matrix":[[1,0],[0,2]],"hours":[0,1],"weekdays":["Mon","Tue"]}"#,
        )
        .unwrap();
        assert_eq!(h.matrix[1][1], 2);
        assert_eq!(h.weekdays.len(), 2);
    }
}
