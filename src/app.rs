use crate::api::{ApiClient, ApiError};
use crate::chart::{ChartBoard, ChartData, ChartKind, ChartSlot};
use crate::filter::{FilterSet, FilterState};
use crate::format;
use crate::model::*;
use crate::notify::{NotificationKind, NotificationLog};
use crate::poller::{DataEvent, PollSource, Poller};
use crate::view::{View, ViewController};
use chrono::{DateTime, Utc};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{info, warn};

/// Search queries shorter than this never hit the backend.
const SEARCH_MIN_LEN: usize = 2;
/// Debounce window between the last keystroke and the search request.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// How many rows of the device table are kept for display.
const DEVICE_TABLE_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct DashConfig {
    pub base_url: String,
    pub status_interval: Duration,
    pub device_interval: Duration,
    pub stats_interval: Duration,
    pub export_dir: PathBuf,
}

/// Backend reachability as seen by the status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnState {
    #[default]
    Unknown,
    Operational,
    Error,
    Disconnected,
}

impl ConnState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnState::Unknown => "CONNECTING",
            ConnState::Operational => "OPERATIONAL",
            ConnState::Error => "ERROR",
            ConnState::Disconnected => "DISCONNECTED",
        }
    }
}

#[derive(Debug, Default)]
pub enum SearchOutcome {
    #[default]
    None,
    Results(Vec<LogEntry>),
    Failed,
}

/// Side effects requested by state transitions; the run loop maps them
/// onto the poller. Keeping them as data keeps the transitions testable.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    StartLivePolling,
    StopLivePolling,
    RefreshDevices,
    RefreshStats,
    RefreshLogs,
    Search(String),
    Control(ScannerKind, ScanAction),
    Export(ExportFormat),
    Quit,
}

/// All client-side state, owned explicitly and mutated only on the event
/// loop. Created at startup, dropped on exit; nothing survives the session.
pub struct App {
    pub nav: ViewController,
    pub filters: FilterState,
    pub notifications: NotificationLog,
    pub charts: ChartBoard,

    pub conn: ConnState,
    pub scanners: Scanners,
    pub devices: Vec<DeviceSighting>,
    pub logs: Vec<LogEntry>,

    pub overview: Option<OverviewStats>,
    pub top_devices: Option<TopDevicesStats>,
    pub peak_hour: Option<u32>,
    pub max_day: Option<String>,
    pub most_active_day: Option<String>,
    pub rssi_median: Option<i32>,
    pub vendor_total: Option<u64>,
    pub protocol_total: Option<u64>,
    pub lifetime: Option<LifetimeStats>,
    pub advanced: Option<AdvancedStats>,

    pub scanning: bool,
    pub scan_started_at: Option<DateTime<Utc>>,
    pub selected_scanner: ScannerKind,

    pub search_input: String,
    pub search_focused: bool,
    pub search_outcome: SearchOutcome,
    search_pending_since: Option<Instant>,

    pub notifications_open: bool,
    pub device_scroll: usize,
    pub log_scroll: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            nav: ViewController::new(),
            filters: FilterState::new(),
            notifications: NotificationLog::new(),
            charts: ChartBoard::new(),
            conn: ConnState::Unknown,
            scanners: Scanners::default(),
            devices: Vec::new(),
            logs: Vec::new(),
            overview: None,
            top_devices: None,
            peak_hour: None,
            max_day: None,
            most_active_day: None,
            rssi_median: None,
            vendor_total: None,
            protocol_total: None,
            lifetime: None,
            advanced: None,
            scanning: false,
            scan_started_at: None,
            selected_scanner: ScannerKind::Bluetooth,
            search_input: String::new(),
            search_focused: false,
            search_outcome: SearchOutcome::None,
            search_pending_since: None,
            notifications_open: false,
            device_scroll: 0,
            log_scroll: 0,
        }
    }

    pub fn start_enabled(&self) -> bool {
        !self.scanning
    }

    pub fn stop_enabled(&self) -> bool {
        self.scanning
    }

    /// The four overview cards, rendered verbatim from the payload.
    pub fn overview_cards(&self) -> [String; 4] {
        let o = self.overview.clone().unwrap_or_default();
        [
            format::count(o.total_scans),
            format::count(o.unique_devices),
            format::count(o.last_24h),
            format::count(o.last_hour),
        ]
    }

    pub fn uptime_label(&self, now: DateTime<Utc>) -> String {
        match self.scan_started_at {
            Some(started) => {
                format::duration_hms((now - started).num_seconds().max(0) as u64)
            }
            None => "--:--".to_string(),
        }
    }

    /// Device rows that pass the current checkbox filters: a window of at
    /// most `DEVICE_TABLE_LIMIT` rows starting at the scroll offset, so
    /// scrolling walks the whole filtered list.
    pub fn visible_devices(&self) -> Vec<&DeviceSighting> {
        self.filtered_devices()
            .skip(self.device_scroll)
            .take(DEVICE_TABLE_LIMIT)
            .collect()
    }

    fn filtered_devices(&self) -> impl Iterator<Item = &DeviceSighting> + '_ {
        let snapshot = self.filters.snapshot();
        self.devices.iter().filter(move |d| {
            let status = match d.status {
                DeviceStatus::Online => "online",
                DeviceStatus::Offline => "offline",
            };
            snapshot.matches(Some("bluetooth"), d.kind.as_deref(), status)
        })
    }

    // -- input ------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if self.search_focused {
            return self.handle_search_key(key.code);
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => vec![Effect::Quit],
            KeyCode::Char('/') => {
                self.search_focused = true;
                Vec::new()
            }
            KeyCode::Char(c @ '1'..='9') => {
                self.nav.switch_by_key(c);
                Vec::new()
            }
            KeyCode::Tab => {
                self.selected_scanner = match self.selected_scanner {
                    ScannerKind::Bluetooth => ScannerKind::Wifi,
                    ScannerKind::Wifi => ScannerKind::Rf,
                    ScannerKind::Rf => ScannerKind::Bluetooth,
                };
                Vec::new()
            }
            KeyCode::Char('s') if self.start_enabled() => {
                vec![Effect::Control(self.selected_scanner, ScanAction::Start)]
            }
            KeyCode::Char('x') if self.stop_enabled() => {
                vec![Effect::Control(self.selected_scanner, ScanAction::Stop)]
            }
            KeyCode::Char('m') => {
                self.notifications.push(
                    "Manual Scan",
                    "Starting one-time scan...",
                    NotificationKind::Info,
                );
                vec![Effect::Control(self.selected_scanner, ScanAction::Manual)]
            }
            KeyCode::Char('t') => {
                self.filters.set_time(self.filters.time().next());
                vec![Effect::RefreshDevices, Effect::RefreshStats]
            }
            KeyCode::Char('B') => self.toggle_filter(FilterSet::Scanner, "bluetooth"),
            KeyCode::Char('W') => self.toggle_filter(FilterSet::Scanner, "wifi"),
            KeyCode::Char('R') => self.toggle_filter(FilterSet::Scanner, "rf"),
            KeyCode::Char('P') => self.toggle_filter(FilterSet::Device, "smartphone"),
            KeyCode::Char('H') => self.toggle_filter(FilterSet::Device, "headset"),
            KeyCode::Char('O') => self.toggle_filter(FilterSet::Status, "online"),
            KeyCode::Char('F') => self.toggle_filter(FilterSet::Status, "offline"),
            KeyCode::Char('n') => {
                self.notifications_open = !self.notifications_open;
                if self.notifications_open {
                    self.notifications.mark_all_read();
                }
                Vec::new()
            }
            KeyCode::Char('c') if self.notifications_open => {
                self.notifications.clear();
                self.notifications_open = false;
                Vec::new()
            }
            KeyCode::Char('e') if self.nav.active() == View::Export => {
                vec![Effect::Export(ExportFormat::Csv)]
            }
            KeyCode::Char('j') if self.nav.active() == View::Export => {
                vec![Effect::Export(ExportFormat::Json)]
            }
            KeyCode::Char('l') if self.nav.active() == View::Logs => {
                vec![Effect::RefreshLogs]
            }
            KeyCode::Up => {
                self.scroll(-1);
                Vec::new()
            }
            KeyCode::Down => {
                self.scroll(1);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Vec<Effect> {
        match code {
            KeyCode::Esc => {
                self.search_focused = false;
                self.search_outcome = SearchOutcome::None;
                self.search_pending_since = None;
                Vec::new()
            }
            KeyCode::Enter => {
                self.search_pending_since = None;
                if self.search_input.trim().len() >= SEARCH_MIN_LEN {
                    vec![Effect::Search(self.search_input.trim().to_string())]
                } else {
                    Vec::new()
                }
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.touch_search();
                Vec::new()
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.touch_search();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn touch_search(&mut self) {
        if self.search_input.trim().len() >= SEARCH_MIN_LEN {
            self.search_pending_since = Some(Instant::now());
        } else {
            self.search_pending_since = None;
            self.search_outcome = SearchOutcome::None;
        }
    }

    fn toggle_filter(&mut self, set: FilterSet, value: &str) -> Vec<Effect> {
        self.filters.toggle(set, value);
        vec![Effect::RefreshDevices, Effect::RefreshStats]
    }

    fn scroll(&mut self, delta: isize) {
        let on_logs = self.nav.active() == View::Logs;
        // Scroll positions index the filtered list, not the raw payload.
        let len = if on_logs {
            self.logs.len()
        } else {
            self.filtered_devices().count()
        };
        let pos = if on_logs {
            &mut self.log_scroll
        } else {
            &mut self.device_scroll
        };
        let next = pos.saturating_add_signed(delta);
        *pos = next.min(len.saturating_sub(1));
    }

    /// Debounced search: fires once the input has been stable long enough.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Effect> {
        if let Some(since) = self.search_pending_since {
            if now.duration_since(since) >= SEARCH_DEBOUNCE {
                self.search_pending_since = None;
                let query = self.search_input.trim().to_string();
                if query.len() >= SEARCH_MIN_LEN {
                    return vec![Effect::Search(query)];
                }
            }
        }
        Vec::new()
    }

    // -- data events ------------------------------------------------------

    /// Applies one fetched outcome to exactly the region it belongs to.
    /// Failures leave the previously displayed values untouched.
    pub fn apply_event(&mut self, event: DataEvent) -> Vec<Effect> {
        match event {
            DataEvent::Status(status) => self.apply_status(status),
            DataEvent::Devices(devices) => {
                // Wholesale replacement; no field-by-field merging.
                self.devices = devices;
                self.device_scroll = self
                    .device_scroll
                    .min(self.filtered_devices().count().saturating_sub(1));
                Vec::new()
            }
            DataEvent::Logs(logs) => {
                self.logs = logs;
                self.log_scroll = self.log_scroll.min(self.logs.len().saturating_sub(1));
                Vec::new()
            }
            DataEvent::SearchResults { results, .. } => {
                self.search_outcome = SearchOutcome::Results(results);
                Vec::new()
            }
            DataEvent::SearchFailed { .. } => {
                self.search_outcome = SearchOutcome::Failed;
                Vec::new()
            }
            DataEvent::Overview(overview) => {
                self.overview = Some(overview);
                Vec::new()
            }
            DataEvent::TopDevices(top) => {
                self.top_devices = Some(top);
                Vec::new()
            }
            DataEvent::Hourly(hourly) => {
                self.peak_hour = hourly.peak_hour;
                self.charts.render(
                    ChartSlot::Hourly,
                    ChartKind::Line,
                    ChartData::Series {
                        labels: hourly.hours.iter().map(|h| format!("{}:00", h)).collect(),
                        values: hourly.counts.iter().map(|&c| c as f64).collect(),
                    },
                );
                Vec::new()
            }
            DataEvent::Daily(daily) => {
                self.max_day = daily.max_day.clone();
                self.charts.render(
                    ChartSlot::Daily,
                    ChartKind::Bar,
                    ChartData::Series {
                        labels: daily.dates.clone(),
                        values: daily.counts.iter().map(|&c| c as f64).collect(),
                    },
                );
                Vec::new()
            }
            DataEvent::Weekday(weekday) => {
                self.most_active_day = weekday.most_active.clone();
                self.charts.render(
                    ChartSlot::Weekday,
                    ChartKind::Bar,
                    ChartData::Series {
                        labels: weekday.weekdays.clone(),
                        values: weekday.counts.iter().map(|&c| c as f64).collect(),
                    },
                );
                Vec::new()
            }
            DataEvent::Heatmap(heatmap) => {
                self.charts.render(
                    ChartSlot::Heatmap,
                    ChartKind::Heatmap,
                    ChartData::Matrix {
                        rows: heatmap
                            .matrix
                            .iter()
                            .map(|row| row.iter().map(|&v| v as f64).collect())
                            .collect(),
                        x_labels: heatmap.hours.iter().map(|h| h.to_string()).collect(),
                        y_labels: heatmap.weekdays.clone(),
                    },
                );
                Vec::new()
            }
            DataEvent::Extended(extended) => self.apply_extended(extended),
            DataEvent::Advanced(advanced) => {
                self.advanced = Some(advanced);
                Vec::new()
            }
            DataEvent::ControlOutcome { kind, action, result } => {
                self.apply_control(kind, action, result)
            }
            DataEvent::ExportDone { format, result } => {
                match result {
                    Ok(path) => self.notifications.push(
                        "Export Complete",
                        &format!("Saved {} export to {}", format, path.display()),
                        NotificationKind::Success,
                    ),
                    Err(error) => self.notifications.push(
                        "Export Failed",
                        &error,
                        NotificationKind::Error,
                    ),
                }
                Vec::new()
            }
            DataEvent::PollFailed { source, .. } => {
                // Passive polls degrade silently: last-good values stay up.
                if source == PollSource::Status {
                    self.conn = ConnState::Disconnected;
                }
                Vec::new()
            }
        }
    }

    fn apply_status(&mut self, status: StatusResponse) -> Vec<Effect> {
        self.conn = if status.is_online() {
            ConnState::Operational
        } else {
            ConnState::Error
        };
        let was_scanning = self.scanning;
        self.scanners = status.scanners;
        // The backend is the source of truth for scanner state; reconcile
        // a scan started elsewhere (or one that died) on every poll.
        let running = ScannerKind::ALL
            .iter()
            .any(|&k| self.scanners.get(k).is_some_and(|s| s.running));
        if running && !was_scanning {
            self.scanning = true;
            self.scan_started_at.get_or_insert_with(Utc::now);
            return vec![Effect::StartLivePolling];
        }
        if !running && was_scanning {
            self.scanning = false;
            self.scan_started_at = None;
            return vec![Effect::StopLivePolling];
        }
        Vec::new()
    }

    fn apply_extended(&mut self, extended: ExtendedStats) -> Vec<Effect> {
        self.rssi_median = extended.rssi.median;
        self.vendor_total = extended.oui.total_devices;
        self.protocol_total = extended.protocol.total;
        self.lifetime = Some(extended.lifetime);
        self.charts.render(
            ChartSlot::Rssi,
            ChartKind::Bar,
            ChartData::Series {
                labels: extended.rssi.bins.iter().map(|b| format!("{} dBm", b)).collect(),
                values: extended.rssi.counts.iter().map(|&c| c as f64).collect(),
            },
        );
        self.charts.render(
            ChartSlot::Vendors,
            ChartKind::Doughnut,
            ChartData::Series {
                labels: extended.oui.vendors.iter().map(|v| v.name.clone()).collect(),
                values: extended.oui.vendors.iter().map(|v| v.count as f64).collect(),
            },
        );
        self.charts.render(
            ChartSlot::Protocols,
            ChartKind::Pie,
            ChartData::Series {
                labels: extended.protocol.protocols.iter().map(|p| p.name.clone()).collect(),
                values: extended
                    .protocol
                    .protocols
                    .iter()
                    .map(|p| p.count as f64)
                    .collect(),
            },
        );
        Vec::new()
    }

    fn apply_control(
        &mut self,
        kind: ScannerKind,
        action: ScanAction,
        result: Result<ControlResponse, ApiError>,
    ) -> Vec<Effect> {
        match (action, result) {
            (ScanAction::Start, Ok(_)) => {
                self.scanning = true;
                self.scan_started_at = Some(Utc::now());
                self.notifications.push(
                    "Scanner Started",
                    &format!("{} scan is now running", kind.label()),
                    NotificationKind::Success,
                );
                vec![Effect::StartLivePolling]
            }
            (ScanAction::Stop, Ok(_)) => {
                self.scanning = false;
                self.scan_started_at = None;
                self.notifications.push(
                    "Scanner Stopped",
                    &format!("{} scan has been stopped", kind.label()),
                    NotificationKind::Info,
                );
                vec![Effect::StopLivePolling]
            }
            (ScanAction::Manual, Ok(response)) => {
                self.notifications.push(
                    "Scan Complete",
                    &format!("Found {} devices", format::count(response.device_count)),
                    NotificationKind::Success,
                );
                vec![Effect::RefreshDevices]
            }
            (_, Err(ApiError::Transport(_))) => {
                self.notifications.push(
                    "Connection Error",
                    "Could not reach the scanner API",
                    NotificationKind::Error,
                );
                Vec::new()
            }
            (action, Err(error)) => {
                let title = match action {
                    ScanAction::Start => "Scan Failed",
                    ScanAction::Stop => "Stop Failed",
                    ScanAction::Manual => "Manual Scan Failed",
                };
                self.notifications
                    .push(title, &error.to_string(), NotificationKind::Error);
                Vec::new()
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Runs the dashboard until the user quits. Everything is driven by three
/// inputs racing in a `select!`: key events, fetched data, and a redraw
/// tick. All state mutation happens here, on this single task.
pub async fn run(config: DashConfig) -> anyhow::Result<()> {
    let client = Arc::new(ApiClient::new(&config.base_url));
    let (tx, mut rx) = mpsc::channel::<DataEvent>(256);
    let mut poller = Poller::new(client, tx);
    let mut app = App::new();

    info!(url = %config.base_url, "starting dashboard");
    poller.start(PollSource::Status, config.status_interval, app.filters.time());
    poller.start(PollSource::Stats, config.stats_interval, app.filters.time());
    poller.refresh_devices();
    poller.refresh_logs();

    let mut terminal = ratatui::init();
    let mut keys = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    let result = loop {
        if let Err(e) = terminal.draw(|frame| crate::ui::draw(frame, &app)) {
            break Err(e.into());
        }
        let effects = tokio::select! {
            event = keys.next() => match event {
                Some(Ok(Event::Key(key))) => app.handle_key(key),
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    warn!(error = %e, "terminal event stream error");
                    Vec::new()
                }
                None => break Ok(()),
            },
            data = rx.recv() => match data {
                Some(event) => app.apply_event(event),
                None => break Ok(()),
            },
            _ = tick.tick() => app.on_tick(Instant::now()),
        };
        let mut quit = false;
        for effect in effects {
            match effect {
                Effect::StartLivePolling => {
                    poller.start(PollSource::LiveDevices, config.device_interval, app.filters.time());
                }
                Effect::StopLivePolling => poller.stop(PollSource::LiveDevices),
                Effect::RefreshDevices => poller.refresh_devices(),
                Effect::RefreshStats => {
                    // Restarting also re-arms the interval with the new
                    // filter; the first tick is the refresh itself.
                    poller.start(PollSource::Stats, config.stats_interval, app.filters.time());
                }
                Effect::RefreshLogs => poller.refresh_logs(),
                Effect::Search(query) => poller.search(query),
                Effect::Control(kind, action) => poller.control(kind, action),
                Effect::Export(format) => {
                    poller.export(format, app.filters.time(), config.export_dir.clone());
                }
                Effect::Quit => quit = true,
            }
        }
        if quit {
            break Ok(());
        }
    };

    poller.stop_all();
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TimeFilter;

    fn sighting(mac: &str) -> DeviceSighting {
        DeviceSighting {
            mac: mac.to_string(),
            name: Some("Test".to_string()),
            kind: Some("smartphone".to_string()),
            rssi: Some(-60),
            timestamp: None,
            status: DeviceStatus::Online,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, crossterm::event::KeyModifiers::NONE)
    }

    #[test]
    fn failed_device_poll_leaves_table_unchanged() {
        let mut app = App::new();
        app.apply_event(DataEvent::Devices(vec![sighting("AA:BB:CC:00:00:01")]));
        assert_eq!(app.devices.len(), 1);

        app.apply_event(DataEvent::PollFailed {
            source: PollSource::LiveDevices,
            error: ApiError::Backend("boom".to_string()),
        });
        // No blanking, no zero-devices flash.
        assert_eq!(app.devices.len(), 1);
        assert_eq!(app.devices[0].mac, "AA:BB:CC:00:00:01");
    }

    #[test]
    fn failed_status_poll_marks_disconnected_only() {
        let mut app = App::new();
        app.apply_event(DataEvent::Devices(vec![sighting("AA:BB:CC:00:00:01")]));
        app.apply_event(DataEvent::PollFailed {
            source: PollSource::Status,
            error: ApiError::Backend("down".to_string()),
        });
        assert_eq!(app.conn, ConnState::Disconnected);
        assert_eq!(app.devices.len(), 1);
        assert_eq!(app.notifications.len(), 0);
    }

    #[test]
    fn successful_start_notifies_inverts_buttons_and_starts_polling() {
        let mut app = App::new();
        assert!(app.start_enabled());
        assert!(!app.stop_enabled());

        let effects = app.apply_event(DataEvent::ControlOutcome {
            kind: ScannerKind::Bluetooth,
            action: ScanAction::Start,
            result: Ok(ControlResponse {
                success: true,
                error: None,
                device_count: None,
            }),
        });

        assert_eq!(effects, vec![Effect::StartLivePolling]);
        assert!(!app.start_enabled());
        assert!(app.stop_enabled());
        assert_eq!(app.notifications.len(), 1);
        let n = &app.notifications.entries()[0];
        assert_eq!(n.title, "Scanner Started");
        assert_eq!(n.kind, NotificationKind::Success);
    }

    #[test]
    fn stop_reverses_start() {
        let mut app = App::new();
        app.apply_event(DataEvent::ControlOutcome {
            kind: ScannerKind::Bluetooth,
            action: ScanAction::Start,
            result: Ok(ControlResponse { success: true, error: None, device_count: None }),
        });
        let effects = app.apply_event(DataEvent::ControlOutcome {
            kind: ScannerKind::Bluetooth,
            action: ScanAction::Stop,
            result: Ok(ControlResponse { success: true, error: None, device_count: None }),
        });
        assert_eq!(effects, vec![Effect::StopLivePolling]);
        assert!(app.start_enabled());
        assert_eq!(app.notifications.entries()[0].title, "Scanner Stopped");
    }

    #[test]
    fn failed_control_action_surfaces_error_notification() {
        let mut app = App::new();
        let effects = app.apply_event(DataEvent::ControlOutcome {
            kind: ScannerKind::Bluetooth,
            action: ScanAction::Start,
            result: Err(ApiError::Backend("Scanner not available".to_string())),
        });
        assert!(effects.is_empty());
        assert!(!app.scanning);
        let n = &app.notifications.entries()[0];
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.message, "Scanner not available");
    }

    #[test]
    fn overview_values_render_verbatim() {
        let mut app = App::new();
        app.apply_event(DataEvent::Overview(OverviewStats {
            total_scans: Some(120),
            unique_devices: Some(15),
            last_24h: Some(40),
            last_hour: Some(3),
        }));
        assert_eq!(app.overview_cards(), ["120", "15", "40", "3"]);
    }

    #[test]
    fn overview_cards_show_placeholder_before_first_fetch() {
        let app = App::new();
        assert_eq!(app.overview_cards(), ["--", "--", "--", "--"]);
    }

    #[test]
    fn status_poll_reconciles_externally_started_scan() {
        let mut app = App::new();
        let mut status = StatusResponse::default();
        status.status = Some("online".to_string());
        status.scanners.bluetooth = Some(ScannerStatus {
            running: true,
            device_count: 3,
            last_scan: None,
        });
        let effects = app.apply_event(DataEvent::Status(status));
        assert_eq!(effects, vec![Effect::StartLivePolling]);
        assert!(app.scanning);
        assert_eq!(app.conn, ConnState::Operational);
    }

    #[test]
    fn status_poll_reconciles_scan_stopped_elsewhere() {
        let mut app = App::new();
        app.scanning = true;
        app.scan_started_at = Some(Utc::now());
        let mut status = StatusResponse::default();
        status.status = Some("online".to_string());
        status.scanners.bluetooth = Some(ScannerStatus::default());
        let effects = app.apply_event(DataEvent::Status(status));
        assert_eq!(effects, vec![Effect::StopLivePolling]);
        assert!(!app.scanning);
    }

    #[test]
    fn time_filter_key_cycles_and_triggers_refreshes() {
        let mut app = App::new();
        let effects = app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.filters.time(), TimeFilter::Last24h);
        assert_eq!(effects, vec![Effect::RefreshDevices, Effect::RefreshStats]);
    }

    #[test]
    fn filter_toggle_key_triggers_refreshes() {
        let mut app = App::new();
        let effects = app.handle_key(key(KeyCode::Char('O')));
        assert!(app.filters.contains(FilterSet::Status, "online"));
        assert_eq!(effects, vec![Effect::RefreshDevices, Effect::RefreshStats]);
    }

    #[test]
    fn start_key_ignored_while_scanning() {
        let mut app = App::new();
        app.scanning = true;
        assert!(app.handle_key(key(KeyCode::Char('s'))).is_empty());
        app.scanning = false;
        assert_eq!(
            app.handle_key(key(KeyCode::Char('s'))),
            vec![Effect::Control(ScannerKind::Bluetooth, ScanAction::Start)]
        );
    }

    #[test]
    fn opening_notification_panel_marks_all_read() {
        let mut app = App::new();
        app.notifications
            .push("a", "b", NotificationKind::Info);
        assert_eq!(app.notifications.unread_count(), 1);
        app.handle_key(key(KeyCode::Char('n')));
        assert!(app.notifications_open);
        assert_eq!(app.notifications.unread_count(), 0);
        assert_eq!(app.notifications.badge(), None);
    }

    #[test]
    fn search_debounce_fires_after_quiet_period() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('/')));
        assert!(app.search_focused);
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Char('b')));

        // Immediately after typing, nothing fires yet.
        assert!(app.on_tick(Instant::now()).is_empty());
        let later = Instant::now() + SEARCH_DEBOUNCE;
        assert_eq!(app.on_tick(later), vec![Effect::Search("ab".to_string())]);
        // The pending marker is consumed; no duplicate fire.
        assert!(app.on_tick(later + SEARCH_DEBOUNCE).is_empty());
    }

    #[test]
    fn short_queries_never_fire() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('/')));
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app
            .on_tick(Instant::now() + SEARCH_DEBOUNCE)
            .is_empty());
        assert!(app.handle_key(key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn search_failure_renders_inline_without_notification() {
        let mut app = App::new();
        app.apply_event(DataEvent::SearchFailed {
            query: "pixel".to_string(),
        });
        assert!(matches!(app.search_outcome, SearchOutcome::Failed));
        assert_eq!(app.notifications.len(), 0);
    }

    #[test]
    fn devices_are_replaced_wholesale() {
        let mut app = App::new();
        app.apply_event(DataEvent::Devices(vec![
            sighting("AA:BB:CC:00:00:01"),
            sighting("AA:BB:CC:00:00:02"),
        ]));
        app.apply_event(DataEvent::Devices(vec![sighting("AA:BB:CC:00:00:03")]));
        assert_eq!(app.devices.len(), 1);
        assert_eq!(app.devices[0].mac, "AA:BB:CC:00:00:03");
    }

    #[test]
    fn device_scroll_walks_past_the_first_window() {
        let mut app = App::new();
        let devices: Vec<_> = (0..60)
            .map(|i| sighting(&format!("AA:BB:CC:00:00:{:02X}", i)))
            .collect();
        app.apply_event(DataEvent::Devices(devices));
        assert_eq!(app.visible_devices().len(), DEVICE_TABLE_LIMIT);

        for _ in 0..55 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.device_scroll, 55);
        let rows = app.visible_devices();
        // The window slides over the tail instead of going blank.
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].mac, "AA:BB:CC:00:00:37");
    }

    #[test]
    fn visible_devices_respect_status_filter() {
        let mut app = App::new();
        let mut offline = sighting("AA:BB:CC:00:00:02");
        offline.status = DeviceStatus::Offline;
        app.apply_event(DataEvent::Devices(vec![sighting("AA:BB:CC:00:00:01"), offline]));
        assert_eq!(app.visible_devices().len(), 2);

        app.filters.toggle(FilterSet::Status, "online");
        assert_eq!(app.visible_devices().len(), 1);
        assert_eq!(app.visible_devices()[0].mac, "AA:BB:CC:00:00:01");
    }

    #[test]
    fn hourly_payload_builds_line_chart_and_peak() {
        let mut app = App::new();
        app.apply_event(DataEvent::Hourly(HourlyStats {
            hours: vec![0, 1, 2],
            counts: vec![4, 9, 1],
            peak_hour: Some(1),
            quiet_hour: Some(2),
            average: None,
        }));
        assert_eq!(app.peak_hour, Some(1));
        let model = app.charts.get(ChartSlot::Hourly).unwrap();
        assert_eq!(model.kind, ChartKind::Line);
        assert_eq!(model.categories.len(), 3);
        assert_eq!(model.categories[0].label, "0:00");
    }

    #[test]
    fn unknown_view_key_keeps_active_view() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.nav.active(), View::Stats);
        app.handle_key(key(KeyCode::Char('9')));
        assert_eq!(app.nav.active(), View::Stats);
    }
}
