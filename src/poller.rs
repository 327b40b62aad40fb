use crate::api::{ApiClient, ApiError};
use crate::filter::TimeFilter;
use crate::model::*;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// Data sources that run on a repeating timer. Each owns one independently
/// startable/stoppable task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollSource {
    Status,
    LiveDevices,
    Logs,
    Stats,
}

/// How many log entries each refresh asks the backend for.
const LOG_FETCH_LIMIT: u32 = 100;

/// Outcome of a fetch, delivered to the UI loop in arrival order. Each
/// variant updates exactly one UI region; a failure in one never blocks
/// or corrupts another.
#[derive(Debug)]
pub enum DataEvent {
    Status(StatusResponse),
    Devices(Vec<DeviceSighting>),
    Logs(Vec<LogEntry>),
    SearchResults { query: String, results: Vec<LogEntry> },
    SearchFailed { query: String },
    Overview(OverviewStats),
    TopDevices(TopDevicesStats),
    Hourly(HourlyStats),
    Daily(DailyStats),
    Weekday(WeekdayStats),
    Heatmap(HeatmapStats),
    Extended(ExtendedStats),
    Advanced(AdvancedStats),
    ControlOutcome {
        kind: ScannerKind,
        action: ScanAction,
        result: Result<ControlResponse, ApiError>,
    },
    ExportDone {
        format: ExportFormat,
        result: Result<PathBuf, String>,
    },
    /// Passive poll failure; logged, never surfaced as a notification.
    PollFailed { source: PollSource, error: ApiError },
}

/// Issues backend requests on timers and on demand, forwarding every
/// outcome over an mpsc channel. In-flight requests are never cancelled;
/// overlapping completions are allowed to race (last arrival wins).
pub struct Poller {
    client: Arc<ApiClient>,
    tx: mpsc::Sender<DataEvent>,
    tasks: HashMap<PollSource, JoinHandle<()>>,
}

impl Poller {
    pub fn new(client: Arc<ApiClient>, tx: mpsc::Sender<DataEvent>) -> Self {
        Self {
            client,
            tx,
            tasks: HashMap::new(),
        }
    }

    pub fn is_running(&self, source: PollSource) -> bool {
        self.tasks
            .get(&source)
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    /// Starts (or restarts) the repeating task for one data source.
    pub fn start(&mut self, source: PollSource, every: Duration, time: TimeFilter) {
        self.stop(source);
        info!(?source, interval_secs = every.as_secs(), "starting poll task");
        let client = self.client.clone();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                ticker.tick().await;
                poll_once(&client, &tx, source, time).await;
            }
        });
        self.tasks.insert(source, task);
    }

    /// Stops the repeating task for one data source. Idempotent.
    pub fn stop(&mut self, source: PollSource) {
        if let Some(task) = self.tasks.remove(&source) {
            debug!(?source, "stopping poll task");
            task.abort();
        }
    }

    pub fn stop_all(&mut self) {
        let sources: Vec<PollSource> = self.tasks.keys().copied().collect();
        for source in sources {
            self.stop(source);
        }
    }

    // -- one-shot fetches -------------------------------------------------

    pub fn refresh_devices(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            poll_once(&client, &tx, PollSource::LiveDevices, TimeFilter::All).await;
        });
    }

    pub fn refresh_logs(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            poll_once(&client, &tx, PollSource::Logs, TimeFilter::All).await;
        });
    }

    pub fn search(&self, query: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match client.search(&query).await {
                Ok(results) => send(&tx, DataEvent::SearchResults { query, results }).await,
                Err(error) => {
                    warn!(%error, query, "search failed");
                    send(&tx, DataEvent::SearchFailed { query }).await;
                }
            }
        });
    }

    /// Fire-and-forget scanner control. Repeated calls while a request is
    /// in flight just issue duplicates; the backend stays the source of
    /// truth and the next status poll reconciles.
    pub fn control(&self, kind: ScannerKind, action: ScanAction) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.control_scanner(kind, action).await;
            send(&tx, DataEvent::ControlOutcome { kind, action, result }).await;
        });
    }

    /// Downloads an export blob and writes it under `dir` with a
    /// timestamped filename.
    pub fn export(&self, format: ExportFormat, time: TimeFilter, dir: PathBuf) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = run_export(&client, format, time, &dir).await;
            send(&tx, DataEvent::ExportDone { format, result }).await;
        });
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop_all();
    }
}

pub fn export_filename(format: ExportFormat, millis: i64) -> String {
    format!("scan_stats_{}.{}", millis, format.as_str())
}

async fn run_export(
    client: &ApiClient,
    format: ExportFormat,
    time: TimeFilter,
    dir: &std::path::Path,
) -> Result<PathBuf, String> {
    let blob = client
        .export(format, time)
        .await
        .map_err(|e| e.to_string())?;
    let path = dir.join(export_filename(format, Utc::now().timestamp_millis()));
    tokio::fs::write(&path, blob)
        .await
        .map_err(|e| e.to_string())?;
    Ok(path)
}

async fn poll_once(
    client: &ApiClient,
    tx: &mpsc::Sender<DataEvent>,
    source: PollSource,
    time: TimeFilter,
) {
    match source {
        PollSource::Status => match client.status().await {
            Ok(status) => send(tx, DataEvent::Status(status)).await,
            Err(error) => {
                warn!(%error, "status poll failed");
                send(tx, DataEvent::PollFailed { source, error }).await;
            }
        },
        PollSource::LiveDevices => match client.devices().await {
            Ok(devices) => send(tx, DataEvent::Devices(devices)).await,
            Err(error) => {
                warn!(%error, "device poll failed");
                send(tx, DataEvent::PollFailed { source, error }).await;
            }
        },
        PollSource::Logs => match client.logs(LOG_FETCH_LIMIT).await {
            Ok(logs) => send(tx, DataEvent::Logs(logs)).await,
            Err(error) => {
                warn!(%error, "log refresh failed");
                send(tx, DataEvent::PollFailed { source, error }).await;
            }
        },
        PollSource::Stats => fetch_stats(client, tx, time).await,
    }
}

async fn fetch_stats(client: &ApiClient, tx: &mpsc::Sender<DataEvent>, time: TimeFilter) {
    let (overview, top, hourly, daily, weekday, heatmap, extended, advanced) = tokio::join!(
        client.stats_overview(time),
        client.stats_top_devices(time),
        client.stats_hourly(time),
        client.stats_daily(time),
        client.stats_weekday(time),
        client.stats_heatmap(time),
        client.stats_extended(time),
        client.stats_advanced(time),
    );
    forward(tx, overview.map(DataEvent::Overview)).await;
    forward(tx, top.map(DataEvent::TopDevices)).await;
    forward(tx, hourly.map(DataEvent::Hourly)).await;
    forward(tx, daily.map(DataEvent::Daily)).await;
    forward(tx, weekday.map(DataEvent::Weekday)).await;
    forward(tx, heatmap.map(DataEvent::Heatmap)).await;
    forward(tx, extended.map(DataEvent::Extended)).await;
    forward(tx, advanced.map(DataEvent::Advanced)).await;
}

async fn forward(tx: &mpsc::Sender<DataEvent>, result: Result<DataEvent, ApiError>) {
    match result {
        Ok(event) => send(tx, event).await,
        Err(error) => {
            warn!(%error, "stats fetch failed");
            send(tx, DataEvent::PollFailed { source: PollSource::Stats, error }).await;
        }
    }
}

async fn send(tx: &mpsc::Sender<DataEvent>, event: DataEvent) {
    // A closed receiver only happens during shutdown; nothing to do then.
    let _ = tx.send(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poller() -> (Poller, mpsc::Receiver<DataEvent>) {
        // Nothing listens on this port; polls fail with transport errors.
        let client = Arc::new(ApiClient::new("http://127.0.0.1:9"));
        let (tx, rx) = mpsc::channel(64);
        (Poller::new(client, tx), rx)
    }

    #[tokio::test]
    async fn start_stop_tracks_running_state() {
        let (mut poller, _rx) = poller();
        assert!(!poller.is_running(PollSource::LiveDevices));

        poller.start(PollSource::LiveDevices, Duration::from_secs(60), TimeFilter::All);
        assert!(poller.is_running(PollSource::LiveDevices));

        poller.stop(PollSource::LiveDevices);
        assert!(!poller.is_running(PollSource::LiveDevices));
        // Stopping an already-stopped source is a no-op.
        poller.stop(PollSource::LiveDevices);
    }

    #[tokio::test]
    async fn sources_start_and_stop_independently() {
        let (mut poller, _rx) = poller();
        poller.start(PollSource::Status, Duration::from_secs(60), TimeFilter::All);
        poller.start(PollSource::Stats, Duration::from_secs(60), TimeFilter::Last24h);

        poller.stop(PollSource::Stats);
        assert!(poller.is_running(PollSource::Status));
        assert!(!poller.is_running(PollSource::Stats));

        poller.stop_all();
        assert!(!poller.is_running(PollSource::Status));
    }

    #[tokio::test]
    async fn failed_poll_emits_event_instead_of_crashing() {
        let (mut poller, mut rx) = poller();
        poller.start(PollSource::Status, Duration::from_secs(60), TimeFilter::All);

        // First tick fires immediately; the unreachable backend must surface
        // as a PollFailed event, not a panic.
        match rx.recv().await {
            Some(DataEvent::PollFailed { source, .. }) => {
                assert_eq!(source, PollSource::Status)
            }
            other => panic!("expected PollFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_log_refresh_names_its_source() {
        let (poller, mut rx) = poller();
        poller.refresh_logs();
        match rx.recv().await {
            Some(DataEvent::PollFailed { source, .. }) => {
                assert_eq!(source, PollSource::Logs)
            }
            other => panic!("expected PollFailed, got {:?}", other),
        }
    }

    #[test]
    fn export_filename_is_timestamped() {
        assert_eq!(
            export_filename(ExportFormat::Csv, 1_700_000_000_000),
            "scan_stats_1700000000000.csv"
        );
        assert_eq!(
            export_filename(ExportFormat::Json, 42),
            "scan_stats_42.json"
        );
    }
}
