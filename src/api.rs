use crate::filter::TimeFilter;
use crate::model::*;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Failure classes for a backend call. Callers decide whether a failure is
/// surfaced (user-initiated actions) or only logged (passive polls).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Http(StatusCode),
    #[error("malformed payload: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("{0}")]
    Backend(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Thin typed client over the scanner backend's REST API. One method per
/// endpoint; paths must match the backend exactly.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http(status));
        }
        response.json::<T>().await.map_err(ApiError::Decode)
    }

    pub async fn status(&self) -> ApiResult<StatusResponse> {
        self.get_json("/api/status", &[]).await
    }

    pub async fn devices(&self) -> ApiResult<Vec<DeviceSighting>> {
        self.get_json("/api/devices", &[]).await
    }

    pub async fn logs(&self, limit: u32) -> ApiResult<Vec<LogEntry>> {
        let limit = limit.to_string();
        self.get_json("/api/logs", &[("limit", limit.as_str())]).await
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<LogEntry>> {
        self.get_json("/api/search", &[("q", query)]).await
    }

    /// POST `/api/scanner/{kind}/{start|stop|manual}`. Backend-reported
    /// failures (`{success: false, error}`) come back as `ApiError::Backend`
    /// even when they ride on a non-2xx status.
    pub async fn control_scanner(
        &self,
        kind: ScannerKind,
        action: ScanAction,
    ) -> ApiResult<ControlResponse> {
        let path = format!("/api/scanner/{}/{}", kind.as_str(), action.as_str());
        debug!(%path, "POST");
        let response = self
            .http
            .post(self.endpoint(&path))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = response.status();
        let body: ControlResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(ApiError::Decode(e)),
            Err(_) => return Err(ApiError::Http(status)),
        };
        control_result(body)
    }

    async fn get_stats<T: DeserializeOwned>(
        &self,
        path: &str,
        time: TimeFilter,
    ) -> ApiResult<T> {
        match time.query_value() {
            Some(value) => self.get_json(path, &[("time_filter", value)]).await,
            None => self.get_json(path, &[]).await,
        }
    }

    pub async fn stats_overview(&self, time: TimeFilter) -> ApiResult<OverviewStats> {
        self.get_stats("/api/stats/overview", time).await
    }

    pub async fn stats_top_devices(&self, time: TimeFilter) -> ApiResult<TopDevicesStats> {
        self.get_stats("/api/stats/top-devices", time).await
    }

    pub async fn stats_hourly(&self, time: TimeFilter) -> ApiResult<HourlyStats> {
        self.get_stats("/api/stats/hourly", time).await
    }

    pub async fn stats_daily(&self, time: TimeFilter) -> ApiResult<DailyStats> {
        self.get_stats("/api/stats/daily", time).await
    }

    pub async fn stats_weekday(&self, time: TimeFilter) -> ApiResult<WeekdayStats> {
        self.get_stats("/api/stats/weekday", time).await
    }

    pub async fn stats_heatmap(&self, time: TimeFilter) -> ApiResult<HeatmapStats> {
        self.get_stats("/api/stats/heatmap", time).await
    }

    pub async fn stats_extended(&self, time: TimeFilter) -> ApiResult<ExtendedStats> {
        self.get_stats("/api/stats/extended", time).await
    }

    pub async fn stats_advanced(&self, time: TimeFilter) -> ApiResult<AdvancedStats> {
        self.get_stats("/api/stats/advanced", time).await
    }

    /// Raw export blob; the caller writes it to a timestamped file.
    pub async fn export(&self, format: ExportFormat, time: TimeFilter) -> ApiResult<Vec<u8>> {
        let path = format!("/api/export/{}", format.as_str());
        let mut request = self.http.get(self.endpoint(&path));
        if let Some(value) = time.query_value() {
            request = request.query(&[("time_filter", value)]);
        }
        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http(status));
        }
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;
        Ok(bytes.to_vec())
    }
}

/// Maps the control-response envelope onto the error taxonomy.
fn control_result(body: ControlResponse) -> ApiResult<ControlResponse> {
    if body.success {
        Ok(body)
    } else {
        Err(ApiError::Backend(
            body.error
                .unwrap_or_else(|| "scanner control failed".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.endpoint("/api/status"), "http://localhost:5000/api/status");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn control_success_passes_through() {
        let body = ControlResponse {
            success: true,
            error: None,
            device_count: Some(4),
        };
        let result = control_result(body).unwrap();
        assert_eq!(result.device_count, Some(4));
    }

    #[test]
    fn control_failure_becomes_backend_error() {
        let body = ControlResponse {
            success: false,
            error: Some("Scanner not available".to_string()),
            device_count: None,
        };
        match control_result(body) {
            Err(ApiError::Backend(message)) => assert_eq!(message, "Scanner not available"),
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn control_failure_without_message_gets_default() {
        let body = ControlResponse::default();
        match control_result(body) {
            Err(ApiError::Backend(message)) => assert_eq!(message, "scanner control failed"),
            other => panic!("expected backend error, got {:?}", other),
        }
    }
}
