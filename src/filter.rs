use std::collections::BTreeSet;

/// Time window accepted by the backend's `time_filter` query parameter.
/// Radio semantics: exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    All,
    Last24h,
    Last7d,
    Last30d,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::All,
        TimeFilter::Last24h,
        TimeFilter::Last7d,
        TimeFilter::Last30d,
    ];

    /// Wire value; `All` is encoded by omitting the parameter.
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            TimeFilter::All => None,
            TimeFilter::Last24h => Some("24h"),
            TimeFilter::Last7d => Some("7d"),
            TimeFilter::Last30d => Some("30d"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::All => "ALL TIME",
            TimeFilter::Last24h => "LAST 24H",
            TimeFilter::Last7d => "LAST 7 DAYS",
            TimeFilter::Last30d => "LAST 30 DAYS",
        }
    }

    pub fn next(&self) -> TimeFilter {
        match self {
            TimeFilter::All => TimeFilter::Last24h,
            TimeFilter::Last24h => TimeFilter::Last7d,
            TimeFilter::Last7d => TimeFilter::Last30d,
            TimeFilter::Last30d => TimeFilter::All,
        }
    }
}

impl std::str::FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TimeFilter::All),
            "24h" => Ok(TimeFilter::Last24h),
            "7d" => Ok(TimeFilter::Last7d),
            "30d" => Ok(TimeFilter::Last30d),
            other => Err(format!(
                "unknown time filter '{}' (expected all, 24h, 7d or 30d)",
                other
            )),
        }
    }
}

/// Checkbox-style filter categories: zero or more selected values each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSet {
    Scanner,
    Device,
    Status,
}

/// Immutable copy of all filter fields, taken at call time so an in-flight
/// refresh never observes a torn update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    pub time: TimeFilter,
    pub scanner: BTreeSet<String>,
    pub device: BTreeSet<String>,
    pub status: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    time: TimeFilter,
    scanner: BTreeSet<String>,
    device: BTreeSet<String>,
    status: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> TimeFilter {
        self.time
    }

    /// Replaces the single active time window.
    pub fn set_time(&mut self, value: TimeFilter) {
        self.time = value;
    }

    /// Adds `value` to the named set if absent, removes it if present.
    pub fn toggle(&mut self, set: FilterSet, value: &str) {
        let set = self.set_mut(set);
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn contains(&self, set: FilterSet, value: &str) -> bool {
        self.set_ref(set).contains(value)
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            time: self.time,
            scanner: self.scanner.clone(),
            device: self.device.clone(),
            status: self.status.clone(),
        }
    }

    fn set_mut(&mut self, set: FilterSet) -> &mut BTreeSet<String> {
        match set {
            FilterSet::Scanner => &mut self.scanner,
            FilterSet::Device => &mut self.device,
            FilterSet::Status => &mut self.status,
        }
    }

    fn set_ref(&self, set: FilterSet) -> &BTreeSet<String> {
        match set {
            FilterSet::Scanner => &self.scanner,
            FilterSet::Device => &self.device,
            FilterSet::Status => &self.status,
        }
    }
}

impl FilterSnapshot {
    /// Whether a device row passes the checkbox filters. The time window is
    /// applied server-side via `time_filter`; the sets are client-side.
    pub fn matches(&self, scanner: Option<&str>, device_kind: Option<&str>, status: &str) -> bool {
        let in_set = |set: &BTreeSet<String>, value: Option<&str>| {
            set.is_empty() || value.is_some_and(|v| set.contains(v))
        };
        in_set(&self.scanner, scanner)
            && in_set(&self.device, device_kind)
            && (self.status.is_empty() || self.status.contains(status))
    }
}
