use chrono::{DateTime, Utc};

/// Most entries the log keeps; pushing beyond this drops the oldest.
const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    /// Creation timestamp in milliseconds, doubling as the id.
    pub id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub unread: bool,
}

/// In-memory, newest-first log of transient user-facing events. Lives only
/// for the session; nothing is persisted.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: &str, message: &str, kind: NotificationKind) {
        self.push_at(title, message, kind, Utc::now());
    }

    /// Timestamp-injected variant so tests control the clock.
    pub fn push_at(
        &mut self,
        title: &str,
        message: &str,
        kind: NotificationKind,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            0,
            Notification {
                id: now.timestamp_millis(),
                title: title.to_string(),
                message: message.to_string(),
                kind,
                created_at: now,
                unread: true,
            },
        );
        self.entries.truncate(MAX_NOTIFICATIONS);
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| n.unread).count()
    }

    /// Badge label, or `None` when there is nothing unread (the badge is
    /// hidden entirely rather than shown as "0").
    pub fn badge(&self) -> Option<String> {
        match self.unread_count() {
            0 => None,
            n => Some(n.to_string()),
        }
    }

    pub fn mark_all_read(&mut self) {
        for entry in &mut self.entries {
            entry.unread = false;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn filled(n: usize) -> NotificationLog {
        let mut log = NotificationLog::new();
        let base = Utc::now();
        for i in 0..n {
            log.push_at(
                &format!("title {}", i),
                "msg",
                NotificationKind::Info,
                base + Duration::seconds(i as i64),
            );
        }
        log
    }

    #[test]
    fn bounded_at_twenty_newest_first() {
        let log = filled(25);
        assert_eq!(log.len(), 20);
        // Newest (last pushed) sits at the head, oldest were dropped.
        assert_eq!(log.entries()[0].title, "title 24");
        assert_eq!(log.entries()[19].title, "title 5");
        for pair in log.entries().windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn every_push_keeps_the_bound() {
        let mut log = NotificationLog::new();
        for i in 0..100 {
            log.push(&format!("n{}", i), "m", NotificationKind::Success);
            assert!(log.len() <= 20);
        }
    }

    #[test]
    fn badge_tracks_unread_and_hides_at_zero() {
        let mut log = filled(3);
        assert_eq!(log.unread_count(), 3);
        assert_eq!(log.badge().as_deref(), Some("3"));

        log.mark_all_read();
        assert_eq!(log.unread_count(), 0);
        assert_eq!(log.badge(), None);

        log.push("new", "m", NotificationKind::Error);
        assert_eq!(log.badge().as_deref(), Some("1"));
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = filled(5);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.badge(), None);
    }
}
