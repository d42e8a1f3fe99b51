use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters accumulated by the input router.
#[derive(Debug, Default, Clone)]
pub struct RouterMetrics {
    events: u64,
    handled: u64,
    notifications: u64,
    drags: u64,
    resizes: u64,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self, handled: bool) {
        self.events = self.events.saturating_add(1);
        if handled {
            self.handled = self.handled.saturating_add(1);
        }
    }

    pub fn record_notifications(&mut self, count: usize) {
        self.notifications = self.notifications.saturating_add(count as u64);
    }

    pub fn record_drag(&mut self) {
        self.drags = self.drags.saturating_add(1);
    }

    pub fn record_resize(&mut self) {
        self.resizes = self.resizes.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            events: self.events,
            handled: self.handled,
            notifications: self.notifications,
            drags: self.drags,
            resizes: self.resizes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub events: u64,
    pub handled: u64,
    pub notifications: u64,
    pub drags: u64,
    pub resizes: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "router_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("events".to_string(), json!(self.events));
        map.insert("handled".to_string(), json!(self.handled));
        map.insert("notifications".to_string(), json!(self.notifications));
        map.insert("drags".to_string(), json!(self.drags));
        map.insert("resizes".to_string(), json!(self.resizes));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_counters() {
        let mut metrics = RouterMetrics::new();
        metrics.record_event(true);
        metrics.record_event(false);
        metrics.record_notifications(3);
        metrics.record_drag();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events, 2);
        assert_eq!(snapshot.handled, 1);
        assert_eq!(snapshot.notifications, 3);
        assert_eq!(snapshot.drags, 1);
        assert_eq!(snapshot.resizes, 0);

        let event = snapshot.to_log_event("intui::router.metrics");
        assert_eq!(event.message, "router_metrics");
        assert_eq!(event.fields.get("handled"), Some(&json!(1)));
    }
}
