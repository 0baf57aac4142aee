use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Loading,
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

/// Transient messages keyed by id. Showing an id that is already on screen
/// replaces it in place instead of stacking a second copy.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn show(&mut self, id: &str, kind: NotificationKind, message: impl Into<String>) {
        self.show_at(id, kind, message, Instant::now());
    }

    pub fn show_at(
        &mut self,
        id: &str,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) {
        let notification = Notification {
            id: id.to_string(),
            kind,
            message: message.into(),
            shown_at: now,
        };
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(existing) => *existing = notification,
            None => self.items.push(notification),
        }
    }

    pub fn dismiss(&mut self, id: &str) -> Option<Notification> {
        let pos = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn active(&self) -> &[Notification] {
        &self.items
    }

    /// Drops expired notifications. Loading ones stay until replaced.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items.retain(|n| {
            n.kind == NotificationKind::Loading || now.saturating_duration_since(n.shown_at) < ttl
        });
    }
}

#[test]
fn test_same_id_replaces_in_place() {
    let mut center = NotificationCenter::new(Duration::from_secs(4));
    center.show("search", NotificationKind::Loading, "working");
    center.show("other", NotificationKind::Info, "hello");
    center.show("search", NotificationKind::Success, "done");

    let active = center.active();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].id, "search");
    assert_eq!(active[0].kind, NotificationKind::Success);
    assert_eq!(active[0].message, "done");
}

#[test]
fn test_expire_keeps_loading() {
    let mut center = NotificationCenter::new(Duration::from_millis(100));
    let start = Instant::now();
    center.show_at("a", NotificationKind::Loading, "spinning", start);
    center.show_at("b", NotificationKind::Error, "boom", start);

    center.expire(start + Duration::from_millis(50));
    assert_eq!(center.active().len(), 2);

    center.expire(start + Duration::from_millis(150));
    assert_eq!(center.active().len(), 1);
    assert_eq!(center.active()[0].id, "a");
    assert!(center.dismiss("a").is_some());
    assert!(center.dismiss("a").is_none());
}
