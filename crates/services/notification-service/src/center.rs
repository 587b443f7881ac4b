//! The notification center: owns the ordered list of active notifications
//! and the expiry timer attached to each one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use domain::DEFAULT_NOTIFICATION_TTL_MS;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::context::NotificationContext;
use crate::notification::{Notification, NotificationId, Severity};

/// Default time a notification stays visible.
pub const DEFAULT_TTL: Duration = Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS);

#[derive(Default)]
struct State {
    /// Active notifications in creation order
    active: Vec<Notification>,
    /// Pending expiry timers keyed by notification
    timers: HashMap<NotificationId, JoinHandle<()>>,
}

/// Callback run after expiry leaves a center empty.
pub(crate) type IdleHook = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct Inner {
    ttl: Duration,
    /// Shared by every center of a hub
    next_id: Arc<AtomicU64>,
    state: Mutex<State>,
    updates: watch::Sender<Vec<Notification>>,
    runtime: Handle,
    /// Shared with every live context
    pins: Arc<()>,
    on_idle: Option<IdleHook>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.updates.send_replace(state.active.clone());
    }

    /// Removes an expired notification. Returns `true` when the list is now empty.
    fn expire(&self, id: NotificationId) -> bool {
        let mut state = self.lock();
        state.timers.remove(&id);
        if let Some(pos) = state.active.iter().position(|n| n.id == id) {
            state.active.remove(pos);
            tracing::debug!(notification_id = %id, "Notification expired");
            self.publish(&state);
        }
        state.active.is_empty()
    }

    pub(crate) fn pin(&self) -> Arc<()> {
        Arc::clone(&self.pins)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
    }
}

/// Holds the active notifications of one owner.
///
/// Cloning yields another handle to the same center. Every notification is
/// removed automatically once the center's TTL elapses, unless it is dismissed
/// first. Contexts handed out by [`NotificationCenter::context`] stop working
/// once the last handle is dropped.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    /// Creates a center whose notifications live for `ttl`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(ttl: Duration) -> Self {
        Self::with_handle(ttl, Handle::current())
    }

    /// Creates a center that schedules its expiry timers on `runtime`.
    pub fn with_handle(ttl: Duration, runtime: Handle) -> Self {
        Self::build(ttl, runtime, Arc::new(AtomicU64::new(0)), None)
    }

    /// Creates a center that draws ids from `ids` and runs `on_idle`
    /// whenever expiry empties it.
    pub(crate) fn with_idle_hook(ttl: Duration, ids: Arc<AtomicU64>, on_idle: IdleHook) -> Self {
        Self::build(ttl, Handle::current(), ids, Some(on_idle))
    }

    fn build(
        ttl: Duration,
        runtime: Handle,
        next_id: Arc<AtomicU64>,
        on_idle: Option<IdleHook>,
    ) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                ttl,
                next_id,
                state: Mutex::new(State::default()),
                updates,
                runtime,
                pins: Arc::new(()),
                on_idle,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Appends a notification and schedules its expiry.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };
        let deadline = Instant::now() + self.inner.ttl;

        // The timer is spawned under the lock so it can never observe the
        // list before its own notification has been inserted.
        let mut state = self.inner.lock();
        state.active.push(notification);

        let weak = Arc::downgrade(&self.inner);
        let timer = self.inner.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.expire(id) {
                let hook = inner.on_idle.clone();
                // The hook inspects handle counts, so ours must be gone first.
                drop(inner);
                if let Some(hook) = hook {
                    hook();
                }
            }
        });
        state.timers.insert(id, timer);
        self.inner.publish(&state);

        tracing::debug!(notification_id = %id, severity = %severity, "Notification added");
        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, Severity::Info)
    }

    /// Removes a notification and cancels its timer.
    ///
    /// Returns `false` when the id is unknown or already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut state = self.inner.lock();
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        match state.active.iter().position(|n| n.id == id) {
            Some(pos) => {
                state.active.remove(pos);
                self.inner.publish(&state);
                tracing::debug!(notification_id = %id, "Notification dismissed");
                true
            }
            None => false,
        }
    }

    /// Dismisses every active notification. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.inner.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        let removed = state.active.len();
        state.active.clear();
        if removed > 0 {
            self.inner.publish(&state);
        }
        removed
    }

    /// Active notifications in creation order.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.lock().active.clone()
    }

    /// Receiver that observes every change to the active list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.updates.subscribe()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of expiry timers still scheduled.
    pub fn pending_timers(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Handle for components that emit notifications without owning the center.
    pub fn context(&self) -> NotificationContext {
        NotificationContext::new(Arc::downgrade(&self.inner), self.inner.pin())
    }

    /// Empty, with no other handle or context referring to it.
    pub(crate) fn is_idle(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
            && Arc::strong_count(&self.inner.pins) == 1
            && self.is_empty()
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("NotificationCenter")
            .field("ttl", &self.inner.ttl)
            .field("active", &state.active.len())
            .field("pending_timers", &state.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn messages(center: &NotificationCenter) -> Vec<String> {
        center.snapshot().into_iter().map(|n| n.message).collect()
    }

    /// Lets spawned timer tasks run after the clock moved.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_keep_creation_order() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        let a = center.success("Saved");
        let b = center.error("Failed");

        let snapshot = center.snapshot();
        assert_eq!(snapshot[0].id, a);
        assert_eq!(snapshot[0].severity, Severity::Success);
        assert_eq!(snapshot[1].id, b);
        assert_eq!(snapshot[1].severity, Severity::Error);
        assert_eq!(messages(&center), vec!["Saved", "Failed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_distinct_within_same_instant() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        let ids: HashSet<_> = (0..100).map(|i| center.info(format!("n{i}"))).collect();
        assert_eq!(ids.len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_exactly_at_ttl() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        center.success("Saved");
        center.error("Failed");

        tokio::time::sleep(Duration::from_millis(3999)).await;
        settle().await;
        assert_eq!(center.len(), 2);

        tokio::time::sleep(Duration::from_millis(1)).await;
        settle().await;
        assert!(center.is_empty());
        assert_eq!(center.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_notification_has_its_own_timer() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        center.info("first");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        center.info("second");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        settle().await;
        assert_eq!(messages(&center), vec!["second"]);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        settle().await;
        assert!(center.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_preserves_order_of_rest() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        center.info("a");
        let b = center.info("b");
        center.info("c");

        assert!(center.dismiss(b));
        assert_eq!(messages(&center), vec!["a", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_unknown_id_is_noop() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        center.info("a");

        assert!(!center.dismiss(NotificationId(999)));
        assert_eq!(messages(&center), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_timer() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        let id = center.warning("Careful");
        assert_eq!(center.pending_timers(), 1);

        assert!(center.dismiss(id));
        assert_eq!(center.pending_timers(), 0);

        // A dismissed id stays gone, and a second dismiss is a no-op.
        tokio::time::sleep(Duration::from_millis(5000)).await;
        settle().await;
        assert!(!center.dismiss(id));
        assert!(center.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_then_failed_scenario() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        center.success("Saved");
        tokio::time::sleep(Duration::from_millis(100)).await;
        let failed = center.error("Failed");

        assert_eq!(messages(&center), vec!["Saved", "Failed"]);
        center.dismiss(failed);
        assert_eq!(messages(&center), vec!["Saved"]);

        tokio::time::sleep(Duration::from_millis(3900)).await;
        settle().await;
        assert!(center.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_removes_everything() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        center.info("a");
        center.info("b");

        assert_eq!(center.clear(), 2);
        assert!(center.is_empty());
        assert_eq!(center.pending_timers(), 0);
        assert_eq!(center.clear(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let center = NotificationCenter::new(DEFAULT_TTL);
        let mut rx = center.subscribe();

        let id = center.success("Saved");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        center.dismiss(id);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl() {
        let center = NotificationCenter::new(Duration::from_millis(250));
        center.info("quick");

        tokio::time::sleep(Duration::from_millis(250)).await;
        settle().await;
        assert!(center.is_empty());
    }
}
