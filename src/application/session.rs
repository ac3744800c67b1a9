//! Per-client cart sessions.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, MutexGuard, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::application::cart_store::CartStore;
use crate::application::confirmation::ScheduledReset;

/// What the cart panel is currently showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub open: bool,
    pub confirmation_shown: bool,
}

/// One client's cart plus the panel state around it.
///
/// A pending confirmation reset belongs to the session and is cancelled
/// when the session ends or is dropped.
#[derive(Debug)]
pub struct CartSession {
    store: CartStore,
    panel: Arc<watch::Sender<PanelState>>,
    reset: Mutex<Option<ScheduledReset>>,
    checkout: tokio::sync::Mutex<()>,
    last_seen: Mutex<Instant>,
}

impl CartSession {
    pub fn new(currency: &str) -> Self {
        let (panel, _) = watch::channel(PanelState::default());
        Self {
            store: CartStore::new(currency),
            panel: Arc::new(panel),
            reset: Mutex::new(None),
            checkout: tokio::sync::Mutex::new(()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Held for the whole of a checkout; `None` while another one runs.
    pub fn try_begin_checkout(&self) -> Option<MutexGuard<'_, ()>> { self.checkout.try_lock().ok() }

    pub fn idle_for(&self) -> Duration { self.last_seen.lock().unwrap_or_else(PoisonError::into_inner).elapsed() }

    fn touch(&self) { *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now(); }

    pub fn store(&self) -> &CartStore { &self.store }
    pub fn panel(&self) -> PanelState { *self.panel.borrow() }
    pub fn subscribe_panel(&self) -> watch::Receiver<PanelState> { self.panel.subscribe() }

    pub fn toggle_panel(&self) -> PanelState {
        self.panel.send_modify(|p| p.open = !p.open);
        self.panel()
    }

    pub fn show_confirmation(&self) {
        self.panel.send_modify(|p| p.confirmation_shown = true);
    }

    /// After `delay`, hides the confirmation and closes the panel. Replaces
    /// (and so cancels) any reset that is still pending.
    pub fn schedule_reset(&self, delay: Duration) {
        let panel = Arc::clone(&self.panel);
        let reset = ScheduledReset::spawn(delay, move || {
            panel.send_modify(|p| *p = PanelState { open: false, confirmation_shown: false });
        });
        *self.reset.lock().unwrap_or_else(PoisonError::into_inner) = Some(reset);
    }

    pub fn has_pending_reset(&self) -> bool {
        self.reset.lock().unwrap_or_else(PoisonError::into_inner).as_ref().is_some_and(|r| !r.is_finished())
    }

    pub fn cancel_pending_reset(&self) {
        self.reset.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Live sessions keyed by client session id.
///
/// Sessions only come into being through [`SessionRegistry::create`]; an
/// unknown id never allocates one.
#[derive(Debug)]
pub struct SessionRegistry {
    currency: String,
    sessions: RwLock<HashMap<String, Arc<CartSession>>>,
}

impl SessionRegistry {
    pub fn new(currency: &str) -> Self {
        Self { currency: currency.to_string(), sessions: RwLock::new(HashMap::new()) }
    }

    pub async fn create(&self) -> (String, Arc<CartSession>) {
        let id = Uuid::now_v7().to_string();
        let session = Arc::new(CartSession::new(&self.currency));
        self.sessions.write().await.insert(id.clone(), Arc::clone(&session));
        debug!(session = %id, "Cart session created");
        (id, session)
    }

    /// Live session with `id`; marks it as used.
    pub async fn get(&self, id: &str) -> Option<Arc<CartSession>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Removes the session and cancels its pending reset.
    pub async fn end(&self, id: &str) -> bool {
        let Some(session) = self.sessions.write().await.remove(id) else { return false };
        session.cancel_pending_reset();
        true
    }

    /// Drops sessions unused for longer than `max_idle`, cancelling their
    /// pending resets. Returns how many went.
    pub async fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.idle_for() <= max_idle;
            if !keep {
                session.cancel_pending_reset();
                debug!(session = %id, "Cart session expired");
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize { self.sessions.read().await.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::sample;

    #[tokio::test(start_paused = true)]
    async fn test_reset_hides_confirmation_and_closes_panel() {
        let session = CartSession::new("USD");
        session.toggle_panel();
        session.show_confirmation();
        session.schedule_reset(Duration::from_secs(2));
        assert_eq!(session.panel(), PanelState { open: true, confirmation_shown: true });
        assert!(session.has_pending_reset());
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(session.panel(), PanelState::default());
        assert!(!session.has_pending_reset());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ending_session_cancels_reset() {
        let registry = SessionRegistry::new("USD");
        let (id, session) = registry.create().await;
        session.show_confirmation();
        session.schedule_reset(Duration::from_secs(2));
        assert!(registry.end(&id).await);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(session.panel().confirmation_shown);
        assert!(!registry.end(&id).await);
    }

    #[tokio::test]
    async fn test_registry_reuses_sessions() {
        let registry = SessionRegistry::new("USD");
        let (id, a) = registry.create().await;
        a.store().add_item(&sample(1, "p", 1)).unwrap();
        let b = registry.get(&id).await.unwrap();
        assert_eq!(b.store().items().len(), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_does_not_allocate() {
        let registry = SessionRegistry::new("USD");
        registry.create().await;
        for id in ["missing", "other", "missing"] {
            assert!(registry.get(id).await.is_none());
        }
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let registry = SessionRegistry::new("USD");
        let (stale, session) = registry.create().await;
        session.show_confirmation();
        session.schedule_reset(Duration::from_secs(120));
        let (fresh, _) = registry.create().await;
        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(registry.get(&fresh).await.is_some());
        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(registry.expire_idle(Duration::from_secs(60)).await, 1);
        assert!(registry.get(&stale).await.is_none());
        assert!(registry.get(&fresh).await.is_some());
        assert!(!session.has_pending_reset());
    }

    #[tokio::test]
    async fn test_one_checkout_at_a_time() {
        let session = CartSession::new("USD");
        let guard = session.try_begin_checkout();
        assert!(guard.is_some());
        assert!(session.try_begin_checkout().is_none());
        drop(guard);
        assert!(session.try_begin_checkout().is_some());
    }

    #[test]
    fn test_toggle_panel() {
        let session = CartSession::new("USD");
        assert!(session.toggle_panel().open);
        assert!(!session.toggle_panel().open);
    }
}
