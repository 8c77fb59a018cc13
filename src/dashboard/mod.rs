// Dashboard module - orchestrates views, fetches and the live channel
//
// The dashboard is owned by a single event loop (TUI or headless). It never
// blocks on the network: fetches run on spawned tasks and report back as
// `DashboardEvent::Fetched`, and the live channel's dispatch table feeds
// `DashboardEvent::Reload` into the same queue, as do connection state
// changes. The loop hands each event to `Dashboard::handle`, which is the only
// place controller state changes.
//
// A page counts as current only while the live channel is connected: pushes
// sent during an outage are lost, so every disconnect invalidates all pages
// and every (re)connect reloads the active one.

pub mod controller;
pub mod filters;
pub mod view;

use crate::live::{
    ConnectionState, DispatchTable, LiveChannelManager, LiveConfig, LiveHandle, NotificationKind,
};
use crate::models::{Greeting, Message, Stats, User, UserDetail};
use crate::session::SessionGate;
use crate::transport::{decode, ApiRequest, SharedTransport, TransportError};
use controller::{ReloadOutcome, SequenceGuard, ViewController};
use filters::FilterKey;
use serde_json::Value;
use tokio::sync::mpsc;
pub use view::ViewKind;

/// Queue depth between background tasks and the dashboard
const EVENT_BUFFER: usize = 1000;

/// Work delivered to the dashboard's event loop
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A notification asked for this view to be reloaded
    Reload(ViewKind),
    /// A fetch finished
    Fetched(FetchOutcome),
    /// The live channel changed state
    Connection(ConnectionState),
}

/// What a fetch was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    View(ViewKind),
    Stats,
    UserDetail(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub target: FetchTarget,
    pub seq: u64,
    pub result: Result<Value, TransportError>,
}

/// Visible effect of handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A reload was issued
    Reloading(ViewKind),
    /// A view's page was replaced
    Applied { view: ViewKind, rows: usize },
    StatsLoaded,
    DetailLoaded(i64),
    /// Live channel state as now seen by the dashboard
    Connection(ConnectionState),
    /// The latest fetch for `target` failed
    Failed {
        target: FetchTarget,
        error: TransportError,
    },
    /// Stale response, or the session is over
    Ignored,
}

pub struct Dashboard {
    transport: SharedTransport,
    users: ViewController<User>,
    greetings: ViewController<Greeting>,
    messages: ViewController<Message>,
    active: ViewKind,
    stats: Option<Stats>,
    stats_guard: SequenceGuard,
    detail: Option<UserDetail>,
    detail_guard: SequenceGuard,
    events_tx: mpsc::Sender<DashboardEvent>,
    live: Option<LiveHandle>,
    /// False once logged out; every later event is dropped
    session_active: bool,
    /// Last connection event was `Connected`
    live_connected: bool,
    last_error: Option<String>,
}

impl Dashboard {
    /// Create a dashboard and the receiver its event loop must drain
    pub fn new(
        transport: SharedTransport,
        page_size: Option<u32>,
    ) -> (Self, mpsc::Receiver<DashboardEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let dashboard = Self {
            transport,
            users: ViewController::new(ViewKind::Users, page_size),
            greetings: ViewController::new(ViewKind::Greetings, page_size),
            messages: ViewController::new(ViewKind::Messages, page_size),
            active: ViewKind::default(),
            stats: None,
            stats_guard: SequenceGuard::default(),
            detail: None,
            detail_guard: SequenceGuard::default(),
            events_tx,
            live: None,
            session_active: true,
            live_connected: false,
            last_error: None,
        };
        (dashboard, events_rx)
    }

    /// Notification kind -> reload of the matching view
    ///
    /// Handlers run on the live channel task, so they only enqueue a
    /// `Reload` event. A full queue drops the request (delivery is
    /// best-effort; the next notification or manual refresh catches up).
    pub fn dispatch_table(&self) -> DispatchTable {
        let mut table = DispatchTable::new();
        for kind in NotificationKind::ALL {
            let view = ViewKind::for_notification(kind);
            let tx = self.events_tx.clone();
            table.register(kind.as_str(), move |_| {
                if let Err(e) = tx.try_send(DashboardEvent::Reload(view)) {
                    tracing::warn!("Dropping {} reload request: {}", view.title(), e);
                }
            });
        }
        table
    }

    /// Spawn the live channel with this dashboard's dispatch table
    pub fn start_live(&mut self, config: LiveConfig) {
        let manager = LiveChannelManager::new(config, self.dispatch_table())
            .with_credentials(self.transport.clone());
        let live = manager.spawn();

        // Forward state changes into the event queue; ends with the manager
        let mut state_rx = live.subscribe();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            while state_rx.changed().await.is_ok() {
                let state = *state_rx.borrow_and_update();
                if tx.send(DashboardEvent::Connection(state)).await.is_err() {
                    break;
                }
            }
        });

        self.live = Some(live);
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.live
            .as_ref()
            .map(LiveHandle::state)
            .unwrap_or_default()
    }

    pub fn is_session_active(&self) -> bool {
        self.session_active
    }

    pub fn active(&self) -> ViewKind {
        self.active
    }

    pub fn users(&self) -> &ViewController<User> {
        &self.users
    }

    pub fn greetings(&self) -> &ViewController<Greeting> {
        &self.greetings
    }

    pub fn messages(&self) -> &ViewController<Message> {
        &self.messages
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn detail(&self) -> Option<&UserDetail> {
        self.detail.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Rows on the view's current page
    pub fn row_count(&self, view: ViewKind) -> usize {
        match view {
            ViewKind::Users => self.users.page().len(),
            ViewKind::Greetings => self.greetings.page().len(),
            ViewKind::Messages => self.messages.page().len(),
        }
    }

    pub fn filter_value(&self, view: ViewKind, key: FilterKey) -> Option<&str> {
        match view {
            ViewKind::Users => self.users.filters().get(key),
            ViewKind::Greetings => self.greetings.filters().get(key),
            ViewKind::Messages => self.messages.filters().get(key),
        }
    }

    pub fn is_loading(&self, view: ViewKind) -> bool {
        match view {
            ViewKind::Users => self.users.is_loading(),
            ViewKind::Greetings => self.greetings.is_loading(),
            ViewKind::Messages => self.messages.is_loading(),
        }
    }

    /// The view's latest reload failed and it still shows an older page
    pub fn is_stale(&self, view: ViewKind) -> bool {
        match view {
            ViewKind::Users => self.users.last_error().is_some(),
            ViewKind::Greetings => self.greetings.last_error().is_some(),
            ViewKind::Messages => self.messages.last_error().is_some(),
        }
    }

    fn is_fresh(&self, view: ViewKind) -> bool {
        match view {
            ViewKind::Users => self.users.is_fresh(),
            ViewKind::Greetings => self.greetings.is_fresh(),
            ViewKind::Messages => self.messages.is_fresh(),
        }
    }

    pub fn offset(&self, view: ViewKind) -> u32 {
        match view {
            ViewKind::Users => self.users.offset(),
            ViewKind::Greetings => self.greetings.offset(),
            ViewKind::Messages => self.messages.offset(),
        }
    }

    /// Show `view`, loading it unless it is already current
    ///
    /// Without a connected live channel nothing is current, so every
    /// activation fetches.
    pub fn activate(&mut self, view: ViewKind) {
        self.active = view;
        let current = self.live_connected && self.is_fresh(view);
        if !current && !self.is_loading(view) {
            self.reload(view);
        }
    }

    /// Change one filter of `view` and reload it
    pub fn set_filter(&mut self, view: ViewKind, key: FilterKey, value: impl Into<String>) {
        let changed = match view {
            ViewKind::Users => self.users.set_filter(key, value),
            ViewKind::Greetings => self.greetings.set_filter(key, value),
            ViewKind::Messages => self.messages.set_filter(key, value),
        };
        if changed {
            self.reload(view);
        }
    }

    pub fn clear_filters(&mut self, view: ViewKind) {
        let changed = match view {
            ViewKind::Users => self.users.clear_filters(),
            ViewKind::Greetings => self.greetings.clear_filters(),
            ViewKind::Messages => self.messages.clear_filters(),
        };
        if changed {
            self.reload(view);
        }
    }

    pub fn next_page(&mut self, view: ViewKind) {
        let moved = match view {
            ViewKind::Users => self.users.next_page(),
            ViewKind::Greetings => self.greetings.next_page(),
            ViewKind::Messages => self.messages.next_page(),
        };
        if moved {
            self.reload(view);
        }
    }

    pub fn prev_page(&mut self, view: ViewKind) {
        let moved = match view {
            ViewKind::Users => self.users.prev_page(),
            ViewKind::Greetings => self.greetings.prev_page(),
            ViewKind::Messages => self.messages.prev_page(),
        };
        if moved {
            self.reload(view);
        }
    }

    /// Issue a reload of `view` with its current filters
    pub fn reload(&mut self, view: ViewKind) {
        if !self.session_active {
            return;
        }
        let ticket = match view {
            ViewKind::Users => self.users.begin_reload(),
            ViewKind::Greetings => self.greetings.begin_reload(),
            ViewKind::Messages => self.messages.begin_reload(),
        };
        tracing::debug!("Reloading {} #{} ({})", view.title(), ticket.seq, ticket.request.target());
        self.spawn_fetch(FetchTarget::View(view), ticket.seq, ticket.request);
    }

    /// Reload the active view and the stats summary
    pub fn refresh(&mut self) {
        self.reload(self.active);
        self.refresh_stats();
    }

    pub fn refresh_stats(&mut self) {
        if !self.session_active {
            return;
        }
        let seq = self.stats_guard.issue();
        self.spawn_fetch(FetchTarget::Stats, seq, ApiRequest::get("/api/stats"));
    }

    /// Load one user with their recent greetings and messages
    pub fn open_user_detail(&mut self, tg_user_id: i64) {
        if !self.session_active {
            return;
        }
        self.detail = None;
        let seq = self.detail_guard.issue();
        self.spawn_fetch(
            FetchTarget::UserDetail(tg_user_id),
            seq,
            ApiRequest::get(format!("/api/users/{}", tg_user_id)),
        );
    }

    pub fn close_user_detail(&mut self) {
        // A newer, already settled sequence makes any in-flight detail stale
        let seq = self.detail_guard.issue();
        self.detail_guard.settle(seq);
        self.detail = None;
    }

    fn spawn_fetch(&self, target: FetchTarget, seq: u64, request: ApiRequest) {
        let transport = self.transport.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = transport.call(request).await;
            let outcome = FetchOutcome {
                target,
                seq,
                result,
            };
            if tx.send(DashboardEvent::Fetched(outcome)).await.is_err() {
                tracing::debug!("Dashboard gone; dropping {:?} result", target);
            }
        });
    }

    /// Apply one event from the queue
    pub fn handle(&mut self, event: DashboardEvent) -> Update {
        if !self.is_session_active() {
            tracing::debug!("Session ended; ignoring {:?}", event);
            return Update::Ignored;
        }
        match event {
            DashboardEvent::Reload(view) => {
                self.reload(view);
                Update::Reloading(view)
            }
            DashboardEvent::Fetched(outcome) => self.apply(outcome),
            DashboardEvent::Connection(state) => self.on_connection(state),
        }
    }

    fn on_connection(&mut self, state: ConnectionState) -> Update {
        // Whatever was loaded before this event may have missed pushes
        self.users.invalidate();
        self.greetings.invalidate();
        self.messages.invalidate();

        self.live_connected = state == ConnectionState::Connected;
        if self.live_connected {
            tracing::debug!("Live channel connected; catching up {}", self.active.title());
            self.reload(self.active);
        }
        Update::Connection(state)
    }

    fn apply(&mut self, outcome: FetchOutcome) -> Update {
        let FetchOutcome {
            target,
            seq,
            result,
        } = outcome;

        match target {
            FetchTarget::View(view) => {
                let outcome = match view {
                    ViewKind::Users => self.users.complete(seq, result),
                    ViewKind::Greetings => self.greetings.complete(seq, result),
                    ViewKind::Messages => self.messages.complete(seq, result),
                };
                match outcome {
                    ReloadOutcome::Applied(rows) => Update::Applied { view, rows },
                    ReloadOutcome::Stale => {
                        tracing::debug!("Discarding stale {} response #{}", view.title(), seq);
                        Update::Ignored
                    }
                    ReloadOutcome::Failed(error) => self.fail(target, error),
                }
            }
            FetchTarget::Stats => {
                if !self.stats_guard.settle(seq) {
                    return Update::Ignored;
                }
                match result.and_then(decode::<Stats>) {
                    Ok(stats) => {
                        self.stats = Some(stats);
                        Update::StatsLoaded
                    }
                    Err(error) => self.fail(target, error),
                }
            }
            FetchTarget::UserDetail(tg_user_id) => {
                if !self.detail_guard.settle(seq) {
                    return Update::Ignored;
                }
                match result.and_then(decode::<UserDetail>) {
                    Ok(detail) => {
                        self.detail = Some(detail);
                        Update::DetailLoaded(tg_user_id)
                    }
                    Err(error) => self.fail(target, error),
                }
            }
        }
    }

    fn fail(&mut self, target: FetchTarget, error: TransportError) -> Update {
        let what = match target {
            FetchTarget::View(view) => view.title().to_lowercase(),
            FetchTarget::Stats => "stats".to_string(),
            FetchTarget::UserDetail(id) => format!("user {}", id),
        };
        tracing::error!("Failed to load {}: {}", what, error);
        self.last_error = Some(format!("Failed to load {}", what));
        Update::Failed { target, error }
    }

    /// Stop the live channel and drop every later event
    pub async fn shutdown(&mut self) {
        self.session_active = false;
        if let Some(live) = self.live.take() {
            live.shutdown().await;
        }
    }

    /// Tear down, then end the server session
    pub async fn logout(&mut self, gate: &SessionGate) -> Result<(), TransportError> {
        self.shutdown().await;
        gate.logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{BackoffPolicy, Notification};
    use crate::transport::mock::MockTransport;
    use futures::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message as Frame;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (Arc<MockTransport>, Dashboard, mpsc::Receiver<DashboardEvent>) {
        let mock = Arc::new(MockTransport::new());
        let (dashboard, rx) = Dashboard::new(mock.clone(), None);
        (mock, dashboard, rx)
    }

    async fn next_event(rx: &mut mpsc::Receiver<DashboardEvent>) -> DashboardEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for dashboard event")
            .expect("event channel closed")
    }

    /// Receive one event and hand it to the dashboard
    async fn pump(dashboard: &mut Dashboard, rx: &mut mpsc::Receiver<DashboardEvent>) -> Update {
        let event = next_event(rx).await;
        dashboard.handle(event)
    }

    fn greetings(texts: &[&str]) -> Value {
        let items: Vec<Value> = texts
            .iter()
            .map(|t| json!({"sent_at": "2025-01-01T00:00:00", "tg_user_id": 5, "greeting_text": t}))
            .collect();
        json!({ "items": items })
    }

    fn user(id: i64) -> Value {
        json!({
            "tg_user_id": id,
            "first_name": "Ann",
            "last_name": null,
            "username": "ann",
            "first_seen_at": "2025-01-01T00:00:00",
            "last_seen_at": "2025-01-02T00:00:00",
            "greetings_count": 2
        })
    }

    #[tokio::test]
    async fn test_each_kind_requests_exactly_its_view() {
        let (_mock, dashboard, mut rx) = setup();
        let table = dashboard.dispatch_table();
        assert_eq!(
            table.kinds(),
            vec!["greeting_sent", "message_received", "user_upserted"]
        );

        for (kind, view) in [
            ("user_upserted", ViewKind::Users),
            ("greeting_sent", ViewKind::Greetings),
            ("message_received", ViewKind::Messages),
        ] {
            let frame = format!(r#"{{"type":"{}"}}"#, kind);
            assert!(table.dispatch(&Notification::decode(&frame).unwrap()));
            assert_eq!(rx.try_recv().unwrap(), DashboardEvent::Reload(view));
            assert!(rx.try_recv().is_err(), "{} triggered more than one reload", kind);
        }

        let unknown = Notification::decode(r#"{"type":"bot_restarted"}"#).unwrap();
        assert!(!table.dispatch(&unknown));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notification_reload_fetches_only_target_endpoint() {
        let (mock, mut dashboard, mut rx) = setup();
        let table = dashboard.dispatch_table();

        table.dispatch(&Notification::decode(r#"{"type":"user_upserted"}"#).unwrap());
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Reloading(ViewKind::Users)
        );
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Users,
                rows: 0
            }
        );

        assert_eq!(mock.count("/api/users"), 1);
        assert_eq!(mock.count("/api/greetings"), 0);
        assert_eq!(mock.count("/api/messages"), 0);
    }

    #[tokio::test]
    async fn test_latest_issued_reload_wins_over_late_response() {
        let (mock, mut dashboard, mut rx) = setup();
        let release_a = mock.gate("/api/greetings?tg_user_id=1");
        let release_b = mock.gate("/api/greetings?tg_user_id=12");

        dashboard.set_filter(ViewKind::Greetings, FilterKey::UserId, "1");
        dashboard.set_filter(ViewKind::Greetings, FilterKey::UserId, "12");

        release_b.send(Ok(greetings(&["B"]))).unwrap();
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Greetings,
                rows: 1
            }
        );

        release_a.send(Ok(greetings(&["A", "A"]))).unwrap();
        assert_eq!(pump(&mut dashboard, &mut rx).await, Update::Ignored);

        let page = dashboard.greetings().page();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].greeting_text, "B");
        assert!(!dashboard.is_loading(ViewKind::Greetings));
    }

    #[tokio::test]
    async fn test_filter_changes_drive_query() {
        let (mock, mut dashboard, mut rx) = setup();

        dashboard.set_filter(ViewKind::Messages, FilterKey::UserId, "123");
        pump(&mut dashboard, &mut rx).await;
        dashboard.set_filter(ViewKind::Messages, FilterKey::UserId, "");
        pump(&mut dashboard, &mut rx).await;

        assert_eq!(
            mock.targets(),
            vec!["/api/messages?tg_user_id=123", "/api/messages"]
        );

        // Setting the same value again is not a change
        dashboard.set_filter(ViewKind::Messages, FilterKey::UserId, "");
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_inactive_view_updates_from_push_and_switch_does_not_refetch() {
        let (mock, mut dashboard, mut rx) = setup();
        mock.reply("/api/users", json!({ "items": [user(5)] }));
        mock.reply("/api/greetings", greetings(&["Happy New Year!"]));

        // Channel opens: the active view catches up
        assert_eq!(
            dashboard.handle(DashboardEvent::Connection(ConnectionState::Connected)),
            Update::Connection(ConnectionState::Connected)
        );
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Users,
                rows: 1
            }
        );

        let table = dashboard.dispatch_table();
        table.dispatch(&Notification::decode(r#"{"type":"greeting_sent","user_id":5}"#).unwrap());
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Reloading(ViewKind::Greetings)
        );
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Greetings,
                rows: 1
            }
        );
        assert_eq!(dashboard.active(), ViewKind::Users);

        dashboard.activate(ViewKind::Greetings);
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(mock.count("/api/greetings"), 1);
        assert_eq!(
            dashboard.greetings().page()[0].greeting_text,
            "Happy New Year!"
        );
    }

    #[tokio::test]
    async fn test_disconnect_makes_switching_refetch() {
        let (mock, mut dashboard, mut rx) = setup();
        mock.reply("/api/greetings", greetings(&["old"]));

        dashboard.handle(DashboardEvent::Connection(ConnectionState::Connected));
        pump(&mut dashboard, &mut rx).await;
        dashboard.activate(ViewKind::Greetings);
        pump(&mut dashboard, &mut rx).await;

        // Still connected: switching back and forth is free
        dashboard.activate(ViewKind::Users);
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        // Pushes sent during the outage never arrive
        assert_eq!(
            dashboard.handle(DashboardEvent::Connection(ConnectionState::Disconnected)),
            Update::Connection(ConnectionState::Disconnected)
        );
        mock.reply("/api/greetings", greetings(&["new"]));

        dashboard.activate(ViewKind::Greetings);
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Greetings,
                rows: 1
            }
        );
        assert_eq!(mock.count("/api/greetings"), 2);
        assert_eq!(dashboard.greetings().page()[0].greeting_text, "new");
    }

    #[tokio::test]
    async fn test_reconnect_reloads_active_view() {
        let (mock, mut dashboard, mut rx) = setup();
        dashboard.handle(DashboardEvent::Connection(ConnectionState::Connected));
        pump(&mut dashboard, &mut rx).await;

        dashboard.handle(DashboardEvent::Connection(ConnectionState::Disconnected));
        dashboard.handle(DashboardEvent::Connection(ConnectionState::Connecting));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        dashboard.handle(DashboardEvent::Connection(ConnectionState::Connected));
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Users,
                rows: 0
            }
        );
        assert_eq!(mock.count("/api/users"), 2);
    }

    #[tokio::test]
    async fn test_switching_refetches_without_live_channel() {
        let (mock, mut dashboard, mut rx) = setup();
        mock.reply("/api/greetings", greetings(&["old"]));
        dashboard.activate(ViewKind::Greetings);
        pump(&mut dashboard, &mut rx).await;
        dashboard.activate(ViewKind::Users);
        pump(&mut dashboard, &mut rx).await;

        mock.reply("/api/greetings", greetings(&["new"]));
        dashboard.activate(ViewKind::Greetings);
        pump(&mut dashboard, &mut rx).await;

        assert_eq!(dashboard.connection_state(), ConnectionState::Disconnected);
        assert_eq!(mock.count("/api/greetings"), 2);
        assert_eq!(dashboard.greetings().page()[0].greeting_text, "new");
    }

    #[tokio::test]
    async fn test_push_over_live_channel_updates_inactive_view() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let (push_tx, push_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            push_rx.await.unwrap();
            ws.send(Frame::text(r#"{"type":"greeting_sent","user_id":5}"#))
                .await
                .unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (mock, mut dashboard, mut rx) = setup();
        mock.reply("/api/greetings", greetings(&["Happy New Year!"]));
        dashboard.start_live(LiveConfig {
            url,
            backoff: BackoffPolicy {
                step: Duration::from_millis(10),
                cap: Duration::from_millis(50),
            },
            connect_timeout: Duration::from_secs(2),
        });

        // connecting -> connected, then the active view catches up
        while pump(&mut dashboard, &mut rx).await
            != Update::Connection(ConnectionState::Connected)
        {}
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Users,
                rows: 0
            }
        );

        push_tx.send(()).unwrap();
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Reloading(ViewKind::Greetings)
        );
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Applied {
                view: ViewKind::Greetings,
                rows: 1
            }
        );
        assert_eq!(dashboard.active(), ViewKind::Users);

        dashboard.activate(ViewKind::Greetings);
        tokio::task::yield_now().await;
        assert_eq!(mock.count("/api/greetings"), 1);
        assert_eq!(
            dashboard.greetings().page()[0].greeting_text,
            "Happy New Year!"
        );

        dashboard.shutdown().await;
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_page_and_reports() {
        let (mock, mut dashboard, mut rx) = setup();
        mock.reply("/api/users", json!({ "items": [user(1), user(2)] }));
        dashboard.reload(ViewKind::Users);
        pump(&mut dashboard, &mut rx).await;

        let err = TransportError::Status {
            status: 503,
            body: String::new(),
        };
        mock.fail("/api/users", err.clone());
        dashboard.reload(ViewKind::Users);
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::Failed {
                target: FetchTarget::View(ViewKind::Users),
                error: err
            }
        );

        assert_eq!(dashboard.users().page().len(), 2);
        assert!(dashboard.is_stale(ViewKind::Users));
        assert_eq!(dashboard.last_error(), Some("Failed to load users"));
        // No automatic retry
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(mock.count("/api/users"), 2);
    }

    #[tokio::test]
    async fn test_stale_stats_are_ignored() {
        let (_mock, mut dashboard, _rx) = setup();
        dashboard.refresh_stats();
        dashboard.refresh_stats();

        let stats = |users: u64| {
            json!({"total_users": users, "total_greetings": 0, "total_messages": 0, "top_users": []})
        };
        let old = FetchOutcome {
            target: FetchTarget::Stats,
            seq: 1,
            result: Ok(stats(1)),
        };
        let new = FetchOutcome {
            target: FetchTarget::Stats,
            seq: 2,
            result: Ok(stats(2)),
        };

        assert_eq!(
            dashboard.handle(DashboardEvent::Fetched(new)),
            Update::StatsLoaded
        );
        assert_eq!(
            dashboard.handle(DashboardEvent::Fetched(old)),
            Update::Ignored
        );
        assert_eq!(dashboard.stats().map(|s| s.total_users), Some(2));
    }

    #[tokio::test]
    async fn test_user_detail_loads_and_close_discards_late_result() {
        let (mock, mut dashboard, mut rx) = setup();
        mock.reply(
            "/api/users/5",
            json!({"user": user(5), "greetings": [], "messages": []}),
        );

        dashboard.open_user_detail(5);
        assert_eq!(
            pump(&mut dashboard, &mut rx).await,
            Update::DetailLoaded(5)
        );
        assert_eq!(dashboard.detail().map(|d| d.user.tg_user_id), Some(5));

        dashboard.open_user_detail(5);
        dashboard.close_user_detail();
        assert_eq!(pump(&mut dashboard, &mut rx).await, Update::Ignored);
        assert!(dashboard.detail().is_none());
    }

    #[tokio::test]
    async fn test_logout_stops_channel_and_drops_late_events() {
        let (mock, mut dashboard, mut rx) = setup();
        dashboard.start_live(LiveConfig {
            url: "ws://127.0.0.1:1/ws".to_string(),
            backoff: BackoffPolicy::default(),
            connect_timeout: Duration::from_secs(1),
        });
        let table = dashboard.dispatch_table();

        // A fetch in flight and a queued push-driven reload when logout happens
        let release = mock.gate("/api/users");
        dashboard.reload(ViewKind::Users);
        table.dispatch(&Notification::decode(r#"{"type":"message_received"}"#).unwrap());

        let gate = SessionGate::new(mock.clone());
        dashboard.logout(&gate).await.unwrap();
        assert!(!dashboard.is_session_active());
        assert_eq!(dashboard.connection_state(), ConnectionState::Disconnected);

        assert_eq!(pump(&mut dashboard, &mut rx).await, Update::Ignored);
        release.send(Ok(json!({ "items": [user(1)] }))).unwrap();
        assert_eq!(pump(&mut dashboard, &mut rx).await, Update::Ignored);

        assert!(dashboard.users().page().is_empty());
        assert_eq!(mock.count("/api/messages"), 0);
        assert_eq!(mock.count("/api/auth/logout"), 1);

        // Nothing can be issued after logout
        dashboard.reload(ViewKind::Greetings);
        tokio::task::yield_now().await;
        assert_eq!(mock.count("/api/greetings"), 0);
    }
}
