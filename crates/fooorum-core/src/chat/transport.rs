//! The live chat transport.
//!
//! [`ChatTransport::mount`] starts three tasks sharing one feed:
//!
//! - a one-shot history fetch that seeds the feed,
//! - a supervisor that owns the socket and runs the
//!   `Connecting -> Open -> Reconnecting -> Connecting` loop with a fixed delay,
//! - a pruner that drops messages outside the retention window on a fixed cadence.
//!
//! The supervisor and pruner stop on the transport's [`CancellationToken`].
//! The history fetch is not cancelled; a result arriving after teardown is
//! discarded without touching the feed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fooorum_types::chat::{ChatMessage, ClientFrame, ConnectionState, IncomingMessage};
use fooorum_types::config::ClientConfig;
use fooorum_types::error::{SendRejected, TransportError};

use super::draft::Draft;
use super::events::{ChatEvent, ChatEventBus};
use super::feed::{DEFAULT_RETENTION, MessageFeed};
use super::ports::{ChatConnection, ChatConnector, HistorySource};
use super::seen::SeenCache;
use crate::session::SessionContext;

/// Banner raised when the socket fails (not on a clean close).
pub const CONNECTION_ERROR: &str = "Connection error. Trying to reconnect...";

/// Banner raised when the history seed fails.
pub const HISTORY_ERROR: &str = "Failed to load messages. Please try again later.";

const OUTBOX_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 256;

/// Timing and sizing knobs for a mounted transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub reconnect_delay: Duration,
    pub prune_interval: Duration,
    pub retention: Duration,
    pub seen_capacity: usize,
    pub seen_ttl: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(5),
            prune_interval: Duration::from_secs(60),
            retention: DEFAULT_RETENTION,
            seen_capacity: 10_000,
            seen_ttl: DEFAULT_RETENTION * 2,
        }
    }
}

impl From<&ClientConfig> for TransportSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            reconnect_delay: config.reconnect_delay(),
            prune_interval: config.prune_interval(),
            retention: config.retention(),
            seen_capacity: config.seen_capacity,
            seen_ttl: config.seen_ttl(),
        }
    }
}

/// A frame waiting for the supervisor, with the caller's completion signal.
struct Outgoing {
    frame: String,
    ack: oneshot::Sender<Result<(), TransportError>>,
}

/// Wall-clock time advanced by the runtime's monotonic clock.
///
/// Receipt stamps and prune cutoffs are read from here, so they follow
/// `tokio::time` (including a paused test clock).
#[derive(Debug, Clone, Copy)]
struct Clock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl Clock {
    fn start() -> Self {
        Self {
            origin: Utc::now(),
            started: Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or(chrono::Duration::zero());
        self.origin + elapsed
    }
}

/// State shared between the handle and its background tasks.
struct Shared {
    clock: Clock,
    feed: RwLock<MessageFeed>,
    error: RwLock<Option<String>>,
    state: watch::Sender<ConnectionState>,
    events: ChatEventBus,
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(state = %next, "chat connection state changed");
            self.events.publish(ChatEvent::StateChanged(next));
        }
    }

    async fn raise_error(&self, message: &str) {
        *self.error.write().await = Some(message.to_string());
        self.events.publish(ChatEvent::Error(message.to_string()));
    }

    async fn clear_error(&self) {
        *self.error.write().await = None;
    }

    /// Parse and merge one inbound socket frame. Malformed frames are dropped.
    async fn accept_frame(&self, raw: &str) {
        let incoming: IncomingMessage = match serde_json::from_str(raw) {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!(error = %e, "discarding malformed chat frame");
                return;
            }
        };

        let accepted = self.feed.write().await.merge(incoming, self.clock.now());
        match accepted {
            Some(message) => {
                debug!(id = %message.id, author = %message.author, "chat message accepted");
                self.events.publish(ChatEvent::MessageAccepted(message));
            }
            None => debug!("duplicate chat message ignored"),
        }
    }
}

/// Handle on a mounted chat view.
///
/// Dropping the handle cancels the background tasks; [`teardown`](Self::teardown)
/// additionally waits for the socket to be closed.
pub struct ChatTransport {
    shared: Arc<Shared>,
    session: SessionContext,
    outbox: mpsc::Sender<Outgoing>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ChatTransport {
    /// Start the history fetch, the connection supervisor and the pruner.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount<C, H>(
        connector: C,
        history: H,
        session: SessionContext,
        settings: TransportSettings,
    ) -> Self
    where
        C: ChatConnector,
        H: HistorySource,
    {
        let seen = SeenCache::new(settings.seen_capacity, settings.seen_ttl);
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let shared = Arc::new(Shared {
            clock: Clock::start(),
            feed: RwLock::new(MessageFeed::new(settings.retention, seen)),
            error: RwLock::new(None),
            state,
            events: ChatEventBus::new(EVENT_CAPACITY),
        });
        let cancel = CancellationToken::new();
        let (outbox, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);

        // Not tracked in `tasks`: an in-flight fetch outlives teardown.
        tokio::spawn(load_history(
            history,
            session.bearer_header(),
            Arc::clone(&shared),
            cancel.clone(),
        ));

        let supervisor = tokio::spawn(supervise(
            connector,
            Arc::clone(&shared),
            session.clone(),
            outbox_rx,
            settings.reconnect_delay,
            cancel.clone(),
        ));
        let pruner = tokio::spawn(prune_periodically(
            Arc::clone(&shared),
            settings.prune_interval,
            cancel.clone(),
        ));

        info!(
            reconnect_delay_secs = settings.reconnect_delay.as_secs(),
            prune_interval_secs = settings.prune_interval.as_secs(),
            "chat transport mounted"
        );

        Self {
            shared,
            session,
            outbox,
            cancel,
            tasks: vec![supervisor, pruner],
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.shared.events.subscribe()
    }

    /// Snapshot of the feed, newest first.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.shared.feed.read().await.messages().to_vec()
    }

    /// The current user-visible error banner, if any.
    pub async fn error(&self) -> Option<String> {
        self.shared.error.read().await.clone()
    }

    pub async fn dismiss_error(&self) {
        self.shared.clear_error().await;
    }

    /// Whether `message` was written by the signed-in user.
    pub fn is_own(&self, message: &ChatMessage) -> bool {
        self.session
            .current_user()
            .is_some_and(|user| message.is_authored_by(&user.username))
    }

    /// Run one prune pass immediately. Returns the number of messages removed.
    pub async fn prune_now(&self) -> usize {
        prune_once(&self.shared).await
    }

    /// Send `text` as one frame with the current bearer token.
    ///
    /// Rejected locally, with no network call, when the text is blank, when
    /// signed out, or when the socket is not open. The text is sent as typed.
    pub async fn send(&self, text: &str) -> Result<(), SendRejected> {
        if text.trim().is_empty() {
            return Err(SendRejected::EmptyMessage);
        }
        let Some(token) = self.session.token() else {
            return Err(SendRejected::Unauthenticated);
        };
        if self.state() != ConnectionState::Open {
            return Err(SendRejected::NotReady);
        }

        let frame = ClientFrame::message(text, token)
            .to_json()
            .map_err(|e| {
                warn!(error = %e, "failed to encode chat frame");
                SendRejected::NotReady
            })?;

        let (ack, ack_rx) = oneshot::channel();
        self.outbox
            .send(Outgoing { frame, ack })
            .await
            .map_err(|_| SendRejected::NotReady)?;

        match ack_rx.await {
            Ok(Ok(())) => {
                self.shared.clear_error().await;
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(error = %e, "chat send failed");
                Err(SendRejected::NotReady)
            }
            Err(_) => Err(SendRejected::NotReady),
        }
    }

    /// Send the draft's text, clearing the draft only if the send succeeds.
    pub async fn submit(&self, draft: &mut Draft) -> Result<(), SendRejected> {
        self.send(draft.text()).await?;
        draft.clear();
        Ok(())
    }

    /// Close the socket, stop the pruner and wait for both to finish.
    ///
    /// No reconnect is scheduled after this returns.
    pub async fn teardown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!(error = %e, "chat task ended abnormally");
            }
        }
        info!("chat transport torn down");
    }
}

impl Drop for ChatTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn load_history<H: HistorySource>(
    history: H,
    bearer: Option<String>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let result = history.fetch_recent(bearer).await;

    // Hold the feed lock across the check so teardown cannot slip in between.
    let mut feed = shared.feed.write().await;
    if cancel.is_cancelled() {
        debug!("history arrived after teardown, discarding");
        return;
    }

    match result {
        Ok(batch) => {
            let fetched = batch.len();
            let accepted = feed.merge_batch(batch, shared.clock.now());
            drop(feed);
            info!(fetched, accepted, "chat history loaded");
            shared.clear_error().await;
            shared.events.publish(ChatEvent::HistoryLoaded { accepted });
        }
        Err(e) => {
            drop(feed);
            warn!(error = %e, "failed to load chat history");
            shared.raise_error(HISTORY_ERROR).await;
        }
    }
}

/// The reconnect loop. Exits only on cancellation.
async fn supervise<C: ChatConnector>(
    connector: C,
    shared: Arc<Shared>,
    session: SessionContext,
    mut outbox: mpsc::Receiver<Outgoing>,
    reconnect_delay: Duration,
    cancel: CancellationToken,
) {
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        shared.set_state(ConnectionState::Connecting);
        debug!(attempt, "connecting chat socket");

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = connector.connect() => result,
        };

        let outcome = match connected {
            Ok(mut connection) => {
                // Sends queued while the socket was down belong to no connection.
                fail_pending(&mut outbox);
                shared.set_state(ConnectionState::Open);
                info!(attempt, "chat socket open");
                let outcome =
                    run_connection(&mut connection, &shared, &session, &mut outbox, &cancel).await;
                if !cancel.is_cancelled() {
                    shared.set_state(ConnectionState::Reconnecting);
                }
                connection.close().await;
                outcome
            }
            Err(e) => Err(e),
        };

        fail_pending(&mut outbox);

        if cancel.is_cancelled() {
            break;
        }

        shared.set_state(ConnectionState::Reconnecting);
        match outcome {
            Ok(()) => info!("chat socket closed by peer"),
            Err(e) => {
                warn!(error = %e, "chat socket failed");
                shared.raise_error(CONNECTION_ERROR).await;
            }
        }

        info!(delay_secs = reconnect_delay.as_secs(), "scheduling reconnect");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }

    debug!("chat supervisor stopped");
}

/// Pump one open connection until the peer closes it, it fails, or we are cancelled.
async fn run_connection<T: ChatConnection>(
    connection: &mut T,
    shared: &Shared,
    session: &SessionContext,
    outbox: &mut mpsc::Receiver<Outgoing>,
    cancel: &CancellationToken,
) -> Result<(), TransportError> {
    if let Some(token) = session.token() {
        let frame = ClientFrame::auth(token)
            .to_json()
            .map_err(|e| TransportError::Send(e.to_string()))?;
        connection.send_text(frame).await?;
        debug!("auth frame sent");
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            inbound = connection.next_text() => match inbound {
                None => return Ok(()),
                Some(Err(e)) => return Err(e),
                Some(Ok(raw)) => shared.accept_frame(&raw).await,
            },
            Some(outgoing) = outbox.recv() => {
                let result = connection.send_text(outgoing.frame).await;
                let failure = result.as_ref().err().cloned();
                let _ = outgoing.ack.send(result);
                if let Some(e) = failure {
                    return Err(e);
                }
            }
        }
    }
}

/// Reject every send queued while the connection was going down.
fn fail_pending(outbox: &mut mpsc::Receiver<Outgoing>) {
    while let Ok(outgoing) = outbox.try_recv() {
        let _ = outgoing.ack.send(Err(TransportError::Closed));
    }
}

async fn prune_periodically(shared: Arc<Shared>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                prune_once(&shared).await;
            }
        }
    }

    debug!("chat pruner stopped");
}

async fn prune_once(shared: &Shared) -> usize {
    let removed = shared.feed.write().await.prune(shared.clock.now());
    if removed > 0 {
        debug!(removed, "pruned stale chat messages");
        shared.events.publish(ChatEvent::Pruned { removed });
    }
    removed
}
