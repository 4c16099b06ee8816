//! ControlDeviceUseCase: issues control actions from a control dialog.
//!
//! A [`ControlDialog`] wraps the pure [`ControlSession`] state machine from
//! `robo-core` and supplies the timing around it:
//!
//! ```text
//! execute(action)
//!   │  status = in-progress, screen switches optimistically
//!   ▼
//! DeviceLink::send ──────────── (simulated latency, 1.5 s by default)
//!   │  status = succeeded / failed, control lock released
//!   ├─ restart succeeded:  screen "restarting" → "on" after 0.5 s
//!   ├─ refresh succeeded:  StatusRefresher::refresh()
//!   ▼
//! display window ────────────── (2 s after resolution)
//!   │  succeeded → dialog resets and closes
//!   │  failed    → status idle, dialog stays open
//!   ▼
//! done
//! ```
//!
//! # Cancellation
//!
//! Every dialog owns a [`CancellationToken`].  Each wait above races against
//! it, so closing or dropping the dialog discards whatever transition was
//! still pending.  An action cancelled before the device answered never
//! reaches succeeded or failed.
//!
//! # One action at a time
//!
//! All dialogs opened from the same use case share a [`ControlLock`].  It is
//! held from `execute` until the action resolves, so a second action on any
//! tablet is rejected with [`ControlError::Busy`] while one is in flight.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use robo_core::{
    ControlAction, ControlError, ControlSession, ControlStatus, DialogDisposition, ScreenState,
    Tablet, TabletId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::control_history::{ControlHistory, ControlHistoryEntry};
use super::ports::{DeviceLink, StatusRefresher};

/// Control history shared between dialogs and the command bridge.
pub type SharedHistory = Arc<Mutex<ControlHistory>>;

/// Waits applied after the device has answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTimings {
    /// How long the restart animation runs after a successful restart.
    pub restart_settle: Duration,
    /// How long the result stays on screen before the dialog settles.
    pub dismiss_after: Duration,
}

impl Default for ControlTimings {
    fn default() -> Self {
        Self {
            restart_settle: Duration::from_millis(500),
            dismiss_after: Duration::from_millis(2000),
        }
    }
}

// ── Control lock ──────────────────────────────────────────────────────────────

/// Allows at most one in-flight control action across all dialogs.
#[derive(Debug, Clone, Default)]
pub struct ControlLock {
    holder: Arc<StdMutex<Option<TabletId>>>,
}

impl ControlLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the lock for `tablet_id`.
    ///
    /// # Errors
    ///
    /// [`ControlError::Busy`] naming the tablet that currently holds it.
    pub fn try_acquire(&self, tablet_id: &str) -> Result<ControlPermit, ControlError> {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(busy) = holder.as_ref() {
            return Err(ControlError::Busy(busy.clone()));
        }
        *holder = Some(tablet_id.to_string());
        Ok(ControlPermit { lock: self.clone() })
    }

    /// Tablet whose action is currently in flight, if any.
    pub fn holder(&self) -> Option<TabletId> {
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn release(&self) {
        *self.holder.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Held while an action is in flight; releases the lock on drop.
#[derive(Debug)]
pub struct ControlPermit {
    lock: ControlLock,
}

impl Drop for ControlPermit {
    fn drop(&mut self) {
        self.lock.release();
    }
}

// ── Snapshots and outcomes ────────────────────────────────────────────────────

/// What a dialog currently shows.  Published on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    pub tablet_id: TabletId,
    pub table_number: String,
    pub status: ControlStatus,
    pub last_action: Option<ControlAction>,
    pub screen: ScreenState,
    pub controls_enabled: bool,
    /// `false` once the dialog has closed (manually or after a success).
    pub open: bool,
}

impl ControlSnapshot {
    fn capture(state: &DialogState) -> Self {
        let session = &state.session;
        Self {
            tablet_id: session.tablet().id.clone(),
            table_number: session.tablet().table_number.clone(),
            status: session.status(),
            last_action: session.last_action(),
            screen: session.screen(),
            controls_enabled: state.open && session.controls_enabled(),
            open: state.open,
        }
    }
}

/// How an executed action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlOutcome {
    Succeeded,
    Failed,
    /// The dialog closed before the device answered.
    Cancelled,
}

/// Handle to an action running in the background.
#[derive(Debug)]
pub struct PendingControl {
    handle: JoinHandle<ControlOutcome>,
}

impl PendingControl {
    /// Waits for the action, including its display window, to finish.
    pub async fn outcome(self) -> ControlOutcome {
        self.handle.await.unwrap_or(ControlOutcome::Cancelled)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Opens control dialogs that share one device link, lock and history.
#[derive(Clone)]
pub struct ControlDeviceUseCase {
    link: Arc<dyn DeviceLink>,
    lock: ControlLock,
    history: SharedHistory,
    timings: ControlTimings,
}

impl ControlDeviceUseCase {
    pub fn new(link: Arc<dyn DeviceLink>, timings: ControlTimings, history_limit: usize) -> Self {
        Self {
            link,
            lock: ControlLock::new(),
            history: Arc::new(Mutex::new(ControlHistory::with_limit(history_limit))),
            timings,
        }
    }

    /// Opens an idle dialog for `tablet`.
    ///
    /// `actor` is recorded in the control history.  A successful refresh
    /// action reloads nothing; see [`Self::open_with_refresher`].
    pub fn open(&self, tablet: Tablet, actor: Option<String>) -> ControlDialog {
        self.open_dialog(tablet, actor, None)
    }

    /// Like [`Self::open`], but a successful refresh action reloads
    /// `refresher`, normally the tablet list the dialog was opened from.
    pub fn open_with_refresher(
        &self,
        tablet: Tablet,
        actor: Option<String>,
        refresher: Arc<dyn StatusRefresher>,
    ) -> ControlDialog {
        self.open_dialog(tablet, actor, Some(refresher))
    }

    fn open_dialog(
        &self,
        tablet: Tablet,
        actor: Option<String>,
        refresher: Option<Arc<dyn StatusRefresher>>,
    ) -> ControlDialog {
        let state = DialogState {
            session: ControlSession::new(tablet.clone()),
            open: true,
        };
        let (updates, _) = watch::channel(ControlSnapshot::capture(&state));
        debug!("control dialog opened for tablet {}", tablet.id);

        ControlDialog {
            tablet,
            cancel: CancellationToken::new(),
            shared: Arc::new(DialogShared {
                state: Mutex::new(state),
                updates,
                link: Arc::clone(&self.link),
                refresher,
                lock: self.lock.clone(),
                history: Arc::clone(&self.history),
                timings: self.timings,
                actor,
            }),
        }
    }

    pub fn history(&self) -> SharedHistory {
        Arc::clone(&self.history)
    }

    pub fn lock(&self) -> &ControlLock {
        &self.lock
    }
}

struct DialogState {
    session: ControlSession,
    open: bool,
}

struct DialogShared {
    state: Mutex<DialogState>,
    updates: watch::Sender<ControlSnapshot>,
    link: Arc<dyn DeviceLink>,
    refresher: Option<Arc<dyn StatusRefresher>>,
    lock: ControlLock,
    history: SharedHistory,
    timings: ControlTimings,
    actor: Option<String>,
}

impl DialogShared {
    fn publish(&self, state: &DialogState) {
        self.updates.send_replace(ControlSnapshot::capture(state));
    }
}

/// The control dialog for one tablet.
///
/// Dropping the dialog has the same effect as [`ControlDialog::close`].
pub struct ControlDialog {
    tablet: Tablet,
    cancel: CancellationToken,
    shared: Arc<DialogShared>,
}

impl ControlDialog {
    pub fn tablet(&self) -> &Tablet {
        &self.tablet
    }

    /// Current dialog contents.
    pub fn snapshot(&self) -> ControlSnapshot {
        self.shared.updates.borrow().clone()
    }

    /// Receives every change to the dialog contents.
    pub fn subscribe(&self) -> watch::Receiver<ControlSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn controls_enabled(&self) -> bool {
        self.snapshot().controls_enabled
    }

    pub fn is_open(&self) -> bool {
        self.snapshot().open
    }

    /// Starts `action` and returns immediately with the status in progress.
    ///
    /// # Errors
    ///
    /// - [`ControlError::Closed`] if the dialog has closed.
    /// - [`ControlError::Busy`] if any action is still in flight.
    /// - [`ControlError::InvalidTransition`] while this dialog is still
    ///   showing the previous result.
    pub async fn execute(&self, action: ControlAction) -> Result<PendingControl, ControlError> {
        let mut state = self.shared.state.lock().await;
        if !state.open || self.cancel.is_cancelled() {
            return Err(ControlError::Closed);
        }
        let permit = self.shared.lock.try_acquire(&self.tablet.id)?;
        state.session.begin(action)?;
        self.shared.publish(&state);
        drop(state);

        info!("tablet {}: {} requested", self.tablet.id, action);
        let handle = tokio::spawn(run_action(
            Arc::clone(&self.shared),
            self.cancel.clone(),
            self.tablet.clone(),
            action,
            permit,
        ));
        Ok(PendingControl { handle })
    }

    /// Closes the dialog, discarding any pending transition.
    ///
    /// The dialog resets to idle with the screen matching the tablet's power
    /// state.  Closing twice is harmless.
    pub async fn close(&self) {
        self.cancel.cancel();
        let mut state = self.shared.state.lock().await;
        state.session.reset();
        state.open = false;
        self.shared.publish(&state);
        debug!("control dialog closed for tablet {}", self.tablet.id);
    }
}

impl Drop for ControlDialog {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Ok(mut state) = self.shared.state.try_lock() {
            state.session.reset();
            state.open = false;
            self.shared.publish(&state);
        }
    }
}

/// Drives one action from the device round-trip to the end of the display
/// window.  Returns early whenever the dialog's token is cancelled.
async fn run_action(
    shared: Arc<DialogShared>,
    cancel: CancellationToken,
    tablet: Tablet,
    action: ControlAction,
    permit: ControlPermit,
) -> ControlOutcome {
    let acknowledged = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("tablet {}: {} cancelled before the device answered", tablet.id, action);
            return ControlOutcome::Cancelled;
        }
        ack = shared.link.send(&tablet, action) => ack,
    };

    let status = {
        let mut state = shared.state.lock().await;
        // close() cancels before taking the lock, so this sees it.
        if cancel.is_cancelled() {
            return ControlOutcome::Cancelled;
        }
        let status = match state.session.resolve(acknowledged) {
            Ok(status) => status,
            Err(e) => {
                warn!("tablet {}: cannot resolve {}: {e}", tablet.id, action);
                return ControlOutcome::Cancelled;
            }
        };
        shared.publish(&state);
        status
    };
    drop(permit);
    let resolved_at = Instant::now();

    let outcome = if acknowledged {
        info!("tablet {}: {} succeeded", tablet.id, action);
        ControlOutcome::Succeeded
    } else {
        warn!("tablet {}: {} failed", tablet.id, action);
        ControlOutcome::Failed
    };

    shared.history.lock().await.record(ControlHistoryEntry {
        at: Utc::now(),
        tablet_id: tablet.id.clone(),
        table_number: tablet.table_number.clone(),
        action,
        outcome: status,
        actor: shared.actor.clone(),
    });

    if acknowledged {
        match action {
            ControlAction::Restart => {
                tokio::select! {
                    _ = cancel.cancelled() => return outcome,
                    _ = sleep(shared.timings.restart_settle) => {}
                }
                let mut state = shared.state.lock().await;
                if cancel.is_cancelled() {
                    return outcome;
                }
                if state.session.finish_restart() {
                    shared.publish(&state);
                }
            }
            ControlAction::Refresh => {
                if let Some(refresher) = shared.refresher.as_ref() {
                    tokio::select! {
                        _ = cancel.cancelled() => return outcome,
                        _ = refresher.refresh() => {}
                    }
                }
            }
            ControlAction::TurnOn | ControlAction::TurnOff => {}
        }
    }

    tokio::select! {
        _ = cancel.cancelled() => return outcome,
        _ = sleep_until(resolved_at + shared.timings.dismiss_after) => {}
    }

    let mut state = shared.state.lock().await;
    if cancel.is_cancelled() {
        return outcome;
    }
    match state.session.settle() {
        Ok(DialogDisposition::Close) => state.open = false,
        Ok(DialogDisposition::StayOpen) => {}
        Err(e) => warn!("tablet {}: cannot settle dialog: {e}", tablet.id),
    }
    shared.publish(&state);
    outcome
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LATENCY: Duration = Duration::from_millis(1500);

    /// Answers every action with the same acknowledgment after `LATENCY`.
    struct FixedLink {
        ack: bool,
    }

    #[async_trait]
    impl DeviceLink for FixedLink {
        async fn send(&self, _tablet: &Tablet, _action: ControlAction) -> bool {
            sleep(LATENCY).await;
            self.ack
        }
    }

    #[derive(Default)]
    struct CountingRefresher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusRefresher for CountingRefresher {
        async fn refresh(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn make_tablet(id: &str, is_on: bool) -> Tablet {
        Tablet {
            id: id.to_string(),
            mac_address: String::new(),
            table_number: "Table 01".to_string(),
            wifi_strength: "75%".to_string(),
            battery_level: "85%".to_string(),
            version: "v1.2.3".to_string(),
            ip_address: "192.168.1.100".to_string(),
            firmware_build: "FW-2024.11.28".to_string(),
            is_on,
            store_id: None,
        }
    }

    fn use_case(ack: bool) -> ControlDeviceUseCase {
        ControlDeviceUseCase::new(Arc::new(FixedLink { ack }), ControlTimings::default(), 50)
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_sets_in_progress_immediately() {
        // Arrange
        let dialog = use_case(true).open(make_tablet("t1", false), None);

        // Act
        let _pending = dialog.execute(ControlAction::TurnOn).await.unwrap();

        // Assert
        let snap = dialog.snapshot();
        assert_eq!(snap.status, ControlStatus::InProgress);
        assert_eq!(snap.screen, ScreenState::On, "screen switches optimistically");
        assert_eq!(snap.last_action, Some(ControlAction::TurnOn));
        assert!(!dialog.controls_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resolves_after_latency_then_closes() {
        // Arrange
        let dialog = use_case(true).open(make_tablet("t1", true), None);
        let pending = dialog.execute(ControlAction::TurnOff).await.unwrap();

        // Act / Assert: still in progress just before the latency elapses
        sleep(LATENCY - Duration::from_millis(1)).await;
        assert_eq!(dialog.snapshot().status, ControlStatus::InProgress);

        sleep(Duration::from_millis(2)).await;
        let snap = dialog.snapshot();
        assert_eq!(snap.status, ControlStatus::Succeeded);
        assert_eq!(snap.screen, ScreenState::Off);
        assert!(snap.open);

        assert_eq!(pending.outcome().await, ControlOutcome::Succeeded);
        let snap = dialog.snapshot();
        assert_eq!(snap.status, ControlStatus::Idle);
        assert!(!snap.open, "a successful action closes the dialog");
        assert!(snap.last_action.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_restores_screen_and_keeps_dialog_open() {
        // Arrange
        let dialog = use_case(false).open(make_tablet("t1", true), None);
        let pending = dialog.execute(ControlAction::TurnOff).await.unwrap();
        assert_eq!(dialog.snapshot().screen, ScreenState::Off);

        // Act
        sleep(LATENCY + Duration::from_millis(1)).await;

        // Assert: failed, screen back to the pre-action state
        let snap = dialog.snapshot();
        assert_eq!(snap.status, ControlStatus::Failed);
        assert_eq!(snap.screen, ScreenState::On);

        assert_eq!(pending.outcome().await, ControlOutcome::Failed);
        let snap = dialog.snapshot();
        assert_eq!(snap.status, ControlStatus::Idle);
        assert!(snap.open, "a failed action leaves the dialog open for a retry");
        assert!(dialog.controls_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_is_shown_for_the_display_window() {
        let dialog = use_case(false).open(make_tablet("t1", true), None);
        let _pending = dialog.execute(ControlAction::Restart).await.unwrap();

        // Resolution at 1.5 s, settle at 3.5 s.
        sleep(Duration::from_millis(3400)).await;
        assert_eq!(dialog.snapshot().status, ControlStatus::Failed);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(dialog.snapshot().status, ControlStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_shows_restarting_then_on() {
        // Arrange
        let dialog = use_case(true).open(make_tablet("t1", false), None);
        let _pending = dialog.execute(ControlAction::Restart).await.unwrap();
        assert_eq!(dialog.snapshot().screen, ScreenState::Restarting);

        // Act / Assert
        sleep(LATENCY + Duration::from_millis(100)).await;
        assert_eq!(dialog.snapshot().status, ControlStatus::Succeeded);
        assert_eq!(dialog.snapshot().screen, ScreenState::Restarting);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(dialog.snapshot().screen, ScreenState::On);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_success_reloads_status() {
        // Arrange
        let refresher = Arc::new(CountingRefresher::default());
        let dialog = use_case(true).open_with_refresher(
            make_tablet("t1", true),
            None,
            refresher.clone(),
        );

        // Act
        let pending = dialog.execute(ControlAction::Refresh).await.unwrap();
        let outcome = pending.outcome().await;

        // Assert
        assert_eq!(outcome, ControlOutcome::Succeeded);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_does_not_reload() {
        let refresher = Arc::new(CountingRefresher::default());
        let dialog = use_case(false).open_with_refresher(
            make_tablet("t1", true),
            None,
            refresher.clone(),
        );

        let outcome = dialog
            .execute(ControlAction::Refresh)
            .await
            .unwrap()
            .outcome()
            .await;

        assert_eq!(outcome, ControlOutcome::Failed);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_before_resolution_discards_the_action() {
        // Arrange
        let control = use_case(true);
        let dialog = control.open(make_tablet("t1", false), None);
        let pending = dialog.execute(ControlAction::TurnOn).await.unwrap();

        // Act
        sleep(Duration::from_millis(500)).await;
        dialog.close().await;

        // Assert
        assert_eq!(pending.outcome().await, ControlOutcome::Cancelled);
        sleep(Duration::from_secs(10)).await;
        let snap = dialog.snapshot();
        assert_eq!(snap.status, ControlStatus::Idle);
        assert_eq!(snap.screen, ScreenState::Off);
        assert!(!snap.open);
        assert!(control.lock().holder().is_none(), "lock released on cancel");
        assert!(control.history().lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_during_display_window_skips_settle() {
        let dialog = use_case(false).open(make_tablet("t1", true), None);
        let pending = dialog.execute(ControlAction::TurnOff).await.unwrap();

        sleep(LATENCY + Duration::from_millis(10)).await;
        dialog.close().await;

        // Resolved before the close, so the outcome stands.
        assert_eq!(pending.outcome().await, ControlOutcome::Failed);
        assert!(!dialog.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_dialog_cancels_and_releases_lock() {
        // Arrange
        let control = use_case(true);
        let dialog = control.open(make_tablet("t1", false), None);
        let pending = dialog.execute(ControlAction::TurnOn).await.unwrap();
        assert_eq!(control.lock().holder().as_deref(), Some("t1"));

        // Act
        drop(dialog);

        // Assert
        assert_eq!(pending.outcome().await, ControlOutcome::Cancelled);
        assert!(control.lock().holder().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_action_anywhere_is_rejected_while_in_flight() {
        // Arrange
        let control = use_case(true);
        let first = control.open(make_tablet("t1", true), None);
        let second = control.open(make_tablet("t2", true), None);
        let pending = first.execute(ControlAction::Restart).await.unwrap();

        // Act
        let same = first.execute(ControlAction::TurnOff).await;
        let other = second.execute(ControlAction::TurnOff).await;

        // Assert
        assert_eq!(same.unwrap_err(), ControlError::Busy("t1".to_string()));
        assert_eq!(other.unwrap_err(), ControlError::Busy("t1".to_string()));
        assert_eq!(second.snapshot().status, ControlStatus::Idle);

        // Once resolved, other tablets may be controlled again.
        sleep(LATENCY + Duration::from_millis(1)).await;
        assert!(second.execute(ControlAction::TurnOff).await.is_ok());
        pending.outcome().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_during_display_window_is_invalid() {
        let dialog = use_case(false).open(make_tablet("t1", true), None);
        let _pending = dialog.execute(ControlAction::TurnOff).await.unwrap();
        sleep(LATENCY + Duration::from_millis(1)).await;

        let result = dialog.execute(ControlAction::TurnOff).await;

        assert!(matches!(
            result,
            Err(ControlError::InvalidTransition {
                status: ControlStatus::Failed,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_on_closed_dialog_is_rejected() {
        let dialog = use_case(true).open(make_tablet("t1", true), None);
        dialog.close().await;

        let result = dialog.execute(ControlAction::TurnOff).await;

        assert_eq!(result.unwrap_err(), ControlError::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolved_actions_are_recorded_in_history() {
        // Arrange
        let control = use_case(false);
        let dialog = control.open(make_tablet("t1", true), Some("operator-1".to_string()));

        // Act
        dialog
            .execute(ControlAction::TurnOff)
            .await
            .unwrap()
            .outcome()
            .await;

        // Assert
        let history = control.history();
        let entries = history.lock().await.recent(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tablet_id, "t1");
        assert_eq!(entries[0].action, ControlAction::TurnOff);
        assert_eq!(entries[0].outcome, ControlStatus::Failed);
        assert_eq!(entries[0].actor.as_deref(), Some("operator-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_each_transition() {
        // Arrange
        let dialog = use_case(true).open(make_tablet("t1", false), None);
        let mut rx = dialog.subscribe();

        // Act
        let pending = dialog.execute(ControlAction::TurnOn).await.unwrap();

        // Assert
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, ControlStatus::InProgress);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, ControlStatus::Succeeded);
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().open);
        assert_eq!(pending.outcome().await, ControlOutcome::Succeeded);
    }

    #[test]
    fn test_control_lock_releases_on_permit_drop() {
        let lock = ControlLock::new();
        let permit = lock.try_acquire("t1").unwrap();
        assert!(lock.try_acquire("t2").is_err());
        drop(permit);
        assert!(lock.try_acquire("t2").is_ok());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let state = DialogState {
            session: ControlSession::new(make_tablet("t1", true)),
            open: true,
        };
        let json = serde_json::to_value(ControlSnapshot::capture(&state)).unwrap();
        assert_eq!(json["tabletId"], "t1");
        assert_eq!(json["controlsEnabled"], true);
        assert_eq!(json["screen"], "on");
    }
}
