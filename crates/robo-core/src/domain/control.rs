//! Control dialog state machine.
//!
//! When an operator opens the remote-control dialog for a tablet, a
//! [`ControlSession`] tracks what the dialog shows: the control status, the
//! last requested action, and the simulated tablet screen.
//!
//! # State diagram
//!
//! ```text
//!            begin(action)            resolve(true)
//!   Idle ─────────────────► InProgress ─────────────► Succeeded ──settle()──► Idle (dialog closes)
//!    ▲                           │
//!    │                           │ resolve(false)
//!    │                           ▼
//!    └─────────settle()────── Failed   (screen reverted, dialog stays open)
//! ```
//!
//! The screen is updated *optimistically* when an action begins: turning on
//! shows the lit screen immediately, restarting shows the boot animation.  A
//! failed resolution puts the screen back exactly as it was before the action.
//!
//! This type is pure: it owns no timers.  The console's control use case drives
//! it from Tokio tasks and decides *when* each transition fires.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tablet::{Tablet, TabletId};

/// A remote command an operator can issue to a tablet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlAction {
    TurnOn,
    TurnOff,
    Restart,
    /// Re-read the tablet list; does not touch the screen.
    Refresh,
}

impl ControlAction {
    /// Every action, in the order the dialog lays out its buttons.
    pub const ALL: [ControlAction; 4] = [
        ControlAction::TurnOn,
        ControlAction::TurnOff,
        ControlAction::Restart,
        ControlAction::Refresh,
    ];

    /// Wire / CLI token for the action.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlAction::TurnOn => "turnOn",
            ControlAction::TurnOff => "turnOff",
            ControlAction::Restart => "restart",
            ControlAction::Refresh => "refresh",
        }
    }

    /// Parses a wire / CLI token.  Accepts the camelCase tokens and their
    /// kebab-case spellings (`turn-on`).
    pub fn parse(token: &str) -> Option<ControlAction> {
        match token {
            "turnOn" | "turn-on" => Some(ControlAction::TurnOn),
            "turnOff" | "turn-off" => Some(ControlAction::TurnOff),
            "restart" => Some(ControlAction::Restart),
            "refresh" => Some(ControlAction::Refresh),
            _ => None,
        }
    }

    /// The screen the dialog shows while this action is in flight.
    fn optimistic_screen(self, current: ScreenState) -> ScreenState {
        match self {
            ControlAction::TurnOn => ScreenState::On,
            ControlAction::TurnOff => ScreenState::Off,
            ControlAction::Restart => ScreenState::Restarting,
            ControlAction::Refresh => current,
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the control dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlStatus {
    Idle,
    InProgress,
    Succeeded,
    Failed,
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControlStatus::Idle => "idle",
            ControlStatus::InProgress => "in-progress",
            ControlStatus::Succeeded => "succeeded",
            ControlStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What the simulated tablet screen in the dialog displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenState {
    On,
    Off,
    Restarting,
}

impl ScreenState {
    /// Screen shown for a tablet's stored power flag.
    pub fn from_power(is_on: bool) -> Self {
        if is_on {
            ScreenState::On
        } else {
            ScreenState::Off
        }
    }
}

/// What the surface should do with the dialog after the display window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogDisposition {
    /// The action succeeded; the dialog closes and resets.
    Close,
    /// The action failed; the dialog stays open so the operator can retry.
    StayOpen,
}

/// Errors returned when a transition is not allowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    /// Another control action is still outstanding.
    #[error("tablet {0} already has a control action in progress")]
    Busy(TabletId),

    /// The dialog was closed; open a new one to issue further actions.
    #[error("control dialog is closed")]
    Closed,

    /// The event does not apply to the current status.
    #[error("cannot {event} while the dialog is {status}")]
    InvalidTransition {
        event: &'static str,
        status: ControlStatus,
    },
}

/// View-local state of one control dialog.
#[derive(Debug, Clone)]
pub struct ControlSession {
    tablet: Tablet,
    status: ControlStatus,
    last_action: Option<ControlAction>,
    screen: ScreenState,
    /// Screen captured by `begin` so a failure can restore it.
    pre_action_screen: ScreenState,
}

impl ControlSession {
    /// Opens a session for `tablet` in the idle state.
    pub fn new(tablet: Tablet) -> Self {
        let screen = ScreenState::from_power(tablet.is_on);
        Self {
            tablet,
            status: ControlStatus::Idle,
            last_action: None,
            screen,
            pre_action_screen: screen,
        }
    }

    pub fn tablet(&self) -> &Tablet {
        &self.tablet
    }

    pub fn status(&self) -> ControlStatus {
        self.status
    }

    pub fn last_action(&self) -> Option<ControlAction> {
        self.last_action
    }

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    /// `true` while the action buttons may be pressed.
    ///
    /// Buttons are only offered in the idle state; this is what keeps a
    /// dialog from issuing a second action while one is outstanding.
    pub fn controls_enabled(&self) -> bool {
        self.status == ControlStatus::Idle
    }

    /// Starts `action`: status becomes in-progress and the screen switches to
    /// the requested state right away.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidTransition`] unless the dialog is idle.
    pub fn begin(&mut self, action: ControlAction) -> Result<(), ControlError> {
        self.expect(ControlStatus::Idle, "begin an action")?;
        self.pre_action_screen = self.screen;
        self.screen = action.optimistic_screen(self.screen);
        self.last_action = Some(action);
        self.status = ControlStatus::InProgress;
        Ok(())
    }

    /// Applies the device's answer to the in-flight action.
    ///
    /// On success the screen keeps showing the requested state (a restart
    /// keeps showing the boot animation until [`finish_restart`] is called).
    /// On failure the screen is restored to what it was before [`begin`].
    ///
    /// Returns the new status, which is always `Succeeded` or `Failed`.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidTransition`] unless an action is in progress.
    ///
    /// [`finish_restart`]: ControlSession::finish_restart
    /// [`begin`]: ControlSession::begin
    pub fn resolve(&mut self, succeeded: bool) -> Result<ControlStatus, ControlError> {
        self.expect(ControlStatus::InProgress, "resolve an action")?;
        if succeeded {
            self.status = ControlStatus::Succeeded;
        } else {
            self.status = ControlStatus::Failed;
            self.screen = self.pre_action_screen;
        }
        Ok(self.status)
    }

    /// Ends the restart animation after a successful restart.
    ///
    /// Returns `true` if the screen changed.
    pub fn finish_restart(&mut self) -> bool {
        if self.status == ControlStatus::Succeeded && self.screen == ScreenState::Restarting {
            self.screen = ScreenState::On;
            return true;
        }
        false
    }

    /// Returns to idle once the result has been displayed.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidTransition`] unless the action has resolved.
    pub fn settle(&mut self) -> Result<DialogDisposition, ControlError> {
        match self.status {
            ControlStatus::Succeeded => {
                self.reset();
                Ok(DialogDisposition::Close)
            }
            ControlStatus::Failed => {
                self.status = ControlStatus::Idle;
                Ok(DialogDisposition::StayOpen)
            }
            status => Err(ControlError::InvalidTransition {
                event: "settle the dialog",
                status,
            }),
        }
    }

    /// Puts the dialog back to how it looks when first opened.
    pub fn reset(&mut self) {
        self.status = ControlStatus::Idle;
        self.last_action = None;
        self.screen = ScreenState::from_power(self.tablet.is_on);
        self.pre_action_screen = self.screen;
    }

    fn expect(&self, wanted: ControlStatus, event: &'static str) -> Result<(), ControlError> {
        if self.status == wanted {
            Ok(())
        } else {
            Err(ControlError::InvalidTransition {
                event,
                status: self.status,
            })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
