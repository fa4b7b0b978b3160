//! The lock screen state machine.
//!
//! [`LockMachine`] is a plain value: it consumes key presses, authentication
//! events and revert timers, updates [`LockState`], the password buffer and
//! the info text, and returns at most one [`Effect`] for its owner to run.
//! It never sleeps or spawns anything itself.
//!
//! Delayed reverts to [`LockState::Idle`] carry the generation they were
//! scheduled for. Any newer transition bumps the generation, so a revert
//! that fires late cannot undo a newer state.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::auth::{AuthError, AuthEvent, Password};
use crate::config::Config;

/// What the lock screen is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// Waiting for input.
    #[default]
    Idle,
    /// A character was just typed.
    Typing,
    /// A password is being checked.
    Validating,
    /// The last password was rejected.
    Wrong,
    /// The password was accepted; the screen is closing.
    Success,
    /// The buffer was cleared.
    Clear,
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Typing => write!(f, "typing"),
            Self::Validating => write!(f, "validating"),
            Self::Wrong => write!(f, "wrong"),
            Self::Success => write!(f, "success"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

/// A key, already translated from the toolkit's key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A key producing a character.
    Char(char),
    /// Return or keypad Enter.
    Enter,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Anything else.
    Other,
}

/// A key press with the modifier state we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key.
    pub key: Key,
    /// Whether Control was held.
    pub ctrl: bool,
}

impl KeyPress {
    /// A press without modifiers.
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    /// A press with Control held.
    #[must_use]
    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }
}

/// Why the lock screen is closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The password was accepted.
    Unlocked,
    /// The quit key was pressed.
    Quit,
    /// A window was closed by the toolkit.
    WindowClosed,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlocked => write!(f, "unlocked"),
            Self::Quit => write!(f, "quit"),
            Self::WindowClosed => write!(f, "window closed"),
        }
    }
}

/// A scheduled return to [`LockState::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revert {
    /// Generation the revert was scheduled in.
    pub generation: u64,
    /// How long to wait before applying it.
    pub delay: Duration,
    /// Clear the info text when it fires, even if stale.
    pub clear_info: bool,
}

/// Work the owner of the machine has to carry out.
#[derive(Debug)]
pub enum Effect {
    /// Feed the revert back through [`LockMachine::revert`] after its delay.
    ScheduleRevert(Revert),
    /// Check this password and feed the events back through
    /// [`LockMachine::handle_auth`].
    Authenticate(Password),
    /// Tear down every lock window.
    Close(CloseReason),
}

/// Revert delays and key options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineOptions {
    /// Delay after a typed character.
    pub typing_revert: Duration,
    /// Delay after a rejected password.
    pub wrong_revert: Duration,
    /// Delay after clearing the buffer.
    pub clear_revert: Duration,
    /// Whether `q` closes the lock screen.
    pub quit_key: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for MachineOptions {
    fn from(config: &Config) -> Self {
        Self {
            typing_revert: config.typing_revert(),
            wrong_revert: config.wrong_revert(),
            clear_revert: config.clear_revert(),
            quit_key: config.input.quit_key,
        }
    }
}

/// Characters typed since the last submit or clear.
#[derive(Default)]
pub struct PasswordBuffer {
    text: String,
}

impl PasswordBuffer {
    /// Append a character.
    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Remove the last character. Returns false if the buffer was empty.
    pub fn pop(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Wipe the buffer.
    pub fn clear(&mut self) {
        self.text.zeroize();
    }

    /// Move the contents out as a [`Password`], leaving the buffer empty.
    pub fn take(&mut self) -> Password {
        Password::new(std::mem::take(&mut self.text))
    }

    /// Number of characters in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Drop for PasswordBuffer {
    fn drop(&mut self) {
        self.text.zeroize();
    }
}

impl std::fmt::Debug for PasswordBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordBuffer")
            .field("len", &self.len())
            .finish()
    }
}

/// The lock screen state machine.
#[derive(Debug)]
pub struct LockMachine {
    state: LockState,
    buffer: PasswordBuffer,
    info: Option<String>,
    generation: u64,
    awaiting_auth: bool,
    closed: Option<CloseReason>,
    options: MachineOptions,
}

impl LockMachine {
    /// Create a machine in [`LockState::Idle`].
    #[must_use]
    pub fn new(options: MachineOptions) -> Self {
        Self {
            state: LockState::Idle,
            buffer: PasswordBuffer::default(),
            info: None,
            generation: 0,
            awaiting_auth: false,
            closed: None,
            options,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LockState {
        self.state
    }

    /// Current info text.
    #[must_use]
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Number of buffered characters.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether a password is being checked.
    #[must_use]
    pub fn is_awaiting_auth(&self) -> bool {
        self.awaiting_auth
    }

    /// Why the machine closed, if it has.
    #[must_use]
    pub fn closed(&self) -> Option<CloseReason> {
        self.closed
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, press: KeyPress) -> Option<Effect> {
        if self.closed.is_some() {
            return None;
        }

        match press.key {
            Key::Char('u' | 'U') if press.ctrl => self.clear_buffer(),
            Key::Char('q') if !press.ctrl && self.options.quit_key => {
                info!("quit key pressed");
                Some(self.close(CloseReason::Quit))
            }
            Key::Char(c) if press.ctrl || c.is_control() => None,
            Key::Char(c) => self.insert(c),
            Key::Enter => self.submit(),
            Key::Backspace | Key::Delete => self.delete(),
            Key::Other => None,
        }
    }

    /// Handle an event from the running authentication.
    pub fn handle_auth(&mut self, event: AuthEvent) -> Option<Effect> {
        if self.closed.is_some() {
            return None;
        }

        match event {
            AuthEvent::Info(message) => {
                debug!("authentication info message received");
                self.info = Some(message);
                None
            }
            AuthEvent::Verdict(Ok(())) => {
                self.awaiting_auth = false;
                self.info = None;
                self.state = LockState::Success;
                info!("authentication succeeded");
                Some(self.close(CloseReason::Unlocked))
            }
            AuthEvent::Verdict(Err(err)) => {
                self.awaiting_auth = false;
                self.state = LockState::Wrong;
                log_auth_failure(&err);
                let delay = self.options.wrong_revert;
                Some(self.schedule(delay, true))
            }
        }
    }

    /// Apply a revert that was scheduled earlier. Returns true if the state
    /// went back to idle.
    pub fn revert(&mut self, revert: Revert) -> bool {
        if self.closed.is_some() {
            return false;
        }
        if revert.clear_info {
            self.info = None;
        }
        if revert.generation != self.generation {
            debug!(
                scheduled = revert.generation,
                current = self.generation,
                "ignoring stale revert"
            );
            return false;
        }
        self.state = LockState::Idle;
        true
    }

    fn insert(&mut self, c: char) -> Option<Effect> {
        self.buffer.push(c);
        if self.awaiting_auth {
            // Buffered for the next attempt; keep showing Validating
            return None;
        }
        self.state = LockState::Typing;
        let delay = self.options.typing_revert;
        Some(self.schedule(delay, false))
    }

    fn submit(&mut self) -> Option<Effect> {
        if self.awaiting_auth {
            debug!("submit ignored while a check is running");
            return None;
        }
        self.awaiting_auth = true;
        self.state = LockState::Validating;
        self.generation += 1;
        debug!("submitting password");
        Some(Effect::Authenticate(self.buffer.take()))
    }

    fn delete(&mut self) -> Option<Effect> {
        if self.buffer.pop() {
            return None;
        }
        self.state = LockState::Clear;
        let delay = self.options.clear_revert;
        Some(self.schedule(delay, false))
    }

    fn clear_buffer(&mut self) -> Option<Effect> {
        self.buffer.clear();
        self.state = LockState::Clear;
        let delay = self.options.clear_revert;
        Some(self.schedule(delay, false))
    }

    fn schedule(&mut self, delay: Duration, clear_info: bool) -> Effect {
        self.generation += 1;
        Effect::ScheduleRevert(Revert {
            generation: self.generation,
            delay,
            clear_info,
        })
    }

    fn close(&mut self, reason: CloseReason) -> Effect {
        self.buffer.clear();
        self.closed = Some(reason);
        Effect::Close(reason)
    }
}

fn log_auth_failure(err: &AuthError) {
    match err {
        AuthError::Rejected(_) => info!("authentication rejected"),
        other => warn!(error = %other, "authentication failed"),
    }
}
