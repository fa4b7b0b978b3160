//! The lock driver: a single-writer actor around [`LockMachine`].
//!
//! Every input (key presses from the windows, authentication events, fired
//! revert timers) arrives through one unbounded channel. The driver applies
//! it to the machine, runs the returned [`Effect`] and publishes a fresh
//! [`LockView`] on a watch channel that the windows read when they redraw.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::auth::{AuthError, AuthEvent, Authenticator, Password, PasswordConversation};
use crate::indicator::Spinner;
use crate::machine::{CloseReason, Effect, KeyPress, LockMachine, LockState, Revert};

/// Input to the driver.
#[derive(Debug)]
pub enum LockEvent {
    /// A key was pressed in one of the lock windows.
    Key(KeyPress),
    /// The running authentication reported something.
    Auth(AuthEvent),
    /// A revert timer fired.
    Revert(Revert),
}

/// Snapshot of what the lock windows should display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LockView {
    /// Current state.
    pub state: LockState,
    /// Info text from the authentication mechanism.
    pub info: Option<String>,
    /// Spinner angle in radians.
    pub spinner_angle: f64,
    /// Set once the lock screen should be torn down.
    pub closing: Option<CloseReason>,
}

/// Cloneable handle given to the presenter.
#[derive(Debug, Clone)]
pub struct LockHandle {
    events: mpsc::UnboundedSender<LockEvent>,
    view: watch::Receiver<LockView>,
}

impl LockHandle {
    /// Forward a key press to the driver.
    pub fn send_key(&self, press: KeyPress) {
        if self.events.send(LockEvent::Key(press)).is_err() {
            debug!("lock driver is gone, dropping key press");
        }
    }

    /// The latest published view.
    #[must_use]
    pub fn view(&self) -> LockView {
        self.view.borrow().clone()
    }

    /// A receiver that can wait for view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LockView> {
        self.view.clone()
    }
}

/// Owns the state machine and runs its effects.
pub struct LockDriver {
    machine: LockMachine,
    spinner: Spinner,
    rng: StdRng,
    authenticator: Arc<dyn Authenticator>,
    user: String,
    events_tx: mpsc::UnboundedSender<LockEvent>,
    events_rx: mpsc::UnboundedReceiver<LockEvent>,
    view_tx: watch::Sender<LockView>,
}

impl std::fmt::Debug for LockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockDriver")
            .field("machine", &self.machine)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl LockDriver {
    /// Create a driver and the handle the presenter uses to talk to it.
    #[must_use]
    pub fn new(
        machine: LockMachine,
        authenticator: Arc<dyn Authenticator>,
        user: impl Into<String>,
    ) -> (Self, LockHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let initial = LockView {
            state: machine.state(),
            ..LockView::default()
        };
        let (view_tx, view_rx) = watch::channel(initial);

        let handle = LockHandle {
            events: events_tx.clone(),
            view: view_rx,
        };
        let driver = Self {
            machine,
            spinner: Spinner::default(),
            rng: StdRng::from_entropy(),
            authenticator,
            user: user.into(),
            events_tx,
            events_rx,
            view_tx,
        };
        (driver, handle)
    }

    /// Process events until the machine closes.
    ///
    /// Must be spawned on a tokio runtime: timers and authentication run as
    /// tasks on it.
    pub async fn run(mut self) -> Option<CloseReason> {
        info!(user = %self.user, "lock driver started");
        while let Some(event) = self.events_rx.recv().await {
            let effect = self.handle(event);
            if let Some(effect) = effect {
                self.apply(effect);
            }
            self.publish();

            if let Some(reason) = self.machine.closed() {
                info!(%reason, "lock driver finished");
                return Some(reason);
            }
        }
        None
    }

    fn handle(&mut self, event: LockEvent) -> Option<Effect> {
        match event {
            LockEvent::Key(press) => {
                let before = self.machine.buffer_len();
                let effect = self.machine.handle_key(press);
                if self.machine.buffer_len() > before {
                    self.spinner.spin(&mut self.rng);
                }
                effect
            }
            LockEvent::Auth(event) => self.machine.handle_auth(event),
            LockEvent::Revert(revert) => {
                self.machine.revert(revert);
                None
            }
        }
    }

    fn apply(&self, effect: Effect) {
        match effect {
            Effect::ScheduleRevert(revert) => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(revert.delay).await;
                    let _ = tx.send(LockEvent::Revert(revert));
                });
            }
            Effect::Authenticate(password) => self.spawn_authentication(password),
            Effect::Close(reason) => debug!(%reason, "closing lock windows"),
        }
    }

    fn spawn_authentication(&self, password: Password) {
        debug!(empty = password.is_empty(), "starting authentication");
        let authenticator = Arc::clone(&self.authenticator);
        let user = self.user.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let info_tx = tx.clone();
            let task = tokio::task::spawn_blocking(move || {
                let conversation = PasswordConversation::new(password, move |message| {
                    let _ = info_tx.send(LockEvent::Auth(AuthEvent::Info(message)));
                });
                authenticator.authenticate(&user, conversation)
            });

            let verdict = match task.await {
                Ok(verdict) => verdict,
                Err(e) => {
                    error!(error = %e, "authentication task panicked");
                    Err(AuthError::Task(e.to_string()))
                }
            };
            let _ = tx.send(LockEvent::Auth(AuthEvent::Verdict(verdict)));
        });
    }

    fn publish(&self) {
        let view = LockView {
            state: self.machine.state(),
            info: self.machine.info().map(str::to_string),
            spinner_angle: self.spinner.angle(),
            closing: self.machine.closed(),
        };
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}
