//! `frostlock-core` - Platform-independent core of the frostlock screen locker
//!
//! This library holds the lock state machine and the actor that drives it,
//! the screenshot pipeline (output enumeration, capture, blur), indicator
//! layout, configuration and logging. Windowing and credential checks live in
//! the platform crates behind the [`Presenter`] and [`Authenticator`] traits.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod blur;
pub mod capture;
pub mod config;
pub mod driver;
pub mod error;
pub mod indicator;
pub mod logging;
pub mod machine;
pub mod outputs;
pub mod session;

pub use auth::{AuthError, AuthEvent, Authenticator, Password, PasswordConversation, Prompt};
pub use capture::{GrimCapturer, LockImage, ScreenCapturer};
pub use config::Config;
pub use driver::{LockDriver, LockHandle, LockView};
pub use error::{Error, Result};
pub use indicator::IndicatorFrame;
pub use logging::{init_logging, Verbosity};
pub use machine::{CloseReason, Key, KeyPress, LockMachine, LockState, MachineOptions};
pub use outputs::{OutputDescriptor, OutputSource, SwayOutputs};
pub use session::{LockSession, Presenter};
