//! Linux-specific implementation for frostlock
//!
//! This crate provides the GTK4 layer-shell [`GtkPresenter`], the PAM-backed
//! [`PamAuthenticator`] and current-user lookup.

#![cfg(target_os = "linux")]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod draw;
pub mod keys;
pub mod pam;
pub mod presenter;

use frostlock_core::{Error, Result};
use nix::unistd::{Uid, User};

pub use pam::PamAuthenticator;
pub use presenter::GtkPresenter;

/// Check that we are running inside a Wayland session.
///
/// # Errors
///
/// Returns [`Error::Platform`] if `WAYLAND_DISPLAY` is not set.
pub fn init() -> Result<()> {
    if std::env::var_os("WAYLAND_DISPLAY").is_none() {
        return Err(Error::platform(
            "WAYLAND_DISPLAY is not set; frostlock needs a Wayland session",
        ));
    }
    Ok(())
}

/// Get platform name
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

/// Login name of the user running the process.
///
/// # Errors
///
/// Returns [`Error::Platform`] if the user database has no entry for the
/// current uid.
pub fn current_username() -> Result<String> {
    let uid = Uid::current();
    match User::from_uid(uid) {
        Ok(Some(user)) => Ok(user.name),
        Ok(None) => Err(Error::platform(format!("no passwd entry for uid {uid}"))),
        Err(e) => Err(Error::platform(format!("failed to look up uid {uid}: {e}"))),
    }
}
