//! Lock session orchestration.
//!
//! A session enumerates outputs, captures and blurs each one, checks that the
//! toolkit sees exactly as many monitors as there are images, then hands the
//! images and a [`LockHandle`] to a [`Presenter`] while the [`LockDriver`]
//! runs on a background tokio runtime. Any failure before presenting aborts
//! the whole session.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::Authenticator;
use crate::capture::{prepare_lock_images, remove_lock_images, LockImage, ScreenCapturer};
use crate::config::Config;
use crate::driver::{LockDriver, LockHandle};
use crate::error::{Error, Result};
use crate::machine::{CloseReason, LockMachine, MachineOptions};
use crate::outputs::{OutputDescriptor, OutputSource};

/// Trait for the toolkit that shows the lock windows.
pub trait Presenter {
    /// Number of monitors the toolkit can place windows on.
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be queried.
    fn monitor_count(&self) -> Result<usize>;

    /// Show one window per image, in order, and block until the session ends.
    ///
    /// Implementations send key presses through `handle` and stop once
    /// [`LockHandle::view`] reports `closing`, or when a window is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the windows cannot be created.
    fn present(&mut self, images: &[LockImage], handle: LockHandle) -> Result<()>;
}

/// One run of the lock screen.
pub struct LockSession<'a> {
    config: &'a Config,
    outputs: &'a dyn OutputSource,
    capturer: &'a dyn ScreenCapturer,
}

impl std::fmt::Debug for LockSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockSession")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> LockSession<'a> {
    /// Create a session using the given output source and capturer.
    #[must_use]
    pub fn new(
        config: &'a Config,
        outputs: &'a dyn OutputSource,
        capturer: &'a dyn ScreenCapturer,
    ) -> Self {
        Self {
            config,
            outputs,
            capturer,
        }
    }

    /// Query the outputs to lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoOutputs`] if the compositor reports none, or the
    /// query error.
    pub fn outputs(&self) -> Result<Vec<OutputDescriptor>> {
        let outputs = self.outputs.outputs()?;
        if outputs.is_empty() {
            return Err(Error::NoOutputs);
        }
        Ok(outputs)
    }

    /// Enumerate, capture and blur every output.
    ///
    /// # Errors
    ///
    /// Returns the first enumeration, capture or image error.
    pub fn prepare(&self) -> Result<Vec<LockImage>> {
        let outputs = self.outputs()?;
        info!(
            outputs = ?outputs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            "preparing lock images"
        );
        prepare_lock_images(
            &outputs,
            self.capturer,
            &self.config.image_dir(),
            self.config.capture.blur_sigma,
        )
    }

    /// Run the whole lock sequence and block until it ends.
    ///
    /// # Errors
    ///
    /// Returns an error if preparation fails, the monitor count does not match
    /// the image count, the runtime cannot start, or the presenter fails. In
    /// every preparation failure case no window has been shown.
    pub fn run(
        &self,
        presenter: &mut dyn Presenter,
        authenticator: Arc<dyn Authenticator>,
        user: &str,
    ) -> Result<CloseReason> {
        let images = self.prepare()?;
        let result = self.present(&images, presenter, authenticator, user);
        if !self.config.capture.keep_images {
            remove_lock_images(&images);
        }
        result
    }

    fn present(
        &self,
        images: &[LockImage],
        presenter: &mut dyn Presenter,
        authenticator: Arc<dyn Authenticator>,
        user: &str,
    ) -> Result<CloseReason> {
        let monitors = presenter.monitor_count()?;
        if monitors != images.len() {
            error!(monitors, images = images.len(), "monitor count mismatch");
            return Err(Error::MonitorMismatch {
                images: images.len(),
                monitors,
            });
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("frostlock-driver")
            .enable_all()
            .build()?;

        let machine = LockMachine::new(MachineOptions::from(self.config));
        let (driver, handle) = LockDriver::new(machine, authenticator, user);
        runtime.spawn(driver.run());

        info!(windows = images.len(), "presenting lock screen");
        let presented = presenter.present(images, handle.clone());
        runtime.shutdown_background();
        presented?;

        let reason = handle.view().closing.unwrap_or_else(|| {
            warn!("lock windows closed before the session finished");
            CloseReason::WindowClosed
        });
        info!(%reason, "lock session ended");
        Ok(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::tests::StubCapturer;
    use crate::driver::tests::StubAuthenticator;
    use crate::machine::{Key, KeyPress};

    struct StubOutputs(Vec<&'static str>);

    impl OutputSource for StubOutputs {
        fn outputs(&self) -> Result<Vec<OutputDescriptor>> {
            Ok(self.0.iter().map(|n| OutputDescriptor::new(*n)).collect())
        }
    }

    /// Records what it was asked to show and types a scripted sequence.
    #[derive(Default)]
    struct StubPresenter {
        monitors: usize,
        script: Vec<KeyPress>,
        presented: Vec<LockImage>,
        present_calls: usize,
    }

    impl Presenter for StubPresenter {
        fn monitor_count(&self) -> Result<usize> {
            Ok(self.monitors)
        }

        fn present(&mut self, images: &[LockImage], handle: LockHandle) -> Result<()> {
            self.present_calls += 1;
            self.presented = images.to_vec();
            for press in &self.script {
                handle.send_key(*press);
            }
            let mut view = handle.subscribe();
            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
            while view.borrow_and_update().closing.is_none() {
                if std::time::Instant::now() > deadline {
                    return Err(Error::internal("stub presenter timed out"));
                }
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
            Ok(())
        }
    }

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.capture.image_dir = Some(dir.to_path_buf());
        config.capture.blur_sigma = 1.0;
        config
    }

    fn typed(text: &str) -> Vec<KeyPress> {
        let mut keys: Vec<_> = text
            .chars()
            .map(|c| KeyPress::plain(Key::Char(c)))
            .collect();
        keys.push(KeyPress::plain(Key::Enter));
        keys
    }

    fn authenticator(password: &str) -> Arc<dyn Authenticator> {
        Arc::new(StubAuthenticator::accepting(password))
    }

    #[test]
    fn test_zero_outputs_aborts_before_presenting() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let outputs = StubOutputs(vec![]);
        let capturer = StubCapturer::default();
        let mut presenter = StubPresenter {
            monitors: 1,
            ..StubPresenter::default()
        };

        let err = LockSession::new(&config, &outputs, &capturer)
            .run(&mut presenter, authenticator("pw"), "alice")
            .unwrap_err();

        assert!(matches!(err, Error::NoOutputs));
        assert!(err.is_startup_error());
        assert_eq!(presenter.present_calls, 0);
    }

    #[test]
    fn test_capture_failure_on_second_output_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let outputs = StubOutputs(vec!["eDP-1", "DP-1"]);
        let capturer = StubCapturer {
            fail_on: vec!["DP-1".to_string()],
        };
        let mut presenter = StubPresenter {
            monitors: 2,
            ..StubPresenter::default()
        };

        let err = LockSession::new(&config, &outputs, &capturer)
            .run(&mut presenter, authenticator("pw"), "alice")
            .unwrap_err();

        assert!(matches!(err, Error::CaptureFailed { .. }));
        assert_eq!(presenter.present_calls, 0);
    }

    #[test]
    fn test_monitor_mismatch_aborts_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let outputs = StubOutputs(vec!["eDP-1", "DP-1"]);
        let capturer = StubCapturer::default();
        let mut presenter = StubPresenter {
            monitors: 1,
            ..StubPresenter::default()
        };

        let err = LockSession::new(&config, &outputs, &capturer)
            .run(&mut presenter, authenticator("pw"), "alice")
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MonitorMismatch {
                images: 2,
                monitors: 1
            }
        ));
        assert_eq!(presenter.present_calls, 0);
        assert!(!dir.path().join("eDP-1-lock.png").exists());
    }

    #[test]
    fn test_unlock_with_correct_password() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let outputs = StubOutputs(vec!["eDP-1", "DP-1"]);
        let capturer = StubCapturer::default();
        let mut presenter = StubPresenter {
            monitors: 2,
            script: typed("hunter2"),
            ..StubPresenter::default()
        };

        let reason = LockSession::new(&config, &outputs, &capturer)
            .run(&mut presenter, authenticator("hunter2"), "alice")
            .unwrap();

        assert_eq!(reason, CloseReason::Unlocked);
        assert_eq!(presenter.present_calls, 1);
        let names: Vec<_> = presenter
            .presented
            .iter()
            .map(|i| i.output.name.as_str())
            .collect();
        assert_eq!(names, ["eDP-1", "DP-1"]);
        assert!(!presenter.presented[0].path.exists());
    }

    #[test]
    fn test_keep_images_leaves_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.capture.keep_images = true;
        let outputs = StubOutputs(vec!["eDP-1"]);
        let capturer = StubCapturer::default();
        let mut presenter = StubPresenter {
            monitors: 1,
            script: vec![KeyPress::plain(Key::Char('q'))],
            ..StubPresenter::default()
        };

        let reason = LockSession::new(&config, &outputs, &capturer)
            .run(&mut presenter, authenticator("pw"), "alice")
            .unwrap();

        assert_eq!(reason, CloseReason::Quit);
        assert!(dir.path().join("eDP-1-lock.png").exists());
    }

    #[test]
    fn test_prepare_lists_images_without_presenting() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let outputs = StubOutputs(vec!["HDMI-A-1"]);
        let capturer = StubCapturer::default();

        let images = LockSession::new(&config, &outputs, &capturer)
            .prepare()
            .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].path, dir.path().join("HDMI-A-1-lock.png"));
    }
}
