//! GTK4 lock windows.
//!
//! One window per lock image, placed on the monitor with the same index. In
//! full-screen mode each window is a layer-shell overlay surface anchored on
//! every edge; in windowed mode it is an ordinary toplevel, which is only
//! useful for trying out the indicator.

use std::time::Duration;

use frostlock_core::config::IndicatorConfig;
use frostlock_core::{Config, Error, IndicatorFrame, LockHandle, LockImage, Presenter, Result};
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::{debug, info, warn};

use crate::draw;
use crate::keys;

const NAMESPACE: &str = "frostlock";

/// Shows the lock screen with GTK4.
#[derive(Debug)]
pub struct GtkPresenter {
    indicator: IndicatorConfig,
    redraw_interval: Duration,
    fullscreen: bool,
}

impl GtkPresenter {
    /// Initialise GTK on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Platform`] if GTK cannot connect to the display.
    pub fn new(config: &Config) -> Result<Self> {
        gtk4::init().map_err(|e| Error::platform(format!("failed to initialise GTK: {e}")))?;
        Ok(Self {
            indicator: config.indicator.clone(),
            redraw_interval: config.redraw_interval(),
            fullscreen: config.window.fullscreen,
        })
    }

    fn monitors() -> Result<Vec<gdk::Monitor>> {
        let display = gdk::Display::default()
            .ok_or_else(|| Error::platform("no default display"))?;
        let list = display.monitors();
        Ok((0..list.n_items())
            .filter_map(|i| list.item(i).and_downcast::<gdk::Monitor>())
            .collect())
    }

    fn build_window(
        &self,
        image: &LockImage,
        monitor: &gdk::Monitor,
        handle: &LockHandle,
    ) -> (gtk4::Window, gtk4::DrawingArea) {
        let window = gtk4::Window::builder()
            .title(NAMESPACE)
            .decorated(false)
            .build();

        if !self.fullscreen {
            window.set_default_size(800, 600);
        } else if gtk4_layer_shell::is_supported() {
            window.init_layer_shell();
            window.set_namespace(Some(NAMESPACE));
            window.set_layer(Layer::Overlay);
            window.set_monitor(Some(monitor));
            window.set_keyboard_mode(KeyboardMode::OnDemand);
            window.set_exclusive_zone(-1);
            for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
                window.set_anchor(edge, true);
            }
        } else {
            warn!("compositor lacks layer-shell, falling back to a full-screen window");
            window.fullscreen_on_monitor(monitor);
        }

        let picture = gtk4::Picture::for_filename(&image.path);
        picture.set_can_shrink(true);
        picture.set_keep_aspect_ratio(false);

        let area = gtk4::DrawingArea::new();
        area.set_hexpand(true);
        area.set_vexpand(true);
        let view = handle.clone();
        let style = self.indicator.clone();
        area.set_draw_func(move |_, cr, width, height| {
            let frame = IndicatorFrame::build(&view.view(), &style, &chrono::Local::now());
            draw::paint(cr, &frame, f64::from(width), f64::from(height));
        });

        let overlay = gtk4::Overlay::new();
        overlay.set_child(Some(&picture));
        overlay.add_overlay(&area);
        window.set_child(Some(&overlay));

        let controller = gtk4::EventControllerKey::new();
        let sender = handle.clone();
        controller.connect_key_pressed(move |_, keyval, _keycode, state| {
            sender.send_key(keys::translate(keyval, state));
            glib::Propagation::Stop
        });
        window.add_controller(controller);

        debug!(output = %image.output, path = %image.path.display(), "lock window built");
        (window, area)
    }
}

/// Match lock images to monitors by index, refusing to lock only some of them.
fn pair_with_monitors<'a, M>(
    images: &'a [LockImage],
    monitors: &'a [M],
) -> Result<Vec<(&'a LockImage, &'a M)>> {
    if images.len() != monitors.len() {
        return Err(Error::MonitorMismatch {
            images: images.len(),
            monitors: monitors.len(),
        });
    }
    Ok(images.iter().zip(monitors).collect())
}

impl Presenter for GtkPresenter {
    fn monitor_count(&self) -> Result<usize> {
        Ok(Self::monitors()?.len())
    }

    fn present(&mut self, images: &[LockImage], handle: LockHandle) -> Result<()> {
        let monitors = Self::monitors()?;
        let main_loop = glib::MainLoop::new(None, false);

        let mut windows = Vec::with_capacity(images.len());
        let mut areas = Vec::with_capacity(images.len());
        for (image, monitor) in pair_with_monitors(images, &monitors)? {
            let (window, area) = self.build_window(image, monitor, &handle);
            let quit = main_loop.clone();
            window.connect_close_request(move |_| {
                info!("lock window closed");
                quit.quit();
                glib::Propagation::Proceed
            });
            windows.push(window);
            areas.push(area);
        }

        let ticker = main_loop.clone();
        let closing = windows.clone();
        glib::timeout_add_local(self.redraw_interval, move || {
            if let Some(reason) = handle.view().closing {
                debug!(%reason, "closing lock windows");
                for window in &closing {
                    window.destroy();
                }
                ticker.quit();
                return glib::ControlFlow::Break;
            }
            for area in &areas {
                area.queue_draw();
            }
            glib::ControlFlow::Continue
        });

        for window in &windows {
            window.present();
        }
        main_loop.run();

        for window in &windows {
            window.destroy();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frostlock_core::OutputDescriptor;

    fn images(names: &[&str]) -> Vec<LockImage> {
        names
            .iter()
            .map(|name| LockImage {
                output: OutputDescriptor::new(*name),
                path: format!("/tmp/{name}-lock.png").into(),
            })
            .collect()
    }

    #[test]
    fn test_pairs_images_with_monitors_in_order() {
        let images = images(&["eDP-1", "DP-1"]);
        let pairs = pair_with_monitors(&images, &[10, 20]).unwrap();
        let names: Vec<_> = pairs
            .iter()
            .map(|(image, monitor)| (image.output.name.as_str(), **monitor))
            .collect();
        assert_eq!(names, [("eDP-1", 10), ("DP-1", 20)]);
    }

    #[test]
    fn test_unplugged_monitor_is_a_mismatch() {
        let images = images(&["eDP-1", "DP-1"]);
        let err = pair_with_monitors(&images, &[10]).unwrap_err();
        assert!(matches!(
            err,
            Error::MonitorMismatch {
                images: 2,
                monitors: 1
            }
        ));
    }
}
