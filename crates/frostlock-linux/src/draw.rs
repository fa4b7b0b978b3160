//! Cairo rendering of an [`IndicatorFrame`].

use frostlock_core::indicator::{ArcStroke, Headline, Rgb, TEXT_COLOR};
use frostlock_core::IndicatorFrame;
use gtk4::cairo;
use tracing::debug;

/// Vertical position of the info line, as a fraction of the height.
const INFO_LINE: f64 = 0.875;

/// Paint `frame` centred in a `width` x `height` area.
pub fn paint(cr: &cairo::Context, frame: &IndicatorFrame, width: f64, height: f64) {
    if let Err(e) = try_paint(cr, frame, width, height) {
        debug!(error = %e, "failed to paint indicator");
    }
}

fn try_paint(
    cr: &cairo::Context,
    frame: &IndicatorFrame,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    let x = width / 2.0;
    let y = height / 2.0;

    stroke_arc(cr, x, y, frame.radius, &frame.ring)?;
    if let Some(spinner) = &frame.spinner {
        stroke_arc(cr, x, y, frame.radius, spinner)?;
    }

    set_color(cr, TEXT_COLOR);
    match &frame.headline {
        Headline::Clock { time, date } => {
            cr.set_font_size(frame.clock_font_size);
            let ext = cr.text_extents(time)?;
            cr.move_to(x - ext.width() / 2.0, y);
            cr.show_text(time)?;

            cr.set_font_size(frame.text_font_size);
            let ext = cr.text_extents(date)?;
            cr.move_to(x - ext.width() / 2.0, y + 2.0 * ext.height());
            cr.show_text(date)?;
        }
        Headline::Status(word) => {
            cr.set_font_size(frame.text_font_size);
            let ext = cr.text_extents(word)?;
            cr.move_to(x - ext.width() / 2.0, y + ext.height() / 2.0);
            cr.show_text(word)?;
        }
    }

    if let Some(info) = &frame.info {
        cr.set_font_size(frame.text_font_size);
        let ext = cr.text_extents(info)?;
        cr.move_to(x - ext.width() / 2.0, height * INFO_LINE - ext.height() / 2.0);
        cr.show_text(info)?;
    }
    Ok(())
}

fn stroke_arc(
    cr: &cairo::Context,
    x: f64,
    y: f64,
    radius: f64,
    arc: &ArcStroke,
) -> Result<(), cairo::Error> {
    cr.new_sub_path();
    cr.arc(x, y, radius, arc.start, arc.end);
    set_color(cr, arc.color);
    cr.set_line_width(arc.width);
    cr.stroke()
}

fn set_color(cr: &cairo::Context, color: Rgb) {
    cr.set_source_rgb(color.r, color.g, color.b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use frostlock_core::config::IndicatorConfig;
    use frostlock_core::{LockState, LockView};

    fn surface() -> (cairo::ImageSurface, cairo::Context) {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 400, 400).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();
        (surface, cr)
    }

    fn frame(state: LockState, info: Option<&str>) -> IndicatorFrame {
        let view = LockView {
            state,
            info: info.map(str::to_string),
            spinner_angle: 1.0,
            closing: None,
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        IndicatorFrame::build(&view, &IndicatorConfig::default(), &now)
    }

    fn pixel(surface: &mut cairo::ImageSurface, x: usize, y: usize) -> [u8; 4] {
        let stride = usize::try_from(surface.stride()).unwrap();
        let data = surface.data().unwrap();
        let i = y * stride + x * 4;
        [data[i], data[i + 1], data[i + 2], data[i + 3]]
    }

    #[test]
    fn test_ring_is_painted_at_radius() {
        let (mut surface, cr) = surface();
        paint(&cr, &frame(LockState::Wrong, None), 400.0, 400.0);
        drop(cr);
        surface.flush();

        // Rightmost point of the ring: (200 + 100, 200). ARGB32 is BGRA in memory.
        let [b, _, r, a] = pixel(&mut surface, 300, 200);
        assert_eq!(a, 255);
        assert!(r > 150 && b < 60);
    }

    #[test]
    fn test_every_state_paints_without_error() {
        for state in [
            LockState::Idle,
            LockState::Typing,
            LockState::Validating,
            LockState::Wrong,
            LockState::Success,
            LockState::Clear,
        ] {
            let (_surface, cr) = surface();
            assert!(try_paint(&cr, &frame(state, Some("Retry")), 400.0, 400.0).is_ok());
        }
    }

    #[test]
    fn test_centre_of_ring_is_transparent_without_text_overlap() {
        let (mut surface, cr) = surface();
        paint(&cr, &frame(LockState::Idle, None), 400.0, 400.0);
        drop(cr);
        surface.flush();

        let [_, _, _, a] = pixel(&mut surface, 200, 130);
        assert_eq!(a, 0);
    }
}
