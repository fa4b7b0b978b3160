//! Indicator layout, independent of any drawing library.
//!
//! [`IndicatorFrame::build`] turns a published [`LockView`] into colours,
//! arcs and text lines; the platform renderer only has to paint them.

use std::f64::consts::PI;

use chrono::{DateTime, TimeZone};
use rand::Rng;

use crate::config::IndicatorConfig;
use crate::driver::LockView;
use crate::machine::LockState;

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Rgb {
    /// Build a colour from 8-bit components.
    #[must_use]
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }
}

/// Ring colour for a state.
#[must_use]
pub fn ring_color(state: LockState) -> Rgb {
    match state {
        LockState::Success => Rgb::from_u8(0x55, 0xA6, 0x30),
        LockState::Wrong => Rgb::from_u8(0xD3, 0x0D, 0x0D),
        LockState::Clear => Rgb::from_u8(0xFF, 0xDB, 0x00),
        LockState::Validating => Rgb::from_u8(0x00, 0x91, 0xEA),
        LockState::Idle | LockState::Typing => Rgb::from_u8(0xBE, 0xBE, 0xBE),
    }
}

/// Colour of the typing spinner arc.
pub const SPINNER_COLOR: Rgb = Rgb {
    r: 0.37,
    g: 0.37,
    b: 0.37,
};

/// Colour of every text line.
pub const TEXT_COLOR: Rgb = Rgb {
    r: 1.0,
    g: 1.0,
    b: 1.0,
};

/// Status word shown instead of the clock, if any.
#[must_use]
pub fn status_word(state: LockState) -> Option<&'static str> {
    match state {
        LockState::Wrong => Some("Wrong"),
        LockState::Clear => Some("Cleared"),
        LockState::Validating => Some("Validating..."),
        LockState::Idle | LockState::Typing | LockState::Success => None,
    }
}

/// Angle of the typing spinner, re-rolled on every typed character.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spinner {
    angle: f64,
}

impl Spinner {
    /// Pick a new whole-degree angle in `1..=360`.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let degrees: u16 = rng.gen_range(1..=360);
        self.angle = f64::from(degrees).to_radians();
    }

    /// Current angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

/// A stroked circular arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStroke {
    /// Start angle in radians.
    pub start: f64,
    /// End angle in radians.
    pub end: f64,
    /// Stroke colour.
    pub color: Rgb,
    /// Stroke width.
    pub width: f64,
}

/// The centre text of the indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headline {
    /// Clock and date lines.
    Clock {
        /// Formatted time.
        time: String,
        /// Formatted date.
        date: String,
    },
    /// A short status word.
    Status(&'static str),
}

/// Everything needed to paint one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    /// Ring radius.
    pub radius: f64,
    /// The full ring.
    pub ring: ArcStroke,
    /// The spinner segment drawn over the ring while typing.
    pub spinner: Option<ArcStroke>,
    /// Centre text.
    pub headline: Headline,
    /// Info text near the bottom of the screen.
    pub info: Option<String>,
    /// Font size of the clock line.
    pub clock_font_size: f64,
    /// Font size of every other line.
    pub text_font_size: f64,
}

impl IndicatorFrame {
    /// Lay out the indicator for a view at time `now`.
    #[must_use]
    pub fn build<Tz: TimeZone>(view: &LockView, style: &IndicatorConfig, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let ring = ArcStroke {
            start: 0.0,
            end: 2.0 * PI,
            color: ring_color(view.state),
            width: style.line_width,
        };

        let spinner = (view.state == LockState::Typing).then(|| ArcStroke {
            start: view.spinner_angle,
            end: view.spinner_angle + PI / 3.0,
            color: SPINNER_COLOR,
            width: style.line_width + 1.0,
        });

        let headline = match status_word(view.state) {
            Some(word) => Headline::Status(word),
            None => Headline::Clock {
                time: now.format(&style.clock_format).to_string(),
                date: now.format(&style.date_format).to_string(),
            },
        };

        Self {
            radius: style.radius,
            ring,
            spinner,
            headline,
            info: view.info.clone().filter(|text| !text.is_empty()),
            clock_font_size: style.clock_font_size,
            text_font_size: style.text_font_size,
        }
    }
}
