//! Translation from GDK key events to [`KeyPress`].

use frostlock_core::{Key, KeyPress};
use gtk4::gdk;

/// Map a GDK keyval and modifier state to a [`KeyPress`].
#[must_use]
pub fn translate(keyval: gdk::Key, state: gdk::ModifierType) -> KeyPress {
    let key = match keyval {
        gdk::Key::Return | gdk::Key::KP_Enter | gdk::Key::ISO_Enter => Key::Enter,
        gdk::Key::BackSpace => Key::Backspace,
        gdk::Key::Delete | gdk::Key::KP_Delete => Key::Delete,
        other => other.to_unicode().map_or(Key::Other, Key::Char),
    };
    KeyPress {
        key,
        ctrl: state.contains(gdk::ModifierType::CONTROL_MASK),
    }
}
