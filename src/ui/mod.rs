//! User interface subsystem - OLED display, touch pads and the SELECT button.
//!
//! The display task renders the latest [`UiStatus`] published by the
//! session task and blanks the screen when the power manager says so.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C
//! - **Pads**: 8 capacitive touch pads, active-high, one task each
//! - **Button**: SELECT toggles advertising

pub mod buttons;
pub mod display;

use defmt::Format;
use saxpad::{BroadcastSession, BroadcastState, Fingering, PadSet};

/// Snapshot of the session for rendering.
#[derive(Clone, Copy, Format)]
pub struct UiStatus {
    pub fingering: Fingering,
    pub pads: PadSet,
    pub state: BroadcastState,
}

impl UiStatus {
    pub fn of<T, H>(session: &BroadcastSession<T, H>) -> Self
    where
        T: saxpad::Transport,
        H: saxpad::Host,
    {
        Self {
            fingering: session.current_fingering(),
            pads: session.pads(),
            state: *session.state(),
        }
    }
}
