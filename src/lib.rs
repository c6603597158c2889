//! Host-testable library interface for saxpad.
//!
//! Everything here is pure logic with no hardware access: the fingering
//! table, the pad set, the BLE broadcast session state machine and the
//! advertising payload builder.  The firmware (`main.rs`) links against
//! this crate and supplies the SoftDevice transport, the buzzer and the
//! display.
//!
//! Usage: `cargo test` (no features needed)
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and requires the `embedded` feature.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod fingering;
pub mod pads;
pub mod session;
pub mod tone;

pub use error::{Error, TransportError};
pub use fingering::{resolve, Fingering};
pub use pads::{Pad, PadEvent, PadSet, PadTracker};
pub use session::{AdapterState, BroadcastSession, BroadcastState, ChannelId, Host, Transport};

// Internal module paths for files that live next to firmware-only code
#[path = "ble/adv_data.rs"]
mod ble_adv_data_impl;
#[path = "power_logic.rs"]
mod power_logic_impl;
#[path = "ui/input_logic.rs"]
mod ui_input_logic_impl;

// ═══════════════════════════════════════════════════════════════════════════
// BLE
// ═══════════════════════════════════════════════════════════════════════════

pub mod ble {
    pub mod adv_data {
        pub use crate::ble_adv_data_impl::*;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// UI
// ═══════════════════════════════════════════════════════════════════════════

pub mod ui {
    /// Requests from the control button to the session task.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum SessionCommand {
        StartAdvertising,
        StopAdvertising,
    }

    pub mod input_logic {
        pub use crate::ui_input_logic_impl::select_action;
    }
}

pub mod power_logic {
    pub use crate::power_logic_impl::screen_should_be_on;
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::fingering::{self, display_name, wire_byte, FINGERINGS, UNRECOGNIZED_NAME};
    use super::pads::{Pad, PadEvent, PadSet, PadTracker};
    use super::ui::SessionCommand;

    fn press_all(pads: &[Pad]) -> PadSet {
        let mut tracker = PadTracker::new();
        for &pad in pads {
            tracker.apply(PadEvent::Pressed(pad));
        }
        tracker.pads()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Fingering Table Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn every_fingering_resolves_to_documented_triple() {
        let expected = [
            (0x177, "C4", 60),
            (0x077, "D4", 62),
            (0x037, "E4", 64),
            (0x017, "F4", 65),
            (0x007, "G4", 67),
            (0x003, "A4", 69),
            (0x001, "B4", 71),
            (0x002, "C5", 71),
        ];
        for (mask, name, pitch) in expected {
            let pads = PadSet::from_bits(mask).unwrap();
            let f = fingering::resolve(pads);
            assert_eq!(f.name, name);
            assert_eq!(f.pitch, pitch);
            assert_eq!(f.wire_byte, pitch);
            assert_eq!(wire_byte(pads), pitch);
            assert_eq!(display_name(pads), name);
        }
    }

    #[test]
    fn resolve_is_pure() {
        for mask in 0..=0x01FFu16 {
            let pads = PadSet::from_bits_truncate(mask);
            assert_eq!(fingering::resolve(pads), fingering::resolve(pads));
        }
        // Order of earlier calls does not matter.
        let a = fingering::resolve(PadSet::of(&[Pad::RightIndex]));
        let _ = fingering::resolve(PadSet::of(&[Pad::RightMiddle]));
        assert_eq!(a, fingering::resolve(PadSet::of(&[Pad::RightIndex])));
    }

    #[test]
    fn unknown_masks_resolve_to_the_same_default() {
        let known = FINGERINGS.map(|f| f.pads);
        for mask in 0..=0x01FFu16 {
            let Some(pads) = PadSet::from_bits(mask) else {
                continue;
            };
            if known.contains(&pads) {
                continue;
            }
            let f = fingering::resolve(pads);
            assert_eq!(f.name, UNRECOGNIZED_NAME);
            assert_eq!(f.pitch, 60);
            assert_eq!(f.wire_byte, 0x3C);
        }
    }

    #[test]
    fn scenario_seven_presses_is_c4() {
        let pads = press_all(&[
            Pad::RightIndex,
            Pad::RightMiddle,
            Pad::RightRing,
            Pad::LeftIndex,
            Pad::LeftMiddle,
            Pad::LeftRing,
            Pad::LeftPinkyBottom,
        ]);
        let f = fingering::resolve(pads);
        assert_eq!((f.name, f.pitch, f.wire_byte), ("C4", 60, 0x3C));
    }

    #[test]
    fn scenario_right_middle_only_is_c5_sharing_b4_pitch() {
        let c5 = fingering::resolve(press_all(&[Pad::RightMiddle]));
        let b4 = fingering::resolve(press_all(&[Pad::RightIndex]));
        assert_eq!((c5.name, c5.pitch, c5.wire_byte), ("C5", 71, 0x47));
        assert_eq!((b4.name, b4.pitch, b4.wire_byte), ("B4", 71, 0x47));
        assert_ne!(c5.pads, b4.pads);
    }

    #[test]
    fn press_order_does_not_matter() {
        let a = press_all(&[Pad::LeftIndex, Pad::RightRing, Pad::RightIndex, Pad::RightMiddle]);
        let b = press_all(&[Pad::RightIndex, Pad::RightMiddle, Pad::RightRing, Pad::LeftIndex]);
        assert_eq!(a, b);
        assert_eq!(display_name(a), "F4");
    }

    // ════════════════════════════════════════════════════════════════════════
    // UI / Power Policy Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn select_toggles_advertising() {
        use super::ui::input_logic::select_action;
        assert_eq!(select_action(false), SessionCommand::StartAdvertising);
        assert_eq!(select_action(true), SessionCommand::StopAdvertising);
    }

    #[test]
    fn screen_power_policy_auto_off_after_timeout() {
        use super::power_logic::screen_should_be_on;
        assert!(screen_should_be_on(false, true, 119, 120));
        assert!(!screen_should_be_on(false, true, 120, 120));
    }

    #[test]
    fn screen_power_policy_auto_off_disabled_stays_on() {
        use super::power_logic::screen_should_be_on;
        assert!(screen_should_be_on(false, false, 10_000, 120));
    }

    #[test]
    fn screen_power_policy_idle_suppression_keeps_screen_on() {
        use super::power_logic::screen_should_be_on;
        assert!(screen_should_be_on(true, true, 10_000, 120));
    }
}
