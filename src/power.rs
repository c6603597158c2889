//! Power management - screen blanking and the idle timer.
//!
//! While advertising the session suppresses the idle timer, so the
//! screen stays on for as long as a listener may be watching.  Otherwise
//! the OLED turns off after `SCREEN_AUTO_OFF_TIMEOUT_SECS` without pad
//! activity and comes back on the next touch.
//!
//! nRF52840 power modes:
//! - System ON: Normal operation (~3.5 mA with BLE advertising)
//! - System ON Idle: CPU sleeping between events (~1.5 mA)

use defmt::info;
use embassy_time::Instant;
use saxpad::{config, power_logic};

/// Power state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum PowerState {
    /// Screen on.
    Active,
    /// No pad activity for a while - screen off.
    ScreenOff,
}

/// Power manager tracks activity and decides when the screen sleeps.
pub struct PowerManager {
    state: PowerState,
    last_activity: Instant,
    idle_timer_suppressed: bool,
}

impl PowerManager {
    pub fn new() -> Self {
        Self {
            state: PowerState::Active,
            last_activity: Instant::now(),
            idle_timer_suppressed: false,
        }
    }

    /// Record activity (pad touch).
    pub fn activity(&mut self) {
        self.last_activity = Instant::now();
        self.update();
    }

    /// Keep the device awake regardless of activity.
    pub fn set_idle_timer_suppressed(&mut self, suppressed: bool) {
        if self.idle_timer_suppressed == suppressed {
            return;
        }
        self.idle_timer_suppressed = suppressed;
        info!("Power: idle_timer_suppressed={}", suppressed);
        self.update();
    }

    /// Check if display should be on.
    pub fn display_on(&self) -> bool {
        self.state == PowerState::Active
    }

    /// Periodic tick - call every ~1 second.
    pub fn tick(&mut self) {
        self.update();
    }

    fn update(&mut self) {
        let idle_secs = self.last_activity.elapsed().as_secs();
        let on = power_logic::screen_should_be_on(
            self.idle_timer_suppressed,
            config::SCREEN_AUTO_OFF_ENABLED,
            idle_secs,
            config::SCREEN_AUTO_OFF_TIMEOUT_SECS,
        );
        let new_state = if on {
            PowerState::Active
        } else {
            PowerState::ScreenOff
        };

        if new_state != self.state {
            info!("Power: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
        }
    }
}
