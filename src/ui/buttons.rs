//! GPIO pad and button input with async debouncing.
//!
//! Touch pads (TTP223-style modules) drive their pin high while touched.
//! Each pad task reports both edges, since releasing a pad changes the
//! note as much as pressing it.  SELECT is a tactile switch, active-low
//! with internal pull-up, reported on press only.

use defmt::{debug, info};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};
use saxpad::config::{BUTTON_DEBOUNCE_MS, PAD_DEBOUNCE_MS};
use saxpad::{Pad, PadEvent};

use crate::{InputSender, SessionInput};

/// Run a single pad loop.
///
/// Waits for any edge, debounces, and reports the settled level only if it
/// differs from the last reported one.
pub async fn pad_task(pin: AnyPin, pad: Pad, tx: InputSender) -> ! {
    let mut input = Input::new(pin, Pull::Down);
    let mut touched = false;

    loop {
        input.wait_for_any_edge().await;
        Timer::after(Duration::from_millis(PAD_DEBOUNCE_MS)).await;

        let level = input.is_high();
        if level == touched {
            continue;
        }
        touched = level;

        let event = if touched {
            PadEvent::Pressed(pad)
        } else {
            PadEvent::Released(pad)
        };
        debug!("Pad: {}", event);
        tx.send(SessionInput::Pad(event)).await;
    }
}

/// Run the SELECT button loop.
///
/// Waits for the pin to go low (pressed), debounces, sends the event,
/// then waits for release before repeating.
pub async fn select_button_task(pin: AnyPin, tx: InputSender) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Button: SELECT");
            tx.send(SessionInput::Select).await;

            // Wait for release to avoid repeat triggers.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
