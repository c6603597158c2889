//! SSD1306 OLED display wrapper and render task.
//!
//! ```text
//! ┌────────────────────────────┐
//! │ F4                  BLE on │  note name, adapter state
//! │                   pitch 65 │  pitch code on the wire
//! │  ●  ●  ●       ○  ○        │  left hand:  LI LM LR   pinky PT PB
//! │  ●  ●  ●                   │  right hand: RI RM RR
//! │ Advertising                │
//! └────────────────────────────┘
//! ```

use core::fmt::Write;

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use heapless::String;
use ssd1306::Ssd1306;

use saxpad::{BroadcastState, Pad};

use crate::power::PowerManager;
use crate::ui::UiStatus;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const PAD_DIAMETER: u32 = 9;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style(font: &'static MonoFont<'static>) -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(font)
        .text_color(BinaryColor::On)
        .build()
}

/// Top-left corner of a pad marker.
fn pad_position(pad: Pad) -> Point {
    let (col, row) = match pad {
        Pad::LeftIndex => (0, 0),
        Pad::LeftMiddle => (1, 0),
        Pad::LeftRing => (2, 0),
        Pad::LeftPinkyTop => (4, 0),
        Pad::LeftPinkyBottom => (5, 0),
        Pad::RightIndex => (0, 1),
        Pad::RightMiddle => (1, 1),
        Pad::RightRing => (2, 1),
    };
    Point::new(4 + col * 14, 26 + row * 14)
}

/// Status line for the broadcast lifecycle.
fn broadcast_label(state: &BroadcastState) -> &'static str {
    if state.is_advertising() {
        "Advertising"
    } else if state.adapter.is_powered_on() {
        "Idle - SELECT"
    } else {
        "Radio unavailable"
    }
}

/// Render the session snapshot.
pub fn draw_status<I2C>(display: &mut Display<I2C>, status: &UiStatus)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new(status.fingering.name, Point::new(0, 16), text_style(&FONT_10X20))
        .draw(display);
    let _ = Text::new(status.state.adapter.label(), Point::new(68, 10), text_style(&FONT_6X10))
        .draw(display);

    let mut pitch: String<12> = String::new();
    if status.fingering.is_unrecognized() {
        let _ = pitch.push_str("no note");
    } else {
        let _ = write!(pitch, "pitch {}", status.fingering.pitch);
    }
    let _ = Text::new(pitch.as_str(), Point::new(68, 22), text_style(&FONT_6X10)).draw(display);

    let pressed = PrimitiveStyle::with_fill(BinaryColor::On);
    let open = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
    for pad in Pad::ALL {
        let style = if status.pads.contains(pad) { pressed } else { open };
        let _ = Circle::new(pad_position(pad), PAD_DIAMETER)
            .into_styled(style)
            .draw(display);
    }

    let _ = Text::new(broadcast_label(&status.state), Point::new(0, 62), text_style(&FONT_6X10))
        .draw(display);

    let _ = display.flush();
}

/// Render status updates forever, blanking the panel when idle.
pub async fn run<I2C>(
    i2c: I2C,
    status: &'static Signal<CriticalSectionRawMutex, UiStatus>,
    keep_awake: &'static Signal<CriticalSectionRawMutex, bool>,
) -> !
where
    I2C: embedded_hal::i2c::I2c,
{
    let mut display = init(i2c);
    let mut power = PowerManager::new();
    let mut screen_on = true;
    let mut last_pads = None;
    let mut ticker = Ticker::every(Duration::from_secs(1));

    loop {
        match select3(status.wait(), keep_awake.wait(), ticker.next()).await {
            Either3::First(update) => {
                if last_pads != Some(update.pads) {
                    power.activity();
                    last_pads = Some(update.pads);
                }
                draw_status(&mut display, &update);
            }
            Either3::Second(suppressed) => power.set_idle_timer_suppressed(suppressed),
            Either3::Third(()) => power.tick(),
        }

        let on = power.display_on();
        if on != screen_on {
            let _ = display.set_display_on(on);
            screen_on = on;
        }
    }
}
