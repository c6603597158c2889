//! Application-wide constants and compile-time configuration.
//!
//! BLE identifiers, timing parameters, and pin assignments live here so
//! they can be tuned in one place.  The BLE identifiers are a wire
//! contract with existing listeners and must not change.

// BLE

/// Primary service UUID `E56A082E-C49B-47CA-A2AB-389127B8CBE3`, big-endian
/// (the order it is written in).
pub const SERVICE_UUID: [u8; 16] = [
    0xE5, 0x6A, 0x08, 0x2E, 0xC4, 0x9B, 0x47, 0xCA, 0xA2, 0xAB, 0x38, 0x91, 0x27, 0xB8, 0xCB, 0xE3,
];

/// Note characteristic UUID (16-bit).
pub const NOTE_CHARACTERISTIC_UUID: u16 = 0xFFF0;

/// Advertised local name.
pub const LOCAL_NAME: &str = "Saxophone";

/// Size of the note payload on the wire (read responses and notifications).
pub const NOTE_PAYLOAD_LEN: usize = 1;

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

/// Delay before retrying a notification that hit a full SoftDevice queue (ms).
pub const NOTIFY_RETRY_MS: u64 = 20;

// Sound

/// Velocity used for every sounded note.
pub const NOTE_VELOCITY: u8 = 120;

/// How long the buzzer keeps sounding without a new note (ms).
pub const NOTE_HOLD_MS: u64 = 600;

/// PWM counter clock after the Div16 prescaler (Hz).
pub const BUZZER_PWM_CLOCK_HZ: u32 = 1_000_000;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` pins are
// picked in `main.rs`.  Touch pads are TTP223-style modules with a
// digital, active-high output.
//
//   Pad RIGHT INDEX        → P0.03
//   Pad RIGHT MIDDLE       → P0.04
//   Pad RIGHT RING         → P0.28
//   Pad LEFT INDEX         → P0.29
//   Pad LEFT MIDDLE        → P0.30
//   Pad LEFT RING          → P0.31
//   Pad LEFT PINKY TOP     → P1.01
//   Pad LEFT PINKY BOTTOM  → P1.02
//   Button SELECT          → P0.24
//   Buzzer (PWM0 ch0)      → P0.13
//   I²C SDA                → P0.26
//   I²C SCL                → P0.27

/// Pad debounce time (ms).
pub const PAD_DEBOUNCE_MS: u64 = 10;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Display / power

/// Enable automatic OLED screen power-off after inactivity.
pub const SCREEN_AUTO_OFF_ENABLED: bool = true;

/// Inactivity timeout before OLED is turned off (seconds).
pub const SCREEN_AUTO_OFF_TIMEOUT_SECS: u64 = 120;
