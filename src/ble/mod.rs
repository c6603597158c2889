//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **GATT server** - the note service with its single read/write/notify
//!    characteristic, registered once when the SoftDevice is enabled.
//! 2. **Radio task** - advertising on/off, one central connection at a
//!    time, value updates and notifications.
//! 3. **Transport** - the [`saxpad::Transport`] implementation the session
//!    task talks to; it only queues [`RadioCommand`]s and never blocks.
//!
//! The radio task reports back to the session through the session input
//! channel defined in the crate root.

pub mod gatt;
pub mod radio;

use defmt::Format;

/// Requests from the transport to the radio task.
#[derive(Clone, Copy, Format)]
pub enum RadioCommand {
    /// Start connectable advertising.
    StartAdvertising,
    /// Stop advertising and drop the current central, if any.
    StopAdvertising,
    /// Store the characteristic value (answers reads).
    SetValue(u8),
    /// Store the value and notify the subscribed central.
    Notify(u8),
}
