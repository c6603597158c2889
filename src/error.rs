//! Unified error type for saxpad.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

use core::fmt;

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Advertising was requested while the radio is not powered on.
    AdapterNotReady,

    /// The pad set does not match any entry of the fingering table.
    UnrecognizedFingering,

    /// The radio stack rejected an operation.
    Transport(TransportError),

    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Failures reported by a [`Transport`](crate::session::Transport)
/// implementation.  Informational: none of them changes session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The GATT service could not be added to the attribute table.
    ServiceRegistrationFailed,
    /// Advertising could not be started.
    AdvertisingFailed,
    /// The notification queue is full; wait for "ready to push".
    NotifyQueueFull,
    /// The radio task is gone or not accepting requests.
    NotConnected,
    /// Raw error code from the SoftDevice.
    Raw(u32),
}

// Convenience conversions

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AdapterNotReady => f.write_str("bluetooth adapter is not powered on"),
            Error::UnrecognizedFingering => f.write_str("unrecognized fingering"),
            Error::Transport(e) => write!(f, "transport error: {}", e),
            Error::BufferOverflow => f.write_str("buffer too small"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ServiceRegistrationFailed => f.write_str("service registration failed"),
            TransportError::AdvertisingFailed => f.write_str("advertising failed"),
            TransportError::NotifyQueueFull => f.write_str("notification queue full"),
            TransportError::NotConnected => f.write_str("radio not reachable"),
            TransportError::Raw(code) => write!(f, "softdevice error 0x{:04x}", code),
        }
    }
}
