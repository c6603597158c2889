//! GATT server definition.
//!
//! The attribute table is fixed once the SoftDevice is enabled, so the
//! note service is declared here and registered at boot.  The UUID
//! literals must match `saxpad::config::{SERVICE_UUID, NOTE_CHARACTERISTIC_UUID}`.

/// Note service: one byte carrying the current pitch code.
#[nrf_softdevice::gatt_service(uuid = "E56A082E-C49B-47CA-A2AB-389127B8CBE3")]
pub struct InstrumentService {
    /// Current pitch code.  Writes are accepted and ignored.
    #[characteristic(uuid = "fff0", read, write, notify)]
    pub note: u8,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub instrument: InstrumentService,
}
