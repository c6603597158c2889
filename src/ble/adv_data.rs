//! Raw advertising / scan-response payloads (AD structures).
//!
//! Legacy advertising PDUs hold at most 31 bytes.  Flags plus a 128-bit
//! service UUID already take 21, so the local name goes into the scan
//! response:
//!
//! ```text
//! adv data:   02 01 06                    Flags: LE General Discoverable, no BR/EDR
//!             11 07 <uuid, little-endian> Complete list of 128-bit service UUIDs
//! scan resp:  0A 09 "Saxophone"           Complete local name
//! ```

use crate::error::Error;
use crate::session::Advertisement;

/// Maximum legacy advertising payload.
pub const MAX_ADV_LEN: usize = 31;

pub const AD_TYPE_FLAGS: u8 = 0x01;
pub const AD_TYPE_SHORT_NAME: u8 = 0x08;
pub const AD_TYPE_COMPLETE_NAME: u8 = 0x09;
pub const AD_TYPE_UUID128_COMPLETE: u8 = 0x07;

/// LE General Discoverable Mode | BR/EDR Not Supported.
pub const FLAGS_GENERAL_DISCOVERABLE: u8 = 0x06;

/// Fixed-capacity AD payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvPayload {
    buf: [u8; MAX_ADV_LEN],
    len: usize,
}

impl Default for AdvPayload {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvPayload {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_ADV_LEN],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one AD structure (`len`, `type`, `data`).
    pub fn push(&mut self, ad_type: u8, data: &[u8]) -> Result<&mut Self, Error> {
        let total = 2 + data.len();
        if self.len + total > MAX_ADV_LEN {
            return Err(Error::BufferOverflow);
        }
        self.buf[self.len] = (1 + data.len()) as u8;
        self.buf[self.len + 1] = ad_type;
        self.buf[self.len + 2..self.len + total].copy_from_slice(data);
        self.len += total;
        Ok(self)
    }

    pub fn push_flags(&mut self, flags: u8) -> Result<&mut Self, Error> {
        self.push(AD_TYPE_FLAGS, &[flags])
    }

    /// Append a complete 128-bit UUID list holding `uuid` (big-endian in,
    /// little-endian on air).
    pub fn push_uuid128(&mut self, uuid: &[u8; 16]) -> Result<&mut Self, Error> {
        self.push(AD_TYPE_UUID128_COMPLETE, &uuid128_le(uuid))
    }

    /// Append the local name, shortened if it does not fit.
    pub fn push_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        let room = MAX_ADV_LEN.saturating_sub(self.len + 2);
        if room == 0 {
            return Err(Error::BufferOverflow);
        }
        let bytes = name.as_bytes();
        if bytes.len() <= room {
            self.push(AD_TYPE_COMPLETE_NAME, bytes)
        } else {
            self.push(AD_TYPE_SHORT_NAME, &bytes[..room])
        }
    }
}

/// Reverse a big-endian UUID into BLE (little-endian) byte order.
pub fn uuid128_le(uuid: &[u8; 16]) -> [u8; 16] {
    let mut le = *uuid;
    le.reverse();
    le
}

/// Advertising data: flags + service UUID.
pub fn advertising_data(adv: &Advertisement) -> Result<AdvPayload, Error> {
    let mut payload = AdvPayload::new();
    payload
        .push_flags(FLAGS_GENERAL_DISCOVERABLE)?
        .push_uuid128(&adv.service_uuid)?;
    Ok(payload)
}

/// Scan response: local name.
pub fn scan_response_data(adv: &Advertisement) -> Result<AdvPayload, Error> {
    let mut payload = AdvPayload::new();
    payload.push_name(adv.local_name)?;
    Ok(payload)
}

/// Find the data of the first AD structure of `ad_type`.
pub fn find(data: &[u8], ad_type: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == ad_type {
            return Some(&data[i + 2..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}
