//! Fingering table - pad combinations to notes.
//!
//! Lookup is by exact pad-set equality, like covering tone holes on a
//! real instrument: one pad more or less is a different fingering, not
//! a neighbour.  The table, its masks and its pitch codes are a wire
//! contract with existing listeners.
//!
//! ```text
//! Name  Pads                      Mask    Pitch  Wire
//! C4    RI RM RR LI LM LR PB      0x177   60     0x3C
//! D4    RI RM RR LI LM LR         0x077   62     0x3E
//! E4    RI RM RR LI LM            0x037   64     0x40
//! F4    RI RM RR LI               0x017   65     0x41
//! G4    RI RM RR                  0x007   67     0x43
//! A4    RI RM                     0x003   69     0x45
//! B4    RI                        0x001   71     0x47
//! C5    RM                        0x002   71     0x47
//! ```
//! B4 and C5 share pitch 71.  That is how the reference device maps them.

use crate::error::Error;
use crate::pads::Pad::{
    LeftIndex as LI, LeftMiddle as LM, LeftPinkyBottom as PB, LeftRing as LR,
    RightIndex as RI, RightMiddle as RM, RightRing as RR,
};
use crate::pads::{Pad, PadSet};

/// Number of entries in the fingering table.
pub const FINGERING_COUNT: usize = 8;

/// Display name used when the pads match no fingering.
pub const UNRECOGNIZED_NAME: &str = "--";

/// Pitch sounded and broadcast for an unrecognized fingering (the lowest
/// pitch of the table).
pub const UNRECOGNIZED_PITCH: u8 = 60;

/// A named musical result of one exact pad combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fingering {
    /// Pads that must be pressed (and no others).
    pub pads: PadSet,
    /// MIDI-style pitch code (0-127).
    pub pitch: u8,
    /// Short display name.
    pub name: &'static str,
    /// Single-byte wire encoding.
    pub wire_byte: u8,
}

impl Fingering {
    const fn new(pads: &[Pad], pitch: u8, name: &'static str) -> Self {
        Self {
            pads: PadSet::of(pads),
            pitch,
            name,
            wire_byte: pitch,
        }
    }

    /// Read-response / notification payload.
    pub const fn payload(&self) -> [u8; 1] {
        [self.wire_byte]
    }

    /// `true` if this is the fallback for an unknown pad combination.
    pub fn is_unrecognized(&self) -> bool {
        lookup(self.pads).is_none()
    }
}

/// The fixed fingering table, lowest note first.
pub const FINGERINGS: [Fingering; FINGERING_COUNT] = [
    Fingering::new(&[RI, RM, RR, LI, LM, LR, PB], 60, "C4"),
    Fingering::new(&[RI, RM, RR, LI, LM, LR], 62, "D4"),
    Fingering::new(&[RI, RM, RR, LI, LM], 64, "E4"),
    Fingering::new(&[RI, RM, RR, LI], 65, "F4"),
    Fingering::new(&[RI, RM, RR], 67, "G4"),
    Fingering::new(&[RI, RM], 69, "A4"),
    Fingering::new(&[RI], 71, "B4"),
    Fingering::new(&[RM], 71, "C5"),
];

/// Find the table entry for exactly these pads.
pub fn lookup(pads: PadSet) -> Option<&'static Fingering> {
    FINGERINGS.iter().find(|f| f.pads == pads)
}

/// Resolve pads to a fingering.  Total: unknown combinations yield the
/// unrecognized default (lowest pitch, placeholder name).
pub fn resolve(pads: PadSet) -> Fingering {
    match lookup(pads) {
        Some(f) => *f,
        None => Fingering {
            pads,
            pitch: UNRECOGNIZED_PITCH,
            name: UNRECOGNIZED_NAME,
            wire_byte: UNRECOGNIZED_PITCH,
        },
    }
}

/// Resolve pads, reporting unknown combinations as an error.
pub fn try_resolve(pads: PadSet) -> Result<Fingering, Error> {
    lookup(pads).copied().ok_or(Error::UnrecognizedFingering)
}

/// Wire byte for the pads (the pitch code).
pub fn wire_byte(pads: PadSet) -> u8 {
    resolve(pads).wire_byte
}

/// Display name for the pads.
pub fn display_name(pads: PadSet) -> &'static str {
    resolve(pads).name
}
