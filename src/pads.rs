//! Instrument touch pads and the set of pads currently pressed.
//!
//! Bit layout of the serialized mask (`u16`):
//! ```text
//! Bit 0: Right index         Bit 4: Left index
//! Bit 1: Right middle        Bit 5: Left middle
//! Bit 2: Right ring          Bit 6: Left ring
//! Bit 3: reserved (unused)   Bit 7: Left pinky top
//!                            Bit 8: Left pinky bottom
//! ```
//! Bits 9-15 are unused.  The positions are a wire contract and never move.

/// Number of defined pads.
pub const PAD_COUNT: usize = 8;

/// Mask of every bit that names a pad.
pub const VALID_MASK: u16 = 0x01F7;

/// A single instrument pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pad {
    RightIndex = 0,
    RightMiddle = 1,
    RightRing = 2,
    LeftIndex = 4,
    LeftMiddle = 5,
    LeftRing = 6,
    LeftPinkyTop = 7,
    LeftPinkyBottom = 8,
}

impl Pad {
    /// All pads, in physical order from the top of the instrument body:
    /// right hand first, then left hand, then the pinky keys.
    pub const ALL: [Pad; PAD_COUNT] = [
        Pad::RightIndex,
        Pad::RightMiddle,
        Pad::RightRing,
        Pad::LeftIndex,
        Pad::LeftMiddle,
        Pad::LeftRing,
        Pad::LeftPinkyTop,
        Pad::LeftPinkyBottom,
    ];

    /// Bit position in the serialized mask.
    pub const fn bit(self) -> u8 {
        self as u8
    }

    pub const fn mask(self) -> u16 {
        1 << self.bit()
    }

    /// Short label for on-screen pad maps.
    pub const fn label(self) -> &'static str {
        match self {
            Pad::RightIndex => "RI",
            Pad::RightMiddle => "RM",
            Pad::RightRing => "RR",
            Pad::LeftIndex => "LI",
            Pad::LeftMiddle => "LM",
            Pad::LeftRing => "LR",
            Pad::LeftPinkyTop => "PT",
            Pad::LeftPinkyBottom => "PB",
        }
    }
}

/// Pad gesture reported by the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadEvent {
    Pressed(Pad),
    Released(Pad),
}

/// Set of pressed pads.
///
/// The bitmask is only the serialization form; use [`PadSet::insert`],
/// [`PadSet::remove`] and [`PadSet::contains`] to work with pads.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadSet(u16);

impl PadSet {
    /// No pad pressed.
    pub const EMPTY: PadSet = PadSet(0);

    /// Build a set from a list of pads (usable in `const` tables).
    pub const fn of(pads: &[Pad]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < pads.len() {
            bits |= pads[i].mask();
            i += 1;
        }
        PadSet(bits)
    }

    /// Parse a serialized mask.  Returns `None` if the reserved bit or any
    /// bit above the last pad is set.
    pub const fn from_bits(bits: u16) -> Option<Self> {
        if bits & !VALID_MASK != 0 {
            None
        } else {
            Some(PadSet(bits))
        }
    }

    /// Parse a serialized mask, dropping bits that name no pad.
    pub const fn from_bits_truncate(bits: u16) -> Self {
        PadSet(bits & VALID_MASK)
    }

    /// Serialized mask.
    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, pad: Pad) -> bool {
        self.0 & pad.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Press a pad.  Returns `true` if it was not already pressed.
    pub fn insert(&mut self, pad: Pad) -> bool {
        let was = self.contains(pad);
        self.0 |= pad.mask();
        !was
    }

    /// Release a pad.  Returns `true` if it was pressed.
    pub fn remove(&mut self, pad: Pad) -> bool {
        let was = self.contains(pad);
        self.0 &= !pad.mask();
        was
    }

    /// Pressed pads in physical order.
    pub fn iter(self) -> impl Iterator<Item = Pad> {
        Pad::ALL.into_iter().filter(move |&p| self.contains(p))
    }
}

impl FromIterator<Pad> for PadSet {
    fn from_iter<I: IntoIterator<Item = Pad>>(iter: I) -> Self {
        let mut set = PadSet::EMPTY;
        for pad in iter {
            set.insert(pad);
        }
        set
    }
}

/// Owner of the live pad set on the input side.
///
/// Touch modules can report the same edge twice (e.g. a press while the
/// pad is already held after a debounce glitch); those are absorbed so
/// every reported change toggles exactly one bit.
#[derive(Clone, Copy, Default, Debug)]
pub struct PadTracker {
    pads: PadSet,
}

impl PadTracker {
    pub const fn new() -> Self {
        Self {
            pads: PadSet::EMPTY,
        }
    }

    pub fn pads(&self) -> PadSet {
        self.pads
    }

    /// Apply one gesture.  Returns the new set if it changed.
    pub fn apply(&mut self, event: PadEvent) -> Option<PadSet> {
        let changed = match event {
            PadEvent::Pressed(pad) => self.pads.insert(pad),
            PadEvent::Released(pad) => self.pads.remove(pad),
        };
        changed.then_some(self.pads)
    }
}
