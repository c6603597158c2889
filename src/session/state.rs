//! Broadcast session state.

/// Radio power/availability as reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdapterState {
    /// Nothing reported yet.
    #[default]
    Unknown,
    /// The stack is restarting; a new state follows.
    Resetting,
    /// The hardware has no usable BLE peripheral role.
    Unsupported,
    /// The application is not allowed to use the radio.
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl AdapterState {
    pub const fn is_powered_on(self) -> bool {
        matches!(self, AdapterState::PoweredOn)
    }

    /// Short label for the status line.
    pub const fn label(self) -> &'static str {
        match self {
            AdapterState::Unknown => "BLE ?",
            AdapterState::Resetting => "BLE reset",
            AdapterState::Unsupported => "BLE n/a",
            AdapterState::Unauthorized => "BLE denied",
            AdapterState::PoweredOff => "BLE off",
            AdapterState::PoweredOn => "BLE on",
        }
    }
}

/// Handle of the registered note characteristic (its value attribute).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub u16);

/// Advertising lifecycle.  The channel exists exactly while advertising.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Broadcast {
    #[default]
    Idle,
    Advertising { channel: ChannelId },
}

/// Everything the session knows about the radio side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BroadcastState {
    pub adapter: AdapterState,
    pub broadcast: Broadcast,
    /// The adapter left `PoweredOn` while advertising; the registration
    /// and the advertisement did not survive and must be redone.
    pub needs_restart: bool,
}

impl BroadcastState {
    pub const fn new() -> Self {
        Self {
            adapter: AdapterState::Unknown,
            broadcast: Broadcast::Idle,
            needs_restart: false,
        }
    }

    pub const fn is_advertising(&self) -> bool {
        matches!(self.broadcast, Broadcast::Advertising { .. })
    }

    /// Advertising with a registration that is still live on air.
    pub const fn is_on_air(&self) -> bool {
        self.is_advertising() && !self.needs_restart
    }

    pub const fn channel(&self) -> Option<ChannelId> {
        match self.broadcast {
            Broadcast::Advertising { channel } => Some(channel),
            Broadcast::Idle => None,
        }
    }
}
