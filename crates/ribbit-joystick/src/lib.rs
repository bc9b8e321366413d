mod configurer;
mod controls;
mod device;
mod hat;
mod player;
mod registry;
mod signal;

use thiserror::Error;

pub use crate::configurer::{Configurer, ListenOutcome};
pub use crate::controls::{Control, NUM_CONTROLS};
pub use crate::device::gamepad;
pub use crate::device::virt::{VirtualBus, VirtualPad};
pub use crate::device::{ControlPort, DeviceHandle, DeviceId, PlatformEvent};
pub use crate::hat::HatPosition;
pub use crate::player::{PlayerController, SavedBindings};
pub use crate::registry::{DeviceBus, DeviceRegistry, RegistryChange};
pub use crate::signal::{
    clashes, ControllerSignal, PartKind, SignalSpec, LARGE_MAG, SMALL_MAG,
};

#[cfg(feature = "sdl2-backend")]
pub use crate::device::sdl::{translate_event, SdlBus};

/// Error type for joystick subsystem operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No controller device is currently bound.
    #[error("no controller device is bound")]
    NoDevice,
    /// The tracked device list has no entry at the given position.
    #[error("no tracked device at position {0}")]
    NoSuchDevice(usize),
    /// A configuration session exists but has not captured every control.
    #[error("configuration has not captured all controls yet")]
    NotFinished,
    /// No configuration session is running.
    #[error("no configuration session is running")]
    NoSession,
    /// A generic backend error.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenient result alias for joystick operations.
pub type Result<T> = std::result::Result<T, Error>;
