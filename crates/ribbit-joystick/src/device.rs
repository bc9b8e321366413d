use std::rc::Rc;

use crate::hat::HatPosition;

#[cfg(feature = "sdl2-backend")]
pub(crate) mod sdl;
pub(crate) mod virt;

/// Stable instance identifier of an attached device. Assigned at attach
/// time and never reused while the device stays attached; distinct from
/// the volatile enumeration position.
pub type DeviceId = u32;

/// Uniform read access to one physical controller, regardless of whether
/// the platform models it as a raw joystick or a standardized gamepad.
///
/// All reads are synchronous and non-blocking; the caller is responsible
/// for pumping the platform's event machinery before reads that must
/// reflect "now". Out-of-range component ids read as inactive.
pub trait ControlPort {
    /// Raw analog value of the axis, in the platform's native range.
    fn read_axis(&self, id: u8) -> i16;
    /// Whether the button is currently held.
    fn read_button(&self, id: u8) -> bool;
    /// Current hat position, or `None` when centered.
    fn read_hat(&self, id: u8) -> Option<HatPosition>;

    fn num_axes(&self) -> u32;
    fn num_buttons(&self) -> u32;
    fn num_hats(&self) -> u32;

    /// Instance id, stable until detach.
    fn id(&self) -> DeviceId;
    /// Hardware GUID. Identifies the model, not the physical unit; stable
    /// across sessions. May be empty when the platform has none.
    fn guid(&self) -> String;
    /// Human-readable name. May be empty or a placeholder.
    fn name(&self) -> String;
    /// False once the hardware has been unplugged.
    fn attached(&self) -> bool;

    /// Hint: a two-axis default layout would suit this device.
    fn prefers_axial_default(&self) -> bool;
    /// Hint: a hat-based default layout would suit this device.
    fn prefers_hat_default(&self) -> bool;
    /// Hint: the device follows the standardized gamepad layout.
    fn prefers_gamepad_default(&self) -> bool;

    /// True when every axis is known to rest at zero (standardized
    /// gamepads guarantee this), so neutral-zone calibration can be
    /// skipped.
    fn neutral_points_known(&self) -> bool;
}

/// Shared handle to an open device. The registry, the binding table and a
/// configuration session may all hold one; the hardware is released when
/// the last holder drops it, while detach invalidates reads through
/// `attached()` without dangling.
pub type DeviceHandle = Rc<dyn ControlPort>;

/// Attach/detach notification delivered by the platform event pump.
///
/// Attach events carry the volatile enumeration position of the new
/// device; detach events carry the stable instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    Attached { position: u32 },
    Detached { id: DeviceId },
}

/// Component ids of the standardized gamepad layout.
pub mod gamepad {
    pub const AXIS_LEFT_X: u8 = 0;
    pub const AXIS_LEFT_Y: u8 = 1;
    pub const AXIS_RIGHT_X: u8 = 2;
    pub const AXIS_RIGHT_Y: u8 = 3;
    pub const AXIS_TRIGGER_LEFT: u8 = 4;
    pub const AXIS_TRIGGER_RIGHT: u8 = 5;

    pub const BUTTON_A: u8 = 0;
    pub const BUTTON_B: u8 = 1;
    pub const BUTTON_X: u8 = 2;
    pub const BUTTON_Y: u8 = 3;
    pub const BUTTON_BACK: u8 = 4;
    pub const BUTTON_GUIDE: u8 = 5;
    pub const BUTTON_START: u8 = 6;
    pub const BUTTON_LEFT_STICK: u8 = 7;
    pub const BUTTON_RIGHT_STICK: u8 = 8;
    pub const BUTTON_LEFT_SHOULDER: u8 = 9;
    pub const BUTTON_RIGHT_SHOULDER: u8 = 10;
    pub const BUTTON_DPAD_UP: u8 = 11;
    pub const BUTTON_DPAD_DOWN: u8 = 12;
    pub const BUTTON_DPAD_LEFT: u8 = 13;
    pub const BUTTON_DPAD_RIGHT: u8 = 14;

    pub const NUM_AXES: u32 = 6;
    pub const NUM_BUTTONS: u32 = 15;
}
