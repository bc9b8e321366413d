use log::info;

use crate::controls::{Control, NUM_CONTROLS};
use crate::device::{gamepad, DeviceHandle, DeviceId};
use crate::hat::HatPosition;
use crate::signal::{ControllerSignal, SignalSpec, LARGE_MAG, SMALL_MAG};

/// A configuration carried over from a previous session: the model GUID it
/// was captured on, and one persisted signal per control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedBindings {
    pub guid: String,
    pub parts: [SignalSpec; NUM_CONTROLS],
}

/// The player's binding table: which signal on the current device drives
/// each of the seven controls.
///
/// The table always has either zero or [`NUM_CONTROLS`] entries; a device
/// change replaces it wholesale, so control queries never observe a
/// half-built map.
pub struct PlayerController {
    device: Option<DeviceHandle>,
    signal_map: Vec<ControllerSignal>,
    default_config: bool,
}

impl Default for PlayerController {
    fn default() -> Self {
        PlayerController::new()
    }
}

impl PlayerController {
    pub fn new() -> PlayerController {
        PlayerController {
            device: None,
            signal_map: Vec::new(),
            default_config: true,
        }
    }

    pub fn device(&self) -> Option<DeviceHandle> {
        self.device.clone()
    }

    pub fn device_id(&self) -> Option<DeviceId> {
        self.device.as_ref().map(|device| device.id())
    }

    /// Whether the current map came from the layout heuristic rather than
    /// a capture session or a saved configuration.
    pub fn is_default_config(&self) -> bool {
        self.default_config
    }

    /// Drops the device and the whole binding table. Every control reads
    /// released afterwards.
    pub fn clear(&mut self) {
        self.device = None;
        self.signal_map.clear();
        self.default_config = true;
    }

    /// Binds the player to a device and rebuilds the binding table.
    ///
    /// When a saved configuration is supplied and its GUID matches the
    /// device model, the saved signals are realized on the new device;
    /// otherwise the table falls back to the layout heuristic.
    pub fn change_device(
        &mut self,
        device: Option<DeviceHandle>,
        saved: Option<&SavedBindings>,
    ) {
        self.signal_map.clear();
        self.default_config = true;
        self.device = device;

        let Some(device) = self.device.clone() else {
            info!("player has no controller");
            return;
        };

        if let Some(saved) = saved {
            if !saved.guid.is_empty() && saved.guid == device.guid() {
                info!(
                    "using saved configuration for {} [{}]",
                    device.name(),
                    saved.guid
                );
                self.signal_map = saved
                    .parts
                    .iter()
                    .map(|spec| ControllerSignal::make(device.clone(), *spec))
                    .collect();
                self.default_config = false;
                return;
            }
        }

        info!("using default layout for {}", device.name());
        self.signal_map = default_map(&device);
    }

    /// Replaces the binding table with freshly captured signals, in one
    /// step. The table is never left partially updated.
    pub fn commit(&mut self, parts: &[SignalSpec; NUM_CONTROLS]) {
        let Some(device) = self.device.clone() else {
            return;
        };
        self.signal_map = parts
            .iter()
            .map(|spec| ControllerSignal::make(device.clone(), *spec))
            .collect();
        self.default_config = false;
    }

    /// Persisted form of the current table, in control order. `None` when
    /// no device is bound.
    pub fn current_parts(&self) -> Option<[SignalSpec; NUM_CONTROLS]> {
        if self.signal_map.len() != NUM_CONTROLS {
            return None;
        }
        let mut parts = [SignalSpec::button(0); NUM_CONTROLS];
        for (slot, signal) in parts.iter_mut().zip(&self.signal_map) {
            *slot = signal.spec();
        }
        Some(parts)
    }

    /// Whether the given control is currently pressed. Released when no
    /// device is bound.
    pub fn is_pressed(&self, control: Control) -> bool {
        self.signal_map
            .get(control.index())
            .is_some_and(ControllerSignal::is_firing)
    }

    pub fn up(&self) -> bool {
        self.is_pressed(Control::Up)
    }

    pub fn down(&self) -> bool {
        self.is_pressed(Control::Down)
    }

    pub fn left(&self) -> bool {
        self.is_pressed(Control::Left)
    }

    pub fn right(&self) -> bool {
        self.is_pressed(Control::Right)
    }

    /// Action button by ordinal: 0 is attack, 1 is jump, 2 is tongue.
    /// Anything else reads released.
    pub fn button(&self, n: usize) -> bool {
        match n {
            0 => self.is_pressed(Control::Attack),
            1 => self.is_pressed(Control::Jump),
            2 => self.is_pressed(Control::Tongue),
            _ => false,
        }
    }
}

/// Heuristic layout for a device that has no captured configuration,
/// keyed off the device's shape hints. The fallback, for a device with no
/// usable hints at all, is the axial layout.
fn default_map(device: &DeviceHandle) -> Vec<ControllerSignal> {
    if device.prefers_gamepad_default() {
        gamepad_map(device)
    } else if device.prefers_hat_default() {
        hat_map(device)
    } else {
        axial_map(device)
    }
}

/// Standardized gamepad: each direction accepts the d-pad button or either
/// analog stick pushed past the dead pad; actions sit on the face buttons.
fn gamepad_map(device: &DeviceHandle) -> Vec<ControllerSignal> {
    let dir = |button: u8, left_axis: u8, right_axis: u8, low: i32, high: i32| {
        ControllerSignal::either(
            ControllerSignal::make(device.clone(), SignalSpec::button(button)),
            ControllerSignal::either(
                ControllerSignal::make(device.clone(), SignalSpec::axis(left_axis, low, high)),
                ControllerSignal::make(device.clone(), SignalSpec::axis(right_axis, low, high)),
            ),
        )
    };
    vec![
        dir(
            gamepad::BUTTON_DPAD_UP,
            gamepad::AXIS_LEFT_Y,
            gamepad::AXIS_RIGHT_Y,
            -LARGE_MAG,
            -SMALL_MAG,
        ),
        dir(
            gamepad::BUTTON_DPAD_DOWN,
            gamepad::AXIS_LEFT_Y,
            gamepad::AXIS_RIGHT_Y,
            SMALL_MAG,
            LARGE_MAG,
        ),
        dir(
            gamepad::BUTTON_DPAD_LEFT,
            gamepad::AXIS_LEFT_X,
            gamepad::AXIS_RIGHT_X,
            -LARGE_MAG,
            -SMALL_MAG,
        ),
        dir(
            gamepad::BUTTON_DPAD_RIGHT,
            gamepad::AXIS_LEFT_X,
            gamepad::AXIS_RIGHT_X,
            SMALL_MAG,
            LARGE_MAG,
        ),
        ControllerSignal::make(device.clone(), SignalSpec::button(gamepad::BUTTON_A)),
        ControllerSignal::make(device.clone(), SignalSpec::button(gamepad::BUTTON_B)),
        ControllerSignal::make(device.clone(), SignalSpec::button(gamepad::BUTTON_Y)),
    ]
}

/// Raw joystick with a hat: directions come from hat zero, actions from
/// the first three buttons.
fn hat_map(device: &DeviceHandle) -> Vec<ControllerSignal> {
    vec![
        ControllerSignal::make(device.clone(), SignalSpec::hat(0, HatPosition::Up)),
        ControllerSignal::make(device.clone(), SignalSpec::hat(0, HatPosition::Down)),
        ControllerSignal::make(device.clone(), SignalSpec::hat(0, HatPosition::Left)),
        ControllerSignal::make(device.clone(), SignalSpec::hat(0, HatPosition::Right)),
        ControllerSignal::make(device.clone(), SignalSpec::button(0)),
        ControllerSignal::make(device.clone(), SignalSpec::button(1)),
        ControllerSignal::make(device.clone(), SignalSpec::button(2)),
    ]
}

/// Raw joystick without a hat: directions come from the first two axes
/// (vertical is conventionally axis one), actions from the first three
/// buttons.
fn axial_map(device: &DeviceHandle) -> Vec<ControllerSignal> {
    vec![
        ControllerSignal::make(device.clone(), SignalSpec::axis(1, -LARGE_MAG, -SMALL_MAG)),
        ControllerSignal::make(device.clone(), SignalSpec::axis(1, SMALL_MAG, LARGE_MAG)),
        ControllerSignal::make(device.clone(), SignalSpec::axis(0, -LARGE_MAG, -SMALL_MAG)),
        ControllerSignal::make(device.clone(), SignalSpec::axis(0, SMALL_MAG, LARGE_MAG)),
        ControllerSignal::make(device.clone(), SignalSpec::button(0)),
        ControllerSignal::make(device.clone(), SignalSpec::button(1)),
        ControllerSignal::make(device.clone(), SignalSpec::button(2)),
    ]
}
