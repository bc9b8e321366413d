use std::rc::Rc;

use log::{debug, warn};
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;
use sdl2::joystick::{HatState, Joystick};
use sdl2::{GameControllerSubsystem, JoystickSubsystem};

use crate::device::{gamepad, ControlPort, DeviceHandle, DeviceId, PlatformEvent};
use crate::hat::HatPosition;
use crate::registry::DeviceBus;
use crate::{Error, Result};

/// SDL2-backed device bus.
///
/// Opens devices that the platform recognizes as standardized gamepads in
/// their gamepad representation, and everything else as a raw joystick.
pub struct SdlBus {
    joystick: JoystickSubsystem,
    controller: GameControllerSubsystem,
}

impl SdlBus {
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self> {
        let joystick = sdl.joystick().map_err(Error::Backend)?;
        let controller = sdl.game_controller().map_err(Error::Backend)?;
        Ok(Self { joystick, controller })
    }
}

impl DeviceBus for SdlBus {
    fn device_count(&self) -> u32 {
        self.joystick.num_joysticks().unwrap_or(0)
    }

    fn open(&self, position: u32) -> Option<DeviceHandle> {
        if self.controller.is_game_controller(position) {
            // The gamepad view still needs the underlying joystick for
            // identity attributes the controller API does not expose.
            match (self.controller.open(position), self.joystick.open(position)) {
                (Ok(gc), Ok(js)) => {
                    debug!("opened device at position {position} as gamepad");
                    Some(Rc::new(SdlGamepad { gc, js }))
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!("failed to open gamepad at position {position}: {e}");
                    None
                }
            }
        } else {
            match self.joystick.open(position) {
                Ok(js) => {
                    debug!("opened device at position {position} as joystick");
                    Some(Rc::new(SdlJoystick { js }))
                }
                Err(e) => {
                    warn!("failed to open joystick at position {position}: {e}");
                    None
                }
            }
        }
    }
}

/// Translates a raw SDL event into a [`PlatformEvent`], if it is a device
/// attach/detach notification. Gamepad add/remove events duplicate the
/// joystick ones and are ignored.
pub fn translate_event(event: &Event) -> Option<PlatformEvent> {
    match event {
        Event::JoyDeviceAdded { which, .. } => {
            Some(PlatformEvent::Attached { position: *which })
        }
        Event::JoyDeviceRemoved { which, .. } => {
            Some(PlatformEvent::Detached { id: *which })
        }
        _ => None,
    }
}

/// Raw joystick view of a device.
struct SdlJoystick {
    js: Joystick,
}

impl ControlPort for SdlJoystick {
    fn read_axis(&self, id: u8) -> i16 {
        self.js.axis(u32::from(id)).unwrap_or(0)
    }

    fn read_button(&self, id: u8) -> bool {
        self.js.button(u32::from(id)).unwrap_or(false)
    }

    fn read_hat(&self, id: u8) -> Option<HatPosition> {
        match self.js.hat(u32::from(id)) {
            Ok(state) => hat_from_state(state),
            Err(_) => None,
        }
    }

    fn num_axes(&self) -> u32 {
        self.js.num_axes()
    }

    fn num_buttons(&self) -> u32 {
        self.js.num_buttons()
    }

    fn num_hats(&self) -> u32 {
        self.js.num_hats()
    }

    fn id(&self) -> DeviceId {
        self.js.instance_id()
    }

    fn guid(&self) -> String {
        self.js.guid().string()
    }

    fn name(&self) -> String {
        self.js.name()
    }

    fn attached(&self) -> bool {
        self.js.attached()
    }

    // A d-pad can surface as anything from four buttons to a nine-way hat
    // to two axes. These hints just report what the driver thinks it has
    // so the default layout can make a vaguely sensible guess.
    fn prefers_axial_default(&self) -> bool {
        self.js.num_axes() >= 2
    }

    fn prefers_hat_default(&self) -> bool {
        self.js.num_hats() >= 1
    }

    fn prefers_gamepad_default(&self) -> bool {
        false
    }

    fn neutral_points_known(&self) -> bool {
        false
    }
}

/// Standardized gamepad view of a device. Sits on top of the joystick
/// layer, so identity attributes come from the underlying joystick.
struct SdlGamepad {
    gc: GameController,
    js: Joystick,
}

impl ControlPort for SdlGamepad {
    fn read_axis(&self, id: u8) -> i16 {
        match gamepad_axis(id) {
            Some(axis) => self.gc.axis(axis),
            None => 0,
        }
    }

    fn read_button(&self, id: u8) -> bool {
        match gamepad_button(id) {
            Some(button) => self.gc.button(button),
            None => false,
        }
    }

    // Standardized gamepads expose no hats; the d-pad is buttons.
    fn read_hat(&self, _id: u8) -> Option<HatPosition> {
        None
    }

    fn num_axes(&self) -> u32 {
        gamepad::NUM_AXES
    }

    fn num_buttons(&self) -> u32 {
        gamepad::NUM_BUTTONS
    }

    fn num_hats(&self) -> u32 {
        0
    }

    fn id(&self) -> DeviceId {
        self.js.instance_id()
    }

    fn guid(&self) -> String {
        self.js.guid().string()
    }

    fn name(&self) -> String {
        self.gc.name()
    }

    fn attached(&self) -> bool {
        self.gc.attached()
    }

    fn prefers_axial_default(&self) -> bool {
        false
    }

    fn prefers_hat_default(&self) -> bool {
        false
    }

    fn prefers_gamepad_default(&self) -> bool {
        true
    }

    // Every axis on a standardized gamepad rests at zero.
    fn neutral_points_known(&self) -> bool {
        true
    }
}

fn hat_from_state(state: HatState) -> Option<HatPosition> {
    match state {
        HatState::Centered => None,
        HatState::Up => Some(HatPosition::Up),
        HatState::Right => Some(HatPosition::Right),
        HatState::Down => Some(HatPosition::Down),
        HatState::Left => Some(HatPosition::Left),
        HatState::RightUp => Some(HatPosition::RightUp),
        HatState::RightDown => Some(HatPosition::RightDown),
        HatState::LeftUp => Some(HatPosition::LeftUp),
        HatState::LeftDown => Some(HatPosition::LeftDown),
    }
}

fn gamepad_axis(id: u8) -> Option<SdlAxis> {
    Some(match id {
        gamepad::AXIS_LEFT_X => SdlAxis::LeftX,
        gamepad::AXIS_LEFT_Y => SdlAxis::LeftY,
        gamepad::AXIS_RIGHT_X => SdlAxis::RightX,
        gamepad::AXIS_RIGHT_Y => SdlAxis::RightY,
        gamepad::AXIS_TRIGGER_LEFT => SdlAxis::TriggerLeft,
        gamepad::AXIS_TRIGGER_RIGHT => SdlAxis::TriggerRight,
        _ => return None,
    })
}

fn gamepad_button(id: u8) -> Option<SdlButton> {
    Some(match id {
        gamepad::BUTTON_A => SdlButton::A,
        gamepad::BUTTON_B => SdlButton::B,
        gamepad::BUTTON_X => SdlButton::X,
        gamepad::BUTTON_Y => SdlButton::Y,
        gamepad::BUTTON_BACK => SdlButton::Back,
        gamepad::BUTTON_GUIDE => SdlButton::Guide,
        gamepad::BUTTON_START => SdlButton::Start,
        gamepad::BUTTON_LEFT_STICK => SdlButton::LeftStick,
        gamepad::BUTTON_RIGHT_STICK => SdlButton::RightStick,
        gamepad::BUTTON_LEFT_SHOULDER => SdlButton::LeftShoulder,
        gamepad::BUTTON_RIGHT_SHOULDER => SdlButton::RightShoulder,
        gamepad::BUTTON_DPAD_UP => SdlButton::DPadUp,
        gamepad::BUTTON_DPAD_DOWN => SdlButton::DPadDown,
        gamepad::BUTTON_DPAD_LEFT => SdlButton::DPadLeft,
        gamepad::BUTTON_DPAD_RIGHT => SdlButton::DPadRight,
        _ => return None,
    })
}
