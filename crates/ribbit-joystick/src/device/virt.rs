use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::device::{gamepad, ControlPort, DeviceHandle, DeviceId};
use crate::hat::HatPosition;
use crate::registry::DeviceBus;

/// A fully scriptable in-memory device, for tests, demos and input
/// replays. Reads reflect whatever state was last scripted.
pub struct VirtualPad {
    id: DeviceId,
    guid: String,
    name: String,
    gamepad: bool,
    axes: RefCell<Vec<i16>>,
    buttons: RefCell<Vec<bool>>,
    hats: RefCell<Vec<Option<HatPosition>>>,
    attached: Cell<bool>,
}

impl VirtualPad {
    /// A raw joystick with the given component counts, all neutral.
    pub fn joystick(
        id: DeviceId,
        guid: &str,
        name: &str,
        num_axes: usize,
        num_buttons: usize,
        num_hats: usize,
    ) -> Rc<VirtualPad> {
        Rc::new(VirtualPad {
            id,
            guid: guid.to_string(),
            name: name.to_string(),
            gamepad: false,
            axes: RefCell::new(vec![0; num_axes]),
            buttons: RefCell::new(vec![false; num_buttons]),
            hats: RefCell::new(vec![None; num_hats]),
            attached: Cell::new(true),
        })
    }

    /// A standardized gamepad: six axes, fifteen buttons, no hats.
    pub fn gamepad(id: DeviceId, guid: &str, name: &str) -> Rc<VirtualPad> {
        Rc::new(VirtualPad {
            id,
            guid: guid.to_string(),
            name: name.to_string(),
            gamepad: true,
            axes: RefCell::new(vec![0; gamepad::NUM_AXES as usize]),
            buttons: RefCell::new(vec![false; gamepad::NUM_BUTTONS as usize]),
            hats: RefCell::new(Vec::new()),
            attached: Cell::new(true),
        })
    }

    pub fn set_axis(&self, id: u8, value: i16) {
        if let Some(slot) = self.axes.borrow_mut().get_mut(usize::from(id)) {
            *slot = value;
        }
    }

    pub fn press(&self, id: u8) {
        if let Some(slot) = self.buttons.borrow_mut().get_mut(usize::from(id)) {
            *slot = true;
        }
    }

    pub fn release(&self, id: u8) {
        if let Some(slot) = self.buttons.borrow_mut().get_mut(usize::from(id)) {
            *slot = false;
        }
    }

    pub fn set_hat(&self, id: u8, position: Option<HatPosition>) {
        if let Some(slot) = self.hats.borrow_mut().get_mut(usize::from(id)) {
            *slot = position;
        }
    }

    /// Returns every component to its neutral state.
    pub fn release_all(&self) {
        self.axes.borrow_mut().fill(0);
        self.buttons.borrow_mut().fill(false);
        self.hats.borrow_mut().fill(None);
    }

    /// Marks the pad as detached, as if the cable was pulled. Reads keep
    /// working (returning the last scripted state) but `attached()` goes
    /// false, which is what the registry keys off.
    pub fn unplug(&self) {
        self.attached.set(false);
    }
}

impl ControlPort for VirtualPad {
    fn read_axis(&self, id: u8) -> i16 {
        self.axes.borrow().get(usize::from(id)).copied().unwrap_or(0)
    }

    fn read_button(&self, id: u8) -> bool {
        self.buttons
            .borrow()
            .get(usize::from(id))
            .copied()
            .unwrap_or(false)
    }

    fn read_hat(&self, id: u8) -> Option<HatPosition> {
        self.hats.borrow().get(usize::from(id)).copied().flatten()
    }

    fn num_axes(&self) -> u32 {
        self.axes.borrow().len() as u32
    }

    fn num_buttons(&self) -> u32 {
        self.buttons.borrow().len() as u32
    }

    fn num_hats(&self) -> u32 {
        self.hats.borrow().len() as u32
    }

    fn id(&self) -> DeviceId {
        self.id
    }

    fn guid(&self) -> String {
        self.guid.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn attached(&self) -> bool {
        self.attached.get()
    }

    fn prefers_axial_default(&self) -> bool {
        !self.gamepad && self.axes.borrow().len() >= 2
    }

    fn prefers_hat_default(&self) -> bool {
        !self.gamepad && !self.hats.borrow().is_empty()
    }

    fn prefers_gamepad_default(&self) -> bool {
        self.gamepad
    }

    fn neutral_points_known(&self) -> bool {
        self.gamepad
    }
}

/// A scriptable device bus: pads can be plugged and unplugged between
/// frames to exercise hotplug paths.
#[derive(Default)]
pub struct VirtualBus {
    slots: RefCell<Vec<Rc<VirtualPad>>>,
}

impl VirtualBus {
    pub fn new() -> Rc<VirtualBus> {
        Rc::new(VirtualBus::default())
    }

    /// Appends a pad to the enumeration list and returns its position.
    pub fn plug(&self, pad: Rc<VirtualPad>) -> u32 {
        let mut slots = self.slots.borrow_mut();
        slots.push(pad);
        (slots.len() - 1) as u32
    }

    /// Detaches the pad with the given instance id and removes it from
    /// the enumeration list.
    pub fn unplug(&self, id: DeviceId) {
        let mut slots = self.slots.borrow_mut();
        if let Some(index) = slots.iter().position(|p| p.id() == id) {
            slots[index].unplug();
            slots.remove(index);
        }
    }
}

impl DeviceBus for VirtualBus {
    fn device_count(&self) -> u32 {
        self.slots.borrow().len() as u32
    }

    fn open(&self, position: u32) -> Option<DeviceHandle> {
        let pad = self.slots.borrow().get(position as usize)?.clone();
        Some(pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_reads_reflect_state() {
        let pad = VirtualPad::joystick(7, "guid-7", "pad", 2, 3, 1);
        assert_eq!(pad.read_axis(0), 0);
        pad.set_axis(0, -5000);
        pad.press(2);
        pad.set_hat(0, Some(HatPosition::Left));
        assert_eq!(pad.read_axis(0), -5000);
        assert!(pad.read_button(2));
        assert_eq!(pad.read_hat(0), Some(HatPosition::Left));
        pad.release_all();
        assert_eq!(pad.read_axis(0), 0);
        assert!(!pad.read_button(2));
        assert_eq!(pad.read_hat(0), None);
    }

    #[test]
    fn out_of_range_components_read_neutral() {
        let pad = VirtualPad::joystick(1, "g", "p", 1, 1, 0);
        assert_eq!(pad.read_axis(9), 0);
        assert!(!pad.read_button(9));
        assert_eq!(pad.read_hat(0), None);
    }

    #[test]
    fn gamepad_shape_matches_standard_layout() {
        let pad = VirtualPad::gamepad(3, "gp", "pad");
        assert_eq!(pad.num_axes(), 6);
        assert_eq!(pad.num_buttons(), 15);
        assert_eq!(pad.num_hats(), 0);
        assert!(pad.prefers_gamepad_default());
        assert!(!pad.prefers_axial_default());
        assert!(pad.neutral_points_known());
    }

    #[test]
    fn unplug_detaches_and_hides_from_enumeration() {
        let bus = VirtualBus::new();
        let pad = VirtualPad::joystick(4, "g", "p", 2, 2, 0);
        bus.plug(pad.clone());
        assert_eq!(bus.device_count(), 1);
        bus.unplug(4);
        assert_eq!(bus.device_count(), 0);
        assert!(!pad.attached());
    }
}
