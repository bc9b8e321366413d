use log::warn;

use crate::controls::{Control, NUM_CONTROLS};
use crate::device::DeviceHandle;
use crate::signal::{clashes, SignalSpec, LARGE_MAG, SMALL_MAG};
use crate::{Error, Result};

/// What one polling pass of a capture session observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Nothing activated; keep polling.
    StillListening,
    /// A signal activated but clashes with an earlier capture; nothing was
    /// recorded.
    Duplicate,
    /// A signal was recorded and the session moved to the next control.
    Advanced,
    /// The last control was just captured; the session is complete.
    AllDone,
}

/// An interactive capture session: walks the seven controls in order,
/// recording one real signal for each as the player presses it.
///
/// The session works against neutral zones, one `(low, high)` span per
/// axis, observed while the player holds the device still. An axis only
/// counts as deliberately pushed once it travels a full dead-pad width
/// beyond its observed neutral span.
pub struct Configurer {
    device: DeviceHandle,
    slot: usize,
    zones: Vec<(i32, i32)>,
    candidate: [Option<SignalSpec>; NUM_CONTROLS],
}

impl Configurer {
    pub fn new(device: DeviceHandle) -> Configurer {
        let zones = vec![(0, 0); device.num_axes() as usize];
        Configurer {
            device,
            slot: 0,
            zones,
            candidate: [None; NUM_CONTROLS],
        }
    }

    pub fn device(&self) -> DeviceHandle {
        self.device.clone()
    }

    /// Whether the device's axes are known to rest at zero, making
    /// calibration unnecessary.
    pub fn neutral_zones_known(&self) -> bool {
        self.device.neutral_points_known()
    }

    /// Resets every zone to an empty span, ready for a fresh observation
    /// pass.
    pub fn clear_neutral_zones(&mut self) {
        for zone in &mut self.zones {
            *zone = (i32::MAX, i32::MIN);
        }
    }

    /// One observation pass: widens each axis's zone to cover its current
    /// raw value. Run every tick while the player holds the device still.
    pub fn tick_neutral_zones(&mut self) {
        for (id, zone) in self.zones.iter_mut().enumerate() {
            let raw = i32::from(self.device.read_axis(id as u8));
            zone.0 = zone.0.min(raw);
            zone.1 = zone.1.max(raw);
        }
    }

    /// Whether any observed zone is so wide that deliberate pushes could
    /// not be told apart from drift.
    pub fn neutral_zones_dangerous(&self) -> bool {
        self.zones
            .iter()
            .any(|&(low, high)| low <= high && high - low >= SMALL_MAG)
    }

    /// Assumes every axis rests exactly at zero. Used for devices whose
    /// neutral points are known, or when the player skips calibration.
    pub fn use_default_neutral_zones(&mut self) {
        for zone in &mut self.zones {
            *zone = (0, 0);
        }
    }

    fn zone(&self, id: usize) -> (i32, i32) {
        match self.zones.get(id) {
            // A zone nothing was ever observed into falls back to zero.
            Some(&(low, high)) if low <= high => (low, high),
            _ => (0, 0),
        }
    }

    /// One polling pass while waiting for the player to press something
    /// for the current control.
    ///
    /// Components are scanned in a fixed order (axes, then buttons, then
    /// hats) and the first active one wins, so a player mashing two things
    /// at once gets a deterministic answer. A signal that clashes with an
    /// earlier capture is reported and discarded rather than recorded.
    pub fn listen_for_signal(&mut self) -> ListenOutcome {
        if self.finished() {
            warn!("capture session polled after completion");
            return ListenOutcome::AllDone;
        }

        let Some(spec) = self.scan() else {
            return ListenOutcome::StillListening;
        };

        if self.candidate[..self.slot]
            .iter()
            .any(|earlier| earlier.is_some_and(|earlier| clashes(&earlier, &spec)))
        {
            return ListenOutcome::Duplicate;
        }

        self.candidate[self.slot] = Some(spec);
        self.slot += 1;
        if self.finished() {
            ListenOutcome::AllDone
        } else {
            ListenOutcome::Advanced
        }
    }

    fn scan(&self) -> Option<SignalSpec> {
        for id in 0..self.device.num_axes() {
            let (low, high) = self.zone(id as usize);
            let raw = i32::from(self.device.read_axis(id as u8));
            let id = id as u8;
            if raw >= high + SMALL_MAG {
                return Some(SignalSpec::axis(id, high + SMALL_MAG, LARGE_MAG));
            }
            if raw <= low - SMALL_MAG {
                return Some(SignalSpec::axis(id, -LARGE_MAG, low - SMALL_MAG));
            }
        }
        for id in 0..self.device.num_buttons() {
            if self.device.read_button(id as u8) {
                return Some(SignalSpec::button(id as u8));
            }
        }
        for id in 0..self.device.num_hats() {
            if let Some(position) = self.device.read_hat(id as u8) {
                return Some(SignalSpec::hat(id as u8, position));
            }
        }
        None
    }

    /// Steps back to the previous control, discarding its capture. False
    /// when already at the first control.
    pub fn back(&mut self) -> bool {
        if self.slot == 0 {
            return false;
        }
        self.slot -= 1;
        self.candidate[self.slot] = None;
        true
    }

    pub fn finished(&self) -> bool {
        self.slot == NUM_CONTROLS
    }

    /// The control currently being captured, or `None` once finished.
    pub fn current_control(&self) -> Option<Control> {
        Control::from_index(self.slot)
    }

    /// The captured signals, once the session is complete.
    pub fn bindings(&self) -> Result<[SignalSpec; NUM_CONTROLS]> {
        if !self.finished() {
            return Err(Error::NotFinished);
        }
        let mut parts = [SignalSpec::button(0); NUM_CONTROLS];
        for (slot, captured) in parts.iter_mut().zip(&self.candidate) {
            *slot = captured.expect("finished session has every slot filled");
        }
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::virt::VirtualPad;
    use crate::hat::HatPosition;

    #[test]
    fn scripted_session_captures_all_controls() {
        let pad = VirtualPad::joystick(1, "g", "pad", 2, 4, 1);
        let mut session = Configurer::new(pad.clone());
        session.use_default_neutral_zones();

        assert_eq!(session.current_control(), Some(Control::Up));
        assert_eq!(session.listen_for_signal(), ListenOutcome::StillListening);

        // Directions: stick up/down, hat left/right.
        pad.set_axis(1, -(SMALL_MAG as i16));
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
        pad.release_all();
        pad.set_axis(1, SMALL_MAG as i16);
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
        pad.release_all();
        pad.set_hat(0, Some(HatPosition::Left));
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
        pad.set_hat(0, Some(HatPosition::Right));
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
        pad.release_all();

        // Actions on three buttons.
        for button in [0u8, 1, 3] {
            pad.release_all();
            pad.press(button);
            let outcome = session.listen_for_signal();
            if button == 3 {
                assert_eq!(outcome, ListenOutcome::AllDone);
            } else {
                assert_eq!(outcome, ListenOutcome::Advanced);
            }
        }

        assert!(session.finished());
        assert_eq!(session.current_control(), None);
        let parts = session.bindings().unwrap();
        assert_eq!(parts[0], SignalSpec::axis(1, -LARGE_MAG, -SMALL_MAG));
        assert_eq!(parts[1], SignalSpec::axis(1, SMALL_MAG, LARGE_MAG));
        assert_eq!(parts[2], SignalSpec::hat(0, HatPosition::Left));
        assert_eq!(parts[3], SignalSpec::hat(0, HatPosition::Right));
        assert_eq!(parts[4], SignalSpec::button(0));
        assert_eq!(parts[5], SignalSpec::button(1));
        assert_eq!(parts[6], SignalSpec::button(3));
    }

    #[test]
    fn clashing_signal_is_rejected_without_advancing() {
        let pad = VirtualPad::joystick(1, "g", "pad", 0, 4, 0);
        let mut session = Configurer::new(pad.clone());
        session.use_default_neutral_zones();

        pad.press(0);
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
        // Still holding the same button for the next control.
        assert_eq!(session.listen_for_signal(), ListenOutcome::Duplicate);
        assert_eq!(session.current_control(), Some(Control::Down));

        pad.release(0);
        pad.press(1);
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
    }

    #[test]
    fn bindings_before_completion_is_an_error() {
        let pad = VirtualPad::joystick(1, "g", "pad", 0, 1, 0);
        let session = Configurer::new(pad);
        assert!(matches!(session.bindings(), Err(Error::NotFinished)));
    }

    #[test]
    fn back_reopens_the_previous_slot() {
        let pad = VirtualPad::joystick(1, "g", "pad", 0, 4, 0);
        let mut session = Configurer::new(pad.clone());
        session.use_default_neutral_zones();

        assert!(!session.back());

        pad.press(0);
        session.listen_for_signal();
        pad.release(0);
        assert_eq!(session.current_control(), Some(Control::Down));

        assert!(session.back());
        assert_eq!(session.current_control(), Some(Control::Up));
        // The slot is free again, so the same button no longer clashes.
        pad.press(0);
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);
    }

    #[test]
    fn axis_must_clear_the_observed_zone_by_a_dead_pad() {
        let pad = VirtualPad::joystick(1, "g", "drifty", 1, 0, 0);
        let mut session = Configurer::new(pad.clone());

        session.clear_neutral_zones();
        pad.set_axis(0, -200);
        session.tick_neutral_zones();
        pad.set_axis(0, 300);
        session.tick_neutral_zones();
        assert!(!session.neutral_zones_dangerous());

        pad.set_axis(0, 300 + SMALL_MAG as i16 - 1);
        assert_eq!(session.listen_for_signal(), ListenOutcome::StillListening);
        pad.set_axis(0, 300 + SMALL_MAG as i16);
        assert_eq!(session.listen_for_signal(), ListenOutcome::Advanced);

        let mut parts = session.candidate;
        let captured = parts[0].take().unwrap();
        assert_eq!(captured, SignalSpec::axis(0, 300 + SMALL_MAG, LARGE_MAG));
    }

    #[test]
    fn wide_neutral_zone_is_flagged_dangerous() {
        let pad = VirtualPad::joystick(1, "g", "broken", 1, 0, 0);
        let mut session = Configurer::new(pad.clone());

        session.clear_neutral_zones();
        pad.set_axis(0, 0);
        session.tick_neutral_zones();
        pad.set_axis(0, SMALL_MAG as i16);
        session.tick_neutral_zones();
        assert!(session.neutral_zones_dangerous());

        session.use_default_neutral_zones();
        assert!(!session.neutral_zones_dangerous());
    }

    #[test]
    fn axes_win_over_buttons_when_both_active() {
        let pad = VirtualPad::joystick(1, "g", "pad", 1, 1, 0);
        let mut session = Configurer::new(pad.clone());
        session.use_default_neutral_zones();

        pad.press(0);
        pad.set_axis(0, SMALL_MAG as i16);
        session.listen_for_signal();
        assert_eq!(
            session.candidate[0],
            Some(SignalSpec::axis(0, SMALL_MAG, LARGE_MAG))
        );
    }
}
