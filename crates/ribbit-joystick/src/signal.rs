use log::warn;

use crate::device::DeviceHandle;
use crate::hat::HatPosition;

/// Half-width of the dead pad around an axis's neutral point. An axis
/// within this distance of neutral is never considered active.
pub const SMALL_MAG: i32 = 4096;

/// Range bound safely beyond any raw value the hardware can report.
pub const LARGE_MAG: i32 = 1_000_000;

/// Component kinds a controller exposes, with their persisted codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Axis = 0,
    Button = 1,
    Hat = 2,
}

impl PartKind {
    /// Persisted integer code.
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<PartKind> {
        match code {
            0 => Some(PartKind::Axis),
            1 => Some(PartKind::Button),
            2 => Some(PartKind::Hat),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PartKind::Axis => "axis",
            PartKind::Button => "button",
            PartKind::Hat => "hat",
        }
    }
}

/// The persistable form of one real controller signal: kind, component id
/// and two data fields whose meaning depends on the kind. For an axis,
/// data0/data1 are the inclusive low/high range bounds; for a hat, data0
/// is the raw target position; for a button both are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSpec {
    pub kind: PartKind,
    pub id: u8,
    pub data0: i32,
    pub data1: i32,
}

impl SignalSpec {
    pub fn axis(id: u8, low: i32, high: i32) -> SignalSpec {
        SignalSpec { kind: PartKind::Axis, id, data0: low, data1: high }
    }

    pub fn button(id: u8) -> SignalSpec {
        SignalSpec { kind: PartKind::Button, id, data0: 0, data1: 0 }
    }

    pub fn hat(id: u8, target: HatPosition) -> SignalSpec {
        SignalSpec {
            kind: PartKind::Hat,
            id,
            data0: i32::from(target.to_raw()),
            data1: 0,
        }
    }
}

/// One way of pressing a particular controller: an axis pushed into a
/// range, a button held, a hat in a position, or either of two of those.
///
/// Unions (`Either`) only appear in heuristically built default maps, for
/// redundant coverage; they are never persisted directly. Persistence
/// goes through [`ControllerSignal::spec`], which collapses a union to
/// its left-most real leaf.
pub enum ControllerSignal {
    Axis { device: DeviceHandle, id: u8, low: i32, high: i32 },
    Button { device: DeviceHandle, id: u8 },
    Hat { device: DeviceHandle, id: u8, target: HatPosition },
    Either { primary: Box<ControllerSignal>, secondary: Box<ControllerSignal> },
}

impl ControllerSignal {
    /// Builds a real signal on `device` from its persisted form.
    ///
    /// A hat target that decodes to centered (or garbage) is not a valid
    /// signal; it is coerced to `Left` with a warning, as the original
    /// configuration code did.
    pub fn make(device: DeviceHandle, spec: SignalSpec) -> ControllerSignal {
        match spec.kind {
            PartKind::Axis => ControllerSignal::Axis {
                device,
                id: spec.id,
                low: spec.data0,
                high: spec.data1,
            },
            PartKind::Button => ControllerSignal::Button { device, id: spec.id },
            PartKind::Hat => {
                let target = match u8::try_from(spec.data0)
                    .ok()
                    .and_then(HatPosition::from_raw)
                {
                    Some(target) => target,
                    None => {
                        warn!(
                            "hat position {} is not a valid signal target, using left",
                            spec.data0
                        );
                        HatPosition::Left
                    }
                };
                ControllerSignal::Hat { device, id: spec.id, target }
            }
        }
    }

    pub fn either(
        primary: ControllerSignal,
        secondary: ControllerSignal,
    ) -> ControllerSignal {
        ControllerSignal::Either {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }

    /// Whether the player is currently pressing this signal.
    pub fn is_firing(&self) -> bool {
        match self {
            ControllerSignal::Axis { device, id, low, high } => {
                let raw = i32::from(device.read_axis(*id));
                *low <= raw && raw <= *high
            }
            ControllerSignal::Button { device, id } => device.read_button(*id),
            ControllerSignal::Hat { device, id, target } => {
                match device.read_hat(*id) {
                    Some(position) => {
                        position == *target
                            || position == target.clockwise_front()
                            || position == target.clockwise_back()
                    }
                    None => false,
                }
            }
            ControllerSignal::Either { primary, secondary } => {
                primary.is_firing() || secondary.is_firing()
            }
        }
    }

    /// The canonical persistable form of this signal. For a union this
    /// descends to the left-most real leaf.
    pub fn spec(&self) -> SignalSpec {
        match self {
            ControllerSignal::Axis { id, low, high, .. } => {
                SignalSpec::axis(*id, *low, *high)
            }
            ControllerSignal::Button { id, .. } => SignalSpec::button(*id),
            ControllerSignal::Hat { id, target, .. } => SignalSpec::hat(*id, *target),
            ControllerSignal::Either { primary, .. } => primary.spec(),
        }
    }
}

/// Whether two captured signals would fight over the same physical input.
///
/// Signals of different kinds or component ids never clash. Buttons clash
/// on id alone; hats clash when their target positions are identical;
/// axes clash when either range reaches into the other, tested in both
/// directions.
pub fn clashes(a: &SignalSpec, b: &SignalSpec) -> bool {
    if a.kind != b.kind || a.id != b.id {
        return false;
    }
    match a.kind {
        PartKind::Button => true,
        PartKind::Hat => a.data0 == b.data0,
        PartKind::Axis => {
            let in_a = |v| a.data0 <= v && v <= a.data1;
            let in_b = |v| b.data0 <= v && v <= b.data1;
            in_a(b.data0) || in_a(b.data1) || in_b(a.data0) || in_b(a.data1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::virt::VirtualPad;

    #[test]
    fn axis_fires_inside_inclusive_range_only() {
        let pad = VirtualPad::joystick(1, "g", "p", 2, 0, 0);
        let signal =
            ControllerSignal::make(pad.clone(), SignalSpec::axis(0, SMALL_MAG, LARGE_MAG));
        pad.set_axis(0, SMALL_MAG as i16 - 1);
        assert!(!signal.is_firing());
        pad.set_axis(0, SMALL_MAG as i16);
        assert!(signal.is_firing());
        pad.set_axis(0, i16::MAX);
        assert!(signal.is_firing());
        pad.set_axis(0, -SMALL_MAG as i16);
        assert!(!signal.is_firing());
    }

    #[test]
    fn degenerate_axis_range_never_fires() {
        let pad = VirtualPad::joystick(1, "g", "p", 1, 0, 0);
        let signal = ControllerSignal::make(pad.clone(), SignalSpec::axis(0, 100, -100));
        for raw in [-200i16, -100, 0, 100, 200] {
            pad.set_axis(0, raw);
            assert!(!signal.is_firing());
        }
    }

    #[test]
    fn button_fires_while_held() {
        let pad = VirtualPad::joystick(1, "g", "p", 0, 2, 0);
        let signal = ControllerSignal::make(pad.clone(), SignalSpec::button(1));
        assert!(!signal.is_firing());
        pad.press(1);
        assert!(signal.is_firing());
        pad.release(1);
        assert!(!signal.is_firing());
    }

    #[test]
    fn hat_fires_on_target_and_clockwise_neighbours() {
        let pad = VirtualPad::joystick(1, "g", "p", 0, 0, 1);
        let signal =
            ControllerSignal::make(pad.clone(), SignalSpec::hat(0, HatPosition::Left));
        for position in HatPosition::COMPASS {
            pad.set_hat(0, Some(position));
            let expected = matches!(
                position,
                HatPosition::Left | HatPosition::LeftUp | HatPosition::LeftDown
            );
            assert_eq!(signal.is_firing(), expected, "position {position:?}");
        }
        pad.set_hat(0, None);
        assert!(!signal.is_firing());
    }

    #[test]
    fn centered_hat_target_coerces_to_left() {
        let pad = VirtualPad::joystick(1, "g", "p", 0, 0, 1);
        let spec = SignalSpec { kind: PartKind::Hat, id: 0, data0: 0, data1: 0 };
        let signal = ControllerSignal::make(pad.clone(), spec);
        assert_eq!(signal.spec(), SignalSpec::hat(0, HatPosition::Left));
    }

    #[test]
    fn either_is_logical_or_of_children() {
        let pad = VirtualPad::joystick(1, "g", "p", 1, 1, 0);
        let union = ControllerSignal::either(
            ControllerSignal::make(pad.clone(), SignalSpec::button(0)),
            ControllerSignal::make(pad.clone(), SignalSpec::axis(0, SMALL_MAG, LARGE_MAG)),
        );
        assert!(!union.is_firing());
        pad.press(0);
        assert!(union.is_firing());
        pad.set_axis(0, i16::MAX);
        assert!(union.is_firing());
        pad.release(0);
        assert!(union.is_firing());
        pad.set_axis(0, 0);
        assert!(!union.is_firing());
    }

    #[test]
    fn either_realizes_to_leftmost_leaf() {
        let pad = VirtualPad::joystick(1, "g", "p", 1, 2, 0);
        let union = ControllerSignal::either(
            ControllerSignal::either(
                ControllerSignal::make(pad.clone(), SignalSpec::button(1)),
                ControllerSignal::make(pad.clone(), SignalSpec::button(0)),
            ),
            ControllerSignal::make(pad.clone(), SignalSpec::axis(0, SMALL_MAG, LARGE_MAG)),
        );
        assert_eq!(union.spec(), SignalSpec::button(1));
    }

    #[test]
    fn clash_rules_per_kind() {
        // Buttons clash on id alone.
        assert!(clashes(&SignalSpec::button(3), &SignalSpec::button(3)));
        assert!(!clashes(&SignalSpec::button(3), &SignalSpec::button(4)));
        // Different kinds never clash, even on the same id.
        assert!(!clashes(&SignalSpec::button(0), &SignalSpec::hat(0, HatPosition::Up)));
        // Hats clash only on identical targets.
        assert!(clashes(
            &SignalSpec::hat(0, HatPosition::Up),
            &SignalSpec::hat(0, HatPosition::Up)
        ));
        assert!(!clashes(
            &SignalSpec::hat(0, HatPosition::Up),
            &SignalSpec::hat(0, HatPosition::Down)
        ));
        // Axes clash when ranges overlap, not when disjoint.
        assert!(clashes(
            &SignalSpec::axis(0, SMALL_MAG, LARGE_MAG),
            &SignalSpec::axis(0, SMALL_MAG, LARGE_MAG)
        ));
        assert!(!clashes(
            &SignalSpec::axis(0, SMALL_MAG, LARGE_MAG),
            &SignalSpec::axis(0, -LARGE_MAG, -SMALL_MAG)
        ));
        // One range swallowing the other still clashes.
        assert!(clashes(
            &SignalSpec::axis(0, -LARGE_MAG, LARGE_MAG),
            &SignalSpec::axis(0, 0, 10)
        ));
    }

    #[test]
    fn clash_is_symmetric() {
        let specs = [
            SignalSpec::button(0),
            SignalSpec::button(1),
            SignalSpec::axis(0, SMALL_MAG, LARGE_MAG),
            SignalSpec::axis(0, -LARGE_MAG, -SMALL_MAG),
            SignalSpec::axis(0, -LARGE_MAG, LARGE_MAG),
            SignalSpec::axis(1, 0, 10),
            SignalSpec::hat(0, HatPosition::Up),
            SignalSpec::hat(0, HatPosition::Left),
            SignalSpec::hat(1, HatPosition::Up),
        ];
        for a in &specs {
            for b in &specs {
                assert_eq!(clashes(a, b), clashes(b, a), "{a:?} vs {b:?}");
            }
        }
    }
}
