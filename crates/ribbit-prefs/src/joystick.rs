use log::warn;

use ribbit_joystick::{
    Control, HatPosition, PartKind, SavedBindings, SignalSpec, LARGE_MAG, NUM_CONTROLS,
    SMALL_MAG,
};

use crate::store::PrefStore;

const USE_JOYSTICK: &str = "use_joystick";
const CHOSEN_GUID: &str = "chosen_joystick_guid";
const CHOSEN_NAME: &str = "chosen_joystick_name";
const CONFIGURED_GUID: &str = "configured_joystick_guid";
const CONFIGURED_NAME: &str = "configured_joystick_name";

/// The persisted joystick settings: whether the player wants joystick
/// input at all, which device model they chose last, and the configuration
/// captured for it (one signal per control, keyed by the model GUID it was
/// captured on).
///
/// Reading never fails: absent keys fall back to per-control defaults and
/// present-but-corrupt values are coerced to the nearest valid one, so a
/// hand-edited or truncated file degrades instead of wedging input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoystickPrefs {
    pub use_joystick: bool,
    pub chosen_joystick_guid: String,
    pub chosen_joystick_name: String,
    pub configured_joystick_guid: String,
    pub configured_joystick_name: String,
    pub parts: [SignalSpec; NUM_CONTROLS],
}

impl Default for JoystickPrefs {
    fn default() -> Self {
        let mut parts = [SignalSpec::button(0); NUM_CONTROLS];
        for control in Control::ALL {
            let kind = default_kind(control);
            parts[control.index()] = SignalSpec {
                kind,
                id: default_id(control, kind),
                data0: default_data0(control, kind),
                data1: default_data1(control, kind),
            };
        }
        JoystickPrefs {
            use_joystick: true,
            chosen_joystick_guid: String::new(),
            chosen_joystick_name: String::new(),
            configured_joystick_guid: String::new(),
            configured_joystick_name: String::new(),
            parts,
        }
    }
}

impl JoystickPrefs {
    pub fn read(store: &PrefStore) -> JoystickPrefs {
        let mut prefs = JoystickPrefs {
            use_joystick: store.get_bool(USE_JOYSTICK).unwrap_or(true),
            chosen_joystick_guid: read_string(store, CHOSEN_GUID),
            chosen_joystick_name: read_string(store, CHOSEN_NAME),
            configured_joystick_guid: read_string(store, CONFIGURED_GUID),
            configured_joystick_name: read_string(store, CONFIGURED_NAME),
            ..JoystickPrefs::default()
        };
        for control in Control::ALL {
            prefs.parts[control.index()] = read_part(store, control);
        }
        prefs
    }

    pub fn write(&self, store: &mut PrefStore) {
        store.set_bool(USE_JOYSTICK, self.use_joystick);
        store.set_str(CHOSEN_GUID, &self.chosen_joystick_guid);
        store.set_str(CHOSEN_NAME, &self.chosen_joystick_name);
        store.set_str(CONFIGURED_GUID, &self.configured_joystick_guid);
        store.set_str(CONFIGURED_NAME, &self.configured_joystick_name);
        for control in Control::ALL {
            let part = self.parts[control.index()];
            store.set_i64(&part_key(control, "kind"), part.kind.code());
            store.set_i64(&part_key(control, "id"), i64::from(part.id));
            store.set_i64(&part_key(control, "data0"), i64::from(part.data0));
            store.set_i64(&part_key(control, "data1"), i64::from(part.data1));
        }
    }

    /// The captured configuration as loadable bindings, or `None` when no
    /// capture has ever been saved.
    pub fn saved_bindings(&self) -> Option<SavedBindings> {
        if self.configured_joystick_guid.is_empty() {
            return None;
        }
        Some(SavedBindings {
            guid: self.configured_joystick_guid.clone(),
            parts: self.parts,
        })
    }
}

fn read_string(store: &PrefStore, key: &str) -> String {
    store.get_str(key).unwrap_or_default().to_string()
}

fn part_key(control: Control, field: &str) -> String {
    format!("{}_part_{field}", control.name())
}

fn read_part(store: &PrefStore, control: Control) -> SignalSpec {
    let kind = match store.get_i64(&part_key(control, "kind")) {
        Some(raw) => validate_kind(raw),
        None => default_kind(control),
    };
    let id = match store.get_i64(&part_key(control, "id")) {
        Some(raw) => validate_id(raw),
        None => default_id(control, kind),
    };
    let data0 = match store.get_i64(&part_key(control, "data0")) {
        Some(raw) => validate_data0(raw, kind),
        None => default_data0(control, kind),
    };
    let data1 = match store.get_i64(&part_key(control, "data1")) {
        Some(raw) => validate_data1(raw),
        None => default_data1(control, kind),
    };
    SignalSpec { kind, id, data0, data1 }
}

/// Coerces a persisted kind code to a valid kind. Garbage becomes a
/// button, the least harmful kind to misread.
pub fn validate_kind(raw: i64) -> PartKind {
    PartKind::from_code(raw).unwrap_or_else(|| {
        warn!("{raw} is not a component kind, treating it as a button");
        PartKind::Button
    })
}

/// Coerces a persisted component id into the valid range; out-of-range
/// ids become component zero.
pub fn validate_id(raw: i64) -> u8 {
    u8::try_from(raw).unwrap_or_else(|_| {
        warn!("component id {raw} is out of range, using 0");
        0
    })
}

/// Coerces the first data field. For a hat this must decode to a real
/// position (right, when it does not); for anything else it is clamped to
/// the representable range.
pub fn validate_data0(raw: i64, kind: PartKind) -> i32 {
    match kind {
        PartKind::Hat => match u8::try_from(raw).ok().and_then(HatPosition::from_raw) {
            Some(position) => i32::from(position.to_raw()),
            None => {
                warn!("{raw} is not a hat position, using right");
                i32::from(HatPosition::Right.to_raw())
            }
        },
        PartKind::Axis | PartKind::Button => clamp_i32(raw),
    }
}

/// Coerces the second data field into the representable range.
pub fn validate_data1(raw: i64) -> i32 {
    clamp_i32(raw)
}

fn clamp_i32(raw: i64) -> i32 {
    i32::try_from(raw.clamp(i64::from(i32::MIN), i64::from(i32::MAX)))
        .unwrap_or_default()
}

/// Default component kind per control: directions on the primary stick,
/// actions on buttons.
pub fn default_kind(control: Control) -> PartKind {
    match control {
        Control::Up | Control::Down | Control::Left | Control::Right => PartKind::Axis,
        Control::Attack | Control::Jump | Control::Tongue => PartKind::Button,
    }
}

/// Default component id per control and kind.
pub fn default_id(control: Control, kind: PartKind) -> u8 {
    match kind {
        PartKind::Axis => match control {
            Control::Up | Control::Down => 1,
            Control::Left | Control::Right => 0,
            Control::Attack => 2,
            Control::Jump => 3,
            Control::Tongue => 4,
        },
        PartKind::Button => match control {
            Control::Up => 3,
            Control::Down => 4,
            Control::Left => 5,
            Control::Right => 6,
            Control::Attack => 0,
            Control::Jump => 1,
            Control::Tongue => 2,
        },
        PartKind::Hat => match control {
            Control::Up | Control::Down | Control::Left | Control::Right => 0,
            Control::Attack | Control::Jump | Control::Tongue => 1,
        },
    }
}

/// Default first data field per control and kind: the low range bound for
/// an axis, the target position for a hat.
pub fn default_data0(control: Control, kind: PartKind) -> i32 {
    match kind {
        PartKind::Axis => match control {
            Control::Down | Control::Right => SMALL_MAG,
            _ => -LARGE_MAG,
        },
        PartKind::Button => 0,
        PartKind::Hat => {
            let position = match control {
                Control::Up | Control::Tongue => HatPosition::Up,
                Control::Down | Control::Attack => HatPosition::Down,
                Control::Left => HatPosition::Left,
                Control::Right | Control::Jump => HatPosition::Right,
            };
            i32::from(position.to_raw())
        }
    }
}

/// Default second data field per control and kind: the high range bound
/// for an axis, zero otherwise.
pub fn default_data1(control: Control, kind: PartKind) -> i32 {
    match kind {
        PartKind::Axis => match control {
            Control::Down | Control::Right => LARGE_MAG,
            _ => -SMALL_MAG,
        },
        PartKind::Button | PartKind::Hat => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_reads_as_defaults() {
        let prefs = JoystickPrefs::read(&PrefStore::new());
        assert_eq!(prefs, JoystickPrefs::default());
        assert!(prefs.use_joystick);
        assert_eq!(prefs.saved_bindings(), None);

        let up = prefs.parts[Control::Up.index()];
        assert_eq!(up, SignalSpec::axis(1, -LARGE_MAG, -SMALL_MAG));
        let attack = prefs.parts[Control::Attack.index()];
        assert_eq!(attack, SignalSpec::button(0));
    }

    #[test]
    fn round_trips_through_a_store() {
        let mut prefs = JoystickPrefs::default();
        prefs.use_joystick = false;
        prefs.chosen_joystick_guid = "model-x".to_string();
        prefs.chosen_joystick_name = "Model X".to_string();
        prefs.configured_joystick_guid = "model-x".to_string();
        prefs.configured_joystick_name = "Model X".to_string();
        prefs.parts[Control::Jump.index()] = SignalSpec::hat(0, HatPosition::RightUp);

        let mut store = PrefStore::new();
        prefs.write(&mut store);
        let store = PrefStore::parse(&store.to_yaml().unwrap()).unwrap();
        assert_eq!(JoystickPrefs::read(&store), prefs);
        assert!(JoystickPrefs::read(&store).saved_bindings().is_some());
    }

    #[test]
    fn corrupt_values_are_coerced_not_fatal() {
        let mut store = PrefStore::new();
        store.set_i64("up_part_kind", 99);
        store.set_i64("up_part_id", -7);
        store.set_i64("jump_part_kind", 2);
        store.set_i64("jump_part_data0", 77); // not a hat position
        store.set_i64("attack_part_data0", i64::MAX);

        let prefs = JoystickPrefs::read(&store);
        let up = prefs.parts[Control::Up.index()];
        assert_eq!(up.kind, PartKind::Button);
        assert_eq!(up.id, 0);

        let jump = prefs.parts[Control::Jump.index()];
        assert_eq!(jump.kind, PartKind::Hat);
        assert_eq!(jump.data0, i32::from(HatPosition::Right.to_raw()));

        let attack = prefs.parts[Control::Attack.index()];
        assert_eq!(attack.data0, i32::MAX);
    }

    #[test]
    fn validators_pass_good_values_through() {
        assert_eq!(validate_kind(0), PartKind::Axis);
        assert_eq!(validate_kind(2), PartKind::Hat);
        assert_eq!(validate_id(255), 255);
        assert_eq!(validate_id(256), 0);
        assert_eq!(
            validate_data0(i64::from(HatPosition::LeftDown.to_raw()), PartKind::Hat),
            i32::from(HatPosition::LeftDown.to_raw())
        );
        assert_eq!(validate_data0(-123_456, PartKind::Axis), -123_456);
        assert_eq!(validate_data1(i64::MIN), i32::MIN);
    }
}
