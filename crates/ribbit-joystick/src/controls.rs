/// Number of logical in-game controls.
pub const NUM_CONTROLS: usize = 7;

/// The seven fixed in-game actions a controller can be mapped to.
///
/// Buttons 0, 1 and 2 of the outer query surface correspond to `Attack`,
/// `Jump` and `Tongue` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    Attack,
    Jump,
    Tongue,
}

impl Control {
    /// All controls in capture/persistence order.
    pub const ALL: [Control; NUM_CONTROLS] = [
        Control::Up,
        Control::Down,
        Control::Left,
        Control::Right,
        Control::Attack,
        Control::Jump,
        Control::Tongue,
    ];

    /// Slot index of this control in the 7-slot signal map.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Control for a slot index, if the index is in range.
    pub fn from_index(index: usize) -> Option<Control> {
        Control::ALL.get(index).copied()
    }

    /// Lowercase name, used for preference keys and user prompts.
    pub fn name(self) -> &'static str {
        match self {
            Control::Up => "up",
            Control::Down => "down",
            Control::Left => "left",
            Control::Right => "right",
            Control::Attack => "attack",
            Control::Jump => "jump",
            Control::Tongue => "tongue",
        }
    }
}
