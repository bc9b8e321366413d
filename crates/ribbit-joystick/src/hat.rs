/// One of the eight non-centered compass positions a hat can report.
///
/// What the driver calls a hat is often a d-pad. Players think of a d-pad
/// as a pair of digital axes, but the hardware reports 'up-left' as an
/// atomic position that is mutually exclusive with 'up' and 'left'. So a
/// signal that wants 'left' also has to accept the two clockwise-adjacent
/// diagonals, `clockwise_front` and `clockwise_back`.
///
/// A centered hat is represented as `None` at the read boundary; it is
/// never a valid target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatPosition {
    Up,
    RightUp,
    Right,
    RightDown,
    Down,
    LeftDown,
    Left,
    LeftUp,
}

impl HatPosition {
    /// All positions, clockwise from `Up`.
    pub const COMPASS: [HatPosition; 8] = [
        HatPosition::Up,
        HatPosition::RightUp,
        HatPosition::Right,
        HatPosition::RightDown,
        HatPosition::Down,
        HatPosition::LeftDown,
        HatPosition::Left,
        HatPosition::LeftUp,
    ];

    /// Raw wire encoding (the SDL hat bitmask values).
    pub fn to_raw(self) -> u8 {
        match self {
            HatPosition::Up => 0x01,
            HatPosition::Right => 0x02,
            HatPosition::Down => 0x04,
            HatPosition::Left => 0x08,
            HatPosition::RightUp => 0x03,
            HatPosition::RightDown => 0x06,
            HatPosition::LeftUp => 0x09,
            HatPosition::LeftDown => 0x0c,
        }
    }

    /// Decodes a raw hat value. Returns `None` for centered (0) and for
    /// encodings that are not one of the eight compass positions.
    pub fn from_raw(raw: u8) -> Option<HatPosition> {
        match raw {
            0x01 => Some(HatPosition::Up),
            0x02 => Some(HatPosition::Right),
            0x04 => Some(HatPosition::Down),
            0x08 => Some(HatPosition::Left),
            0x03 => Some(HatPosition::RightUp),
            0x06 => Some(HatPosition::RightDown),
            0x09 => Some(HatPosition::LeftUp),
            0x0c => Some(HatPosition::LeftDown),
            _ => None,
        }
    }

    /// The position one step in front of this one, looking clockwise
    /// round the hat. For `Left`, that is `LeftUp`.
    pub fn clockwise_front(self) -> HatPosition {
        match self {
            HatPosition::Right => HatPosition::RightDown,
            HatPosition::RightDown => HatPosition::Down,
            HatPosition::Down => HatPosition::LeftDown,
            HatPosition::LeftDown => HatPosition::Left,
            HatPosition::Left => HatPosition::LeftUp,
            HatPosition::LeftUp => HatPosition::Up,
            HatPosition::Up => HatPosition::RightUp,
            HatPosition::RightUp => HatPosition::Right,
        }
    }

    /// The position one step behind this one, looking clockwise round the
    /// hat. For `Left`, that is `LeftDown`.
    pub fn clockwise_back(self) -> HatPosition {
        match self {
            HatPosition::Right => HatPosition::RightUp,
            HatPosition::RightUp => HatPosition::Up,
            HatPosition::Up => HatPosition::LeftUp,
            HatPosition::LeftUp => HatPosition::Left,
            HatPosition::Left => HatPosition::LeftDown,
            HatPosition::LeftDown => HatPosition::Down,
            HatPosition::Down => HatPosition::RightDown,
            HatPosition::RightDown => HatPosition::Right,
        }
    }
}
