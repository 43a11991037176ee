//! D8 flow-direction codec.
//!
//! Bit-flag encoding, clockwise from east:
//!
//! ```text
//!  32  64 128
//!  16   0   1
//!   8   4   2
//! ```
//!
//! `0` marks a pit. Every other component goes through [`decode`] and
//! [`Direction::offset`]; none of them carries its own offset table.

pub const D8_E: u8 = 1;
pub const D8_SE: u8 = 2;
pub const D8_S: u8 = 4;
pub const D8_SW: u8 = 8;
pub const D8_W: u8 = 16;
pub const D8_NW: u8 = 32;
pub const D8_N: u8 = 64;
pub const D8_NE: u8 = 128;
pub const D8_PIT: u8 = 0;
/// Conventional NODATA code; the code actually used is configurable.
pub const D8_NODATA: u8 = 255;

/// One of the eight compass directions a cell can drain towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    E,
    SE,
    S,
    SW,
    W,
    NW,
    N,
    NE,
}

impl Direction {
    /// All directions in code order (1, 2, 4, ..., 128).
    pub const ALL: [Direction; 8] = [
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::N,
        Direction::NE,
    ];

    /// Unit `(Δrow, Δcol)` offset; rows grow southwards.
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::E => (0, 1),
            Direction::SE => (1, 1),
            Direction::S => (1, 0),
            Direction::SW => (1, -1),
            Direction::W => (0, -1),
            Direction::NW => (-1, -1),
            Direction::N => (-1, 0),
            Direction::NE => (-1, 1),
        }
    }

    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Direction::E => D8_E,
            Direction::SE => D8_SE,
            Direction::S => D8_S,
            Direction::SW => D8_SW,
            Direction::W => D8_W,
            Direction::NW => D8_NW,
            Direction::N => D8_N,
            Direction::NE => D8_NE,
        }
    }

    /// The direction pointing back at this one.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::S => Direction::N,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
            Direction::N => Direction::S,
            Direction::NE => Direction::SW,
        }
    }
}

/// Result of decoding a single cell code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Flow(Direction),
    Pit,
    Nodata,
    Invalid,
}

// Codes 1, 2, 4, ..., 128 map to their direction; everything else is None.
static DIRECTION_LOOKUP: [Option<Direction>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Direction::ALL.len() {
        let dir = Direction::ALL[i];
        table[dir.code() as usize] = Some(dir);
        i += 1;
    }
    table
};

/// Decode a raw cell value.
///
/// `nodata` is the application's NODATA code, if any. It is checked after
/// the direction and pit codes, so a NODATA value that collides with one of
/// them has no effect; [`crate::config::AnalysisOptions::validate`] rejects
/// such a configuration up front.
#[inline]
pub fn decode(code: u8, nodata: Option<u8>) -> Decoded {
    if let Some(dir) = DIRECTION_LOOKUP[code as usize] {
        Decoded::Flow(dir)
    } else if is_pit(code) {
        Decoded::Pit
    } else if nodata == Some(code) {
        Decoded::Nodata
    } else {
        Decoded::Invalid
    }
}

/// Map a unit offset back to its direction code.
///
/// Returns `None` for `(0, 0)` and for anything that is not a unit step.
pub fn encode(drow: isize, dcol: isize) -> Option<u8> {
    Direction::ALL
        .iter()
        .find(|d| d.offset() == (drow, dcol))
        .map(|d| d.code())
}

#[inline]
pub fn is_pit(code: u8) -> bool {
    code == D8_PIT
}

#[inline]
pub fn is_nodata(code: u8, nodata: Option<u8>) -> bool {
    nodata == Some(code) && !is_flow_code(code)
}

/// True if `code` is a direction or the pit code.
#[inline]
pub fn is_flow_code(code: u8) -> bool {
    is_pit(code) || DIRECTION_LOOKUP[code as usize].is_some()
}
