//! The value stored for each voxel: a coarse `State` plus an `Attribute` (material identifier).
//!
//! States form a closed set that fits in 2 bits. `VoxelClass` is the filter used by traversals; `VoxelClass::Marked` matches
//! every state except `State::Outside` and is never stored.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//!
//! let v = VoxelData::new(State::Interior, 3);
//! assert!(VoxelClass::Marked.matches(v.state));
//! assert!(!VoxelClass::Exterior.matches(v.state));
//!
//! // Outside voxels never carry a material.
//! assert_eq!(VoxelData::new(State::Outside, 3), VoxelData::OUTSIDE);
//! ```

use crate::GridError;

use core::convert::TryFrom;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A material identifier. Backends store only as many low bits as their packing policy allows.
pub type Attribute = u64;

/// The attribute of every `State::Outside` voxel.
pub const NO_MATERIAL: Attribute = 0;

/// The coarse classification of a voxel.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[repr(u8)]
pub enum State {
    Outside = 0,
    Exterior = 1,
    Interior = 2,
    /// The fourth 2-bit state, available to applications with their own meaning for it.
    UserDefined = 3,
}

impl State {
    pub const ALL: [State; 4] = [
        State::Outside,
        State::Exterior,
        State::Interior,
        State::UserDefined,
    ];

    /// Decodes the low 2 bits of `bits`. Higher bits are ignored.
    #[inline]
    pub fn from_bits_truncate(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }

    #[inline]
    pub fn to_bits(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_outside(self) -> bool {
        self == State::Outside
    }
}

impl Default for State {
    fn default() -> Self {
        State::Outside
    }
}

impl TryFrom<u8> for State {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 4 {
            Ok(Self::from_bits_truncate(value))
        } else {
            Err(GridError::UnhandledState { state: value })
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bits())
    }
}

/// A filter over voxel states, used by traversal and counting operations.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum VoxelClass {
    All,
    /// Any state other than `Outside`.
    Marked,
    Exterior,
    Interior,
    Outside,
}

impl VoxelClass {
    pub const ALL: [VoxelClass; 5] = [
        VoxelClass::All,
        VoxelClass::Marked,
        VoxelClass::Exterior,
        VoxelClass::Interior,
        VoxelClass::Outside,
    ];

    #[inline]
    pub fn matches(self, state: State) -> bool {
        match self {
            VoxelClass::All => true,
            VoxelClass::Marked => state != State::Outside,
            VoxelClass::Exterior => state == State::Exterior,
            VoxelClass::Interior => state == State::Interior,
            VoxelClass::Outside => state == State::Outside,
        }
    }

    /// True if this class can match `State::Outside` voxels. Sparse backends must enumerate unstored voxels for these.
    #[inline]
    pub fn includes_outside(self) -> bool {
        self.matches(State::Outside)
    }
}

/// The full value of a voxel.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct VoxelData {
    pub state: State,
    pub attribute: Attribute,
}

impl VoxelData {
    pub const OUTSIDE: Self = Self {
        state: State::Outside,
        attribute: NO_MATERIAL,
    };

    /// Any attribute given with `State::Outside` is discarded.
    #[inline]
    pub fn new(state: State, attribute: Attribute) -> Self {
        if state.is_outside() {
            Self::OUTSIDE
        } else {
            Self { state, attribute }
        }
    }

    #[inline]
    pub fn is_outside(&self) -> bool {
        self.state.is_outside()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn class_membership() {
        let table = [
            (VoxelClass::All, [true, true, true, true]),
            (VoxelClass::Marked, [false, true, true, true]),
            (VoxelClass::Exterior, [false, true, false, false]),
            (VoxelClass::Interior, [false, false, true, false]),
            (VoxelClass::Outside, [true, false, false, false]),
        ];
        for (class, expected) in table.iter() {
            for (state, expect) in State::ALL.iter().zip(expected.iter()) {
                assert_eq!(class.matches(*state), *expect, "{:?} {:?}", class, state);
            }
        }
    }

    #[test]
    fn state_from_raw_value() {
        assert_eq!(State::try_from(2).unwrap(), State::Interior);
        assert!(matches!(
            State::try_from(7),
            Err(GridError::UnhandledState { state: 7 })
        ));
    }
}
