//! Policies for packing a `(State, Attribute)` pair into one fixed-width integer cell.
//!
//! Every backend that stores attributes is generic over a `PackingPolicy`, so the same block or octree machinery can hold
//! byte, short, int or long cells. The state always occupies the two most significant bits and the attribute takes the
//! rest:
//!
//! | policy        | cell  | attribute bits |
//! |---------------|-------|----------------|
//! | `BytePacking` | `u8`  | 6              |
//! | `ShortPacking`| `u16` | 14             |
//! | `IntPacking`  | `u32` | 30             |
//! | `LongPacking` | `u64` | 62             |
//!
//! A zeroed cell decodes as `VoxelData::OUTSIDE`, and `State::Outside` always encodes as zero, so freshly allocated storage is
//! valid empty storage.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::{BytePacking, PackingPolicy};
//!
//! let cell = BytePacking::combine(State::Interior, 5);
//! assert_eq!(cell, 0b10_000101);
//! assert_eq!(BytePacking::extract_state(cell), State::Interior);
//! assert_eq!(BytePacking::extract_attribute(cell), 5);
//!
//! let cell = BytePacking::update_attribute(cell, 9);
//! assert_eq!(BytePacking::decode(cell), VoxelData::new(State::Interior, 9));
//! ```

use voxel_grid_core::prelude::*;

use bytemuck::{Pod, Zeroable};
use core::fmt::Debug;
use core::hash::Hash;

/// Packs and unpacks voxel values for one cell width.
pub trait PackingPolicy: 'static + Clone + Copy + Debug + Default + Send + Sync {
    type Cell: Pod + Debug + Default + Eq + Hash + Send + Sync;

    /// Used in logs and error messages.
    const NAME: &'static str;

    /// The number of low bits that hold the attribute.
    const ATTRIBUTE_BITS: u32;

    /// The largest attribute that can be stored without truncation.
    #[inline]
    fn max_attribute() -> Attribute {
        (1 << Self::ATTRIBUTE_BITS) - 1
    }

    /// Attributes wider than `ATTRIBUTE_BITS` are truncated. `State::Outside` always encodes as the zero cell.
    fn combine(state: State, attribute: Attribute) -> Self::Cell;

    fn extract_state(cell: Self::Cell) -> State;

    fn extract_attribute(cell: Self::Cell) -> Attribute;

    /// Replaces the attribute of `cell`, keeping its state.
    #[inline]
    fn update_attribute(cell: Self::Cell, attribute: Attribute) -> Self::Cell {
        Self::combine(Self::extract_state(cell), attribute)
    }

    #[inline]
    fn encode(data: VoxelData) -> Self::Cell {
        Self::combine(data.state, data.attribute)
    }

    #[inline]
    fn decode(cell: Self::Cell) -> VoxelData {
        VoxelData::new(Self::extract_state(cell), Self::extract_attribute(cell))
    }

    #[inline]
    fn outside() -> Self::Cell {
        <Self::Cell as Zeroable>::zeroed()
    }
}

macro_rules! impl_packing_policy {
    ($policy:ident, $cell:ty, $attr_bits:expr, $name:expr) => {
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
        pub struct $policy;

        impl PackingPolicy for $policy {
            type Cell = $cell;

            const NAME: &'static str = $name;
            const ATTRIBUTE_BITS: u32 = $attr_bits;

            #[inline]
            fn combine(state: State, attribute: Attribute) -> $cell {
                if state.is_outside() {
                    return 0;
                }
                if attribute > Self::max_attribute() {
                    tracing::warn!(
                        attribute,
                        max = Self::max_attribute(),
                        policy = Self::NAME,
                        "attribute truncated to packing width"
                    );
                }

                ((state.to_bits() as $cell) << $attr_bits)
                    | ((attribute & Self::max_attribute()) as $cell)
            }

            #[inline]
            fn extract_state(cell: $cell) -> State {
                State::from_bits_truncate((cell >> $attr_bits) as u8)
            }

            #[inline]
            fn extract_attribute(cell: $cell) -> Attribute {
                (cell as Attribute) & Self::max_attribute()
            }
        }
    };
}

impl_packing_policy!(BytePacking, u8, 6, "byte");
impl_packing_policy!(ShortPacking, u16, 14, "short");
impl_packing_policy!(IntPacking, u32, 30, "int");
impl_packing_policy!(LongPacking, u64, 62, "long");

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    fn check_policy<P: PackingPolicy>() {
        assert_eq!(P::decode(P::outside()), VoxelData::OUTSIDE);

        for state in State::ALL.iter().copied() {
            for attribute in [0, 1, P::max_attribute() / 2, P::max_attribute()].iter().copied() {
                let cell = P::combine(state, attribute);
                let expected = VoxelData::new(state, attribute);
                assert_eq!(P::decode(cell), expected);
                assert_eq!(P::extract_state(cell), state);

                let updated = P::update_attribute(cell, 1);
                assert_eq!(P::extract_state(updated), state);
            }
        }
    }

    #[test]
    fn byte_policy() {
        check_policy::<BytePacking>();
        assert_eq!(BytePacking::max_attribute(), 63);
    }

    #[test]
    fn short_policy() {
        check_policy::<ShortPacking>();
        assert_eq!(ShortPacking::max_attribute(), 16383);
    }

    #[test]
    fn int_policy() {
        check_policy::<IntPacking>();
        assert_eq!(IntPacking::max_attribute(), (1 << 30) - 1);
    }

    #[test]
    fn long_policy() {
        check_policy::<LongPacking>();
        assert_eq!(LongPacking::max_attribute(), (1 << 62) - 1);
    }

    #[test]
    fn state_is_stored_in_the_high_bits() {
        assert_eq!(ShortPacking::combine(State::Exterior, 7), 0x4007);
        assert_eq!(IntPacking::combine(State::UserDefined, 0), 0xC000_0000);
        assert_eq!(LongPacking::combine(State::Interior, 1), 0x8000_0000_0000_0001);
    }

    #[test]
    fn outside_discards_attribute() {
        assert_eq!(BytePacking::combine(State::Outside, 12), 0);
        assert_eq!(BytePacking::update_attribute(0, 12), 0);
    }

    #[test]
    fn wide_attributes_are_truncated() {
        let cell = BytePacking::combine(State::Interior, 64 + 5);
        assert_eq!(BytePacking::extract_attribute(cell), 5);
        assert_eq!(BytePacking::extract_state(cell), State::Interior);
    }
}
