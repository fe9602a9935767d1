use crate::{Extent3i, Point3i, PointN};

/// The `(dx, dy, dz)` half-space offsets of each child octant, indexed by octant number.
///
/// Octants 0 through 3 tile the near (`dz = 0`) face and 4 through 7 tile the far face, each face in the same rotational
/// order. This is not Morton order. Every octree cell addresses its children with this table, so it must never change.
pub const OCTANT_OFFSETS: [[i32; 3]; 8] = [
    [0, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [1, 0, 0],
    [0, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
    [1, 0, 1],
];

// Inverse of `OCTANT_OFFSETS`, indexed by `dx | dy << 1 | dz << 2`.
const OCTANT_FOR_BITS: [u8; 8] = [0, 3, 1, 2, 4, 7, 5, 6];

/// The octant number for the given half-space offsets, each of which must be 0 or 1.
#[inline]
pub fn octant_index(dx: i32, dy: i32, dz: i32) -> u8 {
    debug_assert!((0..2).contains(&dx) && (0..2).contains(&dy) && (0..2).contains(&dz));

    OCTANT_FOR_BITS[(dx | dy << 1 | dz << 2) as usize]
}

/// The half-space offsets of `octant` as a point.
#[inline]
pub fn octant_offset(octant: u8) -> Point3i {
    PointN(OCTANT_OFFSETS[octant as usize])
}

/// A cube of lattice points with a power of 2 edge length. This is the space covered by a single cell of an octree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Octant {
    minimum: Point3i,
    edge_length: i32,
}

impl Octant {
    #[inline]
    pub fn new_unchecked(minimum: Point3i, edge_length: i32) -> Self {
        Self {
            minimum,
            edge_length,
        }
    }

    #[inline]
    pub fn minimum(&self) -> Point3i {
        self.minimum
    }

    #[inline]
    pub fn edge_length(&self) -> i32 {
        self.edge_length
    }

    #[inline]
    pub fn is_single_voxel(&self) -> bool {
        self.edge_length == 1
    }

    #[inline]
    pub fn contains(&self, p: Point3i) -> bool {
        Extent3i::from(*self).contains(p)
    }

    /// The number of the child octant containing `p`. `p` must be inside of `self`, and `self` must not be a single voxel.
    #[inline]
    pub fn child_index_containing(&self, p: Point3i) -> u8 {
        debug_assert!(!self.is_single_voxel());
        debug_assert!(self.contains(p));

        let half = self.edge_length >> 1;
        let d = (p - self.minimum).map_components(|c| c / half);

        octant_index(d.x(), d.y(), d.z())
    }

    /// The child octant with the given number.
    #[inline]
    pub fn child(&self, octant: u8) -> Self {
        debug_assert!(!self.is_single_voxel());

        let half = self.edge_length >> 1;

        Self {
            minimum: self.minimum + octant_offset(octant) * half,
            edge_length: half,
        }
    }
}

impl From<Octant> for Extent3i {
    #[inline]
    fn from(octant: Octant) -> Self {
        Extent3i::from_min_and_shape(octant.minimum, Point3i::fill(octant.edge_length))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
