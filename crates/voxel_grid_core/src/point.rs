use serde::{Deserialize, Serialize};

/// A 3-dimensional point, which is just a primitive array of type `N`.
///
/// It is most convenient to construct points as:
///
/// ```
/// use voxel_grid_core::PointN;
///
/// let p = PointN([1, 2, 3]);
/// assert_eq!(p.x(), 1);
/// assert_eq!(p.z(), 3);
/// ```
///
/// Integer points support the linear algebraic and bitwise operations needed for lattice addressing.
///
/// ```
/// use voxel_grid_core::{Point3i, PointN};
///
/// let p1: Point3i = PointN([1, 2, 3]);
/// let p2: Point3i = PointN([4, 5, 6]);
///
/// assert_eq!(p1 + p2, PointN([5, 7, 9]));
/// assert_eq!(p2 - p1, PointN([3, 3, 3]));
/// assert_eq!(p1 * 2, PointN([2, 4, 6]));
/// assert_eq!(p2 >> 1, PointN([2, 2, 3]));
/// assert_eq!(p2 & 3, PointN([0, 1, 2]));
/// ```
#[derive(Copy, Clone, Debug, Deserialize, Default, Eq, Hash, PartialEq, Serialize)]
pub struct PointN<N>(pub N);

/// Component-wise comparison. A point is "less than" another if and only if all of its components are less.
impl<T> PartialOrd for PointN<[T; 3]>
where
    T: Copy + PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        use core::cmp::Ordering;

        if self == other {
            Some(Ordering::Equal)
        } else if self.lt(other) {
            Some(Ordering::Less)
        } else if self.gt(other) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    #[inline]
    fn lt(&self, other: &Self) -> bool {
        self.0[0] < other.0[0] && self.0[1] < other.0[1] && self.0[2] < other.0[2]
    }

    #[inline]
    fn gt(&self, other: &Self) -> bool {
        self.0[0] > other.0[0] && self.0[1] > other.0[1] && self.0[2] > other.0[2]
    }

    #[inline]
    fn le(&self, other: &Self) -> bool {
        self.0[0] <= other.0[0] && self.0[1] <= other.0[1] && self.0[2] <= other.0[2]
    }

    #[inline]
    fn ge(&self, other: &Self) -> bool {
        self.0[0] >= other.0[0] && self.0[1] >= other.0[1] && self.0[2] >= other.0[2]
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
