use crate::{Point3i, PointN};

use core::ops::Range;
use itertools::{iproduct, ConsTuples, Product};
use serde::{Deserialize, Serialize};

/// An axis-aligned box of lattice points, given by its `minimum` and `shape`.
///
/// Points are iterated in grid scan order: Y is the outermost axis, then X, then Z. This matches the linear layout of the
/// dense grid backends, so a scan of the extent visits memory sequentially.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Extent3i {
    /// The least point contained in the extent.
    pub minimum: Point3i,
    /// The length of each dimension.
    pub shape: Point3i,
}

impl Extent3i {
    #[inline]
    pub fn from_min_and_shape(minimum: Point3i, shape: Point3i) -> Self {
        Self { minimum, shape }
    }

    #[inline]
    pub fn from_min_and_lub(min: Point3i, lub: Point3i) -> Self {
        // Negative shapes are clamped to empty.
        let shape = (lub - min).join(&Point3i::ZERO);

        Self::from_min_and_shape(min, shape)
    }

    /// The least point `p` for which all points in the extent are strictly less than `p`.
    #[inline]
    pub fn least_upper_bound(&self) -> Point3i {
        self.minimum + self.shape
    }

    /// The greatest point contained in the extent.
    #[inline]
    pub fn max(&self) -> Point3i {
        self.least_upper_bound() - Point3i::ONES
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shape.x() <= 0 || self.shape.y() <= 0 || self.shape.z() <= 0
    }

    #[inline]
    pub fn num_points(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.shape.volume()
        }
    }

    #[inline]
    pub fn contains(&self, p: Point3i) -> bool {
        self.minimum <= p && p < self.least_upper_bound()
    }

    /// The (possibly empty) extent covered by both `self` and `other`.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        let min = self.minimum.join(&other.minimum);
        let lub = self
            .least_upper_bound()
            .meet(&other.least_upper_bound());

        Self::from_min_and_lub(min, lub)
    }

    #[inline]
    pub fn iter_points(&self) -> Extent3PointIter {
        let lub = self.least_upper_bound();

        Extent3PointIter {
            product_iter: iproduct!(
                self.minimum.y()..lub.y(),
                self.minimum.x()..lub.x(),
                self.minimum.z()..lub.z()
            ),
        }
    }
}

/// An iterator over all points in an `Extent3i`, in Y, X, Z order.
pub struct Extent3PointIter {
    product_iter: ConsTuples<RangeProduct3, ((i32, i32), i32)>,
}

type RangeProduct2 = Product<Range<i32>, Range<i32>>;
type RangeProduct3 = Product<RangeProduct2, Range<i32>>;

impl Iterator for Extent3PointIter {
    type Item = Point3i;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.product_iter.next().map(|(y, x, z)| PointN([x, y, z]))
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
    fn iter_points_in_scan_order() {
        let extent = Extent3i::from_min_and_shape(PointN([1, 1, 1]), PointN([2, 2, 2]));
        let points: Vec<_> = extent.iter_points().collect();

        assert_eq!(
            points,
            vec![
                PointN([1, 1, 1]),
                PointN([1, 1, 2]),
                PointN([2, 1, 1]),
                PointN([2, 1, 2]),
                PointN([1, 2, 1]),
                PointN([1, 2, 2]),
                PointN([2, 2, 1]),
                PointN([2, 2, 2]),
            ]
        );
        assert_eq!(extent.num_points(), 8);
    }

    #[test]
    fn intersection_can_be_empty() {
        let a = Extent3i::from_min_and_shape(Point3i::ZERO, Point3i::fill(4));
        let b = Extent3i::from_min_and_shape(Point3i::fill(2), Point3i::fill(4));
        let c = Extent3i::from_min_and_shape(Point3i::fill(8), Point3i::fill(4));

        assert_eq!(
            a.intersection(&b),
            Extent3i::from_min_and_shape(Point3i::fill(2), Point3i::fill(2))
        );
        assert!(a.intersection(&c).is_empty());
        assert_eq!(a.intersection(&c).num_points(), 0);
        assert_eq!(a.intersection(&c).iter_points().count(), 0);
    }

    #[test]
    fn contains_is_half_open() {
        let a = Extent3i::from_min_and_shape(Point3i::ZERO, Point3i::fill(4));

        assert!(a.contains(Point3i::ZERO));
        assert!(a.contains(Point3i::fill(3)));
        assert!(!a.contains(PointN([4, 0, 0])));
        assert!(!a.contains(PointN([0, -1, 0])));
    }
}
