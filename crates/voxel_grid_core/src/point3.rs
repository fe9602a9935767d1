use crate::PointN;

use core::ops::{Add, AddAssign, BitAnd, Div, Mul, Shl, Shr, Sub, SubAssign};

/// A 3-dimensional point with scalar type `T`.
pub type Point3<T> = PointN<[T; 3]>;
/// A 3-dimensional point with scalar type `i32`. Used for grid (voxel) coordinates.
pub type Point3i = PointN<[i32; 3]>;
/// A 3-dimensional point with scalar type `f64`. Used for world coordinates.
pub type Point3d = PointN<[f64; 3]>;

impl<T> Point3<T>
where
    T: Copy,
{
    #[inline]
    pub fn x(&self) -> T {
        self.0[0]
    }

    #[inline]
    pub fn y(&self) -> T {
        self.0[1]
    }

    #[inline]
    pub fn z(&self) -> T {
        self.0[2]
    }

    #[inline]
    pub fn fill(value: T) -> Self {
        PointN([value; 3])
    }

    #[inline]
    pub fn map_components<S>(&self, f: impl Fn(T) -> S) -> Point3<S> {
        PointN([f(self.x()), f(self.y()), f(self.z())])
    }

    #[inline]
    pub fn zip_components<S>(&self, other: &Self, f: impl Fn(T, T) -> S) -> Point3<S> {
        PointN([
            f(self.x(), other.x()),
            f(self.y(), other.y()),
            f(self.z(), other.z()),
        ])
    }
}

impl<T> Point3<T>
where
    T: Copy + Ord,
{
    #[inline]
    pub fn max_component(&self) -> T {
        self.x().max(self.y()).max(self.z())
    }

    #[inline]
    pub fn join(&self, other: &Self) -> Self {
        self.zip_components(other, |a, b| a.max(b))
    }

    #[inline]
    pub fn meet(&self, other: &Self) -> Self {
        self.zip_components(other, |a, b| a.min(b))
    }
}

impl Point3i {
    pub const ZERO: Self = PointN([0; 3]);
    pub const ONES: Self = PointN([1; 3]);

    /// The number of points in the extent `[0, self)`, as a `u64` so large grids don't overflow.
    #[inline]
    pub fn volume(&self) -> u64 {
        self.x() as u64 * self.y() as u64 * self.z() as u64
    }
}

impl Point3d {
    #[inline]
    pub fn floor(&self) -> Self {
        self.map_components(|c| c.floor())
    }
}

impl From<Point3i> for Point3d {
    #[inline]
    fn from(p: Point3i) -> Self {
        p.map_components(|c| c as f64)
    }
}

impl<T> Add for Point3<T>
where
    T: Copy + Add<Output = T>,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.zip_components(&rhs, |a, b| a + b)
    }
}

impl<T> Sub for Point3<T>
where
    T: Copy + Sub<Output = T>,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.zip_components(&rhs, |a, b| a - b)
    }
}

impl<T> AddAssign for Point3<T>
where
    T: Copy + Add<Output = T>,
{
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T> SubAssign for Point3<T>
where
    T: Copy + Sub<Output = T>,
{
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<i32> for Point3i {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        self.map_components(|c| c * rhs)
    }
}

impl Mul<f64> for Point3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.map_components(|c| c * rhs)
    }
}

impl<T> Mul for Point3<T>
where
    T: Copy + Mul<Output = T>,
{
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.zip_components(&rhs, |a, b| a * b)
    }
}

impl<T> Div for Point3<T>
where
    T: Copy + Div<Output = T>,
{
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self.zip_components(&rhs, |a, b| a / b)
    }
}

impl Shl<i32> for Point3i {
    type Output = Self;

    #[inline]
    fn shl(self, rhs: i32) -> Self {
        self.map_components(|c| c << rhs)
    }
}

impl Shr<i32> for Point3i {
    type Output = Self;

    #[inline]
    fn shr(self, rhs: i32) -> Self {
        self.map_components(|c| c >> rhs)
    }
}

impl BitAnd<i32> for Point3i {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: i32) -> Self {
        self.map_components(|c| c & rhs)
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
    fn volume_does_not_overflow_i32() {
        let shape: Point3i = PointN([2048, 2048, 2048]);
        assert_eq!(shape.volume(), 1 << 33);
    }

    #[test]
    fn floor_of_negative_world_point() {
        let p: Point3d = PointN([-0.5, 1.5, 2.0]);
        assert_eq!(p.floor(), PointN([-1.0, 1.0, 2.0]));
    }
}
