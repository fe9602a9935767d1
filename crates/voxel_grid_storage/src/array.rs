//! The dense array backend.
//!
//! `ArrayGrid` stores one packed cell for every voxel in a single flat `Vec`, so every access is O(1) and memory usage is
//! `width * height * depth` cells regardless of content. Voxels are laid out in Y, X, Z order, i.e. the linear index of
//! `(x, y, z)` is `y * width * depth + x * depth + z`.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let geom = GridGeometry::new(PointN([16, 8, 16]), 0.1, 0.05).unwrap();
//! let mut grid = ArrayGridShort::new(geom);
//!
//! grid.set_data(PointN([3, 4, 5]), VoxelData::new(State::Exterior, 1000)).unwrap();
//! assert_eq!(grid.get_state(PointN([3, 4, 5])), State::Exterior);
//! assert_eq!(grid.get_attribute(PointN([3, 4, 5])), 1000);
//!
//! // World coordinates are floor-divided by the voxel size.
//! assert_eq!(grid.get_state_world(PointN([0.35, 0.2, 0.55])), State::Exterior);
//! ```

use crate::{
    BytePacking, Grid, IntPacking, LongPacking, PackingPolicy, ShortPacking, VisitStatus,
    VoxelVisitor,
};

use voxel_grid_core::prelude::*;

use core::marker::PhantomData;

/// A dense grid with one `P::Cell` per voxel.
#[derive(Clone, Debug)]
pub struct ArrayGrid<P: PackingPolicy> {
    geometry: GridGeometry,
    cells: Vec<P::Cell>,
    marker: PhantomData<P>,
}

pub type ArrayGridByte = ArrayGrid<BytePacking>;
pub type ArrayGridShort = ArrayGrid<ShortPacking>;
pub type ArrayGridInt = ArrayGrid<IntPacking>;
pub type ArrayGridLong = ArrayGrid<LongPacking>;

impl<P: PackingPolicy> ArrayGrid<P> {
    pub fn new(geometry: GridGeometry) -> Self {
        let num_cells = geometry.num_voxels() as usize;
        tracing::debug!(
            policy = P::NAME,
            shape = ?geometry.shape(),
            "creating array grid"
        );

        Self {
            geometry,
            cells: vec![P::outside(); num_cells],
            marker: PhantomData,
        }
    }

    /// The linear index of `p`, which must be inside of the grid.
    #[inline]
    pub fn index(&self, p: Point3i) -> usize {
        debug_assert!(self.geometry.contains(p));

        p.y() as usize * self.geometry.slice_size()
            + p.x() as usize * self.geometry.depth() as usize
            + p.z() as usize
    }

    /// The raw packed cells, in Y, X, Z order.
    #[inline]
    pub fn cells(&self) -> &[P::Cell] {
        &self.cells
    }

    #[inline]
    fn cell(&self, p: Point3i) -> Option<P::Cell> {
        if self.geometry.contains(p) {
            Some(self.cells[self.index(p)])
        } else {
            None
        }
    }
}

impl<P: PackingPolicy> Grid for ArrayGrid<P> {
    fn backend_name(&self) -> &'static str {
        "array"
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    fn get_data(&self, p: Point3i) -> VoxelData {
        self.cell(p).map(P::decode).unwrap_or(VoxelData::OUTSIDE)
    }

    #[inline]
    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;
        let i = self.index(p);
        self.cells[i] = P::encode(data);

        Ok(())
    }

    fn set_attribute(&mut self, p: Point3i, attribute: Attribute) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;
        let i = self.index(p);
        self.cells[i] = P::update_attribute(self.cells[i], attribute);

        Ok(())
    }

    fn create_empty(
        &self,
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Box<dyn Grid>, GridError> {
        let geometry = GridGeometry::new(shape, pixel_size, slice_height)?;

        Ok(Box::new(Self::new(geometry)))
    }

    fn clone_grid(&self) -> Box<dyn Grid> {
        Box::new(self.clone())
    }

    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        // The cells are stored in exactly the order that the extent iterates.
        for (p, cell) in self.geometry.extent().iter_points().zip(self.cells.iter()) {
            let data = P::decode(*cell);
            if class.matches(data.state) && visitor(p, data).is_exit() {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        self.cells
            .iter()
            .filter(|c| class.matches(P::extract_state(**c)))
            .count() as u64
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

    use pretty_assertions::assert_eq;

    fn geometry() -> GridGeometry {
        GridGeometry::new(PointN([3, 4, 5]), 1.0, 1.0).unwrap()
    }

    #[test]
    fn linear_index_is_y_major() {
        let grid = ArrayGridByte::new(geometry());

        assert_eq!(grid.index(PointN([0, 0, 0])), 0);
        assert_eq!(grid.index(PointN([0, 0, 1])), 1);
        assert_eq!(grid.index(PointN([1, 0, 0])), 5);
        assert_eq!(grid.index(PointN([0, 1, 0])), 15);
        assert_eq!(grid.index(PointN([2, 3, 4])), 59);
    }

    #[test]
    fn out_of_bounds_write_is_an_error() {
        let mut grid = ArrayGridByte::new(geometry());

        assert_eq!(
            grid.set_data(PointN([3, 0, 0]), VoxelData::new(State::Interior, 1)),
            Err(GridError::OutOfBounds {
                point: PointN([3, 0, 0]),
                shape: PointN([3, 4, 5]),
            })
        );
        assert!(grid.cells().iter().all(|c| *c == 0));
    }

    #[test]
    fn set_attribute_keeps_state() {
        let mut grid = ArrayGridInt::new(geometry());
        let p = PointN([1, 2, 3]);

        grid.set_data(p, VoxelData::new(State::Exterior, 2)).unwrap();
        grid.set_attribute(p, 9).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::new(State::Exterior, 9));

        // Outside voxels can't carry an attribute.
        let q = PointN([0, 0, 0]);
        grid.set_attribute(q, 9).unwrap();
        assert_eq!(grid.get_data(q), VoxelData::OUTSIDE);
    }

    #[test]
    fn set_state_transitions() {
        let mut grid = ArrayGridLong::new(geometry());
        let p = PointN([1, 1, 1]);

        grid.set_state(p, State::Interior).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::new(State::Interior, NO_MATERIAL));

        grid.set_data(p, VoxelData::new(State::Interior, 5)).unwrap();
        grid.set_state(p, State::Exterior).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::new(State::Exterior, 5));

        grid.set_state(p, State::Outside).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::OUTSIDE);
    }

    #[test]
    fn find_visits_in_scan_order() {
        let mut grid = ArrayGridByte::new(geometry());
        let points = [PointN([2, 0, 0]), PointN([0, 1, 0]), PointN([0, 0, 4])];
        for p in points.iter() {
            grid.set_data(*p, VoxelData::new(State::Interior, 1)).unwrap();
        }

        let mut found = Vec::new();
        grid.find(VoxelClass::Marked, &mut |p, _| found.push(p));

        assert_eq!(
            found,
            vec![PointN([0, 0, 4]), PointN([2, 0, 0]), PointN([0, 1, 0])]
        );
        assert_eq!(grid.find_count(VoxelClass::Outside), 60 - 3);
    }
}
