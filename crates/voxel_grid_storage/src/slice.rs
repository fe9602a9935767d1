//! The slice-composed backend.
//!
//! `SliceGrid` splits the grid along Y into independent 2D slices. Every slice uses the same representation, chosen by a
//! `SliceKind` when the grid is created:
//!
//! - `SliceKind::Dense`: one packed cell per `(x, z)`, indexed by `x * depth + z`
//! - `SliceKind::Sparse`: a hash map holding only the voxels that are not outside
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let geom = GridGeometry::new(PointN([64, 4, 64]), 0.1, 0.3).unwrap();
//! let mut grid = SliceGridInt::new(geom, SliceKind::Sparse);
//!
//! grid.set_data(PointN([10, 2, 20]), VoxelData::new(State::Exterior, 1 << 20)).unwrap();
//! assert_eq!(grid.get_attribute(PointN([10, 2, 20])), 1 << 20);
//! assert_eq!(grid.slice(2).map(|s| s.num_stored()), Some(1));
//! ```

use crate::{
    Grid, IntPacking, PackingPolicy, ShortPacking, SmallKeyHashMap, VisitStatus, VoxelVisitor,
};

use voxel_grid_core::prelude::*;

use core::marker::PhantomData;
use serde::{Deserialize, Serialize};

/// The representation of every slice in a `SliceGrid`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SliceKind {
    Dense,
    Sparse,
}

impl Default for SliceKind {
    fn default() -> Self {
        SliceKind::Dense
    }
}

/// One Y layer of a `SliceGrid`.
#[derive(Clone, Debug)]
pub enum Slice<C> {
    /// `width * depth` cells, indexed by `x * depth + z`.
    Dense(Vec<C>),
    /// Only the cells that are not outside, keyed by `(x, z)`.
    Sparse(SmallKeyHashMap<(i32, i32), C>),
}

impl<C> Slice<C> {
    /// The number of cells held in memory.
    pub fn num_stored(&self) -> usize {
        match self {
            Slice::Dense(cells) => cells.len(),
            Slice::Sparse(map) => map.len(),
        }
    }
}

/// A grid made of one 2D slice per Y coordinate.
#[derive(Clone, Debug)]
pub struct SliceGrid<P: PackingPolicy> {
    geometry: GridGeometry,
    kind: SliceKind,
    slices: Vec<Slice<P::Cell>>,
    marker: PhantomData<P>,
}

pub type SliceGridShort = SliceGrid<ShortPacking>;
pub type SliceGridInt = SliceGrid<IntPacking>;

impl<P: PackingPolicy> SliceGrid<P> {
    pub const BACKEND_NAME: &'static str = "slice";

    pub fn new(geometry: GridGeometry, kind: SliceKind) -> Self {
        tracing::debug!(
            policy = P::NAME,
            shape = ?geometry.shape(),
            ?kind,
            "creating slice grid"
        );

        let slice_size = geometry.slice_size();
        let slices = (0..geometry.height())
            .map(|_| match kind {
                SliceKind::Dense => Slice::Dense(vec![P::outside(); slice_size]),
                SliceKind::Sparse => Slice::Sparse(SmallKeyHashMap::default()),
            })
            .collect();

        Self {
            geometry,
            kind,
            slices,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    /// The slice at height `y`, if there is one.
    #[inline]
    pub fn slice(&self, y: i32) -> Option<&Slice<P::Cell>> {
        if y < 0 {
            return None;
        }

        self.slices.get(y as usize)
    }

    #[inline]
    fn dense_index(&self, x: i32, z: i32) -> usize {
        x as usize * self.geometry.depth() as usize + z as usize
    }

    #[inline]
    fn get_cell(&self, p: Point3i) -> P::Cell {
        if !self.geometry.contains(p) {
            return P::outside();
        }

        match &self.slices[p.y() as usize] {
            Slice::Dense(cells) => cells[self.dense_index(p.x(), p.z())],
            Slice::Sparse(map) => map
                .get(&(p.x(), p.z()))
                .copied()
                .unwrap_or_else(P::outside),
        }
    }

    /// Replaces the cell at `p`, which must be in the grid, with `f(old cell)`.
    #[inline]
    fn update_cell(&mut self, p: Point3i, f: impl FnOnce(P::Cell) -> P::Cell) {
        let i = self.dense_index(p.x(), p.z());
        match &mut self.slices[p.y() as usize] {
            Slice::Dense(cells) => cells[i] = f(cells[i]),
            Slice::Sparse(map) => {
                let key = (p.x(), p.z());
                let old = map.get(&key).copied().unwrap_or_else(P::outside);
                let new = f(old);
                if new == P::outside() {
                    map.remove(&key);
                } else {
                    map.insert(key, new);
                }
            }
        }
    }

    /// Visits one slice in X, Z order.
    fn visit_slice(
        &self,
        y: i32,
        class: VoxelClass,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        let mut visit = |x: i32, z: i32, cell: P::Cell| {
            let data = P::decode(cell);
            if class.matches(data.state) {
                visitor(PointN([x, y, z]), data)
            } else {
                VisitStatus::Continue
            }
        };

        match &self.slices[y as usize] {
            Slice::Dense(cells) => {
                for x in 0..self.geometry.width() {
                    for z in 0..self.geometry.depth() {
                        if visit(x, z, cells[self.dense_index(x, z)]).is_exit() {
                            return VisitStatus::ExitEarly;
                        }
                    }
                }
            }
            Slice::Sparse(map) if class.includes_outside() => {
                for x in 0..self.geometry.width() {
                    for z in 0..self.geometry.depth() {
                        let cell = map.get(&(x, z)).copied().unwrap_or_else(P::outside);
                        if visit(x, z, cell).is_exit() {
                            return VisitStatus::ExitEarly;
                        }
                    }
                }
            }
            Slice::Sparse(map) => {
                let mut entries: Vec<_> = map.iter().map(|(k, c)| (*k, *c)).collect();
                entries.sort_unstable_by_key(|(k, _)| *k);
                for ((x, z), cell) in entries {
                    if visit(x, z, cell).is_exit() {
                        return VisitStatus::ExitEarly;
                    }
                }
            }
        }

        VisitStatus::Continue
    }

    fn count_marked(&self, class: VoxelClass) -> u64 {
        debug_assert!(!class.includes_outside());

        self.slices
            .iter()
            .map(|slice| {
                let count = match slice {
                    Slice::Dense(cells) => cells
                        .iter()
                        .filter(|c| class.matches(P::extract_state(**c)))
                        .count(),
                    Slice::Sparse(map) => map
                        .values()
                        .filter(|c| class.matches(P::extract_state(**c)))
                        .count(),
                };
                count as u64
            })
            .sum()
    }
}

impl<P: PackingPolicy> Grid for SliceGrid<P> {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND_NAME
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    fn get_data(&self, p: Point3i) -> VoxelData {
        P::decode(self.get_cell(p))
    }

    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;
        self.update_cell(p, |_| P::encode(data));

        Ok(())
    }

    fn set_attribute(&mut self, p: Point3i, attribute: Attribute) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;
        self.update_cell(p, |old| P::update_attribute(old, attribute));

        Ok(())
    }

    fn create_empty(
        &self,
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Box<dyn Grid>, GridError> {
        let geometry = GridGeometry::new(shape, pixel_size, slice_height)?;

        Ok(Box::new(Self::new(geometry, self.kind)))
    }

    fn clone_grid(&self) -> Box<dyn Grid> {
        Box::new(self.clone())
    }

    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        for y in 0..self.geometry.height() {
            if self.visit_slice(y, class, visitor).is_exit() {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        match class {
            VoxelClass::All => self.geometry.num_voxels(),
            VoxelClass::Outside => self.geometry.num_voxels() - self.count_marked(VoxelClass::Marked),
            _ => self.count_marked(class),
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
