use rand::prelude::*;
use voxel_grid_core::prelude::*;
use voxel_grid_storage::{ArrayGridLong, Grid};

/// A random sequence of `num_writes` writes inside a grid of `shape`.
///
/// Roughly a quarter of the writes are `Outside`, so sequences also exercise clearing. Attributes are drawn from
/// `1..=max_attribute` and dropped to `NO_MATERIAL` for outside writes.
pub fn random_writes(
    rng: &mut impl Rng,
    shape: Point3i,
    num_writes: usize,
    max_attribute: Attribute,
) -> Vec<(Point3i, VoxelData)> {
    (0..num_writes)
        .map(|_| {
            let p = PointN([
                rng.gen_range(0..shape.x()),
                rng.gen_range(0..shape.y()),
                rng.gen_range(0..shape.z()),
            ]);
            let state = State::from_bits_truncate(rng.gen_range(0..4));
            let data = if state.is_outside() {
                VoxelData::OUTSIDE
            } else {
                VoxelData::new(state, rng.gen_range(1..=max_attribute))
            };

            (p, data)
        })
        .collect()
}

pub fn apply_writes(
    grid: &mut dyn Grid,
    writes: &[(Point3i, VoxelData)],
) -> Result<(), GridError> {
    for (p, data) in writes.iter() {
        grid.set_data(*p, *data)?;
    }

    Ok(())
}

/// The dense grid that results from applying `writes`, for comparing against other backends.
pub fn reference_grid(
    geometry: GridGeometry,
    writes: &[(Point3i, VoxelData)],
) -> Result<ArrayGridLong, GridError> {
    let mut grid = ArrayGridLong::new(geometry);
    apply_writes(&mut grid, writes)?;

    Ok(grid)
}

/// Asserts that `actual` holds the same states as `expected` at every voxel, and the same attributes if `compare_attributes`.
pub fn assert_same_voxels(expected: &dyn Grid, actual: &dyn Grid, compare_attributes: bool) {
    assert_eq!(expected.geometry().shape(), actual.geometry().shape());

    for p in expected.geometry().extent().iter_points() {
        let (e, a) = (expected.get_data(p), actual.get_data(p));
        assert_eq!(e.state, a.state, "state at {:?} in {}", p, actual.backend_name());
        if compare_attributes {
            assert_eq!(
                e.attribute,
                a.attribute,
                "attribute at {:?} in {}",
                p,
                actual.backend_name()
            );
        }
    }
}
