use voxel_grid_core::prelude::*;
use voxel_grid_storage::Grid;

// TODO: call these from the unit tests in voxel_grid_storage once this is fixed, so they don't need their own fixtures:
// https://github.com/rust-lang/cargo/issues/6765

/// Writes a solid ball of `material` centered in the grid: `Interior` voxels wrapped in a one voxel thick `Exterior` shell.
///
/// Returns the radius and the number of voxels written.
pub fn fill_sphere(grid: &mut dyn Grid, material: Attribute) -> Result<(i32, u64), GridError> {
    let shape = grid.geometry().shape();
    let center = PointN([shape.x() / 2, shape.y() / 2, shape.z() / 2]);
    let radius = (shape.x().min(shape.y()).min(shape.z()) / 2 - 1).max(1);

    let extent = grid.geometry().extent();
    let mut written = 0;
    for p in extent.iter_points() {
        let d = p - center;
        let dist_sq = d.x() * d.x() + d.y() * d.y() + d.z() * d.z();
        let state = if dist_sq < (radius - 1) * (radius - 1) {
            State::Interior
        } else if dist_sq < radius * radius {
            State::Exterior
        } else {
            continue;
        };
        grid.set_data(p, VoxelData::new(state, material))?;
        written += 1;
    }

    Ok((radius, written))
}
