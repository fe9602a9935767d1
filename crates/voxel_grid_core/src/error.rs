//! Error types shared by all grid backends.

use crate::{Attribute, Point3i};

use thiserror::Error;

/// Every fallible grid operation returns this error. Reads never fail.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GridError {
    #[error("voxel {point:?} is outside of a grid with shape {shape:?}")]
    OutOfBounds { point: Point3i, shape: Point3i },

    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("voxel {point:?} is already occupied by material {existing}")]
    Occupied { point: Point3i, existing: Attribute },

    #[error("unhandled state {state}")]
    UnhandledState { state: u8 },

    #[error("the {backend} backend requires cubic voxels, got pixel size {pixel_size} and slice height {slice_height}")]
    NonCubicVoxels {
        backend: &'static str,
        pixel_size: f64,
        slice_height: f64,
    },

    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    #[error("non-square pixels in grid bounds: {x_size} x {z_size}")]
    NonSquarePixels { x_size: f64, z_size: f64 },
}
