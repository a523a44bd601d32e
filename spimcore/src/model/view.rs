use std::fmt;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// One concrete acquisition: a time point combined with a view setup.
///
/// Ordering is lexicographic on `(time_point, view_setup)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewId {
    pub time_point: u32,
    pub view_setup: u32,
}

impl ViewId {
    pub fn new(time_point: u32, view_setup: u32) -> Self {
        ViewId { time_point, view_setup }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ViewId(tp: {}, setup: {})", self.time_point, self.view_setup)
    }
}

/// Physical size of one voxel along x, y and z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelSize {
    pub unit: String,
    pub dimensions: [f64; 3],
}

impl VoxelSize {
    pub fn new(unit: impl Into<String>, dimensions: [f64; 3]) -> Self {
        VoxelSize { unit: unit.into(), dimensions }
    }

    /// Unit voxels, used when a setup does not declare a calibration.
    pub fn isotropic_pixel() -> Self {
        VoxelSize { unit: "pixel".to_string(), dimensions: [1.0, 1.0, 1.0] }
    }

    /// Scale a voxel coordinate into physical units.
    pub fn to_physical(&self, location: &[f64; 3]) -> Point3<f64> {
        Point3::new(
            location[0] * self.dimensions[0],
            location[1] * self.dimensions[1],
            location[2] * self.dimensions[2],
        )
    }
}

impl Default for VoxelSize {
    fn default() -> Self {
        VoxelSize::isotropic_pixel()
    }
}

/// A fixed combination of channel, angle and illumination with its calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSetup {
    pub id: u32,
    pub name: String,
    pub channel: u32,
    pub angle: u32,
    pub illumination: u32,
    #[serde(default)]
    pub voxel_size: VoxelSize,
}

/// Presence information for one view. Missing views were never acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescription {
    pub view_id: ViewId,
    pub present: bool,
}
