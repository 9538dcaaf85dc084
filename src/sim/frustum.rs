//! Camera frustum projection
//!
//! Converts a perspective camera description into the world-space extent
//! visible at a given depth. Spawners use it to keep entities on screen and
//! backdrop geometry uses it to fill the view exactly.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_PROJECTION_DEPTH;

/// Read-only view of the scene camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub position: Vec3,
    /// Viewing direction (need not be normalized)
    pub forward: Vec3,
    /// Vertical field of view in degrees, within (0, 180)
    pub fov_degrees: f32,
    /// Width / height, positive
    pub aspect: f32,
}

impl Default for CameraView {
    /// The stock prototype camera: 1.5 up, 10 back, looking down +Z
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, -10.0),
            forward: Vec3::Z,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Half extents of the visible frustum slice at `depth`.
///
/// `halfHeight = tan(fov/2) * depth`, `halfWidth = halfHeight * aspect`.
/// Callers clamp `depth` to at least [`MIN_PROJECTION_DEPTH`].
#[inline]
pub fn visible_half_extent(fov_degrees: f32, aspect: f32, depth: f32) -> (f32, f32) {
    debug_assert!(depth > 0.0, "projection depth must be positive");
    let half_height = (fov_degrees.to_radians() * 0.5).tan() * depth;
    (half_height * aspect, half_height)
}

/// Horizontal placement bounds at one depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEnvelope {
    /// World X the envelope is centred on
    pub center_x: f32,
    pub half_width: f32,
    /// Distance along the camera forward the envelope was evaluated at
    pub depth: f32,
    /// True when no usable camera was available
    pub fallback: bool,
}

impl SpawnEnvelope {
    /// Inclusive X bounds after keeping `margin` from each edge.
    /// Collapses to the centre when the margin eats the whole width.
    pub fn x_bounds(&self, margin: f32) -> (f32, f32) {
        let inner = self.half_width - margin;
        if inner <= 0.0 {
            (self.center_x, self.center_x)
        } else {
            (self.center_x - inner, self.center_x + inner)
        }
    }
}

/// A camera-facing quad that fills the view at some distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropFit {
    pub center: Vec3,
    /// Direction the quad faces (back toward the camera)
    pub normal: Vec3,
    pub width: f32,
    pub height: f32,
}

impl CameraView {
    pub fn new(position: Vec3, forward: Vec3, fov_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            forward,
            fov_degrees,
            aspect,
        }
    }

    /// Whether projection through this camera yields finite, positive extents
    pub fn is_valid(&self) -> bool {
        self.fov_degrees.is_finite()
            && self.fov_degrees > 0.0
            && self.fov_degrees < 180.0
            && self.aspect.is_finite()
            && self.aspect > 0.0
            && self.position.is_finite()
            && self.forward.is_finite()
            && self.forward.length_squared() > f32::EPSILON
    }

    /// Unit viewing direction
    pub fn direction(&self) -> Vec3 {
        self.forward.normalize_or(Vec3::Z)
    }

    /// See [`visible_half_extent`]
    pub fn visible_half_extent(&self, depth: f32) -> (f32, f32) {
        visible_half_extent(self.fov_degrees, self.aspect, depth)
    }

    /// Forward distance to the plane at world `z`, clamped so points behind
    /// or right at the camera still project to a small positive slice
    pub fn depth_to_plane(&self, z: f32) -> f32 {
        let depth = (z - self.position.z) * self.direction().z;
        depth.max(MIN_PROJECTION_DEPTH)
    }

    /// Spawn envelope for the plane at world `z`
    pub fn envelope_at(&self, z: f32) -> SpawnEnvelope {
        let depth = self.depth_to_plane(z);
        let (half_width, _) = self.visible_half_extent(depth);
        SpawnEnvelope {
            center_x: self.position.x,
            half_width,
            depth,
            fallback: false,
        }
    }

    /// Quad `distance` units ahead that exactly covers the view
    pub fn backdrop_fit(&self, distance: f32) -> BackdropFit {
        let distance = distance.max(MIN_PROJECTION_DEPTH);
        let dir = self.direction();
        let (half_width, half_height) = self.visible_half_extent(distance);
        BackdropFit {
            center: self.position + dir * distance,
            normal: -dir,
            width: half_width * 2.0,
            height: half_height * 2.0,
        }
    }
}

/// Envelope for the plane at world `z`, or a fixed conservative one when
/// the camera is missing or unusable
pub fn spawn_envelope(camera: Option<&CameraView>, z: f32, fallback_half_width: f32) -> SpawnEnvelope {
    match camera {
        Some(camera) if camera.is_valid() => camera.envelope_at(z),
        _ => SpawnEnvelope {
            center_x: 0.0,
            half_width: fallback_half_width,
            depth: MIN_PROJECTION_DEPTH,
            fallback: true,
        },
    }
}
