//! World-space geometry used by the spatial classifiers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in world space. `y` is height; zone radii are measured in full 3-D.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: f32,
    /// Height above sea level.
    pub y: f32,
    /// North-south coordinate.
    pub z: f32,
}

impl Position {
    /// Creates a position from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Returns `true` when `other` lies within `radius` of this position (inclusive).
    #[must_use]
    pub fn within(self, other: Self, radius: f32) -> bool {
        self.distance(other) <= radius
    }

    /// Returns a copy shifted by the supplied offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Terrain-space coordinates in `[0, 1]` on both horizontal axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Normalised east-west coordinate.
    pub x: f32,
    /// Normalised north-south coordinate.
    pub z: f32,
}

/// Horizontal extent of the terrain, used to map world positions onto weight maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    origin_x: f32,
    origin_z: f32,
    size_x: f32,
    size_z: f32,
}

impl WorldBounds {
    /// Creates bounds from the terrain origin (minimum corner) and size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] when either size is not strictly positive
    /// or any component is not finite.
    pub fn new(origin_x: f32, origin_z: f32, size_x: f32, size_z: f32) -> Result<Self> {
        if ![origin_x, origin_z, size_x, size_z]
            .iter()
            .all(|value| value.is_finite())
        {
            return Err(Error::InvalidBounds {
                reason: "bounds must be finite".into(),
            });
        }
        if size_x <= 0.0 || size_z <= 0.0 {
            return Err(Error::InvalidBounds {
                reason: format!("terrain size must be positive, got {size_x}x{size_z}"),
            });
        }

        Ok(Self {
            origin_x,
            origin_z,
            size_x,
            size_z,
        })
    }

    /// Square map of the given world size centred on the origin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] when `world_size` is not strictly positive.
    pub fn centered(world_size: f32) -> Result<Self> {
        Self::new(-world_size / 2.0, -world_size / 2.0, world_size, world_size)
    }

    /// Maps a world position into terrain-space, clamped to the map edges.
    #[must_use]
    pub fn normalize(&self, position: Position) -> NormalizedPoint {
        NormalizedPoint {
            x: ((position.x - self.origin_x) / self.size_x).clamp(0.0, 1.0),
            z: ((position.z - self.origin_z) / self.size_z).clamp(0.0, 1.0),
        }
    }
}
