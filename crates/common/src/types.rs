use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cube in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for logs and overlays.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a graphics-backend cube resource (geometry + material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// Cube transform: position in world space and Euler rotation about X and Y.
///
/// Rotation is kept in `[0, TAU)` on each axis; it only ever feeds periodic
/// functions, so wrapping is invisible and keeps f32 precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeTransform {
    pub position: Vec3,
    pub rotation: Vec2,
}

impl CubeTransform {
    /// Transform at `(x, y, depth)` with no rotation.
    pub fn at(xy: Vec2, depth: f32) -> Self {
        Self {
            position: xy.extend(depth),
            rotation: Vec2::ZERO,
        }
    }
}

impl Default for CubeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(EntityId::new().short().len(), 8);
    }

    #[test]
    fn transform_at_places_depth() {
        let t = CubeTransform::at(Vec2::new(3.0, -3.0), -10.0);
        assert_eq!(t.position, Vec3::new(3.0, -3.0, -10.0));
        assert_eq!(t.rotation, Vec2::ZERO);
    }
}
