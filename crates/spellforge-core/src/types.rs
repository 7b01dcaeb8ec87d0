//! Core types used throughout the Spellforge simulation

use std::fmt;

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for simulated entities (casters, props, projectiles)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first group is enough to tell entities apart in logs.
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

/// Position and orientation of an entity. Forward is -Z, up is +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a transform at `position` whose forward axis points along `direction`,
    /// keeping world up as up (no roll). A zero direction keeps the identity rotation.
    pub fn facing(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            rotation: look_rotation(direction, Vec3::Y),
        }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Get the up direction (positive Y in local space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Convert a point from local space to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Translate by the given offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

/// Rotation whose -Z axis points along `forward` with `up` as the reference up.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let right = forward.cross(up);
    if right.length_squared() < 1e-6 {
        // Looking straight up or down: any roll is as good as another.
        return Quat::from_rotation_arc(Vec3::NEG_Z, forward);
    }
    let right = right.normalize();
    let up = right.cross(forward);

    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_default_forward_is_neg_z() {
        let transform = Transform::default();
        assert_eq!(transform.forward(), Vec3::NEG_Z);
        assert_eq!(transform.up(), Vec3::Y);
    }

    #[test]
    fn test_facing_points_forward() {
        let transform = Transform::facing(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(transform.forward(), Vec3::X));
        assert!(approx(transform.up(), Vec3::Y));
    }

    #[test]
    fn test_facing_straight_up() {
        let transform = Transform::facing(Vec3::ZERO, Vec3::Y);
        assert!(approx(transform.forward(), Vec3::Y));
    }

    #[test]
    fn test_facing_zero_direction_keeps_identity() {
        let transform = Transform::facing(Vec3::ONE, Vec3::ZERO);
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.position, Vec3::ONE);
    }

    #[test]
    fn test_transform_point() {
        let transform = Transform::facing(Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        // One unit "forward" in local space is -Z
        let world = transform.transform_point(Vec3::NEG_Z);
        assert!(approx(world, Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_entity_ids_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
        assert_eq!(EntityId::new().to_string().len(), 8);
    }
}
