//! Axis-Aligned Bounding Box
//!
//! Region geometry for protected areas. Built from any two opposite
//! corners; min/max are normalized component-wise.

use serde::{Serialize, Deserialize};

use super::vec3::Vec3;

/// Axis-aligned box spanning `min..=max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Component-wise minimum corner
    pub min: Vec3,
    /// Component-wise maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Build a box from two opposite corners, in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Check whether a point is inside the box (boundary inclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check whether this box intersects another (boundary inclusive).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_any_order() {
        let a = Aabb::from_corners(Vec3::new(5.0, 3.0, 5.0), Vec3::ZERO);
        let b = Aabb::from_corners(Vec3::ZERO, Vec3::new(5.0, 3.0, 5.0));
        assert_eq!(a, b);
        assert_eq!(a.min, Vec3::ZERO);
        assert_eq!(a.max, Vec3::new(5.0, 3.0, 5.0));
    }

    #[test]
    fn test_mixed_corners_normalize() {
        // Corners that are not min/max on every axis
        let region = Aabb::from_corners(Vec3::new(5.0, 0.0, -2.0), Vec3::new(-1.0, 3.0, 4.0));
        assert_eq!(region.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(region.max, Vec3::new(5.0, 3.0, 4.0));
    }

    #[test]
    fn test_contains() {
        let region = Aabb::from_corners(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        assert!(region.contains(Vec3::new(5.0, 5.0, 5.0)));
        assert!(region.contains(Vec3::ZERO)); // boundary
        assert!(region.contains(Vec3::new(10.0, 10.0, 10.0))); // boundary
        assert!(!region.contains(Vec3::new(10.1, 5.0, 5.0)));
        assert!(!region.contains(Vec3::new(5.0, -0.1, 5.0)));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::from_corners(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let b = Aabb::from_corners(Vec3::new(4.0, 4.0, 4.0), Vec3::new(9.0, 9.0, 9.0));
        let c = Aabb::from_corners(Vec3::new(6.0, 6.0, 6.0), Vec3::new(9.0, 9.0, 9.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
