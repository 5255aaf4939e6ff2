//! Ray intersection against model triangles.
//!
//! Triangles are tested with the Moller-Trumbore algorithm. Each mesh keeps an
//! axis-aligned bounding box so most meshes are rejected with a slab test before
//! any triangle is visited.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-6;

/// A ray expressed in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection.
///
/// Both faces count as hits. Hits behind the origin are rejected.
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a point set, `None` when empty
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Aabb { min: first, max: first };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// Slab test. Returns the entry distance, clamped to zero when the origin is inside.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// Closest hit over a triangle list, brute force
pub fn raycast_triangles(ray: &Ray, triangles: &[[Vec3; 3]]) -> Option<TriangleHit> {
    let mut closest: Option<TriangleHit> = None;
    for [v0, v1, v2] in triangles {
        if let Some(hit) = ray_triangle_intersection(ray, *v0, *v1, *v2) {
            if closest.map_or(true, |prev| hit.t < prev.t) {
                closest = Some(hit);
            }
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Vec3; 3] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_ray_triangle_hit() {
        let [v0, v1, v2] = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z);

        let hit = ray_triangle_intersection(&ray, v0, v1, v2).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.u - 0.25).abs() < 1e-5);
        assert!((hit.v - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let [v0, v1, v2] = unit_triangle();
        let ray = Ray::new(Vec3::new(2.0, 2.0, 1.0), Vec3::NEG_Z);
        assert!(ray_triangle_intersection(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_ray_triangle_behind() {
        let [v0, v1, v2] = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::Z);
        assert!(ray_triangle_intersection(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_ray_triangle_back_face() {
        let [v0, v1, v2] = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::Z);
        assert!(ray_triangle_intersection(&ray, v0, v1, v2).is_some());
    }

    #[test]
    fn test_closest_triangle_wins() {
        let near = unit_triangle().map(|v| v + Vec3::new(0.0, 0.0, 0.5));
        let far = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 2.0), Vec3::NEG_Z);

        let hit = raycast_triangles(&ray, &[far, near]).unwrap();
        assert!((hit.t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_slab() {
        let bounds = Aabb::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]).unwrap();

        let toward = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!((bounds.intersect(&toward).unwrap() - 4.0).abs() < 1e-5);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(bounds.intersect(&away).is_none());

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(bounds.intersect(&inside), Some(0.0));

        let parallel_outside = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(bounds.intersect(&parallel_outside).is_none());
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());

        let bounds = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 4.0, 2.0),
        ])
        .unwrap();
        assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(bounds.max_dimension(), 6.0);
    }
}
