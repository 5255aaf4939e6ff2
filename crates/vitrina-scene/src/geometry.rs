//! Mesh data extraction and model fitting

use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;
use vitrina_core::Aabb;

/// Geometry of one mesh, transformed into the model root's space
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub triangles: Vec<[Vec3; 3]>,
}

/// Read positions, normals and triangles of a triangle-list mesh.
///
/// Returns `None` for other topologies or meshes without positions.
pub fn extract_geometry(mesh: &Mesh, transform: &Mat4) -> Option<MeshGeometry> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        return None;
    }
    let Some(VertexAttributeValues::Float32x3(local_positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
        return None;
    };

    let positions: Vec<[f32; 3]> = local_positions
        .iter()
        .map(|p| transform.transform_point3(Vec3::from_array(*p)).to_array())
        .collect();

    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();
    let normals = match mesh.attribute(Mesh::ATTRIBUTE_NORMAL) {
        Some(VertexAttributeValues::Float32x3(local_normals)) => local_normals
            .iter()
            .map(|n| (normal_matrix * Vec3::from_array(*n)).normalize_or_zero().to_array())
            .collect(),
        _ => Vec::new(),
    };

    let indices: Vec<usize> = match mesh.indices() {
        Some(Indices::U16(values)) => values.iter().map(|&i| i as usize).collect(),
        Some(Indices::U32(values)) => values.iter().map(|&i| i as usize).collect(),
        None => (0..positions.len()).collect(),
    };

    let triangles = indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let a = positions.get(tri[0])?;
            let b = positions.get(tri[1])?;
            let c = positions.get(tri[2])?;
            Some([Vec3::from_array(*a), Vec3::from_array(*b), Vec3::from_array(*c)])
        })
        .collect();

    Some(MeshGeometry {
        positions,
        normals,
        triangles,
    })
}

/// Local transform of an entity as a matrix
pub fn transform_matrix(transform: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(transform.scale, transform.rotation, transform.translation)
}

/// Root transform that centres `bounds` on the origin and shrinks it so its
/// largest side is at most `max_dimension`
pub fn fit_transform(bounds: &Aabb, max_dimension: f32) -> Transform {
    let size = bounds.max_dimension();
    let scale = if size > max_dimension && size > 0.0 {
        max_dimension / size
    } else {
        1.0
    };
    Transform {
        translation: -bounds.center() * scale,
        rotation: Quat::IDENTITY,
        scale: Vec3::splat(scale),
    }
}

/// Bring a world-space ray into the model root's space
pub fn ray_to_model_space(origin: Vec3, direction: Vec3, root: &Transform) -> vitrina_core::Ray {
    let inverse = transform_matrix(root).inverse();
    vitrina_core::Ray::new(
        inverse.transform_point3(origin),
        inverse.transform_vector3(direction).normalize_or_zero(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::primitives::Cuboid;

    #[test]
    fn test_extract_cuboid() {
        let mesh = Mesh::from(Cuboid::new(2.0, 2.0, 2.0));
        let geometry = extract_geometry(&mesh, &Mat4::IDENTITY).unwrap();
        assert_eq!(geometry.triangles.len(), 12);
        assert_eq!(geometry.positions.len(), geometry.normals.len());

        let bounds = Aabb::from_points(geometry.triangles.iter().flatten().copied()).unwrap();
        assert_eq!(bounds.min, Vec3::splat(-1.0));
        assert_eq!(bounds.max, Vec3::splat(1.0));
    }

    #[test]
    fn test_extract_applies_transform() {
        let mesh = Mesh::from(Cuboid::new(1.0, 1.0, 1.0));
        let transform = Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0));
        let geometry = extract_geometry(&mesh, &transform_matrix(&transform)).unwrap();

        let bounds = Aabb::from_points(geometry.triangles.iter().flatten().copied()).unwrap();
        assert!((bounds.center() - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
        assert!((bounds.max_dimension() - 2.0).abs() < 1e-5);
        for n in &geometry.normals {
            assert!((Vec3::from_array(*n).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_fit_shrinks_large_models() {
        let bounds = Aabb {
            min: Vec3::new(10.0, 0.0, 0.0),
            max: Vec3::new(30.0, 4.0, 2.0),
        };
        let fit = fit_transform(&bounds, 5.0);
        assert!((fit.scale.x - 0.25).abs() < 1e-6);
        let centred = fit.transform_point(bounds.center());
        assert!(centred.length() < 1e-5);
    }

    #[test]
    fn test_fit_keeps_small_models() {
        let bounds = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let fit = fit_transform(&bounds, 5.0);
        assert_eq!(fit.scale, Vec3::ONE);
        assert_eq!(fit.translation, Vec3::ZERO);
    }

    #[test]
    fn test_ray_to_model_space() {
        let root = Transform {
            translation: Vec3::new(-5.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(0.5),
        };
        let ray = ray_to_model_space(Vec3::new(-5.0, 0.0, 10.0), Vec3::NEG_Z, &root);
        assert!((ray.origin - Vec3::new(0.0, 0.0, 20.0)).length() < 1e-5);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
    }
}
