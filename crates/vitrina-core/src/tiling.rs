//! World-space texture tiling
//!
//! Imported meshes carry arbitrary UV layouts, so texture coordinates are
//! regenerated from vertex positions with a box projection. Each vertex is
//! projected on the plane facing its dominant normal axis, which keeps texture
//! density constant across meshes regardless of how they were unwrapped.

use serde::{Deserialize, Serialize};

use crate::material::MaterialConventions;

/// Repeat and offset applied to projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Texture repeats per world unit
    pub tiling: f32,
    /// Offset added to both coordinates after scaling
    pub offset: f32,
}

impl TilingConfig {
    /// Resolve optional overrides. A missing offset follows the tiling factor.
    pub fn resolve(tiling: Option<f32>, offset: Option<f32>, conventions: &MaterialConventions) -> Self {
        let tiling = tiling.unwrap_or(conventions.tiling);
        let offset = offset.unwrap_or(tiling * conventions.offset_ratio);
        Self { tiling, offset }
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self::resolve(None, None, &MaterialConventions::default())
    }
}

/// Box-projected texture coordinates for a vertex set.
///
/// `positions` and `normals` must be in the space whose units define texture
/// density (world space for the viewer). Missing normals fall back to the Z plane.
pub fn box_project(positions: &[[f32; 3]], normals: &[[f32; 3]], config: &TilingConfig) -> Vec<[f32; 2]> {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]);
            let (ax, ay, az) = (n[0].abs(), n[1].abs(), n[2].abs());
            let (u, v) = if ax >= ay && ax >= az {
                (p[2], p[1])
            } else if ay >= az {
                (p[0], p[2])
            } else {
                (p[0], p[1])
            };
            [
                u * config.tiling + config.offset,
                v * config.tiling + config.offset,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offset_ratio() {
        let config = TilingConfig::default();
        assert_eq!(config.tiling, 0.25);
        assert!((config.offset - 0.25 * 0.726).abs() < 1e-6);
    }

    #[test]
    fn test_offset_follows_tiling_override() {
        let conventions = MaterialConventions::default();
        let config = TilingConfig::resolve(Some(1.0), None, &conventions);
        assert!((config.offset - 0.726).abs() < 1e-6);

        let config = TilingConfig::resolve(Some(1.0), Some(0.0), &conventions);
        assert_eq!(config.offset, 0.0);
    }

    #[test]
    fn test_box_projection_picks_dominant_axis() {
        let config = TilingConfig { tiling: 1.0, offset: 0.0 };
        let positions = [[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]];
        let normals = [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]];

        let uvs = box_project(&positions, &normals, &config);
        assert_eq!(uvs[0], [3.0, 2.0]);
        assert_eq!(uvs[1], [1.0, 3.0]);
        assert_eq!(uvs[2], [1.0, 2.0]);
    }

    #[test]
    fn test_density_independent_of_mesh() {
        // Two faces at different places with the same orientation share the same density
        let config = TilingConfig { tiling: 0.5, offset: 0.1 };
        let a = box_project(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]], &[], &config);
        let b = box_project(&[[10.0, 4.0, 7.0], [12.0, 4.0, 7.0]], &[], &config);
        assert!(((a[1][0] - a[0][0]) - (b[1][0] - b[0][0])).abs() < 1e-6);
        assert!((a[0][0] - 0.1).abs() < 1e-6);
    }
}
