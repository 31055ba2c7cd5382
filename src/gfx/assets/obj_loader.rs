use cgmath::Vector3;
use std::path::{Path, PathBuf};

use super::{AssetLoader, AssetRef, TemplateNode};
use crate::error::{DioramaError, Result};
use crate::gfx::camera::first_person::{CAMERA_POSITION_ANCHOR, CAMERA_TARGET_ANCHOR};
use crate::gfx::picking::AABB;
use crate::gfx::resources::material::Material;
use crate::gfx::scene::graph::NodeTransform;

/// Loads `<base_dir>/<reference>.obj` with `tobj`
///
/// Each OBJ object becomes a mesh part named after it. Objects named like
/// a camera anchor become empty groups placed at their vertex centroid.
#[derive(Debug, Clone)]
pub struct ObjAssetLoader {
    base_dir: PathBuf,
}

impl ObjAssetLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path_for(&self, reference: &AssetRef) -> PathBuf {
        self.base_dir.join(format!("{}.obj", reference.as_str()))
    }

    fn load_path(&self, reference: &AssetRef, path: &Path) -> Result<TemplateNode> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| DioramaError::AssetLoad {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("no usable MTL for '{}' ({}), using default materials", reference, e);
            Vec::new()
        });

        if models.is_empty() {
            return Err(DioramaError::AssetLoad {
                reference: reference.to_string(),
                reason: "file contains no objects".to_string(),
            });
        }

        let mut root = TemplateNode::group(reference.as_str());
        for (i, model) in models.iter().enumerate() {
            let name = if model.name.is_empty() {
                format!("part_{}", i)
            } else {
                model.name.clone()
            };
            let vertices: Vec<[f32; 3]> = model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            if name == CAMERA_POSITION_ANCHOR || name == CAMERA_TARGET_ANCHOR {
                let position = centroid(&vertices).unwrap_or(Vector3::new(0.0, 0.0, 0.0));
                root = root.with_child(
                    TemplateNode::group(&name)
                        .with_transform(NodeTransform::from_position(position)),
                );
                continue;
            }

            let mut material = Material {
                name: name.clone(),
                ..Material::default()
            };
            if let Some(mtl) = model.mesh.material_id.and_then(|id| materials.get(id)) {
                if let Some([r, g, b]) = mtl.diffuse {
                    material = material.with_color(r, g, b);
                }
                if let Some(alpha) = mtl.dissolve {
                    material = material.with_alpha(alpha);
                }
            }

            root = root.with_child(TemplateNode::mesh(
                &name,
                material,
                AABB::from_vertices(&vertices),
            ));
        }

        log::info!(
            "loaded '{}' from {}: {} part(s)",
            reference,
            path.display(),
            root.children.len()
        );
        Ok(root)
    }
}

fn centroid(vertices: &[[f32; 3]]) -> Option<Vector3<f32>> {
    if vertices.is_empty() {
        return None;
    }
    let sum = vertices
        .iter()
        .fold(Vector3::new(0.0, 0.0, 0.0), |acc, v| acc + Vector3::from(*v));
    Some(sum / vertices.len() as f32)
}

impl AssetLoader for ObjAssetLoader {
    fn load(&self, reference: &AssetRef) -> Result<TemplateNode> {
        self.load_path(reference, &self.path_for(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::graph::NodeKind;
    use cgmath::InnerSpace;
    use std::fs;

    const STATUE: &str = "\
o torso
v 0 0 0
v 1 0 0
v 0 2 0
f 1 2 3
o camera_position
v 0 1 3
v 0.3 1 3
v 0 1.3 3
f 4 5 6
";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diorama-{}-{}", name, std::process::id()));
        fs::create_dir_all(dir.join("models")).unwrap();
        dir
    }

    #[test]
    fn test_loads_parts_and_anchor() {
        let dir = scratch_dir("obj");
        fs::write(dir.join("models/statue.obj"), STATUE).unwrap();

        let loader = ObjAssetLoader::new(&dir);
        let template = loader.load(&AssetRef::new("models/statue")).unwrap();

        let torso = template.find("torso").unwrap();
        assert_eq!(torso.kind, NodeKind::Mesh);
        let bounds = torso.bounds.unwrap();
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 0.0));

        let anchor = template.find(CAMERA_POSITION_ANCHOR).unwrap();
        assert_eq!(anchor.kind, NodeKind::Group);
        let expected = Vector3::new(0.1, 1.1, 3.0);
        assert!((anchor.transform.position - expected).magnitude() < 1e-4);

        let material = torso.material.as_ref().unwrap();
        assert_eq!(material.name, "torso");
        assert_eq!(material.base_color, Material::default().base_color);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_mtl_color_and_dissolve_carry_over() {
        let dir = scratch_dir("mtl");
        fs::write(
            dir.join("models/ghost.mtl"),
            "newmtl veil\nKd 0.2 0.4 0.6\nd 0.25\n\nnewmtl base\nKd 0.1 0.1 0.1\n",
        )
        .unwrap();
        fs::write(
            dir.join("models/ghost.obj"),
            "mtllib ghost.mtl\n\
             o veil\nusemtl veil\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
             o base\nusemtl base\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n",
        )
        .unwrap();

        let loader = ObjAssetLoader::new(&dir);
        let template = loader.load(&AssetRef::new("models/ghost")).unwrap();

        let veil = template.find("veil").unwrap().material.as_ref().unwrap();
        assert_eq!(veil.base_color, [0.2, 0.4, 0.6, 0.25]);
        let base = template.find("base").unwrap().material.as_ref().unwrap();
        assert_eq!(base.base_color, [0.1, 0.1, 0.1, 1.0]);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_is_an_asset_error() {
        let loader = ObjAssetLoader::new(scratch_dir("missing"));
        let err = loader.load(&AssetRef::new("models/nowhere")).unwrap_err();
        assert!(matches!(err, DioramaError::AssetLoad { .. }));
    }
}
