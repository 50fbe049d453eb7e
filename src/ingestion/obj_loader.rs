use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, SegmentationError};
use crate::style::{Color, Style, StyleSet};
use crate::types::Mesh;

/// Load an OBJ file (+ associated MTL) as reference-model meshes.
///
/// tobj starts a new model whenever the material changes, so consecutive
/// models sharing an object name are joined back into one mesh whose faces
/// carry their material's style.
pub fn load_obj(path: &Path) -> Result<Vec<Mesh>> {
    let (models, materials_result) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .map_err(|e| SegmentationError::Input(format!("Failed to load OBJ: {e}")))?;

    debug!(model_count = models.len(), "Loaded OBJ models");

    let tobj_materials = match materials_result {
        Ok(mats) => mats,
        Err(e) => {
            warn!("Failed to load MTL: {e}");
            Vec::new()
        }
    };
    let styles: Vec<Style> = tobj_materials.iter().map(convert_material).collect();

    let mut groups: Vec<(String, Vec<tobj::Model>)> = Vec::new();
    for model in models {
        match groups.last_mut() {
            Some((name, group)) if *name == model.name => group.push(model),
            _ => groups.push((model.name.clone(), vec![model])),
        }
    }

    groups
        .into_iter()
        .map(|(name, models)| convert_group(&name, models, &styles))
        .collect()
}

/// Join a run of same-named tobj models into one styled `Mesh`.
fn convert_group(name: &str, models: Vec<tobj::Model>, styles: &[Style]) -> Result<Mesh> {
    let category = if name.is_empty() { "unnamed" } else { name };
    let mut mesh = Mesh::new(category);
    let mut style_set = StyleSet::new();
    let mut vertex_offset = 0u32;
    let mut face_offset = 0u32;

    for model in models {
        let source = model.mesh;
        let style = source
            .material_id
            .and_then(|id| styles.get(id))
            .copied()
            .unwrap_or_default();

        let indices: Vec<u32> = source.indices.iter().map(|i| i + vertex_offset).collect();
        mesh.append_vertices(&source.positions)?;
        mesh.append_triangles(&indices)?;

        let faces = (indices.len() / 3) as u32;
        for face in face_offset..face_offset + faces {
            style_set.assign(style, face);
        }
        vertex_offset += (source.positions.len() / 3) as u32;
        face_offset += faces;
    }

    mesh.set_styles(style_set);
    Ok(mesh)
}

/// Kd -> diffuse, Ks -> specular, d -> alpha.
fn convert_material(mat: &tobj::Material) -> Style {
    let diffuse = mat
        .diffuse
        .map(|[r, g, b]| Color::new(r, g, b))
        .unwrap_or_else(|| Style::default().diffuse());
    let specular = mat
        .specular
        .map(|[r, g, b]| Color::new(r, g, b))
        .unwrap_or(Color::BLACK);

    Style::new(diffuse, specular, mat.dissolve.unwrap_or(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn model(name: &str, positions: Vec<f32>, indices: Vec<u32>, material_id: Option<usize>) -> tobj::Model {
        let mesh = tobj::Mesh {
            positions,
            normals: vec![],
            texcoords: vec![],
            indices,
            vertex_color: vec![],
            face_arities: vec![],
            texcoord_indices: vec![],
            normal_indices: vec![],
            material_id,
        };
        tobj::Model::new(mesh, name.to_string())
    }

    #[test]
    fn group_offsets_indices_and_styles() {
        let red = Style::opaque(Color::new(1.0, 0.0, 0.0));
        let glass = Style::new(Color::new(0.5, 0.7, 1.0), Color::WHITE, 0.3);
        let styles = [red, glass];

        let models = vec![
            model("Window", vec![0.0; 9], vec![0, 1, 2], Some(0)),
            model("Window", vec![1.0; 12], vec![0, 1, 2, 0, 2, 3], Some(1)),
        ];
        let mesh = convert_group("Window", models, &styles).unwrap();

        assert_eq!(mesh.category(), "Window");
        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.triangles()[1].to_array(), [3, 4, 5]);

        let set = mesh.styles().unwrap();
        assert_eq!(set.styles_in_order(), &[red, glass]);
        assert_eq!(set.ranges_for(&red).unwrap()[0].iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(set.ranges_for(&glass).unwrap()[0].iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn missing_material_uses_default_style() {
        let models = vec![model("", vec![0.0; 9], vec![0, 1, 2], Some(5))];
        let mesh = convert_group("", models, &[]).unwrap();
        assert_eq!(mesh.category(), "unnamed");
        assert_eq!(mesh.styles().unwrap().styles_in_order(), &[Style::default()]);
    }

    #[test]
    fn material_conversion() {
        let mut mat = tobj::Material::default();
        mat.diffuse = Some([0.2, 0.4, 0.6]);
        mat.specular = Some([0.9, 0.9, 0.9]);
        mat.dissolve = Some(0.5);

        let style = convert_material(&mat);
        assert_eq!(style.diffuse(), Color::new(0.2, 0.4, 0.6));
        assert_eq!(style.specular(), Color::new(0.9, 0.9, 0.9));
        assert_eq!(style.alpha(), 0.5);
    }

    #[test]
    fn load_obj_with_two_materials() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("walls.mtl"),
            "newmtl brick\nKd 0.7 0.3 0.2\n\nnewmtl glass\nKd 0.6 0.8 1.0\nd 0.25\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("walls.obj"),
            "\
mtllib walls.mtl
o Wall
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
usemtl brick
f 1 2 3
usemtl glass
f 1 3 4
o Slab
v 0 0 -1
v 1 0 -1
v 1 1 -1
usemtl brick
f 5 6 7
",
        )
        .unwrap();

        let meshes = load_obj(&dir.path().join("walls.obj")).unwrap();
        assert_eq!(meshes.len(), 2);

        let wall = &meshes[0];
        assert_eq!(wall.category(), "Wall");
        assert_eq!(wall.triangle_count(), 2);
        assert_eq!(wall.styles().unwrap().len(), 2);

        let slab = &meshes[1];
        assert_eq!(slab.category(), "Slab");
        assert_eq!(slab.triangle_count(), 1);
        assert_eq!(slab.styles().unwrap().len(), 1);
    }

    #[test]
    fn load_obj_missing_file() {
        assert!(load_obj(Path::new("/nonexistent/model.obj")).is_err());
    }
}
