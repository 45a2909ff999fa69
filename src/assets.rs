//! Background glTF model loading.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use glam::{Mat3, Mat4, Vec3};

use crate::model::geometry::{Mesh, Vertex};

/// The three observable outcomes of a load: a progress ratio while the
/// file streams in, the extracted meshes on success, or a reason on
/// failure. Exactly one terminal event is sent.
pub enum LoadEvent {
    Progress(f32),
    Loaded(Vec<Mesh>),
    Failed(String),
}

/// Handle to a model load running on a background thread. Events are
/// delivered over a channel and drained by the host between frames.
pub struct ModelLoader {
    rx: Receiver<LoadEvent>,
}

impl ModelLoader {
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            if let Err(reason) = load_model(&path, &tx) {
                let _ = tx.send(LoadEvent::Failed(reason));
            }
        });
        Self { rx }
    }

    /// Events that arrived since the last poll. Never blocks.
    pub fn poll(&self) -> Vec<LoadEvent> {
        self.rx.try_iter().collect()
    }
}

fn load_model(path: &Path, tx: &Sender<LoadEvent>) -> Result<(), String> {
    let file = std::fs::File::open(path).map_err(|e| format!("open {}: {e}", path.display()))?;
    let total = file
        .metadata()
        .map_err(|e| format!("stat {}: {e}", path.display()))?
        .len()
        .max(1);

    let mut reader = std::io::BufReader::new(file);
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let n = reader
            .read(&mut chunk)
            .map_err(|e| format!("read {}: {e}", path.display()))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        let _ = tx.send(LoadEvent::Progress(bytes.len() as f32 / total as f32));
    }

    let (document, buffers, _images) =
        gltf::import_slice(&bytes).map_err(|e| format!("parse {}: {e}", path.display()))?;

    let meshes = extract_meshes(&document, &buffers);
    if meshes.is_empty() {
        return Err(format!("{}: no mesh data", path.display()));
    }

    tx.send(LoadEvent::Loaded(meshes))
        .map_err(|_| "receiver dropped".to_string())?;
    Ok(())
}

/// Flatten the document's default scene into meshes with node transforms
/// baked into the vertices, so the result attaches as ordinary scene
/// nodes.
fn extract_meshes(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Mesh> {
    let mut meshes = Vec::new();
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return meshes;
    };
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, buffers, &mut meshes);
    }
    meshes
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<Mesh>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global = parent * local;

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buf| buffers.get(buf.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|n| n.collect())
                .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
            let color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            let normal_matrix = Mat3::from_mat4(global);
            let vertices = positions
                .iter()
                .zip(&normals)
                .map(|(p, n)| {
                    let pos = global.transform_point3(Vec3::from_array(*p));
                    let normal = normal_matrix.mul_vec3(Vec3::from_array(*n)).normalize_or_zero();
                    Vertex {
                        pos: pos.to_array(),
                        normal: normal.to_array(),
                        color,
                        uv: [0.0, 0.0],
                    }
                })
                .collect();

            let indices = reader
                .read_indices()
                .map(|ix| ix.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            out.push(Mesh { vertices, indices });
        }
    }

    for child in node.children() {
        collect_node(&child, global, buffers, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_failure() {
        let loader = ModelLoader::spawn(PathBuf::from("/nonexistent/model.glb"));
        // the loader thread is short-lived for a missing file
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let events = loader.poll();
            if events
                .iter()
                .any(|e| matches!(e, LoadEvent::Failed(reason) if reason.contains("model.glb")))
            {
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "expected a Failed event"
            );
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }

    #[test]
    fn test_garbage_bytes_fail_parse() {
        let dir = std::env::temp_dir();
        let path = dir.join("meadow_test_garbage.glb");
        std::fs::write(&path, b"not a gltf file at all").unwrap();

        let (tx, rx) = channel();
        let result = load_model(&path, &tx);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        // progress events were still streamed before the parse failed
        assert!(rx.try_iter().any(|e| matches!(e, LoadEvent::Progress(r) if r > 0.99)));
    }
}
