//! glTF and image loading.
//!
//! Loaders return [`DemoError::Asset`] on failure; the `*_or_*` helpers log a warning and
//! hand back a placeholder so the demos keep running without their asset directory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;

use crate::error::{AssetError, DemoError};
use crate::model::{AnimationClip, BoneTrack, Channel, ClipSet, Joint, Skeleton, Transform};
use crate::utils::{Mesh, Vertex};

/// Every triangle primitive in the default scene, with node transforms baked in.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh, DemoError> {
    let path = path.as_ref();
    let mesh = import(path).and_then(|(document, buffers)| {
        let mut mesh = Mesh::empty();
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(AssetError::NoPrimitives)?;
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, &mut mesh)?;
        }
        if mesh.is_empty() {
            return Err(AssetError::NoPrimitives);
        }
        Ok(mesh)
    });

    match mesh {
        Ok(mesh) => {
            tracing::info!(
                path = %path.display(),
                vertices = mesh.vertices.len(),
                triangles = mesh.indices.len() / 3,
                "loaded mesh"
            );
            Ok(mesh)
        }
        Err(source) => Err(DemoError::asset(path, source)),
    }
}

/// [`load_mesh`], or `None` after logging why it failed.
pub fn load_mesh_or_warn(path: impl AsRef<Path>) -> Option<Mesh> {
    match load_mesh(path) {
        Ok(mesh) => Some(mesh),
        Err(e) => {
            tracing::warn!("{e}; using placeholder cube");
            None
        }
    }
}

pub fn load_texture(path: impl AsRef<Path>) -> Result<image::RgbaImage, DemoError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| DemoError::asset(path, e))?;
    let rgba = img.to_rgba8();
    tracing::info!(path = %path.display(), width = rgba.width(), height = rgba.height(), "loaded texture");
    Ok(rgba)
}

/// 1×1 opaque white, used when a texture is missing.
pub fn white_texture() -> image::RgbaImage {
    image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))
}

pub fn load_texture_or_white(path: impl AsRef<Path>) -> image::RgbaImage {
    load_texture(path).unwrap_or_else(|e| {
        tracing::warn!("{e}; using white texture");
        white_texture()
    })
}

/// Loads three clips sharing the skeleton of the first file. Channels in the other
/// files are matched to joints by node name.
pub fn load_clip_set(
    idle: impl AsRef<Path>,
    walk: impl AsRef<Path>,
    dance: impl AsRef<Path>,
) -> Result<ClipSet, DemoError> {
    let idle = idle.as_ref();
    let (document, buffers) = import(idle).map_err(|e| DemoError::asset(idle, e))?;
    let skeleton = read_skeleton(&document, &buffers)
        .map(Arc::new)
        .map_err(|e| DemoError::asset(idle, e))?;
    tracing::info!(path = %idle.display(), joints = skeleton.len(), "loaded skeleton");

    let idle_clip = read_clip(&document, &buffers, &skeleton, "idle")
        .map_err(|e| DemoError::asset(idle, e))?;
    let walk_clip = load_clip(walk.as_ref(), &skeleton, "walk")?;
    let dance_clip = load_clip(dance.as_ref(), &skeleton, "dance")?;

    Ok(ClipSet {
        idle: Arc::new(idle_clip),
        walk: Arc::new(walk_clip),
        dance: Arc::new(dance_clip),
    })
}

/// [`load_clip_set`], falling back to the procedural stick figure.
pub fn load_clip_set_or_procedural(
    idle: impl AsRef<Path>,
    walk: impl AsRef<Path>,
    dance: impl AsRef<Path>,
) -> ClipSet {
    load_clip_set(idle, walk, dance).unwrap_or_else(|e| {
        tracing::warn!("{e}; using procedural rig");
        ClipSet::procedural()
    })
}

fn load_clip(path: &Path, skeleton: &Arc<Skeleton>, name: &str) -> Result<AnimationClip, DemoError> {
    let (document, buffers) = import(path).map_err(|e| DemoError::asset(path, e))?;
    let clip = read_clip(&document, &buffers, skeleton, name).map_err(|e| DemoError::asset(path, e))?;
    tracing::info!(path = %path.display(), clip = name, duration = clip.duration, "loaded clip");
    Ok(clip)
}

fn import(path: &Path) -> Result<(gltf::Document, Vec<gltf::buffer::Data>), AssetError> {
    let (document, buffers, _images) = gltf::import(path)?;
    Ok((document, buffers))
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Mesh,
) -> Result<(), AssetError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed");
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let mut part = read_primitive(&primitive, buffers, name)?;
            part.transform(world);
            out.append(&part);
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    name: &str,
) -> Result<Mesh, AssetError> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(|iter| iter.collect())
        .ok_or_else(|| AssetError::MissingPositions(name.to_string()))?;
    let count = positions.len();

    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|iter| iter.collect())
        .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; count]);
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|tc| tc.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; count]);
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..count as u32).collect());

    let vertices = positions
        .into_iter()
        .enumerate()
        .map(|(i, pos)| Vertex {
            pos,
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();

    Ok(Mesh { vertices, indices })
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn read_skeleton(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Skeleton, AssetError> {
    let skin = document.skins().next().ok_or(AssetError::NoSkin)?;

    let mut parent_of: HashMap<usize, usize> = HashMap::new();
    for node in document.nodes() {
        for child in node.children() {
            parent_of.insert(child.index(), node.index());
        }
    }

    let joint_nodes: Vec<gltf::Node> = skin.joints().collect();
    let joint_of: HashMap<usize, usize> = joint_nodes
        .iter()
        .enumerate()
        .map(|(joint, node)| (node.index(), joint))
        .collect();

    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let inverse_binds: Vec<Mat4> = reader
        .read_inverse_bind_matrices()
        .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
        .unwrap_or_default();

    let joints = joint_nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let (t, r, s) = node.transform().decomposed();
            Joint {
                name: node_name(node),
                parent: parent_of
                    .get(&node.index())
                    .and_then(|p| joint_of.get(p))
                    .copied(),
                rest: Transform {
                    translation: Vec3::from(t),
                    rotation: Quat::from_array(r),
                    scale: Vec3::from(s),
                },
                inverse_bind: inverse_binds.get(i).copied().unwrap_or(Mat4::IDENTITY),
            }
        })
        .collect();

    Ok(Skeleton::new(joints))
}

/// Cubic-spline samplers store (in-tangent, value, out-tangent) triples; keep the values.
fn keyframe_values<T: Copy>(values: Vec<T>, interpolation: Interpolation) -> Vec<T> {
    match interpolation {
        Interpolation::CubicSpline => values.chunks(3).filter_map(|c| c.get(1).copied()).collect(),
        Interpolation::Linear | Interpolation::Step => values,
    }
}

fn read_clip(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    skeleton: &Arc<Skeleton>,
    fallback_name: &str,
) -> Result<AnimationClip, AssetError> {
    let animation = document.animations().next().ok_or(AssetError::NoAnimation)?;
    let mut tracks: Vec<Option<BoneTrack>> = vec![None; skeleton.len()];

    for channel in animation.channels() {
        let target = channel.target().node();
        let Some(joint) = skeleton.find(&node_name(&target)) else {
            continue;
        };
        let interpolation = channel.sampler().interpolation();
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(times) = reader.read_inputs().map(|iter| iter.collect::<Vec<f32>>()) else {
            continue;
        };
        let Some(outputs) = reader.read_outputs() else {
            continue;
        };

        let track = tracks[joint].get_or_insert_with(BoneTrack::default);
        match outputs {
            ReadOutputs::Translations(iter) => {
                let values = keyframe_values(iter.map(Vec3::from).collect(), interpolation);
                track.translation = Some(Channel::new(times, values));
            }
            ReadOutputs::Rotations(rotations) => {
                let values = keyframe_values(
                    rotations.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                );
                track.rotation = Some(Channel::new(times, values));
            }
            ReadOutputs::Scales(iter) => {
                let values = keyframe_values(iter.map(Vec3::from).collect(), interpolation);
                track.scale = Some(Channel::new(times, values));
            }
            ReadOutputs::MorphTargetWeights(_) => {}
        }
    }

    let name = animation.name().unwrap_or(fallback_name);
    Ok(AnimationClip::new(name, Arc::clone(skeleton), tracks, None))
}
