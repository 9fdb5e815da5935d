// MODEL: scene data and pure per-frame math
pub mod camera;
pub mod collision;
pub mod light;
pub mod pickup;
pub mod rig;
pub mod sculpture;
pub mod skeleton;

pub use camera::Camera;
pub use collision::Aabb;
pub use light::{LightSource, PointLight, SceneLighting, SpotLight, DirectionalLight};
pub use pickup::{Obstacle, Pickup};
pub use rig::ClipSet;
pub use sculpture::{Instance, Sculpture};
pub use skeleton::{AnimationClip, BoneTrack, Channel, Joint, Skeleton, Transform};
