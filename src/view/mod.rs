// VIEW: rendering, windowing and asset import
pub mod app;
pub mod assets;
pub mod gpu_init;
pub mod render;

pub use app::run;
pub use gpu_init::GpuContext;
pub use render::{CameraUniform, InstanceRaw, LightingUniform, Renderer, UiFrame};
