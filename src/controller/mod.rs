// CONTROLLER: input, game logic, and update loop
pub mod animator;
pub mod camera_controller;
pub mod character;
pub mod frame_loop;
pub mod game;
pub mod input;
pub mod physics;
pub mod player;

pub use animator::Animator;
pub use camera_controller::FlyCameraController;
pub use character::{PlaybackController, PlaybackState};
pub use frame_loop::{Demo, DrawItem, DrawList, Flow, FrameClock, FrameInfo, Hud, SceneAssets};
pub use game::FetchGame;
pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, MoveIntent};
pub use physics::{CollisionOutcome, CollisionSystem};
pub use player::{FollowCamera, PlayerController, Pose};
