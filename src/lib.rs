//! # orbswarm
//!
//! A real-time 3D swarm. A hundred rigid spheres are pulled toward the origin
//! by a constant force while an "invader" sphere follows the mouse and shoves
//! them aside. The swarm is drawn with a custom shader and a wireframe
//! overlay in front of a slowly tumbling starfield, and the frame goes
//! through a bloom pass before it reaches the screen.
//!
//! ## Quick Start
//!
//! ```ignore
//! use orbswarm::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new(SwarmConfig::default()).run()
//! }
//! ```
//!
//! ## Headless
//!
//! Everything but the renderer lives in [`Scene`], which runs without a
//! window:
//!
//! ```ignore
//! let mut scene = Scene::new(SwarmConfig::default().with_seed(7));
//! scene.run_ticks(60, &PointerState::default());
//! assert!(!scene.has_non_finite());
//! ```
//!
//! ## Tick Order
//!
//! | Step | Where |
//! |------|-------|
//! | Orbit controls | [`OrbitControls::update`] |
//! | Physics step | [`PhysicsWorld::step`] |
//! | Invader to pointer | [`PointerBody::update`] |
//! | Pull and mesh sync | [`BodyEntity::update`] |
//! | Starfield rotation | [`Starfield::advance`] |
//! | Scene pass, bloom, present | [`gpu::GpuState::render`] |

pub mod body;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod physics;
pub mod pointer;
pub mod scene;
mod simulation;
pub mod spawn;
pub mod starfield;
pub mod time;

pub use body::{center_pull, BodyEntity, MeshInstance};
pub use config::{BloomSettings, CameraSettings, ShaderSource, SwarmConfig};
pub use error::{GpuError, SimulationError};
pub use glam::{Vec2, Vec3};
pub use gpu::{Camera, OrbitControls};
pub use physics::PhysicsWorld;
pub use pointer::{PointerBody, PointerState};
pub use scene::Scene;
pub use simulation::{LoopControl, Simulation};
pub use starfield::Starfield;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use orbswarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{BloomSettings, CameraSettings, ShaderSource, SwarmConfig};
    pub use crate::error::SimulationError;
    pub use crate::pointer::PointerState;
    pub use crate::scene::Scene;
    pub use crate::simulation::{LoopControl, Simulation};
    pub use crate::{Vec2, Vec3};
}
