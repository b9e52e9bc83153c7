//! WebGPU rendering module
//!
//! Read-only over the simulation: `scene` flattens `GameState` into a vertex
//! list, `pipeline` uploads and draws it.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
