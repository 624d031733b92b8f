//! Deferred compositor.
//!
//! Scene code queues draw commands per screen through [`CompositorContext`];
//! a flush drains every queue through a [`CompositeBackend`], drawing each
//! command into a scratch target and resolving scratch onto the screen with
//! the command's ink.
//!
//! Convention:
//! - CPU geometry is in working-resolution pixels (top-left origin, +Y down);
//!   tile quads and the resolve quad are in NDC.
//! - Vertex shaders convert pixels to NDC using the `pixel_size` uniform.

pub mod backend;
pub mod context;
pub mod deform;
mod draw;
pub mod gpu;
pub mod ink;
pub mod queue;
pub mod ring;
pub mod shader;
pub mod staging;
pub mod vertex;

pub use backend::{CompositeBackend, FlushInput, LayerTextureDesc, LayoutUpload, SurfaceId};
pub use context::{CompositorContext, FlushStats};
pub use draw::TexturedQuad;
pub use ink::{Ink, Resolve, ResolveKind};
pub use queue::{RenderState, RenderStateQueue};
pub use ring::{Flushed, GeomRange};
pub use shader::{BuiltinShaders, DrawShader, OverrideShaders, ShaderProvider};
pub use vertex::RenderVertex;
