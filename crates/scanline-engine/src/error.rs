use crate::render::SurfaceId;

/// Errors surfaced by the compositor and its GPU backend.
///
/// Most per-draw problems are not errors: they are logged and the draw is
/// skipped. Only conditions that leave the compositor unusable (or a caller
/// asking for something that does not exist) are reported here.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The built-in pass-through shader failed validation; nothing can be drawn.
    #[error("built-in fallback shader `{name}` failed validation: {message}")]
    FallbackShader { name: &'static str, message: String },

    /// A surface handle was used after destruction or was never created.
    #[error("unknown surface {0:?}")]
    UnknownSurface(SurfaceId),

    /// Pixel data does not match the declared surface dimensions.
    #[error("surface pixels ({len} bytes) do not match {width}x{height}")]
    SurfaceSize { width: u32, height: u32, len: usize },
}
