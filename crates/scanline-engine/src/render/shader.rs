//! Draw shaders and the shader source layer.
//!
//! A queued draw names its shader with [`DrawShader`], which carries the
//! per-draw arguments (staged attributes, palette snapshot, radius). Shader
//! sources are looked up by logical name through a [`ShaderProvider`]; the
//! [`ShaderLibrary`] compiles them and substitutes the built-in pass-through
//! shader for anything missing or invalid.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::RenderError;

use super::ink::ResolveKind;
use super::staging::StagingSlice;

/// Deformation a tile draw samples with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TileKind {
    HScroll,
    VScroll,
    Rotozoom,
}

/// Drawing shader of a queued command plus its arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawShader {
    Tile {
        layer: u8,
        kind: TileKind,
        attributes: StagingSlice,
        palette: StagingSlice,
        /// Layout extent in tiles (`1 << width_shift`, `1 << height_shift`).
        layer_size: [u32; 2],
    },
    /// Indexed sprite sampled from the draw's surface.
    Sprite {
        attributes: StagingSlice,
        palette: StagingSlice,
    },
    #[default]
    Rect,
    Circle {
        /// Inner radius as a fraction of the outer radius; `0` draws a disc.
        inner_radius: f32,
    },
    /// Glyphs from the draw's surface tinted with the vertex color.
    DevText,
}

/// Pipeline selector for a draw shader, arguments stripped.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawKind {
    TileHScroll,
    TileVScroll,
    TileRotozoom,
    Sprite,
    Rect,
    Circle,
    DevText,
}

impl DrawKind {
    pub const ALL: [DrawKind; 7] = [
        DrawKind::TileHScroll,
        DrawKind::TileVScroll,
        DrawKind::TileRotozoom,
        DrawKind::Sprite,
        DrawKind::Rect,
        DrawKind::Circle,
        DrawKind::DevText,
    ];

    pub fn shader_name(self) -> &'static str {
        match self {
            DrawKind::TileHScroll => "tile_hscroll",
            DrawKind::TileVScroll => "tile_vscroll",
            DrawKind::TileRotozoom => "tile_rotozoom",
            DrawKind::Sprite => "sprite",
            DrawKind::Rect => "rect",
            DrawKind::Circle => "circle",
            DrawKind::DevText => "devtext",
        }
    }
}

impl DrawShader {
    pub fn kind(&self) -> DrawKind {
        match self {
            DrawShader::Tile { kind: TileKind::HScroll, .. } => DrawKind::TileHScroll,
            DrawShader::Tile { kind: TileKind::VScroll, .. } => DrawKind::TileVScroll,
            DrawShader::Tile { kind: TileKind::Rotozoom, .. } => DrawKind::TileRotozoom,
            DrawShader::Sprite { .. } => DrawKind::Sprite,
            DrawShader::Rect => DrawKind::Rect,
            DrawShader::Circle { .. } => DrawKind::Circle,
            DrawShader::DevText => DrawKind::DevText,
        }
    }

    /// True when the draw samples the command's surface texture.
    #[inline]
    pub fn uses_surface(&self) -> bool {
        matches!(self, DrawShader::Sprite { .. } | DrawShader::DevText)
    }
}

pub fn resolve_shader_name(kind: ResolveKind) -> &'static str {
    match kind {
        ResolveKind::None => "ink_none",
        ResolveKind::Blend => "ink_blend",
        ResolveKind::Alpha => "ink_alpha",
        ResolveKind::Add => "ink_add",
        ResolveKind::Subtract => "ink_subtract",
        ResolveKind::Tint => "ink_tint",
        ResolveKind::Masked => "ink_masked",
        ResolveKind::Unmasked => "ink_unmasked",
        ResolveKind::Fill => "fill",
    }
}

/// Logical name of the built-in pass-through shader.
pub const FALLBACK_SHADER: &str = "passthrough";

/// Source of WGSL programs by logical name.
pub trait ShaderProvider {
    /// Returns the WGSL source for `name`, or `None` if it has none.
    fn source(&self, name: &str) -> Option<Cow<'static, str>>;
}

/// Shaders compiled into the crate.
#[derive(Debug, Copy, Clone, Default)]
pub struct BuiltinShaders;

const DRAW_COMMON: &str = include_str!("shaders/draw_common.wgsl");
const TILE_COMMON: &str = include_str!("shaders/tile_common.wgsl");
const RESOLVE_COMMON: &str = include_str!("shaders/resolve_common.wgsl");

impl ShaderProvider for BuiltinShaders {
    fn source(&self, name: &str) -> Option<Cow<'static, str>> {
        let tile = |body: &str| Cow::Owned(format!("{DRAW_COMMON}\n{TILE_COMMON}\n{body}"));
        let draw = |body: &str| Cow::Owned(format!("{DRAW_COMMON}\n{body}"));
        let resolve = |body: &str| Cow::Owned(format!("{RESOLVE_COMMON}\n{body}"));

        let src = match name {
            FALLBACK_SHADER => Cow::Borrowed(include_str!("shaders/passthrough.wgsl")),

            "tile_hscroll" => tile(include_str!("shaders/tile_hscroll.wgsl")),
            "tile_vscroll" => tile(include_str!("shaders/tile_vscroll.wgsl")),
            "tile_rotozoom" => tile(include_str!("shaders/tile_rotozoom.wgsl")),
            "sprite" => draw(include_str!("shaders/sprite.wgsl")),
            "rect" => draw(include_str!("shaders/rect.wgsl")),
            "circle" => draw(include_str!("shaders/circle.wgsl")),
            "devtext" => draw(include_str!("shaders/devtext.wgsl")),

            "ink_none" | "ink_blend" | "ink_alpha" | "ink_add" | "ink_subtract" => {
                resolve(include_str!("shaders/ink_weighted.wgsl"))
            }
            "ink_tint" => resolve(include_str!("shaders/ink_tint.wgsl")),
            "ink_masked" | "ink_unmasked" => resolve(include_str!("shaders/ink_mask.wgsl")),
            "fill" => resolve(include_str!("shaders/fill.wgsl")),

            _ => return None,
        };
        Some(src)
    }
}

/// Provider that overrides some names and defers the rest to another provider.
pub struct OverrideShaders<P> {
    pub overrides: HashMap<String, String>,
    pub base: P,
}

impl<P: ShaderProvider> ShaderProvider for OverrideShaders<P> {
    fn source(&self, name: &str) -> Option<Cow<'static, str>> {
        match self.overrides.get(name) {
            Some(src) => Some(Cow::Owned(src.clone())),
            None => self.base.source(name),
        }
    }
}

/// Every logical name the compositor asks a provider for.
pub fn required_shader_names() -> Vec<&'static str> {
    DrawKind::ALL
        .iter()
        .map(|k| k.shader_name())
        .chain(ResolveKind::ALL.iter().map(|&k| resolve_shader_name(k)))
        .collect()
}

/// Compiled shader modules by logical name.
///
/// `M` is the backend's module type; compilation is delegated to a closure
/// so the substitution policy does not depend on a GPU.
#[derive(Debug)]
pub struct ShaderLibrary<M> {
    modules: HashMap<&'static str, M>,
    fallback: M,
    substituted: Vec<&'static str>,
}

impl<M: Clone> ShaderLibrary<M> {
    /// Compiles the fallback, then every required name.
    ///
    /// Missing or invalid sources log a warning and use the fallback module.
    /// Errors only if the built-in fallback itself fails to compile.
    pub fn load<F>(provider: &dyn ShaderProvider, mut compile: F) -> Result<Self, RenderError>
    where
        F: FnMut(&'static str, &str) -> Result<M, String>,
    {
        let fallback_src = BuiltinShaders
            .source(FALLBACK_SHADER)
            .unwrap_or(Cow::Borrowed(""));
        let fallback = compile(FALLBACK_SHADER, &fallback_src).map_err(|message| {
            RenderError::FallbackShader {
                name: FALLBACK_SHADER,
                message,
            }
        })?;

        let mut modules = HashMap::new();
        let mut substituted = Vec::new();

        for name in required_shader_names() {
            let module = match provider.source(name) {
                None => {
                    log::warn!("shader `{name}`: no source; using pass-through fallback");
                    None
                }
                Some(src) => match compile(name, &src) {
                    Ok(m) => Some(m),
                    Err(e) => {
                        log::warn!("shader `{name}` failed to compile: {e}; using pass-through fallback");
                        None
                    }
                },
            };

            let module = match module {
                Some(m) => m,
                None => {
                    substituted.push(name);
                    fallback.clone()
                }
            };
            modules.insert(name, module);
        }

        Ok(Self {
            modules,
            fallback,
            substituted,
        })
    }

    /// Module for `name`, or the fallback for unknown names.
    pub fn get(&self, name: &str) -> &M {
        self.modules.get(name).unwrap_or(&self.fallback)
    }

    #[inline]
    pub fn is_substituted(&self, name: &str) -> bool {
        self.substituted.contains(&name)
    }

    #[inline]
    pub fn substituted(&self) -> &[&'static str] {
        &self.substituted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Only(&'static [&'static str]);

    impl ShaderProvider for Only {
        fn source(&self, name: &str) -> Option<Cow<'static, str>> {
            self.0.contains(&name).then(|| Cow::Owned(format!("src:{name}")))
        }
    }

    #[test]
    fn builtin_provider_covers_every_required_name() {
        for name in required_shader_names() {
            assert!(BuiltinShaders.source(name).is_some(), "missing builtin `{name}`");
        }
        assert!(BuiltinShaders.source(FALLBACK_SHADER).is_some());
        assert!(BuiltinShaders.source("nonexistent").is_none());
    }

    #[test]
    fn missing_source_uses_fallback() {
        let lib = ShaderLibrary::load(&Only(&["rect"]), |name, _| Ok(name.to_string())).unwrap();

        assert_eq!(lib.get("rect"), "rect");
        assert_eq!(lib.get("sprite"), FALLBACK_SHADER);
        assert!(lib.is_substituted("sprite"));
        assert!(!lib.is_substituted("rect"));
    }

    #[test]
    fn failing_compile_uses_fallback() {
        let lib = ShaderLibrary::load(&BuiltinShaders, |name, _| {
            if name == "ink_tint" { Err("bad".into()) } else { Ok(name.to_string()) }
        })
        .unwrap();

        assert_eq!(lib.get("ink_tint"), FALLBACK_SHADER);
        assert_eq!(lib.get("ink_add"), "ink_add");
        assert_eq!(lib.substituted(), &["ink_tint"]);
    }

    #[test]
    fn failing_fallback_is_an_error() {
        let err = ShaderLibrary::<String>::load(&BuiltinShaders, |name, _| {
            if name == FALLBACK_SHADER { Err("broken".into()) } else { Ok(name.to_string()) }
        })
        .unwrap_err();

        assert!(matches!(err, RenderError::FallbackShader { name: FALLBACK_SHADER, .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let p = OverrideShaders {
            overrides: HashMap::from([("rect".to_string(), "custom".to_string())]),
            base: BuiltinShaders,
        };
        assert_eq!(p.source("rect").as_deref(), Some("custom"));
        assert!(p.source("sprite").is_some());
    }

    #[test]
    fn draw_kind_follows_shader_arguments() {
        assert_eq!(DrawShader::default().kind(), DrawKind::Rect);
        assert_eq!(DrawShader::Circle { inner_radius: 0.5 }.kind(), DrawKind::Circle);
        assert!(DrawShader::DevText.uses_surface());
        assert!(!DrawShader::Rect.uses_surface());
    }
}
