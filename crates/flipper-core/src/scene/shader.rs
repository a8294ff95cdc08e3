//! Fixed-function material descriptors ("shaders" in the asset format's
//! parlance: a flag word plus a texture-layer list, not programmable
//! code). The scene interpreter derives host pipeline state from the
//! flag word when a shader is selected.

use bitflags::bitflags;

bitflags! {
    /// Shader flag word. Bit meanings recovered from the original
    /// hardware streams; several bits only classify the surface for
    /// external tools and do not change pipeline state here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShaderFlags: u32 {
        /// Geometry is skipped unless hidden-geometry display is requested.
        const HIDDEN             = 1 << 1;
        const FOG                = 1 << 2;
        const CULL_BACKFACE      = 1 << 3;
        const REFLECT_SKYSCAPE   = 1 << 5;
        const CAUSTIC            = 1 << 6;
        const LAVA               = 1 << 7;
        const ALPHA_COMPARE      = 1 << 10;
        const TRANSPARENCY       = 1 << 13;
        const FUR_TIER_LOW       = 1 << 14;
        const FUR_TIER_MID       = 1 << 15;
        const FUR_TIER_HIGH      = 1 << 16;
        const STREAMING_VIDEO    = 1 << 17;
        const INDOOR_OUTDOOR     = 1 << 18;
        const FORCE_BLEND        = 1 << 30;
        const WATER              = 1 << 31;
    }
}

/// Opaque host texture identifier, produced by the external asset
/// layer when it uploads decoded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureKey(pub u32);

/// What gets bound to one texture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureBinding {
    Texture(TextureKey),
    /// Fully transparent 1x1 stand-in for layers past the declared
    /// count or with missing data; keeps samplers valid without
    /// painting garbage.
    Placeholder,
}

/// Host texture units driven per shader selection.
pub const MAX_TEX_UNITS: usize = 8;

/// One material record from the entity's pre-parsed shader table.
#[derive(Debug, Clone, Default)]
pub struct ShaderRecord {
    pub flags: ShaderFlags,
    /// Layer count the shader declares; may exceed `layers.len()` in
    /// damaged assets.
    pub layer_count: u8,
    /// Texture per layer, `None` when the asset data was missing.
    pub layers: Vec<Option<TextureKey>>,
    /// Attribute gating for the change-vertex-format opcode.
    pub has_normals: bool,
    pub has_colors: bool,
}

impl ShaderRecord {
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ShaderFlags::HIDDEN)
    }

    /// Derive the host pipeline state this shader requires.
    pub fn pipeline_state(&self) -> PipelineState {
        let blend = self
            .flags
            .intersects(ShaderFlags::FORCE_BLEND | ShaderFlags::TRANSPARENCY | ShaderFlags::WATER);
        PipelineState {
            blend: if blend { BlendMode::Alpha } else { BlendMode::Opaque },
            depth_test: true,
            // Blended surfaces read depth but leave it untouched.
            depth_write: !blend,
            cull_backface: self.flags.contains(ShaderFlags::CULL_BACKFACE),
            alpha_test: self
                .flags
                .contains(ShaderFlags::ALPHA_COMPARE)
                .then_some(AlphaTest {
                    func: CompareFunc::Greater,
                    reference: 128,
                }),
        }
    }

    /// Resolve the binding for one texture unit.
    pub fn binding(&self, unit: usize) -> TextureBinding {
        if unit >= self.layer_count as usize {
            return TextureBinding::Placeholder;
        }
        match self.layers.get(unit) {
            Some(Some(key)) => TextureBinding::Texture(*key),
            _ => {
                log::warn!("shader layer {unit} has no texture data, using placeholder");
                TextureBinding::Placeholder
            }
        }
    }
}

/// Immediate-state pipeline configuration derived from shader flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    pub blend: BlendMode,
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull_backface: bool,
    pub alpha_test: Option<AlphaTest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaTest {
    pub func: CompareFunc,
    pub reference: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_flags_disable_depth_write() {
        let mut s = ShaderRecord::default();
        assert_eq!(s.pipeline_state().blend, BlendMode::Opaque);
        assert!(s.pipeline_state().depth_write);

        s.flags = ShaderFlags::WATER;
        let ps = s.pipeline_state();
        assert_eq!(ps.blend, BlendMode::Alpha);
        assert!(!ps.depth_write);
    }

    #[test]
    fn alpha_compare_derives_alpha_test() {
        let s = ShaderRecord {
            flags: ShaderFlags::ALPHA_COMPARE,
            ..ShaderRecord::default()
        };
        let at = s.pipeline_state().alpha_test.unwrap();
        assert_eq!(at.func, CompareFunc::Greater);
        assert_eq!(at.reference, 128);
    }

    #[test]
    fn layers_past_declared_count_are_placeholders() {
        let s = ShaderRecord {
            layer_count: 2,
            layers: vec![Some(TextureKey(7)), None],
            ..ShaderRecord::default()
        };
        assert_eq!(s.binding(0), TextureBinding::Texture(TextureKey(7)));
        assert_eq!(s.binding(1), TextureBinding::Placeholder); // missing data
        assert_eq!(s.binding(5), TextureBinding::Placeholder); // past count
    }
}
