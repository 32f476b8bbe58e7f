//! Ready-made stage compositions used by the renderer demos and the CLI.

use crate::features::VertexInputs;
use crate::shader::Shader;

/// A named composition producing one [`Shader`] per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Textured, normal mapped, variance-shadowed Blinn-Phong surface.
    BasicLit,
    /// Same surface using the hard-compare shadow test.
    HardShadowLit,
    /// Position-only pass used when filling a shadow store.
    ShadowDepth,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::BasicLit, Preset::HardShadowLit, Preset::ShadowDepth];

    pub fn name(self) -> &'static str {
        match self {
            Preset::BasicLit => "basic-lit",
            Preset::HardShadowLit => "hard-shadow-lit",
            Preset::ShadowDepth => "shadow-depth",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::BasicLit => "textured + normal mapped + variance shadows + Blinn-Phong",
            Preset::HardShadowLit => "textured + normal mapped + hard-compare shadows + Blinn-Phong",
            Preset::ShadowDepth => "world transform only; writes white for depth/moment passes",
        }
    }

    /// Builds the stages in pipeline order.
    pub fn build(self) -> Vec<Shader> {
        match self {
            Preset::BasicLit => lit_surface("basic", false),
            Preset::HardShadowLit => lit_surface("hard_shadow", true),
            Preset::ShadowDepth => shadow_depth(),
        }
    }
}

fn lit_surface(prefix: &str, hard_shadow: bool) -> Vec<Shader> {
    let mut vsh = Shader::vertex(format!("{prefix}_vsh"));
    vsh.declare_vertex_inputs(VertexInputs::all())
        .transform()
        .compute_binormal()
        .view()
        .project()
        .pass_through("texcoord_in")
        .emit_position_output()
        .emit_clip_position();

    let mut fsh = Shader::fragment(format!("{prefix}_fsh"));
    fsh.chain_from(&vsh).color_textured().normal_mapped();
    if hard_shadow {
        fsh.shadow_mapped();
    } else {
        fsh.shadow_mapped_variance();
    }
    fsh.blinn();

    vec![vsh, fsh]
}

fn shadow_depth() -> Vec<Shader> {
    let mut vsh = Shader::vertex("shadow_depth_vsh");
    vsh.declare_vertex_inputs(VertexInputs::POSITION)
        .transform()
        .emit_position_output()
        .view()
        .project()
        .emit_clip_position();

    let mut fsh = Shader::fragment("shadow_depth_fsh");
    fsh.chain_from(&vsh).color_white();

    vec![vsh, fsh]
}
