//! GLSL stage composition for the seen renderer.
//!
//! Programs are not written as text. A caller creates one [`Shader`] per
//! pipeline stage and chains *features* onto it; each feature declares the
//! inputs, outputs, uniforms and locals it needs and appends its statements:
//!
//! ```text
//!   Shader::vertex ─▶ declare_vertex_inputs ─▶ transform ─▶ view ─▶ project ─▶ ...
//!                                                                     │ outputs
//!   Shader::fragment ─▶ chain_from(vertex) ◀───────────────────────────┘
//!                      ─▶ color_textured ─▶ normal_mapped ─▶ shadow ─▶ blinn
//!                                                                     │
//!                                                   Shader::code ─▶ GLSL text
//! ```
//!
//! Statements are built from [`Expr`] trees, so emitted text is parenthesised
//! according to GLSL precedence. Feature order is a contract: calling a feature
//! whose inputs do not exist yet panics.

pub mod builtins;
mod expr;
mod features;
pub mod presets;
mod shader;
mod stage;
mod variable;

pub use expr::{
    call, mat3, texture, vec2, vec3, vec4, AssignOp, BinaryOp, Compose, Expr, UnaryOp,
};
pub use features::{
    VertexInputs, DEFAULT_ATTRIBUTES, MOMENT_SCALE, SHADOW_EPSILON, SHADOW_FAR_PLANE,
    SHADOW_OCCLUDED_LIGHT, SPECULAR_POWER,
};
pub use presets::Preset;
pub use shader::{Line, Shader, Statement, GEOMETRY_MAX_VERTICES, PATCH_VERTICES};
pub use stage::{GlslVersion, InvalidVersion, Stage, UnknownStage};
pub use variable::{lookup, Role, ShaderType, Slot, Variable};

/// Glob import for builder call sites.
pub mod prelude {
    pub use crate::expr::{call, mat3, texture, vec2, vec3, vec4, Compose, Expr};
    pub use crate::features::VertexInputs;
    pub use crate::shader::Shader;
    pub use crate::stage::{GlslVersion, Stage};
    pub use crate::variable::{Role, ShaderType, Slot, Variable};
}
