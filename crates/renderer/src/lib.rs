//! Program cache and uniform streaming for the seen renderer.
//!
//! Stages composed with `shadergen` (or hand-written stage files named by a
//! `shaderconfig::ShaderConfig`) are compiled and linked through a [`Driver`]
//! and kept in a [`ShaderCache`]. A [`RenderContext`] owns the driver and the
//! cache and tracks the active program:
//!
//! ```text
//!   [Shader; N] ──▶ RenderContext::compose ──▶ ShaderCache ──▶ Driver::compile_stage
//!                         │ ProgramId                    └──▶ Driver::link_program
//!                         ▼
//!   RenderContext::activate ──▶ stream(&Viewer) / set("u_x", v) ──▶ Driver::set_uniform
//! ```
//!
//! Uniform locations are resolved on first use and cached per program, misses
//! included. Sampler uniforms take texture units from a per-program counter
//! that restarts on every activation.

mod cache;
mod context;
mod driver;
mod error;
#[cfg(feature = "glow")]
mod gl;
mod headless;
mod program;
mod stream;

pub use cache::{ProgramId, ShaderCache};
pub use context::RenderContext;
pub use driver::{Driver, TextureTarget, UniformValue};
pub use error::ShaderError;
#[cfg(feature = "glow")]
pub use gl::GlowDriver;
pub use headless::{Call, HeadlessDriver};
pub use program::{ShaderProgram, Topology, Uniform};
pub use stream::{CubeFace, Light, Material, Positionable, ShadowPass, Streamable, Viewer};
