use glow::HasContext;
use shadergen::Stage;

use crate::driver::{Driver, TextureTarget, UniformValue};
use crate::program::Topology;

type Gl = glow::Context;

/// [`Driver`] over a current OpenGL context.
///
/// The caller owns context creation and must keep the context current on the
/// thread that uses the driver.
pub struct GlowDriver {
    gl: Gl,
}

impl GlowDriver {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    /// Primitive mode to draw a program's geometry with.
    pub fn draw_mode(topology: Topology) -> u32 {
        match topology {
            Topology::Triangles => glow::TRIANGLES,
            Topology::Patches => glow::PATCHES,
        }
    }
}

fn stage_kind(stage: Stage) -> u32 {
    match stage {
        Stage::Vertex => glow::VERTEX_SHADER,
        Stage::TessControl => glow::TESS_CONTROL_SHADER,
        Stage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        Stage::Geometry => glow::GEOMETRY_SHADER,
        Stage::Fragment => glow::FRAGMENT_SHADER,
    }
}

impl Driver for GlowDriver {
    type Stage = <Gl as HasContext>::Shader;
    type Program = <Gl as HasContext>::Program;
    type Location = <Gl as HasContext>::UniformLocation;
    type Texture = <Gl as HasContext>::Texture;

    fn compile_stage(&mut self, stage: Stage, source: &str) -> Result<Self::Stage, String> {
        // SAFETY: the context is current on this thread (type invariant).
        unsafe {
            let shader = self.gl.create_shader(stage_kind(stage))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(log);
            }
            Ok(shader)
        }
    }

    fn link_program(
        &mut self,
        stages: &[Self::Stage],
        attributes: &[String],
    ) -> Result<Self::Program, String> {
        // SAFETY: see `compile_stage`.
        unsafe {
            let program = self.gl.create_program()?;
            for stage in stages {
                self.gl.attach_shader(program, *stage);
            }
            for (index, name) in attributes.iter().enumerate() {
                self.gl.bind_attrib_location(program, index as u32, name);
            }
            self.gl.link_program(program);
            for stage in stages {
                self.gl.detach_shader(program, *stage);
            }

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(log);
            }
            Ok(program)
        }
    }

    fn delete_stage(&mut self, stage: Self::Stage) {
        // SAFETY: see `compile_stage`.
        unsafe { self.gl.delete_shader(stage) }
    }

    fn use_program(&mut self, program: Self::Program) {
        // SAFETY: see `compile_stage`.
        unsafe { self.gl.use_program(Some(program)) }
    }

    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location> {
        // SAFETY: see `compile_stage`.
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_uniform(&mut self, location: &Self::Location, value: UniformValue) {
        let location = Some(location);
        // SAFETY: see `compile_stage`. The owning program is bound by the
        // render context before any set.
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(location, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat3(m) => {
                    self.gl
                        .uniform_matrix_3_f32_slice(location, false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(location, false, &m.to_cols_array())
                }
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Self::Texture) {
        let target = match target {
            TextureTarget::Texture2d => glow::TEXTURE_2D,
            TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        };
        // SAFETY: see `compile_stage`.
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(target, Some(texture));
        }
    }
}
