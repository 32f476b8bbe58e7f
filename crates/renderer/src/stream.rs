//! Aggregates that write their state into a program's uniforms.
//!
//! Names match the parameters declared by the composition features, so a
//! program built from those features can be fed without string plumbing at
//! the call site.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat3, Mat4, Vec3};
use shadergen::SHADOW_FAR_PLANE;

use crate::driver::Driver;
use crate::program::ShaderProgram;

pub trait Streamable<D: Driver> {
    fn stream(&self, program: &mut ShaderProgram<D>, driver: &mut D);
}

/// Surface textures; bound to consecutive texture units in field order.
#[derive(Debug, Clone, Copy)]
pub struct Material<T> {
    pub color: T,
    pub normal: T,
    pub specular: T,
}

impl<D: Driver> Streamable<D> for Material<D::Texture> {
    fn stream(&self, program: &mut ShaderProgram<D>, driver: &mut D) {
        program.uniform(driver, "u_color_sampler").texture(self.color);
        program.uniform(driver, "u_normal_sampler").texture(self.normal);
        program.uniform(driver, "u_specular_sampler").texture(self.specular);
    }
}

/// Object placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Positionable {
    pub world: Mat4,
    pub normal_matrix: Mat3,
}

impl Positionable {
    /// Derives the normal matrix as the inverse transpose of the world
    /// rotation/scale.
    pub fn from_world(world: Mat4) -> Self {
        Self {
            world,
            normal_matrix: Mat3::from_mat4(world).inverse().transpose(),
        }
    }
}

impl<D: Driver> Streamable<D> for Positionable {
    fn stream(&self, program: &mut ShaderProgram<D>, driver: &mut D) {
        program.uniform(driver, "u_world_matrix").set(self.world);
        program.uniform(driver, "u_normal_matrix").set(self.normal_matrix);
    }
}

/// Camera state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl Viewer {
    /// Right-handed perspective camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            position: eye,
        }
    }
}

impl<D: Driver> Streamable<D> for Viewer {
    fn stream(&self, program: &mut ShaderProgram<D>, driver: &mut D) {
        program.uniform(driver, "u_view_matrix").set(self.view);
        program.uniform(driver, "u_proj_matrix").set(self.projection);
        program.uniform(driver, "u_view_position").set(self.position);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub power: Vec3,
    pub ambience: f32,
}

impl<D: Driver> Streamable<D> for Light {
    fn stream(&self, program: &mut ShaderProgram<D>, driver: &mut D) {
        program.uniform(driver, "u_light_position").set(self.position);
        program.uniform(driver, "u_light_power").set(self.power);
        program.uniform(driver, "u_light_ambience").set(self.ambience);
    }
}

/// Cube face order used when rendering a shadow store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Forward and up vectors of the face camera, following the GL cube map
    /// orientation.
    pub fn basis(self) -> (Vec3, Vec3) {
        match self {
            CubeFace::PositiveX => (Vec3::X, Vec3::NEG_Y),
            CubeFace::NegativeX => (Vec3::NEG_X, Vec3::NEG_Y),
            CubeFace::PositiveY => (Vec3::Y, Vec3::Z),
            CubeFace::NegativeY => (Vec3::NEG_Y, Vec3::NEG_Z),
            CubeFace::PositiveZ => (Vec3::Z, Vec3::NEG_Y),
            CubeFace::NegativeZ => (Vec3::NEG_Z, Vec3::NEG_Y),
        }
    }

    pub fn view(self, position: Vec3) -> Mat4 {
        let (forward, up) = self.basis();
        Mat4::look_at_rh(position, position + forward, up)
    }

    /// 90° square frustum reaching the shadow far plane.
    pub fn projection(near: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, near, SHADOW_FAR_PLANE)
    }
}

/// Omnidirectional shadow store consumed by the shadow features.
#[derive(Debug, Clone, Copy)]
pub struct ShadowPass<T> {
    pub cubemap: T,
    pub light_projection: Mat4,
}

impl<T> ShadowPass<T> {
    pub fn new(cubemap: T, near: f32) -> Self {
        Self {
            cubemap,
            light_projection: CubeFace::projection(near),
        }
    }
}

impl<D: Driver> Streamable<D> for ShadowPass<D::Texture> {
    fn stream(&self, program: &mut ShaderProgram<D>, driver: &mut D) {
        program.uniform(driver, "u_shadow_cube").cubemap(self.cubemap);
        program.uniform(driver, "u_light_proj_matrix").set(self.light_projection);
    }
}
