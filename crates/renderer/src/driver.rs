use std::fmt;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use shadergen::Stage;

/// The slice of a graphics API the program cache needs.
///
/// Handles are opaque to the cache; a driver decides what they are. Compile and
/// link failures return the driver's info log.
pub trait Driver {
    type Stage: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Location: Clone + fmt::Debug;
    type Texture: Copy + fmt::Debug;

    fn compile_stage(&mut self, stage: Stage, source: &str) -> Result<Self::Stage, String>;

    /// Links `stages`, binding `attributes[i]` to vertex location `i`.
    fn link_program(
        &mut self,
        stages: &[Self::Stage],
        attributes: &[String],
    ) -> Result<Self::Program, String>;

    fn delete_stage(&mut self, stage: Self::Stage);

    fn use_program(&mut self, program: Self::Program);

    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location>;

    fn set_uniform(&mut self, location: &Self::Location, value: UniformValue);

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Self::Texture);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2d,
    CubeMap,
}

/// A value written to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    Int(i32),
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self {
        Self::Mat3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}
