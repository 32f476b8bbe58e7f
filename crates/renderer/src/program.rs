use std::collections::HashMap;
use std::fmt;

use crate::driver::{Driver, TextureTarget, UniformValue};

/// Primitive assembly a program expects at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    /// Set when a tessellation stage is linked in.
    Patches,
}

/// A linked program plus its lazily filled uniform table.
pub struct ShaderProgram<D: Driver> {
    handle: D::Program,
    topology: Topology,
    name: String,
    uniforms: HashMap<String, Option<D::Location>>,
    texture_unit: u32,
}

impl<D: Driver> ShaderProgram<D> {
    pub(crate) fn new(handle: D::Program, topology: Topology, name: impl Into<String>) -> Self {
        Self {
            handle,
            topology,
            name: name.into(),
            uniforms: HashMap::new(),
            texture_unit: 0,
        }
    }

    pub fn handle(&self) -> D::Program {
        self.handle
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Texture unit the next sampler set will claim.
    pub fn texture_unit(&self) -> u32 {
        self.texture_unit
    }

    pub(crate) fn reset_texture_units(&mut self) {
        self.texture_unit = 0;
    }

    /// Resolves `name` once and remembers the answer, including a miss.
    pub fn location(&mut self, driver: &mut D, name: &str) -> Option<D::Location> {
        if let Some(cached) = self.uniforms.get(name) {
            return cached.clone();
        }

        let location = driver.uniform_location(self.handle, name);
        if location.is_none() {
            tracing::trace!(program = %self.name, uniform = name, "uniform not active; sets are ignored");
        }
        self.uniforms.insert(name.to_owned(), location.clone());
        location
    }

    pub fn uniform<'a>(&'a mut self, driver: &'a mut D, name: &str) -> Uniform<'a, D> {
        let location = self.location(driver, name);
        Uniform {
            location,
            program: self,
            driver,
        }
    }
}

impl<D: Driver> fmt::Debug for ShaderProgram<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("topology", &self.topology)
            .field("name", &self.name)
            .field("uniforms", &self.uniforms.len())
            .field("texture_unit", &self.texture_unit)
            .finish()
    }
}

/// A resolved uniform of one program, ready to receive a value.
///
/// Every setter is a no-op when the program has no such active uniform.
pub struct Uniform<'a, D: Driver> {
    location: Option<D::Location>,
    program: &'a mut ShaderProgram<D>,
    driver: &'a mut D,
}

impl<'a, D: Driver> Uniform<'a, D> {
    pub fn location(&self) -> Option<&D::Location> {
        self.location.as_ref()
    }

    pub fn set(self, value: impl Into<UniformValue>) {
        if let Some(location) = &self.location {
            self.driver.set_uniform(location, value.into());
        }
    }

    /// Binds a 2D texture to the program's next free unit.
    pub fn texture(self, texture: D::Texture) {
        self.sampler(TextureTarget::Texture2d, texture);
    }

    /// Binds a cube map to the program's next free unit.
    pub fn cubemap(self, texture: D::Texture) {
        self.sampler(TextureTarget::CubeMap, texture);
    }

    fn sampler(self, target: TextureTarget, texture: D::Texture) {
        let Some(location) = &self.location else {
            return;
        };
        let unit = self.program.texture_unit;
        self.program.texture_unit += 1;
        self.driver.bind_texture(unit, target, texture);
        self.driver.set_uniform(location, UniformValue::Int(unit as i32));
    }
}
