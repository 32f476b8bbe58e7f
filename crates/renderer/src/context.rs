use shaderconfig::ShaderConfig;
use shadergen::{GlslVersion, Shader};

use crate::cache::{ProgramId, ShaderCache};
use crate::driver::{Driver, UniformValue};
use crate::error::ShaderError;
use crate::program::{ShaderProgram, Uniform};
use crate::stream::Streamable;

/// Owns the driver and the program cache, and tracks which program is bound.
///
/// Uniform access goes through the active program; there is no global
/// "current program".
pub struct RenderContext<D: Driver> {
    driver: D,
    cache: ShaderCache<D>,
    active: Option<ProgramId>,
}

impl<D: Driver> RenderContext<D> {
    pub fn new(driver: D, version: Option<GlslVersion>) -> Self {
        Self {
            driver,
            cache: ShaderCache::new(version),
            active: None,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn cache(&self) -> &ShaderCache<D> {
        &self.cache
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn fixed(&mut self, config: &ShaderConfig) -> Result<ProgramId, ShaderError> {
        self.cache.fixed(&mut self.driver, config)
    }

    pub fn compose(&mut self, shaders: &[Shader]) -> Result<ProgramId, ShaderError> {
        self.cache.compose(&mut self.driver, shaders)
    }

    pub fn release_stages(&mut self) {
        self.cache.release_stages(&mut self.driver);
    }

    /// Binds `id` for drawing and restarts its texture unit numbering.
    pub fn activate(&mut self, id: ProgramId) -> Result<(), ShaderError> {
        let program = self.cache.get_mut(id).ok_or(ShaderError::UnknownProgram(id))?;
        program.reset_texture_units();
        self.driver.use_program(program.handle());
        self.active = Some(id);
        Ok(())
    }

    pub fn active(&self) -> Option<ProgramId> {
        self.active
    }

    /// # Panics
    ///
    /// Panics when no program has been activated.
    pub fn active_program(&self) -> &ShaderProgram<D> {
        let id = self.expect_active();
        match self.cache.get(id) {
            Some(program) => program,
            None => unreachable!("active id {id} is not in the cache"),
        }
    }

    /// # Panics
    ///
    /// Panics when no program has been activated.
    pub fn uniform(&mut self, name: &str) -> Uniform<'_, D> {
        let (program, driver) = self.parts();
        program.uniform(driver, name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.uniform(name).set(value);
    }

    /// Writes every uniform of `value` into the active program.
    pub fn stream<S: Streamable<D> + ?Sized>(&mut self, value: &S) {
        let (program, driver) = self.parts();
        value.stream(program, driver);
    }

    fn expect_active(&self) -> ProgramId {
        match self.active {
            Some(id) => id,
            None => panic!("no active program; call RenderContext::activate first"),
        }
    }

    fn parts(&mut self) -> (&mut ShaderProgram<D>, &mut D) {
        let id = self.expect_active();
        match self.cache.get_mut(id) {
            Some(program) => (program, &mut self.driver),
            None => unreachable!("active id {id} is not in the cache"),
        }
    }
}
