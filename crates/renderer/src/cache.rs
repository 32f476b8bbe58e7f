use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use shaderconfig::ShaderConfig;
use shadergen::{GlslVersion, Shader, Stage};

use crate::driver::Driver;
use crate::error::ShaderError;
use crate::program::{ShaderProgram, Topology};

/// Stable index of a program inside a [`ShaderCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(usize);

impl ProgramId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Compiles, links and remembers programs.
///
/// Programs are looked up by key before anything is built, and compiled stage
/// objects are shared between programs that name the same stage. Nothing is
/// ever evicted: a program lives as long as the cache so a [`ProgramId`]
/// never dangles.
pub struct ShaderCache<D: Driver> {
    version: Option<GlslVersion>,
    stages: HashMap<String, D::Stage>,
    programs: Vec<ShaderProgram<D>>,
    index: HashMap<String, ProgramId>,
}

impl<D: Driver> ShaderCache<D> {
    /// `version` is written as the `#version` header of composed stages.
    pub fn new(version: Option<GlslVersion>) -> Self {
        Self {
            version,
            stages: HashMap::new(),
            programs: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn version(&self) -> Option<GlslVersion> {
        self.version
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn get(&self, id: ProgramId) -> Option<&ShaderProgram<D>> {
        self.programs.get(id.0)
    }

    pub fn get_mut(&mut self, id: ProgramId) -> Option<&mut ShaderProgram<D>> {
        self.programs.get_mut(id.0)
    }

    /// Program previously built under `key`.
    pub fn find(&self, key: &str) -> Option<ProgramId> {
        self.index.get(key).copied()
    }

    /// Number of compiled stage objects currently held.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Program built from the vertex and fragment files named by `config`.
    ///
    /// Files are read from the config's shader directory as-is; no version
    /// header is added. The program is cached under
    /// [`ShaderConfig::cache_key`] and named by [`ShaderConfig::key`].
    pub fn fixed(&mut self, driver: &mut D, config: &ShaderConfig) -> Result<ProgramId, ShaderError> {
        let key = config.cache_key();
        if let Some(id) = self.find(&key) {
            tracing::debug!(program = %key, "program cache hit");
            return Ok(id);
        }

        let vertex = self.file_stage(driver, Stage::Vertex, &config.vertex_path())?;
        let fragment = self.file_stage(driver, Stage::Fragment, &config.fragment_path())?;
        let handle = link(driver, &config.key(), &[vertex, fragment], &config.attributes)?;

        Ok(self.insert(key, ShaderProgram::new(handle, Topology::Triangles, config.key())))
    }

    /// Program linked from composed stages, in pipeline order.
    ///
    /// The key is the concatenation of the stage names, and each stage object
    /// is cached under its stage's name. Vertex attribute locations follow the
    /// declaration order of the first stage's inputs.
    ///
    /// # Panics
    ///
    /// Panics when `shaders` is empty.
    pub fn compose(&mut self, driver: &mut D, shaders: &[Shader]) -> Result<ProgramId, ShaderError> {
        assert!(!shaders.is_empty(), "a program needs at least one stage");

        let key: String = shaders.iter().map(Shader::name).collect();
        if let Some(id) = self.find(&key) {
            tracing::debug!(program = %key, "program cache hit");
            return Ok(id);
        }

        let mut handles = Vec::with_capacity(shaders.len());
        for shader in shaders {
            let handle = match self.stages.get(shader.name()) {
                Some(handle) => *handle,
                None => {
                    let code = shader.code(self.version);
                    let handle = compile(driver, shader.name(), shader.stage(), code)?;
                    self.stages.insert(shader.name().to_owned(), handle);
                    handle
                }
            };
            handles.push(handle);
        }

        let attributes: Vec<String> = shaders[0]
            .inputs()
            .iter()
            .map(|input| input.name().to_owned())
            .collect();
        let handle = link(driver, &key, &handles, &attributes)?;

        let topology = if shaders.iter().any(|shader| shader.stage().is_tessellation()) {
            Topology::Patches
        } else {
            Topology::Triangles
        };
        Ok(self.insert(key.clone(), ShaderProgram::new(handle, topology, key)))
    }

    /// Deletes every cached stage object. Linked programs are unaffected; a
    /// later build compiles its stages again.
    pub fn release_stages(&mut self, driver: &mut D) {
        for (name, stage) in self.stages.drain() {
            tracing::debug!(stage = %name, "releasing stage object");
            driver.delete_stage(stage);
        }
    }

    fn file_stage(&mut self, driver: &mut D, stage: Stage, path: &Path) -> Result<D::Stage, ShaderError> {
        let key = path.display().to_string();
        if let Some(handle) = self.stages.get(&key) {
            return Ok(*handle);
        }

        let code = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let handle = compile(driver, &key, stage, code)?;
        self.stages.insert(key, handle);
        Ok(handle)
    }

    fn insert(&mut self, key: String, program: ShaderProgram<D>) -> ProgramId {
        let id = ProgramId(self.programs.len());
        tracing::info!(program = %program.name(), %id, topology = ?program.topology(), "linked program");
        self.programs.push(program);
        self.index.insert(key, id);
        id
    }
}

impl<D: Driver> fmt::Debug for ShaderCache<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderCache")
            .field("version", &self.version)
            .field("stages", &self.stages.len())
            .field("programs", &self.programs)
            .finish()
    }
}

fn compile<D: Driver>(driver: &mut D, name: &str, stage: Stage, code: String) -> Result<D::Stage, ShaderError> {
    tracing::debug!(stage = %name, kind = %stage, "compiling stage");
    driver.compile_stage(stage, &code).map_err(|log| {
        tracing::error!(stage = %name, kind = %stage, "compile failed:\n{log}\n{code}");
        ShaderError::Compile {
            name: name.to_owned(),
            stage,
            log,
            code,
        }
    })
}

fn link<D: Driver>(
    driver: &mut D,
    name: &str,
    stages: &[D::Stage],
    attributes: &[String],
) -> Result<D::Program, ShaderError> {
    driver.link_program(stages, attributes).map_err(|log| {
        tracing::error!(program = %name, "link failed:\n{log}");
        ShaderError::Link {
            name: name.to_owned(),
            log,
        }
    })
}
