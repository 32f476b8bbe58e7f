use std::collections::{HashMap, HashSet};

use shadergen::Stage;

use crate::driver::{Driver, TextureTarget, UniformValue};

/// One driver call as observed by [`HeadlessDriver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Compile { stage: Stage, handle: u32 },
    Link { program: u32, stages: Vec<u32>, attributes: Vec<String> },
    DeleteStage(u32),
    UseProgram(u32),
    UniformLocation { program: u32, name: String },
    SetUniform { location: u32, value: UniformValue },
    BindTexture { unit: u32, target: TextureTarget, texture: u32 },
}

/// A driver without a GPU.
///
/// Hands out sequential integer handles and records every call so program
/// construction can be checked (and `seen link` can run) on machines with no
/// GL context. Every uniform resolves unless it was hidden with
/// [`HeadlessDriver::hide_uniform`].
#[derive(Debug, Default)]
pub struct HeadlessDriver {
    calls: Vec<Call>,
    next_handle: u32,
    sources: HashMap<u32, String>,
    locations: HashMap<(u32, String), u32>,
    hidden: HashSet<String>,
    reject: Option<String>,
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes compilation fail for any source containing `needle`.
    pub fn reject_sources_containing(mut self, needle: impl Into<String>) -> Self {
        self.reject = Some(needle.into());
        self
    }

    /// Reports `name` as an inactive uniform in every program.
    pub fn hide_uniform(mut self, name: impl Into<String>) -> Self {
        self.hidden.insert(name.into());
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn compile_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Compile { .. }))
    }

    pub fn link_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Link { .. }))
    }

    /// Times the location of `name` was queried.
    pub fn location_queries(&self, name: &str) -> usize {
        self.count(|call| matches!(call, Call::UniformLocation { name: queried, .. } if queried == name))
    }

    /// Source compiled into stage `handle`.
    pub fn source(&self, handle: u32) -> Option<&str> {
        self.sources.get(&handle).map(String::as_str)
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Driver for HeadlessDriver {
    type Stage = u32;
    type Program = u32;
    type Location = u32;
    type Texture = u32;

    fn compile_stage(&mut self, stage: Stage, source: &str) -> Result<u32, String> {
        if let Some(needle) = &self.reject {
            if source.contains(needle.as_str()) {
                return Err(format!("0:1(1): error: rejected '{needle}'"));
            }
        }
        let handle = self.allocate();
        self.sources.insert(handle, source.to_owned());
        self.calls.push(Call::Compile { stage, handle });
        Ok(handle)
    }

    fn link_program(&mut self, stages: &[u32], attributes: &[String]) -> Result<u32, String> {
        if stages.is_empty() {
            return Err("error: no shaders attached".into());
        }
        let program = self.allocate();
        self.calls.push(Call::Link {
            program,
            stages: stages.to_vec(),
            attributes: attributes.to_vec(),
        });
        Ok(program)
    }

    fn delete_stage(&mut self, stage: u32) {
        self.sources.remove(&stage);
        self.calls.push(Call::DeleteStage(stage));
    }

    fn use_program(&mut self, program: u32) {
        self.calls.push(Call::UseProgram(program));
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<u32> {
        self.calls.push(Call::UniformLocation {
            program,
            name: name.to_owned(),
        });
        if self.hidden.contains(name) {
            return None;
        }
        let next = self.locations.len() as u32;
        Some(*self.locations.entry((program, name.to_owned())).or_insert(next))
    }

    fn set_uniform(&mut self, location: &u32, value: UniformValue) {
        self.calls.push(Call::SetUniform {
            location: *location,
            value,
        });
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: u32) {
        self.calls.push(Call::BindTexture {
            unit,
            target,
            texture,
        });
    }
}
