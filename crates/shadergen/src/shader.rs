use std::fmt::Write as _;

use crate::builtins;
use crate::expr::Expr;
use crate::stage::{GlslVersion, Stage};
use crate::variable::{is_wildcard, lookup, lookup_index, Role, ShaderType, Slot, Variable};

/// Patch size used by the tessellation control layout.
pub const PATCH_VERTICES: u32 = 3;
/// Upper bound on vertices a generated geometry stage may emit.
pub const GEOMETRY_MAX_VERTICES: u32 = 3;

/// One line of the `main` body.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// A complete statement; emitted with a trailing `;`.
    Statement(Expr),
    /// `if (<condition>) {`
    If(Expr),
    /// `}`
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub depth: usize,
    pub line: Line,
}

/// Builder for a single pipeline stage.
///
/// Declarations are kept in one ordered list per role. Names are unique within
/// a list: asking for an existing name returns the existing variable.
#[derive(Debug, Clone)]
pub struct Shader {
    name: String,
    stage: Stage,
    inputs: Vec<Variable>,
    outputs: Vec<Variable>,
    parameters: Vec<Variable>,
    locals: Vec<Variable>,
    statements: Vec<Statement>,
    depth: usize,
}

impl Shader {
    pub fn new(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            locals: Vec::new(),
            statements: Vec::new(),
            depth: 1,
        }
    }

    pub fn vertex(name: impl Into<String>) -> Self {
        Self::new(name, Stage::Vertex)
    }

    pub fn tessellation_control(name: impl Into<String>) -> Self {
        Self::new(name, Stage::TessControl)
    }

    pub fn tessellation_evaluation(name: impl Into<String>) -> Self {
        Self::new(name, Stage::TessEvaluation)
    }

    pub fn geometry(name: impl Into<String>) -> Self {
        Self::new(name, Stage::Geometry)
    }

    pub fn fragment(name: impl Into<String>) -> Self {
        Self::new(name, Stage::Fragment)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn suffix(&self) -> &'static str {
        self.stage.suffix()
    }

    pub fn inputs(&self) -> &[Variable] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Variable] {
        &self.outputs
    }

    pub fn parameters(&self) -> &[Variable] {
        &self.parameters
    }

    pub fn locals(&self) -> &[Variable] {
        &self.locals
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn input(&mut self, name: &str) -> &mut Variable {
        get_or_declare(&mut self.inputs, Role::In, name)
    }

    pub fn output(&mut self, name: &str) -> &mut Variable {
        get_or_declare(&mut self.outputs, Role::Out, name)
    }

    pub fn parameter(&mut self, name: &str) -> &mut Variable {
        get_or_declare(&mut self.parameters, Role::Uniform, name)
    }

    pub fn local(&mut self, name: &str) -> &mut Variable {
        get_or_declare(&mut self.locals, Role::Local, name)
    }

    pub fn find_input(&self, pattern: &str) -> Option<&Variable> {
        lookup(pattern, &self.inputs)
    }

    pub fn find_output(&self, pattern: &str) -> Option<&Variable> {
        lookup(pattern, &self.outputs)
    }

    pub fn find_parameter(&self, pattern: &str) -> Option<&Variable> {
        lookup(pattern, &self.parameters)
    }

    pub fn find_local(&self, pattern: &str) -> Option<&Variable> {
        lookup(pattern, &self.locals)
    }

    /// Most recent input bound to `slot`, falling back to the slot's naming
    /// prefix for inputs declared by hand.
    pub fn slot_input(&self, slot: Slot) -> Option<&Variable> {
        self.inputs
            .iter()
            .rev()
            .find(|var| var.slot() == Some(slot))
            .or_else(|| self.find_input(&format!("{}_*", slot.prefix())))
    }

    /// Builtin variable visible to this stage.
    pub fn builtin(&self, name: &str) -> Option<Variable> {
        builtins::lookup(self.stage, name)
    }

    /// # Panics
    ///
    /// Panics when the stage has no builtin called `name`.
    pub fn require_builtin(&self, name: &str) -> Variable {
        match self.builtin(name) {
            Some(builtin) => builtin,
            None => panic!("{} stage '{}' has no builtin '{name}'", self.stage, self.name),
        }
    }

    /// Appends a statement at the current block depth.
    pub fn next(&mut self, statement: impl Into<Expr>) -> &mut Self {
        self.push(Line::Statement(statement.into()));
        self
    }

    /// Emits a single-branch conditional whose body is produced by `body`.
    pub fn if_then<F>(&mut self, condition: impl Into<Expr>, body: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.push(Line::If(condition.into()));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.push(Line::Close);
        self
    }

    fn push(&mut self, line: Line) {
        self.statements.push(Statement {
            depth: self.depth,
            line,
        });
    }

    /// Renders the complete stage source.
    pub fn code(&self, version: Option<GlslVersion>) -> String {
        let mut src = String::new();

        if let Some(version) = version {
            let _ = writeln!(src, "#version {}", version.number());
            src.push('\n');
        }

        match self.stage {
            Stage::Vertex => {
                for (location, input) in self.inputs.iter().enumerate() {
                    let _ = writeln!(
                        src,
                        "layout(location = {location}) {};",
                        input.declaration()
                    );
                }
                src.push('\n');
                emit_declarations(&mut src, &self.outputs);
            }
            Stage::TessControl => {
                let _ = writeln!(src, "layout(vertices = {PATCH_VERTICES}) out;");
                src.push('\n');
                emit_interface(&mut src, &self.inputs, &self.outputs);
            }
            Stage::TessEvaluation => {
                src.push_str("layout(triangles, equal_spacing, ccw) in;\n\n");
                emit_interface(&mut src, &self.inputs, &self.outputs);
            }
            Stage::Geometry => {
                src.push_str("layout(triangles) in;\n");
                let _ = writeln!(
                    src,
                    "layout(triangle_strip, max_vertices = {GEOMETRY_MAX_VERTICES}) out;"
                );
                src.push('\n');
                emit_interface(&mut src, &self.inputs, &self.outputs);
            }
            Stage::Fragment => emit_interface(&mut src, &self.inputs, &self.outputs),
        }

        src.push('\n');
        emit_declarations(&mut src, &self.parameters);

        src.push_str("\nvoid main()\n{\n");
        for local in &self.locals {
            let _ = writeln!(src, "\t{};", local.declaration());
        }
        src.push('\n');

        for statement in &self.statements {
            for _ in 0..statement.depth {
                src.push('\t');
            }
            match &statement.line {
                Line::Statement(expr) => {
                    let _ = writeln!(src, "{expr};");
                }
                Line::If(condition) => {
                    let _ = writeln!(src, "if ({condition}) {{");
                }
                Line::Close => src.push_str("}\n"),
            }
        }
        src.push_str("}\n");

        src
    }
}

fn get_or_declare<'a>(vars: &'a mut Vec<Variable>, role: Role, name: &str) -> &'a mut Variable {
    if let Some(index) = lookup_index(name, vars) {
        return &mut vars[index];
    }

    assert!(
        !is_wildcard(name),
        "cannot declare a variable from wildcard pattern '{name}'; nothing matched"
    );

    vars.push(Variable::new(role, ShaderType::Unset, name));
    let last = vars.len() - 1;
    &mut vars[last]
}

fn emit_declarations(src: &mut String, vars: &[Variable]) {
    for var in vars {
        let _ = writeln!(src, "{};", var.declaration());
    }
}

fn emit_interface(src: &mut String, inputs: &[Variable], outputs: &[Variable]) {
    emit_declarations(src, inputs);
    src.push('\n');
    emit_declarations(src, outputs);
}
