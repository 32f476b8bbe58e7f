use std::collections::BTreeMap;
use std::fmt;

use crate::expr::{impl_operators, Compose, Expr};

/// GLSL value types used by generated code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShaderType {
    /// Not yet assigned; renders as an empty type name.
    #[default]
    Unset,
    Float,
    /// `vecN` for N in 2..=4.
    Vec(u8),
    /// `matN` for N in 2..=4.
    Mat(u8),
    Int,
    Short,
    Bool,
    Sampler2d,
    SamplerCube,
    SamplerCubeShadow,
    /// Aggregate builtin (`gl_in`, `gl_out`); members live in the variable's properties.
    Struct,
}

impl ShaderType {
    /// `float` for rank 1, `vecN` otherwise.
    pub fn vec(rank: u8) -> Self {
        if rank == 1 {
            ShaderType::Float
        } else {
            ShaderType::Vec(rank)
        }
    }

    pub fn mat(rank: u8) -> Self {
        ShaderType::Mat(rank)
    }

    /// Sampler for a texture of the given rank; rank 3 maps to a cubemap.
    pub fn sampler(rank: u8) -> Self {
        match rank {
            3 => ShaderType::SamplerCube,
            _ => ShaderType::Sampler2d,
        }
    }

    pub fn is_sampler(&self) -> bool {
        matches!(
            self,
            ShaderType::Sampler2d | ShaderType::SamplerCube | ShaderType::SamplerCubeShadow
        )
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderType::Unset => Ok(()),
            ShaderType::Float => f.write_str("float"),
            ShaderType::Vec(rank) => write!(f, "vec{rank}"),
            ShaderType::Mat(rank) => write!(f, "mat{rank}"),
            ShaderType::Int => f.write_str("int"),
            ShaderType::Short => f.write_str("short"),
            ShaderType::Bool => f.write_str("bool"),
            ShaderType::Sampler2d => f.write_str("sampler2D"),
            ShaderType::SamplerCube => f.write_str("samplerCube"),
            ShaderType::SamplerCubeShadow => f.write_str("samplerCubeShadow"),
            ShaderType::Struct => f.write_str("struct"),
        }
    }
}

/// Storage qualifier of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    In,
    Out,
    InOut,
    /// Per-draw parameter, declared `uniform`.
    Uniform,
    /// Block-local, declared inside `main`.
    Local,
    /// Never declared (e.g. a struct member).
    None,
}

/// Semantic slot a stage variable carries between pipeline stages.
///
/// Features resolve the data they consume by slot, so a fragment stage finds
/// "the normal" regardless of which stage produced it or how it was named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Position,
    Normal,
    Tangent,
    Binormal,
    TexCoord,
    Color,
}

impl Slot {
    /// Naming prefix used for variables carrying this slot.
    pub fn prefix(self) -> &'static str {
        match self {
            Slot::Position => "position",
            Slot::Normal => "normal",
            Slot::Tangent => "tangent",
            Slot::Binormal => "binormal",
            Slot::TexCoord => "texcoord",
            Slot::Color => "color",
        }
    }
}

/// A named, typed GLSL variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    role: Role,
    ty: ShaderType,
    name: String,
    array_size: usize,
    properties: BTreeMap<String, Variable>,
    slot: Option<Slot>,
}

impl Variable {
    pub fn new(role: Role, ty: ShaderType, name: impl Into<String>) -> Self {
        Self {
            role,
            ty,
            name: name.into(),
            array_size: 0,
            properties: BTreeMap::new(),
            slot: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn ty(&self) -> &ShaderType {
        &self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn array_size(&self) -> usize {
        self.array_size
    }

    pub fn slot(&self) -> Option<Slot> {
        self.slot
    }

    pub fn properties(&self) -> &BTreeMap<String, Variable> {
        &self.properties
    }

    /// Sets the type in place.
    pub fn of(&mut self, ty: ShaderType) -> &mut Self {
        self.ty = ty;
        self
    }

    /// Marks the variable as an array of `size` elements; zero means scalar.
    pub fn array(&mut self, size: usize) -> &mut Self {
        self.array_size = size;
        self
    }

    pub fn bind_slot(&mut self, slot: Slot) -> &mut Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_array(mut self, size: usize) -> Self {
        self.array_size = size;
        self
    }

    pub fn with_slot(mut self, slot: Option<Slot>) -> Self {
        self.slot = slot;
        self
    }

    /// Adds a struct member. Ignored unless the variable is struct typed.
    pub fn with_member(mut self, member: Variable) -> Self {
        if self.ty == ShaderType::Struct {
            self.properties.insert(member.name.clone(), member);
        }
        self
    }

    /// Same name, type, arity and slot under a different role.
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }

    /// Declaration text without the trailing semicolon.
    pub fn declaration(&self) -> String {
        let rank = if self.array_size > 0 {
            format!("[{}]", self.array_size)
        } else {
            String::new()
        };

        let qualifier = match self.role {
            Role::In => "in ",
            Role::Out => "out ",
            Role::InOut => "inout ",
            Role::Uniform => "uniform ",
            Role::Local => "",
            Role::None => return String::new(),
        };

        format!("{qualifier}{} {}{rank}", self.ty, self.name)
    }

    /// Indexed access, `name[i]`.
    ///
    /// # Panics
    ///
    /// Panics if the variable was not declared as an array.
    pub fn at(&self, index: impl Into<Expr>) -> Expr {
        self.index(index)
    }
}

impl Compose for Variable {
    fn to_expr(&self) -> Expr {
        Expr::Ident(self.name.clone())
    }

    /// Same as [`Variable::at`].
    fn index(&self, index: impl Into<Expr>) -> Expr {
        assert!(
            self.array_size > 0,
            "indexed access on non-array variable '{}'",
            self.name
        );
        Expr::Index {
            base: Box::new(self.to_expr()),
            index: Box::new(index.into()),
        }
    }

    /// Struct members resolve through the property map at composition time;
    /// everything else becomes `name.member`.
    fn member(&self, name: &str) -> Expr {
        if self.ty == ShaderType::Struct {
            if let Some(property) = self.properties.get(name) {
                return property.to_expr();
            }
        }
        Expr::Member {
            base: Box::new(self.to_expr()),
            member: name.to_owned(),
        }
    }
}

impl From<&Variable> for Expr {
    fn from(variable: &Variable) -> Self {
        variable.to_expr()
    }
}

impl From<Variable> for Expr {
    fn from(variable: Variable) -> Self {
        variable.to_expr()
    }
}

impl_operators!(Variable, &Variable);

/// Finds a variable by exact name or by wildcard.
///
/// A pattern that starts or ends with `*` matches any name containing the rest
/// of the pattern. The scan runs from the most recently declared variable.
pub fn lookup<'a>(pattern: &str, vars: &'a [Variable]) -> Option<&'a Variable> {
    lookup_index(pattern, vars).map(|index| &vars[index])
}

pub(crate) fn lookup_index(pattern: &str, vars: &[Variable]) -> Option<usize> {
    let wildcard = pattern
        .strip_prefix('*')
        .or_else(|| pattern.strip_suffix('*'));

    match wildcard {
        Some(needle) => vars.iter().rposition(|var| var.name.contains(needle)),
        None => vars.iter().rposition(|var| var.name == pattern),
    }
}

pub(crate) fn is_wildcard(pattern: &str) -> bool {
    pattern.starts_with('*') || pattern.ends_with('*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_declaration_with_and_without_array() {
        let mut world = Variable::new(Role::Uniform, ShaderType::mat(4), "u_world_matrix");
        assert_eq!(world.declaration(), "uniform mat4 u_world_matrix");

        world.array(4);
        assert_eq!(world.declaration(), "uniform mat4 u_world_matrix[4]");
    }

    #[test]
    fn role_qualifiers() {
        let ty = ShaderType::vec(3);
        assert_eq!(Variable::new(Role::In, ty.clone(), "n").declaration(), "in vec3 n");
        assert_eq!(Variable::new(Role::Out, ty.clone(), "n").declaration(), "out vec3 n");
        assert_eq!(Variable::new(Role::InOut, ty.clone(), "n").declaration(), "inout vec3 n");
        assert_eq!(Variable::new(Role::Local, ty.clone(), "n").declaration(), "vec3 n");
        assert_eq!(Variable::new(Role::None, ty, "n").declaration(), "");
        assert_eq!(
            Variable::new(Role::Local, ShaderType::vec(1), "d").declaration(),
            "float d"
        );
    }

    #[test]
    fn wildcard_lookup_scans_from_most_recent() {
        let vars = vec![
            Variable::new(Role::In, ShaderType::vec(3), "normal_vsh"),
            Variable::new(Role::In, ShaderType::vec(3), "tangent_vsh"),
            Variable::new(Role::In, ShaderType::vec(3), "normal_geo"),
        ];

        assert_eq!(lookup("normal_*", &vars).map(Variable::name), Some("normal_geo"));
        assert_eq!(lookup("*_vsh", &vars).map(Variable::name), Some("tangent_vsh"));
        assert_eq!(lookup("normal_vsh", &vars).map(Variable::name), Some("normal_vsh"));
        assert!(lookup("normal", &vars).is_none());
        assert!(lookup("missing_*", &vars).is_none());
    }

    #[test]
    fn struct_members_resolve_without_dotted_text() {
        let gl_in = Variable::new(Role::In, ShaderType::Struct, "gl_in")
            .with_array(32)
            .with_member(Variable::new(Role::In, ShaderType::vec(4), "gl_Position"));

        assert_eq!(gl_in.member("gl_Position").text(), "gl_Position");
        assert_eq!(gl_in.at(0).text(), "gl_in[0]");

        let plain = Variable::new(Role::Local, ShaderType::vec(4), "p");
        assert_eq!(plain.member("xyz").text(), "p.xyz");
    }

    #[test]
    #[should_panic(expected = "non-array")]
    fn indexing_a_scalar_panics() {
        Variable::new(Role::Local, ShaderType::Float, "x").at(1);
    }

    #[test]
    #[should_panic(expected = "non-array variable 'x'")]
    fn compose_index_on_a_scalar_panics() {
        Variable::new(Role::Local, ShaderType::Float, "x").index(1);
    }

    #[test]
    fn compose_index_on_an_array() {
        let lights = Variable::new(Role::Uniform, ShaderType::vec(3), "u_lights").with_array(4);
        assert_eq!(lights.index(2).text(), "u_lights[2]");
    }

    #[test]
    fn variables_compose_with_operators() {
        let world = Variable::new(Role::Uniform, ShaderType::mat(4), "u_world_matrix");
        let pos = Variable::new(Role::Local, ShaderType::vec(4), "l_pos");
        assert_eq!(pos.assign(&world * &pos).text(), "l_pos = u_world_matrix * l_pos");
    }
}
