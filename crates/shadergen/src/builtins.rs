//! Per-stage tables of GLSL builtin variables.
//!
//! Builtins are exposed through the same [`Variable`] interface as declared
//! variables so feature code can read `gl_FrontFacing` or write `gl_Position`
//! without special cases. They are never emitted as declarations.

use crate::stage::Stage;
use crate::variable::{Role, ShaderType, Variable};

const MAX_ARRAY: usize = 32;

fn var(role: Role, ty: ShaderType, name: &str) -> Variable {
    Variable::new(role, ty, name)
}

/// `gl_PerVertex` block as seen through `gl_in` / `gl_out`.
fn per_vertex(role: Role, name: &str) -> Variable {
    var(role, ShaderType::Struct, name)
        .with_array(MAX_ARRAY)
        .with_member(var(role, ShaderType::vec(4), "gl_Position"))
        .with_member(var(role, ShaderType::Float, "gl_PointSize"))
        .with_member(var(role, ShaderType::Float, "gl_ClipDistance").with_array(MAX_ARRAY))
}

/// All builtins visible to `stage`.
pub fn table(stage: Stage) -> Vec<Variable> {
    use Role::{In, Out};

    match stage {
        Stage::Vertex => vec![
            var(In, ShaderType::Int, "gl_VertexID"),
            var(In, ShaderType::Int, "gl_InstanceID"),
            var(In, ShaderType::Int, "gl_DrawID"),
            var(In, ShaderType::Int, "gl_BaseVertex"),
            var(In, ShaderType::Int, "gl_BaseInstance"),
            var(Out, ShaderType::vec(4), "gl_Position"),
            var(Out, ShaderType::Float, "gl_PointSize"),
            var(Out, ShaderType::Float, "gl_ClipDistance").with_array(MAX_ARRAY),
        ],
        Stage::TessControl => vec![
            var(In, ShaderType::Int, "gl_PatchVerticesIn"),
            var(In, ShaderType::Int, "gl_PrimitiveID"),
            var(In, ShaderType::Int, "gl_InvocationID"),
            per_vertex(In, "gl_in"),
            var(Out, ShaderType::Float, "gl_TessLevelOuter").with_array(4),
            var(Out, ShaderType::Float, "gl_TessLevelInner").with_array(2),
            per_vertex(Out, "gl_out"),
        ],
        Stage::TessEvaluation => vec![
            var(In, ShaderType::vec(3), "gl_TessCoord"),
            var(In, ShaderType::Int, "gl_PatchVerticesIn"),
            var(In, ShaderType::Int, "gl_PrimitiveID"),
            var(In, ShaderType::Float, "gl_TessLevelOuter").with_array(4),
            var(In, ShaderType::Float, "gl_TessLevelInner").with_array(2),
            per_vertex(In, "gl_in"),
            var(Out, ShaderType::vec(4), "gl_Position"),
            var(Out, ShaderType::Float, "gl_PointSize"),
            var(Out, ShaderType::Float, "gl_ClipDistance").with_array(MAX_ARRAY),
        ],
        Stage::Geometry => vec![
            per_vertex(In, "gl_in"),
            var(In, ShaderType::Int, "gl_PrimitiveIDIn"),
            var(In, ShaderType::Int, "gl_InvocationID"),
            var(Out, ShaderType::vec(4), "gl_Position"),
            var(Out, ShaderType::Float, "gl_PointSize"),
            var(Out, ShaderType::Float, "gl_ClipDistance").with_array(MAX_ARRAY),
            var(Out, ShaderType::Int, "gl_PrimitiveID"),
            var(Out, ShaderType::Int, "gl_Layer"),
        ],
        Stage::Fragment => vec![
            var(In, ShaderType::vec(4), "gl_FragCoord"),
            var(In, ShaderType::Bool, "gl_FrontFacing"),
            var(In, ShaderType::vec(2), "gl_PointCoord"),
            var(In, ShaderType::Int, "gl_SampleID"),
            var(In, ShaderType::vec(2), "gl_SamplePosition"),
            var(In, ShaderType::Int, "gl_SampleMaskIn").with_array(1),
            var(In, ShaderType::Float, "gl_ClipDistance").with_array(MAX_ARRAY),
            var(In, ShaderType::Int, "gl_PrimitiveID"),
            var(In, ShaderType::Int, "gl_Layer"),
            var(In, ShaderType::Int, "gl_ViewportIndex"),
            var(Out, ShaderType::Float, "gl_FragDepth"),
            var(Out, ShaderType::Int, "gl_SampleMask").with_array(1),
        ],
    }
}

/// Looks up a single builtin by exact name.
pub fn lookup(stage: Stage, name: &str) -> Option<Variable> {
    table(stage).into_iter().find(|builtin| builtin.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Compose;

    #[test]
    fn stage_specific_builtins() {
        let position = lookup(Stage::Vertex, "gl_Position").unwrap();
        assert_eq!(position.role(), Role::Out);
        assert_eq!(position.ty(), &ShaderType::Vec(4));

        assert!(lookup(Stage::Fragment, "gl_Position").is_none());
        assert_eq!(
            lookup(Stage::Fragment, "gl_FrontFacing").unwrap().ty(),
            &ShaderType::Bool
        );
    }

    #[test]
    fn per_vertex_blocks_expose_members() {
        let gl_in = lookup(Stage::Geometry, "gl_in").unwrap();
        assert_eq!(gl_in.array_size(), MAX_ARRAY);
        let clip = &gl_in.properties()["gl_ClipDistance"];
        assert_eq!(clip.array_size(), MAX_ARRAY);
        assert_eq!(gl_in.member("gl_Position").text(), "gl_Position");

        let gl_out = lookup(Stage::TessControl, "gl_out").unwrap();
        assert_eq!(gl_out.role(), Role::Out);
        assert_eq!(gl_out.properties().len(), 3);
    }
}
