use std::collections::HashMap;

use shadergen::prelude::*;
use shadergen::{BinaryOp, Line, Preset};

fn lit_vertex(name: &str) -> Shader {
    let mut vsh = Shader::vertex(name);
    vsh.declare_vertex_inputs(VertexInputs::all())
        .transform()
        .compute_binormal()
        .view()
        .project()
        .pass_through("texcoord_in")
        .emit_position_output()
        .emit_clip_position();
    vsh
}

fn lit_fragment(vsh: &Shader) -> Shader {
    let mut fsh = Shader::fragment("basic_fsh");
    fsh.chain_from(vsh)
        .color_textured()
        .normal_mapped()
        .shadow_mapped_variance()
        .blinn();
    fsh
}

#[test]
fn identical_feature_sequences_emit_identical_source() {
    let version = Some(GlslVersion::new(4, 1));
    let first = lit_vertex("basic_vsh");
    let second = lit_vertex("basic_vsh");
    assert_eq!(first.code(version), second.code(version));
    assert_eq!(lit_fragment(&first).code(version), lit_fragment(&second).code(version));
}

#[test]
fn wildcard_lookup_across_chained_stages() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::POSITION | VertexInputs::NORMAL | VertexInputs::TANGENT)
        .transform();

    let mut fsh = Shader::fragment("f");
    fsh.chain_from(&vsh);

    let names: Vec<_> = fsh.inputs().iter().map(Variable::name).collect();
    assert_eq!(names, ["normal_vsh", "tangent_vsh"]);
    assert_eq!(fsh.find_input("normal_*").map(Variable::name), Some("normal_vsh"));
    assert!(fsh.find_input("missing_*").is_none());
}

#[test]
fn chained_inputs_keep_type_arity_and_slot() {
    let mut vsh = Shader::vertex("v");
    vsh.output("weights_vsh").of(ShaderType::Float).array(4);
    vsh.declare_vertex_inputs(VertexInputs::TEXCOORD).pass_through("texcoord_in");

    let mut fsh = Shader::fragment("f");
    fsh.chain_from(&vsh);

    let weights = fsh.find_input("weights_vsh").unwrap();
    assert_eq!(weights.role(), Role::In);
    assert_eq!(weights.array_size(), 4);
    assert_eq!(fsh.slot_input(Slot::TexCoord).map(Variable::name), Some("texcoord_vsh"));
}

#[test]
#[should_panic(expected = "feature order violated")]
fn view_before_transform_is_fatal() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::POSITION).view();
}

#[test]
#[should_panic(expected = "has no position input")]
fn transform_requires_a_position() {
    Shader::vertex("v").declare_vertex_inputs(VertexInputs::NORMAL).transform();
}

#[test]
#[should_panic(expected = "run a colour feature first")]
fn blinn_requires_a_colour() {
    let vsh = lit_vertex("v");
    Shader::fragment("f").chain_from(&vsh).blinn();
}

#[test]
#[should_panic(expected = "project: stage 'v' has no local 'l_pos_view'")]
fn project_requires_view() {
    Shader::vertex("v")
        .declare_vertex_inputs(VertexInputs::POSITION)
        .transform()
        .project();
}

#[test]
#[should_panic(expected = "emit_position_output: stage 'v' has no local 'l_pos_trans'")]
fn position_output_requires_transform() {
    Shader::vertex("v")
        .declare_vertex_inputs(VertexInputs::POSITION)
        .emit_position_output();
}

#[test]
#[should_panic(expected = "emit_clip_position: stage 'v' has no local 'l_pos_proj'")]
fn clip_position_requires_project() {
    Shader::vertex("v")
        .declare_vertex_inputs(VertexInputs::POSITION)
        .transform()
        .view()
        .emit_clip_position();
}

#[test]
#[should_panic(expected = "compute_binormal: stage 'v' has no tangent input")]
fn binormal_requires_a_tangent() {
    Shader::vertex("v")
        .declare_vertex_inputs(VertexInputs::POSITION | VertexInputs::NORMAL)
        .transform()
        .compute_binormal();
}

#[test]
#[should_panic(expected = "normal_mapped: stage 'f' has no binormal input")]
fn normal_mapping_requires_a_binormal() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::all())
        .transform()
        .pass_through("texcoord_in");
    Shader::fragment("f").chain_from(&vsh).normal_mapped();
}

#[test]
#[should_panic(expected = "color_textured: stage 'f' has no texcoord input")]
fn textured_colour_requires_a_texcoord() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::POSITION)
        .transform()
        .emit_position_output();
    Shader::fragment("f").chain_from(&vsh).color_textured();
}

#[test]
#[should_panic(expected = "shadow_mapped: stage 'f' has no position input")]
fn hard_shadow_requires_a_position() {
    Shader::fragment("f").shadow_mapped();
}

#[test]
#[should_panic(expected = "shadow_mapped_variance: stage 'f' has no position input")]
fn variance_shadow_requires_a_position() {
    Shader::fragment("f").shadow_mapped_variance();
}

#[test]
#[should_panic(expected = "pass_through: stage 'v' has no input 'texcoord_in'")]
fn pass_through_requires_the_input() {
    Shader::vertex("v")
        .declare_vertex_inputs(VertexInputs::POSITION)
        .pass_through("texcoord_in");
}

#[test]
fn vertex_stage_declares_input_locations_in_order() {
    let vsh = lit_vertex("basic_vsh");
    let code = vsh.code(None);

    let locations: Vec<&str> = code
        .lines()
        .filter(|line| line.starts_with("layout(location"))
        .collect();
    assert_eq!(
        locations,
        [
            "layout(location = 0) in vec3 position_in;",
            "layout(location = 1) in vec3 normal_in;",
            "layout(location = 2) in vec3 tangent_in;",
            "layout(location = 3) in vec3 texcoord_in;",
        ]
    );

    assert!(code.contains("uniform mat4 u_world_matrix;"));
    assert!(code.contains("\tl_pos_trans = u_world_matrix * vec4(position_in, 1.0);"));
    assert!(code.contains("\tbinormal_vsh = cross(normal_vsh, tangent_vsh);"));
    assert!(code.contains("\tgl_Position = l_pos_proj;"));
    assert!(!code.contains("gl_Position;"), "builtins are never declared");
}

#[test]
fn fragment_stage_has_no_location_qualifiers() {
    let fsh = lit_fragment(&lit_vertex("basic_vsh"));
    let code = fsh.code(Some(GlslVersion::new(4, 1)));

    assert!(code.starts_with("#version 410\n\n"));
    assert!(!code.contains("layout("));
    assert!(code.contains("in vec4 position_vsh;"));
    assert!(code.contains("out vec4 color;"));
    assert!(code.contains("uniform samplerCube u_shadow_cube;"));
    assert!(code.contains("\tif (gl_FrontFacing) {\n\t\tl_normal *= -1.0;\n\t}"));
    assert!(code.contains("\tl_p = l_var / (l_var + l_md_2);"));
    assert!(code.contains("\tcolor.rgb *= l_light_color;"));
}

#[test]
fn blinn_without_normal_map_normalises_the_interpolated_normal() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::all())
        .transform()
        .pass_through("texcoord_in")
        .emit_position_output();

    let mut fsh = Shader::fragment("f");
    fsh.chain_from(&vsh).color_white().blinn();

    let code = fsh.code(None);
    assert!(code.contains("\tl_normal = normalize(normal_vsh);"));
    assert!(!code.contains("l_lit"));
}

#[test]
fn hard_shadow_marks_occluded_fragments_half_lit() {
    let stages = Preset::HardShadowLit.build();
    let code = stages[1].code(None);
    assert!(code.contains("\tl_calc_dist = length(l_light_dir) / 100.0;"));
    assert!(code.contains("\tif (l_calc_dist - l_samp_dist > 0.001) {\n\t\tl_lit = 0.5;\n\t}"));
}

/// Scalar interpreter for the statements of a generated stage.
///
/// Seeded names are treated as already computed: assignments to them are
/// skipped so synthetic texture samples can stand in for the GPU.
struct Evaluator {
    values: HashMap<String, f64>,
    seeded: Vec<String>,
}

impl Evaluator {
    fn new(seed: &[(&str, f64)]) -> Self {
        Self {
            values: seed.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            seeded: seed.iter().map(|(k, _)| k.to_string()).collect(),
        }
    }

    fn key(expr: &Expr) -> Option<String> {
        match expr {
            Expr::Ident(name) => Some(name.clone()),
            Expr::Member { base, member } => Some(format!("{}.{member}", Self::key(base)?)),
            _ => None,
        }
    }

    fn eval(&self, expr: &Expr) -> Option<f64> {
        match expr {
            Expr::Literal(text) => text.parse().ok(),
            Expr::Ident(_) | Expr::Member { .. } => self.values.get(&Self::key(expr)?).copied(),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (self.eval(lhs)?, self.eval(rhs)?);
                Some(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Gt => f64::from(u8::from(l > r)),
                    BinaryOp::Lt => f64::from(u8::from(l < r)),
                    _ => return None,
                })
            }
            Expr::Call { name, args } if name == "pow" => {
                Some(self.eval(&args[0])?.powf(self.eval(&args[1])?))
            }
            _ => None,
        }
    }

    fn run(&mut self, shader: &Shader) {
        let mut skipping: Option<usize> = None;
        for statement in shader.statements() {
            if let Some(depth) = skipping {
                if statement.depth > depth || matches!(statement.line, Line::Close) {
                    if statement.depth == depth {
                        skipping = None;
                    }
                    continue;
                }
            }
            match &statement.line {
                Line::If(condition) => {
                    if self.eval(condition) != Some(1.0) {
                        skipping = Some(statement.depth);
                    }
                }
                Line::Statement(Expr::Assign { target, value, .. }) => {
                    let Some(key) = Self::key(target) else { continue };
                    if self.seeded.contains(&key) {
                        continue;
                    }
                    if let Some(value) = self.eval(value) {
                        self.values.insert(key, value);
                    }
                }
                _ => {}
            }
        }
    }
}

#[test]
fn variance_estimate_matches_the_chebyshev_bound() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::POSITION)
        .transform()
        .emit_position_output();
    let mut fsh = Shader::fragment("f");
    fsh.chain_from(&vsh).shadow_mapped_variance();

    // E[x] = 10, E[x^2] = 104 (variance 4), fragment depth 12.
    let mut evaluator = Evaluator::new(&[
        ("l_query.r", 10.0),
        ("l_query.g", 104.0),
        ("l_query", f64::NAN),
        ("l_depth", 12.0),
    ]);
    evaluator.run(&fsh);

    assert_eq!(evaluator.values["l_var"], 4.0);
    assert_eq!(evaluator.values["l_md_2"], 4.0);
    assert_eq!(evaluator.values["l_p"], 0.5);
    assert_eq!(evaluator.values["l_lit"], 0.5);
}

#[test]
fn variance_estimate_leaves_fragments_in_front_fully_lit() {
    let mut vsh = Shader::vertex("v");
    vsh.declare_vertex_inputs(VertexInputs::POSITION)
        .transform()
        .emit_position_output();
    let mut fsh = Shader::fragment("f");
    fsh.chain_from(&vsh).shadow_mapped_variance();

    let mut evaluator = Evaluator::new(&[
        ("l_query.r", 10.0),
        ("l_query.g", 104.0),
        ("l_query", f64::NAN),
        ("l_depth", 8.0),
    ]);
    evaluator.run(&fsh);

    assert_eq!(evaluator.values["l_lit"], 1.0);
}

#[test]
fn every_preset_builds() {
    for preset in Preset::ALL {
        let stages = preset.build();
        assert_eq!(stages.len(), 2, "{}", preset.name());
        assert_eq!(stages[0].stage(), Stage::Vertex);
        assert_eq!(stages[1].stage(), Stage::Fragment);
        assert_eq!(Preset::from_name(preset.name()), Some(preset));
    }
}
