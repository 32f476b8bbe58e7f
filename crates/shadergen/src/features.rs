//! Feature passes that populate a [`Shader`].
//!
//! Each feature appends the declarations and statements implementing one
//! capability. Features have ordering contracts (`transform` before `view`
//! before `project`, a colour feature before `blinn`, ...). Breaking a contract
//! is a programming error and panics with the missing variable's name.

use bitflags::bitflags;

use crate::expr::{call, mat3, texture, vec4, Compose, Expr};
use crate::shader::Shader;
use crate::variable::{ShaderType, Slot, Variable};

bitflags! {
    /// Per-vertex attributes a first stage consumes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexInputs: u32 {
        const POSITION = 1;
        const NORMAL = 1 << 1;
        const TANGENT = 1 << 2;
        const TEXCOORD = 1 << 3;
    }
}

/// Attribute names in the order they are bound to vertex locations.
pub const DEFAULT_ATTRIBUTES: [&str; 4] = ["position", "normal", "tangent", "texcoord"];

/// World-space distances are divided by this before a hard shadow compare.
pub const SHADOW_FAR_PLANE: f32 = 100.0;
/// Depth difference tolerated before a fragment counts as occluded.
pub const SHADOW_EPSILON: f32 = 0.001;
/// Light attenuation applied to occluded fragments by the hard compare.
pub const SHADOW_OCCLUDED_LIGHT: f32 = 0.5;
/// The moment store keeps distances scaled down by this factor.
pub const MOMENT_SCALE: f32 = 1000.0;
/// Specular exponent of the Blinn-Phong term.
pub const SPECULAR_POWER: f32 = 16.0;

const POS_TRANSFORMED: &str = "l_pos_trans";
const POS_VIEW: &str = "l_pos_view";
const POS_PROJECTED: &str = "l_pos_proj";
const LIT: &str = "l_lit";
const NORMAL: &str = "l_normal";

impl Shader {
    /// Declares the raw vertex attributes selected by `inputs`.
    pub fn declare_vertex_inputs(&mut self, inputs: VertexInputs) -> &mut Self {
        let attributes = [
            (VertexInputs::POSITION, Slot::Position),
            (VertexInputs::NORMAL, Slot::Normal),
            (VertexInputs::TANGENT, Slot::Tangent),
            (VertexInputs::TEXCOORD, Slot::TexCoord),
        ];

        for (flag, slot) in attributes {
            if inputs.contains(flag) {
                self.input(&format!("{}_in", slot.prefix()))
                    .of(ShaderType::vec(3))
                    .bind_slot(slot);
            }
        }
        self
    }

    /// Imports every output of `previous` as an input of this stage.
    pub fn chain_from(&mut self, previous: &Shader) -> &mut Self {
        for output in previous.outputs() {
            let input = self.input(output.name());
            input.of(output.ty().clone()).array(output.array_size());
            if let Some(slot) = output.slot() {
                input.bind_slot(slot);
            }
        }
        self
    }

    /// Moves the position into world space and rotates normal and tangent.
    ///
    /// # Panics
    ///
    /// Panics when no position input exists.
    pub fn transform(&mut self) -> &mut Self {
        let position = self.require_slot("transform", Slot::Position);
        let normal = self.slot_input(Slot::Normal).cloned();
        let tangent = self.slot_input(Slot::Tangent).cloned();

        let transformed = self.declare_local(POS_TRANSFORMED, ShaderType::vec(4));
        let world = self.declare_parameter("u_world_matrix", ShaderType::mat(4));
        let homogeneous = call("vec4", [position.to_expr(), Expr::from(1.0_f32)]);
        self.next(transformed.assign(&world * homogeneous));

        for (source, slot) in [(normal, Slot::Normal), (tangent, Slot::Tangent)] {
            let Some(source) = source else { continue };
            let rotated = self.declare_output(slot, ShaderType::vec(3));
            let normal_matrix = self.declare_parameter("u_normal_matrix", ShaderType::mat(3));
            self.next(rotated.assign(&normal_matrix * &source));
        }
        self
    }

    /// # Panics
    ///
    /// Panics unless [`Shader::transform`] ran first.
    pub fn view(&mut self) -> &mut Self {
        let transformed = self.require_local("view", POS_TRANSFORMED);
        let viewed = self.declare_local(POS_VIEW, ShaderType::vec(4));
        let view = self.declare_parameter("u_view_matrix", ShaderType::mat(4));
        self.next(viewed.assign(&view * &transformed));
        self
    }

    /// # Panics
    ///
    /// Panics unless [`Shader::view`] ran first.
    pub fn project(&mut self) -> &mut Self {
        let viewed = self.require_local("project", POS_VIEW);
        let projected = self.declare_local(POS_PROJECTED, ShaderType::vec(4));
        let proj = self.declare_parameter("u_proj_matrix", ShaderType::mat(4));
        self.next(projected.assign(&proj * &viewed));
        self
    }

    /// Emits `binormal_<suffix> = cross(normal, tangent)`.
    pub fn compute_binormal(&mut self) -> &mut Self {
        let normal = self.produced("compute_binormal", Slot::Normal);
        let tangent = self.produced("compute_binormal", Slot::Tangent);
        let binormal = self.declare_output(Slot::Binormal, ShaderType::vec(3));
        self.next(binormal.assign(normal.cross(&tangent)));
        self
    }

    /// Forwards an input unchanged as `<prefix>_<suffix>`.
    ///
    /// # Panics
    ///
    /// Panics when the input does not exist.
    pub fn pass_through(&mut self, name: &str) -> &mut Self {
        let input = match self.find_input(name) {
            Some(input) => input.clone(),
            None => panic!("pass_through: stage '{}' has no input '{name}'", self.name()),
        };
        let prefix = input.name().split('_').next().unwrap_or(input.name());
        let output_name = format!("{prefix}_{}", self.suffix());

        let output = self.output(&output_name);
        output.of(input.ty().clone()).array(input.array_size());
        if let Some(slot) = input.slot() {
            output.bind_slot(slot);
        }
        let output = output.clone();
        self.next(output.assign(&input));
        self
    }

    /// Emits the world-space position as `position_<suffix>`.
    pub fn emit_position_output(&mut self) -> &mut Self {
        let transformed = self.require_local("emit_position_output", POS_TRANSFORMED);
        let position = self.declare_output(Slot::Position, ShaderType::vec(4));
        self.next(position.assign(&transformed));
        self
    }

    /// Writes the projected position to `gl_Position`.
    pub fn emit_clip_position(&mut self) -> &mut Self {
        let projected = self.require_local("emit_clip_position", POS_PROJECTED);
        let clip = self.require_builtin("gl_Position");
        self.next(clip.assign(&projected));
        self
    }

    /// Solid white `color` output.
    pub fn color_white(&mut self) -> &mut Self {
        let color = self.declare_output(Slot::Color, ShaderType::vec(4));
        self.next(color.assign(vec4(1.0_f32, 1.0_f32, 1.0_f32, 1.0_f32)));
        self
    }

    /// `color` sampled from `u_color_sampler` at the interpolated texcoord.
    pub fn color_textured(&mut self) -> &mut Self {
        let texcoord = self.require_slot("color_textured", Slot::TexCoord);
        let sampler = self.declare_parameter("u_color_sampler", ShaderType::sampler(2));
        let color = self.declare_output(Slot::Color, ShaderType::vec(4));
        self.next(color.assign(texture(&sampler, texcoord.member("xy"))));
        self
    }

    /// Perturbs the interpolated normal with a tangent-space normal map into
    /// the `l_normal` local.
    pub fn normal_mapped(&mut self) -> &mut Self {
        let texcoord = self.require_slot("normal_mapped", Slot::TexCoord);
        let normal = self.require_slot("normal_mapped", Slot::Normal);
        let tangent = self.require_slot("normal_mapped", Slot::Tangent);
        let binormal = self.require_slot("normal_mapped", Slot::Binormal);

        let sampler = self.declare_parameter("u_normal_sampler", ShaderType::sampler(2));
        let mapped = self.declare_local(NORMAL, ShaderType::vec(3));
        let basis = self.declare_local("l_basis", ShaderType::mat(3));
        let sample = self.declare_local("l_norm_sample", ShaderType::vec(3));
        let front_facing = self.require_builtin("gl_FrontFacing");

        self.next(basis.assign(mat3(&tangent, &binormal, &normal)));
        self.next(sample.assign(
            texture(&sampler, texcoord.member("xy")).member("xyz") * 2.0_f32 - 1.0_f32,
        ));
        self.next(mapped.assign(&basis * &sample * -1.0_f32));
        self.if_then(&front_facing, |s| {
            s.next(mapped.assign_mul(-1.0_f32));
        });
        self
    }

    /// Blinn-Phong point light modulating `color.rgb`.
    ///
    /// Uses `l_normal` when a normal-mapping feature produced it, the
    /// interpolated normal otherwise, and scales both terms by `l_lit` when a
    /// shadow feature ran first.
    pub fn blinn(&mut self) -> &mut Self {
        let normal_in = self.require_slot("blinn", Slot::Normal);
        let position = self.require_slot("blinn", Slot::Position);
        let texcoord = self.require_slot("blinn", Slot::TexCoord);
        let color = match self.find_output(Slot::Color.prefix()) {
            Some(color) => color.clone(),
            None => panic!(
                "blinn: stage '{}' has no '{}' output; run a colour feature first",
                self.name(),
                Slot::Color.prefix()
            ),
        };

        let normal = match self.find_local(NORMAL) {
            Some(normal) => normal.clone(),
            None => {
                let normal = self.declare_local(NORMAL, ShaderType::vec(3));
                self.next(normal.assign(normal_in.normalize()));
                normal
            }
        };
        let lit = self.find_local(LIT).cloned();

        let specular = self.declare_parameter("u_specular_sampler", ShaderType::sampler(2));
        let light_position = self.declare_parameter("u_light_position", ShaderType::vec(3));
        let light_power = self.declare_parameter("u_light_power", ShaderType::vec(3));
        let view_position = self.declare_parameter("u_view_position", ShaderType::vec(3));
        let ambience = self.declare_parameter("u_light_ambience", ShaderType::Float);

        let view_dir = self.declare_local("l_view_dir", ShaderType::vec(3));
        let light_color = self.declare_local("l_light_color", ShaderType::vec(3));
        let half = self.declare_local("l_half", ShaderType::vec(3));
        let intensity = self.declare_local("l_intensity", ShaderType::Float);
        let light_dir = self.declare_local("l_light_dir", ShaderType::vec(3));
        let light_dist = self.declare_local("l_light_dist", ShaderType::Float);
        let n_dot_h = self.declare_local("l_ndh", ShaderType::Float);

        let world = position.member("xyz");
        self.next(view_dir.assign((&view_position - world.clone()).normalize()));
        self.next(light_dir.assign(&light_position - world));
        self.next(light_dist.assign(light_dir.length()));
        self.next(light_dir.assign(light_dir.normalize()));

        // Diffuse.
        self.next(intensity.assign(normal.dot(&light_dir).saturate()));
        if let Some(lit) = &lit {
            self.next(intensity.assign_mul(lit));
        }
        self.next(half.assign((&light_dir + &view_dir).normalize()));
        self.next(light_color.assign(&light_power * &ambience));
        self.next(light_color.assign_add(&intensity * &light_power / &light_dist));

        // Specular.
        self.next(n_dot_h.assign(normal.dot(&half)));
        self.next(intensity.assign(n_dot_h.saturate().pow(SPECULAR_POWER)));
        self.next(intensity.assign_mul(texture(&specular, texcoord.member("xy")).member("r")));
        if let Some(lit) = &lit {
            self.next(intensity.assign_mul(lit));
        }
        self.next(light_color.assign_add(&intensity * &light_power / &light_dist));
        self.next(color.member("rgb").assign_mul(&light_color));
        self
    }

    /// Hard-compare omnidirectional shadowing into `l_lit`.
    pub fn shadow_mapped(&mut self) -> &mut Self {
        let (lit, light_dir, cube) = self.shadow_common("shadow_mapped");
        let calculated = self.declare_local("l_calc_dist", ShaderType::Float);
        let sampled = self.declare_local("l_samp_dist", ShaderType::Float);

        self.next(calculated.assign(light_dir.length() / SHADOW_FAR_PLANE));
        self.next(sampled.assign(texture(&cube, &light_dir).member("r")));
        self.if_then((&calculated - &sampled).gt(SHADOW_EPSILON), |s| {
            s.next(lit.assign(SHADOW_OCCLUDED_LIGHT));
        });
        self
    }

    /// Variance shadow estimate into `l_lit`.
    ///
    /// With moments `E[x]` and `E[x²]` sampled along the light direction the lit
    /// probability is bounded by `var / (var + (E[x] - depth)²)` where
    /// `var = E[x²] - E[x]²`. The bound only applies behind the mean occluder.
    pub fn shadow_mapped_variance(&mut self) -> &mut Self {
        let (lit, light_dir, cube) = self.shadow_common("shadow_mapped_variance");
        self.declare_parameter("u_light_proj_matrix", ShaderType::mat(4));

        let moments = self.declare_local("l_query", ShaderType::vec(2));
        let depth = self.declare_local("l_depth", ShaderType::Float);
        let e_x2 = self.declare_local("l_E_x2", ShaderType::Float);
        let ex_2 = self.declare_local("l_Ex_2", ShaderType::Float);
        let variance = self.declare_local("l_var", ShaderType::Float);
        let mean_diff = self.declare_local("l_md", ShaderType::Float);
        let mean_diff_2 = self.declare_local("l_md_2", ShaderType::Float);
        let p = self.declare_local("l_p", ShaderType::Float);

        self.next(moments.assign(texture(&cube, &light_dir).member("rg") * MOMENT_SCALE));
        self.next(depth.assign(light_dir.length()));
        self.next(e_x2.assign(moments.member("g")));
        self.next(ex_2.assign(moments.member("r").pow(2.0_f32)));
        self.next(variance.assign(&e_x2 - &ex_2));
        self.next(mean_diff.assign(moments.member("r") - &depth));
        self.next(mean_diff_2.assign(mean_diff.pow(2.0_f32)));
        self.next(p.assign(&variance / (&variance + &mean_diff_2)));
        self.if_then(depth.gt(moments.member("r")), |s| {
            s.next(lit.assign(&p));
        });
        self
    }

    /// Shared prologue of both shadow features: `l_lit = 1.0` and the
    /// fragment-to-light direction.
    fn shadow_common(&mut self, feature: &str) -> (Variable, Variable, Variable) {
        let position = self.require_slot(feature, Slot::Position);
        let lit = self.declare_local(LIT, ShaderType::Float);
        let light_dir = self.declare_local("l_light_dir", ShaderType::vec(3));
        let cube = self.declare_parameter("u_shadow_cube", ShaderType::SamplerCube);
        let light_position = self.declare_parameter("u_light_position", ShaderType::vec(3));

        self.next(lit.assign(1.0_f32));
        self.next(light_dir.assign(position.member("xyz") - &light_position));
        (lit, light_dir, cube)
    }

    fn declare_local(&mut self, name: &str, ty: ShaderType) -> Variable {
        self.local(name).of(ty).clone()
    }

    fn declare_parameter(&mut self, name: &str, ty: ShaderType) -> Variable {
        self.parameter(name).of(ty).clone()
    }

    /// `<slot>_<suffix>` output carrying `slot`; `color` is never suffixed.
    fn declare_output(&mut self, slot: Slot, ty: ShaderType) -> Variable {
        let name = match slot {
            Slot::Color => slot.prefix().to_owned(),
            _ => format!("{}_{}", slot.prefix(), self.suffix()),
        };
        self.output(&name).of(ty).bind_slot(slot).clone()
    }

    fn require_slot(&self, feature: &str, slot: Slot) -> Variable {
        match self.slot_input(slot) {
            Some(input) => input.clone(),
            None => panic!(
                "{feature}: stage '{}' has no {} input",
                self.name(),
                slot.prefix()
            ),
        }
    }

    fn require_local(&self, feature: &str, name: &str) -> Variable {
        match self.find_local(name) {
            Some(local) => local.clone(),
            None => panic!(
                "{feature}: stage '{}' has no local '{name}'; feature order violated",
                self.name()
            ),
        }
    }

    /// A value this stage already produced for `slot`, preferring outputs over
    /// inputs.
    fn produced(&self, feature: &str, slot: Slot) -> Variable {
        self.outputs()
            .iter()
            .rev()
            .find(|var| var.slot() == Some(slot))
            .cloned()
            .unwrap_or_else(|| self.require_slot(feature, slot))
    }
}
