use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shadergen::{GlslVersion, Preset, Stage};

#[derive(Parser, Debug)]
#[command(
    name = "seen",
    author,
    version,
    about = "Compose, inspect and link generated GLSL programs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the generated source of a preset composition.
    Emit(EmitArgs),
    /// List the built-in preset compositions.
    Presets,
    /// Validate a configuration file and list its programs.
    Config(ConfigArgs),
    /// Compile and link presets or configured programs without a GPU.
    Link(LinkArgs),
}

#[derive(Parser, Debug)]
pub struct EmitArgs {
    /// Preset name (see `seen presets`).
    #[arg(value_name = "PRESET", value_parser = parse_preset)]
    pub preset: Preset,

    /// Which stage to print: a stage name (e.g. `vertex`, `fragment`) or `all`.
    #[arg(long, value_name = "STAGE", value_parser = parse_stage_selection, default_value = "all")]
    pub stage: StageSelection,

    /// GLSL version for the `#version` header (e.g. `4.1`); omitted means no header.
    #[arg(long, value_name = "MAJOR.MINOR", value_parser = parse_glsl_version)]
    pub glsl: Option<GlslVersion>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file; defaults to `./seen.toml`.
    #[arg(long, env = "SEEN_CONFIG", value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// Presets to compose and link. When none are given every program of the
    /// configuration file is linked instead.
    #[arg(value_name = "PRESET", value_parser = parse_preset)]
    pub presets: Vec<Preset>,

    /// Configuration file; defaults to `./seen.toml`.
    #[arg(long, env = "SEEN_CONFIG", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// GLSL version for composed stages; overrides the configuration.
    #[arg(long, value_name = "MAJOR.MINOR", value_parser = parse_glsl_version)]
    pub glsl: Option<GlslVersion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSelection {
    All,
    Only(Stage),
}

impl StageSelection {
    pub fn includes(self, stage: Stage) -> bool {
        match self {
            StageSelection::All => true,
            StageSelection::Only(only) => only == stage,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_preset(value: &str) -> Result<Preset, String> {
    let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
    Preset::from_name(&normalized).ok_or_else(|| {
        let known: Vec<&str> = Preset::ALL.iter().map(|preset| preset.name()).collect();
        format!("unknown preset '{value}'; expected one of {}", known.join(", "))
    })
}

pub fn parse_stage_selection(value: &str) -> Result<StageSelection, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("stage must not be empty".into());
    }
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok(StageSelection::All);
    }
    trimmed
        .parse::<Stage>()
        .map(StageSelection::Only)
        .map_err(|err| format!("{err}; expected vertex, fragment, ... or all"))
}

pub fn parse_glsl_version(value: &str) -> Result<GlslVersion, String> {
    value.parse::<GlslVersion>().map_err(|err| err.to_string())
}
