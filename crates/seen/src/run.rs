use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use renderer::{HeadlessDriver, RenderContext};
use shaderconfig::SeenConfig;
use shadergen::Preset;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigArgs, EmitArgs, LinkArgs};

const DEFAULT_CONFIG: &str = "seen.toml";

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Emit(args) => emit(args),
        Command::Presets => {
            list_presets();
            Ok(())
        }
        Command::Config(args) => show_config(args),
        Command::Link(args) => link(args),
    }
}

fn emit(args: EmitArgs) -> Result<()> {
    let stages = args.preset.build();
    let mut printed = 0;
    for shader in stages.iter().filter(|shader| args.stage.includes(shader.stage())) {
        if printed > 0 {
            println!();
        }
        println!("// {} ({})", shader.name(), shader.stage());
        print!("{}", shader.code(args.glsl));
        printed += 1;
    }

    if printed == 0 {
        bail!("preset '{}' has no stage matching {:?}", args.preset.name(), args.stage);
    }
    Ok(())
}

fn list_presets() {
    println!("Presets:");
    for preset in Preset::ALL {
        let stages: Vec<String> = preset
            .build()
            .iter()
            .map(|shader| shader.stage().to_string())
            .collect();
        println!(
            "  {:<16} [{}] {}",
            preset.name(),
            stages.join(", "),
            preset.description()
        );
    }
}

fn config_path(file: Option<PathBuf>) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn load_config(path: &Path) -> Result<SeenConfig> {
    let config = SeenConfig::load(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        shader_dir = %config.shader_dir.display(),
        programs = config.programs.len(),
        "loaded configuration"
    );
    Ok(config)
}

fn show_config(args: ConfigArgs) -> Result<()> {
    let path = config_path(args.file);
    let config = load_config(&path)?;

    println!("Configuration: {}", path.display());
    println!("  shader dir:   {}", config.shader_dir.display());
    match config.glsl_version {
        Some(version) => println!("  glsl version: {version}"),
        None => println!("  glsl version: (none; no #version header)"),
    }

    if config.programs.is_empty() {
        println!("No programs configured.");
        return Ok(());
    }

    println!("Programs:");
    for name in config.program_names() {
        let Some(program) = config.program(name) else {
            continue;
        };
        println!(
            "  {name:<16} vertex={} fragment={} attributes=[{}]",
            program.vertex,
            program.fragment,
            program.attributes.join(", ")
        );
    }
    Ok(())
}

fn link(args: LinkArgs) -> Result<()> {
    if args.presets.is_empty() {
        return link_configured(args);
    }

    let mut ctx = RenderContext::new(HeadlessDriver::new(), args.glsl);
    for preset in &args.presets {
        let id = ctx
            .compose(&preset.build())
            .with_context(|| format!("failed to link preset '{}'", preset.name()))?;
        report(&ctx, preset.name(), id);
    }
    Ok(())
}

fn link_configured(args: LinkArgs) -> Result<()> {
    let path = config_path(args.file);
    let config = load_config(&path)?;
    if config.programs.is_empty() {
        bail!("{} defines no programs to link", path.display());
    }

    let mut ctx = RenderContext::new(HeadlessDriver::new(), args.glsl.or(config.glsl_version));
    for name in config.program_names() {
        let Some(program) = config.program(name) else {
            continue;
        };
        let id = ctx
            .fixed(&program)
            .with_context(|| format!("failed to link program '{name}'"))?;
        report(&ctx, name, id);
    }
    Ok(())
}

fn report(ctx: &RenderContext<HeadlessDriver>, label: &str, id: renderer::ProgramId) {
    if let Some(program) = ctx.cache().get(id) {
        println!(
            "{label:<16} program {id} key={} topology={:?}",
            program.name(),
            program.topology()
        );
    }
}
