use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn seen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seen"))
        .env_remove("SEEN_CONFIG")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run seen")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_config(root: &Path, programs: &str) -> std::path::PathBuf {
    let path = root.join("seen.toml");
    fs::write(
        &path,
        format!("version = 1\nshader_dir = \"shaders\"\nglsl_version = \"4.1\"\n{programs}"),
    )
    .unwrap();
    path
}

#[test]
fn presets_are_listed() {
    let output = seen(&["presets"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for name in ["basic-lit", "hard-shadow-lit", "shadow-depth"] {
        assert!(text.contains(name), "missing {name} in:\n{text}");
    }
}

#[test]
fn emit_prints_a_single_stage() {
    let output = seen(&["emit", "basic-lit", "--stage", "vertex", "--glsl", "4.1"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.starts_with("// basic_vsh (vertex)\n#version 410\n"));
    assert!(text.contains("layout(location = 0) in vec3 position_in;"));
    assert!(!text.contains("basic_fsh"));
}

#[test]
fn emit_prints_all_stages_without_header_by_default() {
    let output = seen(&["emit", "shadow-depth"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(!text.contains("#version"));
    assert!(text.contains("// shadow_depth_vsh (vertex)"));
    assert!(text.contains("// shadow_depth_fsh (fragment)"));
    assert!(text.contains("\tcolor = vec4(1.0, 1.0, 1.0, 1.0);"));
}

#[test]
fn emit_rejects_unknown_presets() {
    let output = seen(&["emit", "phong"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}

#[test]
fn config_lists_programs() {
    let root = TempDir::new().unwrap();
    let path = write_config(
        root.path(),
        "[programs.sky]\nvertex = \"sky.vsh\"\nfragment = \"sky.fsh\"\n",
    );

    let output = seen(&["config", "--file", path.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("glsl version: 4.1"));
    assert!(text.contains("sky"));
    assert!(text.contains("attributes=[position, normal, tangent, texcoord]"));
}

#[test]
fn config_path_can_come_from_the_environment() {
    let root = TempDir::new().unwrap();
    let path = write_config(root.path(), "");

    let output = Command::new(env!("CARGO_BIN_EXE_seen"))
        .env("SEEN_CONFIG", &path)
        .arg("config")
        .output()
        .expect("failed to run seen");
    assert!(output.status.success());
    assert!(stdout(&output).contains("No programs configured."));
}

#[test]
fn invalid_config_fails() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("seen.toml");
    fs::write(&path, "version = 7\n").unwrap();

    let output = seen(&["config", "--file", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported config version"));
}

#[test]
fn link_composes_presets() {
    let output = seen(&["link", "basic-lit", "shadow-depth", "--glsl", "4.1"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("key=basic_vshbasic_fsh"));
    assert!(text.contains("key=shadow_depth_vshshadow_depth_fsh"));
}

#[test]
fn link_reads_configured_stage_files() {
    let root = TempDir::new().unwrap();
    let shaders = root.path().join("shaders");
    fs::create_dir_all(&shaders).unwrap();
    fs::write(shaders.join("sky.vsh"), "void main() {}\n").unwrap();
    fs::write(shaders.join("sky.fsh"), "void main() {}\n").unwrap();
    let path = write_config(
        root.path(),
        "[programs.sky]\nvertex = \"sky.vsh\"\nfragment = \"sky.fsh\"\n",
    );

    let output = seen(&["link", "--file", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("key=sky.vshsky.fsh"));
}

#[test]
fn link_fails_on_missing_stage_file() {
    let root = TempDir::new().unwrap();
    let path = write_config(
        root.path(),
        "[programs.sky]\nvertex = \"sky.vsh\"\nfragment = \"sky.fsh\"\n",
    );

    let output = seen(&["link", "--file", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to link program 'sky'"));
}
