use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use shadergen::{GlslVersion, DEFAULT_ATTRIBUTES};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top level `seen.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeenConfig {
    pub version: u32,
    #[serde(default = "default_shader_dir")]
    pub shader_dir: PathBuf,
    #[serde(
        default,
        deserialize_with = "deserialize_version_opt",
        serialize_with = "serialize_version_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub glsl_version: Option<GlslVersion>,
    #[serde(default)]
    pub programs: BTreeMap<String, ProgramConfig>,
}

/// A program built from hand-written stage files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgramConfig {
    pub vertex: String,
    pub fragment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
}

/// Everything the shader cache needs to build one fixed-file program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderConfig {
    pub shader_dir: PathBuf,
    pub vertex: String,
    pub fragment: String,
    /// Vertex attribute names; index `i` is bound to location `i`.
    pub attributes: Vec<String>,
}

impl ShaderConfig {
    /// Config with the default `position, normal, tangent, texcoord` attributes.
    pub fn new(
        shader_dir: impl Into<PathBuf>,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            shader_dir: shader_dir.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
            attributes: default_attributes(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Display name of the program; the pair of file names.
    pub fn key(&self) -> String {
        format!("{}{}", self.vertex, self.fragment)
    }

    /// Identity of the linked program: both stage paths and the attribute
    /// binding order. Configs that share file names but not a shader directory
    /// or attribute list never alias.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.vertex_path().display(),
            self.fragment_path().display(),
            self.attributes.join(",")
        )
    }

    pub fn vertex_path(&self) -> PathBuf {
        self.shader_dir.join(&self.vertex)
    }

    pub fn fragment_path(&self) -> PathBuf {
        self.shader_dir.join(&self.fragment)
    }
}

fn default_shader_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_attributes() -> Vec<String> {
    DEFAULT_ATTRIBUTES.iter().map(|name| name.to_string()).collect()
}

fn deserialize_version_opt<'de, D>(deserializer: D) -> Result<Option<GlslVersion>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Float(f64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let raw = match helper {
        None => return Ok(None),
        Some(Helper::Str(raw)) => raw,
        Some(Helper::Float(value)) => format!("{value:.1}"),
    };
    raw.parse::<GlslVersion>()
        .map(Some)
        .map_err(de::Error::custom)
}

fn serialize_version_opt<S>(version: &Option<GlslVersion>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match version {
        Some(version) => serializer.serialize_str(&version.to_string()),
        None => serializer.serialize_none(),
    }
}

impl SeenConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SeenConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates `path`. A relative `shader_dir` is resolved against
    /// the directory containing the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&input)?;
        if config.shader_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.shader_dir = parent.join(&config.shader_dir);
            }
        }
        Ok(config)
    }

    pub fn program(&self, name: &str) -> Option<ShaderConfig> {
        let program = self.programs.get(name)?;
        Some(ShaderConfig {
            shader_dir: self.shader_dir.clone(),
            vertex: program.vertex.clone(),
            fragment: program.fragment.clone(),
            attributes: program
                .attributes
                .clone()
                .unwrap_or_else(default_attributes),
        })
    }

    pub fn program_names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.shader_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("shader_dir may not be empty".into()));
        }

        for (name, program) in &self.programs {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("program name may not be empty".into()));
            }

            if program.vertex.trim().is_empty() || program.fragment.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "program '{name}' must name both a vertex and a fragment file"
                )));
            }

            if let Some(attributes) = &program.attributes {
                if attributes.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "program '{name}' attributes must list at least one name"
                    )));
                }
                if let Some(blank) = attributes.iter().position(|attr| attr.trim().is_empty()) {
                    return Err(ConfigError::Invalid(format!(
                        "program '{name}' attribute {blank} is empty"
                    )));
                }
            }
        }

        Ok(())
    }
}
