use std::fmt;
use std::str::FromStr;

/// One programmable phase of the GL pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Vertex,
        Stage::TessControl,
        Stage::TessEvaluation,
        Stage::Geometry,
        Stage::Fragment,
    ];

    /// Suffix appended to the names of outputs a stage produces.
    pub fn suffix(self) -> &'static str {
        match self {
            Stage::Vertex => "vsh",
            Stage::TessControl => "tcs",
            Stage::TessEvaluation => "tes",
            Stage::Geometry => "geo",
            Stage::Fragment => "fsh",
        }
    }

    pub fn is_tessellation(self) -> bool {
        matches!(self, Stage::TessControl | Stage::TessEvaluation)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::TessControl => "tess-control",
            Stage::TessEvaluation => "tess-evaluation",
            Stage::Geometry => "geometry",
            Stage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shader stage '{0}'")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vertex" | "vsh" | "vert" => Ok(Stage::Vertex),
            "tess-control" | "tcs" | "tesc" => Ok(Stage::TessControl),
            "tess-evaluation" | "tes" | "tese" => Ok(Stage::TessEvaluation),
            "geometry" | "geo" | "geom" => Ok(Stage::Geometry),
            "fragment" | "fsh" | "frag" => Ok(Stage::Fragment),
            other => Err(UnknownStage(other.to_owned())),
        }
    }
}

/// GLSL language version emitted in the `#version` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlslVersion {
    pub major: u8,
    pub minor: u8,
}

impl GlslVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// The numeric form used by `#version`, e.g. 4.1 → 410.
    pub fn number(self) -> u32 {
        u32::from(self.major) * 100 + u32::from(self.minor) * 10
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid GLSL version '{0}', expected MAJOR.MINOR (e.g. 4.1)")]
pub struct InvalidVersion(pub String);

impl FromStr for GlslVersion {
    type Err = InvalidVersion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion(value.to_owned());
        let (major, minor) = value.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u8>().map_err(|_| invalid())?;
        let minor = minor.parse::<u8>().map_err(|_| invalid())?;
        if major == 0 || minor > 9 {
            return Err(invalid());
        }
        Ok(Self { major, minor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_numbers() {
        assert_eq!(GlslVersion::new(4, 1).number(), 410);
        assert_eq!("3.3".parse::<GlslVersion>().unwrap().number(), 330);
        assert!("4".parse::<GlslVersion>().is_err());
        assert!("4.10".parse::<GlslVersion>().is_err());
    }

    #[test]
    fn stage_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.to_string().parse::<Stage>().unwrap(), stage);
        }
        assert_eq!("frag".parse::<Stage>().unwrap(), Stage::Fragment);
    }
}
