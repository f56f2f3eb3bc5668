//! On-disk artifact headers and atomic TOML persistence.
//!
//! Every persisted directory (compressed dataset, graph, search-parameter
//! snapshot, benchmark job/result) carries a `svs_config.toml`-shaped file
//! with a `__schema__`/`__version__` header plus schema-specific fields.
//! This module provides the header type, version comparison, and the
//! write-temp-then-rename save routine all of them share.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vsearch_error::{ErrorCode, VectorSearchError};

/// `vMajor.Minor.Patch`, ordered lexicographically by field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ArtifactVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        ArtifactVersion {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for ArtifactVersion {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('v').unwrap_or(s);
        let mut parts = s.split('.');
        let mut next = || -> Result<u32, ArtifactError> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| ArtifactError::MalformedVersion(s.to_string()))
        };
        let major = next()?;
        let minor = next()?;
        let patch = next()?;
        Ok(ArtifactVersion::new(major, minor, patch))
    }
}

/// The `__schema__`/`__version__` header every artifact's TOML carries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactHeader {
    #[serde(rename = "__schema__")]
    pub schema: String,
    #[serde(rename = "__version__")]
    pub version: String,
}

impl ArtifactHeader {
    pub fn new(schema: impl Into<String>, version: ArtifactVersion) -> Self {
        ArtifactHeader {
            schema: schema.into(),
            version: version.to_string(),
        }
    }

    pub fn version(&self) -> Result<ArtifactVersion, ArtifactError> {
        self.version.parse()
    }
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("malformed version string: {0}")]
    MalformedVersion(String),
    #[error("expected schema {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },
    #[error("artifact version {found} is newer than supported version {max_supported}")]
    VersionMismatch {
        found: ArtifactVersion,
        max_supported: ArtifactVersion,
    },
}

impl VectorSearchError for ArtifactError {
    fn code(&self) -> ErrorCode {
        match self {
            ArtifactError::Io(_) => ErrorCode::IOError,
            ArtifactError::Decode(_) | ArtifactError::Encode(_) | ArtifactError::MalformedVersion(_) => {
                ErrorCode::InvariantViolation
            }
            ArtifactError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            ArtifactError::VersionMismatch { .. } => ErrorCode::VersionMismatch,
        }
    }
}

/// Writes `value` as TOML to `path` atomically: serialize to
/// `<stem>_temp.<ext>` in the same parent directory, then `rename` onto
/// `path`. The rename is filesystem-atomic, so a crash mid-write never
/// leaves `path` partially written.
pub fn atomic_save_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let contents = toml::to_string_pretty(value)?;
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("artifact");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("toml");
    path.with_file_name(format!("{stem}_temp.{ext}"))
}

/// Loads and validates an artifact's header, checking the schema name and
/// that `found version <= max_supported`.
pub fn load_and_check_header(
    path: &Path,
    expected_schema: &str,
    max_supported: ArtifactVersion,
) -> Result<ArtifactHeader, ArtifactError> {
    let contents = fs::read_to_string(path)?;
    let header: ArtifactHeader = toml::from_str(&contents)?;
    if header.schema != expected_schema {
        return Err(ArtifactError::SchemaMismatch {
            expected: expected_schema.to_string(),
            found: header.schema.clone(),
        });
    }
    let found = header.version()?;
    if found > max_supported {
        return Err(ArtifactError::VersionMismatch {
            found,
            max_supported,
        });
    }
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize as _;

    #[derive(Serialize, Deserialize)]
    struct Demo {
        #[serde(rename = "__schema__")]
        schema: String,
        #[serde(rename = "__version__")]
        version: String,
        value: u32,
    }

    #[test]
    fn version_round_trips() {
        let v = ArtifactVersion::new(1, 2, 3);
        assert_eq!(v.to_string(), "v1.2.3");
        assert_eq!("v1.2.3".parse::<ArtifactVersion>().unwrap(), v);
    }

    #[test]
    fn atomic_save_then_load_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thing.toml");
        let demo = Demo {
            schema: "demo_schema".to_string(),
            version: "v0.0.1".to_string(),
            value: 42,
        };
        atomic_save_toml(&path, &demo).unwrap();
        assert!(path.exists());
        assert!(!temp_path_for(&path).exists());

        let header = load_and_check_header(&path, "demo_schema", ArtifactVersion::new(0, 0, 1)).unwrap();
        assert_eq!(header.version, "v0.0.1");
    }

    #[test]
    fn rejects_newer_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thing.toml");
        let demo = Demo {
            schema: "demo_schema".to_string(),
            version: "v2.0.0".to_string(),
            value: 1,
        };
        atomic_save_toml(&path, &demo).unwrap();
        let err = load_and_check_header(&path, "demo_schema", ArtifactVersion::new(1, 0, 0)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VersionMismatch);
    }

    #[test]
    fn rejects_wrong_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thing.toml");
        let demo = Demo {
            schema: "other_schema".to_string(),
            version: "v0.0.1".to_string(),
            value: 1,
        };
        atomic_save_toml(&path, &demo).unwrap();
        let err = load_and_check_header(&path, "demo_schema", ArtifactVersion::new(0, 0, 1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SchemaMismatch);
    }
}
