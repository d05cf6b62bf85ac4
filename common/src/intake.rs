// Fact intake
//
// Loads and validates the versioned fact bundle produced by the upstream
// extractor. Validation failures are fatal for the whole bundle; a unit
// that reaches the engine is guaranteed a well-formed, unique name.

use crate::errors::FactError;
use crate::models::{AnalysisUnit, FactBundle, FACT_BUNDLE_VERSION};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

lazy_static::lazy_static! {
    // Dot-separated identifiers, the shape of a fully qualified class name
    static ref UNIT_NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
            .expect("unit name pattern compiles");
}

/// FactSource supplies analysis units from an upstream extractor
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Load and validate all units
    async fn load(&self) -> Result<Vec<AnalysisUnit>, FactError>;
}

/// Fact source reading a JSON fact bundle from disk
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl FactSource for JsonFileSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<AnalysisUnit>, FactError> {
        let raw = tokio::fs::read(&self.path).await?;
        let bundle: FactBundle = serde_json::from_slice(&raw)?;
        let units = validate_bundle(bundle)?;
        info!(unit_count = units.len(), "Fact bundle loaded");
        Ok(units)
    }
}

/// Check bundle version and unit-name integrity.
///
/// Names must look like qualified class names: the job skeleton is named
/// after the unit, so a malformed name would produce an unusable skeleton.
pub fn validate_bundle(bundle: FactBundle) -> Result<Vec<AnalysisUnit>, FactError> {
    if bundle.version != FACT_BUNDLE_VERSION {
        return Err(FactError::UnsupportedVersion {
            found: bundle.version,
            expected: FACT_BUNDLE_VERSION,
        });
    }

    let mut seen = HashSet::new();
    for unit in &bundle.units {
        if !UNIT_NAME_REGEX.is_match(&unit.name) {
            return Err(FactError::InvalidUnitName(unit.name.clone()));
        }
        if !seen.insert(unit.name.as_str()) {
            return Err(FactError::DuplicateUnitName(unit.name.clone()));
        }
    }

    debug!(
        unit_count = bundle.units.len(),
        extractor = ?bundle.extractor,
        "Fact bundle validated"
    );
    Ok(bundle.units)
}
