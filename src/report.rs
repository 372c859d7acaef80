//! Layout reports written for the persistence side.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::optimizer::LayoutResult;
use crate::packer::ExperimentBlock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutReport {
    pub site: String,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub area_m2: f64,
    pub angle_deg: f64,
    pub block_count: usize,
    pub blocks: Vec<ExperimentBlock>,
}

impl LayoutReport {
    pub fn new(site: impl Into<String>, seed: u64, area_m2: f64, result: LayoutResult) -> Self {
        Self {
            site: site.into(),
            generated_at: Utc::now(),
            seed,
            area_m2,
            angle_deg: result.angle_deg,
            block_count: result.block_count(),
            blocks: result.blocks,
        }
    }
}

pub struct LayoutWriter {
    output_dir: PathBuf,
}

impl LayoutWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Write `<output_dir>/<site>/layout.json`, replacing any previous report.
    /// The site name must be a single plain path component.
    pub fn write(&self, report: &LayoutReport) -> Result<PathBuf> {
        let mut components = Path::new(&report.site).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => bail!("Site name '{}' is not a plain directory name", report.site),
        }
        let dir = self.output_dir.join(&report.site);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join("layout.json");
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<LayoutReport> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let report = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(report)
    }
}
