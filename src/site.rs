use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    config::BlockConfig,
    geo::Coordinate,
    polygon,
    species::{self, Species},
};

fn default_seed() -> u64 {
    42
}

/// One field-trial site as described in a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub parcel: Vec<Coordinate>,
    pub block: SiteBlock,
    pub species: Vec<SiteSpecies>,
    #[serde(default)]
    pub plant_spacing_cm: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteBlock {
    pub row_length_m: f64,
    pub row_spacing_cm: f64,
    #[serde(default)]
    pub alley_width_m: f64,
    #[serde(default)]
    pub rotation_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSpecies {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

pub struct SiteLoader {
    base_dir: PathBuf,
}

impl SiteLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Site> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read site file {}", path.display()))?;
        let site: Site = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(site)
    }
}

impl Site {
    /// Species with ids and colours filled in: ids default to `t<position>`,
    /// bumped past any id already spelled out in the file, and colours come
    /// from the high-contrast palette.
    pub fn build_species(&self) -> Result<Vec<Species>> {
        let explicit: HashSet<&str> = self.species.iter().filter_map(|s| s.id.as_deref()).collect();
        let mut built: Vec<Species> = Vec::with_capacity(self.species.len());
        for (index, entry) in self.species.iter().enumerate() {
            let id = match &entry.id {
                Some(id) => id.clone(),
                None => {
                    let mut n = index + 1;
                    loop {
                        let candidate = format!("t{n}");
                        let taken = explicit.contains(candidate.as_str())
                            || built.iter().any(|s| s.id == candidate);
                        if !taken {
                            break candidate;
                        }
                        n += 1;
                    }
                }
            };
            let color = entry
                .color
                .clone()
                .unwrap_or_else(|| species::next_color(&built).to_string());
            let sp = Species::new(id, entry.name.as_str(), color)
                .with_context(|| format!("species #{} in site '{}'", index + 1, self.name))?;
            built.push(sp);
        }
        Ok(built)
    }

    /// Validated block configuration for this site.
    pub fn build_config(&self) -> Result<BlockConfig> {
        let config = BlockConfig::new(
            self.block.row_length_m,
            self.block.row_spacing_cm,
            self.block.alley_width_m,
            self.build_species()?,
        )
        .with_rotation(self.block.rotation_deg);
        config
            .validate()
            .with_context(|| format!("block settings of site '{}'", self.name))?;
        polygon::validate_parcel(&self.parcel)
            .with_context(|| format!("parcel of site '{}'", self.name))?;
        Ok(config)
    }

    pub fn area_m2(&self) -> f64 {
        polygon::area_m2(&self.parcel)
    }
}
