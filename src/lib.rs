pub mod config;
pub mod error;
pub mod geo;
pub mod optimizer;
pub mod packer;
pub mod planting;
pub mod polygon;
pub mod report;
pub mod rng;
pub mod site;
pub mod species;

pub use config::BlockConfig;
pub use error::LayoutError;
pub use geo::Coordinate;
pub use optimizer::{optimize_layout, optimize_layout_par, LayoutResult};
pub use packer::{generate_layout, ExperimentBlock, PlantingRow};
pub use species::Species;
