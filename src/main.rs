use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use fieldplot::{
    optimizer::{self, LayoutResult},
    packer, planting,
    report::{LayoutReport, LayoutWriter},
    rng::LayoutRng,
    site::SiteLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Field trial block layout runner")]
struct Cli {
    /// Path to the site YAML file
    #[arg(long, default_value = "sites/demo_square.yaml")]
    site: PathBuf,

    /// Override the site's shuffle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Lay out at this fixed angle instead of searching
    #[arg(long)]
    angle: Option<f64>,

    /// Lattice phase along the row axis, fraction of one step (fixed angle only)
    #[arg(long, default_value_t = 0.0)]
    offset_x: f64,

    /// Lattice phase along the length axis, fraction of one step (fixed angle only)
    #[arg(long, default_value_t = 0.0)]
    offset_y: f64,

    /// Evaluate search candidates on all cores
    #[arg(long)]
    parallel: bool,

    /// Directory for layout reports
    #[arg(long, default_value = "layouts")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let loader = SiteLoader::new(".");
    let site = loader.load(&cli.site)?;
    let config = site.build_config()?;
    let rng = LayoutRng::new(cli.seed.unwrap_or(site.seed));
    let area = site.area_m2();
    info!("site '{}': {}", site.name, planting::format_area(area));
    if let Some(description) = &site.description {
        info!("{}", description.trim());
    }

    let result = match cli.angle {
        Some(angle) => {
            let fixed = config
                .clone()
                .with_rotation(angle)
                .with_offsets(cli.offset_x, cli.offset_y);
            fixed.validate()?;
            LayoutResult {
                blocks: packer::generate_layout(&site.parcel, &fixed, &mut rng.primary()),
                angle_deg: angle,
            }
        }
        None if cli.parallel => optimizer::optimize_layout_par(&site.parcel, &config, &rng),
        None => optimizer::optimize_layout(&site.parcel, &config, &mut rng.primary()),
    };

    if result.is_empty() {
        println!(
            "No block fits site '{}'. Try shorter rows, fewer treatments or a narrower alley.",
            site.name
        );
        return Ok(());
    }

    if let Some(estimate) = site
        .plant_spacing_cm
        .and_then(|spacing| planting::estimate(area, config.row_spacing_cm, spacing))
    {
        info!(
            "whole-parcel estimate: {} plants over {} m of row",
            estimate.plants, estimate.linear_meters
        );
    }

    let report = LayoutReport::new(site.name.clone(), rng.master_seed(), area, result);
    let path = LayoutWriter::new(&cli.output_dir).write(&report)?;
    println!(
        "Site '{}' laid out with {} blocks at {} deg -> {}",
        site.name,
        report.block_count,
        report.angle_deg,
        path.display()
    );
    Ok(())
}
