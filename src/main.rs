//! Post-process one simulation case.
//!
//! Usage: `bluffpost <forces|pressure|centerline|profiles> <case-dir> [--config FILE] [--archive] [--no-compute]`

use anyhow::Result;
use bluffpost::{
    Backend, Case, CenterlineProfile, ForceCoefficients, PostConfig, SurfacePressure,
    VelocityProfiles,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bluffpost")]
#[command(about = "Time- and span-averaged quantities of bluff-body flow simulations")]
struct Cli {
    #[command(subcommand)]
    dataset: Dataset,
}

#[derive(clap::Args, Debug)]
struct CaseArgs {
    /// Case directory (contains `output/LES/postProcessing`)
    case_dir: PathBuf,

    /// JSON file with post-processing settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read raw samples from `postProcessing.tar.gz` instead of the directory tree
    #[arg(long)]
    archive: bool,

    /// Load the cached table from `<case-dir>/data` instead of recomputing
    #[arg(long = "no-compute")]
    no_compute: bool,
}

#[derive(Subcommand, Debug)]
enum Dataset {
    /// Force coefficients, their statistics and the Strouhal number
    Forces(CaseArgs),
    /// Surface pressure coefficient around the body
    Pressure(CaseArgs),
    /// Centerline wake profile of the streamwise velocity
    Centerline(CaseArgs),
    /// Vertical velocity profiles at several streamwise stations
    Profiles(CaseArgs),
}

impl Dataset {
    fn case_args(&self) -> &CaseArgs {
        match self {
            Self::Forces(a) | Self::Pressure(a) | Self::Centerline(a) | Self::Profiles(a) => a,
        }
    }
}

fn run(dataset: &Dataset) -> Result<()> {
    let args = dataset.case_args();
    let config = match &args.config {
        Some(path) => PostConfig::load(path)?,
        None => PostConfig::default(),
    };
    let label = args
        .case_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "case".to_string());
    let case = Case::new(label, &args.case_dir);
    let backend = if args.archive {
        Backend::Archive
    } else {
        Backend::Directory
    };
    let compute = !args.no_compute;

    match dataset {
        Dataset::Forces(_) => {
            let path = case.cache_path("force_coefficients.txt");
            let data = if compute {
                let data = ForceCoefficients::compute(&case, backend, &config)?;
                data.save(&path)?;
                data
            } else {
                ForceCoefficients::load(&path)?
            };
            let limits = config.time.limits();
            let [cd, cl, cz] = data.stats(limits)?;
            println!("{}: {} sample(s)", case.label, data.times.len());
            println!("  cd: {cd}");
            println!("  cl: {cl}");
            println!("  cz: {cz}");
            match data.strouhal(&config.flow, limits, config.strouhal_order) {
                Ok(st) => println!("  St = {st:.4}"),
                Err(e) => log::warn!("no Strouhal number: {e}"),
            }
        }
        Dataset::Pressure(_) => {
            let path = case.cache_path("surface_pressure.txt");
            let data = if compute {
                let data = SurfacePressure::compute(&case, backend, &config)?;
                data.save(&path)?;
                data
            } else {
                SurfacePressure::load(&path)?
            };
            println!("{}: cp at {} point(s)", case.label, data.cp.len());
        }
        Dataset::Centerline(_) => {
            let path = case.cache_path("u_centerline.txt");
            let data = if compute {
                let data = CenterlineProfile::compute(&case, backend, &config)?;
                data.save(&path)?;
                data
            } else {
                CenterlineProfile::load(&path)?
            };
            println!("{}: centerline profile with {} point(s)", case.label, data.x.len());
        }
        Dataset::Profiles(_) => {
            let path = case.cache_path("velocity_profiles.txt");
            let data = if compute {
                let data = VelocityProfiles::compute(&case, backend, &config)?;
                data.save(&path)?;
                data
            } else {
                VelocityProfiles::load(&path, &config.profiles.x_locations)?
            };
            println!(
                "{}: {} profile(s) with {} point(s)",
                case.label,
                data.x_locations.len(),
                data.y.len()
            );
        }
    }

    if compute {
        log::info!("saved derived data to {}", case.data_dir().display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli.dataset)
}
