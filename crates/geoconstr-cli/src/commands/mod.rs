pub mod check;
pub mod compile;

use crate::cli::InputArgs;
use crate::config::{AppConfig, PartialAppConfig};
use crate::error::{CliError, Result};
use geoconstr::core::io::traits::StructureFile;
use geoconstr::core::io::xyz::XyzFile;
use geoconstr::core::models::structure::Structure;
use std::fs;
use tracing::info;

/// Everything a subcommand needs before it touches the compiler.
pub struct Inputs {
    pub structure: Structure,
    pub constraints: String,
    pub config: AppConfig,
}

pub fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let config = PartialAppConfig::load(args)?.merge_with_cli(args)?;

    info!("Loading structure from {:?}", &args.structure);
    let (structure, metadata) =
        XyzFile::read_from_path(&args.structure).map_err(|source| CliError::Structure {
            path: args.structure.clone(),
            source,
        })?;
    info!(
        "Loaded {} atoms ('{}').",
        structure.atom_count(),
        metadata.comment
    );

    info!("Reading constraints from {:?}", &args.constraints);
    let constraints = fs::read_to_string(&args.constraints)?;

    Ok(Inputs {
        structure,
        constraints,
        config,
    })
}

/// Writes a rendered report to `--output` or to stdout.
pub fn emit(report: &str, args: &InputArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            fs::write(path, report)?;
            info!("Report written to {:?}", path);
        }
        None => print!("{}", report),
    }
    Ok(())
}
