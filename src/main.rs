//! Symmetry - analog layout symmetry constraint tool
//!
//! Detects matched devices in a SPICE netlist and writes them as `.sym`
//! constraints for the placer.
//!
//! # Usage
//!
//! ```bash
//! symmetry detect ota.sp -o ota.sym --axis
//! symmetry check ota.sym --netlist ota.sp
//! symmetry axis ota.sp ota.sym
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use symmetry_core::{
    axis::{AxisDetector, CentroidAxisDetector},
    circuit::Circuit,
    constraint::{self, Orientation},
    detect::{DetectorConfig, SymmetryDetector},
    error::{Result, SymmetryError},
    netlist,
};
use tracing::{info, Level};

/// Analog layout symmetry constraint tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect symmetry constraints in a netlist
    Detect {
        /// SPICE netlist file
        #[arg(value_name = "NETLIST")]
        netlist: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit JSON instead of `.sym`
        #[arg(long)]
        json: bool,

        /// Store the estimated symmetry axis in the output
        #[arg(long)]
        axis: bool,

        /// Also match cross-coupled pairs
        #[arg(long)]
        cross_coupled: bool,

        /// Grow pairs outward along matched drain nets
        #[arg(long)]
        propagate: bool,

        /// Tag detected pairs and groups HORIZONTAL
        #[arg(long)]
        horizontal: bool,

        /// Finger count at which a device becomes self-symmetric
        #[arg(long, default_value_t = symmetry_core::detect::DEFAULT_MIN_SELF_SYMMETRIC_FINGERS)]
        min_fingers: u32,
    },

    /// Parse and validate a `.sym` file
    Check {
        /// Constraint file
        #[arg(value_name = "SYM")]
        sym: PathBuf,

        /// Netlist providing the device universe and geometry
        #[arg(short, long)]
        netlist: Option<PathBuf>,
    },

    /// Estimate the symmetry axis for a constraint file
    Axis {
        #[arg(value_name = "NETLIST")]
        netlist: PathBuf,

        #[arg(value_name = "SYM")]
        sym: PathBuf,
    },
}

fn load_circuit(path: &Path) -> Result<Circuit> {
    let ast = netlist::parse_file(path)?;
    if !ast.skipped.is_empty() {
        info!(skipped = ast.skipped.len(), "non-MOS elements ignored");
    }
    Circuit::from_netlist(ast)
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Detect {
            netlist,
            output,
            json,
            axis,
            cross_coupled,
            propagate,
            horizontal,
            min_fingers,
        } => {
            let circuit = load_circuit(&netlist)?;
            let orientation = if horizontal {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let config = DetectorConfig::new()
                .with_cross_coupled(cross_coupled)
                .with_propagation(propagate)
                .with_min_self_symmetric_fingers(min_fingers)
                .with_pair_orientation(orientation);

            let mut set = SymmetryDetector::with_config(config).detect(&circuit);
            if axis {
                let estimate = CentroidAxisDetector.estimate(&circuit, &set);
                info!(%estimate, "axis estimate");
                estimate.apply_to(&mut set);
            }

            let text = if json {
                constraint::to_json(&set)?
            } else {
                constraint::serialize(&set)
            };
            match output {
                Some(path) => std::fs::write(&path, text).map_err(|e| SymmetryError::FileWrite {
                    path: path.display().to_string(),
                    source: e,
                })?,
                None => print!("{}", text),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Check { sym, netlist } => {
            let set = constraint::read_sym_file(&sym)?;
            let problems = match netlist {
                Some(path) => {
                    let circuit = load_circuit(&path)?;
                    let mut problems = constraint::validate_against(&set, &circuit);
                    problems.extend(constraint::check_matching(&set, &circuit));
                    problems
                }
                None => {
                    let devices: Vec<&str> = set.devices();
                    constraint::validate(&set, devices)
                }
            };

            if problems.is_empty() {
                println!("{}: ok", sym.display());
                Ok(ExitCode::SUCCESS)
            } else {
                for problem in &problems {
                    eprintln!("{}: {}", sym.display(), problem);
                }
                Ok(ExitCode::FAILURE)
            }
        }

        Command::Axis { netlist, sym } => {
            let circuit = load_circuit(&netlist)?;
            let set = constraint::read_sym_file(&sym)?;
            println!("{}", CentroidAxisDetector.estimate(&circuit, &set));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
