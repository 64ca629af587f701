//! The main module contains the code to process the command line for the bytemut program and
//! run the mutation generator.

mod config_file;
mod mutation_generator;
mod operators_info;

use crate::mutation_generator::{discover_mutations, generate_mutants};
use crate::operators_info::display_operators_info;
use chrono::Local;
use clap::{ArgGroup, Args, Parser, Subcommand};
use env_logger::TimestampPrecision;
use std::io::Write;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Mutation generator for compiled class files.")]
#[command(propagate_version = true)]
struct BytemutCommand {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    Operators(OperatorsCLArgs),
    Discover(DiscoverCLArgs),
    Mutate(MutateCLArgs),
}

/// Arguments for listing details about mutation operators
#[derive(Args, Debug, Clone)]
#[command(group(
ArgGroup::new("info")
.required(true)
.args(["list", "describe"]),
))]
pub struct OperatorsCLArgs {
    /// List the available mutation operators
    #[arg(short, long)]
    pub list: bool,

    /// Describe the available mutation operators
    #[arg(short, long)]
    pub describe: bool,
}

/// Arguments selecting the operators and the mutations they may report.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionCLArgs {
    /// Mutation operators to enable
    #[arg(long)]
    pub operators: Vec<String>,

    /// Enable all mutation operators, takes precedence over --operators
    #[arg(short, long)]
    pub all_operators: bool,

    /// Only report mutations in the listed methods, given as name(descriptor)
    #[arg(long)]
    pub methods: Vec<String>,

    /// Configuration (.bmut) file whose settings override the command line
    #[arg(short, long)]
    pub config_file: Option<String>,
}

/// Arguments for discovering the mutations in class files.
#[derive(Args, Debug, Clone)]
pub struct DiscoverCLArgs {
    /// Class file(s) to inspect
    #[arg(short, long, required = true)]
    pub file_names: Vec<String>,

    /// Write the mutation details to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[command(flatten)]
    pub selection: SelectionCLArgs,
}

/// Arguments for generating mutant class files.
#[derive(Args, Debug, Clone)]
pub struct MutateCLArgs {
    /// Class file to mutate
    #[arg(short, long, required = true)]
    pub file_name: String,

    /// Directory to store mutants
    #[arg(short, long, default_value = "out")]
    pub output_directory: String,

    /// JSON file with the mutations to apply, as written by the discover command.  Without it
    /// every discovered mutation is applied.
    #[arg(short, long)]
    pub mutations: Option<String>,

    /// Combine all selected mutations into a single mutant
    #[arg(long)]
    pub combine: bool,

    /// Save the settings used to mutate the file in a config (.bmut) file in the output
    /// directory
    #[arg(long)]
    pub save_config_file: bool,

    #[command(flatten)]
    pub selection: SelectionCLArgs,
}

fn main() {
    let _ = env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .format_timestamp(Some(TimestampPrecision::Seconds))
        .try_init();

    let bytemut_command = BytemutCommand::parse();
    match &bytemut_command.command {
        Commands::Operators(operators_args) => {
            display_operators_info(operators_args.clone());
        }
        Commands::Discover(discover_args) => {
            if let Err(e) = discover_mutations(discover_args.clone()) {
                println!("Unable to discover mutations: {}", e);
            }
        }
        Commands::Mutate(mutate_args) => {
            if let Err(e) = generate_mutants(mutate_args.clone()) {
                println!("Unable to generate mutations: {}", e);
            }
        }
    }
}
