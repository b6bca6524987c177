//! sketch-bindgen CLI
//!
//! Usage:
//!   sketch-bindgen [OPTIONS]
//!
//! Options:
//!   -o, --output <FILE>  Write the generated source to a file (stdout if absent)
//!   -c, --config <FILE>  Naming configuration (TOML format)
//!       --list           Print the catalog summary instead of generating
//!       --check          Run generation without writing anything

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use sketch_bindgen::{
    generate_with_config, operations_for, GeneratorConfig, SketchType,
};

#[derive(Parser)]
#[command(name = "sketch-bindgen")]
#[command(about = "Generate the DataSketches function layer for DuckDB")]
struct Cli {
    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Naming configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the catalog summary and exit
    #[arg(long)]
    list: bool,

    /// Run generation without writing output
    #[arg(long)]
    check: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.list {
        if let Err(e) = print_catalog() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match &cli.config {
        Some(path) => match GeneratorConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GeneratorConfig::default(),
    };

    // Generation is all-or-nothing: the file is only touched once the whole
    // source has been assembled successfully.
    let source = match generate_with_config(&config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.check {
        eprintln!("ok: {} bytes", source.len());
        return;
    }

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &source) {
                eprintln!("Error writing '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => {
            print!("{}", source);
        }
    }
}

fn print_catalog() -> Result<(), sketch_bindgen::CatalogError> {
    for sketch in SketchType::ALL {
        let ops = operations_for(sketch)?;
        println!(
            "{} ({:?}, {} element types)",
            sketch.display_name(),
            sketch.category(),
            sketch.allowed_types().len()
        );
        for op in ops {
            println!("  {} ({} args)", op.name, op.arity());
        }
    }
    Ok(())
}
