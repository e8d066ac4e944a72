pub mod report;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for rtscene
#[derive(Parser, Debug)]
#[command(name = "rtscene")]
#[command(about = "Import RT structure sets, doses and plans into a scene and report the result")]
#[command(version)]
pub struct Cli {
    /// RT DICOM files (structure set, dose, plan)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Isodose levels to generate for every imported dose, e.g. 1,2,3
    #[arg(long, value_name = "GY", value_delimiter = ',')]
    pub isodose: Vec<f64>,

    /// Keep structure surfaces opaque instead of deriving opacity from nesting
    #[arg(long)]
    pub no_auto_opacity: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
