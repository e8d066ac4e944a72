use clap::{Parser, ValueEnum};
use log::{error, info};
use rtscene_core::classify::classify_files;
use rtscene_core::Loadable;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool listing the RT objects found in a directory
#[derive(Parser, Debug)]
#[command(name = "rtexamine")]
#[command(about = "List RT structure sets, doses and plans found in a directory of DICOM files")]
#[command(version)]
struct Cli {
    /// Directory containing DICOM files
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
    /// File paths only (one per line)
    Paths,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    // Verify directory exists
    if !cli.directory.is_dir() {
        eprintln!("Error: {} is not a directory", cli.directory.display());
        process::exit(1);
    }

    info!("Processing directory: {}", cli.directory.display());

    let dicom_files = match collect_dicom_files(&cli.directory) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read directory: {}", e);
            eprintln!("Error: Failed to read directory: {}", e);
            process::exit(1);
        }
    };

    if dicom_files.is_empty() {
        eprintln!("Error: No DICOM files (.dcm) found in directory");
        process::exit(1);
    }

    info!("Found {} DICOM files", dicom_files.len());

    let loadables = classify_files(dicom_files);
    info!("Found {} RT objects", loadables.len());

    output_loadables(&loadables, cli.format);
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn collect_dicom_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom") => {
                files.push(path);
            }
            Some(_) => {}
            None => {
                if is_dicom_file(&path) {
                    info!("Found headerless DICOM file: {}", path.display());
                    files.push(path);
                }
            }
        }
    }

    // Stable listing order across platforms
    files.sort();
    Ok(files)
}

/// Checks for the "DICM" magic after the 128-byte preamble
fn is_dicom_file(path: &Path) -> bool {
    use std::fs::File;
    use std::io::Read;

    let Ok(mut file) = File::open(path) else {
        return false;
    };

    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

fn output_loadables(loadables: &[Loadable], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", LoadableReport::new(loadables));
        }
        OutputFormat::Paths => {
            for loadable in loadables {
                for file in &loadable.files {
                    println!("{}", file.display());
                }
            }
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(loadables) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

/// Text listing of classified RT objects
struct LoadableReport<'a> {
    loadables: &'a [Loadable],
}

impl<'a> LoadableReport<'a> {
    fn new(loadables: &'a [Loadable]) -> Self {
        Self { loadables }
    }
}

impl fmt::Display for LoadableReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RT Objects")?;
        writeln!(f, "==========")?;
        writeln!(f)?;

        if self.loadables.is_empty() {
            writeln!(f, "None found")?;
        }
        for loadable in self.loadables {
            writeln!(f, "{}", loadable.name)?;
            writeln!(f, "  Type:       {}", loadable.tooltip)?;
            writeln!(f, "  Selected:   {}", loadable.selected)?;
            writeln!(f, "  Confidence: {}", loadable.confidence)?;
            for file in &loadable.files {
                writeln!(f, "  File:       {}", file.display())?;
            }
            if !loadable.warning.is_empty() {
                writeln!(f, "  Warning:    {}", loadable.warning)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtscene_core::RtObjectKind;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_is_dicom_file_with_valid_header() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test_dicom");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"DICM").unwrap();
        file.write_all(b"additional data").unwrap();

        assert!(is_dicom_file(&file_path));
    }

    #[test]
    fn test_is_dicom_file_without_valid_header() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_dicom");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"This is not a DICOM file").unwrap();

        assert!(!is_dicom_file(&file_path));
    }

    #[test]
    fn test_is_dicom_file_wrong_magic() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("wrong_magic");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"NOTM").unwrap();

        assert!(!is_dicom_file(&file_path));
    }

    #[test]
    fn test_collect_dicom_files_with_extensions() {
        let temp_dir = TempDir::new().unwrap();

        File::create(temp_dir.path().join("rs.dcm")).unwrap();
        File::create(temp_dir.path().join("rd.DCM")).unwrap();
        File::create(temp_dir.path().join("rp.dicom")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        std::fs::create_dir(temp_dir.path().join("sub.dcm")).unwrap();

        let files = collect_dicom_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_collect_dicom_files_with_headerless() {
        let temp_dir = TempDir::new().unwrap();

        let dicom_file = temp_dir.path().join("headerless_dicom");
        let mut file = File::create(&dicom_file).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"DICM").unwrap();

        File::create(temp_dir.path().join("headerless_other"))
            .unwrap()
            .write_all(b"not dicom")
            .unwrap();

        let files = collect_dicom_files(temp_dir.path()).unwrap();
        assert_eq!(files, vec![dicom_file]);
    }

    #[test]
    fn test_loadable_report() {
        let loadables = vec![Loadable::new(
            PathBuf::from("rd.dcm"),
            RtObjectKind::Dose,
            "2: RTDOSE [1]".to_string(),
        )];
        let output = LoadableReport::new(&loadables).to_string();
        assert!(output.contains("2: RTDOSE [1]"));
        assert!(output.contains("Type:       RT Dose Storage"));
        assert!(output.contains("File:       rd.dcm"));
        assert!(LoadableReport::new(&[]).to_string().contains("None found"));
    }
}
