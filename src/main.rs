use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use specbridge::spec_validator;
use specbridge::spec_writer;
use specbridge::{Importer, SpecParser};

#[derive(Parser)]
#[command(name = "specbridge")]
#[command(about = "Translate between markdown specs and source trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ImportFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a markdown spec into structured JSON
    Parse {
        /// Spec markdown file to parse
        #[arg(short, long)]
        file: PathBuf,

        /// Output JSON file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a spec from an existing source tree
    Import {
        /// Project root directory to scan
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ImportFormat::Json)]
        format: ImportFormat,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare a reference implementation against candidates for feature parity
    Compare {
        /// Reference implementation root directory
        #[arg(short, long)]
        reference: PathBuf,

        /// Candidate implementation root directories
        #[arg(short, long, required = true, num_args = 1..)]
        candidate: Vec<PathBuf>,

        /// Output JSON file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a markdown spec and report issues
    Validate {
        /// Spec markdown file to validate
        #[arg(short, long)]
        file: PathBuf,

        /// Output JSON file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Parse { file, output } => {
            let parser = SpecParser::new();
            match parser.parse_file(file) {
                Ok(spec) => output_result(&spec, output.as_ref(), "parse"),
                Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
            }
        }
        Commands::Import {
            root,
            format,
            output,
        } => {
            let importer = Importer::new();
            match importer.import_project(root) {
                Ok(project) => match format {
                    ImportFormat::Json => output_result(&project, output.as_ref(), "import"),
                    ImportFormat::Markdown => {
                        let markdown = spec_writer::render_project(&project);
                        output_text(&markdown, output.as_ref(), "import")
                    }
                },
                Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
            }
        }
        Commands::Compare {
            reference,
            candidate,
            output,
        } => {
            let importer = Importer::new();
            match importer.import_project(reference) {
                Ok(reference_project) => {
                    let mut candidates = Vec::new();
                    let mut failed = false;
                    for path in candidate {
                        match importer.import_project(path) {
                            Ok(project) => candidates.push(project),
                            Err(e) => {
                                eprintln!("Failed to import candidate '{}': {}", path.display(), e);
                                failed = true;
                            }
                        }
                    }
                    if failed {
                        Err("One or more candidates could not be imported".into())
                    } else {
                        let refs: Vec<&specbridge::ExtractedProject> = candidates.iter().collect();
                        let report = specbridge::parity::compare(&reference_project, &refs);
                        output_result(&report, output.as_ref(), "compare")
                    }
                }
                Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
            }
        }
        Commands::Validate { file, output } => {
            let parser = SpecParser::new();
            match parser.parse_file(file) {
                Ok(spec) => {
                    let issues = spec_validator::validate(&spec);
                    output_result(&issues, output.as_ref(), "validate")
                }
                Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
            }
        }
    };

    if let Err(e) = result {
        let command_name = match cli.command {
            Commands::Parse { .. } => "parse",
            Commands::Import { .. } => "import",
            Commands::Compare { .. } => "compare",
            Commands::Validate { .. } => "validate",
        };
        eprintln!("Error in '{}' command: {}", command_name, e);
        eprintln!("Hint: Use --help for usage information");
        std::process::exit(1);
    }
}

fn output_text(
    text: &str,
    output_path: Option<&PathBuf>,
    command_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match output_path {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| {
                format!(
                    "Failed to write {} output to '{}': {}",
                    command_name,
                    path.display(),
                    e
                )
            })?;
            println!("Output written to: {}", path.display());
        }
        None => {
            println!("{}", text);
        }
    }
    Ok(())
}

fn output_result<T: serde::Serialize>(
    result: &T,
    output_path: Option<&PathBuf>,
    command_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| format!("Failed to serialize {} result to JSON: {}", command_name, e))?;

    match output_path {
        Some(path) => {
            std::fs::write(path, &json).map_err(|e| {
                format!(
                    "Failed to write output to '{}': {}",
                    path.display(),
                    e
                )
            })?;
            println!("Output written to: {}", path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
