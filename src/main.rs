use clap::{Parser, Subcommand};
use sheetmap::cli::{self, ImportOptions};
use sheetmap::error::ImportResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetmap")]
#[command(about = "Map spreadsheet columns onto your own attributes.")]
#[command(long_about = "Sheetmap - Spreadsheet import with column mapping
Reads .xlsx, .xls, .xlsm, .xlsb, .ods and .csv files.

COMMANDS:
  inspect   - List sheets and columns of a spreadsheet
  import    - Map columns onto attributes and emit records

EXAMPLES:
  sheetmap inspect people.xlsx
  sheetmap import people.xlsx -a name=Name -a age=Age
  sheetmap import people.csv --config import.yaml -m 'Full name=name' -o out.json
  sheetmap import people.xlsx -a name=Name -i photo=Photo --image 1:photo=ann.png")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets and column identifiers of a spreadsheet
    Inspect {
        /// Spreadsheet file (.xlsx, .xls, .xlsm, .xlsb, .ods or .csv)
        file: PathBuf,

        /// Treat the first row as data; columns become 1, 2, 3...
        #[arg(long)]
        no_header: bool,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Import a spreadsheet into records keyed by your attributes.

Attributes come from --config and/or --attribute/--image-attribute flags.
With a header row, a column whose name equals an attribute title (or,
failing that, its key) is mapped automatically. Use --map to add or
override associations; 'COLUMN=none' clears one.

Columns mapped to nothing are dropped. Attributes left unmapped are
null in every record. Image attributes are filled from --image picks.

OUTPUT:
  -o out.json | out.yaml | out.xlsx   Write records to a file
  (no -o)                             Print JSON to stdout")]
    /// Import a spreadsheet, mapping columns onto attributes
    Import {
        /// Spreadsheet file (.xlsx, .xls, .xlsm, .xlsb, .ods or .csv)
        input: PathBuf,

        /// Importer config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Attribute as key=Title (repeatable)
        #[arg(short, long = "attribute")]
        attributes: Vec<String>,

        /// Image attribute as key=Title (repeatable)
        #[arg(short, long = "image-attribute")]
        image_attributes: Vec<String>,

        /// Treat the first row as data; columns become 1, 2, 3...
        #[arg(long)]
        no_header: bool,

        /// Sheet name or 1-based index (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Column mapping as COLUMN=key or COLUMN=none (repeatable)
        #[arg(short, long = "map")]
        mappings: Vec<String>,

        /// Image pick as ROW:key=PATH with 1-based rows (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,

        /// Output file (.json, .yaml, .yml or .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show mapping details and debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sheetmap=debug" } else { "sheetmap=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ImportResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            file,
            no_header,
            verbose,
        } => {
            init_logging(verbose);
            cli::inspect(file, no_header)
        }

        Commands::Import {
            input,
            config,
            attributes,
            image_attributes,
            no_header,
            sheet,
            mappings,
            images,
            output,
            verbose,
        } => {
            init_logging(verbose);
            cli::import(ImportOptions {
                input,
                config,
                attributes,
                image_attributes,
                no_header,
                sheet,
                mappings,
                images,
                output,
                verbose,
            })
        }
    }
}
