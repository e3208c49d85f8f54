use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info, warn};
use std::path::PathBuf;

use http_importer::generator::{Generator, ImportOptions};
use http_importer::parser::{self, DocumentFormat};

/// Convert Postman collections and OpenAPI documents into .http request scripts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Prefix written in front of comment lines
    #[arg(long = "comment-prefix", global = true, default_value = "# ")]
    comment_prefix: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a Postman collection (v2.x JSON export)
    Postman {
        /// Collection file to import
        input: PathBuf,

        /// Output file; the script goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import an OpenAPI 3.x or Swagger 2.0 document
    Openapi {
        /// JSON or YAML document to import
        input: PathBuf,

        /// Output file; the script goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input encoding (json, yaml); guessed from the extension by default
        #[arg(long)]
        format: Option<DocumentFormat>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger with appropriate verbosity level
    let env = Env::default().filter_or("RUST_LOG", if cli.verbose { "debug" } else { "info" });
    env_logger::init_from_env(env);

    debug!("Starting http-importer...");

    let generator = Generator::with_options(ImportOptions {
        comment_prefix: cli.comment_prefix.clone(),
        ..Default::default()
    });

    match &cli.command {
        Commands::Postman { input, output } => {
            info!("Importing Postman collection {:?}", input);

            let collection = parser::load_collection(input)?;
            let conversion = generator.convert_collection(&collection);
            if conversion.skipped_items > 0 {
                warn!(
                    "Skipped {} requests without an id, a name or a URL",
                    conversion.skipped_items
                );
            }
            debug!("Declared {} variables", conversion.variables.len());

            generator.write(&conversion, output.as_deref())?;
            info!("Collection imported successfully");
        }
        Commands::Openapi {
            input,
            output,
            format,
        } => {
            info!("Importing API document {:?}", input);

            let document = parser::load_openapi(input, *format)?;
            let conversion = generator.convert_openapi(&document)?;

            generator.write(&conversion, output.as_deref())?;
            info!("API document imported successfully");
        }
    }

    Ok(())
}
