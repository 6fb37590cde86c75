use anyhow::Result;
use clap::Parser;
use jerase::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jerase")]
#[command(about = "Java local-variable type erasure with cast reinsertion")]
#[command(version)]
struct Cli {
    /// Input .java file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .java file (created or overwritten)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Name of the universal top type erased declarations fall back to
    #[arg(long, value_name = "NAME", default_value = jerase::consts::DEFAULT_TOP_TYPE)]
    top_type: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        println!("Transforming {}...", cli.input.display());
    }

    let config = Config::default().with_top_type(&cli.top_type);
    jerase::transform_file(&cli.input, &cli.output, &config)?;

    println!(
        "Transformation complete. Output written to {}",
        cli.output.display()
    );

    Ok(())
}
