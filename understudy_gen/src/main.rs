// vim: tw=80
//! Command-line front end for the Understudy generator.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use understudy_gen::Generator;

#[derive(Parser, Debug)]
#[command(name = "understudy-gen", version,
          about = "Generate Understudy mocks, test skeletons and assertions")]
struct Args {
    /// Path by which generated code names the runtime crate
    #[arg(long, global = true, default_value = "::understudy")]
    runtime: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mock the first trait declared in each source file
    GenerateMock {
        /// Rust source files
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Directory to write the mocks to
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write a test skeleton for a module or package
    GenerateTest {
        /// Module name, or path to the module or package
        target: String,
        /// Directory to write the skeleton to
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write custom assertion functions
    ///
    /// Each spec has the form name:params:condition:defaultMessage, for
    /// example "IsPositive:value i32:value > 0:expected positive value".
    GenerateAssertions {
        /// Directory to write the assertions to
        #[arg(short, long)]
        output: PathBuf,
        /// Assertion specs
        #[arg(required = true)]
        specs: Vec<String>,
        /// Fail if any spec had to be skipped
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let runtime = syn::parse_str::<syn::Path>(&args.runtime)
        .with_context(|| format!("invalid runtime path {:?}", args.runtime))?;

    match args.command {
        Command::GenerateMock { sources, output } => {
            let written = Generator::new(output)
                .runtime_path(runtime)
                .generate_mocks(&sources)
                .context("mock generation failed")?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Command::GenerateTest { target, output } => {
            let path = Generator::new(output)
                .runtime_path(runtime)
                .generate_test_boilerplate(&target)
                .with_context(|| format!("no test skeleton for {target}"))?;
            println!("{}", path.display());
        }
        Command::GenerateAssertions { output, specs, strict } => {
            let report = Generator::new(output)
                .runtime_path(runtime)
                .generate_assertions(&specs)
                .context("assertion generation failed")?;
            for skipped in report.skipped.iter() {
                warn!("line {}: {}", skipped.line, skipped.error);
            }
            info!("{} of {} assertions generated", report.generated.len(),
                  specs.len());
            println!("{}", report.path.display());
            if strict && !report.is_complete() {
                bail!("{} assertion spec(s) skipped", report.skipped.len());
            }
        }
    }
    Ok(())
}
