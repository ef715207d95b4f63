/// Ellee CLI: run an ESPHome display effect locally for faster iteration

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ellee_compiler::{CompileOptions, CompileOutput, Compiler, RenderConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ellee")]
#[command(about = "Runs a display effect locally for faster iteration")]
#[command(version)]
struct Args {
    /// ESPHome yaml file to parse
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to the ESPHome source code
    #[arg(long, env = "ELLEE_ESPHOME", value_name = "path/to/esphome.git")]
    esphome: PathBuf,

    /// Directory to store generated sources and executables
    #[arg(long, default_value = ".", value_name = "DIR")]
    outdir: PathBuf,

    /// Minimal interval in ms to use
    #[arg(long, default_value_t = 0, value_name = "MS")]
    interval: u32,

    /// Display time in millis before the colors
    #[arg(long)]
    show_millis: bool,

    /// Display hex values instead of using ANSI colors
    #[arg(long)]
    as_hex: bool,

    /// Draw each update on a new line
    #[arg(long)]
    one_per_line: bool,

    /// Draw one update then exit
    #[arg(long)]
    once: bool,

    /// C++ compiler to build with
    #[arg(long, env = "CXX", default_value = ellee_compiler::driver::DEFAULT_CXX)]
    cxx: String,

    /// Maximum concurrent compilations per level (defaults to the CPU count)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Give up on a compilation after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(output) => {
            report(&output);
            if !output.success() {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<CompileOutput> {
    let render = RenderConfig {
        as_hex: args.as_hex,
        show_millis: args.show_millis,
        once: args.once,
        one_per_line: args.one_per_line,
    };

    let mut options = CompileOptions::new(&args.file, &args.esphome)
        .output_dir(&args.outdir)
        .cxx(&args.cxx)
        .min_interval_ms(args.interval)
        .render(render)
        .timeout(args.timeout_secs.map(Duration::from_secs));
    if let Some(jobs) = args.jobs {
        options = options.jobs(jobs);
    }

    Compiler::new(options)
        .compile()
        .with_context(|| format!("failed to compile effects from {}", args.file.display()))
}

fn report(output: &CompileOutput) {
    for build in output.builds() {
        if let Some(line) = build.compiling_line() {
            println!("{}", line);
        }
        if let Some(hint) = build.hint() {
            println!("{}", hint);
        }
    }
}
