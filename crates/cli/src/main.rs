//! Tomasulo pipeline simulator CLI.
//!
//! This binary is the "external collaborator" layer the core crate
//! deliberately excludes: it parses command-line arguments, loads the
//! program and (optional) memory-image files, drives `PipelineContext` to
//! completion, and renders the textual result report. The core
//! (`tomasulo-core`) never touches the filesystem beyond the loader
//! functions it's handed, and never calls `std::process::exit`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tomasulo_core::config::Config;
use tomasulo_core::error::SimError;
use tomasulo_core::loader::{load_memory_file, load_program_file};
use tomasulo_core::model::Memory;
use tomasulo_core::stats::SimReport;
use tomasulo_core::PipelineContext;

/// Cycle-accurate Tomasulo out-of-order pipeline simulator.
#[derive(Parser, Debug)]
#[command(
    name = "tomasim",
    author,
    version,
    about = "Cycle-accurate Tomasulo out-of-order pipeline simulator",
    long_about = "Runs a decoded program through a Tomasulo-style out-of-order pipeline \
(reservation stations, a reorder buffer, speculative execution past \
unresolved branches) and reports per-instruction timing, final \
architectural state, and aggregate metrics.\n\n\
Example:\n  tomasim --program prog.txt --memory mem.txt --trace"
)]
struct Cli {
    /// Program file: a start-address line followed by `opcode a b c` lines.
    #[arg(short, long)]
    program: PathBuf,

    /// Optional memory-image file: `address value` pairs.
    #[arg(short, long)]
    memory: Option<PathBuf>,

    /// Optional JSON configuration file overriding RS sizes/latencies, ROB
    /// size, register count, memory word count, or `max_cycles`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured `max_cycles` runaway guard.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Emits per-cycle `tracing` events at `trace` level (otherwise only
    /// `RUST_LOG` governs verbosity).
    #[arg(long)]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.trace);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn init_logging(trace: bool) {
    let default_filter = if trace { "trace" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();
}

fn run(cli: Cli) -> Result<(), SimError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(max_cycles) = cli.max_cycles {
        config.max_cycles = max_cycles;
    }

    let (start_address, program) = load_program_file(&cli.program)?;
    let memory = match &cli.memory {
        Some(path) => load_memory_file(path, config.memory_words)?,
        None => Memory::new(config.memory_words),
    };

    println!("[*] Loaded {} instructions, start address {}", program.len(), start_address);
    println!("[*] ROB size {}, max_cycles {}", config.rob_size, config.max_cycles);
    println!();

    let ctx = PipelineContext::new(config, program, start_address, memory);
    match ctx.run() {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(SimError::Runaway { max_cycles, partial }) => {
            eprintln!("[!] simulation exceeded max_cycles ({max_cycles}) without halting");
            print_report(&partial);
            Err(SimError::Runaway { max_cycles, partial })
        }
        Err(err) => Err(err),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, SimError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| SimError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| SimError::MalformedConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn print_report(report: &SimReport) {
    println!("=========================================================");
    println!();
    println!("[Timeline]  (issue / exec_start / exec_end / write / commit)");
    println!("{:>6} {:>8} {:>6} {:>6} {:>6} {:>6} {:>6}", "idx", "addr", "iss", "exS", "exE", "wr", "cmt");
    for t in &report.timeline {
        println!(
            "{:>6} {:>8} {:>6} {:>6} {:>6} {:>6} {:>6}",
            t.program_index, t.address, t.issue, t.exec_start, t.exec_end, t.write, t.commit
        );
    }

    println!();
    println!("[Registers]");
    for (r, value) in report.registers.iter().enumerate() {
        println!("  R{r:<3} = {value:>6} (0x{value:04X})");
    }

    println!();
    println!("[Memory] (non-zero words)");
    let mut any = false;
    for (addr, value) in report.memory.iter().enumerate() {
        if *value != 0 {
            println!("  M[{addr}] = {value} (0x{value:04X})");
            any = true;
        }
    }
    if !any {
        println!("  (all zero)");
    }

    println!();
    println!("[Summary]");
    println!("  Total cycles:       {}", report.stats.cycles);
    println!("  Committed:          {}", report.stats.committed);
    println!("  IPC:                {:.4}", report.stats.ipc());
    println!("  Branches:           {}", report.stats.branch_count);
    println!("  Mispredictions:     {}", report.stats.mispredictions);
    println!(
        "  Misprediction rate: {:.2}%",
        report.stats.misprediction_rate() * 100.0
    );
}
