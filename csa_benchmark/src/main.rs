use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use csa_benchmark::{driver::{self, Driver, Operation}, timer::ClockKind, workload::Workload};

#[derive(Parser)]
#[command(author, version, about, long_about = None, infer_long_args=true)]
/// Measures the latency of single queries to a compressed suffix array.
///
/// For each (operation, clock) pair, writes one `<result summary>\t<latency>` line per measured call
/// to the file named after the index file, with the operation name (and .ticks for the cycle counter) appended.
pub struct Cli {
    /// File with the index built by the construct program
    pub index: PathBuf,

    /// Query log, each line in the form <label><TAB><query>
    pub queries: PathBuf,

    /// Optional position/length log, each line in the form <offset><TAB><length>; extract replays these ranges if given
    pub positions: Option<PathBuf>,

    /// Clock(s) to measure latencies with
    #[arg(short='c', long, value_enum, default_value_t = ClockKind::Wall)]
    pub clock: ClockKind,

    /// Operations to benchmark, in order
    #[arg(long = "ops", value_enum, value_delimiter = ',', default_values_t = Operation::ALL)]
    pub operations: Vec<Operation>,

    #[command(flatten)]
    pub conf: driver::Conf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let workload = match Workload::load(&cli.queries, cli.positions.as_ref()) {
        Ok(workload) => workload,
        Err(e) => {
            eprintln!("Cannot load the workload ({}): {e}", cli.queries.display());
            return ExitCode::FAILURE;
        }
    };
    eprintln!("Loaded {} queries{}", workload.queries.len(), match &workload.ranges {
        Some((positions, _)) => format!(" and {} extraction ranges", positions.len()),
        None => String::new()
    });
    let start_moment = Instant::now();
    let index = match csa::load_from_file(&cli.index) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Cannot load the index from {}: {e}", cli.index.display());
            return ExitCode::FAILURE;
        }
    };
    eprintln!("Loaded {} index of {} symbols ({:.2} MB) in {:.2} s",
        index.variant(), index.len(), csa::size_in_mega_bytes(&*index), start_moment.elapsed().as_secs_f64());
    let driver = Driver::new(&*index, &cli.index, &workload, &cli.conf);
    if let Err(e) = driver.run_all(&cli.operations, cli.clock) {
        eprintln!("Benchmark failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
