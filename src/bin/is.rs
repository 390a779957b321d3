//! IS benchmark entry point.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;

use nasbench::config::Class;
use nasbench::config::is::{MAX_ITERATIONS, MAX_WORKERS};
use nasbench::parallel::WorkerPool;
use nasbench::report::{Report, Timer, timer_flag};
use nasbench::sort::is::{
    IsBenchmark, T_BENCHMARKING, T_INITIALIZATION, T_SORTING, T_TOTAL_EXECUTION,
};

/// Integer sort: parallel bucket ranking of pseudo-random keys.
#[derive(Parser)]
#[command(name = "is", version, about)]
struct Cli {
    /// Problem-size class (S, W, A, B, C, or D)
    #[arg(value_parser = Class::from_str)]
    class: Class,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let timers_on = timer_flag();

    let pool = match WorkerPool::from_env(Some(MAX_WORKERS)) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("is: {err}");
            return ExitCode::from(2);
        }
    };
    let workers = pool.workers();

    let mut bench = match IsBenchmark::new(cli.class, pool) {
        Ok(bench) => bench,
        Err(err) => {
            eprintln!("is: {err}");
            return ExitCode::from(2);
        }
    };

    println!("\n\n NAS Parallel Benchmarks - IS Benchmark\n");
    println!(" Size:  {}  (class {})", bench.params().total_keys(), cli.class);
    println!(" Iterations:   {MAX_ITERATIONS}");
    println!(" Number of workers: {workers}");

    let mut timer = Timer::new();
    let outcome = bench.run(&mut timer, timers_on);

    Report {
        name: "IS",
        class: cli.class,
        size: bench.params().total_keys().to_string(),
        iterations: MAX_ITERATIONS as usize,
        seconds: outcome.seconds,
        mops: outcome.mops,
        optype: "keys ranked",
        verified: outcome.verified,
    }
    .print();

    if timers_on {
        let mut t_total = timer.read(T_TOTAL_EXECUTION);
        println!("\nAdditional timers -");
        println!(" Total execution: {t_total:8.3}");
        if t_total == 0.0 {
            t_total = 1.0;
        }
        for (label, id) in [
            ("Initialization", T_INITIALIZATION),
            ("Benchmarking  ", T_BENCHMARKING),
            ("Sorting       ", T_SORTING),
        ] {
            let t = timer.read(id);
            println!(" {label} : {t:8.3} ({:5.2}%)", t / t_total * 100.0);
        }
    }

    if outcome.verified {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
