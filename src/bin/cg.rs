//! CG benchmark entry point.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;

use nasbench::config::Class;
use nasbench::parallel::WorkerPool;
use nasbench::report::Report;
use nasbench::solver::CgBenchmark;

/// Conjugate gradient: sparse iterative solve with a generated matrix.
#[derive(Parser)]
#[command(name = "cg", version, about)]
struct Cli {
    /// Problem-size class (S, W, A, B, C, D, or E)
    #[arg(value_parser = Class::from_str)]
    class: Class,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let pool = match WorkerPool::from_env(None) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("cg: {err}");
            return ExitCode::from(2);
        }
    };
    let workers = pool.workers();

    let mut bench = match CgBenchmark::new(cli.class, pool) {
        Ok(bench) => bench,
        Err(err) => {
            eprintln!("cg: {err}");
            return ExitCode::from(2);
        }
    };
    let params = *bench.params();

    println!("\n\n NAS Parallel Benchmarks - CG Benchmark\n");
    println!(" Size: {:>11}", params.na);
    println!(" Iterations: {:>5}", params.niter);
    println!(" Number of workers: {workers}");

    let outcome = bench.run();

    println!("\n Benchmark completed");
    if outcome.verified {
        let err = (outcome.zeta - params.zeta_verify).abs() / params.zeta_verify;
        println!(" VERIFICATION SUCCESSFUL");
        println!(" Zeta is    {:20.13e}", outcome.zeta);
        println!(" Error is   {err:20.13e}");
    } else {
        println!(" VERIFICATION FAILED");
        println!(" Zeta                {:20.13e}", outcome.zeta);
        println!(" The correct zeta is {:20.13e}", params.zeta_verify);
    }

    Report {
        name: "CG",
        class: cli.class,
        size: params.na.to_string(),
        iterations: params.niter,
        seconds: outcome.seconds,
        mops: outcome.mops,
        optype: "conjugate gradient",
        verified: outcome.verified,
    }
    .print();

    if outcome.verified {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
