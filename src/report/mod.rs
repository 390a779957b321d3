//! Result reporting and wall-clock timing.

pub mod timers;
pub use timers::Timer;

use std::path::Path;

use crate::config::Class;

/// Sentinel file enabling the verbose per-phase timing breakdown.
pub const TIMER_FLAG_FILE: &str = "timer.flag";

/// True when `timer.flag` exists in the working directory.
pub fn timer_flag() -> bool {
    let on = Path::new(TIMER_FLAG_FILE).exists();
    if on {
        log::debug!("{TIMER_FLAG_FILE} present, verbose timing enabled");
    }
    on
}

/// Fixed-format result block printed once per run.
///
/// The layout is a stdout contract consumed by existing harnesses; keep the
/// field widths and wording stable.
pub struct Report {
    pub name: &'static str,
    pub class: Class,
    /// Preformatted size descriptor.
    pub size: String,
    pub iterations: usize,
    pub seconds: f64,
    pub mops: f64,
    pub optype: &'static str,
    pub verified: bool,
}

impl Report {
    pub fn print(&self) {
        println!("\n\n {} Benchmark Completed", self.name);
        println!(" Class           =             {:>12}", self.class);
        println!(" Size            =             {:>12}", self.size);
        println!(" Iterations      =             {:>12}", self.iterations);
        println!(" Time in seconds =             {:>12.2}", self.seconds);
        println!(" Mop/s total     =             {:>12.2}", self.mops);
        println!(" Operation type  = {:>24}", self.optype);
        if self.verified {
            println!(" Verification    =               SUCCESSFUL");
        } else {
            println!(" Verification    =             UNSUCCESSFUL");
        }
        println!(" Version         =             {:>12}", env!("CARGO_PKG_VERSION"));
        println!(" Compiler ver    =             {:>12}", "");
        println!(" Compile date    =             {:>12}", "");
        println!();
    }
}
