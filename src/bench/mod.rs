//! Benchmark module
//! Iteration scheduler, process forking and reporting

pub mod fork;
pub mod report;
pub mod runner;

pub use fork::{run_forked, IN_FORK_FLAG};
pub use report::{category_ratios, print_summary, Ratio};
pub use runner::{run_iteration, run_schedule, BenchResult, IterationSample, Runner};
