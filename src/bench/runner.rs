//! Iteration scheduler
//! Warmup then measurement iterations of fixed wall-clock length, reporting
//! throughput in operations per microsecond.

use serde::{Deserialize, Serialize};
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{Config, MeasurementConfig};
use crate::error::BenchError;
use crate::fixture::{Fixture, Operation};
use crate::sink::Blackhole;

/// Invocations between clock reads
const BATCH: u64 = 1024;

/// Benchmark result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub name: String,
    pub threads: usize,
    pub ops: u64,
    /// ops/µs, one entry per measurement iteration
    pub samples: Vec<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
    /// Set when the unit failed; failed units carry no samples
    pub error: Option<String>,
}

impl BenchResult {
    pub fn from_samples(name: &str, threads: usize, ops: u64, samples: Vec<f64>) -> Self {
        let mut result = Self {
            name: name.to_string(),
            threads,
            ops,
            samples,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            stddev: 0.0,
            error: None,
        };
        result.recompute();
        result
    }

    pub fn failed(name: &str, threads: usize, err: &BenchError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::from_samples(name, threads, 0, vec![])
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Fold another run of the same unit (e.g. another fork) into this one
    pub fn merge(&mut self, other: BenchResult) {
        if self.error.is_none() && other.error.is_some() {
            self.error = other.error;
        }
        self.ops += other.ops;
        self.samples.extend(other.samples);
        if self.error.is_some() {
            self.samples.clear();
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let n = self.samples.len();
        if n == 0 {
            self.mean = 0.0;
            self.min = 0.0;
            self.max = 0.0;
            self.stddev = 0.0;
            return;
        }

        self.mean = self.samples.iter().sum::<f64>() / n as f64;
        self.min = self.samples.iter().copied().fold(f64::INFINITY, f64::min);
        self.max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.stddev = if n > 1 {
            let var = self
                .samples
                .iter()
                .map(|s| (s - self.mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
    }
}

impl std::fmt::Display for BenchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            Some(err) => write!(f, "{:<26} | FAILED: {}", self.name, err),
            None => write!(
                f,
                "{:<26} | {:>10.3} ± {:>8.3} ops/µs | min: {:>10.3} | max: {:>10.3} | n: {}",
                self.name,
                self.mean,
                self.stddev,
                self.min,
                self.max,
                self.samples.len()
            ),
        }
    }
}

/// One timed iteration
#[derive(Debug, Clone, Copy)]
pub struct IterationSample {
    pub ops: u64,
    pub elapsed: Duration,
}

impl IterationSample {
    /// Operations per microsecond
    pub fn throughput(&self) -> f64 {
        let micros = self.elapsed.as_secs_f64() * 1_000_000.0;
        if micros > 0.0 {
            self.ops as f64 / micros
        } else {
            0.0
        }
    }
}

/// Call `f` in batches until `duration` has elapsed
pub fn run_iteration<F>(duration: Duration, mut f: F) -> Result<IterationSample, BenchError>
where
    F: FnMut() -> Result<(), BenchError>,
{
    let start = Instant::now();
    let mut ops = 0u64;

    loop {
        for _ in 0..BATCH {
            f()?;
        }
        ops += BATCH;

        let elapsed = start.elapsed();
        if elapsed >= duration {
            return Ok(IterationSample { ops, elapsed });
        }
    }
}

/// Warmup iterations (discarded) followed by measurement iterations.
///
/// Every iteration starts at `barrier`, so threads sharing it measure
/// overlapping windows. A thread whose operation fails keeps joining the
/// remaining barriers without running, so its peers never stall.
pub fn run_schedule<F>(
    schedule: &MeasurementConfig,
    barrier: &Barrier,
    mut f: F,
) -> Result<Vec<IterationSample>, BenchError>
where
    F: FnMut() -> Result<(), BenchError>,
{
    let mut failure = None;

    for i in 0..schedule.warmup_iterations {
        barrier.wait();
        if failure.is_none() {
            match run_iteration(schedule.warmup_time(), &mut f) {
                Ok(sample) => debug!("  warmup {}: {:.3} ops/µs", i + 1, sample.throughput()),
                Err(err) => failure = Some(err),
            }
        }
    }

    let mut samples = Vec::with_capacity(schedule.measurement_iterations as usize);
    for i in 0..schedule.measurement_iterations {
        barrier.wait();
        if failure.is_none() {
            match run_iteration(schedule.measurement_time(), &mut f) {
                Ok(sample) => {
                    debug!("  iteration {}: {:.3} ops/µs", i + 1, sample.throughput());
                    samples.push(sample);
                }
                Err(err) => failure = Some(err),
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(samples),
    }
}

/// Join every barrier of a schedule without measuring
fn skip_schedule(schedule: &MeasurementConfig, barrier: &Barrier) {
    for _ in 0..schedule.total_iterations() {
        barrier.wait();
    }
}

/// Drives every selected operation through the schedule
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn operations(&self) -> Vec<Operation> {
        Operation::select(&self.config.measurement.include)
    }

    /// Run all selected units in order.
    ///
    /// A failing unit is recorded and skipped; a setup failure aborts.
    pub fn run_all(&self) -> anyhow::Result<Vec<BenchResult>> {
        let ops = self.operations();
        info!(
            "Running {} benchmarks | threads: {} | warmup: {}x{}s | measure: {}x{}s",
            ops.len(),
            self.config.measurement.effective_threads(),
            self.config.measurement.warmup_iterations,
            self.config.measurement.warmup_secs,
            self.config.measurement.measurement_iterations,
            self.config.measurement.measurement_secs,
        );

        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            results.push(self.run_operation(op)?);
        }
        Ok(results)
    }

    pub fn run_operation(&self, op: Operation) -> anyhow::Result<BenchResult> {
        let threads = self.config.measurement.effective_threads();
        info!("▶ {} ({} thread(s))", op, threads);

        let barrier = Barrier::new(threads);
        let per_thread: Vec<Result<Vec<IterationSample>, BenchError>> = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| s.spawn(|| self.measure_on_thread(op, &barrier)))
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join()
                        .unwrap_or_else(|_| Err(BenchError::WorkerPanicked(op.name().to_string())))
                })
                .collect()
        });

        let mut thread_samples = Vec::with_capacity(threads);
        for outcome in per_thread {
            match outcome {
                Ok(samples) => thread_samples.push(samples),
                Err(err) if err.is_setup_failure() => {
                    error!("Setup failed for {}: {}", op, err);
                    return Err(err.into());
                }
                Err(err) => {
                    warn!("❌ {} failed: {}", op, err);
                    return Ok(BenchResult::failed(op.name(), threads, &err));
                }
            }
        }

        let result = aggregate(op, threads, &thread_samples);
        info!("✅ {}", result);
        Ok(result)
    }

    fn measure_on_thread(
        &self,
        op: Operation,
        barrier: &Barrier,
    ) -> Result<Vec<IterationSample>, BenchError> {
        let fixture = match Fixture::setup(&self.config.corpus, Blackhole) {
            Ok(fixture) => fixture,
            Err(err) => {
                skip_schedule(&self.config.measurement, barrier);
                return Err(err);
            }
        };
        run_schedule(&self.config.measurement, barrier, || fixture.run(op))
    }
}

/// Sum per-thread throughput for each iteration index
fn aggregate(op: Operation, threads: usize, per_thread: &[Vec<IterationSample>]) -> BenchResult {
    let iterations = per_thread.iter().map(Vec::len).min().unwrap_or(0);
    let samples: Vec<f64> = (0..iterations)
        .map(|i| per_thread.iter().map(|t| t[i].throughput()).sum::<f64>())
        .collect();
    let ops = per_thread.iter().flatten().map(|s| s.ops).sum();
    BenchResult::from_samples(op.name(), threads, ops, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.corpus.seed = Some(1);
        config.measurement = MeasurementConfig {
            warmup_iterations: 1,
            warmup_secs: 0,
            measurement_iterations: 2,
            measurement_secs: 0,
            forks: 0,
            threads: 1,
            include: vec![],
        };
        config
    }

    #[test]
    fn test_iteration_batches() {
        let mut calls = 0u64;
        let sample = run_iteration(Duration::ZERO, || {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(sample.ops, BATCH);
        assert_eq!(calls, BATCH);
    }

    #[test]
    fn test_iteration_stops_on_error() {
        let mut calls = 0;
        let err = run_iteration(Duration::from_secs(60), || {
            calls += 1;
            if calls == 3 {
                Err(BenchError::UnknownOperation("x".into()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert!(matches!(err, BenchError::UnknownOperation(_)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_schedule_sample_count() {
        let schedule = quick_config().measurement;
        let samples = run_schedule(&schedule, &Barrier::new(1), || Ok(())).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_failing_thread_does_not_stall_peers() {
        let schedule = quick_config().measurement;
        let barrier = Barrier::new(2);

        let (healthy, failing) = thread::scope(|s| {
            let healthy = s.spawn(|| run_schedule(&schedule, &barrier, || Ok(())));
            let failing = s.spawn(|| {
                run_schedule(&schedule, &barrier, || {
                    Err(BenchError::UnknownOperation("x".into()))
                })
            });
            (healthy.join().unwrap(), failing.join().unwrap())
        });

        assert_eq!(healthy.unwrap().len(), 2);
        assert!(matches!(failing, Err(BenchError::UnknownOperation(_))));
    }

    #[test]
    fn test_threads_start_iterations_together() {
        let schedule = quick_config().measurement;
        let barrier = Barrier::new(2);
        let started = std::sync::Mutex::new(Vec::new());

        thread::scope(|s| {
            for delay_ms in [0u64, 50] {
                let (schedule, barrier, started) = (&schedule, &barrier, &started);
                s.spawn(move || {
                    thread::sleep(Duration::from_millis(delay_ms));
                    let mut first_call = true;
                    run_schedule(schedule, barrier, || {
                        if first_call {
                            started.lock().unwrap().push(Instant::now());
                            first_call = false;
                        }
                        Ok(())
                    })
                    .unwrap();
                });
            }
        });

        let started = started.into_inner().unwrap();
        assert_eq!(started.len(), 2);
        let gap = if started[0] > started[1] {
            started[0] - started[1]
        } else {
            started[1] - started[0]
        };
        // The late thread's 50ms head start is absorbed by the first barrier
        assert!(gap < Duration::from_millis(40), "gap: {gap:?}");
    }

    #[test]
    fn test_stats() {
        let result = BenchResult::from_samples("x", 1, 10, vec![1.0, 2.0, 3.0]);
        assert_eq!(result.mean, 2.0);
        assert_eq!(result.min, 1.0);
        assert_eq!(result.max, 3.0);
        assert!((result.stddev - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_forks() {
        let mut a = BenchResult::from_samples("x", 1, 10, vec![1.0, 3.0]);
        a.merge(BenchResult::from_samples("x", 1, 5, vec![2.0]));
        assert_eq!(a.ops, 15);
        assert_eq!(a.samples.len(), 3);
        assert_eq!(a.mean, 2.0);

        a.merge(BenchResult::failed("x", 1, &BenchError::UnknownOperation("y".into())));
        assert!(!a.is_ok());
        assert!(a.samples.is_empty());
    }

    #[test]
    fn test_run_all_operations() {
        let results = Runner::new(quick_config()).run_all().unwrap();
        assert_eq!(results.len(), Operation::ALL.len());
        for result in &results {
            assert!(result.is_ok(), "{}", result);
            assert_eq!(result.samples.len(), 2);
            assert!(result.mean > 0.0);
        }
    }

    #[test]
    fn test_run_selected_multi_threaded() {
        let mut config = quick_config();
        config.measurement.include = vec!["lookup".into()];
        config.measurement.threads = 2;
        let runner = Runner::new(config);

        let results = runner.run_all().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(BenchResult::is_ok));
    }

    #[test]
    fn test_setup_failure_is_fatal() {
        let mut config = quick_config();
        config.corpus.size = 1;
        assert!(Runner::new(config).run_all().is_err());
    }

    #[test]
    fn test_setup_failure_with_threads_does_not_hang() {
        let mut config = quick_config();
        config.corpus.size = 0;
        config.measurement.threads = 2;
        assert!(Runner::new(config).run_operation(Operation::TextLookupProbe).is_err());
    }
}
