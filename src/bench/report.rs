//! Summary table and binary-vs-text ratios

use crate::fixture::{Category, Operation, Representation};

use super::runner::BenchResult;

/// Binary throughput divided by text throughput for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub category: Category,
    pub binary: f64,
    pub text: f64,
}

impl Ratio {
    pub fn speedup(&self) -> f64 {
        self.binary / self.text
    }
}

fn mean_of(results: &[BenchResult], op: Operation) -> Option<f64> {
    results
        .iter()
        .find(|r| r.name == op.name() && r.is_ok() && r.mean > 0.0)
        .map(|r| r.mean)
}

/// Ratios for every category where both representations succeeded
pub fn category_ratios(results: &[BenchResult]) -> Vec<Ratio> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let binary = mean_of(results, category.operation(Representation::Binary))?;
            let text = mean_of(results, category.operation(Representation::Text))?;
            Some(Ratio {
                category,
                binary,
                text,
            })
        })
        .collect()
}

pub fn print_summary(results: &[BenchResult]) {
    println!("\n╔══════════════════════════════════════════════════════════════════════════════════════════╗");
    println!("║                           UUID vs STRING IDENTIFIER BENCHMARKS                           ║");
    println!("╠══════════════════════════════════════════════════════════════════════════════════════════╣");

    for r in results {
        println!("║ {}", r);
    }

    println!("╚══════════════════════════════════════════════════════════════════════════════════════════╝");

    let ratios = category_ratios(results);
    if !ratios.is_empty() {
        println!("\n📊 UUID vs STRING:");
        for ratio in &ratios {
            println!(
                "   {:<20} {:>8.2}x  ({:.3} vs {:.3} ops/µs)",
                ratio.category.label(),
                ratio.speedup(),
                ratio.binary,
                ratio.text
            );
        }
    }

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        println!("\n❌ {} benchmark(s) failed and were excluded", failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    #[test]
    fn test_ratios_need_both_sides() {
        let results = vec![
            BenchResult::from_samples("binary-lookup-probe", 1, 1, vec![100.0]),
            BenchResult::from_samples("text-lookup-probe", 1, 1, vec![50.0]),
            BenchResult::from_samples("binary-equality-sweep", 1, 1, vec![10.0]),
            BenchResult::failed(
                "text-equality-sweep",
                1,
                &BenchError::UnknownOperation("x".into()),
            ),
        ];

        let ratios = category_ratios(&results);
        assert_eq!(ratios.len(), 1);
        assert_eq!(ratios[0].category, Category::Lookup);
        assert_eq!(ratios[0].speedup(), 2.0);
    }

    #[test]
    fn test_empty_results() {
        assert!(category_ratios(&[]).is_empty());
        print_summary(&[]);
    }
}
