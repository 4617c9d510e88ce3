//! Forked measurement
//!
//! Every benchmark unit gets its own child process per fork: the launcher
//! re-runs this executable with [`IN_FORK_FLAG`] and the unit's name, and the
//! child prints one JSON `BenchResult` per line on stdout.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

use super::runner::BenchResult;
use crate::fixture::Operation;

/// Marks a child process spawned by [`run_forked`]
pub const IN_FORK_FLAG: &str = "--in-fork";

/// Measure each operation in `forks` fresh child processes and merge the
/// results by name
pub fn run_forked(forks: u32, ops: &[Operation]) -> anyhow::Result<Vec<BenchResult>> {
    let exe = std::env::current_exe()?;
    let mut merged = Vec::new();

    for &op in ops {
        for fork in 1..=forks {
            info!("🍴 {} fork {}/{}", op, fork, forks);
            merge_into(&mut merged, run_child(&exe, op)?);
        }
    }

    Ok(merged)
}

fn run_child(exe: &Path, op: Operation) -> anyhow::Result<Vec<BenchResult>> {
    // No operation name is a substring of another, so the filter selects one unit
    let output = Command::new(exe)
        .arg("run")
        .arg(IN_FORK_FLAG)
        .arg(op.name())
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()?;

    if !output.status.success() {
        anyhow::bail!("fork for {} exited with {}", op, output.status);
    }

    let results = parse_results(&String::from_utf8(output.stdout)?)?;
    if results.len() != 1 || results[0].name != op.name() {
        anyhow::bail!("fork for {} reported {} result(s)", op, results.len());
    }
    Ok(results)
}

/// Emit results as JSON lines
pub fn write_results<W: Write>(results: &[BenchResult], mut out: W) -> anyhow::Result<()> {
    for result in results {
        serde_json::to_writer(&mut out, result)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

pub fn parse_results(output: &str) -> anyhow::Result<Vec<BenchResult>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(anyhow::Error::from))
        .collect()
}

/// Merge results by benchmark name, keeping first-seen order
pub fn merge_into(acc: &mut Vec<BenchResult>, next: Vec<BenchResult>) {
    for result in next {
        match acc.iter_mut().find(|r| r.name == result.name) {
            Some(existing) => existing.merge(result),
            None => acc.push(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_round_trip() {
        let results = vec![
            BenchResult::from_samples("binary-lookup-probe", 1, 2048, vec![90.5, 90.5]),
            BenchResult::from_samples("text-lookup-probe", 1, 1024, vec![40.0]),
        ];

        let mut buf = Vec::new();
        write_results(&results, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);

        let parsed = parse_results(&format!("{text}\n\n")).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn test_operation_name_selects_single_unit() {
        for op in Operation::ALL {
            assert_eq!(Operation::select(&[op.name().to_string()]), vec![op]);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_results("not json").is_err());
    }

    #[test]
    fn test_merge_by_name() {
        let mut acc = vec![BenchResult::from_samples("a", 1, 1, vec![1.0])];
        merge_into(
            &mut acc,
            vec![
                BenchResult::from_samples("b", 1, 1, vec![5.0]),
                BenchResult::from_samples("a", 1, 1, vec![3.0]),
            ],
        );
        assert_eq!(acc.len(), 2);
        assert_eq!(acc[0].name, "a");
        assert_eq!(acc[0].samples, vec![1.0, 3.0]);
        assert_eq!(acc[1].name, "b");
    }
}
