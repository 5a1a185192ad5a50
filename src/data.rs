//! Loading of Google Benchmark JSON result files.

use std::fs::read_to_string;
use std::time::Instant;

use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde_json::Value;

/// One result file as written by `--benchmark_format=json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsDoc {
    pub context: Option<RunContext>,
    pub benchmarks: Vec<BenchRun>,
}

/// The `context` header of a result file. Everything in here is
/// informational, and fields vary between benchmark library versions,
/// so all of them are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub date: Option<String>,
    pub host_name: Option<String>,
    pub executable: Option<String>,
    pub num_cpus: Option<u64>,
    pub mhz_per_cpu: Option<u64>,
    pub cpu_scaling_enabled: Option<bool>,
    pub library_build_type: Option<String>,
}

/// One entry of the `benchmarks` array.
///
/// Only `name` is required. The well-known measurement fields are typed,
/// everything else (user counters, fields from newer benchmark library
/// versions) ends up in `counters` and stays addressable by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchRun {
    pub name: String,
    pub run_name: Option<String>,
    pub run_type: Option<String>,
    pub aggregate_name: Option<String>,
    pub family_index: Option<u64>,
    pub per_family_instance_index: Option<u64>,
    pub repetitions: Option<u64>,
    pub repetition_index: Option<u64>,
    pub threads: Option<u64>,
    pub iterations: Option<u64>,
    pub real_time: Option<f64>,
    pub cpu_time: Option<f64>,
    pub time_unit: Option<String>,
    pub items_per_second: Option<f64>,
    pub bytes_per_second: Option<f64>,
    #[serde(flatten)]
    pub counters: IndexMap<String, Value>,
}

impl RunContext {
    /// Short human-readable form of the interesting context fields, if
    /// any are present.
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(host_name) = &self.host_name {
            parts.push(format!("host {host_name}"));
        }
        if let Some(num_cpus) = self.num_cpus {
            parts.push(format!("{num_cpus} cpus"));
        }
        if let Some(mhz_per_cpu) = self.mhz_per_cpu {
            parts.push(format!("{mhz_per_cpu} MHz"));
        }
        match parts.is_empty() {
            true => None,
            false => Some(parts.join(", ")),
        }
    }
}

impl BenchRun {
    /// Looks up a metric by field name, e.g. `items_per_second` or
    /// `cpu_time`, falling back to user counters. Returns None when the
    /// run does not carry the metric or it is not a number.
    pub fn metric(&self, metric: &str) -> Option<f64> {
        match metric {
            "real_time" => self.real_time,
            "cpu_time" => self.cpu_time,
            "items_per_second" => self.items_per_second,
            "bytes_per_second" => self.bytes_per_second,
            "iterations" => self.iterations.map(|n| n as f64),
            _ => self.counters.get(metric).and_then(Value::as_f64),
        }
    }
}

fn load_one(filename: &Utf8Path) -> Result<ResultsDoc> {
    let file =
        read_to_string(filename).with_context(|| format!("reading \"{filename}\""))?;
    let doc: ResultsDoc =
        serde_json::from_str(&file).with_context(|| format!("while parsing {filename}"))?;

    Ok(doc)
}

/// Loads all given result files and concatenates their runs, keeping
/// file order. A missing or malformed file is an error, partial input
/// would silently skew the comparison.
pub fn load(filenames: &[Utf8PathBuf]) -> Result<Vec<BenchRun>> {
    let start = Instant::now();

    let mut runs = Vec::new();
    for filename in filenames {
        let doc = load_one(filename)?;
        match doc.context.as_ref().and_then(RunContext::summary) {
            Some(summary) => println!(
                "benchplot: {filename}: {} runs ({summary})",
                doc.benchmarks.len()
            ),
            None => println!("benchplot: {filename}: {} runs", doc.benchmarks.len()),
        }
        runs.extend(doc.benchmarks);
    }

    println!(
        "benchplot: reading {} files took {:?}",
        filenames.len(),
        start.elapsed(),
    );

    Ok(runs)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use super::*;

    const RESULTS: &str = r#"{
      "context": {
        "date": "2025-11-02T12:30:00+01:00",
        "host_name": "mbp14",
        "executable": "./blas_bench",
        "num_cpus": 8,
        "mhz_per_cpu": 3228,
        "cpu_scaling_enabled": false,
        "caches": [],
        "library_build_type": "release"
      },
      "benchmarks": [
        {
          "name": "BM_Ddot_OpenBLAS/8192",
          "family_index": 0,
          "per_family_instance_index": 0,
          "run_name": "BM_Ddot_OpenBLAS/8192",
          "run_type": "iteration",
          "repetitions": 1,
          "repetition_index": 0,
          "threads": 1,
          "iterations": 226145,
          "real_time": 3094.2,
          "cpu_time": 3093.5,
          "time_unit": "ns",
          "items_per_second": 2.648e9,
          "flops": 5.296e9
        },
        {
          "name": "BM_Ddot_Accelerate/8192",
          "iterations": 441145,
          "real_time": 1587.9,
          "cpu_time": 1587.1,
          "time_unit": "ns",
          "items_per_second": 5.161e9
        }
      ]
    }"#;

    #[test]
    fn test_parse_results_doc() {
        let doc: ResultsDoc = serde_json::from_str(RESULTS).unwrap();

        let context = doc.context.unwrap();
        assert_eq!(context.host_name.as_deref(), Some("mbp14"));
        assert_eq!(context.num_cpus, Some(8));
        assert_eq!(
            context.summary().unwrap(),
            "host mbp14, 8 cpus, 3228 MHz"
        );

        assert_eq!(doc.benchmarks.len(), 2);
        assert_eq!(doc.benchmarks[0].name, "BM_Ddot_OpenBLAS/8192");
        assert_eq!(doc.benchmarks[0].iterations, Some(226145));
        assert_eq!(doc.benchmarks[1].run_type, None);
    }

    #[test]
    fn test_metric_lookup() {
        let doc: ResultsDoc = serde_json::from_str(RESULTS).unwrap();
        let run = &doc.benchmarks[0];

        assert_eq!(run.metric("items_per_second"), Some(2.648e9));
        assert_eq!(run.metric("cpu_time"), Some(3093.5));
        assert_eq!(run.metric("iterations"), Some(226145.0));
        // user counter, via the flattened map
        assert_eq!(run.metric("flops"), Some(5.296e9));
        assert_eq!(run.metric("no_such_metric"), None);
    }

    #[test]
    fn test_metric_missing_field() {
        let doc: ResultsDoc = serde_json::from_str(RESULTS).unwrap();
        let run = &doc.benchmarks[1];

        assert_eq!(run.metric("flops"), None);
        assert_eq!(run.metric("bytes_per_second"), None);
    }

    #[test]
    fn test_load_concatenates_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let other = r#"{"benchmarks": [{"name": "BM_Gemm_Neon/64", "items_per_second": 1.0e9}]}"#;

        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        write(&first, RESULTS).unwrap();
        write(&second, other).unwrap();

        let filenames = [
            Utf8PathBuf::from_path_buf(first).unwrap(),
            Utf8PathBuf::from_path_buf(second).unwrap(),
        ];
        let runs = load(&filenames).unwrap();

        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].name, "BM_Ddot_OpenBLAS/8192");
        assert_eq!(runs[2].name, "BM_Gemm_Neon/64");
    }

    #[test]
    fn test_load_missing_file() {
        let filenames = [Utf8PathBuf::from("does_not_exist.json")];
        let error = load(&filenames).unwrap_err();

        assert!(error.to_string().contains("does_not_exist.json"));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        write(&bad, "{\"benchmarks\": [").unwrap();

        let filenames = [Utf8PathBuf::from_path_buf(bad).unwrap()];
        let error = load(&filenames).unwrap_err();

        assert!(error.to_string().contains("while parsing"));
    }
}
