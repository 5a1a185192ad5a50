//! Grouping of benchmark runs into families and per-library series.

use indexmap::IndexMap;

use crate::data::BenchRun;
use crate::name::{BenchName, NameError};

/// A run whose name parsed, together with the split-out name parts.
#[derive(Debug, Clone)]
pub struct ParsedRun {
    pub name: BenchName,
    pub run: BenchRun,
}

/// A run whose name did not parse. Skipped runs are always reported to
/// the caller, they never end up in some catch-all family.
#[derive(Debug, Clone)]
pub struct SkippedRun {
    pub name: String,
    pub error: NameError,
}

/// All parsed runs, grouped by family in first-seen order.
#[derive(Debug, Default)]
pub struct Grouped {
    pub families: IndexMap<String, Vec<ParsedRun>>,
}

/// Per-library measurement series of one family: library name (in
/// first-seen order) to (size, value) points sorted by size.
pub type FamilySeries = IndexMap<String, Vec<(u64, f64)>>;

impl Grouped {
    /// Partitions runs into parsed-and-grouped and skipped. Input order
    /// is kept both across and within families, so the result is
    /// deterministic for identical input.
    pub fn from_runs(runs: Vec<BenchRun>) -> (Grouped, Vec<SkippedRun>) {
        let mut grouped = Grouped::default();
        let mut skipped = Vec::new();

        for run in runs {
            match BenchName::parse(&run.name) {
                Ok(name) => grouped
                    .families
                    .entry(name.family.clone())
                    .or_default()
                    .push(ParsedRun { name, run }),
                Err(error) => skipped.push(SkippedRun {
                    name: run.name.clone(),
                    error,
                }),
            }
        }

        (grouped, skipped)
    }

    /// Extracts, per family, the per-library series of one metric.
    ///
    /// Runs that do not carry the metric are left out, and a family
    /// where no run carries it is left out entirely, so a chart is
    /// never empty. Points are sorted by size (stable, duplicates
    /// keep input order).
    pub fn family_series(&self, metric: &str) -> IndexMap<String, FamilySeries> {
        let mut families = IndexMap::new();

        for (family, runs) in &self.families {
            let mut series = FamilySeries::new();
            for parsed in runs {
                if let Some(value) = parsed.run.metric(metric) {
                    series
                        .entry(parsed.name.library.clone())
                        .or_default()
                        .push((parsed.name.size, value));
                }
            }
            if series.is_empty() {
                continue;
            }
            for points in series.values_mut() {
                points.sort_by_key(|(size, _)| *size);
            }
            families.insert(family.clone(), series);
        }

        families
    }
}
