//! The plot pipeline: load result files, group runs, render charts.
//!
//! Split into a pure [`Plotter::prepare`] step that produces a
//! [`PlotPlan`] (all chart data, nothing drawn yet) and an
//! [`Plotter::execute`] step that renders it. Identical input files
//! produce an identical plan, which keeps the pipeline testable down
//! to the exact export bytes.

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;

use crate::chart::{self, YScale};
use crate::data;
use crate::group::{FamilySeries, Grouped, SkippedRun};

#[derive(Builder, Debug)]
pub struct Plotter {
    inputs: Vec<Utf8PathBuf>,
    out_dir: Utf8PathBuf,
    #[builder(default = "vec![\"items_per_second\".to_string()]")]
    metrics: Vec<String>,
    #[builder(default = "YScale::Log")]
    y_scale: YScale,
    #[builder(default = "false")]
    strict: bool,
    #[builder(default = "false")]
    verbose: bool,
    #[builder(default = "None")]
    export_data: Option<Utf8PathBuf>,
}

/// Everything that will be rendered: one entry per family and metric,
/// with the complete per-library series data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPlan {
    pub charts: Vec<FamilyChart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyChart {
    pub family: String,
    pub metric: String,
    pub series: FamilySeries,
}

#[derive(Debug)]
pub struct PlotSummary {
    pub runs: usize,
    pub skipped: usize,
    pub charts: Vec<Utf8PathBuf>,
}

impl Plotter {
    /// Loads and groups all input files into a plan, without touching
    /// the output directory. Charts are ordered metric-major, families
    /// within a metric in first-seen order.
    pub fn prepare(&self) -> Result<(PlotPlan, Vec<SkippedRun>, usize)> {
        let runs = data::load(&self.inputs)?;
        let total = runs.len();

        let (grouped, skipped) = Grouped::from_runs(runs);

        let mut charts = Vec::new();
        for metric in self.metrics.iter().unique() {
            for (family, series) in grouped.family_series(metric) {
                charts.push(FamilyChart {
                    family,
                    metric: metric.clone(),
                    series,
                });
            }
        }

        Ok((PlotPlan { charts }, skipped, total))
    }

    /// Runs the full pipeline and writes one PNG per plan entry.
    pub fn execute(&self) -> Result<PlotSummary> {
        let (plan, skipped, runs) = self.prepare()?;

        if !skipped.is_empty() {
            if self.strict {
                let first = &skipped[0];
                bail!(
                    "{} benchmark name(s) did not parse, first is \"{}\" ({})",
                    skipped.len(),
                    first.name,
                    first.error
                );
            }
            println!(
                "benchplot: warning: skipping {} benchmark name(s) that did not parse",
                skipped.len()
            );
            if self.verbose {
                for skip in &skipped {
                    println!("benchplot: warning: \"{}\": {}", skip.name, skip.error);
                }
            }
        }

        if let Some(filename) = &self.export_data {
            self.export(&plan, filename)?;
            println!("benchplot: exported chart data to {filename}");
        }

        if plan.charts.is_empty() {
            println!(
                "benchplot: no runs carry {}, nothing to chart",
                self.metrics.iter().join(", ")
            );
            return Ok(PlotSummary {
                runs,
                skipped: skipped.len(),
                charts: Vec::new(),
            });
        }

        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating output directory \"{}\"", self.out_dir))?;

        let mut charts = Vec::new();
        for family_chart in &plan.charts {
            let path = chart::render(family_chart, &self.out_dir, self.y_scale)?;
            println!("benchplot: wrote {path}");
            charts.push(path);
        }

        Ok(PlotSummary {
            runs,
            skipped: skipped.len(),
            charts,
        })
    }

    fn export(&self, plan: &PlotPlan, filename: &Utf8Path) -> Result<()> {
        let file = File::create(filename).with_context(|| format!("creating \"{filename}\""))?;
        serde_json::to_writer_pretty(BufWriter::new(file), plan)
            .with_context(|| format!("while writing {filename}"))?;

        Ok(())
    }
}
