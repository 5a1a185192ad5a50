//! Rendering of one comparison chart per benchmark family.
//!
//! Each chart plots one metric over problem size, one line per library.
//! The size axis is log scale base 2 with a tick per power of two, as
//! benchmark sizes are normally powers of two. The value axis is log
//! scale base 10 by default, linear on request.

use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;

use crate::pipeline::FamilyChart;

const CHART_SIZE: (u32, u32) = (1000, 600);

const TITLE_FONT_SIZE: u32 = 30;
const AXIS_LABEL_FONT_SIZE: u32 = 20;
const TICK_LABEL_FONT_SIZE: u32 = 15;
const LEGEND_FONT_SIZE: u32 = 15;

/// Series color cycle (the well-known matplotlib one, which keeps
/// charts comparable with previous matplotlib-based tooling). Recycled
/// when a family compares more libraries than there are colors.
const COLORS: &[RGBColor] = &[
    RGBColor(31, 119, 180),  // blue
    RGBColor(255, 127, 14),  // orange
    RGBColor(44, 160, 44),   // green
    RGBColor(214, 39, 40),   // red
    RGBColor(148, 103, 189), // purple
    RGBColor(140, 86, 75),   // brown
];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum YScale {
    Log,
    Linear,
}

fn series_color(index: usize) -> RGBColor {
    COLORS[index % COLORS.len()]
}

/// Renders one family chart as PNG into `out_dir` and returns the
/// written path.
pub fn render(chart: &FamilyChart, out_dir: &Utf8Path, y_scale: YScale) -> Result<Utf8PathBuf> {
    let path = out_dir.join(output_name(&chart.family, &chart.metric));

    match y_scale {
        YScale::Log => draw_log(chart, &path),
        YScale::Linear => draw_linear(chart, &path),
    }
    .with_context(|| format!("rendering \"{path}\""))?;

    Ok(path)
}

fn draw_log(chart: &FamilyChart, path: &Utf8Path) -> Result<()> {
    let root = BitMapBackend::new(path.as_std_path(), CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let values = || chart.series.values().flatten().map(|(_, value)| *value);

    let y_min = values()
        .filter(|&value| value > 0.0)
        .fold(f64::MAX, |a, b| a.min(b));
    let y_max = values().fold(0.0_f64, |a, b| a.max(b)) * 2.0;
    if y_min == f64::MAX {
        // nothing a log axis could show
        root.present()?;
        return Ok(());
    }

    let (x_min, x_max) = pow2_bounds(chart.series.values().flatten().map(|(size, _)| *size));

    let mut plot = ChartBuilder::on(&root)
        .caption(
            format!("Benchmark family: {}", chart.family),
            ("sans-serif", TITLE_FONT_SIZE),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (x_min..x_max).log_scale().base(2.0),
            (y_min..y_max).log_scale(),
        )?;

    plot.configure_mesh()
        .x_labels(pow2_tick_count(x_min, x_max))
        .x_label_formatter(&|x| format_size_tick(*x))
        .y_labels(8)
        .y_label_formatter(&|y| format_value_tick(*y))
        .x_desc("Size")
        .y_desc(metric_label(&chart.metric))
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for (index, (library, series)) in chart.series.iter().enumerate() {
        let color = series_color(index);

        // a log axis cannot place zero sizes or non-positive values
        let data: Vec<(f64, f64)> = series
            .iter()
            .filter(|(size, value)| *size > 0 && *value > 0.0)
            .map(|(size, value)| (*size as f64, *value))
            .collect();
        if data.is_empty() {
            continue;
        }

        plot.draw_series(LineSeries::new(data.clone(), color.stroke_width(3)))?
            .label(library.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
            });

        plot.draw_series(PointSeries::of_element(
            data,
            4,
            color.filled(),
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
        ))?;
    }

    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_linear(chart: &FamilyChart, path: &Utf8Path) -> Result<()> {
    let root = BitMapBackend::new(path.as_std_path(), CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = chart
        .series
        .values()
        .flatten()
        .map(|(_, value)| *value)
        .fold(0.0_f64, |a, b| a.max(b));

    let (x_min, x_max) = pow2_bounds(chart.series.values().flatten().map(|(size, _)| *size));

    let mut plot = ChartBuilder::on(&root)
        .caption(
            format!("Benchmark family: {}", chart.family),
            ("sans-serif", TITLE_FONT_SIZE),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (x_min..x_max).log_scale().base(2.0),
            0.0..(y_max * 1.25).max(1.0),
        )?;

    plot.configure_mesh()
        .x_labels(pow2_tick_count(x_min, x_max))
        .x_label_formatter(&|x| format_size_tick(*x))
        .y_labels(8)
        .y_label_formatter(&|y| format_value(*y))
        .x_desc("Size")
        .y_desc(metric_label(&chart.metric))
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for (index, (library, series)) in chart.series.iter().enumerate() {
        let color = series_color(index);

        let data: Vec<(f64, f64)> = series
            .iter()
            .filter(|(size, _)| *size > 0)
            .map(|(size, value)| (*size as f64, *value))
            .collect();
        if data.is_empty() {
            continue;
        }

        plot.draw_series(LineSeries::new(data.clone(), color.stroke_width(3)))?
            .label(library.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
            });

        plot.draw_series(PointSeries::of_element(
            data,
            4,
            color.filled(),
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
        ))?;
    }

    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Chart file name for a family and metric. Both parts are sanitized,
/// a user counter name may contain path separators.
fn output_name(family: &str, metric: &str) -> String {
    format!("{}_{}_results.png", sanitize(family), sanitize(metric))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            true => c,
            false => '_',
        })
        .collect()
}

/// Axis label for a metric field name, e.g. `items_per_second` becomes
/// "Items per second".
fn metric_label(metric: &str) -> String {
    let mut label = metric.replace('_', " ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

/// Smallest power-of-two range enclosing all sizes. Zero sizes cannot
/// sit on a log axis and are clamped to 1 for the bounds.
fn pow2_bounds(sizes: impl Iterator<Item = u64>) -> (f64, f64) {
    let (min, max) = match sizes.map(|size| size.max(1)).minmax() {
        MinMaxResult::NoElements => (1, 2),
        MinMaxResult::OneElement(size) => (size, size),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    let low = (min as f64).log2().floor();
    let mut high = (max as f64).log2().ceil();
    if high <= low {
        high = low + 1.0;
    }

    (low.exp2(), high.exp2())
}

/// One tick per power of two between the bounds, inclusive.
fn pow2_tick_count(x_min: f64, x_max: f64) -> usize {
    (x_max.log2().round() - x_min.log2().round()) as usize + 1
}

/// Labels only exact powers of two, intermediate ticks stay unlabeled.
fn format_size_tick(size: f64) -> String {
    if size <= 0.0 {
        return String::new();
    }
    let log2 = size.log2();
    let nearest = log2.round();
    if (log2 - nearest).abs() < 1e-6 {
        format!("{}", size.round() as u64)
    } else {
        String::new()
    }
}

/// Labels only exact powers of ten on the log value axis.
fn format_value_tick(value: f64) -> String {
    if value <= 0.0 {
        return String::new();
    }
    let log10 = value.log10();
    let nearest = log10.round();
    if (log10 - nearest).abs() < 1e-6 {
        format_value(value)
    } else {
        String::new()
    }
}

/// Compact value formatting with an SI suffix, e.g. 2.5e9 as "2.5G".
fn format_value(value: f64) -> String {
    if value >= 1e12 {
        format!("{}T", trim(value / 1e12))
    } else if value >= 1e9 {
        format!("{}G", trim(value / 1e9))
    } else if value >= 1e6 {
        format!("{}M", trim(value / 1e6))
    } else if value >= 1e3 {
        format!("{}k", trim(value / 1e3))
    } else {
        trim(value)
    }
}

fn trim(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else if value >= 0.1 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow2_bounds_enclose_sizes() {
        assert_eq!(pow2_bounds([8, 524288].into_iter()), (8.0, 524288.0));
        assert_eq!(pow2_bounds([10, 1000].into_iter()), (8.0, 1024.0));
    }

    #[test]
    fn test_pow2_bounds_single_size() {
        // a single size still gets a non-degenerate axis
        assert_eq!(pow2_bounds([8192].into_iter()), (8192.0, 16384.0));
    }

    #[test]
    fn test_pow2_bounds_zero_size() {
        assert_eq!(pow2_bounds([0].into_iter()), (1.0, 2.0));
        assert_eq!(pow2_bounds(std::iter::empty()), (1.0, 2.0));
    }

    #[test]
    fn test_pow2_tick_count() {
        assert_eq!(pow2_tick_count(8.0, 524288.0), 17);
        assert_eq!(pow2_tick_count(8192.0, 16384.0), 2);
    }

    #[test]
    fn test_format_size_tick_labels_only_powers_of_two() {
        assert_eq!(format_size_tick(8.0), "8");
        assert_eq!(format_size_tick(524288.0), "524288");
        assert_eq!(format_size_tick(100.0), "");
        assert_eq!(format_size_tick(0.0), "");
    }

    #[test]
    fn test_format_value_tick_labels_only_powers_of_ten() {
        assert_eq!(format_value_tick(1e9), "1G");
        assert_eq!(format_value_tick(100.0), "100");
        assert_eq!(format_value_tick(2e9), "");
        assert_eq!(format_value_tick(0.0), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2.5e9), "2.5G");
        assert_eq!(format_value(1.5e3), "1.5k");
        assert_eq!(format_value(1e12), "1T");
        assert_eq!(format_value(100.0), "100");
        assert_eq!(format_value(0.5), "0.5");
    }

    #[test]
    fn test_metric_label() {
        assert_eq!(metric_label("items_per_second"), "Items per second");
        assert_eq!(metric_label("cpu_time"), "Cpu time");
        assert_eq!(metric_label("flops"), "Flops");
    }

    #[test]
    fn test_output_name() {
        assert_eq!(
            output_name("gemm", "items_per_second"),
            "gemm_items_per_second_results.png"
        );
        // counter names may contain characters unfit for file names
        assert_eq!(
            output_name("ddot", "FLOP/s"),
            "ddot_FLOP_s_results.png"
        );
    }

    #[test]
    fn test_series_colors_recycle() {
        assert_eq!(series_color(0), series_color(COLORS.len()));
        assert_ne!(series_color(0), series_color(1));
    }
}
