#[macro_use]
extern crate anyhow;
extern crate clap;

#[macro_use]
extern crate derive_builder;

#[macro_use]
extern crate serde_derive;

use std::env;

use anyhow::{Context as _, Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use itertools::{Itertools, MinMaxResult};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod chart;
mod cli;
mod data;
mod group;
mod name;
mod pipeline;

use chart::YScale;
use group::Grouped;
use pipeline::PlotterBuilder;

fn main() {
    let result = try_main();
    match result {
        Err(e) => {
            eprintln!("benchplot: error: {e:#}");
            std::process::exit(1);
        }
        Ok(code) => std::process::exit(code),
    };
}

fn try_main() -> Result<i32> {
    let matches = cli::clap().get_matches();

    // handle completion/manpages subcommands here, so the result file
    // handling is skipped
    match matches.subcommand() {
        Some(("completion", matches)) => {
            fn print_completions<G: clap_complete::Generator>(gen: G, cmd: &mut clap::Command) {
                clap_complete::generate(
                    gen,
                    cmd,
                    cmd.get_name().to_string(),
                    &mut std::io::stdout(),
                );
            }
            if let Some(generator) = matches
                .get_one::<clap_complete::Shell>("generator")
                .copied()
            {
                let mut cmd = cli::clap();
                eprintln!("Generating completion file for {}...", generator);
                print_completions(generator, &mut cmd);
            }
            return Ok(0);
        }
        Some(("manpages", matches)) => {
            fn create_manpage(cmd: clap::Command, outfile: &Utf8Path) -> Result<(), Error> {
                let man = clap_mangen::Man::new(cmd);
                let mut buffer: Vec<u8> = Default::default();
                man.render(&mut buffer)?;

                std::fs::write(outfile, buffer)?;
                Ok(())
            }
            let mut outpath: Utf8PathBuf =
                matches.get_one::<Utf8PathBuf>("outdir").unwrap().clone();
            let cmd = cli::clap();

            outpath.push("benchplot.1");
            create_manpage(cmd.clone(), &outpath)?;

            for subcommand in cmd.get_subcommands() {
                if subcommand.is_hide_set() {
                    continue;
                }
                let name = subcommand.get_name();
                outpath.pop();
                outpath.push(format!("benchplot-{name}.1"));
                create_manpage(subcommand.clone(), &outpath)?;
            }

            return Ok(0);
        }
        _ => (),
    }

    if let Some(dir) = matches.get_one::<Utf8PathBuf>("chdir") {
        env::set_current_dir(dir).context(format!("cannot change to directory \"{dir}\""))?;
    }

    match matches.subcommand() {
        Some(("plot", plot_matches)) => {
            let results = get_results(plot_matches);
            let out_dir = plot_matches
                .get_one::<Utf8PathBuf>("out-dir")
                .unwrap()
                .clone();
            let metrics: Vec<String> = plot_matches
                .get_many::<String>("metric")
                .unwrap()
                .cloned()
                .collect();
            let y_scale = match plot_matches.get_flag("linear-y") {
                true => YScale::Linear,
                false => YScale::Log,
            };
            let verbose = plot_matches.get_count("verbose");

            println!(
                "benchplot: charting {} from {} result file(s)",
                metrics.iter().join(", "),
                results.len(),
            );

            let plotter = PlotterBuilder::default()
                .inputs(results)
                .out_dir(out_dir)
                .metrics(metrics)
                .y_scale(y_scale)
                .strict(plot_matches.get_flag("strict"))
                .verbose(verbose > 0)
                .export_data(plot_matches.get_one::<Utf8PathBuf>("export-data").cloned())
                .build()
                .unwrap();

            let summary = plotter.execute()?;

            println!(
                "benchplot: {} runs in, {} skipped, {} chart(s) written",
                summary.runs,
                summary.skipped,
                summary.charts.len(),
            );
        }
        Some(("list", list_matches)) => {
            let results = get_results(list_matches);
            let verbose = list_matches.get_count("verbose");

            let runs = data::load(&results)?;
            let (grouped, skipped) = Grouped::from_runs(runs);

            for (family, runs) in &grouped.families {
                println!("{family}");

                let mut sizes_by_library: IndexMap<&str, Vec<u64>> = IndexMap::new();
                for parsed in runs {
                    sizes_by_library
                        .entry(parsed.name.library.as_str())
                        .or_default()
                        .push(parsed.name.size);
                }

                for (library, sizes) in &sizes_by_library {
                    let (min, max) = match sizes.iter().minmax() {
                        MinMaxResult::NoElements => continue,
                        MinMaxResult::OneElement(size) => (size, size),
                        MinMaxResult::MinMax(min, max) => (min, max),
                    };
                    println!("  {library}: {} runs, sizes {min}..{max}", sizes.len());
                }
            }

            if !skipped.is_empty() {
                println!(
                    "benchplot: {} benchmark name(s) did not parse",
                    skipped.len()
                );
                if verbose > 0 {
                    for skip in &skipped {
                        println!("benchplot: \"{}\": {}", skip.name, skip.error);
                    }
                }
            }
        }
        _ => {}
    };

    Ok(0)
}

fn get_results(matches: &clap::ArgMatches) -> Vec<Utf8PathBuf> {
    matches
        .get_many::<Utf8PathBuf>("results")
        .unwrap()
        .cloned()
        .collect()
}
