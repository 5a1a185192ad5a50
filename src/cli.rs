use camino::Utf8PathBuf;

use clap::{crate_version, value_parser, Arg, ArgAction, Command, ValueHint};

pub fn clap() -> clap::Command {
    fn results() -> Arg {
        Arg::new("results")
            .help("benchmark result files (Google Benchmark JSON format)")
            .value_name("RESULTS")
            .num_args(1..)
            .required(true)
            .value_parser(clap::value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    fn out_dir() -> Arg {
        Arg::new("out-dir")
            .help("directory the charts are written to")
            .short('o')
            .long("out-dir")
            .num_args(1)
            .value_name("DIR")
            .default_value("charts")
            .value_parser(clap::value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::DirPath)
    }

    fn metric() -> Arg {
        Arg::new("metric")
            .help("metric field(s) to chart, one chart per family and metric")
            .short('m')
            .long("metric")
            .env("BENCHPLOT_METRIC")
            .default_value("items_per_second")
            .action(ArgAction::Append)
            .value_delimiter(',')
    }

    fn verbose() -> Arg {
        Arg::new("verbose")
            .help("be verbose (e.g., report every skipped run)")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
    }

    Command::new("benchplot")
        .version(crate_version!())
        .author("Kaspar Schleiser <kaspar@schleiser.de>")
        .about("Compare benchmark results, fast")
        .infer_subcommands(true)
        .arg(
            Arg::new("chdir")
                .short('C')
                .long("chdir")
                .help("change working directory before doing anything else")
                .global(true)
                .required(false)
                .value_parser(clap::value_parser!(Utf8PathBuf))
                .value_hint(ValueHint::DirPath)
                .num_args(1),
        )
        .subcommand(
            Command::new("plot")
                .about("render one comparison chart per benchmark family")
                .arg(results())
                .next_help_heading("Chart options")
                .arg(out_dir())
                .arg(
                    Arg::new("linear-y")
                        .short('l')
                        .long("linear-y")
                        .help("use a linear value axis instead of log scale")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("export-data")
                        .short('e')
                        .long("export-data")
                        .help("also write the grouped chart data as JSON")
                        .num_args(1)
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(Utf8PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .next_help_heading("What to chart")
                .arg(metric())
                .next_help_heading("Input checking")
                .arg(
                    Arg::new("strict")
                        .short('s')
                        .long("strict")
                        .env("BENCHPLOT_STRICT")
                        .help("fail when a benchmark name does not parse, instead of skipping it")
                        .action(ArgAction::SetTrue),
                )
                .arg(verbose()),
        )
        .subcommand(
            Command::new("list")
                .about("list benchmark families, libraries and sizes found in result files")
                .arg(results())
                .arg(verbose()),
        )
        .subcommand(
            Command::new("completion")
                .about("Generate benchplot shell completions.")
                .arg(
                    Arg::new("generator")
                        .help("shell to generate completions for")
                        .long("generate")
                        .value_parser(value_parser!(clap_complete::Shell)),
                )
                .hide(true),
        )
        .subcommand(
            Command::new("manpages")
                .about("Generate benchplot manpages.")
                .arg(
                    Arg::new("outdir")
                        .help("directory in which to create manpage files")
                        .value_parser(value_parser!(Utf8PathBuf))
                        .value_hint(ValueHint::DirPath)
                        .required(true),
                )
                .hide(true),
        )
}
