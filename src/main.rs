use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use upi_pulse::{
    boundary::BoundarySet,
    cli::{BuildOptions, Cli, Commands},
    config::Settings,
    corpus::WalkPolicy,
    dataset::RunSummary,
    download::ensure_corpus_downloaded,
    model::{AggregateRow, TransactionRecord},
    pipeline::ExtractionJob,
    query::{BoundaryJoin, SeriesLine, Session},
    ui::{LogUi, Ui, UiApp},
};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("upi_pulse=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Where the corpus of a build comes from
enum Source {
    Local(PathBuf),
    Remote {
        cache_dir: Option<PathBuf>,
        force: bool,
    },
}

fn run_build(
    source: Source,
    output: &Path,
    opts: &BuildOptions,
    settings: &Settings,
    ui: &mut impl Ui,
) -> Result<RunSummary> {
    // Load boundaries first so a bad file fails before the long walk
    let boundaries = opts
        .boundaries
        .as_deref()
        .map(|path| BoundarySet::load(path, &settings.boundary_name_property))
        .transpose()?;

    let corpus_dir = match source {
        Source::Local(dir) => dir,
        Source::Remote { cache_dir, force } => {
            let cache_dir = cache_dir.or_else(|| settings.cache_dir.clone());
            ensure_corpus_downloaded(cache_dir, force, ui)?.0
        }
    };

    let mut job = ExtractionJob::new(corpus_dir, output);
    job.policy = if opts.strict {
        WalkPolicy::Strict
    } else {
        settings.walk_policy
    };
    job.boundaries = boundaries;
    job.canonicalizer = settings.canonicalizer();

    job.run(ui)
}

/// Run a build with either the full-screen display or plain logging
fn build_command(
    source: Source,
    output: &Path,
    opts: &BuildOptions,
    settings: &Settings,
) -> Result<()> {
    let start = Instant::now();

    if opts.tui {
        let mut ui = UiApp::new()?;
        match run_build(source, output, opts, settings, &mut ui) {
            Ok(summary) => {
                let text = format!(
                    "Created {:?} in {:.1}s\n{}",
                    output,
                    start.elapsed().as_secs_f64(),
                    summary
                );
                ui.finish(&text)?;
                println!("{}", text);
            }
            Err(e) => {
                ui.restore()?;
                return Err(e);
            }
        }
    } else {
        let mut ui = LogUi::new();
        let summary = run_build(source, output, opts, settings, &mut ui)?;
        println!(
            "\nCreated {:?} in {:.1}s\n{}",
            output,
            start.elapsed().as_secs_f64(),
            summary
        );
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rows(rows: &[&TransactionRecord]) {
    println!(
        "{:<40} {:>6} {:>7} {:<28} {:>14} {:>20}",
        "State", "Year", "Quarter", "Transaction_type", "Count", "Amount"
    );
    for r in rows {
        println!(
            "{:<40} {:>6} {:>7} {:<28} {:>14} {:>20.2}",
            r.region, r.year, r.quarter, r.category, r.count, r.amount
        );
    }
}

fn print_aggregates(rows: &[AggregateRow]) {
    println!("{:<40} {:>14} {:>22}", "State", "Count", "Amount");
    for row in rows {
        println!(
            "{:<40} {:>14} {:>22.2}",
            row.key.region(),
            row.count,
            row.amount
        );
    }
}

fn print_series(lines: &[SeriesLine]) {
    for line in lines {
        println!("{}", line.region);
        for point in &line.points {
            println!("  {}  {:>22.2}", point.period, point.value);
        }
    }
}

fn print_join(join: &BoundaryJoin) {
    println!("{} by state, {}", join.metric, join.period);
    println!(
        "{:<40} {:<40} {:>22}",
        "State",
        "Boundary",
        join.metric.to_string()
    );
    for region in &join.matched {
        println!(
            "{:<40} {:<40} {:>22.2}",
            region.region, region.boundary_name, region.value
        );
    }
    if !join.unmatched.is_empty() {
        println!("\nNot on map: {}", join.unmatched.join(", "));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // The full-screen display owns the terminal, so it runs without a subscriber
    if !cli.command.uses_tui() {
        init_tracing();
    }

    let settings = Settings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync {
            output,
            force,
            cache_dir,
            build,
        } => {
            build_command(
                Source::Remote { cache_dir, force },
                &output,
                &build,
                &settings,
            )?;
        }

        Commands::Fetch { cache_dir, force } => {
            let cache_dir = cache_dir.or_else(|| settings.cache_dir.clone());
            let (path, sha) = ensure_corpus_downloaded(cache_dir, force, &mut LogUi::new())?;
            println!("Pulse snapshot {} unpacked to {:?}", sha, path);
        }

        Commands::Build {
            corpus_dir,
            output,
            build,
        } => {
            build_command(Source::Local(corpus_dir), &output, &build, &settings)?;
        }

        Commands::Overview { table } => {
            let session = Session::open(&table, None, &settings)?;
            let ds = session.dataset();

            if cli.json {
                print_json(&json!({
                    "total_count": ds.total_count(),
                    "total_amount": ds.total_amount(),
                    "years": ds.years(),
                    "quarters": ds.quarters(),
                    "categories": ds.categories(),
                    "regions": ds.regions(),
                }))?;
            } else {
                println!("Total transactions: {}", ds.total_count());
                println!("Total amount:       {:.2}", ds.total_amount());
                println!("Years:      {:?}", ds.years());
                println!("Quarters:   {:?}", ds.quarters());
                println!("Categories: {}", ds.categories().join(", "));
                println!("Regions:    {}", ds.regions().len());
            }
        }

        Commands::Filter {
            table,
            year,
            quarter,
            category,
        } => {
            let session = Session::open(&table, None, &settings)?;
            let rows = session.dataset().filter(year, quarter, &category);
            if cli.json {
                print_json(&rows)?;
            } else {
                print_rows(&rows);
            }
        }

        Commands::ByRegion {
            table,
            year,
            quarter,
            metric,
        } => {
            let session = Session::open(&table, None, &settings)?;
            let rows = session.dataset().group_sum_by_region(year, quarter, metric);
            if cli.json {
                print_json(&rows)?;
            } else {
                print_aggregates(&rows);
            }
        }

        Commands::Series {
            table,
            regions,
            metric,
        } => {
            let session = Session::open(&table, None, &settings)?;
            let wanted: Vec<&str> = regions.iter().map(|r| r.trim()).collect();
            let lines = session.dataset().time_series(&wanted, metric);
            if cli.json {
                print_json(&lines)?;
            } else {
                print_series(&lines);
            }
        }

        Commands::Map {
            table,
            boundaries,
            year,
            quarter,
            metric,
        } => {
            let session = Session::open(&table, Some(boundaries.as_path()), &settings)?;
            let join = session.choropleth(year, quarter, metric);
            if cli.json {
                print_json(&join)?;
            } else {
                print_join(&join);
            }
        }

        Commands::Unmatched { table, boundaries } => {
            let session = Session::open(&table, Some(boundaries.as_path()), &settings)?;
            let unmatched = session.unmatched_regions();
            if cli.json {
                print_json(&unmatched)?;
            } else if unmatched.is_empty() {
                println!("Every region resolved to a boundary feature");
            } else {
                for region in &unmatched {
                    println!("{}", region);
                }
            }
        }
    }

    Ok(())
}
