//! pdfoutline CLI - document outline extraction tool

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::{
    extract_files, BatchSummary, ClassifierConfig, HeadingLevel, JsonFormat, OutlineExtractor,
    OutlineOptions, OutlineResult, Stage, to_text,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract document titles and H1-H3 outlines from text span dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one span dump as JSON
    Extract {
        /// Input span dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long, conflicts_with = "text")]
        compact: bool,

        /// Output an indented plain-text tree instead of JSON
        #[arg(long)]
        text: bool,

        /// Classifier configuration (JSON)
        #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
        config: Option<PathBuf>,

        /// Per-document time budget in milliseconds
        #[arg(long, value_name = "MS")]
        time_budget: Option<u64>,
    },

    /// Extract outlines of several span dumps into a directory
    Batch {
        /// Input span dumps (JSON)
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory; one <name>.json per input
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Classifier configuration (JSON)
        #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
        config: Option<PathBuf>,

        /// Per-document time budget in milliseconds
        #[arg(long, value_name = "MS")]
        time_budget: Option<u64>,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Show the outline as a tree with extraction statistics
    Show {
        /// Input span dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Classifier configuration (JSON)
        #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the default classifier configuration as JSON
    Config,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            compact,
            text,
            config,
            time_budget,
        }) => cmd_extract(
            &input,
            output.as_deref(),
            compact,
            text,
            config.as_deref(),
            time_budget,
        ),
        Some(Commands::Batch {
            inputs,
            output,
            compact,
            config,
            time_budget,
            sequential,
        }) => cmd_batch(
            &inputs,
            &output,
            compact,
            config.as_deref(),
            time_budget,
            sequential,
        ),
        Some(Commands::Show { input, config }) => cmd_show(&input, config.as_deref()),
        Some(Commands::Config) => cmd_config(),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pdfoutline <COMMAND> <FILE>".yellow());
            println!("       pdfoutline --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_extractor(
    config: Option<&Path>,
    time_budget: Option<u64>,
    sequential: bool,
) -> Result<OutlineExtractor, Box<dyn std::error::Error>> {
    let classifier = match config {
        Some(path) => {
            log::info!("Loading classifier configuration from {}", path.display());
            ClassifierConfig::from_json_file(path)?
        }
        None => ClassifierConfig::default(),
    };

    let mut options = OutlineOptions::new()
        .with_classifier(classifier)
        .with_parallel(!sequential);
    if let Some(ms) = time_budget {
        options = options.with_time_budget(Duration::from_millis(ms));
    }

    Ok(OutlineExtractor::new(options)?)
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn report_failure(result: &OutlineResult) {
    if let Some(ref reason) = result.failure {
        eprintln!(
            "{} {}: {}",
            "Warning:".yellow().bold(),
            result.identifier,
            reason
        );
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    text: bool,
    config: Option<&Path>,
    time_budget: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(config, time_budget, true)?;
    let result = extractor.extract_file(input);
    report_failure(&result);

    let rendered = if text {
        to_text(&result.outline)
    } else {
        pdfoutline::to_json(&result.outline, json_format(compact))?
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    compact: bool,
    config: Option<&Path>,
    time_budget: Option<u64>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(config, time_budget, sequential)?;
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results = extract_files(inputs, &extractor, |path, _| {
        pb.set_message(path.display().to_string());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let format = json_format(compact);
    let mut used = HashSet::new();
    println!("\n{}", "Output files:".green().bold());
    for (i, result) in results.iter().enumerate() {
        report_failure(result);

        let name = output_name(&result.identifier, &mut used);
        if name != format!("{}.json", result.identifier) {
            eprintln!(
                "{} {} already written, saving {} as {}",
                "Warning:".yellow().bold(),
                format!("{}.json", result.identifier),
                inputs[i].display(),
                name
            );
        }
        let json = pdfoutline::to_json(&result.outline, format)?;
        fs::write(output_dir.join(&name), &json)?;

        let branch = if i + 1 == results.len() { "└─" } else { "├─" };
        let status = if result.is_failed() {
            "fallback".yellow()
        } else {
            format!("{} headings", result.outline.len()).normal()
        };
        println!("  {} {} ({})", branch.dimmed(), name, status);
    }

    let summary = BatchSummary::from_results(&results);
    println!();
    println!(
        "{} {} documents, {} succeeded, {} failed",
        "Summary:".cyan().bold(),
        summary.total,
        summary.succeeded,
        summary.failed
    );

    Ok(())
}

/// Output file name for a document, suffixed when an earlier input took the name.
fn output_name(identifier: &str, used: &mut HashSet<String>) -> String {
    let mut name = format!("{}.json", identifier);
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = format!("{}-{}.json", identifier, n);
        n += 1;
    }
    name
}

fn cmd_show(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(config, None, true)?;
    let result = extractor.extract_file(input);
    report_failure(&result);

    let outline = &result.outline;
    let title = if outline.title.is_empty() {
        "(untitled)"
    } else {
        outline.title.as_str()
    };
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for heading in &outline.outline {
        let indent = "  ".repeat(heading.level.rank());
        let label = match heading.level {
            HeadingLevel::H1 => heading.level.as_str().green().bold(),
            HeadingLevel::H2 => heading.level.as_str().blue(),
            HeadingLevel::H3 => heading.level.as_str().dimmed(),
        };
        println!(
            "{}{} {} {}",
            indent,
            label,
            heading.text,
            format!("p.{}", heading.page).dimmed()
        );
    }

    let stats = &result.stats;
    println!();
    println!("{}", "Extraction Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {}",
        "Stage".bold(),
        if result.stage == Stage::Built {
            "built".green()
        } else {
            "failed".red()
        }
    );
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Spans".bold(), stats.span_count);
    println!("{}: {}", "Candidates".bold(), stats.candidate_count);
    println!("{}: {}", "Duplicates dropped".bold(), stats.duplicates_dropped);
    println!(
        "{}: {} (H1 {}, H2 {}, H3 {})",
        "Headings".bold(),
        stats.heading_count(),
        stats.h1_count,
        stats.h2_count,
        stats.h3_count
    );
    println!("{}: {} ms", "Elapsed".bold(), stats.elapsed_ms);

    Ok(())
}

fn cmd_config() -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&ClassifierConfig::default())?;
    println!("{}", json);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document outline extraction tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/pdfoutline".dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_suffixes_collisions() {
        let mut used = HashSet::new();
        assert_eq!(output_name("report", &mut used), "report.json");
        assert_eq!(output_name("minutes", &mut used), "minutes.json");
        assert_eq!(output_name("report", &mut used), "report-2.json");
        assert_eq!(output_name("report", &mut used), "report-3.json");
    }

    #[test]
    fn test_output_name_skips_taken_suffix() {
        let mut used = HashSet::new();
        assert_eq!(output_name("report-2", &mut used), "report-2.json");
        assert_eq!(output_name("report", &mut used), "report.json");
        assert_eq!(output_name("report", &mut used), "report-3.json");
    }
}
