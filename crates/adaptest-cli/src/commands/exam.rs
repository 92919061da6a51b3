//! The `adaptest exam` command.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use adaptest_core::catalog;
use adaptest_core::model::{option_letter, DifficultyTier, Question, SessionConfig, SourceMode};
use adaptest_core::parser::load_bank;
use adaptest_core::report::SessionReport;
use adaptest_core::session::ExamSession;
use adaptest_core::source::{build_source, QuestionBank};
use adaptest_core::statistics::{ReviewFilter, PASS_TARGET};
use adaptest_providers::{generative_source, load_config_from};
use adaptest_report::{format_elapsed, write_html_report};
use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};

#[derive(Args)]
pub struct ExamArgs {
    /// Question source: offline, online, hybrid
    #[arg(long, default_value = "hybrid")]
    mode: SourceMode,

    /// Domains to cover, e.g. "1,3,5" or "all"
    #[arg(long, default_value = "all")]
    domains: String,

    /// Number of questions
    #[arg(long, default_value_t = 25)]
    count: u32,

    /// Starting difficulty: easy, medium, hard
    #[arg(long, default_value = "medium")]
    start: DifficultyTier,

    /// Countdown in minutes (no timer when omitted)
    #[arg(long)]
    timer_minutes: Option<u64>,

    /// Question bank file or directory (overrides the config)
    #[arg(long)]
    bank: Option<PathBuf>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the session report (overrides the config)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Report format: json, html, all
    #[arg(long, default_value = "json")]
    format: String,

    /// Print a review after the summary: all, correct, incorrect
    #[arg(long)]
    review: Option<ReviewFilter>,
}

pub async fn execute(args: ExamArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let bank = match args.bank.as_ref().or(config.bank.as_ref()) {
        Some(path) => {
            let load = load_bank(path)?;
            if !load.rejected.is_empty() {
                eprintln!(
                    "Skipped {} unusable record(s) in {} (run `adaptest validate` for details)",
                    load.rejected.len(),
                    path.display()
                );
            }
            load.into_bank()
        }
        None => QuestionBank::default(),
    };
    tracing::info!(records = bank.len(), mode = %args.mode, "question bank ready");

    let generative = match args.mode {
        SourceMode::Offline => None,
        SourceMode::Online => Some(generative_source(&config)?),
        SourceMode::Hybrid => match generative_source(&config) {
            Ok(source) => Some(source),
            Err(e) if bank.is_empty() => {
                return Err(anyhow::Error::new(e)
                    .context("hybrid mode has an empty question bank and no usable provider"));
            }
            Err(e) => {
                tracing::warn!("serving from the bank only: {e}");
                None
            }
        },
    };
    let source = build_source(args.mode, Arc::new(bank), generative)?;

    let domains = catalog::parse_domain_list(&args.domains).map_err(anyhow::Error::msg)?;
    let session_config = SessionConfig {
        domains,
        question_count: args.count,
        starting_tier: args.start,
        timer_secs: args.timer_minutes.map(|m| m * 60),
        mode: args.mode,
    };
    let mut session = ExamSession::new(session_config)?;

    println!(
        "Starting {} question exam ({} mode, {} domain(s)). Answer with A-D, f to flag, q to finish.\n",
        session.config().question_count,
        session.config().mode,
        session.config().domains.len()
    );

    let mut lines = std::io::stdin().lock().lines();

    'session: loop {
        let fetched = session
            .next_question(source.as_ref())
            .await
            .map(|q| q.cloned());
        let question = match fetched {
            Ok(Some(q)) => q,
            Ok(None) => break,
            Err(e) if session.answered() == 0 => return Err(e.into()),
            Err(e) => {
                eprintln!("Could not fetch the next question: {e:#}");
                eprintln!("Ending the session early.");
                session.finish();
                break;
            }
        };
        let index = session.questions().len() - 1;
        print_question(&session, index, &question);

        loop {
            print!("Your answer [A-D, f, q]: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                println!();
                session.finish();
                break 'session;
            };

            match line.trim().to_ascii_uppercase().as_str() {
                "Q" => {
                    session.finish();
                    break 'session;
                }
                "F" => {
                    let flagged = session.toggle_flag(index).unwrap_or(false);
                    println!("{}", if flagged { "Flagged." } else { "Flag removed." });
                }
                choice @ ("A" | "B" | "C" | "D") => {
                    let option = usize::from(choice.as_bytes()[0] - b'A');
                    let outcome = session.answer(option)?;
                    if outcome.correct {
                        println!("Correct!");
                    } else {
                        println!(
                            "Incorrect. The answer is {}.",
                            option_letter(outcome.correct_index as usize)
                        );
                    }
                    println!("{}", question.explanation);
                    println!(
                        "θ = {:+.2} ({}), next question: {}\n",
                        outcome.theta,
                        outcome.ability_label,
                        outcome.next_tier.label()
                    );
                    break;
                }
                _ => println!("Please answer A, B, C or D (f to flag, q to finish)."),
            }
        }
    }

    let report = session.report();
    print_summary(&report);

    if let Some(filter) = args.review {
        print_review(&report, filter);
    }

    let output = args.output.unwrap_or(config.output_dir);
    save_report(&report, &output, &args.format)?;

    Ok(())
}

fn print_question(session: &ExamSession, index: usize, question: &Question) {
    let short = catalog::domain(question.domain_id)
        .map(|d| d.short)
        .unwrap_or("?");
    let mut header = format!(
        "Question {}/{} | D{} {} | {} | θ {:+.2}",
        index + 1,
        session.config().question_count,
        question.domain_id,
        short,
        question.tier.label(),
        session.estimator().theta()
    );
    if let Some(remaining) = session.remaining(Instant::now()) {
        header.push_str(&format!(" | {} left", format_elapsed(remaining.as_secs())));
    }

    println!("{header}");
    println!("Topic: {}\n", question.topic);
    println!("{}\n", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", option_letter(i));
    }
    println!();
}

fn print_summary(report: &SessionReport) {
    let summary = &report.summary;
    let ended = report
        .termination
        .map(|t| t.to_string())
        .unwrap_or_else(|| "in progress".into());

    println!(
        "\nSession ended ({ended}) after {}",
        format_elapsed(report.elapsed_secs)
    );
    println!(
        "Score: {}% ({}/{})",
        summary.percent, summary.correct, summary.total
    );
    println!(
        "Ability: {} (θ {:+.2})",
        summary.ability_label, summary.theta
    );
    println!(
        "Pass probability: {}% ({})",
        summary.pass_probability,
        if summary.on_track {
            "on track".to_string()
        } else {
            format!("below the {PASS_TARGET}% target")
        }
    );

    let mut tiers = Table::new();
    tiers.set_header(vec!["Difficulty", "Correct", "Total", "Accuracy"]);
    for (tier, tally) in &summary.by_tier {
        tiers.add_row(vec![
            Cell::new(tier.label()),
            Cell::new(tally.correct),
            Cell::new(tally.total),
            Cell::new(format!("{}%", tally.percent())),
        ]);
    }
    println!("\n{tiers}");

    let mut domains = Table::new();
    domains.set_header(vec!["Domain", "Correct", "Total", "Accuracy"]);
    for (id, tally) in &summary.by_domain {
        let name = catalog::domain(*id).map(|d| d.name).unwrap_or("unknown");
        domains.add_row(vec![
            Cell::new(format!("D{id} {name}")),
            Cell::new(tally.correct),
            Cell::new(tally.total),
            Cell::new(format!("{}%", tally.percent())),
        ]);
    }
    println!("\n{domains}");

    let flagged: Vec<String> = report
        .items
        .iter()
        .filter(|item| item.flagged)
        .map(|item| item.number.to_string())
        .collect();
    if !flagged.is_empty() {
        println!("\nFlagged for review: {}", flagged.join(", "));
    }
}

fn print_review(report: &SessionReport, filter: ReviewFilter) {
    println!("\nReview ({filter}):");
    let mut shown = 0;
    for item in report.review(filter) {
        shown += 1;
        let mark = if item.correct == Some(true) { "✓" } else { "✗" };
        println!("\n{mark} {}. {}", item.number, item.question.prompt);
        if let Some(selected) = item.selected {
            println!(
                "  Your answer: {} | Correct answer: {}",
                option_letter(selected),
                item.question.correct_letter()
            );
        }
        println!("  {}", item.question.explanation);
    }
    if shown == 0 {
        println!("  Nothing to review.");
    }
}

fn save_report(report: &SessionReport, output: &Path, format: &str) -> Result<()> {
    std::fs::create_dir_all(output)?;
    let stem = report.file_stem();

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }
    Ok(())
}
