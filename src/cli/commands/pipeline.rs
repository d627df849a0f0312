//! Pipeline stage commands.

use console::style;

use super::helpers::{cancel_on_ctrl_c, open_db, report_stage_error};
use crate::config::Config;
use crate::ingest::StageSummary;
use crate::pipeline::Pipeline;
use crate::recommend::{BatchSummary, ProcessOutcome};

async fn build(config: Config) -> anyhow::Result<Pipeline> {
    let db = open_db(&config).await?;
    Ok(Pipeline::from_config(config, db))
}

fn print_detail(label: &str, summary: &StageSummary) {
    println!(
        "  {:<20} {} saved, {} skipped, {} denylisted, {} failed",
        label,
        style(summary.saved).green(),
        summary.skipped,
        summary.denylisted,
        summary.failed
    );
}

fn print_batch(summary: &BatchSummary) {
    println!(
        "  {:<20} {} completed, {} skipped, {} failed",
        "Recommendations",
        style(summary.completed).green(),
        summary.skipped,
        summary.failed
    );
}

/// Run every stage.
pub async fn cmd_run(config: Config) -> anyhow::Result<()> {
    let pipeline = build(config).await?;
    let cancel = cancel_on_ctrl_c();

    let summary = match pipeline.run(&cancel).await {
        Ok(summary) => summary,
        Err(e) => {
            report_stage_error("Run", &e);
            return Err(e.into());
        }
    };

    println!("{}", style("Run summary").bold());
    println!("  {:<20} {}", "Hotels fetched", style(summary.hotels_fetched).green());
    print_detail("Search data", &summary.search);
    print_detail("Ratings data", &summary.ratings);
    print_batch(&summary.recommendations);
    for (city, reason) in &summary.failed_cities {
        println!("  {} catalog for {} abandoned: {}", style("✗").red(), city, reason);
    }
    for (stage, reason) in &summary.failed_stages {
        println!("  {} {} aborted: {}", style("✗").red(), stage, reason);
    }
    Ok(())
}

/// Fetch the catalog.
pub async fn cmd_catalog(mut config: Config, cities: Vec<String>) -> anyhow::Result<()> {
    if !cities.is_empty() {
        config.city_codes = cities;
    }
    let pipeline = build(config).await?;
    let cancel = cancel_on_ctrl_c();

    match pipeline.run_catalog(&cancel).await {
        Ok(run) => {
            println!(
                "{} Fetched {} hotels for {}",
                style("✓").green(),
                run.fetched,
                pipeline.config().city_codes.join(", ")
            );
            for (city, reason) in &run.failed_cities {
                println!("  {} {} abandoned: {}", style("✗").red(), city, reason);
            }
            Ok(())
        }
        Err(e) => {
            report_stage_error("Catalog", &e);
            Err(e.into())
        }
    }
}

/// Fetch search and/or ratings detail.
pub async fn cmd_details(config: Config, search: bool, ratings: bool) -> anyhow::Result<()> {
    let pipeline = build(config).await?;
    let cancel = cancel_on_ctrl_c();

    if search {
        match pipeline.run_search(&cancel).await {
            Ok(summary) => print_detail("Search data", &summary),
            Err(e) => {
                report_stage_error("Search detail", &e);
                return Err(e.into());
            }
        }
    }
    if ratings {
        match pipeline.run_ratings(&cancel).await {
            Ok(summary) => print_detail("Ratings data", &summary),
            Err(e) => {
                report_stage_error("Ratings detail", &e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Produce verdicts for one hotel or all.
pub async fn cmd_recommend(config: Config, hotel: Option<String>) -> anyhow::Result<()> {
    let pipeline = build(config).await?;
    let cancel = cancel_on_ctrl_c();
    let orchestrator = pipeline.orchestrator();

    let Some(hotel_id) = hotel else {
        return match orchestrator.process_all(&cancel).await {
            Ok(summary) => {
                print_batch(&summary);
                Ok(())
            }
            Err(e) => {
                report_stage_error("Recommendations", &e);
                Err(e.into())
            }
        };
    };

    match orchestrator.process_hotel(&cancel, &hotel_id).await {
        Ok(ProcessOutcome::Completed { recommended }) => {
            let verdict = if recommended {
                style("RECOMMENDED").green()
            } else {
                style("NOT RECOMMENDED").yellow()
            };
            println!("{} {}: {}", style("✓").green(), hotel_id, verdict);
            Ok(())
        }
        Ok(ProcessOutcome::Skipped(reason)) => {
            println!("{} {} skipped: {}", style("!").yellow(), hotel_id, reason);
            Ok(())
        }
        Err(e) => {
            report_stage_error(&hotel_id, &e);
            Err(e.into())
        }
    }
}
