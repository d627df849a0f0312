//! Hotel inspection and override commands.

use console::style;

use super::helpers::open_db;
use crate::config::Config;
use crate::models::RatingSource;

/// Set or clear a hotel's admin flag.
pub async fn cmd_admin_flag(config: &Config, hotel_id: &str, disabled: bool) -> anyhow::Result<()> {
    let ctx = open_db(config).await?;
    if !ctx.hotels().update_admin_flag(hotel_id, disabled).await? {
        anyhow::bail!("Hotel {} not found", hotel_id);
    }

    if disabled {
        println!(
            "{} {} excluded from automated recommendations",
            style("✓").green(),
            hotel_id
        );
    } else {
        println!(
            "{} {} included in automated recommendations",
            style("✓").green(),
            hotel_id
        );
    }
    Ok(())
}

/// Print a hotel, its ratings and latest verdict.
pub async fn cmd_show(config: &Config, hotel_id: &str, with_reviews: bool) -> anyhow::Result<()> {
    let ctx = open_db(config).await?;
    let Some(hotel) = ctx.hotels().get(hotel_id).await? else {
        anyhow::bail!("Hotel {} not found", hotel_id);
    };

    println!("{} {}", style(&hotel.name).bold(), style(&hotel.hotel_id).dim());
    if let Some(address) = &hotel.street_address {
        println!("  {}", address);
    }
    let place: Vec<&str> = [hotel.city.as_deref(), hotel.country.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        println!("  {}", place.join(", "));
    }

    for source in RatingSource::ALL {
        if let Some(rating) = hotel.rating(source) {
            println!("  {:<12} {}", source.as_str(), rating);
        }
    }

    if hotel.admin_flag {
        println!("  {} admin flag set", style("!").yellow());
    }
    if ctx.hotels().is_invalid_for_search(hotel_id).await? {
        println!("  {} on search denylist", style("!").yellow());
    }

    match ctx.recommendations().get(hotel_id).await? {
        Some(rec) => {
            let label = if rec.overall_recommended {
                style("RECOMMENDED").green()
            } else {
                style("NOT RECOMMENDED").yellow()
            };
            println!("  Verdict: {} ({} reviews, {})", label, rec.reviews_analyzed, rec.llm_model);
            if let Some(summary) = &rec.recommendation_summary {
                println!("  {}", summary);
            }
            println!("  Processed {}", rec.processed_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => println!("  {}", style("Not yet analyzed").dim()),
    }

    let reviews = ctx.reviews().get_for_hotel(hotel_id).await?;
    println!("  {} stored reviews", reviews.len());
    if with_reviews {
        for review in &reviews {
            let rating = review
                .rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".to_string());
            let date = review
                .review_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!(
                "    [{}] {} {} {}",
                review.source,
                rating,
                date,
                review.review_text.trim()
            );
        }
    }
    Ok(())
}

/// List the search denylist.
pub async fn cmd_invalid_ids(config: &Config) -> anyhow::Result<()> {
    let ctx = open_db(config).await?;
    let ids = ctx.hotels().list_invalid_for_search().await?;

    if ids.is_empty() {
        println!("{} No denylisted hotel IDs", style("✓").green());
        return Ok(());
    }
    for id in &ids {
        println!("  {}", id);
    }
    println!("{} denylisted", ids.len());
    Ok(())
}
