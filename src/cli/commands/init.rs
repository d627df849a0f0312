//! Initialize command.

use console::style;

use super::helpers::open_db;
use crate::config::Config;

/// Create the database and its tables.
pub async fn cmd_init(config: &Config) -> anyhow::Result<()> {
    let ctx = open_db(config).await?;
    let tables = ctx.list_tables().await?;

    for table in &tables {
        println!("  {} {}", style("✓").green(), table);
    }
    println!(
        "{} Initialized database at {}",
        style("✓").green(),
        config.database_path().display()
    );

    if config.upstream.credentials().is_none() {
        println!(
            "{} No provider credentials; set AMD and AMS before fetching",
            style("!").yellow()
        );
    }
    Ok(())
}
