use std::env;

use anyhow::{Context, Result};

use registrar::{archival, config::AppConfig, db};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("archive-completed") => archive_completed()?,
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\nUsage: maintenance archive-completed");
            std::process::exit(1);
        }
        None => {
            eprintln!("Usage: maintenance archive-completed");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Periodic cleanup: moves every completed document request into the
/// archived view. Safe to run from cron; repeated runs archive nothing new.
fn archive_completed() -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "maintenance",
        database_url = %config.redacted_database_url(),
        pool_size = 1,
        "loaded registrar configuration"
    );
    let pool = db::init_pool_with_size(&config.database_url, 1)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    let archived = archival::bulk_archive_completed_requests(&mut conn, "maintenance")
        .context("failed to bulk-archive completed requests")?;

    if archived == 0 {
        println!("No completed requests to archive.");
    } else {
        println!("Archived {archived} completed requests.");
    }

    Ok(())
}
