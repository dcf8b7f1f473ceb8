//! Command line entry point for CampQuest.
//! Checks campground availability once, polls until sites open up,
//! or looks up ReserveCalifornia facility ids by name.

use clap::Parser;

mod args;
mod scan_manager;

use args::Args;
use scan_manager::{OutputOptions, ScanManager, list_facilities};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(level));

    if let Some(query) = &args.search {
        list_facilities(query).await?;
        return Ok(());
    }

    let request = args.search_request()?;
    log::debug!("Search request: {:?}", request);

    let manager = ScanManager::new(
        &request,
        args.notify,
        OutputOptions {
            json: args.json_output,
            show_campsite_info: args.show_campsite_info,
        },
    )?;

    if args.poll {
        log::info!(
            "🔁 Polling {} park(s) every {}s",
            request.park_ids.len(),
            args.retry_interval
        );
        manager.run_polling(&request, args.poller_config()).await?;
    } else {
        manager.run_once(&request).await?;
    }

    Ok(())
}
