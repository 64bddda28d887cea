//! Unattended runner: one report per team, configured from the environment.

use std::error::Error;

use alertlink::config::Settings;
use alertlink::logging;
use alertlink::unattended;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let settings = Settings::load()?.resolve_unattended(|key| std::env::var(key).ok())?;
    let summary = unattended::run(settings).await?;

    println!("\n🏁 Done: {} report(s) written.", summary.reports.len());
    if !summary.is_complete() {
        return Err(format!(
            "report failed for team(s): {}",
            summary.failed_teams.join(", ")
        )
        .into());
    }
    Ok(())
}
