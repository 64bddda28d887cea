use std::error::Error;

use alertlink::auth::token_store;
use alertlink::config::Settings;
use alertlink::github::GitHubClient;
use alertlink::interactive;
use alertlink::logging;
use alertlink::pipeline::AlertReporter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();

    // ==============================
    // 🚪 LOGOUT MODE
    // ==============================
    if args.get(1).map(String::as_str) == Some("logout") {
        token_store::delete_token()?;
        println!("✅ Removed stored GitHub token");
        return Ok(());
    }

    let settings = Settings::load()?;
    let token = interactive::resolve_token(&settings)?;
    let client = GitHubClient::new(&settings, &token)?;

    let default_org = settings
        .organization
        .clone()
        .unwrap_or_else(|| settings.default_organization.clone());
    let org = interactive::prompt_organization(&default_org)?;

    let reporter = AlertReporter::new(client, settings);

    let teams = reporter.list_teams(&org).await;
    if teams.is_empty() {
        println!("No teams found or access denied. Please check your token permissions.");
        return Ok(());
    }

    let selection = interactive::select_teams(&teams)?;
    reporter.run(&org, &selection).await?;

    Ok(())
}
