use std::error::Error;

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

use crate::auth::token_store;
use crate::config::{Settings, TOKEN_ENV};
use crate::github::Team;
use crate::pipeline::TeamSelection;

pub fn prompt_organization(default: &str) -> Result<String, dialoguer::Error> {
    let org: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your organization name")
        .default(default.to_string())
        .interact_text()?;

    let org = org.trim();
    if org.is_empty() {
        return Ok(default.to_string());
    }
    Ok(org.to_string())
}

/// Map a menu index to a selection: one entry per team, then "All Teams".
pub fn selection_from_choice(teams: &[Team], choice: usize) -> Option<TeamSelection> {
    if choice == teams.len() {
        Some(TeamSelection::All(teams.to_vec()))
    } else {
        teams.get(choice).cloned().map(TeamSelection::Single)
    }
}

pub fn select_teams(teams: &[Team]) -> Result<TeamSelection, dialoguer::Error> {
    let mut items: Vec<String> = teams.iter().map(|t| t.name.clone()).collect();
    items.push("All Teams".to_string());

    println!("\n👥 Teams in your organization:");
    loop {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select the team to process")
            .items(&items)
            .default(0)
            .interact()?;

        match selection_from_choice(teams, choice) {
            Some(TeamSelection::All(all)) => {
                println!("You chose to process all teams.");
                return Ok(TeamSelection::All(all));
            }
            Some(TeamSelection::Single(team)) => {
                println!("You chose to process team: {}", team.name.bold());
                return Ok(TeamSelection::Single(team));
            }
            None => println!("⚠️  Invalid choice, try again."),
        }
    }
}

/// Configured token, then `GH_TOKEN`, then the keyring, then ask and remember.
pub fn resolve_token(settings: &Settings) -> Result<String, Box<dyn Error>> {
    if let Some(token) = settings.token.as_deref().filter(|t| !t.trim().is_empty()) {
        return Ok(token.to_string());
    }

    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            println!("🔑 Using token from {}", TOKEN_ENV);
            return Ok(token);
        }
    }

    match token_store::load_token() {
        Ok(Some(token)) => {
            println!("🔑 Using stored GitHub token");
            return Ok(token);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("{}", e),
    }

    println!("🔐 No stored token found.");
    let token: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("GitHub personal access token")
        .interact()?;

    match token_store::save_token(&token) {
        Ok(()) => println!("✅ Token saved securely!"),
        Err(e) => tracing::warn!("Token not saved: {}", e),
    }

    Ok(token)
}
