use super::prompts;
use super::session::load_config;
use super::ui::Spinner;
use crate::output::{print_section_header, styled_table, Output};
use crate::ConfigCommands;
use chrono::Utc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use serde_json::json;
use std::time::Duration;
use studybuddy_config::{AppwriteConfig, CredentialStore, PathManager};
use studybuddy_store::{AccountProvider, AppwriteCredentials, AppwriteStore, CompanionClient};

/// Appwrite session JWTs are valid for 15 minutes
const JWT_LIFETIME_MINUTES: i64 = 15;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Appwrite {
            endpoint,
            project_id,
            database_id,
            jwt,
        } => configure_appwrite(endpoint, project_id, database_id, jwt, output).await,
        ConfigCommands::Companion { url } => configure_companion(url, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("It is created when you run 'studybuddy config appwrite' or 'studybuddy config companion'.");
        return Ok(());
    }

    let config = load_config(&path_manager)?;
    let credentials_file = path_manager.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let secret = |value: Option<&String>| match value {
        Some(v) if full => v.clone(),
        Some(v) => mask_string(v),
        None => "<not set>".to_string(),
    };
    let auth_mode = match AppwriteCredentials::from_store(&credentials) {
        Ok(AppwriteCredentials::Jwt(_)) => "session JWT",
        Ok(AppwriteCredentials::ApiKey { .. }) => "API key",
        Err(_) => "none",
    };

    output.data(
        "config",
        &json!({
            "config_file": config_file,
            "appwrite": config.appwrite,
            "companion": config.companion,
            "logging": config.logging,
            "auth": auth_mode,
            "credentials": credentials.get_all_keys(),
        }),
    );
    if !output.is_human() {
        return Ok(());
    }

    println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
    println!("{} {}", "║".bright_white(), "StudyBuddy Configuration".bright_cyan().bold());
    println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
    println!();

    let mut files = styled_table(&["File", "Path"]);
    files.add_row(vec![Cell::new("Config"), Cell::new(config_file.display())]);
    files.add_row(vec![Cell::new("Credentials"), Cell::new(credentials_file.display())]);
    files.add_row(vec![Cell::new("Offline store"), Cell::new(path_manager.offline_store_file().display())]);
    output.table(&files);
    println!();

    if let Some(appwrite) = &config.appwrite {
        let mut table = styled_table(&["Appwrite", ""]);
        table.add_row(vec![Cell::new("Endpoint"), Cell::new(&appwrite.endpoint)]);
        table.add_row(vec![Cell::new("Project"), Cell::new(&appwrite.project_id)]);
        table.add_row(vec![Cell::new("Database"), Cell::new(&appwrite.database_id)]);
        table.add_row(vec![Cell::new("Playlists collection"), Cell::new(&appwrite.playlists_collection_id)]);
        table.add_row(vec![Cell::new("Videos collection"), Cell::new(&appwrite.videos_collection_id)]);
        table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", appwrite.timeout_secs))]);
        table.add_row(vec![Cell::new("Auth"), Cell::new(auth_mode)]);
        table.add_row(vec![Cell::new("API key"), Cell::new(secret(credentials.get_appwrite_api_key()))]);
        table.add_row(vec![Cell::new("User id"), Cell::new(secret(credentials.get_user_id()))]);
        table.add_row(vec![Cell::new("Session JWT"), Cell::new(secret(credentials.get_appwrite_jwt()))]);
        if let Some(expires) = credentials.get_appwrite_jwt_expires() {
            let status = if credentials.is_jwt_expired() { "expired".red().to_string() } else { "valid".green().to_string() };
            table.add_row(vec![
                Cell::new("JWT expires"),
                Cell::new(format!("{} ({})", expires.format("%Y-%m-%d %H:%M UTC"), status)),
            ]);
        }
        output.table(&table);
    } else {
        println!("{}", "Appwrite: Not configured (use --offline or run 'studybuddy config appwrite')".bright_black());
    }
    println!();

    let mut companion = styled_table(&["Companion", ""]);
    companion.add_row(vec![Cell::new("Base URL"), Cell::new(&config.companion.base_url)]);
    companion.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.companion.timeout_secs))]);
    output.table(&companion);
    println!();

    let mut logging = styled_table(&["Logging", ""]);
    logging.add_row(vec![Cell::new("Level"), Cell::new(&config.logging.level)]);
    logging.add_row(vec![
        Cell::new("File"),
        Cell::new(config.logging.file.as_ref().map(|f| f.display().to_string()).unwrap_or_else(|| "stderr".to_string())),
    ]);
    output.table(&logging);

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration problem: {}", e));
    }
    Ok(())
}

async fn configure_appwrite(
    endpoint_arg: Option<String>,
    project_arg: Option<String>,
    database_arg: Option<String>,
    use_jwt: bool,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    if !config_file.exists() {
        output.info("Configuration file not found. Creating default configuration...");
    }
    let mut config = load_config(&path_manager)?;
    let existing = config.appwrite.clone();

    print_section_header("Appwrite Setup", output);
    output.println("");
    output.println("Configure the Appwrite document store holding your playlists:");
    print_instruction_list(
        &[
            "Create a project and a database in the Appwrite console",
            "Add the 'playlists' and 'videos' collections (ids can be changed in config.toml)",
            "Create an API key with documents.read and documents.write scopes",
            "Or paste a session JWT from a signed-in client with --jwt",
        ],
        output,
    );
    output.println("");

    let default_endpoint = existing
        .as_ref()
        .map(|a| a.endpoint.clone())
        .unwrap_or_else(|| AppwriteConfig::new(String::new(), String::new()).endpoint);
    let endpoint = match endpoint_arg {
        Some(e) => e,
        None => prompts::prompt_required("Appwrite endpoint", Some(default_endpoint.as_str()), output)?,
    };
    let project_id = match project_arg {
        Some(p) => p,
        None => prompts::prompt_required("Project id", existing.as_ref().map(|a| a.project_id.as_str()), output)?,
    };
    let database_id = match database_arg {
        Some(d) => d,
        None => prompts::prompt_required("Database id", existing.as_ref().map(|a| a.database_id.as_str()), output)?,
    };

    let mut appwrite = existing.unwrap_or_else(|| AppwriteConfig::new(project_id.clone(), database_id.clone()));
    appwrite.endpoint = endpoint.trim().trim_end_matches('/').to_string();
    appwrite.project_id = project_id;
    appwrite.database_id = database_id;

    let credentials_file = path_manager.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let store_credentials = if use_jwt {
        let jwt = read_secret("Session JWT", output)?;
        credentials.set_appwrite_jwt(jwt.clone());
        credentials.set_appwrite_jwt_expires(Utc::now() + chrono::Duration::minutes(JWT_LIFETIME_MINUTES));
        AppwriteCredentials::Jwt(jwt)
    } else {
        let key = read_secret("API key", output)?;
        let user_id = prompts::prompt_required(
            "User id to act for",
            credentials.get_user_id().map(String::as_str),
            output,
        )?;
        credentials.set_appwrite_api_key(key.clone());
        credentials.set_user_id(user_id.clone());
        credentials.clear_appwrite_jwt();
        AppwriteCredentials::ApiKey { key, user_id: Some(user_id) }
    };

    output.println("");
    let spinner = Spinner::start("Verifying credentials...");
    let verified = verify_appwrite(&appwrite, store_credentials).await;
    spinner.finish();
    match verified {
        Ok(Some(user_id)) => output.success(format!("Signed in as {}", user_id)),
        Ok(None) => {
            output.warn("Credentials were not accepted by Appwrite.");
            if !prompts::prompt_yes_no("Save anyway?", Some(false))? {
                return Err(eyre!("Appwrite credential verification failed"));
            }
        }
        Err(e) => output.warn(format!("Could not verify credentials: {}. Continuing anyway...", e)),
    }

    config.appwrite = Some(appwrite);
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.println("");
    output.success("Appwrite configuration saved!");
    output.println(format!("  Config: {}", config_file.display()));
    Ok(())
}

async fn verify_appwrite(appwrite: &AppwriteConfig, credentials: AppwriteCredentials) -> Result<Option<String>> {
    let store = AppwriteStore::new(
        appwrite.endpoint.clone(),
        &appwrite.project_id,
        appwrite.database_id.clone(),
        credentials,
        Duration::from_secs(appwrite.timeout_secs),
    )?;
    Ok(store.current_user_id().await?)
}

fn configure_companion(url_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    let config_file = path_manager.config_file();
    let mut config = load_config(&path_manager)?;

    print_section_header("Companion Backend", output);
    output.println("Serves video summaries, quizzes and the distraction feeds.");
    output.println("");

    let url = match url_arg {
        Some(u) => u,
        None => prompts::prompt_required("Base URL", Some(config.companion.base_url.as_str()), output)?,
    };
    let url = url.trim().trim_end_matches('/').to_string();

    // Same check the client applies when it is built
    CompanionClient::new(url.clone(), Duration::from_secs(config.companion.timeout_secs))?;

    config.companion.base_url = url.clone();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Companion backend set to {}", url));
    Ok(())
}

fn read_secret(label: &str, output: &Output) -> Result<String> {
    loop {
        let value = prompts::prompt_secret(label)?;
        if !value.is_empty() {
            return Ok(value);
        }
        output.error(format!("{} cannot be empty", label));
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    if s.chars().count() <= 4 {
        return "*".repeat(s.chars().count());
    }
    let chars: Vec<char> = s.chars().collect();
    format!(
        "{}***{}",
        chars[..2].iter().collect::<String>(),
        chars[chars.len() - 2..].iter().collect::<String>()
    )
}

/// Print a numbered instruction list
fn print_instruction_list(items: &[&str], output: &Output) {
    for (idx, item) in items.iter().enumerate() {
        output.println(format!("  {}. {}", idx + 1, item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("standard_key_1234"), "st***34");
    }
}
