use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;
use std::path::Path;
use studybuddy_config::PathManager;

pub async fn run_clear(all: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        remove_file(&path_manager.credentials_file(), "credentials", output)?;
        remove_file(&path_manager.offline_store_file(), "offline store", output)?;
        remove_file(&path_manager.summary_history_file(), "summary history", output)?;
        output.success("Credentials and local data cleared");
        return Ok(());
    }

    if credentials {
        remove_file(&path_manager.credentials_file(), "credentials", output)?;
        return Ok(());
    }

    output.warn("No clear option specified. Use --credentials or --all");
    output.println("\nExample: studybuddy clear --credentials");
    Ok(())
}

fn remove_file(path: &Path, what: &str, output: &Output) -> Result<()> {
    if !path.exists() {
        output.info(format!("No {} found to clear", what));
        return Ok(());
    }
    fs::remove_file(path).map_err(|e| eyre!("Failed to remove {} at {}: {}", what, path.display(), e))?;
    tracing::info!(operation = "clear", target = what, path = %path.display(), "Removed local file");
    output.success(format!("Cleared {}: {}", what, path.display()));
    Ok(())
}
