use super::models::StoreState;
use crate::error::CalendarResult;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load a snapshot, `None` when the file does not exist yet
pub async fn load(path: &Path) -> CalendarResult<Option<StoreState>> {
    if !fs::try_exists(path).await? {
        info!("No calendar snapshot at {}, starting fresh", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;
    let state: StoreState = serde_json::from_str(&content)?;
    info!(
        "Loaded {} calendars and {} events from {}",
        state.calendars.len(),
        state.events.len(),
        path.display()
    );

    Ok(Some(state))
}

/// Write the snapshot through a temporary file so readers never see half of it
pub async fn save(path: &Path, state: &StoreState) -> CalendarResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(state)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).await?;
    fs::rename(&tmp_path, path).await?;

    debug!("Wrote calendar snapshot to {}", path.display());
    Ok(())
}
