//! `scholarview cache` - report the backend's cache state

use anyhow::Result;

use scholarview_client::{AcquisitionController, Transport};

use super::styled_table;

pub async fn run<T: Transport>(ctl: &AcquisitionController<T>) -> Result<()> {
    let status = ctl.cache_status().await?;

    let mut table = styled_table(&["Cache", "Value"]);
    table.add_row(vec!["Present", if status.has_cache { "yes" } else { "no" }]);
    table.add_row(vec!["Fresh", if status.is_fresh { "yes" } else { "no" }]);
    table.add_row(vec![
        "Last updated".to_string(),
        status
            .last_updated
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string()),
    ]);

    println!("{table}");
    Ok(())
}
