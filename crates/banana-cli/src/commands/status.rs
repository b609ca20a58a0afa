//! Status command handler

use anyhow::Result;

use banana_core::{Config, SessionHandle};

use crate::output::{Output, OutputFormat};

/// Show status information
pub async fn show(handle: &SessionHandle, config: &Config, output: &Output) -> Result<()> {
    let stats = handle.stats().await?;
    let notes = handle.notes().await?.len();
    let images = handle.images().await?.len();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "store_path": config.store_path(),
                    "export_mode": config.export_mode.as_str(),
                    "storage": {
                        "store_exists": stats.store_exists,
                        "store_size": stats.store_size,
                        "store_modified": stats.store_modified,
                        "backup_exists": stats.backup_exists,
                        "backup_size": stats.backup_size,
                        "total_size": stats.total_size()
                    },
                    "counts": {
                        "notes": notes,
                        "images": images
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.store_path().display());
        }
        OutputFormat::Human => {
            println!("Banana Book Status");
            println!("==================");
            println!();
            println!("Storage:");
            println!("  Store:    {}", config.store_path().display());
            println!("  Size:     {}", stats.total_size_human());
            if let Some(modified) = stats.store_modified {
                println!("  Modified: {}", modified.format("%Y-%m-%d %H:%M"));
            }
            if stats.backup_exists {
                println!("  Backup:   {}", config.backup_path().display());
            }
            println!("  Export:   {}", config.export_mode.as_str());
            println!();
            println!("Contents:");
            println!("  Notes:  {}", notes);
            println!("  Images: {}", images);
        }
    }

    Ok(())
}
