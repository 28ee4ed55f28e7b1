//! Clean the output directory

use std::fs;

use crate::error::{Error, Result};
use crate::Site;

pub fn run(site: &Site) -> Result<()> {
    if site.output_dir.exists() {
        fs::remove_dir_all(&site.output_dir).map_err(|e| Error::OutputWrite {
            path: site.output_dir.clone(),
            source: e,
        })?;
        tracing::info!("deleted {:?}", site.output_dir);
    }
    Ok(())
}
