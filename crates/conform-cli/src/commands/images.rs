//! List-images command - print every test image reference

use crate::images::{self, RegistryList};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Print one image reference per line, in catalogue order
pub fn run(repo_list: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let registries = RegistryList::load_or_default(repo_list)?;

    let mut buffer = String::new();
    for image in images::catalogue(&registries) {
        buffer.push_str(&image.e2e_image());
        buffer.push('\n');
    }

    out.write_all(buffer.as_bytes())?;
    out.flush()?;
    Ok(())
}
