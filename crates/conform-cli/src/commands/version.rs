//! Version command

use crate::version::VersionInfo;
use anyhow::Result;
use std::io::Write;

pub fn run(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", VersionInfo::current())?;
    out.flush()?;
    Ok(())
}
