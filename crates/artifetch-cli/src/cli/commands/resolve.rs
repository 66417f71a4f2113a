//! Resolve command: print the source descriptor for a locator.

use anyhow::Result;
use artifetch_core::resolve;

pub fn run_resolve(source: &str) -> Result<()> {
    let descriptor = resolve(source)?;
    println!("{}", descriptor);
    Ok(())
}
