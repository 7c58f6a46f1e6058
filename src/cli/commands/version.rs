//! Version command implementation

use crate::cli::error::CliResult;
use clap::Args;

/// Display SlideKit version
#[derive(Debug, Args)]
pub struct VersionArgs {}

pub async fn execute_version(_args: VersionArgs) -> CliResult<()> {
    println!("slidekit {}", slidekit::VERSION);
    if cfg!(feature = "s3") {
        println!("  storage backends: s3, memory");
    } else {
        println!("  storage backends: memory");
    }
    Ok(())
}
