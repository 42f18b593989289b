//! aemsync — push content changes from a local jcr_root tree to package managers.
//!
//! # Usage
//!
//! ```text
//! aemsync <path> [--targets URL[,URL...]] [--interval MS] [--upload-timeout SECS]
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::watch::WatchArgs;

#[derive(Parser, Debug)]
#[command(
    name = "aemsync",
    version,
    about = "Watch a content tree and install changes on remote package managers",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    watch: WatchArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.watch.run()
}
