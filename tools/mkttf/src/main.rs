//! Converts a set of BDF files into a TrueType font and a FontForge font source.

use anyhow::Result;
use engine::{fontforge::FontForgeEngine, memory::MemoryEngine};
use mkttf::{cli, convert::convert};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli::get_config();
    if config.dry_run {
        let conversion = convert(MemoryEngine::new(config.engine.clone()), &config)?;
        println!(
            "Dry run: nothing was written; would have generated \"{}\" and \"{}\"",
            conversion.ttf_path.display(),
            conversion.sfd_path.display()
        );
    } else {
        let conversion = convert(FontForgeEngine::new(config.engine.clone()), &config)?;
        tracing::info!(basename = %conversion.basename, "conversion finished");
    }

    Ok(())
}
