use anyhow::Result;
use lmbridge_core::ConfigFiles;

use crate::bootstrap::CliContext;

pub fn execute(ctx: &CliContext) -> Result<()> {
    let grant = ctx.grant()?;
    let files = ConfigFiles::new(grant.root());
    let created = files.ensure()?;

    if created.is_empty() {
        println!("Configuration already present in {}", grant.root().display());
    } else {
        for path in created {
            println!("Created {}", path.display());
        }
    }
    Ok(())
}
