use anyhow::Result;
use lmbridge_core::domain::split_components;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Validate every component of `model` against the manifest.
pub fn execute(ctx: &CliContext, model: &str) -> Result<()> {
    let grant = ctx.grant()?;
    let versioned = ctx.codec.encode(model);

    let mut invalid = 0;
    for component in split_components(&versioned) {
        match ctx.manager.validate_local_report(&grant, component) {
            Ok(resolved) => println!("{component}: ok ({})", resolved.path.display()),
            Err(err) => {
                println!("{component}: {err}");
                invalid += 1;
            }
        }
    }
    if invalid > 0 {
        return Err(CliError::Invalid { count: invalid }.into());
    }
    Ok(())
}
