use anyhow::Result;
use lmbridge_core::domain::split_components;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print the local directory of every component of `model`.
pub fn execute(ctx: &CliContext, model: &str) -> Result<()> {
    let grant = ctx.grant()?;
    let versioned = ctx.codec.encode(model);

    let mut missing = None;
    for component in split_components(&versioned) {
        match ctx.manager.find_local(&grant, component) {
            Some(path) => println!("{}", path.display()),
            None => {
                eprintln!("{component}: not found");
                missing.get_or_insert_with(|| component.to_string());
            }
        }
    }
    match missing {
        Some(component) => Err(CliError::NotFound(component).into()),
        None => Ok(()),
    }
}
