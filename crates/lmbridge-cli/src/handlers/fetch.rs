use anyhow::{Context, Result};

use crate::bootstrap::CliContext;
use crate::handlers::ctrl_c_token;
use crate::presentation::CliFetchObserver;

/// Make `model` available locally and print the resolved path(s).
pub async fn execute(ctx: &CliContext, model: &str) -> Result<()> {
    let grant = ctx.grant()?;
    let versioned = ctx.codec.encode(model);
    let cancel = ctrl_c_token();
    let observer = CliFetchObserver::new();

    let result = ctx
        .manager
        .fetch_model(&grant, &versioned, &cancel, &observer)
        .await;
    observer.finish();

    let paths = result.with_context(|| format!("Failed to fetch {model}"))?;
    println!("{paths}");
    Ok(())
}
