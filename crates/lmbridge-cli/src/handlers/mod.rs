//! Command handlers.
//!
//! Each handler is `execute(ctx, ...) -> anyhow::Result<()>`: parse input,
//! call into the library crates, print the outcome.

pub mod chat;
pub mod check;
pub mod fetch;
pub mod find;
pub mod init;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Token cancelled on Ctrl-C.
pub(crate) fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            child.cancel();
        }
    });
    token
}
