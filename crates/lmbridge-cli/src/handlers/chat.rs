use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use futures_util::StreamExt;
use lmbridge_core::{ChatMessage, ChatRequest};
use lmbridge_runtime::{DylibEngine, LocalChatService};

use crate::bootstrap::CliContext;
use crate::commands::ChatArgs;
use crate::handlers::ctrl_c_token;
use crate::presentation::CliFetchObserver;

fn build_request(args: &ChatArgs) -> ChatRequest {
    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.push(ChatMessage::user(args.prompt.clone()));

    let mut request = ChatRequest::new(args.model.clone(), messages);
    request.max_tokens = args.max_tokens;
    request.top_p = args.top_p;
    request.presence_penalty = args.presence_penalty;
    request.frequency_penalty = args.frequency_penalty;
    request
}

/// Run one chat exchange and print the answer.
pub async fn execute(ctx: &CliContext, args: &ChatArgs) -> Result<()> {
    let engine = DylibEngine::load(&args.engine_lib)?;
    let service = LocalChatService::new(
        Arc::clone(&ctx.gate),
        Arc::clone(&ctx.manager),
        Arc::new(engine),
        &args.lib_dir,
    )
    .with_codec(ctx.codec.clone());

    let request = build_request(args);
    let cancel = ctrl_c_token();
    let observer = CliFetchObserver::new();

    if args.no_stream {
        let completion = service.chat(&request, &cancel, &observer).await;
        observer.finish();
        match completion?.first_content() {
            Some(content) => println!("{content}"),
            None => eprintln!("(empty response)"),
        }
        return Ok(());
    }

    let mut stream = std::pin::pin!(service.chat_stream(request, cancel, &observer));
    let mut stdout = std::io::stdout();
    let mut started = false;
    while let Some(chunk) = stream.next().await {
        if !started {
            observer.finish();
            started = true;
        }
        write!(stdout, "{}", chunk?.text())?;
        stdout.flush()?;
    }
    observer.finish();
    writeln!(stdout)?;
    Ok(())
}
