//! The `skillbridge chat` commands.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use chrono::DateTime;

use skillbridge_core::community::ChatMessage;

use super::Context;
use crate::ChatCommand;

pub async fn execute(ctx: &Context, command: ChatCommand) -> Result<()> {
    let (service, config) = ctx.service()?;

    match command {
        ChatCommand::Show { request, watch } => {
            let mut seen = HashSet::new();
            let messages = service.chat_messages(&request).await?;
            if messages.is_empty() && !watch {
                println!("No messages yet.");
            }
            print_new(&messages, &mut seen);

            if watch {
                let every = Duration::from_secs(config.chat_poll_secs.max(1));
                eprintln!("Watching {request} every {}s (Ctrl-C to stop)", every.as_secs());
                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => break,
                        _ = tokio::time::sleep(every) => {
                            let messages = service.chat_messages(&request).await?;
                            print_new(&messages, &mut seen);
                        }
                    }
                }
            }
        }
        ChatCommand::Send { request, text } => {
            service.send_chat_message(&request, &text).await?;
            println!("Sent.");
        }
    }
    Ok(())
}

fn print_new(messages: &[ChatMessage], seen: &mut HashSet<String>) {
    for m in messages {
        if seen.insert(m.id.clone()) {
            println!("{} {}: {}", timestamp(m), m.sender(), m.text);
        }
    }
}

fn timestamp(message: &ChatMessage) -> String {
    message
        .created_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.format("[%m-%d %H:%M]").to_string())
        .unwrap_or_default()
}
