/**
 * Chat Client Entry Point
 *
 * Terminal client for the conversation store. Clients open their direct
 * conversation, or the one about a listing with `--listing <id>`; admins
 * pass the conversation id to watch as the first argument. Lines read from stdin are sent as messages; `/delete <id>`
 * deletes a message (admins) and `/quit` exits.
 */

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use realty_chat::client::{
    ChatSession, ComposeError, Config, HttpConversationService, NoticeLevel, ViewEvent,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let service = Arc::new(HttpConversationService::new(config.clone()));
    let mut session = ChatSession::new(service, &config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let conversation_id = match args.as_slice() {
        [flag, listing] if flag == "--listing" => {
            session.open_listing(Uuid::parse_str(listing)?).await?
        }
        [id] => {
            let id = Uuid::parse_str(id)?;
            session.mount(id).await;
            id
        }
        _ => session.open_direct().await?,
    };
    println!("Conversation {}", conversation_id);

    let view = session.view().clone();
    let mut events = view.events();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                ViewEvent::MessagesReplaced { .. } => {
                    println!("----");
                    for message in view.messages().await {
                        let read = if message.is_read { "✓" } else { " " };
                        println!(
                            "[{}] {} {} ({}): {}",
                            message.created_at.format("%H:%M:%S"),
                            read,
                            message.sender.name,
                            message.sender.role,
                            message.content
                        );
                    }
                }
                ViewEvent::MessageAppended(message) => println!("> {}", message.content),
                ViewEvent::MessageRemoved { message_id } => println!("(deleted {})", message_id),
                ViewEvent::ConversationsReplaced { count } => {
                    for conversation in view.conversations().await.iter().take(count) {
                        println!(
                            "  {} {} unread={}",
                            conversation.id,
                            conversation.client.name,
                            conversation.admin_unread_count
                        );
                    }
                }
                ViewEvent::Notice(notice) => match notice.level {
                    NoticeLevel::Error => eprintln!("! {}", notice.text),
                    NoticeLevel::Info => println!("i {}", notice.text),
                },
                ViewEvent::TypingChanged(_) | ViewEvent::ConnectivityChanged(_) => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if let Some(id) = line.strip_prefix("/delete ") {
            match Uuid::parse_str(id.trim()) {
                Ok(message_id) => {
                    if let Err(ComposeError::NotPermitted) =
                        session.composer().delete_message(message_id).await
                    {
                        eprintln!("! only admins can delete messages");
                    }
                }
                Err(e) => eprintln!("! invalid message id: {}", e),
            }
            continue;
        }

        session.note_typing().await;
        session.view().set_draft(line).await;
        // Failures are already reported as notices
        let _ = session.composer().submit_draft(conversation_id).await;
    }

    session.unmount().await;
    printer.abort();
    Ok(())
}
