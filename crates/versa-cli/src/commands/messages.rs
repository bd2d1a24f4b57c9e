use anyhow::Result;
use versa_application::SelectionOutcome;
use versa_core::conversation::Message;

use super::context::{Context, failure};

fn print_message(message: &Message) {
    println!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M:%S"),
        message.role,
        message.content
    );
}

pub async fn list(ctx: &Context, conversation_id: Option<&str>) -> Result<()> {
    ctx.signed_in().await?;
    let sync = ctx.client.conversations();

    let outcome = sync
        .select_conversation(conversation_id)
        .await
        .map_err(|e| failure(e, "Failed to load messages"))?;
    if outcome == SelectionOutcome::NothingToSelect {
        println!("No conversations yet.");
        return Ok(());
    }

    for message in sync.messages().await {
        print_message(&message);
    }
    Ok(())
}

pub async fn send(ctx: &Context, conversation_id: &str, content: &str) -> Result<()> {
    ctx.signed_in().await?;
    let exchange = ctx
        .client
        .conversations()
        .send_message(conversation_id, content)
        .await
        .map_err(|e| failure(e, "Failed to send message"))?;

    for message in exchange.into_messages() {
        print_message(&message);
    }
    Ok(())
}

pub async fn delete(ctx: &Context, conversation_id: &str, message_id: &str) -> Result<()> {
    ctx.signed_in().await?;
    ctx.client
        .conversations()
        .delete_message(conversation_id, message_id)
        .await
        .map_err(|e| failure(e, "Failed to delete message"))?;

    println!("✅ Deleted message {}", message_id);
    Ok(())
}
