use anyhow::Result;
use versa_core::conversation::{Conversation, ConversationPatch};

use super::context::{Context, failure};

fn print_conversation(conversation: &Conversation) {
    println!(
        "{}  {}  (assistant {}, updated {})",
        conversation.id,
        conversation.title,
        conversation.assistant_id,
        conversation.updated_at.format("%Y-%m-%d %H:%M")
    );
}

pub async fn list(ctx: &Context) -> Result<()> {
    ctx.signed_in().await?;
    let conversations = ctx.client.workspace().conversations().await;

    if conversations.is_empty() {
        println!("No conversations yet.");
    }
    for conversation in &conversations {
        print_conversation(conversation);
    }
    Ok(())
}

pub async fn create(ctx: &Context, assistant_id: &str, title: Option<&str>) -> Result<()> {
    ctx.signed_in().await?;
    let conversation = ctx
        .client
        .workspace()
        .create_conversation(assistant_id, title)
        .await
        .map_err(|e| failure(e, "Failed to create conversation"))?;

    println!("✅ Created conversation");
    print_conversation(&conversation);
    Ok(())
}

pub async fn rename(ctx: &Context, id: &str, title: &str) -> Result<()> {
    ctx.signed_in().await?;
    let conversation = ctx
        .client
        .workspace()
        .update_conversation(id, ConversationPatch::title(title))
        .await
        .map_err(|e| failure(e, "Failed to update conversation"))?;

    println!("✅ Renamed conversation");
    print_conversation(&conversation);
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str) -> Result<()> {
    ctx.signed_in().await?;
    ctx.client
        .conversations()
        .delete_conversation(id)
        .await
        .map_err(|e| failure(e, "Failed to delete conversation"))?;

    println!("✅ Deleted conversation {}", id);
    Ok(())
}
