use anyhow::Result;
use versa_core::assistant::{Assistant, AssistantPatch, NewAssistant};

use super::context::{Context, failure};

fn print_assistant(assistant: &Assistant) {
    println!(
        "{}  {} [{}] model={} uses={}",
        assistant.id,
        assistant.name,
        assistant.assistant_type,
        assistant.model,
        assistant.usage_count
    );
}

pub async fn list(ctx: &Context) -> Result<()> {
    ctx.signed_in().await?;
    let assistants = ctx.client.workspace().assistants().await;

    if assistants.is_empty() {
        println!("No assistants yet. Create one with `versa assistants create --name <NAME>`.");
    }
    for assistant in &assistants {
        print_assistant(assistant);
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: &str) -> Result<()> {
    ctx.signed_in().await?;
    let assistant = ctx
        .client
        .workspace()
        .fetch_assistant(id)
        .await
        .map_err(|e| failure(e, "Failed to load assistant"))?;

    print_assistant(&assistant);
    if let Some(description) = &assistant.description {
        println!("  {}", description);
    }
    println!("  System prompt: {}", assistant.system_prompt);
    Ok(())
}

pub async fn create(ctx: &Context, data: NewAssistant) -> Result<()> {
    ctx.signed_in().await?;
    let assistant = ctx
        .client
        .workspace()
        .create_assistant(data)
        .await
        .map_err(|e| failure(e, "Failed to create assistant"))?;

    println!("✅ Created assistant");
    print_assistant(&assistant);
    Ok(())
}

pub async fn update(ctx: &Context, id: &str, patch: AssistantPatch) -> Result<()> {
    ctx.signed_in().await?;
    let assistant = ctx
        .client
        .workspace()
        .update_assistant(id, patch)
        .await
        .map_err(|e| failure(e, "Failed to update assistant"))?;

    println!("✅ Updated assistant");
    print_assistant(&assistant);
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str) -> Result<()> {
    ctx.signed_in().await?;
    ctx.client
        .workspace()
        .delete_assistant(id)
        .await
        .map_err(|e| failure(e, "Failed to delete assistant"))?;

    println!("✅ Deleted assistant {}", id);
    Ok(())
}
