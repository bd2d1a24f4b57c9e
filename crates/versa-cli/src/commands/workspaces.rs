use anyhow::Result;

use super::context::{Context, failure};

pub async fn list(ctx: &Context) -> Result<()> {
    ctx.signed_in().await?;
    let session = ctx.client.session();
    let active = session.current_workspace_id();

    let workspaces = session
        .list_workspaces()
        .await
        .map_err(|e| failure(e, "Failed to load workspaces"))?;

    for workspace in workspaces {
        let marker = if active.as_deref() == Some(workspace.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}  {}", marker, workspace.id, workspace.name);
    }
    Ok(())
}

pub async fn switch(ctx: &Context, id: &str) -> Result<()> {
    ctx.signed_in().await?;
    let workspace = ctx
        .client
        .session()
        .switch_workspace(id)
        .await
        .map_err(|e| failure(e, "Failed to switch workspace"))?;

    println!("✅ Active workspace: {} ({})", workspace.name, workspace.id);
    Ok(())
}

pub async fn rename(ctx: &Context, name: &str) -> Result<()> {
    ctx.signed_in().await?;
    let workspace = ctx
        .client
        .session()
        .rename_workspace(name)
        .await
        .map_err(|e| failure(e, "Failed to update workspace"))?;

    println!("✅ Workspace renamed to {}", workspace.name);
    Ok(())
}
