use anyhow::Result;
use versa_application::{LOGIN_FALLBACK, REGISTER_FALLBACK};
use versa_core::auth::RegisterRequest;

use super::context::{Context, failure};

pub async fn health(ctx: &Context) -> Result<()> {
    let status = ctx
        .client
        .session()
        .health()
        .await
        .map_err(|e| failure(e, "Health check failed"))?;

    if status.is_healthy() {
        println!("✅ {} is healthy", ctx.config.base_url);
    } else {
        println!("⚠️  {} reported status '{}'", ctx.config.base_url, status.status);
    }
    Ok(())
}

pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let session = ctx.client.session();
    let user = session
        .login(email, password)
        .await
        .map_err(|e| failure(e, LOGIN_FALLBACK))?;

    println!("✅ Signed in as {} <{}>", user.name, user.email);
    if let Some(workspace) = session.current_workspace() {
        println!("   Workspace: {} ({})", workspace.name, workspace.id);
    }
    Ok(())
}

pub async fn register(
    ctx: &Context,
    name: String,
    email: String,
    password: String,
    workspace_name: Option<String>,
) -> Result<()> {
    let workspace_name =
        workspace_name.unwrap_or_else(|| RegisterRequest::default_workspace_name(&name));
    let request = RegisterRequest::new(name, email, password).with_workspace_name(workspace_name);

    let session = ctx.client.session();
    let user = session
        .register(request)
        .await
        .map_err(|e| failure(e, REGISTER_FALLBACK))?;

    println!("✅ Registered and signed in as {}", user.name);
    if let Some(workspace) = session.current_workspace() {
        println!("   Workspace: {} ({})", workspace.name, workspace.id);
    }
    Ok(())
}

pub fn logout(ctx: &Context) {
    ctx.client.session().logout();
    println!("Signed out");
}

pub async fn status(ctx: &Context) -> Result<()> {
    let state = ctx.client.start().await;
    let snapshot = ctx.client.session().snapshot();

    println!("State: {:?}", state);
    if let Some(user) = snapshot.user {
        println!("User: {} <{}> ({})", user.name, user.email, user.id);
    }
    if let Some(workspace) = snapshot.workspace {
        println!("Workspace: {} ({})", workspace.name, workspace.id);
    }
    Ok(())
}

pub fn show_config(ctx: &Context) {
    println!("API base URL:    {}", ctx.config.base_url);
    println!("Request timeout: {}s", ctx.config.request_timeout_secs);
    println!("Session file:    {}", ctx.session_file.display());
}
