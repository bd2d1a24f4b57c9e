use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use versa_core::assistant::AssistantType;

mod commands;

use commands::context::Context;

#[derive(Parser)]
#[command(name = "versa")]
#[command(about = "VERSA CLI - sign in, manage assistants and chat with them", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config and VERSA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is reachable
    Health,
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to "<name>'s Workspace"
        #[arg(long)]
        workspace_name: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session after verifying it
    Status,
    /// Show the effective configuration
    Config,
    /// Manage workspaces
    Workspaces {
        #[command(subcommand)]
        action: WorkspaceAction,
    },
    /// Manage assistants
    Assistants {
        #[command(subcommand)]
        action: AssistantAction,
    },
    /// Manage conversations
    Conversations {
        #[command(subcommand)]
        action: ConversationAction,
    },
    /// Read and send messages
    Messages {
        #[command(subcommand)]
        action: MessageAction,
    },
}

#[derive(Subcommand)]
enum WorkspaceAction {
    List,
    /// Make another workspace the active one
    Switch { id: String },
    /// Rename the active workspace
    Rename { name: String },
}

#[derive(Subcommand)]
enum AssistantAction {
    List,
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        assistant_type: Option<AssistantType>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum ConversationAction {
    List,
    Create {
        #[arg(long)]
        assistant: String,
        #[arg(long)]
        title: Option<String>,
    },
    Rename {
        id: String,
        title: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum MessageAction {
    /// Show a conversation's history (most recent conversation if omitted)
    List { conversation: Option<String> },
    Send {
        conversation: String,
        content: String,
    },
    Delete {
        conversation: String,
        message: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let ctx = Context::build(cli.api_url)?;

    match cli.command {
        Commands::Health => commands::auth::health(&ctx).await?,
        Commands::Login { email, password } => commands::auth::login(&ctx, &email, &password).await?,
        Commands::Register {
            name,
            email,
            password,
            workspace_name,
        } => commands::auth::register(&ctx, name, email, password, workspace_name).await?,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Status => commands::auth::status(&ctx).await?,
        Commands::Config => commands::auth::show_config(&ctx),
        Commands::Workspaces { action } => match action {
            WorkspaceAction::List => commands::workspaces::list(&ctx).await?,
            WorkspaceAction::Switch { id } => commands::workspaces::switch(&ctx, &id).await?,
            WorkspaceAction::Rename { name } => commands::workspaces::rename(&ctx, &name).await?,
        },
        Commands::Assistants { action } => match action {
            AssistantAction::List => commands::assistants::list(&ctx).await?,
            AssistantAction::Show { id } => commands::assistants::show(&ctx, &id).await?,
            AssistantAction::Create {
                name,
                assistant_type,
                model,
                system_prompt,
                description,
            } => {
                let mut data = versa_core::assistant::NewAssistant::new(name);
                data.assistant_type = assistant_type;
                data.model = model;
                data.system_prompt = system_prompt;
                data.description = description;
                commands::assistants::create(&ctx, data).await?
            }
            AssistantAction::Update {
                id,
                name,
                model,
                system_prompt,
                description,
            } => {
                let patch = versa_core::assistant::AssistantPatch {
                    name,
                    model,
                    system_prompt,
                    description,
                    ..Default::default()
                };
                commands::assistants::update(&ctx, &id, patch).await?
            }
            AssistantAction::Delete { id } => commands::assistants::delete(&ctx, &id).await?,
        },
        Commands::Conversations { action } => match action {
            ConversationAction::List => commands::conversations::list(&ctx).await?,
            ConversationAction::Create { assistant, title } => {
                commands::conversations::create(&ctx, &assistant, title.as_deref()).await?
            }
            ConversationAction::Rename { id, title } => {
                commands::conversations::rename(&ctx, &id, &title).await?
            }
            ConversationAction::Delete { id } => commands::conversations::delete(&ctx, &id).await?,
        },
        Commands::Messages { action } => match action {
            MessageAction::List { conversation } => {
                commands::messages::list(&ctx, conversation.as_deref()).await?
            }
            MessageAction::Send {
                conversation,
                content,
            } => commands::messages::send(&ctx, &conversation, &content).await?,
            MessageAction::Delete {
                conversation,
                message,
            } => commands::messages::delete(&ctx, &conversation, &message).await?,
        },
    }

    Ok(())
}
