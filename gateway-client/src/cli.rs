//! Command-line surface over the gateway client.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gateway_client::{
    FilePayload, GatewayClient, Ingest, Ingested, ResourceFamily, Resources, Result, SessionState,
};

#[derive(Debug, Parser)]
#[command(name = "sourcechat", version, about = "Chat with your documents, videos and webpages")]
pub struct Cli {
    /// Backend base URL (overrides configuration)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        email: String,
        #[arg(long, env = "SOURCECHAT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log into it
    Register {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "SOURCECHAT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show whether a session is stored
    Status,
    /// List ingested sources of one family (document, youtube, webpage)
    List { family: ResourceFamily },
    /// Upload a PDF document
    Upload { path: PathBuf },
    /// Process a YouTube video or webpage by URL
    Process { family: ResourceFamily, url: String },
    /// Delete a source
    Delete { family: ResourceFamily, id: i64 },
    /// Ask a question about a source
    Chat {
        /// Source type: document, pdf, youtube, webpage or web
        source_type: String,
        id: i64,
        question: String,
    },
    /// Show previous questions and answers for a source
    History { source_type: String, id: i64 },
}

pub async fn run(client: &GatewayClient, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            client.login(&email, &password).await?;
            println!("Logged in as {}", email);
        }
        Command::Register {
            email,
            name,
            password,
        } => {
            client.register_and_login(&email, &password, &name).await?;
            println!("Account created, logged in as {}", email);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
        Command::Status => match client.session_state().await {
            SessionState::Authenticated => println!("Logged in ({})", client.base_url()),
            SessionState::Unauthenticated => println!("Not logged in"),
        },
        Command::List { family } => print_resources(&client.list_resources(family).await?),
        Command::Upload { path } => {
            let file = FilePayload::from_path(&path).await?;
            let ingested = client
                .upload_resource(ResourceFamily::Document, Ingest::File(file))
                .await?;
            print_ingested(&ingested);
        }
        Command::Process { family, url } => {
            let ingested = client.upload_resource(family, Ingest::Url(url)).await?;
            print_ingested(&ingested);
        }
        Command::Delete { family, id } => {
            client.delete_resource(family, id).await?;
            println!("Deleted {} {}", family, id);
        }
        Command::Chat {
            source_type,
            id,
            question,
        } => {
            let answer = client.chat(id, &source_type, &question).await?;
            println!("{}", answer.answer);
        }
        Command::History { source_type, id } => {
            let history = client.get_history(id, &source_type).await?;
            if history.is_empty() {
                println!("No conversation yet");
            }
            for entry in history {
                println!("[{}]", entry.timestamp.format("%Y-%m-%d %H:%M"));
                println!("Q: {}", entry.question);
                println!("A: {}\n", entry.answer);
            }
        }
    }
    Ok(())
}

fn print_resources(resources: &Resources) {
    if resources.is_empty() {
        println!("Nothing here yet");
        return;
    }
    match resources {
        Resources::Documents(docs) => {
            for doc in docs {
                println!(
                    "{:>5}  {:<10}  {}",
                    doc.id,
                    doc.status,
                    doc.upload_date.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Resources::Sources(sources) => {
            for source in sources {
                println!(
                    "{:>5}  {}  {}",
                    source.id,
                    source.title.as_deref().unwrap_or("(untitled)"),
                    source.url
                );
            }
        }
    }
}

fn print_ingested(ingested: &Ingested) {
    match ingested {
        Ingested::Document(doc) => println!("Uploaded document {} ({})", doc.id, doc.status),
        Ingested::Source(source) => println!(
            "Processed {} {}: {}",
            source.source_type,
            source.id,
            source.title.as_deref().unwrap_or(&source.url)
        ),
    }
}
