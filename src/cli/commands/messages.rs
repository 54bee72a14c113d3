use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::{describe_failure, output_records, output_success};
use crate::cli::OutputFormat;
use crate::content::{ContactInput, ContactMessage};

#[derive(Subcommand)]
pub enum MessageCommands {
    #[command(about = "List contact-form messages, newest first")]
    List,

    #[command(about = "Delete a message")]
    Remove {
        #[arg(help = "Message id")]
        id: String,
    },
}

pub async fn handle(cmd: MessageCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::connect().await?;
    let manager = ctx.manager::<ContactInput>();

    match cmd {
        MessageCommands::List => {
            manager.load().await.map_err(describe_failure)?;
            let records = manager.state().records.unwrap_or_default();
            output_records(&output_format, &records, "No messages", render)
        }
        MessageCommands::Remove { id } => {
            manager.remove(&id).await.map_err(describe_failure)?;
            output_success(&output_format, "message deleted")
        }
    }
}

fn render(message: &ContactMessage) -> String {
    format!(
        "{}  {} <{}>  {}",
        message.id,
        message.name,
        message.email,
        message.created_at.format("%Y-%m-%d %H:%M")
    )
}
