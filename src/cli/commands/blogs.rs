use clap::{Args, Subcommand};

use crate::cli::context::CliContext;
use crate::cli::utils::{describe_failure, output_records, output_success};
use crate::cli::OutputFormat;
use crate::content::{BlogInput, BlogPost};

#[derive(Subcommand)]
pub enum BlogCommands {
    #[command(about = "List all blog posts, newest first")]
    List,

    #[command(about = "Publish a new blog post")]
    Add {
        #[command(flatten)]
        form: BlogFormArgs,
    },

    #[command(about = "Replace a blog post's fields")]
    Edit {
        #[arg(help = "Post id")]
        id: String,
        #[command(flatten)]
        form: BlogFormArgs,
    },

    #[command(about = "Delete a blog post")]
    Remove {
        #[arg(help = "Post id")]
        id: String,
    },
}

#[derive(Args)]
pub struct BlogFormArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub excerpt: String,
    #[arg(long)]
    pub content: String,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "")]
    pub image_url: String,
}

impl From<BlogFormArgs> for BlogInput {
    fn from(args: BlogFormArgs) -> Self {
        BlogInput {
            title: args.title,
            excerpt: args.excerpt,
            content: args.content,
            category: args.category,
            image_url: args.image_url,
        }
    }
}

pub async fn handle(cmd: BlogCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::connect().await?;
    let manager = ctx.manager::<BlogInput>();

    match cmd {
        BlogCommands::List => {
            manager.load().await.map_err(describe_failure)?;
            let records = manager.state().records.unwrap_or_default();
            output_records(&output_format, &records, "No blog posts found", render)
        }
        BlogCommands::Add { form } => {
            manager
                .submit_new(&form.into())
                .await
                .map_err(describe_failure)?;
            output_success(&output_format, "blog post published")
        }
        BlogCommands::Edit { id, form } => {
            manager
                .submit_edit(&id, &form.into())
                .await
                .map_err(describe_failure)?;
            output_success(&output_format, "blog post updated")
        }
        BlogCommands::Remove { id } => {
            manager.remove(&id).await.map_err(describe_failure)?;
            output_success(&output_format, "blog post deleted")
        }
    }
}

fn render(post: &BlogPost) -> String {
    format!("{}  {}  ({})", post.id, post.title, post.category)
}
