use clap::{Args, Subcommand};

use crate::cli::context::CliContext;
use crate::cli::utils::{describe_failure, output_records, output_success};
use crate::cli::OutputFormat;
use crate::content::{Project, ProjectInput};
use crate::validate::RawTags;

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List all projects, newest first")]
    List,

    #[command(about = "Add a new project")]
    Add {
        #[command(flatten)]
        form: ProjectFormArgs,
    },

    #[command(about = "Replace a project's fields")]
    Edit {
        #[arg(help = "Project id")]
        id: String,
        #[command(flatten)]
        form: ProjectFormArgs,
    },

    #[command(about = "Delete a project")]
    Remove {
        #[arg(help = "Project id")]
        id: String,
    },
}

#[derive(Args)]
pub struct ProjectFormArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value = "")]
    pub image_url: String,
    #[arg(long, default_value = "", help = "Comma-separated technology tags")]
    pub technologies: String,
    #[arg(long, default_value = "")]
    pub github_url: String,
    #[arg(long, default_value = "")]
    pub live_url: String,
}

impl From<ProjectFormArgs> for ProjectInput {
    fn from(args: ProjectFormArgs) -> Self {
        ProjectInput {
            title: args.title,
            description: args.description,
            image_url: args.image_url,
            technologies: RawTags::Joined(args.technologies),
            github_url: args.github_url,
            live_url: args.live_url,
        }
    }
}

pub async fn handle(cmd: ProjectCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::connect().await?;
    let manager = ctx.manager::<ProjectInput>();

    match cmd {
        ProjectCommands::List => {
            manager.load().await.map_err(describe_failure)?;
            let records = manager.state().records.unwrap_or_default();
            output_records(&output_format, &records, "No projects found", render)
        }
        ProjectCommands::Add { form } => {
            manager
                .submit_new(&form.into())
                .await
                .map_err(describe_failure)?;
            output_success(&output_format, "project added")
        }
        ProjectCommands::Edit { id, form } => {
            manager
                .submit_edit(&id, &form.into())
                .await
                .map_err(describe_failure)?;
            output_success(&output_format, "project updated")
        }
        ProjectCommands::Remove { id } => {
            manager.remove(&id).await.map_err(describe_failure)?;
            output_success(&output_format, "project deleted")
        }
    }
}

fn render(project: &Project) -> String {
    format!(
        "{}  {}  [{}]",
        project.id,
        project.title,
        project.technologies.join(", ")
    )
}
