use clap::Subcommand;

use crate::auth::{credentials_schema, AuthState, Credentials, Role, SignUpOutcome};
use crate::cli::context::CliContext;
use crate::cli::utils::{describe_failure, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password")]
        password: String,
    },

    #[command(about = "Sign out and discard the persisted session")]
    Logout,

    #[command(about = "Show the current session and role")]
    Status,

    #[command(about = "Create a new account (standard role)")]
    Register {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password")]
        password: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            check_credentials(&email, &password)?;
            let ctx = CliContext::connect().await?;
            let identity = ctx.gate.sign_in(&email, &password).await?;
            let role = match identity.role {
                Role::Admin => "admin",
                Role::Standard => "standard",
            };
            output_success(
                &output_format,
                &format!("signed in as {} ({})", identity.email, role),
            )
        }
        AuthCommands::Logout => {
            let ctx = CliContext::connect().await?;
            ctx.gate.sign_out().await?;
            output_success(&output_format, "signed out")
        }
        AuthCommands::Status => {
            let ctx = CliContext::connect().await?;
            match ctx.gate.state() {
                AuthState::Anonymous => output_success(&output_format, "not signed in"),
                AuthState::Authenticated(identity) => {
                    let role = match identity.role {
                        Role::Admin => "admin",
                        Role::Standard => "standard",
                    };
                    output_success(
                        &output_format,
                        &format!("signed in as {} ({})", identity.email, role),
                    )
                }
            }
        }
        AuthCommands::Register { email, password } => {
            check_credentials(&email, &password)?;
            let ctx = CliContext::connect().await?;
            match ctx.gate.sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => output_success(
                    &output_format,
                    &format!("account created, signed in as {}", session.email),
                ),
                SignUpOutcome::ConfirmationRequired => output_success(
                    &output_format,
                    "account created, check your email to confirm before signing in",
                ),
            }
        }
    }
}

fn check_credentials(email: &str, password: &str) -> anyhow::Result<()> {
    credentials_schema()
        .validate(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })
        .map(|_| ())
        .map_err(|e| describe_failure(e.into()))
}
