use clap::Subcommand;
use serde_json::json;

use crate::auth::Role;
use crate::cli::utils::output_success;
use crate::cli::{connect, OutputFormat};
use crate::database::models::NewUser;
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an account; a password is generated when none is given")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, default_value = "viewer", help = "admin, operator or viewer")]
        role: String,
        #[arg(long, help = "Initial password")]
        password: Option<String>,
    },

    #[command(about = "Replace a user's password with a generated one")]
    ResetPassword {
        #[arg(long, help = "Login email")]
        email: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect().await?;
    let users = UserService::new(pool.clone());

    match cmd {
        UserCommands::Create { email, name, role, password } => {
            let role: Role = role.parse()?;
            let (user, generated) = users.create(NewUser { name, email, role, password }).await?;

            let mut data = json!({ "user": user });
            if let Some(password) = &generated {
                data["password"] = json!(password);
            }
            output_success(&output_format, &format!("Created {} {}", user.role, user.email), Some(data))?;
            if let (OutputFormat::Text, Some(password)) = (output_format, generated) {
                println!("Generated password: {}", password);
            }
        }
        UserCommands::ResetPassword { email } => {
            let user = users
                .find_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No user with email '{}'", email))?;
            let (user, password) = users.reset_password(user.id).await?;

            output_success(
                &output_format,
                &format!("Reset password for {}", user.email),
                Some(json!({ "user": user, "password": password })),
            )?;
            if let OutputFormat::Text = output_format {
                println!("New password: {}", password);
            }
        }
    }

    pool.close().await;
    Ok(())
}
