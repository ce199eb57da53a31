//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use gisthub_core::config::AppConfig;
use gisthub_core::error::AppError;
use gisthub_database::store::UserStore;
use gisthub_entity::user::{User, UserRole};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all users
    List {
        /// Only show users with this role
        #[arg(short, long, value_parser = parse_role)]
        role: Option<UserRole>,
    },
    /// Promote a user to admin
    MakeAdmin {
        /// Email of the user
        email: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Set a user's role
    SetRole {
        /// Email of the user
        email: String,
        /// New role (member or admin)
        #[arg(value_parser = parse_role)]
        role: UserRole,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    s.parse::<UserRole>().map_err(|e| e.message)
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.display_name.clone().unwrap_or_default(),
            role: user.role.to_string(),
            created_at: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let stores = super::connect(config).await?;
    let users = stores.users.as_ref();

    match &args.command {
        UserCommand::List { role } => {
            let rows: Vec<UserRow> = users
                .list_all()
                .await?
                .iter()
                .filter(|u| role.is_none_or(|r| u.role == r))
                .map(UserRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::MakeAdmin { email, yes } => {
            let user = find_by_email(users, email).await?;
            if user.is_admin() {
                output::print_warning(&format!("User '{}' is already an admin", user.email));
                return Ok(());
            }

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Grant admin rights to '{}'?", user.email))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let user = users.update_role(user.id, UserRole::Admin).await?;
            output::print_item(&UserRow::from(&user), format);
            output::print_success(&format!("User '{}' is now an admin", user.email));
        }
        UserCommand::SetRole { email, role } => {
            let user = find_by_email(users, email).await?;
            let user = users.update_role(user.id, *role).await?;
            output::print_item(&UserRow::from(&user), format);
            output::print_success(&format!("User '{}' now has role '{}'", user.email, role));
        }
    }

    Ok(())
}

async fn find_by_email(users: &dyn UserStore, email: &str) -> Result<User, AppError> {
    let email = email.trim().to_lowercase();
    users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))
}
