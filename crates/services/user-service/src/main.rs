//! User Service - operator CLI for migrations and account administration.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::NewUser;
use user_service_lib::config::UserServiceConfig;
use user_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "user-service")]
#[command(author, version, about = "User account management", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// User account commands
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Validate and store a new user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "USER_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to the password itself
        #[arg(long)]
        password_confirmation: Option<String>,
    },
    /// Show a user by email
    Show { email: String },
    /// List all users
    List,
    /// Check a password against a stored user
    Authenticate {
        #[arg(long)]
        email: String,
        #[arg(long, env = "USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete a user by ID
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = UserServiceConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    let result = match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            user_service_lib::run_migrations(migrate_action, &config).await
        }
        Commands::User { action } => run_user_command(action, &config).await,
    };

    if let Err(e) = result {
        if let Some(violations) = e.violations() {
            for message in violations.full_messages() {
                eprintln!("{}", message);
            }
        }
        tracing::error!(code = e.code(), "Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run_user_command(action: UserCommands, config: &UserServiceConfig) -> AppResult<()> {
    let (_db, service) = user_service_lib::connect(config).await?;

    match action {
        UserCommands::Create {
            name,
            email,
            password,
            password_confirmation,
        } => {
            let confirmation = password_confirmation.unwrap_or_else(|| password.clone());
            let user = service
                .register(NewUser::new(name, email, password, confirmation))
                .await?;
            println!("{}\t{}\t{}", user.id, user.email, user.name);
        }
        UserCommands::Show { email } => {
            let user = service.get_user_by_email(&email).await?;
            println!(
                "{}\t{}\t{}\t{}",
                user.id,
                user.email,
                user.name,
                user.created_at.to_rfc3339()
            );
        }
        UserCommands::List => {
            for user in service.list_users().await? {
                println!("{}\t{}\t{}", user.id, user.email, user.name);
            }
        }
        UserCommands::Authenticate { email, password } => {
            match service.authenticate(&email, &password).await {
                Ok(user) => println!("authenticated {}", user.id),
                Err(AppError::InvalidCredentials) => {
                    println!("invalid credentials");
                    return Err(AppError::InvalidCredentials);
                }
                Err(e) => return Err(e),
            }
        }
        UserCommands::Delete { id } => {
            service.delete_user(id).await?;
            println!("deleted {}", id);
        }
    }

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
