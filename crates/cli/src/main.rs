//! Duka CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! duka migrate
//!
//! # Register a user with their customer profile
//! duka user create -u alice -e alice@example.com -p +254700000001 -c ALC01
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Register a user + customer from the terminal

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "duka")]
#[command(author, version, about = "Duka CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user with their customer profile
    Create {
        /// Login handle
        #[arg(short, long)]
        username: String,

        /// Contact email address
        #[arg(short, long)]
        email: String,

        /// Phone number for SMS receipts
        #[arg(short, long)]
        phone: String,

        /// Unique account code
        #[arg(short, long)]
        code: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                phone,
                code,
            } => {
                commands::user::create(&username, &email, &phone, &code).await?;
            }
        },
    }
    Ok(())
}
