//! Rasenmaeher CLI - enrollment and deployment administration.
//!
//! # Usage
//!
//! ```bash
//! # Who am I, according to the backend?
//! rasa status
//!
//! # Enroll with a login code and desired callsign, waiting for approval
//! rasa enroll --code abcd1234 --callsign eagle1 --wait
//!
//! # Invite-code administration
//! rasa invites list
//! rasa invites create
//! rasa invites toggle CODE123X
//! rasa invites delete CODE123X CODE456Y
//!
//! # Approval queue
//! rasa queue list
//! rasa queue approve ZZZ999AA --callsign eagle1
//! rasa queue reject eagle1
//!
//! # Role management
//! rasa users list
//! rasa users promote eagle1
//! ```
//!
//! # Commands
//!
//! - `status` - Resolve and print the caller's identity
//! - `enroll` - Run the enrollment workflow
//! - `invites` - Manage invite codes
//! - `queue` - Approve or reject pending enrollees
//! - `users` - List users and manage roles

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rasa")]
#[command(author, version, about = "Rasenmaeher enrollment and administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the caller's identity
    Status,
    /// Enroll with a login code and desired callsign
    Enroll {
        /// The login code (admin bootstrap or enrollment invite)
        #[arg(short, long)]
        code: String,

        /// Desired callsign
        #[arg(short = 's', long)]
        callsign: String,

        /// Keep polling until an admin approves the enrollment
        #[arg(short, long)]
        wait: bool,
    },
    /// Manage invite codes
    Invites {
        #[command(subcommand)]
        action: InviteAction,
    },
    /// Approve or reject pending enrollees
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },
    /// List users and manage roles
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum InviteAction {
    /// List all invite codes
    List,
    /// Create a new invite code
    Create,
    /// Flip a code between active and inactive
    Toggle {
        /// The invite code
        code: String,
    },
    /// Delete invite codes
    Delete {
        /// The invite codes to delete
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Activate invite codes
    Enable {
        /// The invite codes to activate
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Deactivate invite codes
    Disable {
        /// The invite codes to deactivate
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[derive(Subcommand)]
enum QueueAction {
    /// List pending enrollees
    List,
    /// Approve a pending enrollee
    Approve {
        /// Approval payload: the QR URL or the bare approval code
        payload: String,

        /// Enrollee callsign (required when the payload does not carry one)
        #[arg(short = 's', long)]
        callsign: Option<String>,
    },
    /// Reject a pending enrollee
    Reject {
        /// Enrollee callsign
        callsign: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users with their roles
    List,
    /// Grant the admin role
    Promote {
        /// Target callsign
        callsign: String,
    },
    /// Revoke the admin role
    Demote {
        /// Target callsign
        callsign: String,
    },
    /// Remove a user from the deployment
    Remove {
        /// Target callsign
        callsign: String,
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
        Commands::Status => commands::status::show().await?,
        Commands::Enroll {
            code,
            callsign,
            wait,
        } => commands::enroll::enroll(&code, &callsign, wait).await?,
        Commands::Invites { action } => match action {
            InviteAction::List => commands::invites::list().await?,
            InviteAction::Create => commands::invites::create().await?,
            InviteAction::Toggle { code } => commands::invites::toggle(&code).await?,
            InviteAction::Delete { codes } => commands::invites::bulk_delete(&codes).await?,
            InviteAction::Enable { codes } => commands::invites::bulk_enable(&codes).await?,
            InviteAction::Disable { codes } => commands::invites::bulk_disable(&codes).await?,
        },
        Commands::Queue { action } => match action {
            QueueAction::List => commands::queue::list().await?,
            QueueAction::Approve { payload, callsign } => {
                commands::queue::approve(&payload, callsign.as_deref()).await?;
            }
            QueueAction::Reject { callsign } => commands::queue::reject(&callsign).await?,
        },
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list().await?,
            UserAction::Promote { callsign } => commands::users::promote(&callsign).await?,
            UserAction::Demote { callsign } => commands::users::demote(&callsign).await?,
            UserAction::Remove { callsign } => commands::users::remove(&callsign).await?,
        },
    }
    Ok(())
}
