use clap::{Parser, Subcommand};

use EventHub::models::Role;

#[derive(Parser)]
#[command(name = "eventhub")]
#[command(version)]
#[command(about = "Browse EventHub events and manage your registrations")]
pub struct Cli {
    /// Override the backend base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        email: String,
        #[arg(long, env = "EVENTHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "EVENTHUB_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long, default_value_t = Role::Participant)]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List all events with their registration state
    Events,
    /// List the events you registered for (or created)
    MyEvents {
        /// Show the events you created instead
        #[arg(long)]
        created: bool,
    },
    /// Create an event
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Event date, e.g. 2030-05-01T18:30 (UTC)
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Delete an event you created
    Delete {
        #[arg(value_name = "EVENT_ID")]
        id: i64,
    },
    /// Register for an event
    Register {
        #[arg(value_name = "EVENT_ID")]
        id: i64,
    },
    /// Cancel a registration
    Unregister {
        #[arg(value_name = "EVENT_ID")]
        id: i64,
    },
}
