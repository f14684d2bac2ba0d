//! Command-line interface definition for Taskdeck
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the session and for managing tasks.

use clap::{Parser, Subcommand};

use crate::api::{SortField, SortOrder, TaskStatus};

/// Taskdeck - task manager client
///
/// Log in to the task API and list, create, update, and delete your tasks.
#[derive(Parser, Debug, Clone)]
#[command(name = "taskdeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Taskdeck
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the session tokens
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the session and forget the stored tokens
    Logout,

    /// Show the logged-in user and when the session expires
    Whoami,

    /// Manage tasks
    Tasks {
        /// Task subcommand
        #[command(subcommand)]
        command: TaskCommand,
    },
}

/// Task management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// List one page of tasks
    List {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,

        /// Tasks per page
        #[arg(long)]
        limit: Option<u32>,

        /// Only tasks with this status
        #[arg(short, long)]
        status: Option<TaskStatus>,

        /// Only tasks whose title matches
        #[arg(long)]
        search: Option<String>,

        /// Sort field (created_at, updated_at, title, status)
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single task
    Show {
        /// Task id
        id: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create a task
    Create {
        /// Task title
        title: String,
    },

    /// Update a task's title or status
    Update {
        /// Task id
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New status (pending, in_progress, completed, cancelled)
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_url: None,
            verbose: false,
            command: Commands::Whoami,
        }
    }
}
