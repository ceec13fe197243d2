// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod gallery;
pub mod login;
pub mod sessions;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "decora", about = "AI interior design companion", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Suppress the startup banner
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive design chat (default when no subcommand given)
    Chat,
    /// Inspect and manage stored chat sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Inspect and export generated room renders
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Store a backend API token
    Login {
        /// Token value; prompted for interactively when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Show storage, auth, and backend status
    Status,
}

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List all sessions
    List,
    /// Delete one session (and its renders)
    Delete {
        /// Session id (as shown by `sessions list`)
        id: String,
    },
    /// Delete every session and every render
    Clear,
}

#[derive(Subcommand)]
pub enum GalleryAction {
    /// List renders for a session
    List {
        /// Session id
        session: String,
    },
    /// Write a render to a PNG file
    Export {
        /// Render id (as shown by `gallery list`)
        id: i64,
        /// Output path; defaults to the exports directory
        #[arg(long)]
        output: Option<String>,
    },
}
