//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use login_resolver_sdk::AttributeKey;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "login-probe", version)]
#[command(about = "Exercise password hashes, bearer tokens and directory logins")]
pub struct Cli {
    /// YAML configuration file. A missing file means defaults.
    #[arg(short, long, default_value = "login-probe.yaml")]
    pub config: PathBuf,

    /// Enable debug logging unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Username and password for a directory login.
#[derive(Debug, Clone, Args)]
pub struct UserArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive a password hash.
    Hash {
        password: String,

        /// Algorithm tag: `pbkdf2` or `pbkdf2-sha512`.
        #[arg(long, default_value = "pbkdf2")]
        algorithm: String,

        #[arg(long)]
        rounds: Option<u32>,
    },

    /// Check a password against a stored hash.
    Matches { password: String, hash: String },

    /// Log in and print the user id and attributes.
    TestUser(UserArgs),

    /// Log in and print only whether the password was accepted.
    TestPassword(UserArgs),

    /// Log in and print the transitive group closure.
    Groups(UserArgs),

    /// Log in and print one attribute.
    Attribute {
        #[command(flatten)]
        user: UserArgs,

        /// Attribute name, e.g. `display_name` or `email`.
        #[arg(short, long)]
        name: AttributeKey,
    },

    /// Mint or inspect bearer tokens. Needs `resolver.token_key`.
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Mint a token naming an account id.
    Mint { account_id: Uuid },

    /// Check a token and print the account id and expiry.
    Inspect { token: String },
}
