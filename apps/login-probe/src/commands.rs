//! Command execution. Authentication outcomes are printed, not returned as
//! errors, so the process exits 0 whether or not a login succeeds.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, bail};
use ldap_login_plugin::LdapLoginPlugin;
use login_resolver::token_sealer;
use login_resolver_sdk::{AttributeValue, AuthenticationError, Credentials, LoginResult};
use modkit_crypto::password::{DEFAULT_ROUNDS, verify as verify_password};
use modkit_crypto::token::{TokenCodec, TokenService, UuidTokenService};
use modkit_crypto::{HashAlgorithm, PasswordHasher};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::cli::{Cli, Command, TokenCommand, UserArgs};
use crate::config::ProbeConfig;

const REJECTED: &str = "rejected";

fn render(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Text(text) => text.clone(),
        AttributeValue::Number(n) => n.to_string(),
        AttributeValue::TextList(items) => items.join("; "),
    }
}

async fn login(
    config: &ProbeConfig,
    user: UserArgs,
) -> anyhow::Result<Result<LoginResult, AuthenticationError>> {
    let plugin = LdapLoginPlugin::new(config.ldap.clone(), Arc::new(config.build_directory()))
        .context("invalid ldap configuration")?;
    let outcome = plugin
        .provider(Credentials::new(user.username, user.password))
        .login()
        .await;
    if let Err(e) = &outcome {
        info!(provider = %e.provider, identity = %e.identity, cause = %e.cause, "login rejected");
    }
    Ok(outcome)
}

fn token_service(config: &ProbeConfig) -> anyhow::Result<UuidTokenService> {
    if config.resolver.token_key.is_none() {
        bail!("token commands need resolver.token_key to open tokens minted elsewhere");
    }
    let sealer = token_sealer(&config.resolver)?;
    Ok(UuidTokenService::uuid(TokenCodec::new(sealer)))
}

/// Run one command, writing its result to `out`.
///
/// # Errors
///
/// Returns an error for bad configuration or arguments and for failed
/// writes to `out`. Rejected logins and invalid tokens are not errors.
pub async fn run(cli: Cli, config: &ProbeConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match cli.command {
        Command::Hash {
            password,
            algorithm,
            rounds,
        } => {
            let algorithm = HashAlgorithm::from_tag(&algorithm)
                .with_context(|| format!("unknown algorithm `{algorithm}`"))?;
            let hasher = PasswordHasher::new(algorithm, rounds.unwrap_or(DEFAULT_ROUNDS));
            writeln!(out, "{}", hasher.derive_hash(&password))?;
        }
        Command::Matches { password, hash } => {
            let verdict = if verify_password(&password, &hash) {
                "match"
            } else {
                "no match"
            };
            writeln!(out, "{verdict}")?;
        }
        Command::TestUser(user) => match login(config, user).await? {
            Ok(result) => {
                writeln!(out, "provider: {}", result.provider_id())?;
                writeln!(out, "user_id: {}", result.user_id())?;
                writeln!(out, "title: {}", result.display_title())?;
                for (key, value) in result.attributes().entries() {
                    writeln!(out, "{key}: {}", render(value))?;
                }
            }
            Err(_) => writeln!(out, "{REJECTED}: {}", AuthenticationError::PUBLIC_MESSAGE)?,
        },
        Command::TestPassword(user) => {
            let verdict = if login(config, user).await?.is_ok() {
                "accepted"
            } else {
                REJECTED
            };
            writeln!(out, "{verdict}")?;
        }
        Command::Groups(user) => match login(config, user).await? {
            Ok(result) => {
                for group in result.groups() {
                    writeln!(out, "{group}")?;
                }
            }
            Err(_) => writeln!(out, "{REJECTED}")?,
        },
        Command::Attribute { user, name } => match login(config, user).await? {
            Ok(result) => match result.attributes().get(name) {
                Some(value) => writeln!(out, "{}", render(value))?,
                None => writeln!(out, "<unset>")?,
            },
            Err(_) => writeln!(out, "{REJECTED}")?,
        },
        Command::Token(TokenCommand::Mint { account_id }) => {
            let service = token_service(config)?;
            let expires_at = OffsetDateTime::now_utc() + config.resolver.token_lifetime;
            writeln!(out, "{}", service.create_token(&account_id, expires_at))?;
        }
        Command::Token(TokenCommand::Inspect { token }) => {
            let service = token_service(config)?;
            match service.unpack_token(&token) {
                Ok(unpacked) => {
                    writeln!(out, "account_id: {}", unpacked.payload())?;
                    writeln!(out, "expires_at: {}", unpacked.expires_at().format(&Rfc3339)?)?;
                }
                Err(e) => writeln!(out, "invalid: {e}")?,
            }
        }
    }
    Ok(())
}
