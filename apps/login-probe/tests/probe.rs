#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write as _;

use clap::Parser;
use login_probe::{Cli, Command, ProbeConfig, TokenCommand, load_config, run};
use login_resolver_sdk::AttributeKey;

const CONFIG: &str = r#"
resolver:
  token_key: "2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a"
  token_lifetime: 5m
directory:
  - dn: "uid=ann,ou=people,dc=example,dc=com"
    password: "correct horse"
    attributes:
      displayName: ["Ann Example"]
      mail: ["ann@example.com"]
      memberOf: ["cn=staff,ou=groups,dc=example,dc=com"]
  - dn: "uid=eve,ou=people,dc=example,dc=com"
    password: "letmein"
    disabled: true
  - dn: "cn=staff,ou=groups,dc=example,dc=com"
    attributes:
      memberOf: ["cn=everyone,ou=groups,dc=example,dc=com"]
  - dn: "cn=everyone,ou=groups,dc=example,dc=com"
"#;

fn config() -> ProbeConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    load_config(file.path()).unwrap()
}

async fn probe(config: &ProbeConfig, args: &[&str]) -> String {
    let cli = Cli::parse_from(std::iter::once("login-probe").chain(args.iter().copied()));
    let mut out = Vec::new();
    run(cli, config, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn parses_attribute_command() {
    let cli = Cli::parse_from([
        "login-probe",
        "attribute",
        "-u",
        "ann",
        "-p",
        "pw",
        "--name",
        "email",
    ]);
    match cli.command {
        Command::Attribute { user, name } => {
            assert_eq!(user.username, "ann");
            assert_eq!(name, AttributeKey::Email);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn rejects_unknown_attribute_name() {
    let res = Cli::try_parse_from([
        "login-probe",
        "attribute",
        "-u",
        "ann",
        "-p",
        "pw",
        "--name",
        "shoe_size",
    ]);
    assert!(res.is_err());
}

#[test]
fn parses_token_inspect() {
    let cli = Cli::parse_from(["login-probe", "-c", "probe.yaml", "token", "inspect", "abc"]);
    assert_eq!(cli.config.to_str(), Some("probe.yaml"));
    assert!(matches!(
        cli.command,
        Command::Token(TokenCommand::Inspect { token }) if token == "abc"
    ));
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config(&dir.path().join("absent.yaml")).unwrap();
    assert!(cfg.directory.is_empty());
    assert_eq!(cfg.resolver.token_header, "Token");
}

#[test]
fn unknown_keys_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"resolver:\n  vendor: x\n").unwrap();
    assert!(load_config(file.path()).is_err());
}

#[tokio::test]
async fn hash_then_matches() {
    let cfg = ProbeConfig::default();
    let hash = probe(&cfg, &["hash", "s3cret", "--rounds", "1000"]).await;
    let hash = hash.trim();
    assert!(hash.starts_with("$pbkdf2$1000$"), "{hash}");

    assert_eq!(probe(&cfg, &["matches", "s3cret", hash]).await, "match\n");
    assert_eq!(probe(&cfg, &["matches", "nope", hash]).await, "no match\n");
}

#[tokio::test]
async fn test_user_prints_attributes() {
    let out = probe(&config(), &["test-user", "-u", "ann", "-p", "correct horse"]).await;
    assert!(out.contains("user_id: uid=ann,ou=people,dc=example,dc=com"));
    assert!(out.contains("title: Ann Example"));
    assert!(out.contains("email: ann@example.com"));
}

#[tokio::test]
async fn failed_logins_are_output_not_errors() {
    let cfg = config();
    assert_eq!(
        probe(&cfg, &["test-password", "-u", "ann", "-p", "wrong"]).await,
        "rejected\n"
    );
    assert_eq!(
        probe(&cfg, &["test-password", "-u", "eve", "-p", "letmein"]).await,
        "rejected\n"
    );
    assert_eq!(
        probe(&cfg, &["test-password", "-u", "ann", "-p", "correct horse"]).await,
        "accepted\n"
    );
}

#[tokio::test]
async fn groups_are_transitive() {
    let out = probe(&config(), &["groups", "-u", "ann", "-p", "correct horse"]).await;
    assert_eq!(
        out,
        "cn=staff,ou=groups,dc=example,dc=com\ncn=everyone,ou=groups,dc=example,dc=com\n"
    );
}

#[tokio::test]
async fn attribute_prints_one_value() {
    let cfg = config();
    let args = ["attribute", "-u", "ann", "-p", "correct horse", "--name"];
    let display = probe(&cfg, &[&args[..], &["display_name"]].concat()).await;
    assert_eq!(display, "Ann Example\n");
    let surname = probe(&cfg, &[&args[..], &["surname"]].concat()).await;
    assert_eq!(surname, "<unset>\n");
}

#[tokio::test]
async fn minted_token_inspects_back() {
    let cfg = config();
    let id = "11111111-2222-4333-8444-555555555555";
    let token = probe(&cfg, &["token", "mint", id]).await;

    let out = probe(&cfg, &["token", "inspect", token.trim()]).await;
    assert!(out.starts_with(&format!("account_id: {id}\n")), "{out}");
    assert!(out.contains("expires_at: "));

    let out = probe(&cfg, &["token", "inspect", "garbage"]).await;
    assert!(out.starts_with("invalid: "));
}

#[tokio::test]
async fn token_commands_need_a_configured_key() {
    let cli = Cli::parse_from(["login-probe", "token", "inspect", "abc"]);
    let mut out = Vec::new();
    assert!(run(cli, &ProbeConfig::default(), &mut out).await.is_err());
}
