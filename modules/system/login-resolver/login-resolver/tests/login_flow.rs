#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use db_login_plugin::{DbLoginConfig, DbLoginPlugin};
use ldap_login_plugin::{LdapLoginConfig, LdapLoginPlugin};
use login_resolver::{
    CompositeProvider, InMemoryAccountStore, LoginResolverConfig, LoginResolverLocalClient,
    Service,
};
use login_resolver_sdk::testutil::{InMemoryCredentialStore, InMemoryDirectory};
use login_resolver_sdk::{
    Account, AccountRecord, AccountStore, CredentialRecord, Credentials, DirectoryEntry, LoginKey,
    LoginProvider, LoginResolverClient, LoginResolverError,
};
use modkit_crypto::{HashAlgorithm, PasswordHasher};
use secrecy::ExposeSecret;
use tracing_test::traced_test;
use uuid::Uuid;

const ANN_DN: &str = "uid=ann,ou=people,dc=example,dc=com";
const STAFF: &str = "cn=staff,ou=groups,dc=example,dc=com";

struct Fixture {
    accounts: Arc<InMemoryAccountStore>,
    client: LoginResolverLocalClient,
    ldap: LdapLoginPlugin,
    db: DbLoginPlugin,
}

fn fixture(config: LoginResolverConfig) -> Fixture {
    let directory = InMemoryDirectory::new();
    directory.add_user(
        DirectoryEntry::new(ANN_DN)
            .with_values("displayName", ["Ann Example"])
            .with_values("memberOf", [STAFF]),
        "correct horse",
    );
    directory.add_entry(DirectoryEntry::new(STAFF));

    let credentials = InMemoryCredentialStore::new();
    credentials.insert(CredentialRecord {
        user_id: 42,
        username: "bob".to_owned(),
        password_hash: PasswordHasher::new(HashAlgorithm::Pbkdf2Sha256, 1_000)
            .derive_hash("hunter2")
            .into_string(),
        enabled: true,
        display_name: Some("Bob Example".to_owned()),
        given_name: None,
        surname: None,
        email: None,
    });

    let accounts = Arc::new(InMemoryAccountStore::new());
    let svc = Arc::new(Service::new(config, accounts.clone()).unwrap());
    Fixture {
        accounts,
        client: LoginResolverLocalClient::new(svc),
        ldap: LdapLoginPlugin::new(LdapLoginConfig::default(), Arc::new(directory)).unwrap(),
        db: DbLoginPlugin::new(
            DbLoginConfig {
                hash_rounds: 1_000,
                ..DbLoginConfig::default()
            },
            Arc::new(credentials),
        )
        .unwrap(),
    }
}

fn link(store: &InMemoryAccountStore, provider: &str, user: &str, active: bool) -> Account {
    let account = Account {
        id: Uuid::new_v4(),
        title: user.to_owned(),
        active,
    };
    store
        .insert(AccountRecord {
            account: account.clone(),
            deleted: false,
        })
        .unwrap();
    store
        .link_login(LoginKey::new(provider, user), account.id)
        .unwrap();
    account
}

fn ldap_login(f: &Fixture, password: &str) -> Box<dyn LoginProvider> {
    f.ldap.provider(Credentials::new("ann", password.to_owned()))
}

#[tokio::test]
async fn login_then_authenticate_with_issued_token() {
    let f = fixture(LoginResolverConfig::default());
    let linked = link(&f.accounts, "ldap", ANN_DN, true);

    let outcome = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();

    assert_eq!(outcome.account, linked);
    let ctx = &outcome.security_context;
    assert_eq!(ctx.account_id(), linked.id);
    assert_eq!(ctx.provider_id(), Some("ldap"));
    assert_eq!(ctx.login_user_id(), Some(ANN_DN));
    assert!(ctx.in_group(STAFF));

    let token = ctx.bearer_token().unwrap().expose_secret().to_owned();
    let again = f.client.authenticate(&token).await.unwrap();
    assert_eq!(again.account_id(), linked.id);
    assert!(!again.is_anonymous());
}

#[tokio::test]
async fn unlinked_identity_is_not_provisioned_by_default() {
    let f = fixture(LoginResolverConfig::default());

    let err = f
        .client
        .login(ldap_login(&f, "correct horse"))
        .await
        .unwrap_err();

    assert_eq!(err, LoginResolverError::AccountNotFound);
    assert!(f.accounts.is_empty());
}

#[tokio::test]
async fn auto_provision_creates_once_and_reuses() {
    let f = fixture(LoginResolverConfig {
        auto_provision: true,
        ..LoginResolverConfig::default()
    });

    let first = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();
    let second = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();

    assert!(first.account.active);
    assert_eq!(first.account.title, "Ann Example");
    assert_eq!(first.account.id, second.account.id);
    assert_eq!(f.accounts.len(), 1);
}

#[tokio::test]
async fn inactive_account_cannot_log_in() {
    let f = fixture(LoginResolverConfig::default());
    link(&f.accounts, "ldap", ANN_DN, false);

    let err = f
        .client
        .login(ldap_login(&f, "correct horse"))
        .await
        .unwrap_err();

    assert_eq!(err, LoginResolverError::Unauthenticated);
}

#[traced_test]
#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let f = fixture(LoginResolverConfig::default());
    link(&f.accounts, "database", "42", true);

    let wrong = f
        .client
        .login(f.db.provider(Credentials::new("bob", "nope".to_owned())))
        .await
        .unwrap_err();
    let unknown = f
        .client
        .login(f.db.provider(Credentials::new("mallory", "nope".to_owned())))
        .await
        .unwrap_err();

    assert_eq!(wrong, unknown);
    assert_eq!(wrong.to_string(), "invalid credentials");
    // The distinction survives in the logs only.
    assert!(logs_contain("bad credentials"));
    assert!(logs_contain("account not found"));
}

#[tokio::test]
async fn composite_falls_back_to_the_next_provider() {
    let f = fixture(LoginResolverConfig::default());
    let bob = link(&f.accounts, "database", "42", true);

    let chain = CompositeProvider::new(vec![
        f.ldap.provider(Credentials::new("bob", "hunter2".to_owned())),
        f.db.provider(Credentials::new("bob", "hunter2".to_owned())),
    ]);
    let outcome = f.client.login(Box::new(chain)).await.unwrap();

    assert_eq!(outcome.account.id, bob.id);
    assert_eq!(outcome.security_context.provider_id(), Some("database"));
}

#[tokio::test]
async fn token_stops_working_once_account_is_deleted() {
    let f = fixture(LoginResolverConfig::default());
    let linked = link(&f.accounts, "ldap", ANN_DN, true);
    let outcome = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();
    let token = outcome
        .security_context
        .bearer_token()
        .unwrap()
        .expose_secret()
        .to_owned();

    f.accounts.soft_delete(linked.id);

    assert_eq!(
        f.client.authenticate(&token).await.unwrap_err(),
        LoginResolverError::InvalidToken
    );
}

#[tokio::test]
async fn token_reflects_deactivation() {
    let f = fixture(LoginResolverConfig::default());
    let linked = link(&f.accounts, "ldap", ANN_DN, true);
    let outcome = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();
    let token = outcome
        .security_context
        .bearer_token()
        .unwrap()
        .expose_secret()
        .to_owned();

    f.accounts.set_active(linked.id, false).unwrap();

    assert_eq!(
        f.client.authenticate(&token).await.unwrap_err(),
        LoginResolverError::InvalidToken
    );
}

#[tokio::test]
async fn store_outage_is_not_reported_as_bad_token() {
    let f = fixture(LoginResolverConfig::default());
    link(&f.accounts, "ldap", ANN_DN, true);
    let outcome = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();
    let token = outcome
        .security_context
        .bearer_token()
        .unwrap()
        .expose_secret()
        .to_owned();

    f.accounts.set_failing(true);

    let err = f.client.authenticate(&token).await.unwrap_err();
    assert!(matches!(err, LoginResolverError::ServiceUnavailable(_)));
    assert_eq!(err.status_code(), http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn tampered_token_is_invalid() {
    let f = fixture(LoginResolverConfig::default());
    link(&f.accounts, "ldap", ANN_DN, true);
    let outcome = f.client.login(ldap_login(&f, "correct horse")).await.unwrap();
    let mut token = outcome
        .security_context
        .bearer_token()
        .unwrap()
        .expose_secret()
        .to_owned();

    let last = token.pop().unwrap();
    token.push(if last == 'A' { 'B' } else { 'A' });

    assert_eq!(
        f.client.authenticate(&token).await.unwrap_err(),
        LoginResolverError::InvalidToken
    );
}
