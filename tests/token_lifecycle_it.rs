// std
use std::sync::atomic::Ordering;
// self
use oauth_credentials::{
	_preludet::*,
	auth::{
		Application, OAuth1Credentials, OAuth2Credentials, OAuth2Params, ScopeSet, TokenDelivery,
	},
	cache::TokenCache,
	error::RefreshError,
	negotiate::NegotiationError,
	store::MemoryStore,
	token::{self, Fingerprint, OAuth1, OAuth2, Token},
};

fn scoped_params() -> OAuth2Params {
	OAuth2Params::new(
		ScopeSet::new(["profile", "email"]).expect("Scope fixture should build successfully."),
	)
}

#[test]
fn constructor_initializes_once_and_init_stays_idempotent() -> color_eyre::Result<()> {
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("first").with_refresh_token("r1")));

	let mut token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator.clone(),
		TokenCache::disabled(),
	)?;
	let before = token.state();

	token.init(false)?;
	token.init(false)?;

	assert_eq!(token.state(), before);
	assert_eq!(negotiator.acquisitions(), 1);

	Ok(())
}

#[test]
fn fingerprint_ignores_application() -> color_eyre::Result<()> {
	let negotiator = Arc::new(MockNegotiator::default());
	let first = Token::<OAuth2>::new(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator.clone(),
		TokenCache::disabled(),
	);
	let second = Token::<OAuth2>::new(
		test_endpoint(),
		Application::new("other-app", "other-key").with_secret("other-secret"),
		scoped_params(),
		negotiator.clone(),
		TokenCache::disabled(),
	);
	let oob = Token::<OAuth2>::new(
		test_endpoint(),
		test_app(),
		scoped_params().with_oob(true),
		negotiator,
		TokenCache::disabled(),
	);

	assert_eq!(first.fingerprint()?, second.fingerprint()?);
	assert_ne!(first.fingerprint()?, oob.fingerprint()?);
	assert_eq!(
		first.fingerprint()?,
		Fingerprint::compute::<OAuth2>(&test_endpoint(), &scoped_params())?
	);

	Ok(())
}

#[test]
fn second_token_reuses_cached_credentials() -> color_eyre::Result<()> {
	let store = Arc::new(MemoryStore::default());
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("shared").with_refresh_token("r1")));

	let first = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator.clone(),
		TokenCache::new(store.clone()),
	)?;
	let second = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator.clone(),
		TokenCache::new(store.clone()),
	)?;

	assert_eq!(negotiator.acquisitions(), 1);
	assert_eq!(store.len(), 1);
	assert_eq!(first.state(), second.state());

	Ok(())
}

#[test]
fn oauth1_tokens_sign_but_never_refresh() -> color_eyre::Result<()> {
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth1(Ok(OAuth1Credentials::new("token-value", "token-secret")));

	let mut token = token::new_oauth1_token(
		test_endpoint(),
		test_app(),
		Some("read"),
		negotiator.clone(),
		TokenCache::disabled(),
	)?;
	let target = url("https://api.example.com/feed?page=2");
	let signed = token.sign("GET", &target)?;
	let header = signed.config.header("Authorization").unwrap_or_default();

	assert_eq!(signed.url, target);
	assert!(header.starts_with("OAuth "));
	assert!(token::oauth1::verify(
		"GET",
		&target,
		token.app(),
		token.credentials().expect("Token should be initialized."),
		header,
	));
	assert!(matches!(
		token.refresh(),
		Err(Error::UnsupportedOperation { operation: "refresh", protocol: "oauth1" })
	));
	assert_eq!(token.params().permission.as_deref(), Some("read"));
	assert_eq!(negotiator.refresh_calls.load(Ordering::SeqCst), 0);

	Ok(())
}

#[test]
fn signing_does_not_mutate_the_token() -> color_eyre::Result<()> {
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("abc123")));

	let token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params().with_delivery(TokenDelivery::Query),
		negotiator,
		TokenCache::disabled(),
	)?;
	let before = token.state();
	let first = token.sign_str("GET", "https://api.example.com/x?y=1")?;
	let second = token.sign_str("GET", "https://api.example.com/x?y=1")?;

	assert_eq!(first, second);
	assert_eq!(first.url.as_str(), "https://api.example.com/x?y=1&access_token=abc123");
	assert!(first.config.is_empty());
	assert_eq!(token.state(), before);
	assert!(matches!(
		token.sign_str("GET", "not a url"),
		Err(Error::Config(oauth_credentials::error::ConfigError::InvalidUrl { .. }))
	));

	Ok(())
}

#[test]
fn refresh_replaces_state_and_writes_cache_once() -> color_eyre::Result<()> {
	let store = Arc::new(CountingStore::default());
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("old-access").with_refresh_token("r1")));
	negotiator.push_refresh(Ok(OAuth2Credentials::new("new-access").with_refresh_token("r2")));

	let mut token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator.clone(),
		TokenCache::new(store.clone()),
	)?;
	let writes_after_init = store.write_count();

	assert!(token.can_refresh());

	token.refresh()?;

	let credentials = token.credentials().expect("Token should stay initialized.");

	assert_eq!(credentials.access_token.expose(), "new-access");
	assert_eq!(credentials.refresh_token.as_ref().map(|s| s.expose()), Some("r2"));
	assert_eq!(store.write_count(), writes_after_init + 1);
	assert_eq!(negotiator.refresh_calls.load(Ordering::SeqCst), 1);

	Ok(())
}

#[test]
fn rejected_refresh_keeps_current_credentials() -> color_eyre::Result<()> {
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("current").with_refresh_token("r1")));
	negotiator.push_refresh(Err(NegotiationError::Rejected { reason: "invalid_grant".into() }));

	let mut token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator,
		TokenCache::disabled(),
	)?;
	let err = token.refresh().expect_err("Rejected refresh must surface an error.");

	assert!(matches!(err, Error::Refresh(RefreshError::Rejected { .. })));
	assert_eq!(token.credentials().map(|c| c.access_token.expose()), Some("current"));

	Ok(())
}

#[test]
fn disabled_cache_never_touches_the_store() -> color_eyre::Result<()> {
	let store = Arc::new(CountingStore::default());
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("a").with_refresh_token("r")));
	negotiator.push_refresh(Ok(OAuth2Credentials::new("b")));

	let mut token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator,
		TokenCache::new(store.clone()).with_enabled(false),
	)?;

	token.refresh()?;
	token.cache()?;

	assert!(!token.uncache()?);
	assert_eq!(store.lookup_count(), 0);
	assert_eq!(store.write_count(), 0);

	Ok(())
}

#[test]
fn failing_store_does_not_fail_init() -> color_eyre::Result<()> {
	let store = Arc::new(CountingStore::failing());
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("usable")));

	let token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator,
		TokenCache::new(store.clone()),
	)?;

	assert!(token.is_initialized());
	assert_eq!(store.write_count(), 1);
	assert!(matches!(token.cache(), Err(Error::Storage(_))));

	Ok(())
}

#[test]
fn display_summarizes_without_secrets() -> color_eyre::Result<()> {
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth2(Ok(OAuth2Credentials::new("very-secret-access")));

	let token = token::new_oauth2_token(
		test_endpoint(),
		test_app(),
		scoped_params(),
		negotiator,
		TokenCache::disabled(),
	)?;
	let rendered = token.to_string();
	let debugged = format!("{token:?}");

	assert!(rendered.starts_with("<Token oauth2>"));
	assert!(rendered.contains(token.fingerprint()?.as_str()));
	assert!(!rendered.contains("very-secret-access"));
	assert!(!debugged.contains("very-secret-access"));
	assert!(!debugged.contains("consumer-secret"));

	Ok(())
}

#[test]
fn oauth1_and_oauth2_share_a_store_without_collisions() -> color_eyre::Result<()> {
	let store = Arc::new(MemoryStore::default());
	let negotiator = Arc::new(MockNegotiator::default());

	negotiator.push_oauth1(Ok(OAuth1Credentials::new("t1", "s1")));
	negotiator.push_oauth2(Ok(OAuth2Credentials::new("a2")));

	let mut one = Token::<OAuth1>::new(
		test_endpoint(),
		test_app(),
		Default::default(),
		negotiator.clone(),
		TokenCache::new(store.clone()),
	);
	let mut two = Token::<OAuth2>::new(
		test_endpoint(),
		test_app(),
		OAuth2Params::default(),
		negotiator.clone(),
		TokenCache::new(store.clone()),
	);

	one.init(false)?;
	two.init(false)?;

	assert_ne!(one.fingerprint()?, two.fingerprint()?);
	assert_eq!(store.len(), 2);
	assert_eq!(negotiator.acquisitions(), 2);

	Ok(())
}
