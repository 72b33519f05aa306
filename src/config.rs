//! Process-wide cache configuration.
//!
//! The caching decision is made once, by [`CacheConfig::resolve`], and the resulting
//! [`TokenCache`] is handed to every token. Caching is on when any of these hold:
//!
//! - the mode is [`CacheMode::Enabled`];
//! - the cache file already exists;
//! - the mode is [`CacheMode::Auto`] and an interactive user consents when prompted.

// std
use std::{
	fs::{self, OpenOptions},
	io::{self, BufRead, IsTerminal, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	cache::{CacheHit, TokenCache},
	error::ConfigError,
	store::{FileStore, StoreError},
};

/// Environment variable consulted by [`CacheConfig::from_env`].
pub const CACHE_ENV: &str = "OAUTH_CREDENTIALS_CACHE";
/// Default cache file, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = ".oauth-credentials";

/// Explicit caching switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
	/// Always cache.
	Enabled,
	/// Never cache, even if a cache file exists.
	Disabled,
	/// Cache if the file exists or the user consents.
	#[default]
	Auto,
}
impl FromStr for CacheMode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" | "on" => Ok(Self::Enabled),
			"0" | "false" | "no" | "off" => Ok(Self::Disabled),
			"auto" | "" => Ok(Self::Auto),
			_ => Err(ConfigError::InvalidCacheMode { value: s.to_owned() }),
		}
	}
}

/// Asks the user whether credentials may be cached on disk.
pub trait ConsentPrompt {
	/// Returns `true` if a human can answer.
	fn is_interactive(&self) -> bool;

	/// Asks `question` and returns the answer.
	fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Prompts on stdout and reads the answer from stdin, when both are terminals.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;
impl ConsentPrompt for TerminalPrompt {
	fn is_interactive(&self) -> bool {
		io::stdin().is_terminal() && io::stdout().is_terminal()
	}

	fn confirm(&self, question: &str) -> io::Result<bool> {
		let mut stdout = io::stdout().lock();

		write!(stdout, "{question} [y/n]: ")?;
		stdout.flush()?;

		let mut answer = String::new();

		io::stdin().lock().read_line(&mut answer)?;

		Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
	}
}

/// Never interactive; used for servers, CI, and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPrompt;
impl ConsentPrompt for NoPrompt {
	fn is_interactive(&self) -> bool {
		false
	}

	fn confirm(&self, _question: &str) -> io::Result<bool> {
		Ok(false)
	}
}

/// Cache configuration: file location, switch, and cache-hit policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
	/// Cache file location.
	pub path: PathBuf,
	/// Caching switch.
	pub mode: CacheMode,
	/// What tokens adopt on a cache hit.
	pub on_hit: CacheHit,
}
impl Default for CacheConfig {
	fn default() -> Self {
		Self { path: DEFAULT_CACHE_PATH.into(), mode: CacheMode::Auto, on_hit: CacheHit::default() }
	}
}
impl CacheConfig {
	/// Reads [`CACHE_ENV`]; see [`CacheConfig::from_env_value`].
	pub fn from_env() -> Result<Self> {
		Self::from_env_value(std::env::var(CACHE_ENV).ok().as_deref())
	}

	/// Interprets a cache switch value.
	///
	/// Boolean-like values and `auto` set the mode; anything that looks like a path (contains a
	/// separator or starts with `.`) enables caching at that location.
	pub fn from_env_value(value: Option<&str>) -> Result<Self> {
		let Some(value) = value else {
			return Ok(Self::default());
		};

		match value.parse::<CacheMode>() {
			Ok(mode) => Ok(Self { mode, ..Self::default() }),
			Err(_) if looks_like_path(value) =>
				Ok(Self { path: value.into(), mode: CacheMode::Enabled, ..Self::default() }),
			Err(e) => Err(e.into()),
		}
	}

	/// Overrides the cache file location.
	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = path.into();

		self
	}

	/// Overrides the caching switch.
	pub fn with_mode(mut self, mode: CacheMode) -> Self {
		self.mode = mode;

		self
	}

	/// Overrides the cache-hit policy.
	pub fn with_hit_policy(mut self, on_hit: CacheHit) -> Self {
		self.on_hit = on_hit;

		self
	}

	/// Decides whether caching is on, asking `prompt` only when nothing else settles it.
	pub fn decide(&self, prompt: &dyn ConsentPrompt) -> Result<Decision> {
		let decision = match self.mode {
			CacheMode::Enabled => Decision::Enabled,
			CacheMode::Disabled => Decision::Disabled,
			CacheMode::Auto if self.path.exists() => Decision::Enabled,
			CacheMode::Auto if prompt.is_interactive() => {
				let question = format!(
					"Use a local file ('{}') to cache OAuth access credentials between sessions?",
					self.path.display()
				);

				if prompt.confirm(&question).map_err(ConfigError::from)? {
					Decision::Consented
				} else {
					Decision::Disabled
				}
			},
			CacheMode::Auto => Decision::Disabled,
		};

		Ok(decision)
	}

	/// Resolves the configuration into the [`TokenCache`] shared by this process.
	pub fn resolve(&self, prompt: &dyn ConsentPrompt) -> Result<TokenCache> {
		let decision = self.decide(prompt)?;
		let cache = match decision {
			Decision::Disabled => TokenCache::disabled(),
			Decision::Enabled => TokenCache::new(Arc::new(FileStore::open(&self.path))),
			Decision::Consented => {
				let store = FileStore::create(&self.path)?;

				protect_cache_file(&self.path)?;

				TokenCache::new(Arc::new(store))
			},
		};

		Ok(cache.with_hit_policy(self.on_hit))
	}
}

/// Outcome of [`CacheConfig::decide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
	/// Caching is off.
	Disabled,
	/// Caching is on by configuration or because the file exists.
	Enabled,
	/// Caching is on because the user just agreed; the file still needs creating.
	Consented,
}

/// Appends the cache file name to a sibling `.gitignore`, if one exists and lacks it.
pub fn protect_cache_file(path: &Path) -> Result<bool, StoreError> {
	let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
		return Ok(false);
	};
	let ignore = path.with_file_name(".gitignore");

	if !ignore.exists() {
		return Ok(false);
	}

	let existing = fs::read_to_string(&ignore).map_err(|e| StoreError::Backend {
		message: format!("Failed to read {}: {e}", ignore.display()),
	})?;

	if existing.lines().any(|line| line.trim() == name) {
		return Ok(false);
	}

	let mut file = OpenOptions::new().append(true).open(&ignore).map_err(|e| {
		StoreError::Backend { message: format!("Failed to open {}: {e}", ignore.display()) }
	})?;
	let separator = if existing.is_empty() || existing.ends_with('\n') { "" } else { "\n" };

	writeln!(file, "{separator}{name}").map_err(|e| StoreError::Backend {
		message: format!("Failed to update {}: {e}", ignore.display()),
	})?;

	Ok(true)
}

fn looks_like_path(value: &str) -> bool {
	value.contains(std::path::MAIN_SEPARATOR) || value.contains('/') || value.starts_with('.')
}
