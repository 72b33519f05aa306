//! Single-file [`CredentialStore`] shared by every process working in the same directory.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
	process,
	sync::atomic::{AtomicU64, Ordering},
};
// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError},
	token::{CachedToken, Fingerprint},
};

type Snapshot = BTreeMap<Fingerprint, CachedToken>;

static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Persists a JSON object mapping fingerprints to cached token state.
///
/// Every operation re-reads the file so entries written by other processes are not lost; writes
/// go through a temporary sibling that is renamed over the target, so readers never observe a
/// partially written file. Concurrent writers race with last-write-wins semantics.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	write_guard: Mutex<()>,
}
impl FileStore {
	/// Opens a store at `path` without touching the filesystem.
	pub fn open(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), write_guard: Mutex::new(()) }
	}

	/// Opens a store at `path`, creating an empty cache file if none exists.
	pub fn create(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let store = Self::open(path);

		if !store.path.exists() {
			let _guard = store.write_guard.lock();

			store.persist(&Snapshot::new())?;
		}

		Ok(store)
	}

	/// Location of the cache file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads every cached entry.
	pub fn entries(&self) -> Result<Snapshot, StoreError> {
		Self::load_snapshot(&self.path)
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::new()),
			Err(e) => {
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				});
			},
		};

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Snapshot::new());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
			StoreError::Serialization {
				message: format!("Failed to parse {} at `{}`: {}", path.display(), e.path(), e.inner()),
			}
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	// Unique per write, so handles sharing a path never truncate each other's temp file.
	fn tmp_path(&self) -> PathBuf {
		let mut name =
			self.path.file_name().map(|name| name.to_os_string()).unwrap_or_else(|| "cache".into());
		let sequence = TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);

		name.push(format!(".{}.{sequence}.tmp", process::id()));

		self.path.with_file_name(name)
	}

	fn persist(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize cache snapshot: {e}"),
			})?;
		let tmp_path = self.tmp_path();

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		// Owner read/write only.
		#[cfg(unix)]
		{
			// std
			use std::os::unix::fs::PermissionsExt;

			fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
				StoreError::Backend {
					message: format!("Failed to restrict {}: {e}", tmp_path.display()),
				}
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| {
			let _ = fs::remove_file(&tmp_path);

			StoreError::Backend { message: format!("Failed to replace {}: {e}", self.path.display()) }
		})
	}
}
impl CredentialStore for FileStore {
	fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedToken>, StoreError> {
		Ok(Self::load_snapshot(&self.path)?.remove(fingerprint))
	}

	fn store(&self, fingerprint: &Fingerprint, token: CachedToken) -> Result<(), StoreError> {
		let _guard = self.write_guard.lock();
		let mut snapshot = Self::load_snapshot(&self.path)?;

		snapshot.insert(fingerprint.clone(), token);

		self.persist(&snapshot)
	}

	fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
		let _guard = self.write_guard.lock();
		let mut snapshot = Self::load_snapshot(&self.path)?;

		if snapshot.remove(fingerprint).is_none() {
			return Ok(false);
		}

		self.persist(&snapshot)?;

		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{temp_path, test_app, test_endpoint},
		auth::{OAuth2Credentials, OAuth2Params},
		token::{OAuth2, Protocol, TokenState},
	};

	fn entry(access: &str) -> (Fingerprint, CachedToken) {
		let params = OAuth2Params::default();
		let fp = Fingerprint::compute::<OAuth2>(&test_endpoint(), &params)
			.expect("Fingerprint should compute.");
		let state = TokenState::<OAuth2> {
			endpoint: test_endpoint(),
			app: test_app(),
			params,
			credentials: OAuth2Credentials::new(access).with_refresh_token("refresh"),
		};

		(fp, OAuth2::wrap(state))
	}

	fn leftover_tmp_files(path: &Path) -> Vec<PathBuf> {
		let prefix = format!(
			"{}.",
			path.file_name().expect("Temp path has a file name.").to_string_lossy()
		);
		let dir = path.parent().expect("Temp path has a parent directory.");

		fs::read_dir(dir)
			.expect("Temp directory should be readable.")
			.filter_map(|entry| entry.ok().map(|entry| entry.path()))
			.filter(|candidate| {
				candidate.file_name().is_some_and(|name| {
					let name = name.to_string_lossy();

					name.starts_with(&prefix) && name.ends_with(".tmp")
				})
			})
			.collect()
	}

	#[test]
	fn store_and_reload_round_trip() {
		let path = temp_path("file_store_round_trip");
		let store = FileStore::open(&path);
		let (fp, cached) = entry("access-token");

		assert!(store.lookup(&fp).expect("Lookup on a missing file should succeed.").is_none());

		store.store(&fp, cached.clone()).expect("Storing into the cache file should succeed.");
		drop(store);

		let reopened = FileStore::open(&path);
		let fetched = reopened
			.lookup(&fp)
			.expect("Lookup after reopen should succeed.")
			.expect("Cache file lost the entry after reopen.");

		assert_eq!(fetched, cached);
		assert!(reopened.remove(&fp).expect("Removal should succeed."));
		assert!(!reopened.remove(&fp).expect("Second removal should succeed."));
		assert!(reopened.entries().expect("Entries should load.").is_empty());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache file {}: {e}", path.display())
		});
	}

	#[test]
	fn writes_from_another_handle_are_preserved() {
		let path = temp_path("file_store_merge");
		let first = FileStore::create(&path).expect("Creating the cache file should succeed.");
		let second = FileStore::open(&path);
		let (fp, cached) = entry("access-a");
		let other_fp = Fingerprint::compute::<OAuth2>(
			&test_endpoint(),
			&OAuth2Params::default().with_oob(true),
		)
		.expect("Fingerprint should compute.");

		first.store(&fp, cached).expect("First write should succeed.");
		second.store(&other_fp, entry("access-b").1).expect("Second write should succeed.");

		assert_eq!(first.entries().expect("Entries should load.").len(), 2);

		#[cfg(unix)]
		{
			// std
			use std::os::unix::fs::PermissionsExt;

			let mode = fs::metadata(&path)
				.expect("Cache file metadata should load.")
				.permissions()
				.mode();

			assert_eq!(mode & 0o777, 0o600);
		}

		assert!(
			leftover_tmp_files(&path).is_empty(),
			"Temporary files must be renamed away after each write."
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache file {}: {e}", path.display())
		});
	}

	#[test]
	fn concurrent_handles_on_one_path_never_collide() {
		let path = temp_path("file_store_concurrent");
		let writers = (0..2)
			.map(|writer| {
				let path = path.clone();

				std::thread::spawn(move || {
					let store = FileStore::open(&path);
					let fp = Fingerprint::compute::<OAuth2>(
						&test_endpoint(),
						&OAuth2Params::default().with_oob(writer == 1),
					)
					.expect("Fingerprint should compute.");

					for round in 0..100 {
						store
							.store(&fp, entry(&format!("access-{writer}-{round}")).1)
							.expect("Concurrent writes through separate handles should succeed.");
					}
				})
			})
			.collect::<Vec<_>>();

		for writer in writers {
			writer.join().expect("Writer thread should not panic.");
		}

		let entries = FileStore::open(&path).entries().expect("Final cache file should parse.");

		assert!(!entries.is_empty());
		assert!(leftover_tmp_files(&path).is_empty());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache file {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_file_reports_json_path() {
		let path = temp_path("file_store_corrupt");

		fs::write(&path, br#"{"abc": {"variant": "oauth2", "endpoint": 7}}"#)
			.expect("Writing the corrupt fixture should succeed.");

		let err = FileStore::open(&path)
			.entries()
			.expect_err("Corrupt cache files must fail to parse.");

		assert!(matches!(err, StoreError::Serialization { .. }));
		assert!(err.to_string().contains("abc"), "Unexpected error: {err}");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache file {}: {e}", path.display())
		});
	}
}
