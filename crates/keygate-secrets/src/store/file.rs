//! File-backed secret store
//!
//! A secrets directory holds one JSON document per owner:
//!
//! ```text
//! <root>/host.json          host secrets
//! <root>/<function>.json    secrets of one function (lowercase name)
//! ```
//!
//! Documents of any supported format version are read. Every write emits
//! the current version through a temp file and rename, then refreshes the
//! snapshot. A function document that fails to load only fails lookups of
//! that function; a bad `host.json` fails the whole snapshot. Files whose
//! stem is not a valid function name are skipped.

use super::{SecretStore, SecretsSnapshot};
use crate::error::{Result, SecretsError};
use crate::serializer::{self, SecretFormat};
use async_trait::async_trait;
use keygate_core::{FunctionSecrets, HostSecrets, Key};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const HOST_DOCUMENT: &str = "host";
const DOCUMENT_EXTENSION: &str = "json";

/// Owner of a secrets document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentKind {
    Host,
    Function(String),
}

impl DocumentKind {
    fn from_stem(stem: &str) -> Self {
        if stem.eq_ignore_ascii_case(HOST_DOCUMENT) {
            DocumentKind::Host
        } else {
            DocumentKind::Function(stem.to_lowercase())
        }
    }

    pub fn label(&self) -> String {
        match self {
            DocumentKind::Host => "host".to_string(),
            DocumentKind::Function(name) => format!("function '{}'", name),
        }
    }
}

/// Key metadata safe to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySummary {
    /// `master`, `function` or `system`
    pub scope: &'static str,
    pub name: String,
    pub is_encrypted: bool,
}

impl KeySummary {
    fn of(scope: &'static str, key: &Key) -> Self {
        Self {
            scope,
            name: key.name.clone(),
            is_encrypted: key.is_encrypted,
        }
    }
}

/// Parsed view of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub format: SecretFormat,
    pub keys: Vec<KeySummary>,
}

/// Result of inspecting one document
#[derive(Debug)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub summary: Result<DocumentSummary>,
}

impl DocumentInfo {
    pub fn is_valid(&self) -> bool {
        self.summary.is_ok()
    }
}

/// Outcome of [`FileSecretStore::upgrade_documents`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Documents rewritten in the current format, with their previous format
    pub upgraded: Vec<(PathBuf, SecretFormat)>,
    /// Documents already in the current format
    pub current: Vec<PathBuf>,
    pub dry_run: bool,
}

impl UpgradeReport {
    pub fn is_noop(&self) -> bool {
        self.upgraded.is_empty()
    }
}

enum ParsedDocument {
    Host(HostSecrets),
    Function(Vec<Key>),
}

/// Secret store reading a directory of JSON documents
pub struct FileSecretStore {
    root: PathBuf,
    snapshot: RwLock<Option<Arc<SecretsSnapshot>>>,
    /// Serializes refreshes and writes
    refresh_lock: Mutex<()>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresh_task: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn host_document_path(&self) -> PathBuf {
        self.root
            .join(format!("{}.{}", HOST_DOCUMENT, DOCUMENT_EXTENSION))
    }

    pub fn function_document_path(&self, function_name: &str) -> Result<PathBuf> {
        validate_function_name(function_name)?;
        Ok(self.root.join(format!(
            "{}.{}",
            function_name.to_lowercase(),
            DOCUMENT_EXTENSION
        )))
    }

    /// True once a snapshot is resident
    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.is_some()
    }

    /// Return the resident snapshot, loading it on first access
    pub async fn load(&self) -> Result<Arc<SecretsSnapshot>> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have loaded while we waited
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        self.reload_locked().await
    }

    /// Re-read the directory and swap in a new snapshot
    ///
    /// On failure the previous snapshot stays resident.
    pub async fn refresh(&self) -> Result<Arc<SecretsSnapshot>> {
        let _guard = self.refresh_lock.lock().await;
        self.reload_locked().await
    }

    /// Drop the resident snapshot and stop periodic refresh
    pub async fn teardown(&self) {
        if let Some(handle) = self.refresh_task.lock().await.take() {
            handle.abort();
        }

        let _guard = self.refresh_lock.lock().await;
        *self.snapshot.write().await = None;
        debug!("Secrets snapshot for {} torn down", self.root.display());
    }

    /// Refresh the snapshot on a fixed interval until teardown
    ///
    /// The task holds a weak reference and exits once the store is dropped.
    /// A previously spawned task is replaced.
    pub async fn spawn_periodic_refresh(self: &Arc<Self>, interval: Duration) {
        let store = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                if let Err(e) = store.refresh().await {
                    warn!("Periodic secrets refresh failed, keeping previous snapshot: {}", e);
                }
            }
        });

        if let Some(previous) = self.refresh_task.lock().await.replace(handle) {
            previous.abort();
        }
        info!(
            "Refreshing secrets from {} every {}s",
            self.root.display(),
            interval.as_secs()
        );
    }

    /// Persist host secrets in the current format
    pub async fn write_host_secrets(&self, secrets: &HostSecrets) -> Result<()> {
        let contents = serializer::write_host_secrets(secrets)?;
        let path = self.host_document_path();

        let _guard = self.refresh_lock.lock().await;
        write_atomic(&path, &contents).await?;
        info!("Wrote host secrets ({} keys)", secrets.key_count());
        self.reload_locked().await?;
        Ok(())
    }

    /// Persist one function's secrets in the current format
    pub async fn write_function_secrets(&self, function_name: &str, keys: &[Key]) -> Result<()> {
        let path = self.function_document_path(function_name)?;
        let contents = serializer::write_function_secrets(keys)?;

        let _guard = self.refresh_lock.lock().await;
        write_atomic(&path, &contents).await?;
        info!(
            "Wrote secrets for function '{}' ({} keys)",
            function_name.to_lowercase(),
            keys.len()
        );
        self.reload_locked().await?;
        Ok(())
    }

    /// Rewrite every document not already in the current format
    ///
    /// A malformed document aborts the upgrade before anything is written.
    pub async fn upgrade_documents(&self, dry_run: bool) -> Result<UpgradeReport> {
        let _guard = self.refresh_lock.lock().await;

        let mut report = UpgradeReport {
            dry_run,
            ..Default::default()
        };
        let mut pending = Vec::new();

        for (path, kind) in self.list_documents().await? {
            let Some(text) = read_document(&path).await? else {
                continue;
            };
            let (parsed, format) = parse_document(&kind, &text).map_err(|e| e.in_document(&path))?;

            if format.is_current() {
                report.current.push(path);
                continue;
            }

            let contents = match &parsed {
                ParsedDocument::Host(secrets) => serializer::write_host_secrets(secrets)?,
                ParsedDocument::Function(keys) => serializer::write_function_secrets(keys)?,
            };
            pending.push((path, format, contents));
        }

        for (path, format, contents) in pending {
            if dry_run {
                info!("Would upgrade {} from {}", path.display(), format);
            } else {
                write_atomic(&path, &contents).await?;
                info!(
                    "Upgraded {} from {} to {}",
                    path.display(),
                    format,
                    SecretFormat::CURRENT
                );
            }
            report.upgraded.push((path, format));
        }

        if !dry_run && !report.upgraded.is_empty() {
            self.reload_locked().await?;
        }

        Ok(report)
    }

    /// Describe every document without loading a snapshot
    ///
    /// Per-document parse failures are reported in the result; only a
    /// failure to list the directory is an error.
    pub async fn inspect(&self) -> Result<Vec<DocumentInfo>> {
        let mut documents = Vec::new();

        for (path, kind) in self.list_documents().await? {
            let summary = match read_document(&path).await {
                Ok(Some(text)) => parse_document(&kind, &text)
                    .map(|(parsed, format)| summarize(parsed, format))
                    .map_err(|e| e.in_document(&path)),
                Ok(None) => continue,
                Err(e) => Err(e),
            };
            documents.push(DocumentInfo {
                path,
                kind,
                summary,
            });
        }

        Ok(documents)
    }

    async fn reload_locked(&self) -> Result<Arc<SecretsSnapshot>> {
        let snapshot = Arc::new(self.read_snapshot().await?);
        debug!(
            "Loaded secrets snapshot from {}: {} host keys, {} functions ({} failed)",
            self.root.display(),
            snapshot.host().key_count(),
            snapshot.function_names().count(),
            snapshot.failed_functions().count()
        );

        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Read the directory into a snapshot
    ///
    /// A host document that fails to load fails the snapshot. A function
    /// document that fails is recorded against that function only.
    async fn read_snapshot(&self) -> Result<SecretsSnapshot> {
        let mut host = None;
        let mut functions = Vec::new();

        for (path, kind) in self.list_documents().await? {
            match kind {
                DocumentKind::Host => {
                    let Some(text) = read_document(&path).await? else {
                        continue;
                    };
                    let (secrets, _) =
                        serializer::read_host_secrets(&text).map_err(|e| e.in_document(&path))?;
                    if host.replace(secrets).is_some() {
                        warn!(
                            "More than one host secrets document in {}; using {}",
                            self.root.display(),
                            path.display()
                        );
                    }
                }
                DocumentKind::Function(name) => {
                    let secrets = match read_document(&path).await {
                        Ok(Some(text)) => serializer::read_function_secrets(&text)
                            .map(|(keys, _)| FunctionSecrets::new(keys))
                            .map_err(|e| e.in_document(&path)),
                        Ok(None) => continue,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = &secrets {
                        warn!("Secrets for function '{}' failed to load: {}", name, e);
                    }
                    functions.push((name, secrets));
                }
            }
        }

        if host.is_none() {
            debug!("No host secrets document in {}", self.root.display());
        }

        let mut snapshot = SecretsSnapshot::new(host.unwrap_or_default());
        for (name, secrets) in functions {
            if snapshot.insert_function(&name, secrets) {
                warn!("Function '{}' has more than one secrets document; using the last", name);
            }
        }
        Ok(snapshot)
    }

    /// Secrets documents in the root, sorted by path
    ///
    /// A missing root directory lists as empty.
    async fn list_documents(&self) -> Result<Vec<(PathBuf, DocumentKind)>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Secrets directory {} does not exist", self.root.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(SecretsError::store_unavailable(&self.root, e)),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SecretsError::store_unavailable(&self.root, e))?
        {
            let path = entry.path();
            let is_document = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
            if !is_document || !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("Skipping secrets document with non UTF-8 name: {}", path.display());
                continue;
            };
            let kind = DocumentKind::from_stem(stem);
            if let DocumentKind::Function(name) = &kind {
                if validate_function_name(name).is_err() {
                    warn!(
                        "Skipping {}: '{}' is not a valid function name",
                        path.display(),
                        stem
                    );
                    continue;
                }
            }
            documents.push((path, kind));
        }

        documents.sort();
        Ok(documents)
    }
}

impl Drop for FileSecretStore {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_task.get_mut().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn host_secrets(&self) -> Result<Arc<HostSecrets>> {
        Ok(self.load().await?.host())
    }

    async fn function_secrets(
        &self,
        function_name: &str,
    ) -> Result<Option<Arc<FunctionSecrets>>> {
        self.load().await?.function(function_name)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

fn validate_function_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.eq_ignore_ascii_case(HOST_DOCUMENT)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(SecretsError::InvalidFunctionName {
            name: name.to_string(),
        })
    }
}

/// Read a document, `None` if it vanished after listing
async fn read_document(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == ErrorKind::InvalidData => Err(SecretsError::format(format!(
            "{}: document is not valid UTF-8",
            path.display()
        ))),
        Err(e) => Err(SecretsError::store_unavailable(path, e)),
    }
}

fn parse_document(kind: &DocumentKind, text: &str) -> Result<(ParsedDocument, SecretFormat)> {
    match kind {
        DocumentKind::Host => serializer::read_host_secrets(text)
            .map(|(secrets, format)| (ParsedDocument::Host(secrets), format)),
        DocumentKind::Function(_) => serializer::read_function_secrets(text)
            .map(|(keys, format)| (ParsedDocument::Function(keys), format)),
    }
}

fn summarize(parsed: ParsedDocument, format: SecretFormat) -> DocumentSummary {
    let keys = match &parsed {
        ParsedDocument::Host(secrets) => secrets
            .master_key
            .iter()
            .map(|k| KeySummary::of("master", k))
            .chain(secrets.function_keys.iter().map(|k| KeySummary::of("function", k)))
            .chain(secrets.system_keys.iter().map(|k| KeySummary::of("system", k)))
            .collect(),
        ParsedDocument::Function(keys) => {
            keys.iter().map(|k| KeySummary::of("function", k)).collect()
        }
    };
    DocumentSummary { format, keys }
}

/// Write through a temp file in the same directory, then rename over the target
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SecretsError::store_unavailable(parent, e))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .await
        .map_err(|e| SecretsError::store_unavailable(&tmp_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| SecretsError::store_unavailable(&tmp_path, e))?;
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(SecretsError::store_unavailable(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_file(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::new(temp_dir.path().join("does-not-exist"));

        let host = store.host_secrets().await.unwrap();
        assert!(host.is_empty());
        assert!(store.function_secrets("any").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_mixed_versions() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "m", "functionKey": "f"}"#).await;
        write_file(
            &temp_dir,
            "HttpTrigger.json",
            r#"{"version": 1, "keys": [{"name": "default", "value": "fn"}]}"#,
        )
        .await;
        write_file(&temp_dir, "notes.txt", "ignored").await;

        let store = FileSecretStore::new(temp_dir.path());
        let host = store.host_secrets().await.unwrap();
        assert_eq!(host.master_key_value(), Some("m"));

        let function = store.function_secrets("httptrigger").await.unwrap().unwrap();
        assert_eq!(function.get("default"), Some("fn"));
    }

    #[tokio::test]
    async fn test_malformed_document_is_error() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", "{ not json").await;

        let store = FileSecretStore::new(temp_dir.path());
        let err = store.host_secrets().await.unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("host.json"));
        assert!(!store.is_loaded().await);
    }

    #[tokio::test]
    async fn test_malformed_function_document_is_isolated() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "m"}"#).await;
        write_file(&temp_dir, "broken.json", r#"{"key": 5}"#).await;
        write_file(&temp_dir, "echo.json", r#"{"key": "e"}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        assert_eq!(store.host_secrets().await.unwrap().master_key_value(), Some("m"));
        assert!(store.function_secrets("echo").await.unwrap().is_some());

        let err = store.function_secrets("BROKEN").await.unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("broken.json"));

        let snapshot = store.refresh().await.unwrap();
        assert_eq!(snapshot.failed_functions().count(), 1);

        write_file(&temp_dir, "broken.json", r#"{"key": "fixed"}"#).await;
        store.refresh().await.unwrap();
        let fixed = store.function_secrets("broken").await.unwrap().unwrap();
        assert_eq!(fixed.values().collect::<Vec<_>>(), vec!["fixed"]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_second_host_document_replaces_first() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "HOST.json", r#"{"masterKey": "upper"}"#).await;
        write_file(&temp_dir, "host.json", r#"{"masterKey": "lower"}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        assert_eq!(store.host_secrets().await.unwrap().master_key_value(), Some("lower"));
    }

    #[tokio::test]
    async fn test_skips_documents_with_unwritable_names() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "my.func.json", r#"{"key": "dotted"}"#).await;
        write_file(&temp_dir, "my-func.json", r#"{"key": "dashed"}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        assert!(store.function_secrets("my.func").await.unwrap().is_none());
        assert!(store.function_secrets("my-func").await.unwrap().is_some());

        let documents = store.inspect().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].kind, DocumentKind::Function("my-func".into()));
    }

    #[tokio::test]
    async fn test_write_then_read_uses_current_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::new(temp_dir.path());

        let secrets = HostSecrets::new()
            .with_master_key(Key::new("master", "m"))
            .with_system_key(Key::new("sys", "s"));
        store.write_host_secrets(&secrets).await.unwrap();

        let text = fs::read_to_string(store.host_document_path()).await.unwrap();
        let (_, format) = serializer::read_host_secrets(&text).unwrap();
        assert_eq!(format, SecretFormat::CURRENT);

        assert_eq!(*store.host_secrets().await.unwrap(), secrets);
        assert!(!temp_dir.path().join("host.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_function_secrets_normalizes_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::new(temp_dir.path());

        store
            .write_function_secrets("MyFunc", &[Key::new("default", "v")])
            .await
            .unwrap();

        assert!(temp_dir.path().join("myfunc.json").exists());
        assert!(store.function_secrets("MYFUNC").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejects_invalid_function_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::new(temp_dir.path());

        for name in ["", "host", "../escape", "a/b", "a.b"] {
            let err = store
                .write_function_secrets(name, &[Key::unnamed("v")])
                .await
                .unwrap_err();
            assert!(matches!(err, SecretsError::InvalidFunctionName { .. }), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_refresh_picks_up_changes_and_keeps_old_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "one"}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        let before = store.host_secrets().await.unwrap();

        write_file(&temp_dir, "host.json", r#"{"masterKey": "two"}"#).await;
        assert_eq!(store.host_secrets().await.unwrap().master_key_value(), Some("one"));

        store.refresh().await.unwrap();
        assert_eq!(store.host_secrets().await.unwrap().master_key_value(), Some("two"));
        assert_eq!(before.master_key_value(), Some("one"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_resident_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "one"}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        store.load().await.unwrap();

        write_file(&temp_dir, "host.json", r#"{"version": 9}"#).await;
        let err = store.refresh().await.unwrap_err();
        assert!(matches!(err, SecretsError::UnsupportedVersion { version: 9 }));

        assert_eq!(store.host_secrets().await.unwrap().master_key_value(), Some("one"));
    }

    #[tokio::test]
    async fn test_teardown_forces_reload() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "one"}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        store.load().await.unwrap();
        assert!(store.is_loaded().await);

        store.teardown().await;
        assert!(!store.is_loaded().await);

        write_file(&temp_dir, "host.json", r#"{"masterKey": "two"}"#).await;
        assert_eq!(store.host_secrets().await.unwrap().master_key_value(), Some("two"));
    }

    #[tokio::test]
    async fn test_upgrade_rewrites_legacy_documents_only() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "m", "functionKey": "f"}"#).await;
        write_file(&temp_dir, "legacy.json", r#"{"key": "old"}"#).await;
        let current = r#"{"version": 1, "keys": []}"#;
        write_file(&temp_dir, "modern.json", current).await;

        let store = FileSecretStore::new(temp_dir.path());

        let dry = store.upgrade_documents(true).await.unwrap();
        assert_eq!(dry.upgraded.len(), 2);
        let text = fs::read_to_string(temp_dir.path().join("legacy.json")).await.unwrap();
        assert_eq!(text, r#"{"key": "old"}"#);

        let report = store.upgrade_documents(false).await.unwrap();
        assert_eq!(report.upgraded.len(), 2);
        assert_eq!(report.current, vec![temp_dir.path().join("modern.json")]);
        assert!(report
            .upgraded
            .iter()
            .all(|(_, format)| *format == SecretFormat::V0));

        let text = fs::read_to_string(temp_dir.path().join("modern.json")).await.unwrap();
        assert_eq!(text, current);

        let function = store.function_secrets("legacy").await.unwrap().unwrap();
        assert_eq!(function.values().collect::<Vec<_>>(), vec!["old"]);

        assert!(store.upgrade_documents(false).await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn test_inspect_reports_each_document() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "m"}"#).await;
        write_file(&temp_dir, "broken.json", r#"{"key": 5}"#).await;

        let store = FileSecretStore::new(temp_dir.path());
        let documents = store.inspect().await.unwrap();
        assert_eq!(documents.len(), 2);

        let broken = documents
            .iter()
            .find(|d| d.kind == DocumentKind::Function("broken".into()))
            .unwrap();
        assert!(!broken.is_valid());

        let host = documents.iter().find(|d| d.kind == DocumentKind::Host).unwrap();
        let summary = host.summary.as_ref().unwrap();
        assert_eq!(summary.format, SecretFormat::V0);
        assert_eq!(summary.keys.len(), 1);
        assert_eq!(summary.keys[0].scope, "master");
    }

    #[tokio::test]
    async fn test_periodic_refresh() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "host.json", r#"{"masterKey": "one"}"#).await;

        let store = Arc::new(FileSecretStore::new(temp_dir.path()));
        store.load().await.unwrap();
        store.spawn_periodic_refresh(Duration::from_millis(20)).await;

        write_file(&temp_dir, "host.json", r#"{"masterKey": "two"}"#).await;

        let mut refreshed = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if store.host_secrets().await.unwrap().master_key_value() == Some("two") {
                refreshed = true;
                break;
            }
        }
        assert!(refreshed);

        store.teardown().await;
    }
}
