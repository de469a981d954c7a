//! Incremental analysis cache using SHA-256 for change detection.
//!
//! Diagnostics of a dump only depend on its content and on the logging
//! surface, so both are hashed: a dump whose content hash matches its cached
//! entry is not parsed again, and a cache written for a different surface is
//! discarded as a whole.
//!
//! Each dump is read once; the same bytes are hashed and, on a miss, parsed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::analyzer::TemplateAnalyzer;
use crate::diagnostic::Diagnostic;
use crate::dump::parse_dump;
use crate::error::{IoResultExt, TmplintError, TmplintResult};
use crate::surface::LoggingSurface;

/// Maximum cache file size (50MB) - prevents unbounded cache growth
const MAX_CACHE_SIZE_BYTES: usize = 50_000_000;

/// Current cache format version. Increment when cache format changes.
const CACHE_VERSION: u32 = 1;

/// Tmplint version for cache compatibility checking.
const TMPLINT_VERSION: &str = env!("CARGO_PKG_VERSION");

const CACHE_DIR: &str = ".tmplint";
const CACHE_FILE: &str = "cache.json";

/// Cached analysis result of one dump file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CachedDump {
    pub hash: String,
    pub compilation: String,
    pub call_sites: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Cache metadata for version checking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CacheMetadata {
    /// Cache format version
    pub cache_version: u32,
    /// Tmplint version that created this cache
    pub tmplint_version: String,
    /// Hash of the logging surface the diagnostics were computed against
    #[serde(default)]
    pub surface_hash: String,
    /// Timestamp when cache was created
    #[serde(default)]
    pub created_at: u64,
}

impl CacheMetadata {
    /// Create metadata for the current environment and surface.
    pub fn current(surface: &LoggingSurface) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            cache_version: CACHE_VERSION,
            tmplint_version: TMPLINT_VERSION.to_string(),
            surface_hash: surface_hash(surface),
            created_at,
        }
    }

    /// Check if this cache can be reused with `surface`.
    pub fn is_compatible(&self, surface: &LoggingSurface) -> bool {
        if self.cache_version != CACHE_VERSION {
            return false;
        }

        // Major version of tmplint must match
        let current_major = TMPLINT_VERSION.split('.').next().unwrap_or("0");
        let cached_major = self.tmplint_version.split('.').next().unwrap_or("0");

        current_major == cached_major && self.surface_hash == surface_hash(surface)
    }
}

/// The full cache model, stored as `.tmplint/cache.json`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TmplintCache {
    #[serde(default)]
    pub metadata: CacheMetadata,
    /// Maps dump path to its cached result.
    pub dumps: HashMap<String, CachedDump>,
}

/// Compute SHA-256 hash from bytes (in-memory, no I/O).
#[inline]
fn hash_bytes(bytes: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(bytes);
    format!("{:x}", sha.finalize())
}

/// Order-independent fingerprint of a logging surface.
pub fn surface_hash(surface: &LoggingSurface) -> String {
    // iter() is sorted; the separator cannot occur in a type name
    let joined = surface.iter().collect::<Vec<_>>().join("\n");
    hash_bytes(joined.as_bytes())
}

fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(CACHE_FILE)
}

/// Load the cache from `.tmplint/cache.json`.
///
/// Returns `None` if the file doesn't exist, is corrupted, or was written by
/// an incompatible version or for a different logging surface.
pub fn load_cache(root: &Path, surface: &LoggingSurface) -> Option<TmplintCache> {
    let path = cache_path(root);
    if !path.exists() {
        return None;
    }

    let text = fs::read_to_string(&path).ok()?;
    let cache: TmplintCache = match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding corrupted cache");
            return None;
        }
    };

    if !cache.metadata.is_compatible(surface) {
        info!(
            cached_version = cache.metadata.cache_version,
            cached_tmplint = %cache.metadata.tmplint_version,
            current_version = CACHE_VERSION,
            current_tmplint = TMPLINT_VERSION,
            "cache incompatible, rebuilding"
        );
        let _ = fs::remove_file(&path);
        return None;
    }

    Some(cache)
}

/// Save the cache to disk.
///
/// Writes to a uniquely named temp file and renames it into place so readers
/// never see a partial file. A cache over the size limit is dropped instead.
pub fn save_cache(root: &Path, cache: &TmplintCache) -> TmplintResult<()> {
    let dir = root.join(CACHE_DIR);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_path(&dir)?;
    }

    let path = dir.join(CACHE_FILE);
    let json = serde_json::to_string_pretty(cache)
        .map_err(|e| TmplintError::cache(format!("serialization failed: {e}")))?;

    if json.len() > MAX_CACHE_SIZE_BYTES {
        warn!(
            limit_mb = MAX_CACHE_SIZE_BYTES / 1_000_000,
            "cache exceeds size limit, clearing"
        );
        let _ = fs::remove_file(&path);
        return Ok(());
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!("{}.{}.{}.tmp", CACHE_FILE, std::process::id(), nanos));

    fs::write(&temp_path, &json).with_path(&temp_path)?;

    if let Err(e) = fs::rename(&temp_path, &path) {
        let _ = fs::remove_file(&temp_path);
        return Err(TmplintError::io(&path, e));
    }

    Ok(())
}

/// Analysis result of one dump file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpAnalysis {
    pub path: PathBuf,
    pub compilation: String,
    pub call_sites: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Served from the cache without parsing
    pub cached: bool,
}

/// Process a single dump: read, hash, check cache, analyze if needed.
fn process_dump(
    path: &Path,
    analyzer: &TemplateAnalyzer,
    old_cache: Option<&TmplintCache>,
) -> TmplintResult<(DumpAnalysis, CachedDump)> {
    let content = fs::read_to_string(path).with_path(path)?;
    let hash = hash_bytes(content.as_bytes());
    let key = path.display().to_string();

    if let Some(cached) = old_cache
        .and_then(|c| c.dumps.get(&key))
        .filter(|c| c.hash == hash)
    {
        debug!(path = %key, "cache hit");
        let analysis = DumpAnalysis {
            path: path.to_path_buf(),
            compilation: cached.compilation.clone(),
            call_sites: cached.call_sites,
            diagnostics: cached.diagnostics.clone(),
            cached: true,
        };
        return Ok((analysis, cached.clone()));
    }

    let dump = parse_dump(path, &content)?;
    let diagnostics = analyzer.analyze_all(&dump.call_sites);
    debug!(
        path = %key,
        call_sites = dump.call_sites.len(),
        diagnostics = diagnostics.len(),
        "analyzed dump"
    );

    let entry = CachedDump {
        hash,
        compilation: dump.compilation.clone(),
        call_sites: dump.call_sites.len(),
        diagnostics: diagnostics.clone(),
    };
    let analysis = DumpAnalysis {
        path: path.to_path_buf(),
        compilation: dump.compilation,
        call_sites: entry.call_sites,
        diagnostics,
        cached: false,
    };
    Ok((analysis, entry))
}

/// Analyze dumps in parallel, reusing cached results for unchanged files.
///
/// Unreadable or malformed dumps are logged and skipped; the returned cache
/// holds entries for every dump that was analyzed.
pub fn incremental_analyze(
    analyzer: &TemplateAnalyzer,
    files: &[PathBuf],
    old_cache: Option<TmplintCache>,
) -> (Vec<DumpAnalysis>, TmplintCache) {
    let results: Vec<_> = files
        .par_iter()
        .map(|file| process_dump(file, analyzer, old_cache.as_ref()))
        .collect();

    let mut analyses = Vec::with_capacity(results.len());
    let mut cache = TmplintCache {
        metadata: CacheMetadata::current(analyzer.surface()),
        dumps: HashMap::with_capacity(results.len()),
    };

    for result in results {
        match result {
            Ok((analysis, entry)) => {
                cache.dumps.insert(analysis.path.display().to_string(), entry);
                analyses.push(analysis);
            }
            Err(e) => warn!(path = ?e.path(), error = %e, "skipping dump"),
        }
    }

    (analyses, cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("tmplint_cache_tests")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn dump_with(template: &str) -> String {
        format!(
            r#"{{
  "compilation": "App",
  "call_sites": [{{
    "method": {{
      "name": "LogError",
      "declaring_type": "Microsoft.Extensions.Logging.LoggerExtensions",
      "parameters": [{{ "name": "message", "type": "string" }}]
    }},
    "arguments": [{{
      "parameter": 0,
      "value": {{
        "kind": "constant",
        "value": {{ "type": "string", "value": "{template}" }},
        "location": {{ "file": "Worker.cs", "line": 4, "column": 25 }}
      }}
    }}]
  }}]
}}"#
        )
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_bytes(b"abc"), hash_bytes(b"abc"));
        assert_ne!(hash_bytes(b"abc"), hash_bytes(b"abd"));
        assert_eq!(hash_bytes(b"").len(), 64);
    }

    #[test]
    fn test_surface_hash_ignores_insertion_order() {
        let a = LoggingSurface::from_types(["A", "B"]);
        let b = LoggingSurface::from_types(["B", "A"]);
        assert_eq!(surface_hash(&a), surface_hash(&b));
        assert_ne!(surface_hash(&a), surface_hash(&LoggingSurface::default()));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = temp_dir("round_trip");
        let surface = LoggingSurface::default();
        let mut cache = TmplintCache {
            metadata: CacheMetadata::current(&surface),
            ..Default::default()
        };
        cache.dumps.insert(
            "x.callsites.json".to_string(),
            CachedDump {
                hash: "h".to_string(),
                compilation: "X".to_string(),
                call_sites: 3,
                diagnostics: vec![],
            },
        );
        save_cache(&dir, &cache).unwrap();

        let loaded = load_cache(&dir, &surface).unwrap();
        assert_eq!(loaded.dumps, cache.dumps);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cache_for_other_surface_is_discarded() {
        let dir = temp_dir("other_surface");
        let cache = TmplintCache {
            metadata: CacheMetadata::current(&LoggingSurface::default()),
            ..Default::default()
        };
        save_cache(&dir, &cache).unwrap();

        let widened = LoggingSurface::default().with_types(["Acme.Log"]);
        assert!(load_cache(&dir, &widened).is_none());
        assert!(!cache_path(&dir).exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupted_cache_is_ignored() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(dir.join(CACHE_DIR)).unwrap();
        fs::write(cache_path(&dir), "not json").unwrap();
        assert!(load_cache(&dir, &LoggingSurface::default()).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_incremental_reuses_unchanged_dumps() {
        let dir = temp_dir("incremental");
        let a = dir.join("A.callsites.json");
        let b = dir.join("B.callsites.json");
        fs::write(&a, dump_with("{{One}")).unwrap();
        fs::write(&b, dump_with("{One}")).unwrap();
        let files = vec![a.clone(), b.clone()];
        let analyzer = TemplateAnalyzer::default();

        let (first, cache) = incremental_analyze(&analyzer, &files, None);
        assert!(first.iter().all(|r| !r.cached));
        assert_eq!(first.iter().map(|r| r.diagnostics.len()).sum::<usize>(), 1);

        fs::write(&b, dump_with("{One")).unwrap();
        let (second, _) = incremental_analyze(&analyzer, &files, Some(cache));
        let second_a = second.iter().find(|r| r.path == a).unwrap();
        let second_b = second.iter().find(|r| r.path == b).unwrap();
        assert!(second_a.cached);
        assert_eq!(second_a.diagnostics.len(), 1);
        assert!(!second_b.cached);
        assert_eq!(second_b.diagnostics[0].text, "{One");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_dump_is_skipped() {
        let dir = temp_dir("malformed");
        let good = dir.join("Good.callsites.json");
        let bad = dir.join("Bad.callsites.json");
        fs::write(&good, dump_with("}")).unwrap();
        fs::write(&bad, "{ nope").unwrap();

        let (results, cache) =
            incremental_analyze(&TemplateAnalyzer::default(), &[good.clone(), bad], None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, good);
        assert_eq!(cache.dumps.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }
}
