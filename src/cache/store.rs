// Fri Jan 30 2026 - Alex

use super::{load_cache, save_cache, CacheError, CACHE_EXTENSION};
use crate::config::Config;
use crate::model::TypeDatabase;
use crate::utils::{format_bytes, sanitize_file_name};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub process: String,
    pub module: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    pub age_hours: f64,
}

impl CacheInfo {
    pub fn formatted_size(&self) -> String {
        format_bytes(self.size)
    }

    pub fn formatted_age(&self) -> String {
        if self.age_hours < 1.0 {
            format!("{:.0} minutes ago", self.age_hours * 60.0)
        } else if self.age_hours < 24.0 {
            format!("{:.1} hours ago", self.age_hours)
        } else {
            format!("{:.1} days ago", self.age_hours / 24.0)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheValidation {
    pub path: PathBuf,
    pub exists: bool,
    pub non_empty: bool,
    pub parses: bool,
    pub type_count: usize,
    pub field_count: usize,
    pub error: Option<String>,
}

impl CacheValidation {
    pub fn is_valid(&self) -> bool {
        self.exists && self.non_empty && self.parses && self.type_count > 0
    }
}

/// Cache files in one directory, named `<process>_<module>.utd`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_dir.clone().unwrap_or_else(Self::default_dir))
    }

    /// Per-user cache location for this tool.
    pub fn default_dir() -> PathBuf {
        let base = std::env::var_os("LOCALAPPDATA")
            .or_else(|| std::env::var_os("XDG_CACHE_HOME"))
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
            .unwrap_or_else(std::env::temp_dir);
        base.join("mono-type-dumper").join("cache")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `Game.exe` + `Assembly-CSharp` gives `game_assembly-csharp.utd`.
    pub fn path_for(&self, process: &str, module: &str) -> PathBuf {
        let process = match process.len().checked_sub(4) {
            Some(idx) if process.get(idx..).is_some_and(|ext| ext.eq_ignore_ascii_case(".exe")) => {
                &process[..idx]
            }
            _ => process,
        };
        let name = format!(
            "{}_{}.{}",
            sanitize_file_name(&process.to_lowercase()),
            sanitize_file_name(&module.to_lowercase()),
            CACHE_EXTENSION
        );
        self.dir.join(name)
    }

    pub fn is_available(&self, process: &str, module: &str) -> bool {
        self.path_for(process, module).is_file()
    }

    pub fn age_hours(&self, process: &str, module: &str) -> Option<f64> {
        let modified = fs::metadata(self.path_for(process, module)).ok()?.modified().ok()?;
        Some(age_hours(modified))
    }

    /// The cached database, or `None` when the file is missing or unreadable.
    pub fn load(&self, process: &str, module: &str) -> Option<TypeDatabase> {
        let path = self.path_for(process, module);
        if !path.is_file() {
            debug!("No cache at {}", path.display());
            return None;
        }

        match load_cache(&path) {
            Ok(db) => {
                info!("Loaded {} types from {}", db.len(), path.display());
                Some(db)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, process: &str, module: &str, db: &TypeDatabase) -> Result<PathBuf, CacheError> {
        let path = self.path_for(process, module);
        save_cache(&path, db)?;
        info!("Saved {} types to {}", db.len(), path.display());
        Ok(path)
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == CACHE_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Every cache file, newest first.
    pub fn list(&self) -> Result<Vec<CacheInfo>, CacheError> {
        let mut infos = Vec::new();
        for path in self.cache_files()? {
            let metadata = fs::metadata(&path)?;
            let modified = metadata.modified()?;
            let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            let (process, module) = match stem.split_once('_') {
                Some((p, m)) => (p.to_string(), m.to_string()),
                None => (stem.clone(), "unknown".to_string()),
            };

            infos.push(CacheInfo {
                process,
                module,
                size: metadata.len(),
                modified,
                age_hours: age_hours(modified),
                path,
            });
        }
        infos.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(infos)
    }

    /// Returns `false` when there was nothing to delete.
    pub fn delete(&self, process: &str, module: &str) -> Result<bool, CacheError> {
        let path = self.path_for(process, module);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Deleted {}", path.display());
        Ok(true)
    }

    pub fn delete_all(&self) -> Result<usize, CacheError> {
        let mut deleted = 0;
        for path in self.cache_files()? {
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
            }
        }
        info!("Deleted {} cache files", deleted);
        Ok(deleted)
    }

    pub fn total_size(&self) -> Result<u64, CacheError> {
        let mut total = 0;
        for path in self.cache_files()? {
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }

    pub fn validate(&self, process: &str, module: &str) -> CacheValidation {
        Self::validate_path(&self.path_for(process, module))
    }

    pub fn validate_path(path: &Path) -> CacheValidation {
        let mut result = CacheValidation {
            path: path.to_path_buf(),
            ..Default::default()
        };

        let metadata = match fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            _ => {
                result.error = Some("cache file does not exist".to_string());
                return result;
            }
        };
        result.exists = true;
        result.non_empty = metadata.len() > 0;
        if !result.non_empty {
            result.error = Some("cache file is empty".to_string());
            return result;
        }

        match load_cache(path) {
            Ok(db) => {
                result.parses = true;
                result.type_count = db.len();
                result.field_count = db.field_count();
                if db.is_empty() {
                    result.error = Some("cache contains no types".to_string());
                }
            }
            Err(e) => result.error = Some(e.to_string()),
        }
        result
    }
}

fn age_hours(modified: SystemTime) -> f64 {
    SystemTime::now()
        .duration_since(modified)
        .map(|d| d.as_secs_f64() / 3600.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassKind, TypeDefinition};

    fn store(name: &str) -> CacheStore {
        let dir = std::env::temp_dir().join(format!("mono-type-dumper-store-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        CacheStore::new(dir)
    }

    fn db(names: &[&str]) -> TypeDatabase {
        let types = names
            .iter()
            .map(|n| TypeDefinition {
                full_name: n.to_string(),
                name: n.to_string(),
                namespace: String::new(),
                class_kind: ClassKind::Class,
                parent: None,
                interfaces: Vec::new(),
                fields: Vec::new(),
            })
            .collect();
        TypeDatabase::new(types, names.len())
    }

    #[test]
    fn test_path_convention() {
        let store = CacheStore::new(PathBuf::from("/tmp/cache"));
        assert_eq!(
            store.path_for("EscapeFromTarkov.exe", "Assembly-CSharp"),
            PathBuf::from("/tmp/cache/escapefromtarkov_assembly-csharp.utd")
        );
        assert_eq!(
            store.path_for("my:game", "Assembly-CSharp"),
            PathBuf::from("/tmp/cache/my_game_assembly-csharp.utd")
        );
    }

    #[test]
    fn test_save_list_delete() {
        let store = store("lifecycle");
        assert!(store.list().unwrap().is_empty());

        store.save("Game.exe", "Assembly-CSharp", &db(&["A", "B"])).unwrap();
        store.save("Other", "Assembly-CSharp", &db(&["C"])).unwrap();

        assert!(store.is_available("game", "Assembly-CSharp"));
        assert!(store.age_hours("game", "Assembly-CSharp").unwrap() < 1.0);
        assert_eq!(store.load("GAME.EXE", "Assembly-CSharp").unwrap().len(), 2);

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|i| i.process == "game" && i.module == "assembly-csharp"));
        assert!(store.total_size().unwrap() > 0);

        assert!(store.delete("Game.exe", "Assembly-CSharp").unwrap());
        assert!(!store.delete("Game.exe", "Assembly-CSharp").unwrap());
        assert_eq!(store.delete_all().unwrap(), 1);

        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_corrupt_cache_is_not_available() {
        let store = store("corrupt");
        let path = store.path_for("game", "Assembly-CSharp");
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(&path, "{ \"TypeDefinitions\": [ oops").unwrap();

        assert!(store.load("game", "Assembly-CSharp").is_none());
        let validation = store.validate("game", "Assembly-CSharp");
        assert!(validation.exists);
        assert!(!validation.parses);
        assert!(!validation.is_valid());

        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_validate_good_cache() {
        let store = store("validate");
        store.save("game", "Assembly-CSharp", &db(&["A"])).unwrap();

        let validation = store.validate("game", "Assembly-CSharp");
        assert!(validation.is_valid());
        assert_eq!(validation.type_count, 1);

        let _ = fs::remove_dir_all(store.dir());
    }
}
