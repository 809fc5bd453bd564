use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalog::DEFAULT_MODEL_ID;
use crate::error::{GencliError, Result};

const CONFIG_DIR_NAME: &str = ".gencli";
const CONFIG_FILE_NAME: &str = "config.yaml";
pub const MODEL_ID_KEY: &str = "model_id";

type ConfigValues = BTreeMap<String, String>;

/// Key/value settings persisted as YAML under `<home>/.gencli/`.
///
/// The file is read at most once per instance. Two processes updating the
/// file at the same time race; the last writer wins.
#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    path: PathBuf,
    values: OnceCell<ConfigValues>,
}

impl ConfigStore {
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().ok_or(GencliError::HomeDirUnavailable)?;
        Ok(Self::in_dir(home.join(CONFIG_DIR_NAME)))
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(CONFIG_FILE_NAME);
        Self {
            dir,
            path,
            values: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a config holding the default model when none exists yet.
    pub fn initialize_if_absent(&self) -> Result<()> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "config file already present");
            return Ok(());
        }

        fs::create_dir_all(&self.dir).map_err(|source| GencliError::ConfigWrite {
            path: self.dir.clone(),
            source,
        })?;

        let mut defaults = ConfigValues::new();
        defaults.insert(MODEL_ID_KEY.to_string(), DEFAULT_MODEL_ID.to_string());
        self.write_values(&defaults)?;
        info!(path = %self.path.display(), model_id = DEFAULT_MODEL_ID, "created default config");
        Ok(())
    }

    /// Returns the stored value for `key`, or an empty string when unset.
    pub fn get(&self, key: &str) -> Result<String> {
        Ok(self.values()?.get(key).cloned().unwrap_or_default())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values()?.clone();
        values.insert(key.to_string(), value.to_string());
        self.write_values(&values)?;
        self.values = OnceCell::from(values);
        debug!(path = %self.path.display(), key, "updated config value");
        Ok(())
    }

    /// Active model identifier, never empty.
    pub fn model_id(&self) -> Result<String> {
        let model_id = self.get(MODEL_ID_KEY)?;
        if model_id.trim().is_empty() {
            warn!(
                path = %self.path.display(),
                fallback = DEFAULT_MODEL_ID,
                "config has no model_id; using default model"
            );
            return Ok(DEFAULT_MODEL_ID.to_string());
        }
        Ok(model_id)
    }

    fn values(&self) -> Result<&ConfigValues> {
        if let Some(values) = self.values.get() {
            return Ok(values);
        }
        let loaded = self.load()?;
        Ok(self.values.get_or_init(|| loaded))
    }

    fn load(&self) -> Result<ConfigValues> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "config file missing; starting empty");
                return Ok(ConfigValues::new());
            }
            Err(source) => {
                return Err(GencliError::ConfigRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(ConfigValues::new());
        }

        serde_yaml::from_str(&contents).map_err(|source| GencliError::ConfigParse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_values(&self, values: &ConfigValues) -> Result<()> {
        let yaml = serde_yaml::to_string(values).map_err(GencliError::ConfigSerialize)?;
        let tmp_path = self.path.with_extension("yaml.tmp");
        let to_write_error = |source| GencliError::ConfigWrite {
            path: self.path.clone(),
            source,
        };

        fs::write(&tmp_path, yaml).map_err(to_write_error)?;
        fs::rename(&tmp_path, &self.path).map_err(to_write_error)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{CONFIG_FILE_NAME, ConfigStore, MODEL_ID_KEY};
    use crate::catalog::DEFAULT_MODEL_ID;
    use crate::error::GencliError;

    fn temp_store() -> (TempDir, ConfigStore) {
        let home = TempDir::new().expect("temp dir should be created");
        let store = ConfigStore::in_dir(home.path().join(".gencli"));
        (home, store)
    }

    #[test]
    fn initialize_on_fresh_home_writes_default_model() {
        let (_home, store) = temp_store();

        store
            .initialize_if_absent()
            .expect("initialization should succeed");

        assert!(store.path().ends_with(CONFIG_FILE_NAME));
        assert!(store.path().exists());
        assert_eq!(
            store.get(MODEL_ID_KEY).expect("get should succeed"),
            DEFAULT_MODEL_ID
        );
    }

    #[test]
    fn initialize_is_idempotent_and_keeps_existing_values() {
        let (_home, mut store) = temp_store();
        store.initialize_if_absent().expect("first init");
        store
            .set(MODEL_ID_KEY, "gemini-1.5-pro")
            .expect("set should succeed");

        let reopened = ConfigStore::in_dir(store.path().parent().expect("config dir"));
        reopened.initialize_if_absent().expect("second init");

        assert_eq!(
            reopened.get(MODEL_ID_KEY).expect("get should succeed"),
            "gemini-1.5-pro"
        );
    }

    #[test]
    fn set_persists_across_fresh_loads() {
        let (home, mut store) = temp_store();
        store.initialize_if_absent().expect("init");

        store.set("k", "v").expect("set should succeed");

        let fresh = ConfigStore::in_dir(home.path().join(".gencli"));
        assert_eq!(fresh.get("k").expect("get should succeed"), "v");
        assert_eq!(
            fresh.get(MODEL_ID_KEY).expect("get should succeed"),
            DEFAULT_MODEL_ID
        );
    }

    #[test]
    fn set_leaves_no_temporary_file_behind() {
        let (home, mut store) = temp_store();
        store.initialize_if_absent().expect("init");
        store.set("k", "v").expect("set should succeed");

        let names: Vec<String> = fs::read_dir(home.path().join(".gencli"))
            .expect("config dir should be readable")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![CONFIG_FILE_NAME.to_string()]);
    }

    #[test]
    fn failed_set_keeps_previous_value() {
        let (home, mut store) = temp_store();
        store.initialize_if_absent().expect("init");
        store.set(MODEL_ID_KEY, "gemini-1.5-pro").expect("set should succeed");
        fs::create_dir(home.path().join(".gencli/config.yaml.tmp"))
            .expect("blocking temp path should be created");

        let err = store
            .set(MODEL_ID_KEY, "gemini-1.5-flash")
            .expect_err("write through a directory should fail");

        assert!(matches!(err, GencliError::ConfigWrite { .. }), "got {err:?}");
        assert_eq!(
            store.get(MODEL_ID_KEY).expect("get should succeed"),
            "gemini-1.5-pro"
        );
        let fresh = ConfigStore::in_dir(home.path().join(".gencli"));
        assert_eq!(
            fresh.get(MODEL_ID_KEY).expect("get should succeed"),
            "gemini-1.5-pro"
        );
    }

    #[test]
    fn get_returns_empty_string_for_unknown_key() {
        let (_home, store) = temp_store();
        store.initialize_if_absent().expect("init");
        assert_eq!(store.get("missing").expect("get should succeed"), "");
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let (home, store) = temp_store();
        let dir = home.path().join(".gencli");
        fs::create_dir_all(&dir).expect("dir");
        fs::write(dir.join(CONFIG_FILE_NAME), "model_id: [unterminated").expect("write");

        let err = store
            .get(MODEL_ID_KEY)
            .expect_err("malformed config should fail");
        assert!(matches!(err, GencliError::ConfigParse { .. }), "got {err:?}");
    }

    #[test]
    fn model_id_falls_back_to_default_when_blank() {
        let (home, store) = temp_store();
        let dir = home.path().join(".gencli");
        fs::create_dir_all(&dir).expect("dir");
        fs::write(dir.join(CONFIG_FILE_NAME), "model_id: ''\n").expect("write");

        assert_eq!(store.model_id().expect("model id"), DEFAULT_MODEL_ID);
    }

    #[test]
    fn initialize_fails_when_config_dir_is_blocked() {
        let home = tempfile::TempDir::new().expect("temp dir");
        let blocker = home.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");
        let store = ConfigStore::in_dir(blocker.join(".gencli"));

        let err = store
            .initialize_if_absent()
            .expect_err("init under a file should fail");
        assert!(matches!(err, GencliError::ConfigWrite { .. }), "got {err:?}");
    }
}
