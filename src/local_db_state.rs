//! LMDB-backed device store.
//!
//! A single unnamed database inside `<name>.lmdb/`, holding string keys and
//! UTF-8 string values. This is the durable [`KeyValueStore`] used on device.

use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Database, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::device_store::KeyValueStore;

pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

pub struct AppDbState {
    env: Environment,
    db: Database,
    path: PathBuf,
    closed: bool,
}

impl AppDbState {
    /// Opens (or creates) `<name>.lmdb` with the default map size.
    pub fn init(name: String) -> Result<Self, AppResponse> {
        Self::init_with_map_size(name, DEFAULT_MAP_SIZE)
    }

    pub fn init_with_map_size(name: String, map_size: usize) -> Result<Self, AppResponse> {
        if name.trim().is_empty() {
            return Err(AppResponse::BadRequest("Database name cannot be empty".to_string()));
        }

        let path = PathBuf::from(format!("{name}.lmdb"));
        fs::create_dir_all(&path)?;

        info!("Opening device store at: {}", path.display());

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.open_db(None)?;

        Ok(Self {
            env,
            db,
            path,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Flushes pending writes and marks the handle unusable. The environment
    /// itself is released when the state is dropped.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        if self.closed {
            return Ok(());
        }
        if let Err(e) = self.env.sync(true) {
            warn!("Failed to sync device store before close: {e}");
            return Err(AppResponse::from(e));
        }
        self.closed = true;
        info!("Device store at {} closed", self.path.display());
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), AppResponse> {
        if self.closed {
            return Err(AppResponse::BadRequest("Device store is closed".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for AppDbState {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        self.ensure_open()?;
        let txn = self.env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    AppResponse::StorageFailure(format!("Value for '{key}' is not UTF-8: {e}"))
                })?;
                Some(text.to_string())
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(AppResponse::from(e)),
        };
        txn.commit()?;
        debug!("get '{}' -> {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.ensure_open()?;
        if key.is_empty() {
            return Err(AppResponse::BadRequest("Key cannot be empty".to_string()));
        }
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        debug!("set '{}' ({} bytes)", key, value.len());
        Ok(())
    }
}
