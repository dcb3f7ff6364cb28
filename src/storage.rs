use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;

use crate::error::RentifyResult;
use crate::models::User;

/// Keys of the entity collections, one JSON array per key.
pub const USERS_KEY: &str = "users";
pub const PROPERTIES_KEY: &str = "properties";
pub const UNITS_KEY: &str = "units";
pub const ASSIGNMENTS_KEY: &str = "assignments";
pub const PAYMENTS_KEY: &str = "payments";
pub const MAINTENANCE_KEY: &str = "maintenanceRequests";
pub const VACATE_NOTICES_KEY: &str = "vacateNotices";

const CURRENT_USER_KEY: &str = "currentUser";

/// Persistent key-value layer behind the entity store.
///
/// Every collection is stored whole under its own key, so a write replaces
/// the full array. There are no per-record keys, indices or transactions.
#[derive(Clone)] // Sled handles are cheap to clone
pub struct Storage {
    db: Db,
    // Trees:
    // - collections: one JSON array per entity kind
    // - session: the logged-in user
    collections: sled::Tree,
    session: sled::Tree,
}

impl Storage {
    /// Open or create the Sled database at the given path.
    pub fn open(path: &str) -> RentifyResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Throwaway in-memory database.
    pub fn temporary() -> RentifyResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> RentifyResult<Self> {
        let collections = db.open_tree("collections")?;
        let session = db.open_tree("session")?;
        Ok(Self {
            db,
            collections,
            session,
        })
    }

    /// Read the collection stored under `key`; `None` if it was never written.
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> RentifyResult<Option<Vec<T>>> {
        match self.collections.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replace the collection stored under `key`.
    pub fn save_collection<T: Serialize>(&self, key: &str, records: &[T]) -> RentifyResult<()> {
        let json_bytes = serde_json::to_vec(records)?;
        self.collections.insert(key.as_bytes(), json_bytes)?;
        Ok(())
    }

    pub fn load_current_user(&self) -> RentifyResult<Option<User>> {
        match self.session.get(CURRENT_USER_KEY.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_current_user(&self, user: &User) -> RentifyResult<()> {
        let json_bytes = serde_json::to_vec(user)?;
        self.session.insert(CURRENT_USER_KEY.as_bytes(), json_bytes)?;
        Ok(())
    }

    pub fn clear_current_user(&self) -> RentifyResult<()> {
        self.session.remove(CURRENT_USER_KEY.as_bytes())?;
        Ok(())
    }

    /// Block until pending writes hit disk.
    pub fn flush(&self) -> RentifyResult<usize> {
        Ok(self.db.flush()?)
    }
}
