use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use tally_core::{
    storage::{AssignmentUpsert, MonthFilter, StoreTables, TransactionQuery},
    BudgetStore, StoreError, StoreResult,
};
use tally_domain::{Category, CategoryGroup, MonthlyAssignment, Transaction, UserId};
use tracing::debug;
use uuid::Uuid;

pub const STORE_FILE_NAME: &str = "budget.json";
const TMP_SUFFIX: &str = "tmp";

/// Single-file JSON persistence for every user's budget records.
///
/// Writes go to a copy of the tables, which is saved to a temporary file and
/// renamed over the store file before it replaces the in-memory tables. A write
/// that fails at any step leaves both the file and memory untouched.
#[derive(Debug)]
pub struct JsonBudgetStore {
    path: PathBuf,
    tables: Mutex<StoreTables>,
}

impl JsonBudgetStore {
    /// Opens the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tables = if path.exists() {
            load_tables_from_path(&path)?
        } else {
            StoreTables::default()
        };
        debug!(
            path = %path.display(),
            transactions = tables.transactions.len(),
            "json store opened"
        );
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Opens `budget.json` inside `dir`, creating the directory when needed.
    pub fn in_dir(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Self::open(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> StoreResult<StoreTables> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreTables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("json store lock poisoned".into()))
    }

    fn read<T>(&self, view: impl FnOnce(&StoreTables) -> T) -> StoreResult<T> {
        Ok(view(&*self.lock()?))
    }

    /// Applies `change` to a copy, persists it, then swaps it in.
    fn write<T>(
        &self,
        change: impl FnOnce(&mut StoreTables) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let outcome = change(&mut next)?;
        save_tables_to_path(&next, &self.path)?;
        *guard = next;
        Ok(outcome)
    }
}

impl BudgetStore for JsonBudgetStore {
    fn category_groups(&self, user: &UserId) -> StoreResult<Vec<CategoryGroup>> {
        self.read(|tables| tables.category_groups(user))
    }

    fn categories(&self, user: &UserId) -> StoreResult<Vec<Category>> {
        self.read(|tables| tables.categories(user))
    }

    fn transactions(
        &self,
        user: &UserId,
        query: &TransactionQuery,
    ) -> StoreResult<Vec<Transaction>> {
        self.read(|tables| tables.transactions(user, query))
    }

    fn count_transactions(&self, user: &UserId, query: &TransactionQuery) -> StoreResult<usize> {
        self.read(|tables| tables.count_transactions(user, query))
    }

    fn transaction(&self, user: &UserId, id: Uuid) -> StoreResult<Option<Transaction>> {
        self.read(|tables| tables.transaction(user, id))
    }

    fn assignments(
        &self,
        user: &UserId,
        months: MonthFilter,
    ) -> StoreResult<Vec<MonthlyAssignment>> {
        self.read(|tables| tables.assignments(user, months))
    }

    fn insert_category_group(&self, group: CategoryGroup) -> StoreResult<()> {
        self.write(|tables| tables.insert_category_group(group))
    }

    fn save_category(&self, category: Category) -> StoreResult<()> {
        self.write(|tables| tables.save_category(category))
    }

    fn save_transaction(&self, transaction: Transaction) -> StoreResult<()> {
        self.write(|tables| tables.save_transaction(transaction))
    }

    fn delete_transaction(&self, user: &UserId, id: Uuid) -> StoreResult<bool> {
        // Nothing to persist when the id is unknown.
        if self.read(|tables| tables.transaction(user, id))?.is_none() {
            return Ok(false);
        }
        self.write(|tables| Ok(tables.delete_transaction(user, id)))
    }

    fn upsert_assignment(&self, upsert: AssignmentUpsert) -> StoreResult<MonthlyAssignment> {
        self.write(|tables| Ok(tables.upsert_assignment(upsert)))
    }
}

/// Saves the tables as pretty JSON at `path` via a temporary sibling file.
pub fn save_tables_to_path(tables: &StoreTables, path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_tables(tables)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_tables_from_path(path: &Path) -> StoreResult<StoreTables> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| StoreError::Serde(err.to_string()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> StoreResult<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_tables(tables: &StoreTables) -> StoreResult<String> {
    serde_json::to_string_pretty(tables).map_err(|err| StoreError::Serde(err.to_string()))
}
