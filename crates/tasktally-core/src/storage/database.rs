//! SQLite-based storage for the ledger and the task catalog.
//!
//! Both tables are small and always handled as a whole: loads read every
//! row, saves replace every row inside one transaction.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::catalog::{Catalog, CatalogEntry};
use crate::code::TaskCode;
use crate::error::{DatabaseError, Result};
use crate::ledger::LedgerRow;

use super::data_dir;

/// SQLite database holding the encoded ledger and the catalog.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/tasktally.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("tasktally.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ledger (
                date   TEXT PRIMARY KEY,
                tasks  TEXT NOT NULL,
                ratios TEXT NOT NULL,
                total  REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS catalog (
                position INTEGER PRIMARY KEY,
                task     TEXT NOT NULL UNIQUE,
                code     TEXT NOT NULL UNIQUE,
                priority REAL NOT NULL
            );",
        )?;
        Ok(())
    }

    // ── Ledger ───────────────────────────────────────────────────────

    /// Stored ledger rows in date order.
    pub fn load_ledger_rows(&self) -> Result<Vec<LedgerRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, tasks, ratios, total FROM ledger ORDER BY date")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LedgerRow {
                    date: row.get(0)?,
                    tasks: row.get(1)?,
                    ratios: row.get(2)?,
                    total: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Replace the whole ledger table.
    pub fn save_ledger_rows(&mut self, rows: &[LedgerRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM ledger", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ledger (date, tasks, ratios, total) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(params![row.date, row.tasks, row.ratios, row.total])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Catalog ──────────────────────────────────────────────────────

    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut stmt = self
            .conn
            .prepare("SELECT task, code, priority FROM catalog ORDER BY position")?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = Vec::with_capacity(raw.len());
        for (task, code, priority) in raw {
            entries.push(CatalogEntry {
                task,
                code: TaskCode::new(code)?,
                priority,
            });
        }
        Catalog::from_entries(entries)
    }

    /// Replace the whole catalog table, keeping entry order.
    pub fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM catalog", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO catalog (position, task, code, priority) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, entry) in catalog.entries().iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    entry.task,
                    entry.code.as_str(),
                    entry.priority
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
