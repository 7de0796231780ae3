//! SQLite persistence for submitted preferences and the generated schedule.
//!
//! A single connection sits behind a mutex. Regeneration holds that lock for
//! the whole read → compute → replace cycle and runs inside one transaction,
//! so readers never observe a half-written schedule.

pub mod db;
pub mod error;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{info, warn};

use crate::form::PreferenceSubmission;
use crate::schedule::{compute_schedule, Day, EmployeeId, Preference, Rules, Schedule, ScheduleOutcome, Shift, Slot};

pub use db::init_db;
pub use error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub created_at: String,
}

/// One persisted assignment joined with the employee's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub slot: Slot,
    pub employee_id: EmployeeId,
    pub employee_name: String,
}

#[derive(Clone)]
pub struct ScheduleStore {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Creates an employee and appends their preferences in one transaction
    pub fn submit_preferences(&self, submission: &PreferenceSubmission) -> Result<Employee> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let employee = insert_submission(&tx, submission, &Utc::now().to_rfc3339())?;
        tx.commit()?;

        info!(employee_id = %employee.id, name = %employee.name, preferences = submission.slots.len(), "preferences submitted");
        Ok(employee)
    }

    /// Stores a batch of submissions in file order; either all of them land or none do
    pub fn submit_many(&self, submissions: &[PreferenceSubmission]) -> Result<Vec<Employee>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        let employees = submissions
            .iter()
            .map(|submission| insert_submission(&tx, submission, &now))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;

        info!(employees = employees.len(), "batch of preferences submitted");
        Ok(employees)
    }

    pub fn list_employees(&self) -> Result<Vec<Employee>> {
        let conn = self.lock()?;
        read_employees(&conn)
    }

    /// All preferences in submission order
    pub fn list_preferences(&self) -> Result<Vec<Preference>> {
        let conn = self.lock()?;
        read_preferences(&conn)
    }

    /// Replaces the persisted schedule wholesale. Returns the number of rows written.
    #[cfg(test)]
    pub fn replace_schedule(&self, schedule: &Schedule) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let written = write_schedule(&tx, schedule)?;
        tx.commit()?;
        Ok(written)
    }

    /// Reads every preference, computes a fresh schedule and swaps it in
    pub fn regenerate<R: Rng + ?Sized>(&self, rules: &Rules, rng: &mut R) -> Result<ScheduleOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let roster: Vec<EmployeeId> = read_employees(&tx)?.into_iter().map(|e| e.id).collect();
        let preferences = read_preferences(&tx)?;
        let outcome = compute_schedule(&roster, &preferences, rules, rng);

        let written = write_schedule(&tx, &outcome.schedule)?;
        tx.commit()?;

        for deficit in &outcome.deficits {
            warn!(
                slot = %deficit.slot,
                assigned = deficit.assigned,
                required = deficit.required,
                "slot below minimum coverage"
            );
        }
        info!(
            employees = roster.len(),
            preferences = preferences.len(),
            assignments = written,
            deficits = outcome.deficits.len(),
            "schedule regenerated"
        );
        Ok(outcome)
    }

    /// Persisted schedule ordered by day, shift, then employee name
    pub fn load_schedule(&self) -> Result<Vec<ScheduleRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT s.employee_id, e.name, s.day, s.shift
             FROM schedule s
             JOIN employees e ON s.employee_id = e.id",
        )?;
        let raw: Vec<(i64, String, String, String)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,    // employee_id
                    row.get::<_, String>(1)?, // name
                    row.get::<_, String>(2)?, // day
                    row.get::<_, String>(3)?, // shift
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut rows = raw
            .into_iter()
            .map(|(id, name, day, shift)| -> Result<ScheduleRow> {
                Ok(ScheduleRow {
                    slot: parse_slot(&day, &shift)?,
                    employee_id: EmployeeId(id),
                    employee_name: name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        rows.sort_by(|a, b| {
            a.slot
                .cmp(&b.slot)
                .then_with(|| a.employee_name.cmp(&b.employee_name))
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        Ok(rows)
    }

    /// When the persisted schedule was written, if there is one
    pub fn generated_at(&self) -> Result<Option<String>> {
        let conn = self.lock()?;
        let at = conn.query_row("SELECT MAX(generated_at) FROM schedule", [], |row| {
            row.get::<_, Option<String>>(0)
        })?;
        Ok(at)
    }
}

/// The caller owns the surrounding transaction
fn insert_submission(conn: &Connection, submission: &PreferenceSubmission, now: &str) -> Result<Employee> {
    conn.execute(
        "INSERT INTO employees (name, created_at) VALUES (?1, ?2)",
        params![submission.name, now],
    )?;
    let id = EmployeeId(conn.last_insert_rowid());

    let mut stmt = conn.prepare_cached("INSERT INTO preferences (employee_id, day, shift) VALUES (?1, ?2, ?3)")?;
    for slot in &submission.slots {
        stmt.execute(params![id.0, slot.day.as_str(), slot.shift.as_str()])?;
    }

    Ok(Employee {
        id,
        name: submission.name.clone(),
        created_at: now.to_string(),
    })
}

fn read_employees(conn: &Connection) -> Result<Vec<Employee>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM employees ORDER BY id")?;
    let employees = stmt
        .query_map([], |row| {
            Ok(Employee {
                id: EmployeeId(row.get(0)?),
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(employees)
}

fn read_preferences(conn: &Connection) -> Result<Vec<Preference>> {
    let mut stmt = conn.prepare("SELECT employee_id, day, shift FROM preferences ORDER BY id")?;
    let raw: Vec<(i64, String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<rusqlite::Result<_>>()?;

    raw.into_iter()
        .map(|(id, day, shift)| -> Result<Preference> {
            Ok(Preference {
                employee: EmployeeId(id),
                slot: parse_slot(&day, &shift)?,
            })
        })
        .collect()
}

/// Delete-then-insert; the caller owns the surrounding transaction
fn write_schedule(conn: &Connection, schedule: &Schedule) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    conn.execute("DELETE FROM schedule", [])?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO schedule (employee_id, day, shift, generated_at) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut written = 0;
    for (slot, employee) in schedule.assignments() {
        written += stmt.execute(params![employee.0, slot.day.as_str(), slot.shift.as_str(), now])?;
    }
    Ok(written)
}

fn parse_slot(day: &str, shift: &str) -> Result<Slot> {
    let day: Day = day
        .parse()
        .map_err(|d| StoreError::Corrupt(format!("unknown day '{d}'")))?;
    let shift: Shift = shift
        .parse()
        .map_err(|s| StoreError::Corrupt(format!("unknown shift '{s}'")))?;
    Ok(Slot::new(day, shift))
}
