//! SQLite-backed snapshot repository.
//!
//! # Responsibility
//! - Map persons, tags, appointments and back-references onto the
//!   `persons`, `person_tags`, `appointments` and `person_appointments`
//!   tables.
//!
//! # Invariants
//! - A save replaces every row inside one immediate transaction.
//! - List order round-trips through the `position` columns.
//! - Only connections migrated to the latest schema are accepted.

use super::{RepoError, RepoResult, SnapshotRepository};
use crate::db::migrations::latest_version;
use crate::logging::STORAGE_TARGET;
use crate::model::appointment::{
    Appointment, AppointmentId, AppointmentLength, AppointmentLocation, AppointmentMessage,
    AppointmentStatus, AppointmentType,
};
use crate::model::datetime::AppointmentDateTime;
use crate::model::person::Person;
use crate::model::snapshot::Snapshot;
use crate::model::value::{Address, Email, Name, Phone, Rank, Tag};
use chrono::NaiveDateTime;
use log::{error, info};
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::BTreeSet;
use std::time::Instant;

const DB_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const REQUIRED_TABLES: [&str; 4] = ["persons", "person_tags", "appointments", "person_appointments"];

pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` is not the
    ///   latest migration version.
    /// - `MissingRequiredTable` when a snapshot table is absent.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>> {
        let started_at = Instant::now();
        let conn = &*self.conn;
        let persons = load_persons(conn)?;
        let appointments = load_appointments(conn)?;
        info!(
            target: STORAGE_TARGET,
            "event=snapshot_load module=repo status=ok backend=sqlite persons={} appointments={} duration_ms={}",
            persons.len(),
            appointments.len(),
            started_at.elapsed().as_millis()
        );

        if persons.is_empty() && appointments.is_empty() {
            return Ok(None);
        }
        Ok(Some(Snapshot {
            persons,
            appointments,
        }))
    }

    fn save_snapshot(&mut self, snapshot: &Snapshot) -> RepoResult<()> {
        let started_at = Instant::now();
        match write_snapshot(self.conn, snapshot) {
            Ok(()) => {
                info!(
                    target: STORAGE_TARGET,
                    "event=snapshot_save module=repo status=ok backend=sqlite persons={} appointments={} duration_ms={}",
                    snapshot.persons.len(),
                    snapshot.appointments.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    target: STORAGE_TARGET,
                    "event=snapshot_save module=repo status=error backend=sqlite duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn write_snapshot(conn: &mut Connection, snapshot: &Snapshot) -> RepoResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(
        "DELETE FROM person_appointments;
         DELETE FROM appointments;
         DELETE FROM person_tags;
         DELETE FROM persons;",
    )?;

    {
        let mut insert_person = tx.prepare(
            "INSERT INTO persons (position, name, phone, email, address, rank)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        )?;
        let mut insert_tag =
            tx.prepare("INSERT INTO person_tags (person_name, tag) VALUES (?1, ?2);")?;
        for (index, person) in snapshot.persons.iter().enumerate() {
            insert_person.execute(params![
                position(index),
                person.name.as_str(),
                person.phone.as_str(),
                person.email.as_ref().map(Email::as_str),
                person.address.as_ref().map(Address::as_str),
                person.rank.as_str(),
            ])?;
            for tag in &person.tags {
                insert_tag.execute(params![person.name.as_str(), tag.as_str()])?;
            }
        }

        let mut insert_appointment = tx.prepare(
            "INSERT INTO appointments (
                position,
                id,
                client_name,
                date_time,
                length_minutes,
                location,
                type,
                message,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        )?;
        for (index, appointment) in snapshot.appointments.iter().enumerate() {
            insert_appointment.execute(params![
                position(index),
                appointment.id.as_str(),
                appointment.client_name.as_str(),
                appointment
                    .date_time
                    .as_naive()
                    .format(DB_DATE_TIME_FORMAT)
                    .to_string(),
                i64::from(appointment.length.minutes()),
                appointment.location.as_str(),
                appointment.kind.as_str(),
                appointment.message.as_str(),
                appointment.status.as_str(),
            ])?;
        }

        let mut insert_link = tx.prepare(
            "INSERT INTO person_appointments (person_name, appointment_id, position)
             VALUES (?1, ?2, ?3);",
        )?;
        for person in &snapshot.persons {
            for (index, id) in person.appointment_ids.iter().enumerate() {
                insert_link.execute(params![person.name.as_str(), id.as_str(), position(index)])?;
            }
        }
    }

    tx.commit()?;
    Ok(())
}

fn load_persons(conn: &Connection) -> RepoResult<Vec<Person>> {
    let mut stmt = conn.prepare(
        "SELECT name, phone, email, address, rank
         FROM persons
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut persons = Vec::new();
    while let Some(row) = rows.next()? {
        let name = Name::parse(&row.get::<_, String>("name")?)?;
        let phone = Phone::parse(&row.get::<_, String>("phone")?)?;
        let mut person = Person::new(name, phone);
        person.email = row
            .get::<_, Option<String>>("email")?
            .map(|value| Email::parse(&value))
            .transpose()?;
        person.address = row
            .get::<_, Option<String>>("address")?
            .map(|value| Address::parse(&value))
            .transpose()?;
        person.rank = Rank::parse(&row.get::<_, String>("rank")?)?;
        person.tags = load_tags(conn, &person.name)?;
        person.appointment_ids = load_appointment_links(conn, &person.name)?;
        persons.push(person);
    }
    Ok(persons)
}

fn load_tags(conn: &Connection, name: &Name) -> RepoResult<BTreeSet<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT tag
         FROM person_tags
         WHERE person_name = ?1
         ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([name.as_str()])?;
    let mut tags = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tags.insert(Tag::parse(&row.get::<_, String>(0)?)?);
    }
    Ok(tags)
}

fn load_appointment_links(conn: &Connection, name: &Name) -> RepoResult<Vec<AppointmentId>> {
    let mut stmt = conn.prepare(
        "SELECT appointment_id
         FROM person_appointments
         WHERE person_name = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([name.as_str()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(AppointmentId::parse(&row.get::<_, String>(0)?)?);
    }
    Ok(ids)
}

fn load_appointments(conn: &Connection) -> RepoResult<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, client_name, date_time, length_minutes, location, type, message, status
         FROM appointments
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut appointments = Vec::new();
    while let Some(row) = rows.next()? {
        let id = AppointmentId::parse(&row.get::<_, String>("id")?)?;
        let client_name = Name::parse(&row.get::<_, String>("client_name")?)?;
        let date_time = parse_db_date_time(&row.get::<_, String>("date_time")?)?;
        let minutes = row.get::<_, i64>("length_minutes")?;
        let minutes = u32::try_from(minutes).map_err(|_| {
            RepoError::InvalidData(format!("invalid length_minutes `{minutes}` for {id}"))
        })?;

        let mut appointment = Appointment::new(
            id,
            client_name,
            date_time,
            AppointmentLength::from_minutes(minutes)?,
        );
        appointment.location = AppointmentLocation::parse(&row.get::<_, String>("location")?)?;
        appointment.kind = AppointmentType::parse(&row.get::<_, String>("type")?)?;
        appointment.message = AppointmentMessage::parse(&row.get::<_, String>("message")?)?;
        appointment.status = AppointmentStatus::parse(&row.get::<_, String>("status")?)?;
        appointments.push(appointment);
    }
    Ok(appointments)
}

fn parse_db_date_time(value: &str) -> RepoResult<AppointmentDateTime> {
    NaiveDateTime::parse_from_str(value, DB_DATE_TIME_FORMAT)
        .map(AppointmentDateTime::from_naive)
        .map_err(|_| RepoError::InvalidData(format!("invalid date_time `{value}`")))
}

fn position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
