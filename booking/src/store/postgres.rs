//! PostgreSQL repositories.
//!
//! Tables (see `booking/migrations`):
//!
//! - `events` (money as `*_cents BIGINT`)
//! - `reservations` (`ticket_details JSONB`, `status TEXT`, FK to `events`)
//!
//! # Example
//!
//! ```no_run
//! use billetterie::store::{EventRepository, PostgresStore};
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/billetterie").await?;
//! let store = PostgresStore::new(pool);
//! let events = store.list_events().await?;
//! # Ok(())
//! # }
//! ```

use super::{EventRepository, RepositoryError, ReservationRepository, Result};
use async_trait::async_trait;
use crate::types::{
    Event, EventDraft, EventId, Money, NewReservation, Reservation, ReservationId, ReservationStatus,
    TicketKind,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, title, description, date, time, price_cents, vip_price_cents, \
     max_participants, logo_url, address, latitude, longitude, created_at";

const RESERVATION_COLUMNS: &str = "id, event_id, first_name, last_name, email, phone, company, \
     quantity, total_price_cents, ticket_details, status, created_at";

fn database_error(context: &str, error: &sqlx::Error) -> RepositoryError {
    tracing::error!(error = %error, "{context}");
    RepositoryError::Database(format!("{context}: {error}"))
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

fn to_cents(money: Money) -> Result<i64> {
    i64::try_from(money.cents()).map_err(|_| RepositoryError::Invalid(format!("amount too large: {money}")))
}

fn from_cents(column: &str, cents: i64) -> Result<Money> {
    u64::try_from(cents)
        .map(Money::from_cents)
        .map_err(|_| RepositoryError::Decode(format!("negative {column}: {cents}")))
}

fn to_count(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| RepositoryError::Invalid(format!("count too large: {value}")))
}

fn from_count(column: &str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| RepositoryError::Decode(format!("negative {column}: {value}")))
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    date: NaiveDate,
    time: NaiveTime,
    price_cents: i64,
    vip_price_cents: Option<i64>,
    max_participants: i32,
    logo_url: Option<String>,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = RepositoryError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            date: row.date,
            time: row.time,
            price: from_cents("price_cents", row.price_cents)?,
            vip_price: row
                .vip_price_cents
                .map(|cents| from_cents("vip_price_cents", cents))
                .transpose()?,
            max_participants: from_count("max_participants", row.max_participants)?,
            logo_url: row.logo_url,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    event_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    company: Option<String>,
    quantity: i32,
    total_price_cents: i64,
    ticket_details: Json<BTreeMap<TicketKind, u32>>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = RepositoryError;

    fn try_from(row: ReservationRow) -> Result<Self> {
        Ok(Self {
            id: ReservationId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            quantity: from_count("quantity", row.quantity)?,
            total_price: from_cents("total_price_cents", row.total_price_cents)?,
            ticket_details: row.ticket_details.0,
            status: row.status.parse().map_err(RepositoryError::Decode)?,
            created_at: row.created_at,
        })
    }
}

/// Events and reservations stored in PostgreSQL.
#[derive(Clone)]
pub struct PostgresStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn write_event(&self, sql: &str, id: EventId, draft: &EventDraft) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(sql)
            .bind(id.as_uuid())
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.date)
            .bind(draft.time)
            .bind(to_cents(draft.price)?)
            .bind(draft.vip_price.map(to_cents).transpose()?)
            .bind(to_count(draft.max_participants)?)
            .bind(&draft.logo_url)
            .bind(&draft.address)
            .bind(draft.latitude)
            .bind(draft.longitude)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to save event", &e))?;

        row.map(Event::try_from).transpose()
    }
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventRepository for PostgresStore {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC, time ASC"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database_error("Failed to list events", &e))?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to load event", &e))?;

        row.map(Event::try_from).transpose()
    }

    async fn insert_event(&self, draft: EventDraft) -> Result<Event> {
        let id = EventId::new();
        let sql = format!(
            r"
            INSERT INTO events (id, title, description, date, time, price_cents, vip_price_cents,
                                max_participants, logo_url, address, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EVENT_COLUMNS}
            "
        );
        self.write_event(&sql, id, &draft)
            .await?
            .ok_or_else(|| RepositoryError::Database("insert returned no row".to_string()))
    }

    async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event> {
        let sql = format!(
            r"
            UPDATE events
            SET title = $2, description = $3, date = $4, time = $5, price_cents = $6,
                vip_price_cents = $7, max_participants = $8, logo_url = $9, address = $10,
                latitude = $11, longitude = $12
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "
        );
        self.write_event(&sql, id, &draft)
            .await?
            .ok_or_else(|| RepositoryError::event_not_found(id))
    }

    async fn delete_event(&self, id: EventId) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    RepositoryError::Conflict(format!("event {id} has reservations"))
                } else {
                    database_error("Failed to delete event", &e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::event_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Database ping failed", &e))?;
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for PostgresStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation> {
        let event_id = reservation.event_id;
        let row: ReservationRow = sqlx::query_as(&format!(
            r"
            INSERT INTO reservations (id, event_id, first_name, last_name, email, phone, company,
                                      quantity, total_price_cents, ticket_details, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {RESERVATION_COLUMNS}
            "
        ))
        .bind(ReservationId::new().as_uuid())
        .bind(event_id.as_uuid())
        .bind(&reservation.contact.first_name)
        .bind(&reservation.contact.last_name)
        .bind(&reservation.contact.email)
        .bind(&reservation.contact.phone)
        .bind(&reservation.contact.company)
        .bind(to_count(reservation.quantity)?)
        .bind(to_cents(reservation.total_price)?)
        .bind(Json(&reservation.ticket_details))
        .bind(ReservationStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepositoryError::event_not_found(event_id)
            } else {
                database_error("Failed to insert reservation", &e)
            }
        })?;

        Reservation::try_from(row)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list reservations", &e))?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let row: Option<ReservationRow> =
            sqlx::query_as(&format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to load reservation", &e))?;

        row.map(Reservation::try_from).transpose()
    }

    async fn set_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to update reservation status", &e))?;

        row.map(Reservation::try_from)
            .transpose()?
            .ok_or_else(|| RepositoryError::reservation_not_found(id))
    }
}
