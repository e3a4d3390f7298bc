use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Row,
};

use crate::model::{
    CalendarRelation, CalendarSummary, CalendarUpdate, Id, MeetingRelation, MeetingSummary,
    MeetingUpdate,
};
use crate::store::traits::{CalendarStore, MeetingStore};

const CALENDAR_COLUMNS: &str = "id, title, details, meetings";
const MEETING_COLUMNS: &str =
    "id, title, details, datetime, location, calendars, participants, attachments";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool, timeout })
    }

    /// Create the registry tables if they are missing
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS calendars (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                details TEXT NOT NULL DEFAULT '',
                meetings TEXT[] NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create calendars table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meetings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                details TEXT NOT NULL DEFAULT '',
                datetime TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                calendars TEXT[] NOT NULL DEFAULT '{}',
                participants TEXT[] NOT NULL DEFAULT '{}',
                attachments TEXT[] NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create meetings table")?;

        Ok(())
    }

    /// Run a query under the store timeout.
    async fn bounded<T, F>(&self, action: &str, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result.with_context(|| format!("Failed to {}", action)),
            Err(_) => Err(anyhow!(
                "Timed out after {}s trying to {}",
                self.timeout.as_secs(),
                action
            )),
        }
    }
}

fn calendar_from_row(row: &PgRow) -> CalendarSummary {
    CalendarSummary {
        id: row.get("id"),
        title: row.get("title"),
        details: row.get("details"),
        meetings: row.get("meetings"),
    }
}

fn meeting_from_row(row: &PgRow) -> MeetingSummary {
    MeetingSummary {
        id: row.get("id"),
        title: row.get("title"),
        details: row.get("details"),
        datetime: row.get("datetime"),
        location: row.get("location"),
        calendars: row.get("calendars"),
        participants: row.get("participants"),
        attachments: row.get("attachments"),
    }
}

/// `UPDATE` that appends values missing from `column`, in request order.
fn add_to_set_sql(table: &str, column: &str, returning: &str) -> String {
    format!(
        r#"
        UPDATE {table}
        SET {column} = {column} || ARRAY(
            SELECT v FROM unnest($2::text[]) WITH ORDINALITY AS t(v, ord)
            WHERE v <> ALL({column})
            ORDER BY ord
        )
        WHERE id = $1
        RETURNING {returning}
        "#
    )
}

/// `UPDATE` that drops every occurrence of the given values from `column`.
fn pull_all_sql(table: &str, column: &str, returning: &str) -> String {
    format!(
        r#"
        UPDATE {table}
        SET {column} = ARRAY(
            SELECT v FROM unnest({column}) WITH ORDINALITY AS t(v, ord)
            WHERE NOT (v = ANY($2::text[]))
            ORDER BY ord
        )
        WHERE id = $1
        RETURNING {returning}
        "#
    )
}

#[async_trait::async_trait]
impl CalendarStore for PostgresStore {
    async fn list_calendars(&self) -> Result<Vec<CalendarSummary>> {
        let sql = format!("SELECT {CALENDAR_COLUMNS} FROM calendars");
        let rows = self
            .bounded("list calendars", sqlx::query(&sql).fetch_all(&self.pool))
            .await?;

        Ok(rows.iter().map(calendar_from_row).collect())
    }

    async fn list_calendars_by_ids(&self, ids: &[Id]) -> Result<Vec<CalendarSummary>> {
        let sql = format!("SELECT {CALENDAR_COLUMNS} FROM calendars WHERE id = ANY($1)");
        let rows = self
            .bounded(
                "list calendars by ids",
                sqlx::query(&sql).bind(ids.to_vec()).fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.iter().map(calendar_from_row).collect())
    }

    async fn get_calendar(&self, id: &Id) -> Result<Option<CalendarSummary>> {
        let sql = format!("SELECT {CALENDAR_COLUMNS} FROM calendars WHERE id = $1");
        let row = self
            .bounded(
                "fetch calendar",
                sqlx::query(&sql).bind(id).fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(calendar_from_row))
    }

    async fn insert_calendar(&self, calendar: CalendarSummary) -> Result<CalendarSummary> {
        let calendar = calendar.normalized();
        let sql = format!(
            "INSERT INTO calendars ({CALENDAR_COLUMNS}) VALUES ($1, $2, $3, $4) RETURNING {CALENDAR_COLUMNS}"
        );
        let row = self
            .bounded(
                "insert calendar",
                sqlx::query(&sql)
                    .bind(&calendar.id)
                    .bind(&calendar.title)
                    .bind(&calendar.details)
                    .bind(&calendar.meetings)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(calendar_from_row(&row))
    }

    async fn update_calendar(
        &self,
        id: &Id,
        update: &CalendarUpdate,
    ) -> Result<Option<CalendarSummary>> {
        let sql = format!(
            r#"
            UPDATE calendars
            SET title = COALESCE($2, title),
                details = COALESCE($3, details)
            WHERE id = $1
            RETURNING {CALENDAR_COLUMNS}
            "#
        );
        let row = self
            .bounded(
                "update calendar",
                sqlx::query(&sql)
                    .bind(id)
                    .bind(&update.title)
                    .bind(&update.details)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(calendar_from_row))
    }

    async fn add_to_calendar(
        &self,
        id: &Id,
        relation: CalendarRelation,
        values: &[Id],
    ) -> Result<Option<CalendarSummary>> {
        let sql = add_to_set_sql("calendars", relation.field(), CALENDAR_COLUMNS);
        let values: Vec<Id> = values.iter().cloned().unique().collect();
        let row = self
            .bounded(
                "add to calendar",
                sqlx::query(&sql)
                    .bind(id)
                    .bind(values)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(calendar_from_row))
    }

    async fn remove_from_calendar(
        &self,
        id: &Id,
        relation: CalendarRelation,
        values: &[Id],
    ) -> Result<Option<CalendarSummary>> {
        let sql = pull_all_sql("calendars", relation.field(), CALENDAR_COLUMNS);
        let row = self
            .bounded(
                "remove from calendar",
                sqlx::query(&sql)
                    .bind(id)
                    .bind(values.to_vec())
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(calendar_from_row))
    }

    async fn delete_calendar(&self, id: &Id) -> Result<bool> {
        let result = self
            .bounded(
                "delete calendar",
                sqlx::query("DELETE FROM calendars WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl MeetingStore for PostgresStore {
    async fn list_meetings(&self) -> Result<Vec<MeetingSummary>> {
        let sql = format!("SELECT {MEETING_COLUMNS} FROM meetings");
        let rows = self
            .bounded("list meetings", sqlx::query(&sql).fetch_all(&self.pool))
            .await?;

        Ok(rows.iter().map(meeting_from_row).collect())
    }

    async fn list_meetings_by_ids(&self, ids: &[Id]) -> Result<Vec<MeetingSummary>> {
        let sql = format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ANY($1)");
        let rows = self
            .bounded(
                "list meetings by ids",
                sqlx::query(&sql).bind(ids.to_vec()).fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.iter().map(meeting_from_row).collect())
    }

    async fn get_meeting(&self, id: &Id) -> Result<Option<MeetingSummary>> {
        let sql = format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1");
        let row = self
            .bounded(
                "fetch meeting",
                sqlx::query(&sql).bind(id).fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(meeting_from_row))
    }

    async fn insert_meeting(&self, meeting: MeetingSummary) -> Result<MeetingSummary> {
        let meeting = meeting.normalized();
        let sql = format!(
            "INSERT INTO meetings ({MEETING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {MEETING_COLUMNS}"
        );
        let row = self
            .bounded(
                "insert meeting",
                sqlx::query(&sql)
                    .bind(&meeting.id)
                    .bind(&meeting.title)
                    .bind(&meeting.details)
                    .bind(&meeting.datetime)
                    .bind(&meeting.location)
                    .bind(&meeting.calendars)
                    .bind(&meeting.participants)
                    .bind(&meeting.attachments)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(meeting_from_row(&row))
    }

    async fn update_meeting(
        &self,
        id: &Id,
        update: &MeetingUpdate,
    ) -> Result<Option<MeetingSummary>> {
        let sql = format!(
            r#"
            UPDATE meetings
            SET title = COALESCE($2, title),
                details = COALESCE($3, details),
                location = COALESCE($4, location),
                datetime = COALESCE($5, datetime)
            WHERE id = $1
            RETURNING {MEETING_COLUMNS}
            "#
        );
        let row = self
            .bounded(
                "update meeting",
                sqlx::query(&sql)
                    .bind(id)
                    .bind(&update.title)
                    .bind(&update.details)
                    .bind(&update.location)
                    .bind(&update.datetime)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(meeting_from_row))
    }

    async fn add_to_meeting(
        &self,
        id: &Id,
        relation: MeetingRelation,
        values: &[Id],
    ) -> Result<Option<MeetingSummary>> {
        let sql = add_to_set_sql("meetings", relation.field(), MEETING_COLUMNS);
        let values: Vec<Id> = values.iter().cloned().unique().collect();
        let row = self
            .bounded(
                "add to meeting",
                sqlx::query(&sql)
                    .bind(id)
                    .bind(values)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(meeting_from_row))
    }

    async fn remove_from_meeting(
        &self,
        id: &Id,
        relation: MeetingRelation,
        values: &[Id],
    ) -> Result<Option<MeetingSummary>> {
        let sql = pull_all_sql("meetings", relation.field(), MEETING_COLUMNS);
        let row = self
            .bounded(
                "remove from meeting",
                sqlx::query(&sql)
                    .bind(id)
                    .bind(values.to_vec())
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(meeting_from_row))
    }

    async fn delete_meeting(&self, id: &Id) -> Result<bool> {
        let result = self
            .bounded(
                "delete meeting",
                sqlx::query("DELETE FROM meetings WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
