//! Departure graphs in SQLite.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{Departure, Notice};

use super::error::StoreError;
use super::record::{Record, Stored, parse_timestamp, timestamp};
use super::schema::DEPARTURE_SCHEMA;

impl Record for Departure {
    const PREFIX: &'static str = "departures-";
    const ROOT_TABLE: &'static str = "departures";
    const SCHEMA: &'static [&'static str] = DEPARTURE_SCHEMA;

    async fn insert(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO departures (
                station_id, station_name, platform, line_id, line_number, line_name,
                direction, direction_id, operator_id, operator_name,
                planned, estimated, delay_minutes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&self.station_id)
        .bind(&self.station_name)
        .bind(&self.platform)
        .bind(&self.line_id)
        .bind(&self.line_number)
        .bind(&self.line_name)
        .bind(&self.direction)
        .bind(&self.direction_id)
        .bind(&self.operator_id)
        .bind(&self.operator_name)
        .bind(self.planned.to_rfc3339())
        .bind(timestamp(self.estimated))
        .bind(self.delay_minutes)
        .fetch_one(&mut **tx)
        .await?;
        let id: i64 = row.try_get("id")?;

        insert_notices(tx, "line_infos", id, &self.line_infos).await?;
        insert_notices(tx, "stop_infos", id, &self.stop_infos).await?;

        Ok(id)
    }

    async fn load_all(pool: &SqlitePool) -> Result<Vec<Stored<Self>>, StoreError> {
        let mut departures = Vec::new();
        let mut index = HashMap::new();

        for row in sqlx::query("SELECT * FROM departures ORDER BY id")
            .fetch_all(pool)
            .await?
        {
            let id: i64 = row.try_get("id")?;
            index.insert(id, departures.len());
            departures.push(Stored {
                id,
                value: read_departure(&row)?,
            });
        }

        for row in sqlx::query("SELECT * FROM line_infos ORDER BY departure_id, position")
            .fetch_all(pool)
            .await?
        {
            if let Some(&idx) = index.get(&row.try_get::<i64, _>("departure_id")?) {
                departures[idx].value.line_infos.push(read_notice(&row)?);
            }
        }

        for row in sqlx::query("SELECT * FROM stop_infos ORDER BY departure_id, position")
            .fetch_all(pool)
            .await?
        {
            if let Some(&idx) = index.get(&row.try_get::<i64, _>("departure_id")?) {
                departures[idx].value.stop_infos.push(read_notice(&row)?);
            }
        }

        Ok(departures)
    }
}

async fn insert_notices(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    departure_id: i64,
    notices: &[Notice],
) -> Result<(), StoreError> {
    let sql = format!(
        "INSERT INTO {table} (departure_id, position, content, subtitle, subject) \
         VALUES (?, ?, ?, ?, ?)"
    );
    for (position, notice) in notices.iter().enumerate() {
        sqlx::query(&sql)
            .bind(departure_id)
            .bind(position as i64)
            .bind(&notice.content)
            .bind(&notice.subtitle)
            .bind(&notice.subject)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn read_departure(row: &SqliteRow) -> Result<Departure, StoreError> {
    let planned: String = row.try_get("planned")?;
    let planned = parse_timestamp("departures", "planned", Some(planned))?.ok_or(
        StoreError::Corrupt {
            table: "departures",
            column: "planned",
            value: String::new(),
        },
    )?;

    Ok(Departure {
        station_id: row.try_get("station_id")?,
        station_name: row.try_get("station_name")?,
        platform: row.try_get("platform")?,
        line_id: row.try_get("line_id")?,
        line_number: row.try_get("line_number")?,
        line_name: row.try_get("line_name")?,
        direction: row.try_get("direction")?,
        direction_id: row.try_get("direction_id")?,
        operator_id: row.try_get("operator_id")?,
        operator_name: row.try_get("operator_name")?,
        planned,
        estimated: parse_timestamp("departures", "estimated", row.try_get("estimated")?)?,
        delay_minutes: row.try_get("delay_minutes")?,
        line_infos: Vec::new(),
        stop_infos: Vec::new(),
    })
}

fn read_notice(row: &SqliteRow) -> Result<Notice, StoreError> {
    Ok(Notice {
        content: row.try_get("content")?,
        subtitle: row.try_get("subtitle")?,
        subject: row.try_get("subject")?,
    })
}
