//! Trip graphs in SQLite.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{
    Accessibility, Coord, Hint, Info, Interchange, Leg, ParentStation, PathDescription, Stop,
    Transportation, Trip,
};

use super::error::StoreError;
use super::record::{Record, Stored, parse_timestamp, timestamp};
use super::schema::TRIP_SCHEMA;

const ORIGIN: &str = "origin";
const DESTINATION: &str = "destination";
const SEQUENCE: &str = "sequence";

impl Record for Trip {
    const PREFIX: &'static str = "trips-";
    const ROOT_TABLE: &'static str = "trips";
    const SCHEMA: &'static [&'static str] = TRIP_SCHEMA;

    async fn insert(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "INSERT INTO trips (rating, is_additional, interchanges) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(self.rating)
        .bind(self.is_additional)
        .bind(self.interchanges)
        .fetch_one(&mut **tx)
        .await?;
        let trip_id: i64 = row.try_get("id")?;

        for (position, leg) in self.legs.iter().enumerate() {
            insert_leg(tx, trip_id, position as i64, leg).await?;
        }

        Ok(trip_id)
    }

    async fn load_all(pool: &SqlitePool) -> Result<Vec<Stored<Self>>, StoreError> {
        let mut trips = Vec::new();
        let mut trip_index = HashMap::new();
        for row in sqlx::query("SELECT * FROM trips ORDER BY id")
            .fetch_all(pool)
            .await?
        {
            let id: i64 = row.try_get("id")?;
            trip_index.insert(id, trips.len());
            trips.push(Stored {
                id,
                value: Trip {
                    rating: row.try_get("rating")?,
                    is_additional: row.try_get("is_additional")?,
                    interchanges: row.try_get("interchanges")?,
                    legs: Vec::new(),
                },
            });
        }

        let mut legs = Vec::new();
        let mut leg_index = HashMap::new();
        for row in sqlx::query("SELECT * FROM legs ORDER BY trip_id, position")
            .fetch_all(pool)
            .await?
        {
            let id: i64 = row.try_get("id")?;
            let trip_id: i64 = row.try_get("trip_id")?;
            leg_index.insert(id, legs.len());
            legs.push((trip_id, read_leg(&row)?));
        }

        for row in sqlx::query("SELECT * FROM stops ORDER BY leg_id, position")
            .fetch_all(pool)
            .await?
        {
            let Some(leg) = owning_leg(&row, &leg_index, &mut legs)? else {
                continue;
            };
            let role: String = row.try_get("role")?;
            let stop = read_stop(&row)?;
            match role.as_str() {
                ORIGIN => leg.origin = Some(stop),
                DESTINATION => leg.destination = Some(stop),
                _ => leg.stop_sequence.push(stop),
            }
        }

        for row in sqlx::query("SELECT * FROM hints ORDER BY leg_id, position")
            .fetch_all(pool)
            .await?
        {
            if let Some(leg) = owning_leg(&row, &leg_index, &mut legs)? {
                leg.hints.push(Hint {
                    content: row.try_get("content")?,
                    provider_code: row.try_get("provider_code")?,
                    hint_type: row.try_get("hint_type")?,
                    subnet: row.try_get("subnet")?,
                });
            }
        }

        for row in sqlx::query("SELECT * FROM infos ORDER BY leg_id, position")
            .fetch_all(pool)
            .await?
        {
            if let Some(leg) = owning_leg(&row, &leg_index, &mut legs)? {
                leg.infos.push(Info {
                    priority: row.try_get("priority")?,
                    id: row.try_get("info_id")?,
                    version: row.try_get("version")?,
                    info_type: row.try_get("info_type")?,
                    url: row.try_get("url")?,
                    url_text: row.try_get("url_text")?,
                    content: row.try_get("content")?,
                    subtitle: row.try_get("subtitle")?,
                    title: row.try_get("title")?,
                    publisher: row.try_get("publisher")?,
                    properties_info_type: row.try_get("properties_info_type")?,
                    html_text: row.try_get("html_text")?,
                    sms_text: row.try_get("sms_text")?,
                });
            }
        }

        for row in sqlx::query("SELECT * FROM path_descriptions ORDER BY leg_id, position")
            .fetch_all(pool)
            .await?
        {
            if let Some(leg) = owning_leg(&row, &leg_index, &mut legs)? {
                leg.path_descriptions.push(PathDescription {
                    turn_direction: row.try_get("turn_direction")?,
                    manoeuvre: row.try_get("manoeuvre")?,
                    name: row.try_get("name")?,
                    level: row.try_get("level")?,
                    coord: read_coord(&row)?,
                    sky_direction: row.try_get("sky_direction")?,
                    duration: row.try_get("duration")?,
                    cum_duration: row.try_get("cum_duration")?,
                    distance: row.try_get("distance")?,
                    cum_distance: row.try_get("cum_distance")?,
                    from_coords_index: row.try_get("from_coords_index")?,
                    to_coords_index: row.try_get("to_coords_index")?,
                    indoor_type: row.try_get("indoor_type")?,
                });
            }
        }

        for (trip_id, leg) in legs {
            if let Some(&idx) = trip_index.get(&trip_id) {
                trips[idx].value.legs.push(leg);
            }
        }

        Ok(trips)
    }
}

async fn insert_leg(
    tx: &mut Transaction<'_, Sqlite>,
    trip_id: i64,
    position: i64,
    leg: &Leg,
) -> Result<(), StoreError> {
    let t = &leg.transportation;
    let interchange = leg.interchange.as_ref();
    let accessibility = leg.accessibility.as_ref();

    let row = sqlx::query(
        r#"
        INSERT INTO legs (
            trip_id, position, duration, is_realtime_controlled, realtime_status,
            transportation_id, transportation_name, disassembled_name, number,
            product_class, product_name, operator_id, operator_code, operator_name,
            destination_id, destination_name, destination_type,
            train_name, train_type, train_number, trip_code,
            has_interchange, interchange_desc, interchange_type, interchange_coords,
            has_accessibility, low_floor_vehicle, wheelchair_access
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(trip_id)
    .bind(position)
    .bind(leg.duration)
    .bind(leg.is_realtime_controlled)
    .bind(&leg.realtime_status)
    .bind(&t.id)
    .bind(&t.name)
    .bind(&t.disassembled_name)
    .bind(&t.number)
    .bind(t.product_class)
    .bind(&t.product_name)
    .bind(&t.operator_id)
    .bind(&t.operator_code)
    .bind(&t.operator_name)
    .bind(&t.destination_id)
    .bind(&t.destination_name)
    .bind(&t.destination_type)
    .bind(&t.train_name)
    .bind(&t.train_type)
    .bind(&t.train_number)
    .bind(t.trip_code)
    .bind(interchange.is_some())
    .bind(interchange.and_then(|i| i.desc.clone()))
    .bind(interchange.and_then(|i| i.interchange_type))
    .bind(interchange.and_then(|i| i.coords.clone()))
    .bind(accessibility.is_some())
    .bind(accessibility.and_then(|a| a.low_floor_vehicle))
    .bind(accessibility.and_then(|a| a.wheelchair_access))
    .fetch_one(&mut **tx)
    .await?;
    let leg_id: i64 = row.try_get("id")?;

    if let Some(origin) = &leg.origin {
        insert_stop(tx, leg_id, ORIGIN, 0, origin).await?;
    }
    if let Some(destination) = &leg.destination {
        insert_stop(tx, leg_id, DESTINATION, 0, destination).await?;
    }
    for (position, stop) in leg.stop_sequence.iter().enumerate() {
        insert_stop(tx, leg_id, SEQUENCE, position as i64, stop).await?;
    }

    for (position, hint) in leg.hints.iter().enumerate() {
        sqlx::query(
            "INSERT INTO hints (leg_id, position, content, provider_code, hint_type, subnet) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(leg_id)
        .bind(position as i64)
        .bind(&hint.content)
        .bind(&hint.provider_code)
        .bind(&hint.hint_type)
        .bind(&hint.subnet)
        .execute(&mut **tx)
        .await?;
    }

    for (position, info) in leg.infos.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO infos (
                leg_id, position, priority, info_id, version, info_type, url, url_text,
                content, subtitle, title, publisher, properties_info_type, html_text, sms_text
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leg_id)
        .bind(position as i64)
        .bind(&info.priority)
        .bind(&info.id)
        .bind(info.version)
        .bind(&info.info_type)
        .bind(&info.url)
        .bind(&info.url_text)
        .bind(&info.content)
        .bind(&info.subtitle)
        .bind(&info.title)
        .bind(&info.publisher)
        .bind(&info.properties_info_type)
        .bind(&info.html_text)
        .bind(&info.sms_text)
        .execute(&mut **tx)
        .await?;
    }

    for (position, path) in leg.path_descriptions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO path_descriptions (
                leg_id, position, turn_direction, manoeuvre, name, level, coord_x, coord_y,
                sky_direction, duration, cum_duration, distance, cum_distance,
                from_coords_index, to_coords_index, indoor_type
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leg_id)
        .bind(position as i64)
        .bind(&path.turn_direction)
        .bind(&path.manoeuvre)
        .bind(&path.name)
        .bind(path.level)
        .bind(path.coord.map(|c| c.x))
        .bind(path.coord.map(|c| c.y))
        .bind(path.sky_direction)
        .bind(path.duration)
        .bind(path.cum_duration)
        .bind(path.distance)
        .bind(path.cum_distance)
        .bind(path.from_coords_index)
        .bind(path.to_coords_index)
        .bind(&path.indoor_type)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn insert_stop(
    tx: &mut Transaction<'_, Sqlite>,
    leg_id: i64,
    role: &str,
    position: i64,
    stop: &Stop,
) -> Result<(), StoreError> {
    let parent = stop.parent.as_ref();
    let grandparent = stop.grandparent.as_ref();

    sqlx::query(
        r#"
        INSERT INTO stops (
            leg_id, role, position, station_id, name, disassembled_name, stop_type, point_type,
            coord_x, coord_y, level,
            has_parent, parent_id, parent_name, parent_disassembled_name, parent_type,
            has_grandparent, grandparent_id, grandparent_name, grandparent_disassembled_name,
            grandparent_type,
            arrival_planned, arrival_estimated, departure_planned, departure_estimated,
            platform, platform_name, planned_platform_name, area
        )
        VALUES (
            ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
        )
        "#,
    )
    .bind(leg_id)
    .bind(role)
    .bind(position)
    .bind(&stop.id)
    .bind(&stop.name)
    .bind(&stop.disassembled_name)
    .bind(&stop.stop_type)
    .bind(&stop.point_type)
    .bind(stop.coord.map(|c| c.x))
    .bind(stop.coord.map(|c| c.y))
    .bind(stop.level)
    .bind(parent.is_some())
    .bind(parent.and_then(|p| p.id.clone()))
    .bind(parent.and_then(|p| p.name.clone()))
    .bind(parent.and_then(|p| p.disassembled_name.clone()))
    .bind(parent.and_then(|p| p.stop_type.clone()))
    .bind(grandparent.is_some())
    .bind(grandparent.and_then(|p| p.id.clone()))
    .bind(grandparent.and_then(|p| p.name.clone()))
    .bind(grandparent.and_then(|p| p.disassembled_name.clone()))
    .bind(grandparent.and_then(|p| p.stop_type.clone()))
    .bind(timestamp(stop.arrival_planned))
    .bind(timestamp(stop.arrival_estimated))
    .bind(timestamp(stop.departure_planned))
    .bind(timestamp(stop.departure_estimated))
    .bind(&stop.platform)
    .bind(&stop.platform_name)
    .bind(&stop.planned_platform_name)
    .bind(&stop.area)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn owning_leg<'a>(
    row: &SqliteRow,
    leg_index: &HashMap<i64, usize>,
    legs: &'a mut [(i64, Leg)],
) -> Result<Option<&'a mut Leg>, StoreError> {
    let leg_id: i64 = row.try_get("leg_id")?;
    Ok(leg_index
        .get(&leg_id)
        .and_then(|&idx| legs.get_mut(idx))
        .map(|(_, leg)| leg))
}

fn read_leg(row: &SqliteRow) -> Result<Leg, StoreError> {
    let has_interchange: bool = row.try_get("has_interchange")?;
    let has_accessibility: bool = row.try_get("has_accessibility")?;

    let interchange = if has_interchange {
        Some(Interchange {
            desc: row.try_get("interchange_desc")?,
            interchange_type: row.try_get("interchange_type")?,
            coords: row.try_get("interchange_coords")?,
        })
    } else {
        None
    };

    let accessibility = if has_accessibility {
        Some(Accessibility {
            low_floor_vehicle: row.try_get("low_floor_vehicle")?,
            wheelchair_access: row.try_get("wheelchair_access")?,
        })
    } else {
        None
    };

    Ok(Leg {
        duration: row.try_get("duration")?,
        is_realtime_controlled: row.try_get("is_realtime_controlled")?,
        realtime_status: row.try_get("realtime_status")?,
        transportation: Transportation {
            id: row.try_get("transportation_id")?,
            name: row.try_get("transportation_name")?,
            disassembled_name: row.try_get("disassembled_name")?,
            number: row.try_get("number")?,
            product_class: row.try_get("product_class")?,
            product_name: row.try_get("product_name")?,
            operator_id: row.try_get("operator_id")?,
            operator_code: row.try_get("operator_code")?,
            operator_name: row.try_get("operator_name")?,
            destination_id: row.try_get("destination_id")?,
            destination_name: row.try_get("destination_name")?,
            destination_type: row.try_get("destination_type")?,
            train_name: row.try_get("train_name")?,
            train_type: row.try_get("train_type")?,
            train_number: row.try_get("train_number")?,
            trip_code: row.try_get("trip_code")?,
        },
        interchange,
        accessibility,
        ..Leg::default()
    })
}

fn read_stop(row: &SqliteRow) -> Result<Stop, StoreError> {
    Ok(Stop {
        id: row.try_get("station_id")?,
        name: row.try_get("name")?,
        disassembled_name: row.try_get("disassembled_name")?,
        stop_type: row.try_get("stop_type")?,
        point_type: row.try_get("point_type")?,
        coord: read_coord(row)?,
        level: row.try_get("level")?,
        parent: read_parent(row, "parent")?,
        grandparent: read_parent(row, "grandparent")?,
        arrival_planned: parse_timestamp(
            "stops",
            "arrival_planned",
            row.try_get("arrival_planned")?,
        )?,
        arrival_estimated: parse_timestamp(
            "stops",
            "arrival_estimated",
            row.try_get("arrival_estimated")?,
        )?,
        departure_planned: parse_timestamp(
            "stops",
            "departure_planned",
            row.try_get("departure_planned")?,
        )?,
        departure_estimated: parse_timestamp(
            "stops",
            "departure_estimated",
            row.try_get("departure_estimated")?,
        )?,
        platform: row.try_get("platform")?,
        platform_name: row.try_get("platform_name")?,
        planned_platform_name: row.try_get("planned_platform_name")?,
        area: row.try_get("area")?,
    })
}

fn read_parent(row: &SqliteRow, prefix: &str) -> Result<Option<ParentStation>, StoreError> {
    let present: bool = row.try_get(format!("has_{prefix}").as_str())?;
    if !present {
        return Ok(None);
    }

    Ok(Some(ParentStation {
        id: row.try_get(format!("{prefix}_id").as_str())?,
        name: row.try_get(format!("{prefix}_name").as_str())?,
        disassembled_name: row.try_get(format!("{prefix}_disassembled_name").as_str())?,
        stop_type: row.try_get(format!("{prefix}_type").as_str())?,
    }))
}

fn read_coord(row: &SqliteRow) -> Result<Option<Coord>, StoreError> {
    let x: Option<f64> = row.try_get("coord_x")?;
    let y: Option<f64> = row.try_get("coord_y")?;
    Ok(x.zip(y).map(|(x, y)| Coord { x, y }))
}
