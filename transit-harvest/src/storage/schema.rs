//! Table definitions.
//!
//! Every child row references its owner with `ON DELETE CASCADE`, so
//! deleting a root row removes its whole graph. Timestamps are RFC 3339
//! text; booleans are integers.

pub const TRIP_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS trips (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rating INTEGER,
        is_additional INTEGER,
        interchanges INTEGER,
        stored_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS legs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        duration INTEGER,
        is_realtime_controlled INTEGER,
        realtime_status TEXT,
        transportation_id TEXT,
        transportation_name TEXT,
        disassembled_name TEXT,
        number TEXT,
        product_class INTEGER,
        product_name TEXT,
        operator_id TEXT,
        operator_code TEXT,
        operator_name TEXT,
        destination_id TEXT,
        destination_name TEXT,
        destination_type TEXT,
        train_name TEXT,
        train_type TEXT NOT NULL,
        train_number TEXT,
        trip_code INTEGER,
        has_interchange INTEGER NOT NULL,
        interchange_desc TEXT,
        interchange_type INTEGER,
        interchange_coords TEXT,
        has_accessibility INTEGER NOT NULL,
        low_floor_vehicle INTEGER,
        wheelchair_access INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stops (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        leg_id INTEGER NOT NULL REFERENCES legs(id) ON DELETE CASCADE,
        role TEXT NOT NULL CHECK (role IN ('origin', 'destination', 'sequence')),
        position INTEGER NOT NULL,
        station_id TEXT,
        name TEXT,
        disassembled_name TEXT,
        stop_type TEXT,
        point_type TEXT,
        coord_x REAL,
        coord_y REAL,
        level INTEGER,
        has_parent INTEGER NOT NULL,
        parent_id TEXT,
        parent_name TEXT,
        parent_disassembled_name TEXT,
        parent_type TEXT,
        has_grandparent INTEGER NOT NULL,
        grandparent_id TEXT,
        grandparent_name TEXT,
        grandparent_disassembled_name TEXT,
        grandparent_type TEXT,
        arrival_planned TEXT,
        arrival_estimated TEXT,
        departure_planned TEXT,
        departure_estimated TEXT,
        platform TEXT,
        platform_name TEXT,
        planned_platform_name TEXT,
        area TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hints (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        leg_id INTEGER NOT NULL REFERENCES legs(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        content TEXT,
        provider_code TEXT,
        hint_type TEXT,
        subnet TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS infos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        leg_id INTEGER NOT NULL REFERENCES legs(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        priority TEXT,
        info_id TEXT,
        version INTEGER,
        info_type TEXT,
        url TEXT,
        url_text TEXT,
        content TEXT,
        subtitle TEXT,
        title TEXT,
        publisher TEXT,
        properties_info_type TEXT,
        html_text TEXT,
        sms_text TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS path_descriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        leg_id INTEGER NOT NULL REFERENCES legs(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        turn_direction TEXT,
        manoeuvre TEXT,
        name TEXT,
        level INTEGER,
        coord_x REAL,
        coord_y REAL,
        sky_direction INTEGER,
        duration INTEGER,
        cum_duration INTEGER,
        distance INTEGER,
        cum_distance INTEGER,
        from_coords_index INTEGER,
        to_coords_index INTEGER,
        indoor_type TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS legs_trip ON legs(trip_id)",
    "CREATE INDEX IF NOT EXISTS stops_leg ON stops(leg_id)",
    "CREATE INDEX IF NOT EXISTS hints_leg ON hints(leg_id)",
    "CREATE INDEX IF NOT EXISTS infos_leg ON infos(leg_id)",
    "CREATE INDEX IF NOT EXISTS path_descriptions_leg ON path_descriptions(leg_id)",
];

pub const DEPARTURE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS departures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        station_id TEXT NOT NULL CHECK (length(station_id) > 0),
        station_name TEXT,
        platform TEXT,
        line_id TEXT,
        line_number TEXT,
        line_name TEXT,
        direction TEXT,
        direction_id TEXT,
        operator_id TEXT,
        operator_name TEXT,
        planned TEXT NOT NULL,
        estimated TEXT,
        delay_minutes INTEGER,
        stored_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS line_infos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        departure_id INTEGER NOT NULL REFERENCES departures(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        content TEXT,
        subtitle TEXT,
        subject TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stop_infos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        departure_id INTEGER NOT NULL REFERENCES departures(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        content TEXT,
        subtitle TEXT,
        subject TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS line_infos_departure ON line_infos(departure_id)",
    "CREATE INDEX IF NOT EXISTS stop_infos_departure ON stop_infos(departure_id)",
];
