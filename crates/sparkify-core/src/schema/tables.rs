/// DDL for one table of the star schema.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub drop_sql: &'static str,
    pub create_sql: &'static str,
}

// Relationships between the fact and dimension tables are soft: there are
// no declared foreign keys, so tables can be created and dropped in any
// order. Rows are linked only by the lookup done at load time.

const SONGPLAYS: TableDef = TableDef {
    name: "songplays",
    columns: &[
        "start_time",
        "user_id",
        "level",
        "song_id",
        "artist_id",
        "session_id",
        "location",
        "user_agent",
    ],
    drop_sql: "DROP TABLE IF EXISTS songplays",
    create_sql: r#"
CREATE TABLE IF NOT EXISTS songplays (
    start_time TEXT NOT NULL,
    user_id INTEGER NOT NULL,
    level TEXT,
    song_id TEXT,
    artist_id TEXT,
    session_id INTEGER,
    location TEXT,
    user_agent TEXT,
    PRIMARY KEY (start_time, user_id)
)"#,
};

const USERS: TableDef = TableDef {
    name: "users",
    columns: &["user_id", "first_name", "last_name", "gender", "level"],
    drop_sql: "DROP TABLE IF EXISTS users",
    create_sql: r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    gender TEXT,
    level TEXT
)"#,
};

const SONGS: TableDef = TableDef {
    name: "songs",
    columns: &["song_id", "title", "artist_id", "year", "duration"],
    drop_sql: "DROP TABLE IF EXISTS songs",
    create_sql: r#"
CREATE TABLE IF NOT EXISTS songs (
    song_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    artist_id TEXT,
    year INTEGER,
    duration REAL
);

CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title)"#,
};

const ARTISTS: TableDef = TableDef {
    name: "artists",
    columns: &["artist_id", "name", "location", "latitude", "longitude"],
    drop_sql: "DROP TABLE IF EXISTS artists",
    create_sql: r#"
CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT,
    latitude REAL,
    longitude REAL
);

CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name)"#,
};

const TIME: TableDef = TableDef {
    name: "time",
    columns: &["start_time", "hour", "day", "week", "month", "year", "weekday"],
    drop_sql: "DROP TABLE IF EXISTS time",
    create_sql: r#"
CREATE TABLE IF NOT EXISTS time (
    start_time TEXT PRIMARY KEY,
    hour INTEGER,
    day INTEGER,
    week INTEGER,
    month INTEGER,
    year INTEGER,
    weekday INTEGER
)"#,
};

/// Every table, in the order drops and creates are issued.
pub const TABLES: &[TableDef] = &[SONGPLAYS, USERS, SONGS, ARTISTS, TIME];

/// Look up a table definition by name.
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}
