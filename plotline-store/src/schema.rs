//! DDL for the plot database.
//!
//! Link columns carry no declared foreign keys: the chain engine rewrites
//! them several times per transaction and enforces referential integrity
//! itself.

use crate::error::StoreResult;
use duckdb::Connection;

const SEQUENCES_DDL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS users_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS stories_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS tag_types_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS tags_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS characters_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS plot_events_id_seq START 1;
"#;

const USERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGINT PRIMARY KEY,
    username VARCHAR NOT NULL UNIQUE,
    credential_hash VARCHAR NOT NULL,
    created_at BIGINT NOT NULL
);
"#;

const STORIES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS stories (
    id BIGINT PRIMARY KEY,
    user_id BIGINT NOT NULL,
    title VARCHAR NOT NULL,
    description TEXT,
    date_format VARCHAR,
    created_at BIGINT NOT NULL,
    modified_at BIGINT NOT NULL
);
"#;

const TAG_TYPES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS tag_types (
    id BIGINT PRIMARY KEY,
    story_id BIGINT NOT NULL,
    name VARCHAR NOT NULL
);
"#;

const TAGS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id BIGINT PRIMARY KEY,
    story_id BIGINT NOT NULL,
    tag_type_id BIGINT NOT NULL,
    name VARCHAR NOT NULL,
    color VARCHAR
);
"#;

/// Character extension, 1:1 with a tag of type "Character".
const CHARACTERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS characters (
    id BIGINT PRIMARY KEY,
    tag_id BIGINT NOT NULL UNIQUE,
    short_description VARCHAR,
    description TEXT,
    image BLOB,
    image_content_type VARCHAR
);
"#;

const PLOT_EVENTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS plot_events (
    id BIGINT PRIMARY KEY,
    story_id BIGINT NOT NULL,
    event_type VARCHAR NOT NULL,
    title VARCHAR NOT NULL,
    event_date VARCHAR,
    description TEXT,
    content TEXT,
    in_plot BOOLEAN NOT NULL DEFAULT FALSE,
    memory_ref_id BIGINT,
    prev_event_id BIGINT,
    next_event_id BIGINT,
    created_at BIGINT NOT NULL
);
"#;

const PLOT_EVENT_TAGS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS plot_event_tags (
    event_id BIGINT NOT NULL,
    tag_id BIGINT NOT NULL,
    PRIMARY KEY (event_id, tag_id)
);
"#;

/// Initialize all plot schema objects.
pub fn initialize_plot_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SEQUENCES_DDL)?;
    conn.execute_batch(USERS_DDL)?;
    conn.execute_batch(STORIES_DDL)?;
    conn.execute_batch(TAG_TYPES_DDL)?;
    conn.execute_batch(TAGS_DDL)?;
    conn.execute_batch(CHARACTERS_DDL)?;
    conn.execute_batch(PLOT_EVENTS_DDL)?;
    conn.execute_batch(PLOT_EVENT_TAGS_DDL)?;
    Ok(())
}
