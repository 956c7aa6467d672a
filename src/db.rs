use anyhow::Result;
use rusqlite::Connection;

use crate::record::ClueTable;

const DB_PATH: &str = "data/cryptics.sqlite";

pub fn connect() -> Result<Connection> {
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS raw (
            id                 INTEGER PRIMARY KEY,
            source             TEXT NOT NULL,
            location           TEXT UNIQUE NOT NULL,
            content_type       TEXT NOT NULL CHECK(content_type IN ('html','json','puz')),
            content            TEXT,
            is_parsed          BOOLEAN NOT NULL DEFAULT 0,
            datetime_requested TEXT NOT NULL DEFAULT (datetime('now')),
            datetime_parsed    TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_raw_is_parsed ON raw(is_parsed);
        CREATE INDEX IF NOT EXISTS idx_raw_source ON raw(source);

        CREATE TABLE IF NOT EXISTS clues (
            id          INTEGER PRIMARY KEY,
            clue_number TEXT NOT NULL,
            clue        TEXT NOT NULL,
            answer      TEXT NOT NULL,
            definition  TEXT,
            annotation  TEXT,
            puzzle_name TEXT,
            puzzle_date TEXT,
            puzzle_url  TEXT,
            source_url  TEXT NOT NULL,
            source      TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_clues_source ON clues(source);
        CREATE INDEX IF NOT EXISTS idx_clues_source_url ON clues(source_url);
        ",
    )?;
    Ok(())
}

// ── Raw captures ──

pub struct RawPage {
    pub id: i64,
    pub source: String,
    pub location: String,
    pub content_type: String,
    pub content: String,
}

pub fn insert_raw(
    conn: &Connection,
    rows: &[(String, String, String, String)],
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO raw (source, location, content_type, content)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (source, location, content_type, content) in rows {
            count += stmt.execute(rusqlite::params![source, location, content_type, content])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn fetch_unparsed(
    conn: &Connection,
    source: Option<&str>,
    since: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<RawPage>> {
    let mut conditions = vec![
        "NOT is_parsed".to_string(),
        "content IS NOT NULL".to_string(),
    ];
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(s) = source {
        conditions.push(format!("source = ?{}", params.len() + 1));
        params.push(Box::new(s.to_string()));
    }
    if let Some(t) = since {
        conditions.push(format!("datetime_requested >= ?{}", params.len() + 1));
        params.push(Box::new(t.to_string()));
    }

    let sql = format!(
        "SELECT id, source, location, content_type, content
         FROM raw
         WHERE {}
         ORDER BY id{}",
        conditions.join(" AND "),
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(RawPage {
                id: row.get(0)?,
                source: row.get(1)?,
                location: row.get(2)?,
                content_type: row.get(3)?,
                content: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn mark_parsed(conn: &Connection, ids: &[i64]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "UPDATE raw SET is_parsed = 1, datetime_parsed = datetime('now') WHERE id = ?1",
        )?;
        for id in ids {
            stmt.execute(rusqlite::params![id])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Clues ──

pub fn insert_clues(conn: &Connection, rows: &ClueTable) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO clues
             (clue_number, clue, answer, definition, annotation,
              puzzle_name, puzzle_date, puzzle_url, source_url, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in rows {
            count += stmt.execute(rusqlite::params![
                r.clue_number, r.clue, r.answer, r.definition, r.annotation,
                r.puzzle_name, r.puzzle_date, r.puzzle_url, r.source_url, r.source,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Stats ──

pub struct SourceStats {
    pub source: String,
    pub parsed: usize,
    pub unparsed: usize,
    pub clues: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Vec<SourceStats>> {
    let mut stmt = conn.prepare(
        "SELECT r.source,
                SUM(r.is_parsed),
                SUM(NOT r.is_parsed),
                (SELECT COUNT(*) FROM clues c WHERE c.source = r.source)
         FROM raw r
         GROUP BY r.source
         ORDER BY r.source",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SourceStats {
                source: row.get(0)?,
                parsed: row.get(1)?,
                unparsed: row.get(2)?,
                clues: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
