use crate::archetype::ArchetypeResult;
use crate::error::StoreError;
use crate::traits::TraitVector;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub riddle_stage: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    pub id: i64,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

impl TranscriptLine {
    /// How the line shows up in the terminal history: user input is echoed
    /// with a prompt marker, replies are shown as-is.
    pub fn display(&self) -> String {
        if self.role == "user" {
            format!("> {}", self.content)
        } else {
            self.content.clone()
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub session_id: String,
    pub traits: TraitVector,
    pub archetype: String,
    pub subtype: String,
    pub updated_at: String,
}

/// SQLite-backed session store.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            -- One row per browser session
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                riddle_stage INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Terminal history, in insertion order
            CREATE TABLE IF NOT EXISTS transcript (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );

            -- Latest trait estimate per session
            CREATE TABLE IF NOT EXISTS profiles (
                session_id TEXT PRIMARY KEY,
                traits TEXT NOT NULL,
                archetype TEXT NOT NULL,
                subtype TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_transcript_session ON transcript(session_id);
            ",
        )?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&*conn)
    }

    // ============ Sessions ============

    pub fn create_session(&self, id: &str) -> Result<Session> {
        let now = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, riddle_stage, created_at, updated_at) VALUES (?1, 0, ?2, ?2)",
                params![id, now],
            )?;
            Ok(())
        })?;

        Ok(Session {
            id: id.to_string(),
            riddle_stage: 0,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        self.with_connection(|conn| {
            let session = conn
                .query_row(
                    "SELECT id, riddle_stage, created_at, updated_at FROM sessions WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(Session {
                            id: row.get(0)?,
                            riddle_stage: row.get(1)?,
                            created_at: row.get(2)?,
                            updated_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(session)
        })
    }

    /// Returns false when no such session existed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM transcript WHERE session_id = ?1", [id])?;
            tx.execute("DELETE FROM profiles WHERE session_id = ?1", [id])?;
            let removed = tx.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    // ============ Turns ============

    /// Record one exchange and advance the riddle stage.
    ///
    /// Unknown session ids are created on the fly, since the client may mint
    /// its own id. Returns the stage after the turn.
    pub fn append_turn(&self, session_id: &str, user_input: Option<&str>, reply: &str) -> Result<u32> {
        let now = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;

            tx.execute(
                "INSERT OR IGNORE INTO sessions (id, riddle_stage, created_at, updated_at) VALUES (?1, 0, ?2, ?2)",
                params![session_id, now],
            )?;

            if let Some(input) = user_input {
                tx.execute(
                    "INSERT INTO transcript (session_id, role, content, timestamp) VALUES (?1, 'user', ?2, ?3)",
                    params![session_id, input, now],
                )?;
            }
            tx.execute(
                "INSERT INTO transcript (session_id, role, content, timestamp) VALUES (?1, 'assistant', ?2, ?3)",
                params![session_id, reply, now],
            )?;

            tx.execute(
                "UPDATE sessions SET riddle_stage = riddle_stage + 1, updated_at = ?1 WHERE id = ?2",
                params![now, session_id],
            )?;

            let stage: u32 = tx.query_row(
                "SELECT riddle_stage FROM sessions WHERE id = ?1",
                [session_id],
                |row| row.get(0),
            )?;

            tx.commit()?;
            Ok(stage)
        })
    }

    pub fn get_transcript(&self, session_id: &str) -> Result<Vec<TranscriptLine>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, role, content, timestamp
                 FROM transcript
                 WHERE session_id = ?1
                 ORDER BY id ASC",
            )?;

            let lines = stmt.query_map([session_id], |row| {
                Ok(TranscriptLine {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    role: row.get(2)?,
                    content: row.get(3)?,
                    timestamp: row.get(4)?,
                })
            })?;

            Ok(lines.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    // ============ Profiles ============

    pub fn save_profile(&self, session_id: &str, traits: &TraitVector, result: &ArchetypeResult) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let traits_json = serde_json::to_string(traits)?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO profiles (session_id, traits, archetype, subtype, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![session_id, traits_json, result.base.as_str(), result.subtype, now],
            )?;
            Ok(())
        })
    }

    pub fn get_profile(&self, session_id: &str) -> Result<Option<StoredProfile>> {
        let row = self.with_connection(|conn| {
            let row = conn
                .query_row(
                    "SELECT session_id, traits, archetype, subtype, updated_at FROM profiles WHERE session_id = ?1",
                    [session_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((session_id, traits_json, archetype, subtype, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(StoredProfile {
            session_id,
            traits: TraitVector::from_json(&serde_json::from_str::<serde_json::Value>(&traits_json)?)?,
            archetype,
            subtype,
            updated_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::classify;

    #[test]
    fn test_create_and_get_session() {
        let store = Store::open_in_memory().unwrap();
        let created = store.create_session("s-1").unwrap();
        assert_eq!(created.riddle_stage, 0);

        let fetched = store.get_session("s-1").unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(store.get_session("nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_session_is_an_error() {
        let store = Store::open_in_memory().unwrap();
        store.create_session("s-1").unwrap();
        assert!(matches!(store.create_session("s-1"), Err(StoreError::Database(_))));
    }

    #[test]
    fn test_append_turn_advances_stage_and_keeps_order() {
        let store = Store::open_in_memory().unwrap();

        assert_eq!(store.append_turn("s-1", Some("look around"), "🎮 SCENE: The Shrine of Echoes").unwrap(), 1);
        assert_eq!(store.append_turn("s-1", Some("touch the bell"), "It hums.").unwrap(), 2);

        let lines: Vec<String> = store
            .get_transcript("s-1")
            .unwrap()
            .iter()
            .map(TranscriptLine::display)
            .collect();
        assert_eq!(
            lines,
            vec!["> look around", "🎮 SCENE: The Shrine of Echoes", "> touch the bell", "It hums."]
        );
        assert_eq!(store.get_session("s-1").unwrap().unwrap().riddle_stage, 2);
    }

    #[test]
    fn test_profile_round_trip_and_replace() {
        let store = Store::open_in_memory().unwrap();
        store.create_session("s-1").unwrap();
        assert!(store.get_profile("s-1").unwrap().is_none());

        let first = TraitVector::new(80.0, 30.0, 30.0, 30.0, 65.0).unwrap();
        store.save_profile("s-1", &first, &classify(&first)).unwrap();

        let second = TraitVector::neutral();
        store.save_profile("s-1", &second, &classify(&second)).unwrap();

        let stored = store.get_profile("s-1").unwrap().unwrap();
        assert_eq!(stored.traits, second);
        assert_eq!(stored.archetype, "The Wanderer");
        assert_eq!(stored.subtype, "Undefined");
    }

    #[test]
    fn test_stored_traits_are_validated_on_read() {
        let store = Store::open_in_memory().unwrap();
        store.create_session("s-1").unwrap();
        store.create_session("s-2").unwrap();

        let insert = |id: &str, traits: &str| {
            store
                .with_connection(|conn| {
                    conn.execute(
                        "INSERT INTO profiles (session_id, traits, archetype, subtype, updated_at)
                         VALUES (?1, ?2, 'The Visionary', 'Dreamer', '2026-01-01T00:00:00Z')",
                        params![id, traits],
                    )?;
                    Ok(())
                })
                .unwrap();
        };
        insert(
            "s-1",
            r#"{"Openness":150,"Conscientiousness":-3,"Extraversion":30,"Agreeableness":30,"Neuroticism":65}"#,
        );
        insert("s-2", r#"{"Openness":80}"#);

        let stored = store.get_profile("s-1").unwrap().unwrap();
        assert_eq!(stored.traits.openness(), 100.0);
        assert_eq!(stored.traits.conscientiousness(), 0.0);

        assert!(matches!(store.get_profile("s-2"), Err(StoreError::InvalidTraits(_))));
    }

    #[test]
    fn test_delete_session_removes_everything() {
        let store = Store::open_in_memory().unwrap();
        store.append_turn("s-1", Some("hi"), "hello").unwrap();
        let traits = TraitVector::neutral();
        store.save_profile("s-1", &traits, &classify(&traits)).unwrap();

        assert!(store.delete_session("s-1").unwrap());
        assert!(!store.delete_session("s-1").unwrap());
        assert!(store.get_transcript("s-1").unwrap().is_empty());
        assert!(store.get_profile("s-1").unwrap().is_none());
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("promptquest.db");
        let store = Store::open(&path).unwrap();
        store.create_session("s-1").unwrap();
        assert!(path.exists());
    }
}
