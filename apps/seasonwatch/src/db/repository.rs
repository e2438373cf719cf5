//! Show repository: persisted tracked shows and their library seasons.
//!
//! Every method issues parameterized SQL against the borrowed connection.
//! Writes are single statements or run inside one transaction, so each call
//! is atomic on its own.

use rusqlite::{ffi, Connection, OptionalExtension, Row};

use super::models::{LibraryShow, Season, Show, ShowWithLatestSeason};
use crate::error::{AppError, Result};

/// Repository over a borrowed SQLite connection (or transaction).
pub struct ShowRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ShowRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// All tracked shows with the highest season number known locally and
    /// that season's episode count, ordered by title.
    pub fn list_with_latest_season(&self) -> Result<Vec<ShowWithLatestSeason>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.catalog_id, s.title, s.poster_path, s.created_at,
                   ls.season_number, ls.episode_count
            FROM shows s
            LEFT JOIN seasons ls
              ON ls.show_id = s.id
             AND ls.season_number = (
                 SELECT MAX(season_number) FROM seasons WHERE show_id = s.id
             )
            ORDER BY s.title COLLATE NOCASE, s.id
            "#,
        )?;

        let shows = stmt
            .query_map([], |row| {
                Ok(ShowWithLatestSeason {
                    show: map_show_row(row)?,
                    latest_library_season: row.get(5)?,
                    latest_library_episodes: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(shows)
    }

    /// Look up a show by its TMDB id.
    pub fn find_by_catalog_id(&self, catalog_id: i64) -> Result<Option<Show>> {
        let show = self
            .conn
            .query_row(
                r#"
                SELECT id, catalog_id, title, poster_path, created_at
                FROM shows WHERE catalog_id = ?1
                "#,
                [catalog_id],
                map_show_row,
            )
            .optional()?;

        Ok(show)
    }

    /// Insert a new show and return its id.
    ///
    /// Fails with [`AppError::Conflict`] when the catalog id is already
    /// tracked; the existing row is left untouched.
    pub fn insert(&self, catalog_id: i64, title: &str, poster_path: Option<&str>) -> Result<i64> {
        let result = self.conn.execute(
            "INSERT INTO shows (catalog_id, title, poster_path) VALUES (?1, ?2, ?3)",
            rusqlite::params![catalog_id, title, poster_path],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "Show with catalog id {} is already tracked",
                catalog_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a show keyed by catalog id, or update the title of the
    /// existing one. Returns the show's id either way.
    pub fn upsert_show(&self, catalog_id: i64, title: &str) -> Result<i64> {
        let id = self.conn.query_row(
            r#"
            INSERT INTO shows (catalog_id, title) VALUES (?1, ?2)
            ON CONFLICT(catalog_id) DO UPDATE SET title = excluded.title
            RETURNING id
            "#,
            rusqlite::params![catalog_id, title],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    pub fn update_title(&self, show_id: i64, title: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE shows SET title = ?1 WHERE id = ?2",
            rusqlite::params![title, show_id],
        )?;

        if updated == 0 {
            return Err(AppError::NotFound(format!("Show {} not found", show_id)));
        }
        Ok(())
    }

    /// Insert or update the episode count of one season. Idempotent.
    pub fn upsert_season(
        &self,
        show_id: i64,
        season_number: i64,
        episode_count: Option<i64>,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO seasons (show_id, season_number, episode_count)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(show_id, season_number)
            DO UPDATE SET episode_count = excluded.episode_count
            "#,
            rusqlite::params![show_id, season_number, episode_count],
        )?;
        Ok(())
    }

    /// Seasons of one show, ordered by season number.
    pub fn seasons_for_show(&self, show_id: i64) -> Result<Vec<Season>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, show_id, season_number, episode_count, created_at
            FROM seasons
            WHERE show_id = ?1
            ORDER BY season_number
            "#,
        )?;

        let seasons = stmt
            .query_map([show_id], |row| {
                Ok(Season {
                    id: row.get(0)?,
                    show_id: row.get(1)?,
                    season_number: row.get(2)?,
                    episode_count: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(seasons)
    }

    /// Delete a show together with all of its seasons.
    ///
    /// Fails with [`AppError::NotFound`] when no show has this id; nothing is
    /// deleted in that case.
    pub fn delete(&self, show_id: i64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM seasons WHERE show_id = ?1", [show_id])?;
        let deleted = tx.execute("DELETE FROM shows WHERE id = ?1", [show_id])?;

        if deleted == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::NotFound(format!("Show {} not found", show_id)));
        }

        tx.commit()?;
        Ok(())
    }

    /// Record a library series, keyed by its library id.
    pub fn upsert_library_show(
        &self,
        library_id: &str,
        catalog_id: Option<i64>,
        title: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO library_shows (library_id, catalog_id, title)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(library_id)
            DO UPDATE SET catalog_id = excluded.catalog_id, title = excluded.title
            "#,
            rusqlite::params![library_id, catalog_id, title],
        )?;
        Ok(())
    }

    pub fn list_library_shows(&self) -> Result<Vec<LibraryShow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, library_id, catalog_id, title, created_at
            FROM library_shows
            ORDER BY title COLLATE NOCASE, id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LibraryShow {
                    id: row.get(0)?,
                    library_id: row.get(1)?,
                    catalog_id: row.get(2)?,
                    title: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

fn map_show_row(row: &Row<'_>) -> rusqlite::Result<Show> {
    Ok(Show {
        id: row.get(0)?,
        catalog_id: row.get(1)?,
        title: row.get(2)?,
        poster_path: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
