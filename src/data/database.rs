//! SQLite storage for historical match statistics
//!
//! Every query opens its own connection and releases it when the call
//! returns, on success and error paths alike. There is no caching: identical
//! fixture lookups hit the database every time.

use crate::{Result, TeamId, UpsBetError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ToSql};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Statistic columns averaged for the goals model.
pub const RESULT_STAT_COLUMNS: [&str; 33] = [
    "ataques_visitante",
    "intentos_a_porteria_local",
    "fuera_de_juego_local",
    "posesion_local",
    "corners_visitante",
    "corners_local",
    "tarjetas_amarillas_totales",
    "ataques_peligrosos_local",
    "ataques_local",
    "faltas_local",
    "posesion_visitante",
    "atajadas_visitante",
    "intentos_a_porteria_visitante",
    "tiros_fuera_visitante",
    "tarjetas_rojas_visitante",
    "ataques_peligrosos_visitante",
    "tarjetas_rojas_totales",
    "tarjetas_rojas_local",
    "tarjetas_amarillas_local",
    "faltas_visitante",
    "faltas_totales",
    "tiros_fuera_local",
    "tarjetas_totales",
    "tarjetas_amarillas_visitante",
    "tiros_esquina_totales",
    "penales_visitante",
    "tiros_a_puerta_visitante",
    "tiros_bloqueados_visitante",
    "tiros_a_puerta_local",
    "fuera_de_juego_visitante",
    "tiros_bloqueados_local",
    "atajadas_local",
    "penales_local",
];

/// Engineered columns averaged for the corners model, in model input order.
pub const CORNER_STAT_COLUMNS: [&str; 16] = [
    "consistencia_corners_local",
    "corners_por_ataque_peligroso",
    "corners_vs_rival_hist",
    "diff_corners_equipo",
    "diff_corners_local",
    "diff_corners_visitante",
    "diff_last3_vs_last5_local",
    "diff_last3_vs_last5_visitante",
    "last3_vs_media_liga",
    "local_avg_last3",
    "local_avg_last5",
    "local_corner_category",
    "tiros_bloqueados_local",
    "visitante_avg_last3",
    "visitante_avg_last5",
    "visitante_corner_category",
];

/// Row-averaged statistics for a fixture, plus the number of matches that
/// went into the average. Computed on demand, never persisted.
#[derive(Debug, Clone)]
pub struct AggregateRecord {
    stats: HashMap<String, Option<f64>>,
    pub matches: i64,
}

impl AggregateRecord {
    /// Averaged value for a statistic, `None` when the column is missing or
    /// had no non-null values.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.stats.get(name).copied().flatten()
    }
}

/// One head-to-head result row, field names matching the table columns.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadToHeadMatch {
    pub posesion_local: f64,
    pub posesion_visitante: f64,
    pub corners_local: f64,
    pub corners_visitante: f64,
    pub goles_local: f64,
    pub goles_visitante: f64,
    pub tarjetas_totales: f64,
    pub resultado_1x2: i64,
}

/// Row counts per table, for the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub results: i64,
    pub corners: i64,
    pub head_to_head: i64,
}

/// Database handle. Holds only the path; every operation opens a dedicated
/// connection scoped to the call.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database { path };
        let conn = db.connect()?;
        init_schema(&conn)?;
        Ok(db)
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Row-count-weighted averages of the result statistics for a fixture,
    /// restricted to matches strictly before `cutoff` when given.
    ///
    /// Falls back to the mirrored fixture when no direct history exists; the
    /// mirrored query runs only when the direct match count is zero. Returns
    /// `None` when neither direction has history, a distinct outcome rather
    /// than an error.
    pub fn result_averages(
        &self,
        home: TeamId,
        away: TeamId,
        cutoff: Option<NaiveDate>,
    ) -> Result<Option<AggregateRecord>> {
        let conn = self.connect()?;
        if let Some(record) = fixture_averages(
            &conn,
            "ganador_resultado_tabla",
            &RESULT_STAT_COLUMNS,
            home,
            away,
            cutoff,
        )? {
            return Ok(Some(record));
        }
        fixture_averages(
            &conn,
            "ganador_resultado_tabla",
            &RESULT_STAT_COLUMNS,
            away,
            home,
            cutoff,
        )
    }

    /// Averages of the engineered corner features for a fixture, direct then
    /// mirrored. The corners pipeline carries no cutoff date.
    pub fn corner_averages(&self, home: TeamId, away: TeamId) -> Result<Option<AggregateRecord>> {
        let conn = self.connect()?;
        if let Some(record) =
            fixture_averages(&conn, "corners_tabla", &CORNER_STAT_COLUMNS, home, away, None)?
        {
            return Ok(Some(record));
        }
        fixture_averages(&conn, "corners_tabla", &CORNER_STAT_COLUMNS, away, home, None)
    }

    /// All head-to-head result rows between two teams, in either direction.
    pub fn head_to_head(&self, home: TeamId, away: TeamId) -> Result<Vec<HeadToHeadMatch>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT posesion_local, posesion_visitante, corners_local, corners_visitante, \
                    goles_local, goles_visitante, tarjetas_totales, resultado_1x2 \
             FROM resultado_historico_tabla \
             WHERE (equipo_local_id = ?1 AND equipo_visitante_id = ?2) \
                OR (equipo_local_id = ?2 AND equipo_visitante_id = ?1)",
        )?;
        let rows = stmt.query_map(params![home.0, away.0], |row| {
            Ok(HeadToHeadMatch {
                posesion_local: row.get(0)?,
                posesion_visitante: row.get(1)?,
                corners_local: row.get(2)?,
                corners_visitante: row.get(3)?,
                goles_local: row.get(4)?,
                goles_visitante: row.get(5)?,
                tarjetas_totales: row.get(6)?,
                resultado_1x2: row.get(7)?,
            })
        })?;
        let matches = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    /// Insert a per-match result statistics row. Columns not listed are
    /// stored as NULL.
    pub fn insert_result_row(
        &self,
        home: TeamId,
        away: TeamId,
        fecha: NaiveDate,
        stats: &[(&str, f64)],
    ) -> Result<()> {
        self.insert_stats_row(
            "ganador_resultado_tabla",
            &RESULT_STAT_COLUMNS,
            home,
            away,
            fecha,
            stats,
        )
    }

    /// Insert an engineered corner-features row. Columns not listed are
    /// stored as NULL.
    pub fn insert_corner_row(
        &self,
        home: TeamId,
        away: TeamId,
        fecha: NaiveDate,
        stats: &[(&str, f64)],
    ) -> Result<()> {
        self.insert_stats_row("corners_tabla", &CORNER_STAT_COLUMNS, home, away, fecha, stats)
    }

    /// Insert a head-to-head result row.
    pub fn insert_head_to_head_row(
        &self,
        home: TeamId,
        away: TeamId,
        fecha: NaiveDate,
        record: &HeadToHeadMatch,
    ) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO resultado_historico_tabla \
             (equipo_local_id, equipo_visitante_id, fecha, posesion_local, posesion_visitante, \
              corners_local, corners_visitante, goles_local, goles_visitante, \
              tarjetas_totales, resultado_1x2) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                home.0,
                away.0,
                fecha.format("%Y-%m-%d").to_string(),
                record.posesion_local,
                record.posesion_visitante,
                record.corners_local,
                record.corners_visitante,
                record.goles_local,
                record.goles_visitante,
                record.tarjetas_totales,
                record.resultado_1x2,
            ],
        )?;
        Ok(())
    }

    /// Row counts for all three tables.
    pub fn table_counts(&self) -> Result<TableCounts> {
        let conn = self.connect()?;
        let count = |table: &str| -> Result<i64> {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        };
        Ok(TableCounts {
            results: count("ganador_resultado_tabla")?,
            corners: count("corners_tabla")?,
            head_to_head: count("resultado_historico_tabla")?,
        })
    }

    fn insert_stats_row(
        &self,
        table: &str,
        allowed: &[&str],
        home: TeamId,
        away: TeamId,
        fecha: NaiveDate,
        stats: &[(&str, f64)],
    ) -> Result<()> {
        for (name, _) in stats {
            if !allowed.contains(name) {
                return Err(UpsBetError::UnknownColumn((*name).to_string()));
            }
        }

        let mut columns = vec!["equipo_local_id", "equipo_visitante_id", "fecha"];
        columns.extend(stats.iter().map(|(name, _)| *name));
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );

        let fecha = fecha.format("%Y-%m-%d").to_string();
        let mut values: Vec<&dyn ToSql> = vec![&home.0, &away.0, &fecha];
        for (_, value) in stats {
            values.push(value);
        }

        let conn = self.connect()?;
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
    }
}

/// Create the three tables if they do not exist. Schema ownership is
/// external; this DDL mirrors it for local use and tests.
fn init_schema(conn: &Connection) -> Result<()> {
    let result_cols = RESULT_STAT_COLUMNS
        .iter()
        .map(|c| format!("{c} REAL"))
        .collect::<Vec<_>>()
        .join(",\n            ");
    let corner_cols = CORNER_STAT_COLUMNS
        .iter()
        .map(|c| format!("{c} REAL"))
        .collect::<Vec<_>>()
        .join(",\n            ");

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS ganador_resultado_tabla (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipo_local_id INTEGER NOT NULL,
            equipo_visitante_id INTEGER NOT NULL,
            fecha TEXT NOT NULL,
            {result_cols}
        );

        CREATE TABLE IF NOT EXISTS corners_tabla (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipo_local_id INTEGER NOT NULL,
            equipo_visitante_id INTEGER NOT NULL,
            fecha TEXT NOT NULL,
            {corner_cols}
        );

        CREATE TABLE IF NOT EXISTS resultado_historico_tabla (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipo_local_id INTEGER NOT NULL,
            equipo_visitante_id INTEGER NOT NULL,
            fecha TEXT NOT NULL,
            posesion_local REAL NOT NULL,
            posesion_visitante REAL NOT NULL,
            corners_local REAL NOT NULL,
            corners_visitante REAL NOT NULL,
            goles_local REAL NOT NULL,
            goles_visitante REAL NOT NULL,
            tarjetas_totales REAL NOT NULL,
            resultado_1x2 INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_resultado_fixture
            ON ganador_resultado_tabla(equipo_local_id, equipo_visitante_id);
        CREATE INDEX IF NOT EXISTS idx_corners_fixture
            ON corners_tabla(equipo_local_id, equipo_visitante_id);
        "#
    ))?;
    Ok(())
}

/// AVG/COUNT aggregate for one fixture direction. `None` when the fixture
/// has no qualifying rows.
fn fixture_averages(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    home: TeamId,
    away: TeamId,
    cutoff: Option<NaiveDate>,
) -> Result<Option<AggregateRecord>> {
    let avg_list = columns
        .iter()
        .map(|c| format!("AVG({c}) AS {c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let date_filter = if cutoff.is_some() { " AND fecha < ?3" } else { "" };
    let sql = format!(
        "SELECT {avg_list}, COUNT(*) AS num_partidos FROM {table} \
         WHERE equipo_local_id = ?1 AND equipo_visitante_id = ?2{date_filter}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<AggregateRecord> {
        let mut stats = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            stats.insert((*col).to_string(), row.get::<_, Option<f64>>(i)?);
        }
        let matches: i64 = row.get(columns.len())?;
        Ok(AggregateRecord { stats, matches })
    };

    let record = match cutoff {
        Some(date) => stmt.query_row(
            params![home.0, away.0, date.format("%Y-%m-%d").to_string()],
            map_row,
        )?,
        None => stmt.query_row(params![home.0, away.0], map_row)?,
    };

    Ok((record.matches > 0).then_some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_creates_schema() {
        let (_dir, db) = test_db();
        let counts = db.table_counts().unwrap();
        assert_eq!(counts.results, 0);
        assert_eq!(counts.corners, 0);
        assert_eq!(counts.head_to_head, 0);
    }

    #[test]
    fn test_result_averages_direct() {
        let (_dir, db) = test_db();
        db.insert_result_row(
            TeamId(4),
            TeamId(0),
            date(2024, 3, 1),
            &[("posesion_local", 60.0), ("corners_local", 6.0)],
        )
        .unwrap();
        db.insert_result_row(
            TeamId(4),
            TeamId(0),
            date(2024, 4, 1),
            &[("posesion_local", 40.0), ("corners_local", 4.0)],
        )
        .unwrap();

        let record = db.result_averages(TeamId(4), TeamId(0), None).unwrap().unwrap();
        assert_eq!(record.matches, 2);
        assert_eq!(record.get("posesion_local"), Some(50.0));
        assert_eq!(record.get("corners_local"), Some(5.0));
        // Columns never populated stay absent from the average.
        assert_eq!(record.get("faltas_local"), None);
    }

    #[test]
    fn test_result_averages_mirrored_fallback() {
        let (_dir, db) = test_db();
        db.insert_result_row(
            TeamId(0),
            TeamId(4),
            date(2024, 3, 1),
            &[("posesion_local", 55.0)],
        )
        .unwrap();

        // Only the reversed pairing exists; the lookup must fall back to it.
        let record = db.result_averages(TeamId(4), TeamId(0), None).unwrap().unwrap();
        assert_eq!(record.matches, 1);
        assert_eq!(record.get("posesion_local"), Some(55.0));
    }

    #[test]
    fn test_result_averages_direct_takes_precedence() {
        let (_dir, db) = test_db();
        db.insert_result_row(
            TeamId(4),
            TeamId(0),
            date(2024, 3, 1),
            &[("posesion_local", 70.0)],
        )
        .unwrap();
        db.insert_result_row(
            TeamId(0),
            TeamId(4),
            date(2024, 3, 8),
            &[("posesion_local", 30.0)],
        )
        .unwrap();

        let record = db.result_averages(TeamId(4), TeamId(0), None).unwrap().unwrap();
        assert_eq!(record.matches, 1);
        assert_eq!(record.get("posesion_local"), Some(70.0));
    }

    #[test]
    fn test_result_averages_cutoff_is_strict() {
        let (_dir, db) = test_db();
        db.insert_result_row(
            TeamId(4),
            TeamId(0),
            date(2024, 3, 1),
            &[("corners_local", 2.0)],
        )
        .unwrap();
        db.insert_result_row(
            TeamId(4),
            TeamId(0),
            date(2024, 5, 1),
            &[("corners_local", 8.0)],
        )
        .unwrap();

        // Matches on the cutoff date itself are excluded.
        let record = db
            .result_averages(TeamId(4), TeamId(0), Some(date(2024, 5, 1)))
            .unwrap()
            .unwrap();
        assert_eq!(record.matches, 1);
        assert_eq!(record.get("corners_local"), Some(2.0));

        let none = db
            .result_averages(TeamId(4), TeamId(0), Some(date(2024, 3, 1)))
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_result_averages_no_history() {
        let (_dir, db) = test_db();
        let record = db.result_averages(TeamId(1), TeamId(2), None).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_corner_averages_mirrored_matches_direct() {
        let (_dir, db) = test_db();
        db.insert_corner_row(
            TeamId(7),
            TeamId(3),
            date(2024, 2, 10),
            &[("local_avg_last3", 5.5), ("corners_vs_rival_hist", 9.0)],
        )
        .unwrap();

        let direct = db.corner_averages(TeamId(7), TeamId(3)).unwrap().unwrap();
        let mirrored = db.corner_averages(TeamId(3), TeamId(7)).unwrap().unwrap();
        assert_eq!(direct.get("local_avg_last3"), mirrored.get("local_avg_last3"));
        assert_eq!(
            direct.get("corners_vs_rival_hist"),
            mirrored.get("corners_vs_rival_hist")
        );
        assert_eq!(direct.matches, mirrored.matches);
    }

    #[test]
    fn test_insert_rejects_unknown_column() {
        let (_dir, db) = test_db();
        let err = db
            .insert_result_row(TeamId(1), TeamId(2), date(2024, 1, 1), &[("goles_local", 2.0)])
            .unwrap_err();
        assert!(matches!(err, UpsBetError::UnknownColumn(_)));
    }

    #[test]
    fn test_head_to_head_both_directions() {
        let (_dir, db) = test_db();
        let row = HeadToHeadMatch {
            posesion_local: 0.6,
            posesion_visitante: 0.4,
            corners_local: 5.0,
            corners_visitante: 3.0,
            goles_local: 2.0,
            goles_visitante: 1.0,
            tarjetas_totales: 4.0,
            resultado_1x2: 1,
        };
        db.insert_head_to_head_row(TeamId(4), TeamId(0), date(2023, 9, 1), &row)
            .unwrap();
        db.insert_head_to_head_row(TeamId(0), TeamId(4), date(2024, 2, 1), &row)
            .unwrap();

        let matches = db.head_to_head(TeamId(4), TeamId(0)).unwrap();
        assert_eq!(matches.len(), 2);
    }
}
