//! Water intake model
//!
//! One row per date; additions accumulate.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Water drunk on a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterIntake {
    pub date: String,
    pub amount_ml: i64,
    pub updated_at: String,
}

impl WaterIntake {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get("date")?,
            amount_ml: row.get("amount_ml")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get_for_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM water_intake WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(intake) => Ok(Some(intake)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Add `amount_ml` to the date's total and return the new total
    pub fn add(conn: &Connection, date: &str, amount_ml: i64) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO water_intake (date, amount_ml)
            VALUES (?1, ?2)
            ON CONFLICT(date) DO UPDATE SET
                amount_ml = amount_ml + excluded.amount_ml,
                updated_at = datetime('now')
            "#,
            params![date, amount_ml],
        )?;

        Self::get_for_date(conn, date)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_add_accumulates_per_date() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert!(WaterIntake::get_for_date(&conn, "2025-03-01").unwrap().is_none());
        assert_eq!(WaterIntake::add(&conn, "2025-03-01", 250).unwrap().amount_ml, 250);
        assert_eq!(WaterIntake::add(&conn, "2025-03-01", 500).unwrap().amount_ml, 750);
        assert_eq!(WaterIntake::add(&conn, "2025-03-02", 300).unwrap().amount_ml, 300);
    }
}
