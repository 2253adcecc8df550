//! User profile model
//!
//! Single-row table holding the user's body metrics, goal and daily targets.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Daily targets stored for a new profile
pub const DEFAULT_CALORIE_GOAL: i64 = 2000;
pub const DEFAULT_PROTEIN_GOAL: i64 = 150;
pub const DEFAULT_CARBS_GOAL: i64 = 250;
pub const DEFAULT_FAT_GOAL: i64 = 70;
pub const DEFAULT_WATER_GOAL: i64 = 2000;

/// The user's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub weight: Option<f64>, // kg
    pub height: Option<f64>, // cm
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub daily_calorie_goal: Option<i64>,
    pub daily_protein_goal: Option<i64>,
    pub daily_carbs_goal: Option<i64>,
    pub daily_fat_goal: Option<i64>,
    pub daily_water_goal: Option<i64>, // ml
    pub created_at: String,
    pub updated_at: String,
}

/// Fields to change on the profile; `None` leaves a field as is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub daily_calorie_goal: Option<i64>,
    pub daily_protein_goal: Option<i64>,
    pub daily_carbs_goal: Option<i64>,
    pub daily_fat_goal: Option<i64>,
    pub daily_water_goal: Option<i64>,
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            age: row.get("age")?,
            weight: row.get("weight")?,
            height: row.get("height")?,
            gender: row.get("gender")?,
            activity_level: row.get("activity_level")?,
            goal: row.get("goal")?,
            daily_calorie_goal: row.get("daily_calorie_goal")?,
            daily_protein_goal: row.get("daily_protein_goal")?,
            daily_carbs_goal: row.get("daily_carbs_goal")?,
            daily_fat_goal: row.get("daily_fat_goal")?,
            daily_water_goal: row.get("daily_water_goal")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile, if one has been created
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the profile, creating it with default daily targets if missing
    pub fn get_or_create(conn: &Connection) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT OR IGNORE INTO profile (
                id, daily_calorie_goal, daily_protein_goal, daily_carbs_goal,
                daily_fat_goal, daily_water_goal
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                DEFAULT_CALORIE_GOAL,
                DEFAULT_PROTEIN_GOAL,
                DEFAULT_CARBS_GOAL,
                DEFAULT_FAT_GOAL,
                DEFAULT_WATER_GOAL,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Apply a partial update and return the new profile
    pub fn update(conn: &Connection, data: &ProfileUpdate) -> DbResult<Self> {
        Self::get_or_create(conn)?;

        conn.execute(
            r#"
            UPDATE profile SET
                name = COALESCE(?1, name),
                age = COALESCE(?2, age),
                weight = COALESCE(?3, weight),
                height = COALESCE(?4, height),
                gender = COALESCE(?5, gender),
                activity_level = COALESCE(?6, activity_level),
                goal = COALESCE(?7, goal),
                daily_calorie_goal = COALESCE(?8, daily_calorie_goal),
                daily_protein_goal = COALESCE(?9, daily_protein_goal),
                daily_carbs_goal = COALESCE(?10, daily_carbs_goal),
                daily_fat_goal = COALESCE(?11, daily_fat_goal),
                daily_water_goal = COALESCE(?12, daily_water_goal),
                updated_at = datetime('now')
            WHERE id = 1
            "#,
            params![
                data.name,
                data.age,
                data.weight,
                data.height,
                data.gender,
                data.activity_level,
                data.goal,
                data.daily_calorie_goal,
                data.daily_protein_goal,
                data.daily_carbs_goal,
                data.daily_fat_goal,
                data.daily_water_goal,
            ],
        )?;

        Self::get_or_create(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_get_missing_profile() {
        assert!(UserProfile::get(&conn()).unwrap().is_none());
    }

    #[test]
    fn test_get_or_create_uses_default_goals() {
        let conn = conn();
        let profile = UserProfile::get_or_create(&conn).unwrap();
        assert_eq!(profile.daily_calorie_goal, Some(2000));
        assert_eq!(profile.daily_protein_goal, Some(150));
        assert_eq!(profile.daily_carbs_goal, Some(250));
        assert_eq!(profile.daily_fat_goal, Some(70));
        assert_eq!(profile.daily_water_goal, Some(2000));
        assert_eq!(profile.weight, None);

        // second call keeps the same row
        let again = UserProfile::get_or_create(&conn).unwrap();
        assert_eq!(again.created_at, profile.created_at);
    }

    #[test]
    fn test_partial_update() {
        let conn = conn();
        let profile = UserProfile::update(
            &conn,
            &ProfileUpdate {
                name: Some("Sam".to_string()),
                weight: Some(82.5),
                goal: Some("lose_weight".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(profile.name.as_deref(), Some("Sam"));
        assert_eq!(profile.weight, Some(82.5));
        assert_eq!(profile.daily_calorie_goal, Some(2000));

        let profile = UserProfile::update(
            &conn,
            &ProfileUpdate {
                daily_calorie_goal: Some(1800),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(profile.name.as_deref(), Some("Sam"));
        assert_eq!(profile.goal.as_deref(), Some("lose_weight"));
        assert_eq!(profile.daily_calorie_goal, Some(1800));
    }
}
