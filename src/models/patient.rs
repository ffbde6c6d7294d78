//! Patient model
//!
//! Nutritional anamnesis collected at intake.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::diet::MealSlot;

/// Earliest accepted birth date
pub const MIN_BIRTH_DATE: (i32, u32, u32) = (1925, 1, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
            Sex::Other => "other",
        }
    }

    /// Lenient mapping for stored rows
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Sex::Other)
    }

    /// Parse form input; unknown values are rejected
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            "other" => Ok(Sex::Other),
            _ => Err(format!("Invalid sex '{}': expected female, male or other", s.trim())),
        }
    }
}

/// Main goal stated by a patient or lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    Health,
    Other,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight_loss",
            Goal::MuscleGain => "muscle_gain",
            Goal::Health => "health",
            Goal::Other => "other",
        }
    }

    /// Lenient mapping for stored rows
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Goal::Other)
    }

    /// Parse form input; unknown values are rejected
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "weight_loss" => Ok(Goal::WeightLoss),
            "muscle_gain" => Ok(Goal::MuscleGain),
            "health" => Ok(Goal::Health),
            "other" => Ok(Goal::Other),
            _ => Err(format!(
                "Invalid goal '{}': expected weight_loss, muscle_gain, health or other",
                s.trim()
            )),
        }
    }
}

/// A registered patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub nutritionist_id: i64,
    pub name: String,
    pub birth_date: String,
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub goal: Goal,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub physically_active: bool,
    pub activity_frequency: Option<String>,
    pub usual_meals: Vec<MealSlot>,
    pub water_glasses_per_day: u32,
    pub submitted_at: String,
}

/// Anamnesis form data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientCreate {
    pub name: String,
    pub birth_date: String,
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub goal: Goal,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub physically_active: bool,
    pub activity_frequency: Option<String>,
    #[serde(default)]
    pub usual_meals: Vec<MealSlot>,
    #[serde(default)]
    pub water_glasses_per_day: u32,
}

impl PatientCreate {
    /// Check the form and normalise optional text
    fn validate(&self, today: NaiveDate) -> DbResult<()> {
        if self.name.trim().is_empty() {
            return Err(DbError::Invalid("Patient name is required".to_string()));
        }

        let birth = NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d")
            .map_err(|_| DbError::Invalid(format!("Invalid birth date '{}', expected YYYY-MM-DD", self.birth_date)))?;
        let (y, m, d) = MIN_BIRTH_DATE;
        let min = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
        if birth < min || birth > today {
            return Err(DbError::Invalid(format!(
                "Birth date must be between {} and {}",
                min, today
            )));
        }

        if !(self.weight_kg.is_finite() && self.weight_kg >= 0.0) {
            return Err(DbError::Invalid("Weight must be 0 kg or more".to_string()));
        }
        if !(self.height_cm.is_finite() && self.height_cm >= 0.0) {
            return Err(DbError::Invalid("Height must be 0 cm or more".to_string()));
        }
        Ok(())
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Patient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let usual_meals: String = row.get("usual_meals")?;
        Ok(Self {
            id: row.get("id")?,
            nutritionist_id: row.get("nutritionist_id")?,
            name: row.get("name")?,
            birth_date: row.get("birth_date")?,
            sex: Sex::from_str(&row.get::<_, String>("sex")?),
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            goal: Goal::from_str(&row.get::<_, String>("goal")?),
            allergies: row.get("allergies")?,
            medications: row.get("medications")?,
            physically_active: row.get("physically_active")?,
            activity_frequency: row.get("activity_frequency")?,
            usual_meals: serde_json::from_str(&usual_meals).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            water_glasses_per_day: row.get("water_glasses_per_day")?,
            submitted_at: row.get("submitted_at")?,
        })
    }

    /// Register a patient for a nutritionist
    pub fn create(conn: &Connection, nutritionist_id: i64, data: &PatientCreate) -> DbResult<Self> {
        data.validate(Local::now().date_naive())?;

        // Frequency only means something for active patients
        let activity_frequency = if data.physically_active {
            non_empty(&data.activity_frequency)
        } else {
            None
        };

        let mut usual_meals = data.usual_meals.clone();
        usual_meals.sort();
        usual_meals.dedup();
        let usual_meals = serde_json::to_string(&usual_meals)
            .map_err(|e| DbError::Invalid(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO patients (
                nutritionist_id, name, birth_date, sex, weight_kg, height_cm, goal,
                allergies, medications, physically_active, activity_frequency,
                usual_meals, water_glasses_per_day
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                nutritionist_id,
                data.name.trim(),
                data.birth_date.trim(),
                data.sex.as_str(),
                data.weight_kg,
                data.height_cm,
                data.goal.as_str(),
                non_empty(&data.allergies),
                non_empty(&data.medications),
                data.physically_active,
                activity_frequency,
                usual_meals,
                data.water_glasses_per_day,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM patients WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Patients belonging to a nutritionist, by name
    pub fn list_for_nutritionist(conn: &Connection, nutritionist_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM patients WHERE nutritionist_id = ?1 ORDER BY name, id",
        )?;

        let patients = stmt
            .query_map([nutritionist_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(patients)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{Nutritionist, NutritionistCreate};

    pub(crate) fn sample_patient() -> PatientCreate {
        PatientCreate {
            name: "Maria Silva".to_string(),
            birth_date: "1990-05-17".to_string(),
            sex: Sex::Female,
            weight_kg: 68.5,
            height_cm: 165.0,
            goal: Goal::WeightLoss,
            allergies: Some("lactose".to_string()),
            medications: Some("  ".to_string()),
            physically_active: false,
            activity_frequency: Some("3x per week".to_string()),
            usual_meals: vec![MealSlot::Lunch, MealSlot::Breakfast, MealSlot::Lunch],
            water_glasses_per_day: 6,
        }
    }

    fn nutritionist(conn: &Connection) -> Nutritionist {
        Nutritionist::create(conn, &NutritionistCreate {
            name: "Ana".to_string(),
            email: "ana@clinic.test".to_string(),
            password: "pw".to_string(),
        }).unwrap()
    }

    #[test]
    fn test_create_normalises_form() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let n = nutritionist(&conn);

        let patient = Patient::create(&conn, n.id, &sample_patient()).unwrap();
        assert_eq!(patient.nutritionist_id, n.id);
        assert_eq!(patient.medications, None);
        assert_eq!(patient.activity_frequency, None);
        assert_eq!(patient.usual_meals, vec![MealSlot::Breakfast, MealSlot::Lunch]);
        assert_eq!(patient.goal, Goal::WeightLoss);
    }

    #[test]
    fn test_ids_increase() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let n = nutritionist(&conn);

        let a = Patient::create(&conn, n.id, &sample_patient()).unwrap();
        let b = Patient::create(&conn, n.id, &sample_patient()).unwrap();
        assert_eq!(b.id, a.id + 1);
        assert_eq!(Patient::list_for_nutritionist(&conn, n.id).unwrap().len(), 2);
    }

    #[test]
    fn test_validation() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let mut data = sample_patient();
        data.birth_date = "1924-12-31".to_string();
        assert!(data.validate(today).is_err());

        data.birth_date = "2026-01-02".to_string();
        assert!(data.validate(today).is_err());

        data.birth_date = "17/05/1990".to_string();
        assert!(data.validate(today).is_err());

        let mut data = sample_patient();
        data.weight_kg = -1.0;
        assert!(data.validate(today).is_err());

        let mut data = sample_patient();
        data.name = " ".to_string();
        assert!(data.validate(today).is_err());

        assert!(sample_patient().validate(today).is_ok());
    }

    #[test]
    fn test_parse_rejects_unknown_sex_and_goal() {
        assert_eq!(Sex::parse(" Female ").unwrap(), Sex::Female);
        assert_eq!(Sex::parse("other").unwrap(), Sex::Other);
        assert!(Sex::parse("femal").is_err());
        assert!(Sex::parse("Feminino").is_err());
        assert!(Sex::parse("").is_err());

        assert_eq!(Goal::parse("Weight loss").unwrap(), Goal::WeightLoss);
        assert_eq!(Goal::parse("muscle-gain").unwrap(), Goal::MuscleGain);
        assert_eq!(Goal::parse("other").unwrap(), Goal::Other);
        assert!(Goal::parse("weightloss").is_err());
        assert!(Goal::parse("emagrecimento").is_err());
    }

    #[test]
    fn test_corrupt_usual_meals_is_an_error() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let n = nutritionist(&conn);
        let patient = Patient::create(&conn, n.id, &sample_patient()).unwrap();

        conn.execute(
            "UPDATE patients SET usual_meals = 'lunch,dinner' WHERE id = ?1",
            [patient.id],
        ).unwrap();

        assert!(Patient::get_by_id(&conn, patient.id).is_err());
    }
}
