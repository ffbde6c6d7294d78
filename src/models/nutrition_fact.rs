//! Nutrition fact model
//!
//! A row of the reference nutrition table (TACO). All values are per 100 g.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::{DbError, DbResult};
use super::Macros;

/// Per-100 g macro profile of a food
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionFact {
    name: String,
    per_100g: Macros,
}

impl NutritionFact {
    /// Build a validated fact. The name must not be blank and every macro
    /// must be finite and non-negative.
    pub fn new(name: &str, per_100g: Macros) -> DbResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DbError::Invalid("Food name must not be empty".to_string()));
        }
        if !per_100g.is_valid() {
            return Err(DbError::Invalid(format!(
                "Macros for '{}' must be finite and non-negative",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            per_100g,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn per_100g(&self) -> &Macros {
        &self.per_100g
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            per_100g: Macros {
                energy_kcal: row.get("energy_kcal")?,
                protein_g: row.get("protein_g")?,
                fat_g: row.get("fat_g")?,
                carbohydrate_g: row.get("carbohydrate_g")?,
            },
        })
    }

    /// Insert or replace a fact keyed by name
    pub fn upsert(conn: &Connection, fact: &NutritionFact) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO nutrition_facts (name, name_key, energy_kcal, protein_g, fat_g, carbohydrate_g)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(name) DO UPDATE SET
                name_key = excluded.name_key,
                energy_kcal = excluded.energy_kcal,
                protein_g = excluded.protein_g,
                fat_g = excluded.fat_g,
                carbohydrate_g = excluded.carbohydrate_g
            "#,
            params![
                fact.name,
                fact.name.to_lowercase(),
                fact.per_100g.energy_kcal,
                fact.per_100g.protein_g,
                fact.per_100g.fat_g,
                fact.per_100g.carbohydrate_g,
            ],
        )?;
        Ok(())
    }

    /// Look up a fact by its exact name
    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM nutrition_facts WHERE name = ?1")?;

        match stmt.query_row([name.trim()], Self::from_row) {
            Ok(fact) => Ok(Some(fact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive substring search on the food name. Accented letters
    /// fold too, and `%`/`_` in the query match literally.
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", escape_like(&query.trim().to_lowercase()));
        let mut stmt = conn.prepare(
            "SELECT * FROM nutrition_facts WHERE name_key LIKE ?1 ESCAPE '\\' ORDER BY name LIMIT ?2",
        )?;

        let facts = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(facts)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM nutrition_facts", [], |row| row.get(0))?)
    }
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
