//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
        tracing::info!("Applied schema migration v2");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- NUTRITIONISTS
        -- Clinic users; credentials checked at login
        -- ============================================
        CREATE TABLE nutritionists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- PATIENTS
        -- Anamnesis intake form, one row per patient
        -- ============================================
        CREATE TABLE patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nutritionist_id INTEGER NOT NULL REFERENCES nutritionists(id) ON DELETE RESTRICT,
            name TEXT NOT NULL,
            birth_date TEXT NOT NULL,            -- ISO date
            sex TEXT NOT NULL CHECK(sex IN ('female', 'male', 'other')),
            weight_kg REAL NOT NULL DEFAULT 0,
            height_cm REAL NOT NULL DEFAULT 0,
            goal TEXT NOT NULL CHECK(goal IN ('weight_loss', 'muscle_gain', 'health', 'other')),
            allergies TEXT,
            medications TEXT,
            physically_active INTEGER NOT NULL DEFAULT 0,
            activity_frequency TEXT,
            usual_meals TEXT NOT NULL DEFAULT '[]',  -- JSON array of meal slots
            water_glasses_per_day INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_patients_nutritionist ON patients(nutritionist_id);
        CREATE INDEX idx_patients_name ON patients(name);

        -- ============================================
        -- CONSULTATIONS
        -- ============================================
        CREATE TABLE consultations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
            consulted_at TEXT NOT NULL DEFAULT (datetime('now')),
            complaints TEXT NOT NULL DEFAULT '',
            conduct TEXT NOT NULL DEFAULT '',
            guidance TEXT NOT NULL DEFAULT '',
            return_date TEXT,                    -- ISO date
            return_time TEXT                     -- HH:MM
        );

        CREATE INDEX idx_consultations_patient ON consultations(patient_id);

        -- ============================================
        -- LEADS
        -- Public pre-anamnesis submissions
        -- ============================================
        CREATE TABLE leads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nutritionist_id INTEGER NOT NULL REFERENCES nutritionists(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            phone TEXT,
            goal TEXT NOT NULL CHECK(goal IN ('weight_loss', 'muscle_gain', 'health', 'other')),
            extra_info TEXT,
            submitted_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_leads_nutritionist ON leads(nutritionist_id);

        -- ============================================
        -- NUTRITION FACTS
        -- Reference table (TACO), values per 100 g
        -- ============================================
        CREATE TABLE nutrition_facts (
            name TEXT PRIMARY KEY,
            energy_kcal REAL NOT NULL,
            protein_g REAL NOT NULL,
            fat_g REAL NOT NULL,
            carbohydrate_g REAL NOT NULL
        );
        "#,
    )?;

    Ok(())
}

/// Migration v2: case-folded search key for nutrition facts.
///
/// SQLite only folds ASCII case, so the key is lowercased in Rust.
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "ALTER TABLE nutrition_facts ADD COLUMN name_key TEXT NOT NULL DEFAULT '';",
    )?;

    let names = conn
        .prepare("SELECT name FROM nutrition_facts")?
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for name in names {
        conn.execute(
            "UPDATE nutrition_facts SET name_key = ?1 WHERE name = ?2",
            [name.to_lowercase(), name],
        )?;
    }

    conn.execute_batch("CREATE INDEX idx_nutrition_facts_name_key ON nutrition_facts(name_key);")?;
    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_v2_backfills_name_key() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        ).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", []).unwrap();
        conn.execute(
            "INSERT INTO nutrition_facts (name, energy_kcal, protein_g, fat_g, carbohydrate_g)
             VALUES ('Pão Francês', 300, 8, 3, 58)",
            [],
        ).unwrap();

        run_migrations(&conn).unwrap();

        let key: String = conn
            .query_row("SELECT name_key FROM nutrition_facts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(key, "pão francês");
    }
}
