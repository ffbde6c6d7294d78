//! Load a TACO CSV export into the nutrition table
//!
//! Usage: import_taco <file.csv>

use tracing_subscriber::EnvFilter;

use nutri::{config, db, tools};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutri=info".parse()?))
        .init();

    let file_path = std::env::args()
        .nth(1)
        .ok_or("Usage: import_taco <file.csv>")?;

    let db_path = config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", db_path.display());

    let database = db::Database::new(&db_path)?;
    database.with_conn(db::migrations::run_migrations)?;

    let result = tools::nutrition_facts::import_nutrition_facts(&database, &file_path)?;

    println!("Rows read: {}", result.total_rows);
    println!("Imported:  {}", result.imported);
    println!("Skipped:   {}", result.skipped);
    for error in &result.errors {
        println!("  {}", error);
    }

    Ok(())
}
