//! Create a nutritionist account
//!
//! Usage: add_nutritionist <name> <email> <password>

use nutri::models::{Nutritionist, NutritionistCreate};
use nutri::{config, db};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [name, email, password] = args.as_slice() else {
        return Err("Usage: add_nutritionist <name> <email> <password>".into());
    };

    let db_path = config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", db_path.display());

    let database = db::Database::new(&db_path)?;
    database.with_conn(db::migrations::run_migrations)?;

    let nutritionist = database.with_conn(|conn| {
        Nutritionist::create(conn, &NutritionistCreate {
            name: name.clone(),
            email: email.clone(),
            password: password.clone(),
        })
    })?;

    println!("Nutritionist created:");
    println!("  Id:    {}", nutritionist.id);
    println!("  Name:  {}", nutritionist.name);
    println!("  Email: {}", nutritionist.email);

    Ok(())
}
