//! Nutrition fact MCP Tools
//!
//! Import of the TACO reference table and lookups against it.

use std::io::BufRead;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Macros, NutritionFact};

/// Source column names in a TACO export
const COL_NAME: &str = "descricao_alimento";
const COL_KCAL: &str = "kcal";
const COL_PROTEIN: &str = "proteina_g";
const COL_FAT: &str = "lipideos_g";
const COL_CARBS: &str = "carboidrato_g";

/// TACO's marker for trace amounts
const TRACE: &str = "tr";

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NutritionFactSummary {
    pub name: String,
    pub per_100g: Macros,
}

impl From<NutritionFact> for NutritionFactSummary {
    fn from(fact: NutritionFact) -> Self {
        Self {
            name: fact.name().to_string(),
            per_100g: *fact.per_100g(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchNutritionFactsResponse {
    pub results: Vec<NutritionFactSummary>,
    pub count: usize,
}

/// Split one CSV line, honouring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse a macro cell. Blank or non-numeric cells are errors, never zero;
/// only TACO's explicit trace marker reads as 0.
fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case(TRACE) {
        return Some(0.0);
    }
    let normalized = if value.contains('.') {
        value.to_string()
    } else {
        value.replace(',', ".")
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

struct Columns {
    name: usize,
    kcal: usize,
    protein: usize,
    fat: usize,
    carbs: usize,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, String> {
        let find = |col: &str| {
            header
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(col))
                .ok_or_else(|| format!("Missing required column '{}'", col))
        };
        Ok(Self {
            name: find(COL_NAME)?,
            kcal: find(COL_KCAL)?,
            protein: find(COL_PROTEIN)?,
            fat: find(COL_FAT)?,
            carbs: find(COL_CARBS)?,
        })
    }

    fn parse_row(&self, fields: &[String]) -> Result<NutritionFact, String> {
        let cell = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");
        let amount = |idx: usize, col: &str| {
            parse_amount(cell(idx)).ok_or_else(|| format!("Invalid {} value '{}'", col, cell(idx).trim()))
        };

        let macros = Macros {
            energy_kcal: amount(self.kcal, COL_KCAL)?,
            protein_g: amount(self.protein, COL_PROTEIN)?,
            fat_g: amount(self.fat, COL_FAT)?,
            carbohydrate_g: amount(self.carbs, COL_CARBS)?,
        };

        NutritionFact::new(cell(self.name), macros).map_err(|e| e.to_string())
    }
}

/// Import TACO rows from a reader into the nutrition_facts table
pub fn import_from_reader<R: BufRead>(conn: &mut Connection, reader: R) -> Result<ImportResponse, String> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|e| format!("Error reading header: {}", e))?,
        None => return Err("File is empty".to_string()),
    };
    let columns = Columns::from_header(&split_csv_line(&header))?;

    let tx = conn.transaction().map_err(|e| format!("Database error: {}", e))?;

    let mut total_rows = 0;
    let mut imported = 0;
    let mut errors = Vec::new();

    for (i, line_result) in lines.enumerate() {
        let row_num = i + 2;
        let line = line_result.map_err(|e| format!("Error reading line {}: {}", row_num, e))?;

        if line.trim().is_empty() {
            continue;
        }
        total_rows += 1;

        match columns.parse_row(&split_csv_line(&line)) {
            Ok(fact) => {
                NutritionFact::upsert(&tx, &fact)
                    .map_err(|e| format!("Row {}: {}", row_num, e))?;
                imported += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping TACO row {}: {}", row_num, e);
                errors.push(format!("Row {}: {}", row_num, e));
            }
        }
    }

    tx.commit().map_err(|e| format!("Failed to commit import: {}", e))?;

    tracing::info!(imported, skipped = errors.len(), "Imported nutrition facts");

    Ok(ImportResponse {
        success: errors.is_empty(),
        total_rows,
        imported,
        skipped: errors.len(),
        errors,
    })
}

/// Import a TACO CSV export from disk
pub fn import_nutrition_facts(db: &Database, file_path: &str) -> Result<ImportResponse, String> {
    use std::fs::File;
    use std::io::BufReader;

    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open file '{}': {}", file_path, e))?;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    import_from_reader(&mut conn, BufReader::new(file))
}

pub fn search_nutrition_facts(db: &Database, query: &str, limit: i64) -> Result<SearchNutritionFactsResponse, String> {
    let limit = limit.clamp(1, 200);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let results: Vec<NutritionFactSummary> = NutritionFact::search(&conn, query, limit)
        .map_err(|e| format!("Failed to search nutrition facts: {}", e))?
        .into_iter()
        .map(NutritionFactSummary::from)
        .collect();

    Ok(SearchNutritionFactsResponse {
        count: results.len(),
        results,
    })
}

pub fn get_nutrition_fact(db: &Database, name: &str) -> Result<Option<NutritionFact>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    NutritionFact::get_by_name(&conn, name)
        .map_err(|e| format!("Failed to get nutrition fact: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    const SAMPLE: &str = "\
id_alimento,descricao_alimento,umidade_pct,kcal,proteina_g,lipideos_g,carboidrato_g,fibra_alimentar_g
1,\"Arroz, integral, cozido\",70.1,124,2.6,1.0,25.8,2.7
2,\"Arroz, tipo 1, cozido\",69.1,128,2.5,0.2,28.1,1.6
3,\"Sal, dietético\",0.5,0,0.0,Tr,0.0,NA
4,\"Alimento sem energia\",10,,1,1,1,0
5,\"Alimento quebrado\",10,NA,1,1,1,0

6,\"Feijão, carioca, cozido\",80.4,\"76,0\",4.8,0.5,13.6,8.5
";

    #[test]
    fn test_split_csv_line() {
        assert_eq!(split_csv_line("a,\"b, c\",d"), vec!["a", "b, c", "d"]);
        assert_eq!(split_csv_line("\"say \"\"hi\"\"\",,x"), vec!["say \"hi\"", "", "x"]);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount("76,0"), Some(76.0));
        assert_eq!(parse_amount("Tr"), Some(0.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NA"), None);
        assert_eq!(parse_amount("*"), None);
    }

    #[test]
    fn test_import_rejects_malformed_rows() {
        let db = test_database();
        let mut conn = db.get_conn().unwrap();

        let resp = import_from_reader(&mut conn, SAMPLE.as_bytes()).unwrap();
        assert_eq!(resp.total_rows, 6);
        assert_eq!(resp.imported, 4);
        assert_eq!(resp.skipped, 2);
        assert!(!resp.success);
        assert!(resp.errors[0].starts_with("Row 5:"));

        let beans = NutritionFact::get_by_name(&conn, "Feijão, carioca, cozido").unwrap().unwrap();
        assert_eq!(beans.per_100g().energy_kcal, 76.0);
        assert!(NutritionFact::get_by_name(&conn, "Alimento sem energia").unwrap().is_none());
    }

    #[test]
    fn test_import_requires_columns() {
        let db = test_database();
        let mut conn = db.get_conn().unwrap();
        let err = import_from_reader(&mut conn, "descricao_alimento,kcal\nArroz,128\n".as_bytes()).unwrap_err();
        assert!(err.contains("proteina_g"));
    }

    #[test]
    fn test_search() {
        let db = test_database();
        {
            let mut conn = db.get_conn().unwrap();
            import_from_reader(&mut conn, SAMPLE.as_bytes()).unwrap();
        }

        let resp = search_nutrition_facts(&db, "arroz", 10).unwrap();
        assert_eq!(resp.count, 2);
        assert_eq!(resp.results[0].name, "Arroz, integral, cozido");
        assert!(get_nutrition_fact(&db, "Sal, dietético").unwrap().is_some());
    }
}
