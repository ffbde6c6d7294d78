//! Runtime configuration from the environment

use std::path::PathBuf;

use crate::tools::leads::DEFAULT_PUBLIC_URL;

/// Database path from NUTRI_DATABASE_PATH, or `data/nutri.db` at the project root
pub fn database_path() -> PathBuf {
    std::env::var("NUTRI_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
                    path = grandparent.to_path_buf();
                }
            }

            path.push("data");
            path.push("nutri.db");
            path
        })
}

/// Base URL for pre-anamnesis share links
pub fn public_url() -> String {
    std::env::var("NUTRI_PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string())
}
