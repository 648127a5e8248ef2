//! Recipients and their retailer preferences

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Could not read users file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid users JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A digest recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub preferred_retailers: Vec<String>,
}

/// Load recipients from a JSON array
pub fn load_users(path: &Path) -> Result<Vec<User>, UserError> {
    let raw = std::fs::read_to_string(path).map_err(|source| UserError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users() {
        let users: Vec<User> = serde_json::from_str(
            r#"[{"name":"Ava","email":"ava@example.com","preferred_retailers":["Sprouts"]},
                {"name":"Ben","email":"ben@example.com"}]"#,
        )
        .unwrap();
        assert_eq!(users[0].preferred_retailers, ["Sprouts"]);
        assert!(users[1].preferred_retailers.is_empty());
    }

    #[test]
    fn test_missing_users_file() {
        let err = load_users(Path::new("/nonexistent/dealmail/users.json")).unwrap_err();
        assert!(err.to_string().contains("users.json"));
    }
}
