//! External category-name lookup for the movies pagination scheme.
//!
//! Loaded once per session and reused; page indexes map to provider group
//! labels, falling back to a synthetic "Filmes {n}" when no mapping exists.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
struct CategoriesFile {
    categorias: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryEntry {
    id: u32,
    group: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryNameMap {
    entries: Vec<CategoryEntry>,
}

impl CategoryNameMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: CategoriesFile = serde_json::from_str(json)?;
        Ok(Self {
            entries: file.categorias,
        })
    }

    /// Read the mapping file once; a missing or malformed file degrades to
    /// synthetic names only.
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => match Self::from_json(&json) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Category name file {} is malformed: {}", path.display(), e);
                    Self::empty()
                }
            },
            Err(e) => {
                warn!("Category name file {} not readable: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Display name for the zero-based movies page `index`.
    pub fn name_for_page(&self, index: usize) -> String {
        let wanted = index as u32 + 1;
        match self.entries.iter().find(|entry| entry.id == wanted) {
            Some(entry) => format!("Filmes {}", entry.group),
            None => format!("Filmes {}", wanted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_for_page() {
        let map = CategoryNameMap::from_json(
            r#"{"categorias": [{"id": 1, "group": "Lançamentos"}, {"id": 2, "group": "Ação"}]}"#,
        )
        .unwrap();

        assert_eq!(map.name_for_page(0), "Filmes Lançamentos");
        assert_eq!(map.name_for_page(1), "Filmes Ação");
        assert_eq!(map.name_for_page(2), "Filmes 3");
    }

    #[test]
    fn test_empty_map_synthesizes_names() {
        let map = CategoryNameMap::empty();
        assert_eq!(map.name_for_page(0), "Filmes 1");
        assert_eq!(map.name_for_page(9), "Filmes 10");
    }
}
