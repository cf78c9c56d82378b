//! Text helpers for keyword classification.

/// Lowercase a label and strip the diacritics that show up in Portuguese
/// group titles, so "Comédia" and "comedia" key the same genre bucket.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Extract a four-digit year (19xx/20xx) from a group title, if any.
pub fn extract_year(group_title: &str) -> Option<&str> {
    let bytes = group_title.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        if window.iter().all(|b| b.is_ascii_digit())
            && (window.starts_with(b"19") || window.starts_with(b"20"))
        {
            let before_ok = i == 0 || !bytes[i - 1].is_ascii_digit();
            let after_ok = i + 4 >= bytes.len() || !bytes[i + 4].is_ascii_digit();
            if before_ok && after_ok {
                return Some(&group_title[i..i + 4]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Comédia"), "comedia");
        assert_eq!(normalize_label("AÇÃO"), "acao");
        assert_eq!(normalize_label("Lançamentos 2024"), "lancamentos 2024");
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("Filmes 2024"), Some("2024"));
        assert_eq!(extract_year("Clássicos 1987"), Some("1987"));
        assert_eq!(extract_year("Filmes"), None);
        // Five-digit runs are not years
        assert_eq!(extract_year("Canal 20245"), None);
    }
}
