//! Client-side text search over already loaded records.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::Record;

/// Lowercases `input` and strips accents, so `"Désa"` folds to `"desa"`.
fn fold(input: &str) -> String {
    input
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Records where any of `fields` contains `query`, ignoring case and accents.
///
/// An empty query matches everything. Input order is kept. Unknown field
/// names never match.
pub fn search<'a, R: Record>(records: &'a [R], query: &str, fields: &[&str]) -> Vec<&'a R> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let needle = fold(query);
    records
        .iter()
        .filter(|record| {
            fields.iter().any(|field| {
                record
                    .field(field)
                    .is_some_and(|value| fold(&value).contains(&needle))
            })
        })
        .collect()
}

/// [`search`] over the kind's usual search fields.
pub fn search_default<'a, R: Record>(records: &'a [R], query: &str) -> Vec<&'a R> {
    search(records, query, R::SEARCH_FIELDS)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::Employee;

    fn employee(name: &str, badge_number: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: name.to_string(),
            badge_number: badge_number.to_string(),
            job_title: "Staf".to_string(),
            work_unit: "Umum".to_string(),
            contact: "staf@kantor.go.id".to_string(),
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let records = vec![employee("Budi", "1"), employee("Ani", "2")];
        let found = search(&records, "", &["name"]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Budi");
        assert_eq!(found[1].name, "Ani");
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let records = vec![
            employee("Budi Santoso", "198501"),
            employee("Siti Aminah", "199002"),
            employee("Agus", "200003"),
        ];

        let by_name = search_default(&records, "SANTOSO");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Budi Santoso");

        let by_badge = search_default(&records, "1990");
        assert_eq!(by_badge.len(), 1);
        assert_eq!(by_badge[0].name, "Siti Aminah");

        assert!(search(&records, "budi", &["contact"]).is_empty());
        assert!(search(&records, "budi", &["no_such_field"]).is_empty());
    }

    #[test]
    fn folds_accents() {
        let records = vec![employee("José Ramírez", "1")];
        assert_eq!(search_default(&records, "jose").len(), 1);
        assert_eq!(search_default(&records, "RAMÍREZ").len(), 1);
    }
}
