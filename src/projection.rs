use serde_json::{Map, Value};

/// A single projected row: column label to value.
pub type Record = Map<String, Value>;

/// Zips each row with `columns`, keeping row order. Rows and labels are
/// assumed to be the same length; extra values on either side are dropped.
pub fn project<I>(columns: &[&str], rows: I) -> Vec<Record>
where
    I: IntoIterator<Item = Vec<Value>>,
{
    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .zip(row)
                .map(|(label, value)| ((*label).to_string(), value))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_labels_each_row() {
        let rows = vec![vec![json!(2), json!("b")], vec![json!(1), json!("a")]];
        let records = project(&["id", "content"], rows);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!(2));
        assert_eq!(records[0]["content"], json!("b"));
        assert_eq!(records[1]["id"], json!(1));
    }

    #[test]
    fn test_project_empty() {
        let records = project(&["id"], Vec::<Vec<Value>>::new());
        assert!(records.is_empty());
    }

    #[test]
    fn test_project_keeps_column_order() {
        let rows = vec![vec![json!(1), json!("a"), json!(0), json!("2024-01-01")]];
        let records = project(&["id", "content", "likes", "created"], rows);

        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "content", "likes", "created"]);
        assert_eq!(
            serde_json::to_string(&records[0]).unwrap(),
            r#"{"id":1,"content":"a","likes":0,"created":"2024-01-01"}"#
        );
    }
}
