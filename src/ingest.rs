use crate::error::SummarizeError;
use crate::models::{Dataset, StudentRecord};

/// Columns every upload must carry, matched by exact header name.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Name", "Study Hours", "Exam Score"];

/// Upload boundary checks. Rejected uploads never reach the parser.
pub fn accept_upload(file_name: &str, bytes: Vec<u8>) -> Result<Vec<u8>, SummarizeError> {
    if file_name.is_empty() {
        return Err(SummarizeError::MissingInput);
    }
    if !file_name.ends_with(".csv") {
        return Err(SummarizeError::InvalidFormat(format!(
            "'{file_name}' is not a .csv file"
        )));
    }
    if bytes.is_empty() {
        return Err(SummarizeError::InvalidFormat(
            "the uploaded file is empty".to_string(),
        ));
    }
    Ok(bytes)
}

/// Parse raw CSV bytes into a dataset, preserving file order.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, SummarizeError> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(SummarizeError::Schema(required.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<StudentRecord>() {
        records.push(row?);
    }

    Ok(Dataset::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_file_name() {
        let err = accept_upload("", b"Name,Study Hours,Exam Score\n".to_vec()).unwrap_err();
        assert!(matches!(err, SummarizeError::MissingInput));
    }

    #[test]
    fn rejects_non_csv_extension() {
        let err = accept_upload("test.txt", b"Some text data".to_vec()).unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_empty_body() {
        let err = accept_upload("grades.csv", Vec::new()).unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidFormat(_)));
    }

    #[test]
    fn accepts_csv_upload() {
        let bytes = b"Name,Study Hours,Exam Score\nJohn,5,80\n".to_vec();
        let accepted = accept_upload("grades.csv", bytes.clone()).unwrap();
        assert_eq!(accepted, bytes);
    }

    #[test]
    fn parses_rows_in_file_order() {
        let bytes = b"Name,Study Hours,Exam Score\nJohn,5,80\nJane,3,85\n";
        let dataset = parse_dataset(bytes).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.records()[0].name, "John");
        assert_eq!(dataset.records()[0].study_hours, 5.0);
        assert_eq!(dataset.records()[1].exam_score, 85.0);
    }

    #[test]
    fn header_only_file_parses_to_empty_dataset() {
        let dataset = parse_dataset(b"Name,Study Hours,Exam Score\n").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let bytes = b"Name,Hours,Exam Score\nJohn,5,80\n";
        let err = parse_dataset(bytes).unwrap_err();
        match err {
            SummarizeError::Schema(column) => assert_eq!(column, "Study Hours"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn column_lookup_is_exact() {
        // Lowercase header must not satisfy the exact-name lookup.
        let bytes = b"name,Study Hours,Exam Score\nJohn,5,80\n";
        let err = parse_dataset(bytes).unwrap_err();
        assert!(matches!(err, SummarizeError::Schema(_)));
    }

    #[test]
    fn non_numeric_value_is_a_parse_error() {
        let bytes = b"Name,Study Hours,Exam Score\nJohn,lots,80\n";
        let err = parse_dataset(bytes).unwrap_err();
        assert!(matches!(err, SummarizeError::Parse(_)));
    }
}
