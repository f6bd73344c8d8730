//! Google Sheets API v4 resource types and A1 helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `ValueRange` returned by `values.get`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// Omitted by the API when the range is empty
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Subset of the `Spreadsheet` resource requested with
/// `fields=sheets.properties,namedRanges`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    #[serde(default)]
    pub named_ranges: Vec<NamedRange>,
}

impl Spreadsheet {
    pub fn sheet_id(&self, title: &str) -> Option<i64> {
        self.sheets
            .iter()
            .find(|s| s.properties.title == title)
            .map(|s| s.properties.sheet_id)
    }

    pub fn named_range(&self, name: &str) -> Option<&NamedRange> {
        self.named_ranges.iter().find(|nr| nr.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRange {
    pub named_range_id: String,
    pub name: String,
    #[serde(default)]
    pub range: Option<GridRange>,
}

/// Half-open grid range; unset bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    pub fn whole_sheet(sheet_id: i64) -> Self {
        Self {
            sheet_id,
            ..Default::default()
        }
    }

    /// Columns `[start, end)`, all rows.
    pub fn columns(sheet_id: i64, start: u32, end: u32) -> Self {
        Self {
            sheet_id,
            start_column_index: Some(start),
            end_column_index: Some(end),
            ..Default::default()
        }
    }

    /// A single column from row index `start_row` down.
    pub fn column_from_row(sheet_id: i64, column: u32, start_row: u32) -> Self {
        Self {
            start_row_index: Some(start_row),
            ..Self::columns(sheet_id, column, column + 1)
        }
    }

    pub fn with_end_row(mut self, end_row: u32) -> Self {
        self.end_row_index = Some(end_row);
        self
    }
}

/// Column letter for a zero-based index (`0 -> A`, `26 -> AA`).
pub fn column_letter(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quote a sheet title for use in A1 notation.
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Render a cell the way a script would coerce it to a string.
///
/// Strings are taken verbatim, other scalars use their JSON text and a
/// null cell becomes the empty string.
pub fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(3), "D");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_quote_sheet() {
        assert_eq!(quote_sheet("PermittedUsers"), "'PermittedUsers'");
        assert_eq!(quote_sheet("Bob's Users"), "'Bob''s Users'");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&json!("UserID")), "UserID");
        assert_eq!(cell_to_string(&json!(42)), "42");
        assert_eq!(cell_to_string(&json!(true)), "true");
        assert_eq!(cell_to_string(&Value::Null), "");
    }

    #[test]
    fn test_grid_range_serialization_skips_unbounded() {
        let range = GridRange::column_from_row(7, 2, 1);
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            json!({
                "sheetId": 7,
                "startRowIndex": 1,
                "startColumnIndex": 2,
                "endColumnIndex": 3
            })
        );
    }

    #[test]
    fn test_spreadsheet_lookup() {
        let spreadsheet: Spreadsheet = serde_json::from_value(json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1"}},
                {"properties": {"sheetId": 99, "title": "PermittedUsers"}}
            ],
            "namedRanges": [
                {"namedRangeId": "nr-1", "name": "PermittedUsers", "range": {"sheetId": 99}}
            ]
        }))
        .unwrap();

        assert_eq!(spreadsheet.sheet_id("PermittedUsers"), Some(99));
        assert_eq!(spreadsheet.sheet_id("Missing"), None);
        assert_eq!(
            spreadsheet.named_range("PermittedUsers").unwrap().named_range_id,
            "nr-1"
        );
    }
}
