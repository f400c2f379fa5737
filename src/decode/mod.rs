//! Decoding of composite result strings.
//!
//! Procedures that return more than one value encode them in a string:
//! `|` separates list items and records, `,` separates coordinates and the
//! fields of a record. Every decoder treats an empty or absent string as the
//! empty result rather than an error.
//!
//! Splitting follows the automation object's own convention: empty trailing
//! fields are dropped, so `"a|b|"` has two items.

mod error;
pub mod items;

pub use error::DecodeError;

use crate::model::{FindItem, FindResult, ProcessInfo};
use crate::wire::Point;

/// Record and list item delimiter.
pub const RECORD_DELIMITER: char = '|';
/// Field and coordinate delimiter.
pub const FIELD_DELIMITER: char = ',';

fn non_empty<'a>(input: impl Into<Option<&'a str>>) -> Option<&'a str> {
    input.into().filter(|s| !s.is_empty())
}

/// Split on `delimiter`, dropping empty trailing segments.
fn split_trimmed(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts: Vec<&str> = input.split(delimiter).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

pub(crate) fn field<'a>(fields: &[&'a str], index: usize) -> Result<&'a str, DecodeError> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| DecodeError::MissingField {
            index,
            input: fields.join(","),
        })
}

pub(crate) fn int_field(fields: &[&str], index: usize) -> Result<i32, DecodeError> {
    parse_int(field(fields, index)?)
}

fn parse_int<T: std::str::FromStr>(value: &str) -> Result<T, DecodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidInteger {
            value: value.to_string(),
        })
}

/// Decode `"x,y"`. Empty input means no point. Fields after the second are
/// ignored.
pub fn parse_point<'a>(result: impl Into<Option<&'a str>>) -> Result<Option<Point>, DecodeError> {
    let Some(result) = non_empty(result) else {
        return Ok(None);
    };
    let parts = split_trimmed(result, FIELD_DELIMITER);
    Ok(Some(Point::new(
        int_field(&parts, 0)?,
        int_field(&parts, 1)?,
    )))
}

/// Decode `"a|b|c"`. Empty input is an empty list.
pub fn parse_string_list<'a>(result: impl Into<Option<&'a str>>) -> Vec<String> {
    match non_empty(result) {
        Some(result) => split_trimmed(result, RECORD_DELIMITER)
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Decode `"1,2,3"`. Empty input is an empty list; any non-numeric item is
/// an error.
pub fn parse_int_list<'a>(result: impl Into<Option<&'a str>>) -> Result<Vec<i64>, DecodeError> {
    match non_empty(result) {
        Some(result) => split_trimmed(result, FIELD_DELIMITER)
            .into_iter()
            .map(parse_int::<i64>)
            .collect(),
        None => Ok(Vec::new()),
    }
}

/// Decode `"name|path|cpu|memory"`.
pub fn parse_process_info(result: &str) -> Result<ProcessInfo, DecodeError> {
    let parts = split_trimmed(result, RECORD_DELIMITER);
    Ok(ProcessInfo {
        name: field(&parts, 0)?.to_string(),
        path: field(&parts, 1)?.to_string(),
        cpu: int_field(&parts, 2)?,
        memory: parse_int(field(&parts, 3)?)?,
    })
}

/// Decode a `|`-separated list of `,`-separated records.
///
/// `item_builder` maps the fields of one record to an item; the
/// [`items`] module has mappings for the common layouts. Empty input yields
/// [`FindResult::none`].
pub fn parse_find_result<'a, F>(
    result: impl Into<Option<&'a str>>,
    mut item_builder: F,
) -> Result<FindResult, DecodeError>
where
    F: FnMut(&[&str]) -> Result<FindItem, DecodeError>,
{
    let Some(result) = non_empty(result) else {
        return Ok(FindResult::none());
    };
    let items = split_trimmed(result, RECORD_DELIMITER)
        .into_iter()
        .map(|record| item_builder(&split_trimmed(record, FIELD_DELIMITER)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FindResult::many(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Rect;

    #[test]
    fn test_point() {
        assert_eq!(parse_point(""), Ok(None));
        assert_eq!(parse_point(None), Ok(None));
        assert_eq!(parse_point("10,20"), Ok(Some(Point::new(10, 20))));
        assert_eq!(parse_point("-5,7"), Ok(Some(Point::new(-5, 7))));
    }

    #[test]
    fn test_point_ignores_extra_fields() {
        assert_eq!(parse_point("1,2,3"), Ok(Some(Point::new(1, 2))));
    }

    #[test]
    fn test_point_malformed() {
        assert_eq!(
            parse_point("10"),
            Err(DecodeError::MissingField {
                index: 1,
                input: "10".to_string()
            })
        );
        assert_eq!(
            parse_point("x,1"),
            Err(DecodeError::InvalidInteger {
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn test_string_list() {
        assert!(parse_string_list("").is_empty());
        assert!(parse_string_list(None).is_empty());
        assert_eq!(parse_string_list("a|b|c"), vec!["a", "b", "c"]);
        assert_eq!(parse_string_list("solo"), vec!["solo"]);
    }

    #[test]
    fn test_string_list_keeps_inner_empty_items() {
        assert_eq!(parse_string_list("a||b|"), vec!["a", "", "b"]);
        assert!(parse_string_list("|").is_empty());
    }

    #[test]
    fn test_int_list() {
        assert_eq!(parse_int_list("1,22,-3"), Ok(vec![1, 22, -3]));
        assert_eq!(parse_int_list(""), Ok(vec![]));
        assert_eq!(
            parse_int_list("1,two"),
            Err(DecodeError::InvalidInteger {
                value: "two".to_string()
            })
        );
    }

    #[test]
    fn test_process_info() {
        assert_eq!(
            parse_process_info("game.exe|C:\\game\\game.exe|12|104857600"),
            Ok(ProcessInfo {
                name: "game.exe".to_string(),
                path: "C:\\game\\game.exe".to_string(),
                cpu: 12,
                memory: 104_857_600,
            })
        );
        assert!(parse_process_info("game.exe|path").is_err());
    }

    #[test]
    fn test_find_result_empty() {
        assert_eq!(parse_find_result("", items::indexed_point), Ok(FindResult::none()));
        assert_eq!(
            parse_find_result(None, items::yolo_detection),
            Ok(FindResult::none())
        );
    }

    #[test]
    fn test_find_result_records() {
        let result =
            parse_find_result("cat,91,0,0,50,40|dog,78,60,10,120,90", items::yolo_detection)
                .unwrap();
        assert!(result.found);
        assert_eq!(
            result.items,
            vec![
                FindItem::detection("cat", 91, Rect::new(0, 0, 50, 40)),
                FindItem::detection("dog", 78, Rect::new(60, 10, 120, 90)),
            ]
        );
    }

    #[test]
    fn test_find_result_custom_mapping() {
        let result = parse_find_result("3,9|4,16", |fields| {
            Ok(FindItem::indexed_point(int_field(fields, 0)?, Point::new(0, int_field(fields, 1)?)))
        })
        .unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.first().and_then(|i| i.index), Some(3));
    }

    #[test]
    fn test_find_result_propagates_bad_record() {
        assert!(parse_find_result("0,1,2|oops", items::indexed_point).is_err());
    }
}
