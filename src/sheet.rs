//! Validators for cell, range, sheet and color inputs.
//!
//! These run before the spreadsheet layer sees user-supplied coordinates.
//! They reject with [`RejectionKind::MalformedInput`](crate::RejectionKind).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Rejection, ValidationOutcome};

/// Highest row number in a worksheet.
pub const MAX_ROW: u32 = 1_048_576;
/// Highest column number in a worksheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;
/// Longest allowed sheet name.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{1,3})([1-9][0-9]*)$").expect("cell reference pattern is valid")
});

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

/// A parsed cell coordinate, both parts 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

/// Validate a reference such as `A1` or `xfd1048576`.
pub fn validate_cell_reference(cell: &str) -> ValidationOutcome<CellRef> {
    let upper = cell.to_ascii_uppercase();
    let caps = CELL_RE.captures(&upper).ok_or_else(|| {
        Rejection::malformed(format!(
            "invalid cell reference: {}. Expected format like 'A1' or 'B10'",
            cell
        ))
    })?;

    let row = caps[2]
        .parse::<u32>()
        .ok()
        .filter(|row| *row <= MAX_ROW)
        .ok_or_else(|| {
            Rejection::malformed(format!(
                "row number {} exceeds the maximum ({})",
                &caps[2], MAX_ROW
            ))
        })?;

    let column = column_letter_to_number(&caps[1])
        .filter(|column| *column <= MAX_COLUMN)
        .ok_or_else(|| {
            Rejection::malformed(format!(
                "column {} exceeds the maximum (XFD)",
                &caps[1]
            ))
        })?;

    Ok(CellRef { column, row })
}

/// Validate a range such as `A1:B10`.
pub fn validate_range_reference(range: &str) -> ValidationOutcome<(CellRef, CellRef)> {
    let (start, end) = range.split_once(':').ok_or_else(|| {
        Rejection::malformed(format!(
            "invalid range reference: {}. Expected format like 'A1:B10'",
            range
        ))
    })?;
    Ok((validate_cell_reference(start)?, validate_cell_reference(end)?))
}

/// Validate a worksheet name.
pub fn validate_sheet_name(name: &str) -> ValidationOutcome<()> {
    if name.is_empty() {
        return Err(Rejection::malformed("sheet name cannot be empty"));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Rejection::malformed(format!(
            "sheet name cannot exceed {} characters",
            MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return Err(Rejection::malformed(format!("sheet name cannot contain '{}'", c)));
    }
    Ok(())
}

/// Validate a hex color, with or without a leading `#`.
///
/// Returns the six digits upper-cased.
pub fn validate_color_hex(color: &str) -> ValidationOutcome<String> {
    let digits = color.trim_start_matches('#');
    if !COLOR_RE.is_match(digits) {
        return Err(Rejection::malformed(format!(
            "invalid hex color: {}. Expected format like 'FF0000' or '#FF0000'",
            digits
        )));
    }
    Ok(digits.to_ascii_uppercase())
}

/// Convert column letters to a number (`A` = 1, `Z` = 26, `AA` = 27).
///
/// Returns `None` for empty input, non-letters, or overflow.
pub fn column_letter_to_number(column: &str) -> Option<u32> {
    if column.is_empty() {
        return None;
    }
    column.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Convert a column number to letters (1 = `A`, 27 = `AA`). Zero yields an
/// empty string.
pub fn column_number_to_letter(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        number -= 1;
        letters.push(char::from(b'A' + (number % 26) as u8));
        number /= 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;

    #[test]
    fn test_cell_references() {
        assert_eq!(validate_cell_reference("A1"), Ok(CellRef { column: 1, row: 1 }));
        assert_eq!(validate_cell_reference("b10"), Ok(CellRef { column: 2, row: 10 }));
        assert_eq!(
            validate_cell_reference("XFD1048576"),
            Ok(CellRef { column: MAX_COLUMN, row: MAX_ROW })
        );

        for bad in ["", "1A", "A0", "AAAA1", "A1:B2", "A 1", "A1048577", "XFE1", "A99999999999"] {
            let rejection = validate_cell_reference(bad).unwrap_err();
            assert_eq!(rejection.kind(), RejectionKind::MalformedInput, "{}", bad);
        }
    }

    #[test]
    fn test_range_references() {
        let (start, end) = validate_range_reference("A1:C5").unwrap();
        assert_eq!(start, CellRef { column: 1, row: 1 });
        assert_eq!(end, CellRef { column: 3, row: 5 });

        assert!(validate_range_reference("A1").is_err());
        assert!(validate_range_reference("A1:").is_err());
        assert!(validate_range_reference("A1:B0").is_err());
    }

    #[test]
    fn test_sheet_names() {
        assert!(validate_sheet_name("Summary 2024").is_ok());
        assert!(validate_sheet_name(&"x".repeat(31)).is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());

        let rejection = validate_sheet_name("Q1/Q2").unwrap_err();
        assert!(rejection.message().contains('/'));
    }

    #[test]
    fn test_colors() {
        assert_eq!(validate_color_hex("#ff0000").unwrap(), "FF0000");
        assert_eq!(validate_color_hex("00aaBB").unwrap(), "00AABB");
        assert!(validate_color_hex("#fff").is_err());
        assert!(validate_color_hex("GG0000").is_err());
    }

    #[test]
    fn test_column_conversion() {
        assert_eq!(column_letter_to_number("A"), Some(1));
        assert_eq!(column_letter_to_number("z"), Some(26));
        assert_eq!(column_letter_to_number("AA"), Some(27));
        assert_eq!(column_letter_to_number("XFD"), Some(16_384));
        assert_eq!(column_letter_to_number(""), None);
        assert_eq!(column_letter_to_number("A1"), None);

        assert_eq!(column_number_to_letter(1), "A");
        assert_eq!(column_number_to_letter(26), "Z");
        assert_eq!(column_number_to_letter(27), "AA");
        assert_eq!(column_number_to_letter(16_384), "XFD");
        assert_eq!(column_number_to_letter(0), "");
    }
}
