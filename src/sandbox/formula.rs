//! Formula deny-list guard.
//!
//! This is a textual check, not an evaluator. It stops formulas that call
//! functions able to reach outside the workbook (DLL calls, shell commands,
//! HTTP requests, external XML, live data feeds) before they are written to
//! a cell.

use std::fmt;
use std::str::FromStr;

use crate::error::{Rejection, RejectionKind, ValidationOutcome};

/// Spreadsheet functions that are never allowed in a stored formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForbiddenFunction {
    /// Calls a procedure in an external DLL.
    Call,
    /// Registers an external DLL procedure as a function.
    Register,
    /// Runs a system command.
    Exec,
    /// Issues an HTTP request.
    WebService,
    /// Parses XML, typically fetched from outside.
    FilterXml,
    /// Real-time data feed from an external server.
    Rtd,
}

impl ForbiddenFunction {
    /// Every forbidden function, in the order they are checked.
    pub const ALL: [ForbiddenFunction; 6] = [
        ForbiddenFunction::Call,
        ForbiddenFunction::Register,
        ForbiddenFunction::Exec,
        ForbiddenFunction::WebService,
        ForbiddenFunction::FilterXml,
        ForbiddenFunction::Rtd,
    ];

    /// The upper-case function name as written in a formula.
    pub fn name(&self) -> &'static str {
        match self {
            ForbiddenFunction::Call => "CALL",
            ForbiddenFunction::Register => "REGISTER",
            ForbiddenFunction::Exec => "EXEC",
            ForbiddenFunction::WebService => "WEBSERVICE",
            ForbiddenFunction::FilterXml => "FILTERXML",
            ForbiddenFunction::Rtd => "RTD",
        }
    }
}

impl fmt::Display for ForbiddenFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ForbiddenFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ForbiddenFunction::ALL
            .into_iter()
            .find(|func| func.name() == upper)
            .ok_or_else(|| format!("unknown formula function: {}", s.trim()))
    }
}

/// Validate a formula before it is stored in a cell.
///
/// The formula must start with `=` and must not invoke any function in
/// `deny_list`. An invocation is the function name, not preceded by an
/// identifier character, followed by `(` after optional whitespace. The
/// input itself is never modified. Rejections are logged: security
/// violations at `warn`, malformed input at `debug`.
pub fn validate_formula(text: &str, deny_list: &[ForbiddenFunction]) -> ValidationOutcome<()> {
    check_formula(text, deny_list).map_err(|rejection| {
        if rejection.is_security_violation() {
            tracing::warn!(kind = %rejection.kind(), "{}", rejection.message());
        } else {
            tracing::debug!(kind = %rejection.kind(), "{}", rejection.message());
        }
        rejection
    })
}

fn check_formula(text: &str, deny_list: &[ForbiddenFunction]) -> ValidationOutcome<()> {
    if text.is_empty() {
        return Err(Rejection::malformed("formula cannot be empty"));
    }
    if !text.starts_with('=') {
        return Err(Rejection::malformed("formula must start with '='"));
    }

    let upper = text.to_uppercase();
    if let Some(func) = deny_list.iter().find(|func| invokes(&upper, func.name())) {
        return Err(Rejection::new(
            RejectionKind::ForbiddenFunction,
            format!("formula uses a function blocked for security reasons: {}", func),
        ));
    }

    Ok(())
}

/// Check whether `name` appears in `formula` as a call.
fn invokes(formula: &str, name: &str) -> bool {
    formula.match_indices(name).any(|(start, _)| {
        let preceded_by_ident = formula[..start]
            .chars()
            .next_back()
            .is_some_and(is_identifier_char);
        if preceded_by_ident {
            return false;
        }
        formula[start + name.len()..].trim_start().starts_with('(')
    })
}

// `.` is a boundary: `_xlfn.WEBSERVICE(` is still a call.
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
