//! Normalization of raw recipe text into statements.

/// Splits recipe text into an ordered list of trimmed statements.
///
/// Lines are separated by `\r\n`, `\r` or `\n`. A blank line becomes a single
/// empty statement; the section state machine in [`crate::kitchen`] consumes
/// these as section delimiters. A non-blank line is split on `.` with the
/// surrounding whitespace absorbed, one statement per non-empty segment, so
/// several statements may share a line and the trailing period of a header
/// like `Ingredients.` leaves no residue.
pub fn normalize(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    for line in source.replace("\r\n", "\n").split(['\n', '\r']) {
        let line = line.trim();
        if line.is_empty() {
            statements.push(String::new());
            continue;
        }
        for segment in line.split('.') {
            let segment = segment.trim();
            if !segment.is_empty() {
                statements.push(segment.to_string());
            }
        }
    }
    statements
}
