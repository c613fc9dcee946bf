use crate::model::Motorcycle;

/// Leading-integer parse: optional sign then digits, anything after is ignored.
/// Returns `None` when no digit leads the string.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    rest[..digits_len].parse::<i64>().ok().map(|n| sign * n)
}

/// Returns the code for the next motorcycle: one past the largest numeric code on
/// file, or `"1"` for an empty collection. Codes that are not numbers count as 0.
///
/// Only call this when creating a record; an edited motorcycle keeps its code.
pub fn next_code(motorcycles: &[Motorcycle]) -> String {
    motorcycles
        .iter()
        .map(|m| leading_int(&m.code).unwrap_or(0))
        .max()
        .map_or(1, |max| max.saturating_add(1))
        .to_string()
}
