//! Human-readable formatting for dates and masses
//!
//! Consistent display across the live list, the summary and the delivery note.

/// Format kilograms with exactly two decimal places
///
/// # Examples
///
/// ```
/// use dnote_common::display::format_kg;
///
/// assert_eq!(format_kg(10.0), "10.00");
/// assert_eq!(format_kg(2.5), "2.50");
/// ```
pub fn format_kg(kg: f64) -> String {
    format!("{:.2}", kg)
}

/// Normalize a record date to zero-padded `dd/mm/yyyy` for display
///
/// Recognized inputs:
/// - `d/m/yyyy` (one or two digit day/month, day 1-31, month 1-12)
/// - a leading `yyyy-mm-dd`, optionally followed by a time part
///
/// Anything else is returned unchanged, so an odd date on a tag is still
/// shown to the operator rather than hidden.
///
/// # Examples
///
/// ```
/// use dnote_common::display::normalize_display_date;
///
/// assert_eq!(normalize_display_date("5/3/2024"), "05/03/2024");
/// assert_eq!(normalize_display_date("2024-03-05"), "05/03/2024");
/// assert_eq!(normalize_display_date("next tuesday"), "next tuesday");
/// ```
pub fn normalize_display_date(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(formatted) = from_day_first(trimmed) {
        return formatted;
    }
    if let Some(formatted) = from_iso_prefix(trimmed) {
        return formatted;
    }
    raw.to_string()
}

fn all_digits(part: &str, min_len: usize, max_len: usize) -> bool {
    (min_len..=max_len).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
}

fn from_day_first(text: &str) -> Option<String> {
    let mut parts = text.split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some()
        || !all_digits(day, 1, 2)
        || !all_digits(month, 1, 2)
        || !all_digits(year, 4, 4)
    {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{:02}/{:02}/{}", day, month, year))
}

fn from_iso_prefix(text: &str) -> Option<String> {
    let head = text.get(..10)?;
    let mut parts = head.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if !all_digits(year, 4, 4) || !all_digits(month, 2, 2) || !all_digits(day, 2, 2) {
        return None;
    }

    let year: u32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    if year == 0 || month == 0 || day == 0 {
        return None;
    }
    Some(format!("{:02}/{:02}/{}", day, month, year))
}
