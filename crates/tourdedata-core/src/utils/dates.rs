use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Parse a published birthdate.
///
/// Accepts `1998-9-21` (unpadded ISO order, as the listings publish it) and
/// `21st September 1998`, optionally followed by an age in parentheses.
/// Anything else, including impossible dates, gives None.
pub fn parse_birthdate(s: &str) -> Option<NaiveDate> {
    let s = s.split('(').next().unwrap_or("").trim();
    if s.is_empty() {
        return None;
    }

    let parts: Vec<&str> = s.split('-').map(str::trim).collect();
    if parts.len() == 3 {
        let year = parts[0].parse().ok()?;
        let month = parts[1].parse().ok()?;
        let day = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() == 3 {
        let day: u32 = words[0]
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .ok()?;
        let month_name = words[1].to_lowercase();
        let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
        let year = words[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Completed years on `reference`; None if born after it
pub fn age_on(birthdate: NaiveDate, reference: NaiveDate) -> Option<u32> {
    if birthdate > reference {
        return None;
    }
    let mut age = reference.year() - birthdate.year();
    if (reference.month(), reference.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Age reached during `season`, i.e. completed years on 31 December.
/// Depends only on its arguments so it is safe to cache.
pub fn season_age(birthdate: NaiveDate, season: i32) -> Option<u32> {
    let reference = NaiveDate::from_ymd_opt(season, 12, 31)?;
    age_on(birthdate, reference)
}
