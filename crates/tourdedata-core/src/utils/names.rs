//! Rider name normalization.
//!
//! Rankings publish riders as `FAMILY NAME Given`, rider pages and other
//! listings as `Given Family`. Every join across listings goes through
//! [`canonical_rider_name`] so both forms land on the same key.

/// A token is part of the family name when all of its letters are upper case
fn is_family_token(token: &str) -> bool {
    let mut letters = token.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| c.is_uppercase())
}

/// Canonical join key for a rider name: `GIVEN FAMILY`, upper case.
///
/// The leading run of all-caps tokens is the family name and the rest are
/// given names, so `VAN DER POEL Mathieu` -> `MATHIEU VAN DER POEL`.
/// A name without a leading all-caps run is taken to already be in
/// `Given Family` order and is only upper-cased.
pub fn canonical_rider_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let family_len = tokens.iter().take_while(|t| is_family_token(t)).count();

    let ordered: Vec<&str> = if family_len == 0 || family_len == tokens.len() {
        tokens
    } else {
        tokens[family_len..]
            .iter()
            .chain(tokens[..family_len].iter())
            .copied()
            .collect()
    };
    ordered.join(" ").to_uppercase()
}
