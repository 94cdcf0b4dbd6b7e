//! Pure address normalization.

/// Canonical key for the depot.
pub const HUB: &str = "HUB";

/// Multi-word depot labels recognized anywhere in a raw string.
const HUB_NAME_ALIASES: &[&str] = &["western governors university"];

/// Depot street addresses recognized after normalization.
const HUB_ADDRESS_ALIASES: &[&str] = &["4001 South 700 East"];

/// Road-type abbreviations expanded to full words.
const ROAD_TYPES: &[(&str, &str)] = &[
    ("St", "Street"),
    ("Ave", "Avenue"),
    ("Blvd", "Boulevard"),
    ("Dr", "Drive"),
    ("Rd", "Road"),
    ("Ln", "Lane"),
    ("Ct", "Court"),
    ("Cir", "Circle"),
    ("Pl", "Place"),
    ("Pkwy", "Parkway"),
    ("Hwy", "Highway"),
    ("Sta", "Station"),
];

/// Tokens that open a suite/apartment tail; the tail is dropped.
const UNIT_MARKERS: &[&str] = &["Suite", "Ste", "Apt", "Unit", "Bldg"];

/// Collapses a raw address string to its canonical location key.
///
/// Rules, applied in order:
/// 1. recognized depot labels map straight to [`HUB`];
/// 2. multi-line strings collapse to the first line containing a digit
///    (falling back to the first non-empty line);
/// 3. parenthetical annotations (zip notes) are removed;
/// 4. a suite/apartment/`#` token and everything after it is dropped;
/// 5. abbreviated road-type tokens expand to full words;
/// 6. whitespace collapses to single spaces.
///
/// The function is pure and idempotent: feeding a canonical key back in
/// returns it unchanged.
///
/// # Examples
///
/// ```
/// use parcel_dispatch::distance::{canonical_key, HUB};
///
/// assert_eq!(canonical_key("195 W Oakland Ave"), "195 W Oakland Avenue");
/// assert_eq!(
///     canonical_key("5383 South 900 East #104\n(84117)"),
///     "5383 South 900 East"
/// );
/// assert_eq!(canonical_key("Western Governors University\n4001 South 700 East"), HUB);
/// ```
pub fn canonical_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(HUB) {
        return HUB.to_string();
    }
    let lowered = trimmed.to_ascii_lowercase();
    if HUB_NAME_ALIASES.iter().any(|a| lowered.contains(a)) {
        return HUB.to_string();
    }

    let line = pick_line(trimmed);
    let line = strip_parentheticals(line);

    let mut tokens: Vec<String> = Vec::new();
    for token in line.split_whitespace() {
        let bare = token.trim_matches(|c: char| c == ',' || c == '.');
        if bare.is_empty() {
            continue;
        }
        if bare.starts_with('#') || UNIT_MARKERS.iter().any(|m| bare.eq_ignore_ascii_case(m)) {
            break;
        }
        let expanded = ROAD_TYPES
            .iter()
            .find(|(abbr, _)| bare.eq_ignore_ascii_case(abbr))
            .map(|(_, full)| (*full).to_string())
            .unwrap_or_else(|| bare.to_string());
        tokens.push(expanded);
    }
    let key = tokens.join(" ");

    if HUB_ADDRESS_ALIASES.iter().any(|a| key.eq_ignore_ascii_case(a)) {
        return HUB.to_string();
    }
    key
}

/// First line containing a digit, else the first non-empty line.
fn pick_line(raw: &str) -> &str {
    let mut first_non_empty = "";
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if first_non_empty.is_empty() {
            first_non_empty = line;
        }
        if line.chars().any(|c| c.is_ascii_digit()) {
            return line;
        }
    }
    first_non_empty
}

/// Removes `(...)` spans, unbalanced parens included.
fn strip_parentheticals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut depth = 0usize;
    for c in line.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
