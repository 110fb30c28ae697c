// src/process/convert.rs

enum Scale {
    Times(f64),
    Percent,
}

/// Unit suffixes, most specific first so `"K %"` wins over `"%"` and `"Md"` over `"M"`.
/// Matched against the token with every whitespace character removed.
const SUFFIXES: &[(&str, Scale)] = &[
    ("K%", Scale::Times(1_000.0 * 10.0)),
    ("M%", Scale::Times(1_000_000.0 * 10.0)),
    ("Md", Scale::Times(1_000_000_000.0)),
    ("K", Scale::Times(1_000.0)),
    ("M", Scale::Times(1_000_000.0)),
    ("%", Scale::Percent),
];

/// Convert one human-formatted cell (`"2.5 M"`, `"150 K"`, `"-12 %"`) into a number.
/// Decimal commas are not accepted. Anything unparseable becomes `None`.
pub fn parse_value(raw: &str) -> Option<f64> {
    // drop regular, non-breaking and narrow non-breaking spaces alike
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let (number, scale) = SUFFIXES
        .iter()
        .find_map(|(suffix, scale)| compact.strip_suffix(suffix).map(|n| (n, Some(scale))))
        .unwrap_or((compact.as_str(), None));

    let n = number.parse::<f64>().ok()?;
    let v = match scale {
        Some(Scale::Times(factor)) => n * factor,
        Some(Scale::Percent) => n / 100.0,
        None => n,
    };
    v.is_finite().then_some(v)
}
