// src/process/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("separator regex should compile"));

/// Turn a free-form label into a `snake_case` ASCII identifier.
///
/// `"Chiffre d'Affaires"` → `"chiffre_d_affaires"`, `"Résultat net (€)"` → `"resultat_net"`.
/// Applying it twice gives the same result as applying it once.
pub fn normalize_title(title: &str) -> String {
    let lowered = fold_to_ascii(title).to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Strip accents and expand the ligatures NFKD leaves untouched.
fn fold_to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfkd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'ß' => out.push_str("ss"),
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_labels() {
        assert_eq!(normalize_title("Chiffre d'Affaires"), "chiffre_d_affaires");
        assert_eq!(normalize_title("Résultat net (€)"), "resultat_net");
        assert_eq!(normalize_title("  Capitaux propres  "), "capitaux_propres");
        assert_eq!(
            normalize_title("Dettes fournisseurs & comptes rattachés"),
            "dettes_fournisseurs_comptes_rattaches"
        );
        assert_eq!(normalize_title("Main-d’œuvre"), "main_d_oeuvre");
        assert_eq!(normalize_title("EBE / CA"), "ebe_ca");
    }

    #[test]
    fn degenerate_input() {
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_title("---"), "");
        assert_eq!(normalize_title("2023"), "2023");
    }

    #[test]
    fn idempotent_and_canonical() {
        let shape = Regex::new(r"^([a-z0-9]+(_[a-z0-9]+)*)?$").unwrap();
        for raw in [
            "Chiffre d'Affaires",
            "__Déjà  vu__",
            "Total Actif (K€)",
            "ÉBITDA %",
            "straße",
            "a__b",
            "",
        ] {
            let once = normalize_title(raw);
            assert_eq!(normalize_title(&once), once, "not idempotent for {raw:?}");
            assert!(shape.is_match(&once), "{once:?} is not canonical");
        }
    }
}
