use phf::{Set, phf_set};

static ELEMENT_SYMBOLS: Set<&'static str> = phf_set! {
    "h", "he",
    "li", "be", "b", "c", "n", "o", "f", "ne",
    "na", "mg", "al", "si", "p", "s", "cl", "ar",
    "k", "ca", "sc", "ti", "v", "cr", "mn", "fe", "co", "ni", "cu", "zn",
    "ga", "ge", "as", "se", "br", "kr",
    "rb", "sr", "y", "zr", "nb", "mo", "tc", "ru", "rh", "pd", "ag", "cd",
    "in", "sn", "sb", "te", "i", "xe",
    "cs", "ba",
    "la", "ce", "pr", "nd", "pm", "sm", "eu", "gd", "tb", "dy", "ho", "er", "tm", "yb", "lu",
    "hf", "ta", "w", "re", "os", "ir", "pt", "au", "hg",
    "tl", "pb", "bi", "po", "at", "rn",
    "fr", "ra",
    "ac", "th", "pa", "u", "np", "pu", "am", "cm", "bk", "cf", "es", "fm", "md", "no", "lr",
    "rf", "db", "sg", "bh", "hs", "mt", "ds", "rg", "cn", "nh", "fl", "mc", "lv", "ts", "og",
};

/// Returns `true` if `symbol` names a chemical element, ignoring case.
pub fn is_element_symbol(symbol: &str) -> bool {
    ELEMENT_SYMBOLS.contains(symbol.to_ascii_lowercase().as_str())
}

/// Compares two element symbols case-insensitively.
pub fn same_element(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_symbols_in_any_case() {
        for sym in ["H", "c", "Cl", "CL", "fe", "Og"] {
            assert!(is_element_symbol(sym), "{sym} should be an element");
        }
    }

    #[test]
    fn rejects_non_symbols() {
        for sym in ["", "1", "xx", "1-3", "trans-x", "q"] {
            assert!(!is_element_symbol(sym), "{sym} should not be an element");
        }
    }

    #[test]
    fn same_element_ignores_case() {
        assert!(same_element("Cl", "cl"));
        assert!(!same_element("C", "Cl"));
    }
}
