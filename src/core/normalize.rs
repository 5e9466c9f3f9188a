//! LaTeX-to-Unicode rewriting for generated study notes.
//!
//! Models are asked for human-readable formulas but still emit `\frac`, `\alpha`
//! and friends. [`normalize_value`] walks a parsed record and rewrites every
//! string leaf; containers keep their shape, keys and order.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

const SUBSCRIPT_DIGITS: [(&str, &str); 10] = [
    ("_0", "₀"),
    ("_1", "₁"),
    ("_2", "₂"),
    ("_3", "₃"),
    ("_4", "₄"),
    ("_5", "₅"),
    ("_6", "₆"),
    ("_7", "₇"),
    ("_8", "₈"),
    ("_9", "₉"),
];

/// Ordinary symbols: a space between one of these and a following one-letter
/// variable only delimits the macro name (`\Delta T`), so it is dropped along
/// with the macro. Before a word (`\rho is`) the space stays.
const SYMBOLS: &[(&str, &str)] = &[
    ("partial", "∂"),
    ("rho", "ρ"),
    ("nu", "ν"),
    ("Delta", "Δ"),
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("omega", "ω"),
    ("Omega", "Ω"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("pi", "π"),
];

/// Operators keep their surrounding spacing.
const OPERATORS: &[(&str, &str)] = &[
    ("cdot", "·"),
    ("times", "×"),
    ("leq", "≤"),
    ("geq", "≥"),
    ("approx", "≈"),
    ("neq", "≠"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("infty", "∞"),
];

struct Patterns {
    frac: Regex,
    braced_subscript: Regex,
    braced_superscript: Regex,
    macros: Regex,
    sqrt: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let names: Vec<&str> = SYMBOLS
            .iter()
            .chain(OPERATORS)
            .map(|(name, _)| *name)
            .collect();
        Patterns {
            frac: Regex::new(r"\\frac\{([^}]*)\}\{([^}]*)\}").expect("frac pattern"),
            braced_subscript: Regex::new(r"_\{([^}]*)\}").expect("subscript pattern"),
            braced_superscript: Regex::new(r"\^\{([^}]*)\}").expect("superscript pattern"),
            macros: Regex::new(&format!(r"\\({})(?: ([A-Za-z]))?", names.join("|")))
                .expect("macro pattern"),
            sqrt: Regex::new(r"\\sqrt\{([^}]*)\}").expect("sqrt pattern"),
        }
    })
}

/// Rewrite LaTeX markup in every string inside `value`.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Rewrite LaTeX markup in a single string. Unknown macros are left as-is.
pub fn normalize_text(input: &str) -> String {
    let p = patterns();

    let mut s = input.replace("\\\\", "\\");
    s = p.frac.replace_all(&s, "(${1})/(${2})").into_owned();
    for (from, to) in SUBSCRIPT_DIGITS {
        s = s.replace(from, to);
    }
    s = p.braced_subscript.replace_all(&s, "₍${1}₎").into_owned();
    s = p.braced_superscript.replace_all(&s, "^(${1})").into_owned();
    let replaced = p.macros.replace_all(&s, |caps: &Captures| {
        let name = &caps[1];
        let (symbol, joins) = match SYMBOLS.iter().find(|(n, _)| *n == name) {
            Some((_, symbol)) => (*symbol, true),
            None => OPERATORS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, symbol)| (*symbol, false))
                .unwrap_or_default(),
        };
        match caps.get(2) {
            Some(letter) if joins && !starts_word(&s[letter.end()..]) => {
                format!("{}{}", symbol, letter.as_str())
            }
            Some(letter) => format!("{} {}", symbol, letter.as_str()),
            None => symbol.to_string(),
        }
    });
    s = replaced.into_owned();
    p.sqrt.replace_all(&s, "√(${1})").into_owned()
}

/// Whether `rest` continues the letter just before it into a word.
fn starts_word(rest: &str) -> bool {
    rest.starts_with(|c: char| c.is_ascii_alphabetic())
}
