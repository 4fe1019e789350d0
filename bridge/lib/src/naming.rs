//! Identifier helpers shared by extraction and emission.

use xxhash_rust::xxh64::xxh64;

use crate::source::TypeExpr;

/// Upper-cases the first character (`roles` -> `Roles`).
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character (`Role` -> `role`).
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Field name given to an unnamed parameter or result.
///
/// ## Examples
///
/// ```
/// use bridge_lib::naming::unnamed_field_name;
/// use bridge_lib::source::TypeExpr;
///
/// assert_eq!(unnamed_field_name(&TypeExpr::named("bool")), "bool");
/// assert_eq!(
///     unnamed_field_name(&TypeExpr::List(Box::new(TypeExpr::named("Role")))),
///     "roleList"
/// );
/// ```
pub fn unnamed_field_name(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named { name, .. } => lower_first(name),
        TypeExpr::List(element) => format!("{}List", unnamed_field_name(element)),
        TypeExpr::Map { .. } => "mapValue".to_string(),
        TypeExpr::Unsupported(_) => "value".to_string(),
    }
}

/// Makes `name` unique among `taken` by appending 2, 3, ...
pub fn dedupe(name: String, taken: &[String]) -> String {
    if !taken.contains(&name) {
        return name;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{name}{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Whether `name` is a Go keyword and unusable as an identifier.
pub fn is_go_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Identifiers the generated handler already binds.
const HANDLER_LOCALS: &[&str] = &[
    "api", "b", "ctx", "err", "r", "req", "resp", "respBody", "w", "json", "http", "time", "bool",
    "byte", "int", "rune", "uint", "true", "nil", "iota", "make", "copy", "real", "imag", "len",
];

/// Deterministic four-letter binding name for the `index`th result of
/// `method`.
///
/// The name depends only on its inputs, never on process state. Names that
/// clash with Go keywords, handler locals or `taken` are re-hashed with a salt.
pub fn placeholder(method: &str, index: usize, taken: &[String]) -> String {
    (0u64..)
        .map(|salt| {
            let key = format!("{method}#{index}");
            letters(xxh64(key.as_bytes(), salt))
        })
        .find(|name| {
            !GO_KEYWORDS.contains(&name.as_str())
                && !HANDLER_LOCALS.contains(&name.as_str())
                && !taken.contains(name)
        })
        .unwrap_or_else(|| format!("res{index}"))
}

fn letters(mut hash: u64) -> String {
    let mut name = String::with_capacity(4);
    for _ in 0..4 {
        name.push(char::from(b'a' + (hash % 26) as u8));
        hash /= 26;
    }
    name
}
