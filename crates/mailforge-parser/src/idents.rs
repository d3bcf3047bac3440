/// Identifier normalization helpers shared by the parser and the generator.

/// Uppercase the first character of a string.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Derive an exported base identifier from an arbitrary string such as a
/// file stem: split on non-alphanumeric characters, uppercase the first
/// character of each chunk, and concatenate. A result that does not start
/// with a letter is prefixed with `X`; empty input yields `X`.
pub fn exported_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chunk_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if chunk_start {
                out.extend(c.to_uppercase());
                chunk_start = false;
            } else {
                out.push(c);
            }
        } else {
            chunk_start = true;
        }
    }
    if out.is_empty() {
        return "X".to_string();
    }
    if !out.chars().next().is_some_and(char::is_alphabetic) {
        out.insert(0, 'X');
    }
    out
}

/// Convert an exported base identifier to snake_case, for function names.
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Convert an exported base identifier to SCREAMING_SNAKE_CASE, for
/// template constant names.
pub fn screaming_case(s: &str) -> String {
    snake_case(s).to_uppercase()
}
