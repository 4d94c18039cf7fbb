//! Template substitution.
//!
//! A token is a bound name wrapped in one delimiter character on each side
//! (`%count%` with the default delimiter). Substitution is flat string
//! replacement: no escaping, no nesting, no expressions.
//!
//! # Algorithm
//!
//! Bindings are applied in order. For each one, every literal occurrence of its
//! token in the text produced so far is replaced by its value. Text inserted by
//! an earlier binding is therefore visible to later ones:
//!
//! ```
//! use spark_bind::template::substitute;
//!
//! let out = substitute("%a%", [("a", "%b%"), ("b", "X")], '%');
//! assert_eq!(out, "X");
//! ```
//!
//! Tokens without a binding are left as they are, and bindings whose token
//! never appears have no effect.

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: char = '%';

/// Build the token for `name`: `name` wrapped in `delimiter` on both sides.
pub fn token(name: &str, delimiter: char) -> String {
    let mut token = String::with_capacity(name.len() + 2 * delimiter.len_utf8());
    token.push(delimiter);
    token.push_str(name);
    token.push(delimiter);
    token
}

/// Replace every token in `template` with the value paired with its name.
///
/// `bindings` are `(name, value)` pairs applied left to right on the
/// accumulated text.
pub fn substitute<I, N, V>(template: &str, bindings: I, delimiter: char) -> String
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    bindings
        .into_iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&token(name.as_ref(), delimiter), value.as_ref())
        })
}

/// List the names of the tokens found in `template`, left to right.
///
/// A name is the non-empty text between two delimiters that contains no
/// whitespace. Used for diagnostics only; [`substitute`] does not depend on it.
pub fn tokens(template: &str, delimiter: char) -> Vec<&str> {
    let width = delimiter.len_utf8();
    let mut found = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find(delimiter) {
        let after = &rest[open + width..];
        let Some(close) = after.find(delimiter) else {
            break;
        };

        let name = &after[..close];
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            // Closing delimiter may open the next token.
            rest = &after[close..];
        } else {
            found.push(name);
            rest = &after[close + width..];
        }
    }

    found
}
