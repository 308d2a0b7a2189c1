//! DN construction from user input.

use crate::config::USERNAME_PLACEHOLDER;

/// Escape an attribute value for use inside a DN (RFC 4514 section 2.4).
#[must_use]
pub fn escape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' | ',' | '+' | '"' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitute the escaped username into the bind DN template.
#[must_use]
pub fn user_dn(template: &str, username: &str) -> String {
    template.replace(USERNAME_PLACEHOLDER, &escape_dn_value(username))
}
