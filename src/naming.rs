//! Identifier transforms shared by file naming and emission.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_BOUNDARY_RE: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

/// PascalCase screen name to the kebab identifier used for file and module names.
///
/// `WebAuthn` and `OTP` are folded to `Webauthn` / `Otp` first so they stay a
/// single segment (`MfaWebAuthnError` -> `mfa-webauthn-error`). The transform
/// is not reversible.
pub fn to_kebab_case(name: &str) -> String {
    let folded = name.replace("WebAuthn", "Webauthn").replace("OTP", "Otp");
    WORD_BOUNDARY_RE
        .replace_all(&folded, "$1-$2")
        .to_lowercase()
}

/// Uppercases the first character: `untrustedData` -> `UntrustedData`.
pub fn to_pascal(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Binding name for a wrapped method. Names that collide with a reserved
/// keyword get `suffix` appended; everything else passes through.
pub fn safe_method_name(name: &str, reserved: &[String], suffix: &str) -> String {
    if reserved.iter().any(|keyword| keyword == name) {
        format!("{}{}", name, suffix)
    } else {
        name.to_string()
    }
}

/// True for plain identifiers (`Foo`, `_bar`, `$baz1`).
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
