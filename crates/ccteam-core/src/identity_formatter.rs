//! Identity formatting module for ccteam
//!
//! Turns identity keys (emails or API key names) into display names and
//! avatar initials for the dashboard.

/// Characters in the local part that separate name words
const NAME_SEPARATORS: [char; 3] = ['.', '_', '+'];

/// Maximum number of characters in an avatar
const MAX_INITIALS: usize = 2;

/// Derive a display name from an identity key
///
/// Takes the local part before any `@`, turns `.`, `_` and `+` into spaces and
/// upper-cases the first letter of every word. The rest of each word is kept
/// as written.
///
/// # Examples
///
/// ```
/// use ccteam_core::identity_formatter::display_name;
///
/// assert_eq!(display_name("jane.doe+test@x.com"), "Jane Doe Test");
/// assert_eq!(display_name("ci-bot"), "Ci-Bot");
/// ```
pub fn display_name(identity: &str) -> String {
    let local = identity.split('@').next().unwrap_or(identity);

    let mut name = String::with_capacity(local.len());
    let mut at_word_start = true;
    for c in local.chars() {
        let c = if NAME_SEPARATORS.contains(&c) { ' ' } else { c };
        let is_word_char = c.is_alphanumeric();
        if is_word_char && at_word_start {
            name.extend(c.to_uppercase());
        } else {
            name.push(c);
        }
        at_word_start = !is_word_char;
    }
    name
}

/// Derive avatar initials from a display name
///
/// Upper-cased first letter of each space-separated word, at most two.
///
/// # Examples
///
/// ```
/// use ccteam_core::identity_formatter::initials;
///
/// assert_eq!(initials("Jane Doe Test"), "JD");
/// assert_eq!(initials("Unknown"), "U");
/// ```
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_INITIALS)
        .collect()
}
