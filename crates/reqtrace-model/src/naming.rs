//! Field and entity name normalization
//!
//! Names arrive in many spellings (`"Source Address Id"`, `"sourceAddressId"`,
//! `"source_address_id"`). Every lookup in the workspace goes through
//! [`normalize_key`], and every text scan goes through [`phrase_pattern`], so
//! the spellings are interchangeable everywhere.

/// Lookup key: lower-case alphanumerics only
///
/// ```
/// use reqtrace_model::naming::normalize_key;
///
/// assert_eq!(normalize_key("Source Address Id"), "sourceaddressid");
/// assert_eq!(normalize_key("sourceAddressId"), "sourceaddressid");
/// assert_eq!(normalize_key("source_address_id"), "sourceaddressid");
/// ```
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a name into lower-case words
///
/// Separators, camelCase humps, acronym boundaries (`CWIDNumber`) and
/// letter/digit transitions all start a new word.
#[must_use]
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }

        if !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic())
                || (prev.is_uppercase() && c.is_uppercase() && next.is_some_and(char::is_lowercase));
            if boundary {
                flush(&mut current, &mut words);
            }
        }

        current.push(c);
    }
    flush(&mut current, &mut words);

    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(current.to_lowercase());
        current.clear();
    }
}

/// Human phrase form of a name (`dateOfBirth` -> `date of birth`)
#[must_use]
pub fn phrase(name: &str) -> String {
    split_words(name).join(" ")
}

/// Case-insensitive, word-bounded regex source matching any spelling of `name`
///
/// Words may be separated by whitespace, `-`, `_` or nothing, so
/// `firstName` matches "first name", "First-Name" and "firstname".
/// Returns `None` for names without any alphanumeric content.
#[must_use]
pub fn phrase_pattern(name: &str) -> Option<String> {
    let words = split_words(name);
    if words.is_empty() {
        return None;
    }

    let body = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join(r"[\s_\-]*");

    Some(format!(r"(?i)\b{body}\b"))
}

/// Whether a name is an all-caps acronym such as `CWID` or `SSN`
#[must_use]
pub fn is_acronym(name: &str) -> bool {
    name.len() >= 2 && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn normalize_equates_spellings() {
        let spellings = ["Source Address Id", "sourceAddressId", "source_address_id", "SOURCE-ADDRESS-ID"];
        for s in spellings {
            assert_eq!(normalize_key(s), "sourceaddressid", "spelling {s}");
        }
    }

    #[test]
    fn split_camel_case() {
        assert_eq!(split_words("dateOfBirth"), vec!["date", "of", "birth"]);
        assert_eq!(split_words("sourceAddressId"), vec!["source", "address", "id"]);
    }

    #[test]
    fn split_acronyms_and_digits() {
        assert_eq!(split_words("CWID"), vec!["cwid"]);
        assert_eq!(split_words("CWIDNumber"), vec!["cwid", "number"]);
        assert_eq!(split_words("addressLine1"), vec!["address", "line", "1"]);
        assert_eq!(split_words("meta_businessId"), vec!["meta", "business", "id"]);
    }

    #[test]
    fn split_empty() {
        assert!(split_words("").is_empty());
        assert!(split_words("__").is_empty());
        assert_eq!(phrase_pattern("--"), None);
    }

    #[test]
    fn phrase_form() {
        assert_eq!(phrase("firstName"), "first name");
        assert_eq!(phrase("postal_code"), "postal code");
    }

    #[test]
    fn phrase_pattern_matches_prose() {
        let re = Regex::new(&phrase_pattern("firstName").unwrap()).unwrap();
        assert!(re.is_match("System shall capture the person's first name"));
        assert!(re.is_match("FIRST-NAME is mandatory"));
        assert!(re.is_match("firstname column"));
        assert!(!re.is_match("the firstnames list"));
    }

    #[test]
    fn phrase_pattern_respects_word_boundaries() {
        let re = Regex::new(&phrase_pattern("CWID").unwrap()).unwrap();
        assert!(re.is_match("CWID replacing PIDM in the UI"));
        assert!(!re.is_match("XCWIDS"));
    }

    #[test]
    fn acronym_detection() {
        assert!(is_acronym("CWID"));
        assert!(is_acronym("SSN"));
        assert!(!is_acronym("Cwid"));
        assert!(!is_acronym("I"));
    }
}
