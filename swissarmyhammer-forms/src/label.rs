//! Human labels derived from field keys.

use heck::ToTitleCase;

/// Turn a snake/kebab-case key into a title-cased label.
///
/// With a locale, words are segmented (including camelCase and digit
/// boundaries) and each is title-cased. With an empty locale this falls back
/// to [`to_display_label_simple`].
pub fn to_display_label(key: &str, locale: &str) -> String {
    if locale.trim().is_empty() {
        return to_display_label_simple(key);
    }
    normalize(key).to_title_case()
}

/// Space-split fallback: capitalize the first character of every word and
/// keep the rest as typed.
pub fn to_display_label_simple(key: &str) -> String {
    normalize(key)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("access_code", "Access Code")]
    #[case("first-name", "First Name")]
    #[case("ACCESS__CODE", "Access Code")]
    #[case("timezone", "Timezone")]
    #[case("address_line_2", "Address Line 2")]
    #[case("_leading_", "Leading")]
    fn segmented_labels(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(to_display_label(key, "en"), expected);
    }

    #[rstest]
    #[case("access_code", "Access Code")]
    #[case("ACCESS_CODE", "ACCESS CODE")]
    #[case("api-URL", "Api URL")]
    #[case("", "")]
    fn simple_labels(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(to_display_label_simple(key), expected);
    }

    #[test]
    fn empty_locale_uses_fallback() {
        assert_eq!(to_display_label("ACCESS_CODE", ""), "ACCESS CODE");
    }
}
