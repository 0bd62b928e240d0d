//! Word helpers for user-facing names: pluralization, ordinals, casing.
//!
//! The inflection rules cover regular English nouns plus a short irregular
//! list; that is all table item kinds need.

use regex::Regex;
use std::sync::OnceLock;

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("foot", "feet"),
    ("tooth", "teeth"),
];

const UNCOUNTABLE: &[&str] = &["data", "information", "equipment", "news", "series", "staff"];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rules(table: &'static [(&'static str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|pattern| Rule {
                pattern,
                replacement,
            })
        })
        .collect()
}

fn plural_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        rules(&[
            (r"(?i)([^aeiou])y$", "${1}ies"),
            (r"(?i)(s|x|z|ch|sh)$", "${1}es"),
            (r"(?i)([^f])fe?$", "${1}ves"),
            (r"$", "s"),
        ])
    })
}

fn singular_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        rules(&[
            (r"(?i)(ov)ies$", "${1}ie"),
            (r"(?i)([^aeiou]us|alias)es$", "${1}"),
            (r"(?i)([^aeiou])ies$", "${1}y"),
            (r"(?i)(ss|x|z|ch|sh)es$", "${1}"),
            (r"(?i)(ss|us|is)$", "${1}"),
            (r"(?i)s$", ""),
        ])
    })
}

fn split_last_word(phrase: &str) -> (&str, &str) {
    match phrase.rfind(' ') {
        Some(pos) => phrase.split_at(pos + 1),
        None => ("", phrase),
    }
}

fn match_case(template: &str, word: &str) -> String {
    let mut chars = word.chars();
    match (template.chars().next(), chars.next()) {
        (Some(t), Some(first)) if t.is_uppercase() => {
            first.to_uppercase().chain(chars).collect()
        }
        _ => word.to_string(),
    }
}

fn inflect(phrase: &str, to_plural: bool) -> String {
    let (head, word) = split_last_word(phrase.trim());
    if word.is_empty() {
        return phrase.to_string();
    }
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return phrase.trim().to_string();
    }
    for (singular, plural) in IRREGULAR {
        let (from, to) = if to_plural {
            (*singular, *plural)
        } else {
            (*plural, *singular)
        };
        if lower == from {
            return format!("{head}{}", match_case(word, to));
        }
        if lower == to {
            return phrase.trim().to_string();
        }
    }
    let table = if to_plural {
        plural_rules()
    } else {
        singular_rules()
    };
    for rule in table {
        if rule.pattern.is_match(word) {
            let replaced = rule.pattern.replace(word, rule.replacement);
            return format!("{head}{replaced}");
        }
    }
    phrase.trim().to_string()
}

/// Singular form of the last word of `phrase` ("Employees" -> "Employee")
#[must_use]
pub fn singularize(phrase: &str) -> String {
    inflect(phrase, false)
}

/// Plural form of the last word of `phrase`; already-plural input is kept
#[must_use]
pub fn pluralize(phrase: &str) -> String {
    let singular = singularize(phrase);
    inflect(&singular, true)
}

/// "1st", "2nd", "3rd", "11th", ...
#[must_use]
pub fn ordinalize(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Split identifiers into words: "SignInPage" -> "Sign In Page"
#[must_use]
pub fn humanize(identifier: &str) -> String {
    static BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
    let spaced = identifier.replace(['_', '-'], " ");
    let spaced = match BOUNDARY.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").ok()) {
        Some(re) => re.replace_all(&spaced, "$1 $2").into_owned(),
        None => spaced,
    };
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize every word
#[must_use]
pub fn title_case(phrase: &str) -> String {
    humanize(phrase)
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote and join values for messages: `'a', 'b'`
#[must_use]
pub fn humanize_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod inflection_tests {
        use super::*;

        #[test]
        fn test_singularize() {
            assert_eq!(singularize("Employees"), "Employee");
            assert_eq!(singularize("Categories"), "Category");
            assert_eq!(singularize("Boxes"), "Box");
            assert_eq!(singularize("Addresses"), "Address");
            assert_eq!(singularize("Status"), "Status");
            assert_eq!(singularize("People"), "Person");
            assert_eq!(singularize("Order Items"), "Order Item");
        }

        #[test]
        fn test_singularize_ovies_and_uses() {
            assert_eq!(singularize("Movies"), "Movie");
            assert_eq!(singularize("Statuses"), "Status");
            assert_eq!(singularize("Buses"), "Bus");
            assert_eq!(singularize("Aliases"), "Alias");
            assert_eq!(singularize("Houses"), "House");
            assert_eq!(pluralize("Movie"), "Movies");
            assert_eq!(pluralize("Status"), "Statuses");
            assert_eq!(pluralize("Statuses"), "Statuses");
        }

        #[test]
        fn test_pluralize() {
            assert_eq!(pluralize("Employee"), "Employees");
            assert_eq!(pluralize("Employees"), "Employees");
            assert_eq!(pluralize("Category"), "Categories");
            assert_eq!(pluralize("Box"), "Boxes");
            assert_eq!(pluralize("Day"), "Days");
            assert_eq!(pluralize("Person"), "People");
            assert_eq!(pluralize("staff"), "staff");
        }
    }

    #[test]
    fn test_ordinalize() {
        assert_eq!(ordinalize(1), "1st");
        assert_eq!(ordinalize(2), "2nd");
        assert_eq!(ordinalize(3), "3rd");
        assert_eq!(ordinalize(4), "4th");
        assert_eq!(ordinalize(11), "11th");
        assert_eq!(ordinalize(12), "12th");
        assert_eq!(ordinalize(22), "22nd");
        assert_eq!(ordinalize(101), "101st");
    }

    #[test]
    fn test_humanize_and_title_case() {
        assert_eq!(humanize("SignInPage"), "Sign In Page");
        assert_eq!(humanize("user_settings"), "user settings");
        assert_eq!(title_case("user settings"), "User Settings");
        assert_eq!(title_case("Employees"), "Employees");
    }

    #[test]
    fn test_humanize_list() {
        assert_eq!(humanize_list(&["Alice", "Engineer"]), "'Alice', 'Engineer'");
        assert_eq!(humanize_list::<&str>(&[]), "");
    }
}
