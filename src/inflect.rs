//! English inflection for deriving a resource's plural name from its
//! singular. Covers the regular suffix rules plus the irregulars and
//! uncountables that show up in practice as resource names.

/// Nouns whose plural is not derivable by suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("datum", "data"),
    ("criterion", "criteria"),
    ("index", "indices"),
];

/// Nouns identical in singular and plural.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "money",
    "news",
    "series",
    "sheep",
    "species",
    "fish",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Pluralize an English noun. Input is expected lower-case (resource names
/// are); mixed-case input is pluralized on its lower-cased form.
pub fn pluralize(singular: &str) -> String {
    let word = singular.to_lowercase();
    if word.is_empty() {
        return word;
    }
    if UNCOUNTABLE.contains(&word.as_str()) {
        return word;
    }
    for (s, p) in IRREGULAR {
        if word == *s {
            return (*p).to_string();
        }
    }

    if word.ends_with("quy") {
        // soliloquy -> soliloquies
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if let Some(stem) = word.strip_suffix('y') {
        match stem.chars().last() {
            Some(c) if !is_vowel(c) => return format!("{}ies", stem),
            _ => return format!("{}s", word),
        }
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }
    if let Some(stem) = word.strip_suffix("fe") {
        return format!("{}ves", stem);
    }
    if let Some(stem) = word.strip_suffix('f') {
        // leaf -> leaves, but roof/chief/belief keep the f
        if !matches!(stem.chars().last(), Some('o' | 'e' | 'f')) {
            return format!("{}ves", stem);
        }
    }
    if let Some(stem) = word.strip_suffix('o') {
        if matches!(stem.chars().last(), Some(c) if !is_vowel(c)) {
            // hero -> heroes, potato -> potatoes; photo/piano are rarer as
            // resource names and accept the -es form too
            return format!("{}es", word);
        }
    }
    format!("{}s", word)
}
