use serde::{Deserialize, Serialize};

/// Languages the site renders in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// Match a language tag such as `ru`, `ru-RU` or `EN_us`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }

    /// First supported tag of an `Accept-Language` header, in header order
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .find_map(Locale::from_tag)
    }

    /// `?lang=` wins, then `Accept-Language`, then the configured default
    pub fn resolve(query: Option<&str>, accept_language: Option<&str>, fallback: Locale) -> Self {
        query
            .and_then(Locale::from_tag)
            .or_else(|| accept_language.and_then(Locale::from_accept_language))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(Locale::from_tag("ru-RU"), Some(Locale::Ru));
        assert_eq!(Locale::from_tag("EN_us"), Some(Locale::En));
        assert_eq!(Locale::from_tag("de"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_resolution_order() {
        assert_eq!(Locale::resolve(Some("ru"), Some("en"), Locale::En), Locale::Ru);
        assert_eq!(Locale::resolve(Some("fr"), Some("de, ru;q=0.8"), Locale::En), Locale::Ru);
        assert_eq!(Locale::resolve(None, Some("de"), Locale::Ru), Locale::Ru);
        assert_eq!(Locale::resolve(None, None, Locale::En), Locale::En);
    }
}
