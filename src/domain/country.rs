//! Country value used by the picker and the auth screens
use serde::{Deserialize, Serialize};

/// A country with the essentials for the picker. Identity is the ISO code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// International dial prefix, e.g. "+20".
    pub dial_code: String,
    /// ISO 3166-1 alpha-2 code, e.g. "EG".
    pub iso_code: String,
    pub flag_emoji: String,
}

impl Country {
    pub fn new(
        name: impl Into<String>,
        dial_code: impl Into<String>,
        iso_code: impl Into<String>,
        flag_emoji: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dial_code: dial_code.into(),
            iso_code: iso_code.into(),
            flag_emoji: flag_emoji.into(),
        }
    }

    /// Default selection on the auth screens.
    pub fn egypt() -> Self {
        Self::new("Egypt", "+20", "EG", "\u{1F1EA}\u{1F1EC}")
    }
}

impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.iso_code == other.iso_code
    }
}

impl Eq for Country {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_iso_code() {
        let a = Country::new("Egypt", "+20", "EG", "🇪🇬");
        let b = Country::new("Arab Republic of Egypt", "+20", "EG", "🇪🇬");
        let c = Country::new("Greece", "+30", "GR", "🇬🇷");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
