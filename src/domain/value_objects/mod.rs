//! Value Objects for the catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Human-readable product code (`PRD00001`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    pub const PREFIX: &'static str = "PRD";

    /// Builds the code for the n-th product ever created.
    pub fn from_sequence(n: i64) -> Self { Self(format!("{}{:05}", Self::PREFIX, n)) }

    pub fn parse(value: impl Into<String>) -> Result<Self, CodeError> {
        let value = value.into().trim().to_uppercase();
        let digits = value.strip_prefix(Self::PREFIX).ok_or(CodeError::Prefix)?;
        if digits.len() < 5 || !digits.chars().all(|c| c.is_ascii_digit()) { return Err(CodeError::Digits); }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CodeError { Prefix, Digits }
impl std::error::Error for CodeError {}
impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Prefix => write!(f, "code must start with PRD"), Self::Digits => write!(f, "code needs at least five digits") }
    }
}

/// URL-safe category identifier: `[a-z0-9]+(-[a-z0-9]+)*`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Slug(String);

impl Slug {
    /// Accepts an explicitly supplied slug as-is, provided it is well formed.
    pub fn parse(value: &str) -> Result<Self, SlugError> {
        let value = value.trim();
        if value.is_empty() { return Err(SlugError::Empty); }
        let well_formed = value
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        if !well_formed { return Err(SlugError::Malformed); }
        Ok(Self(value.to_string()))
    }

    /// Derives a slug from a display name, transliterating Russian letters.
    ///
    /// Whitespace and `-` both separate words, `&` reads as `and`, and any
    /// other character that is not an ASCII letter or digit is dropped.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        fn split(current: &mut String, words: &mut Vec<String>) {
            if !current.is_empty() { words.push(std::mem::take(current)); }
        }
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();
        for ch in name.to_lowercase().chars() {
            if let Some(latin) = transliterate(ch) {
                current.push_str(latin);
            } else if ch.is_ascii_alphanumeric() {
                current.push(ch);
            } else if ch == '&' {
                split(&mut current, &mut words);
                words.push("and".to_string());
            } else if ch == '-' || ch.is_whitespace() {
                split(&mut current, &mut words);
            }
        }
        split(&mut current, &mut words);
        if words.is_empty() { return Err(SlugError::Empty); }
        Ok(Self(words.join("-")))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a", 'б' => "b", 'в' => "v", 'г' => "g", 'д' => "d", 'е' => "e", 'ё' => "yo", 'ж' => "zh",
        'з' => "z", 'и' => "i", 'й' => "y", 'к' => "k", 'л' => "l", 'м' => "m", 'н' => "n", 'о' => "o",
        'п' => "p", 'р' => "r", 'с' => "s", 'т' => "t", 'у' => "u", 'ф' => "f", 'х' => "h", 'ц' => "ts",
        'ч' => "ch", 'ш' => "sh", 'щ' => "sch", 'ъ' => "", 'ы' => "y", 'ь' => "", 'э' => "e", 'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SlugError { Empty, Malformed }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Slug cannot be empty"),
            Self::Malformed => write!(f, "Slug may only contain lowercase latin letters, digits and single hyphens"),
        }
    }
}

/// Price in whole roubles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Price(i64);

impl Price {
    pub fn new(amount: i64) -> Self { Self(amount) }
    pub fn amount(&self) -> i64 { self.0 }

    /// Russian-locale rendering: `90 000 ₽` with non-breaking spaces.
    pub fn format_rub(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 2 + 4);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 { grouped.push('\u{a0}'); }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{grouped}\u{a0}₽")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.format_rub()) }
}

/// The option-value ids that identify one variant.
///
/// Travels as a JSON array of id strings and is stored as the same JSON text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionKey(Vec<Uuid>);

impl SelectionKey {
    pub fn new(ids: Vec<Uuid>) -> Self { Self(ids) }
    pub fn ids(&self) -> &[Uuid] { &self.0 }
    pub fn contains(&self, id: &Uuid) -> bool { self.0.contains(id) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn encode(&self) -> Result<String, SelectionKeyError> {
        serde_json::to_string(&self.0).map_err(|e| SelectionKeyError(e.to_string()))
    }

    /// Blank text decodes to an empty key.
    pub fn decode(text: &str) -> Result<Self, SelectionKeyError> {
        if text.trim().is_empty() { return Ok(Self::default()); }
        serde_json::from_str(text).map(Self).map_err(|e| SelectionKeyError(e.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed selection key: {0}")]
pub struct SelectionKeyError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_code() {
        assert_eq!(ProductCode::from_sequence(1).as_str(), "PRD00001");
        assert_eq!(ProductCode::from_sequence(123456).as_str(), "PRD123456");
        assert_eq!(ProductCode::parse("prd00042").unwrap().as_str(), "PRD00042");
        assert_eq!(ProductCode::parse("SKU00042"), Err(CodeError::Prefix));
        assert_eq!(ProductCode::parse("PRD42"), Err(CodeError::Digits));
    }

    #[test]
    fn test_slug_transliteration() {
        assert_eq!(Slug::from_name("Смартфоны").unwrap().as_str(), "smartfony");
        assert_eq!(Slug::from_name("Электроника").unwrap().as_str(), "elektronika");
        assert_eq!(Slug::from_name("  Наушники и Аудио ").unwrap().as_str(), "naushniki-i-audio");
        assert_eq!(Slug::from_name("Wi-Fi роутеры").unwrap().as_str(), "wi-fi-routery");
        assert_eq!(Slug::from_name("Объём").unwrap().as_str(), "obyom");
        assert_eq!(Slug::from_name("!!!"), Err(SlugError::Empty));
    }

    #[test]
    fn test_slug_separators() {
        assert_eq!(Slug::from_name("USB-C кабели").unwrap().as_str(), "usb-c-kabeli");
        assert_eq!(Slug::from_name("Тв & Видео").unwrap().as_str(), "tv-and-video");
        assert_eq!(Slug::from_name("Tom&Jerry").unwrap().as_str(), "tom-and-jerry");
        assert_eq!(Slug::from_name("-- Аксессуары --").unwrap().as_str(), "aksessuary");
        assert_eq!(Slug::from_name("a -- b").unwrap().as_str(), "a-b");
        assert!(Slug::parse(Slug::from_name("Wi-Fi - роутеры!").unwrap().as_str()).is_ok());
    }

    #[test]
    fn test_slug_parse() {
        assert_eq!(Slug::parse("smartphones").unwrap().as_str(), "smartphones");
        assert_eq!(Slug::parse("usb-c-cables").unwrap().as_str(), "usb-c-cables");
        assert_eq!(Slug::parse("Bad Slug"), Err(SlugError::Malformed));
        assert_eq!(Slug::parse("double--dash"), Err(SlugError::Malformed));
        assert_eq!(Slug::parse(" "), Err(SlugError::Empty));
    }

    #[test]
    fn test_price_format() {
        assert_eq!(Price::new(90000).format_rub(), "90\u{a0}000\u{a0}₽");
        assert_eq!(Price::new(999).format_rub(), "999\u{a0}₽");
        assert_eq!(Price::new(1234567).to_string(), "1\u{a0}234\u{a0}567\u{a0}₽");
        assert_eq!(Price::new(0).format_rub(), "0\u{a0}₽");
    }

    #[test]
    fn test_selection_key_storage_keeps_order() {
        let ids = vec![Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
        let reversed: Vec<Uuid> = ids.iter().rev().copied().collect();
        let key = SelectionKey::new(reversed.clone());
        let decoded = SelectionKey::decode(&key.encode().unwrap()).unwrap();
        assert_eq!(decoded.ids(), reversed.as_slice());
    }

    #[test]
    fn test_selection_key_blank_and_garbage() {
        assert!(SelectionKey::decode("").unwrap().is_empty());
        assert!(SelectionKey::decode("not json").is_err());
    }
}
