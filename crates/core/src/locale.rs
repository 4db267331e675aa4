use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── LOCALE ────────────────────────────────────────────────────────────────────
//

/// Languages the platform ships content in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    He,
    En,
}

impl Locale {
    /// The platform's default locale. Localized fields fall back to it when
    /// the requested translation is missing.
    pub const DEFAULT: Self = Self::He;

    /// Two-letter language code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Locale::He => "he",
            Locale::En => "en",
        }
    }

    /// Parses a language tag, keeping only the base subtag
    /// (`"en-US"` → `En`). Unknown languages resolve to the default locale,
    /// which is the only language guaranteed to have content.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.split('-').next() {
            Some("en") => Locale::En,
            Some("he") => Locale::He,
            _ => Locale::DEFAULT,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

//
// ─── LOCALIZED TEXT ────────────────────────────────────────────────────────────
//

/// A text field that may carry an unsuffixed value and per-locale variants.
///
/// The backend stores older records with a single unsuffixed column and newer
/// ones with `_he`/`_en` variants, so resolution has to handle both shapes.
/// The fallback order is a contract, not an implementation detail:
///
/// 1. the unsuffixed value, when present — it wins even if a variant for the
///    requested locale also exists,
/// 2. the variant for the requested locale,
/// 3. the variant for [`Locale::DEFAULT`],
/// 4. the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    base: Option<String>,
    he: Option<String>,
    en: Option<String>,
}

impl LocalizedText {
    /// A single unsuffixed value, shown under every locale.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            base: Some(text.into()),
            he: None,
            en: None,
        }
    }

    /// A fully translated value with no unsuffixed form.
    #[must_use]
    pub fn translated(he: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            base: None,
            he: Some(he.into()),
            en: Some(en.into()),
        }
    }

    /// Rehydrates a field from its stored columns.
    #[must_use]
    pub fn from_parts(base: Option<String>, he: Option<String>, en: Option<String>) -> Self {
        Self { base, he, en }
    }

    /// Sets the variant for one locale, keeping the rest.
    #[must_use]
    pub fn with_locale(mut self, locale: Locale, text: impl Into<String>) -> Self {
        match locale {
            Locale::He => self.he = Some(text.into()),
            Locale::En => self.en = Some(text.into()),
        }
        self
    }

    /// The unsuffixed value, if any.
    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// The variant stored for one specific locale, without fallback.
    #[must_use]
    pub fn variant(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::He => self.he.as_deref(),
            Locale::En => self.en.as_deref(),
        }
    }

    /// Resolves the best-matching text for a locale per the fallback chain
    /// documented on the type.
    #[must_use]
    pub fn resolve(&self, locale: Locale) -> &str {
        self.base()
            .or_else(|| self.variant(locale))
            .or_else(|| self.variant(Locale::DEFAULT))
            .unwrap_or("")
    }

    /// Returns true when no variant is present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.he.is_none() && self.en.is_none()
    }
}

//
// ─── VISIBILITY ────────────────────────────────────────────────────────────────
//

/// Content that may be restricted to a single locale.
pub trait LocaleVisibility {
    /// The locale this item is published under, if restricted.
    fn language(&self) -> Option<Locale>;

    /// An item with no explicit language is visible everywhere.
    fn visible_in(&self, locale: Locale) -> bool {
        self.language().is_none_or(|published| published == locale)
    }
}
