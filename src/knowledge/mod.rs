//! Knowledge base: the firm's bilingual content and keyword rules.
//!
//! Everything here is static data embedded at compile time. The
//! [`ContentStore`] is a typed record keyed by [`Locale`], so adding a
//! language is a compile error until every table has an entry for it.
//!
//! # Module layout
//!
//! - **catalog**: display strings, office details, form text and category
//!   responses for each locale.
//! - **rules**: the ordered keyword rule tables consumed by
//!   [`IntentMatcher`](crate::intent::IntentMatcher).

mod catalog;
pub mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use rules::{KeywordRule, RuleBook};

// ── Locale ────────────────────────────────────────────────────────────────────

/// Active display/response language for a session.
///
/// `Es` is the primary locale and the default; the firm's clients are
/// predominantly Spanish-speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    /// Label shown on the language toggle.
    pub fn label(&self) -> &'static str {
        match self {
            Locale::Es => "Español",
            Locale::En => "English",
        }
    }

    /// All supported locales, in toggle order.
    pub fn all() -> &'static [Locale] {
        &[Locale::Es, Locale::En]
    }

    /// Parse an ISO code or toggle label, case-insensitively.
    ///
    /// Anything outside the closed set is a configuration defect in the
    /// caller and is reported as [`AppError::Config`].
    pub fn parse(value: &str) -> Result<Locale, AppError> {
        match value.trim().to_lowercase().as_str() {
            "es" | "español" | "espanol" | "spanish" => Ok(Locale::Es),
            "en" | "english" | "inglés" | "ingles" => Ok(Locale::En),
            _ => Err(AppError::Config(format!("unsupported locale '{value}'"))),
        }
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── CategoryId ────────────────────────────────────────────────────────────────

/// Topical bucket a user query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Permits,
    Renewable,
    Electrical,
    Legal,
    Contact,
    /// Default when no rule matches. Never the target of a rule.
    Fallback,
}

impl CategoryId {
    pub fn key(&self) -> &'static str {
        match self {
            CategoryId::Permits => "permits",
            CategoryId::Renewable => "renewable",
            CategoryId::Electrical => "electrical",
            CategoryId::Legal => "legal",
            CategoryId::Contact => "contact",
            CategoryId::Fallback => "fallback",
        }
    }

    /// Every category, fallback last.
    pub fn all() -> &'static [CategoryId] {
        &[
            CategoryId::Permits,
            CategoryId::Renewable,
            CategoryId::Electrical,
            CategoryId::Legal,
            CategoryId::Contact,
            CategoryId::Fallback,
        ]
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Content records ───────────────────────────────────────────────────────────

/// Canned reply per category. One field per [`CategoryId`] so exactly one
/// fallback exists by construction.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Responses {
    pub permits: &'static str,
    pub renewable: &'static str,
    pub electrical: &'static str,
    pub legal: &'static str,
    pub contact: &'static str,
    pub fallback: &'static str,
}

impl Responses {
    pub fn get(&self, category: CategoryId) -> &'static str {
        match category {
            CategoryId::Permits => self.permits,
            CategoryId::Renewable => self.renewable,
            CategoryId::Electrical => self.electrical,
            CategoryId::Legal => self.legal,
            CategoryId::Contact => self.contact,
            CategoryId::Fallback => self.fallback,
        }
    }
}

/// Office contact details shown in the sidebar / `/contact`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OfficeInfo {
    pub location_label: &'static str,
    pub address: &'static str,
    pub email_label: &'static str,
    pub email: &'static str,
    pub hours_label: &'static str,
    pub hours: &'static str,
}

/// Labels and outcome messages for the appointment request form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormText {
    pub heading: &'static str,
    pub name_label: &'static str,
    pub email_label: &'static str,
    pub phone_label: &'static str,
    pub description_label: &'static str,
    pub submit_label: &'static str,
    pub success: &'static str,
    pub missing_required: &'static str,
}

/// Everything a host needs to render one locale.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LocaleContent {
    pub locale: Locale,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub welcome: &'static str,
    pub placeholder: &'static str,
    pub thinking: &'static str,
    pub office: OfficeInfo,
    pub form: FormText,
    pub responses: Responses,
}

impl LocaleContent {
    /// Every display string paired with a field name, for validation.
    fn fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut out = vec![
            ("title", self.title),
            ("subtitle", self.subtitle),
            ("welcome", self.welcome),
            ("placeholder", self.placeholder),
            ("thinking", self.thinking),
            ("office.location_label", self.office.location_label),
            ("office.address", self.office.address),
            ("office.email_label", self.office.email_label),
            ("office.email", self.office.email),
            ("office.hours_label", self.office.hours_label),
            ("office.hours", self.office.hours),
            ("form.heading", self.form.heading),
            ("form.name_label", self.form.name_label),
            ("form.email_label", self.form.email_label),
            ("form.phone_label", self.form.phone_label),
            ("form.description_label", self.form.description_label),
            ("form.submit_label", self.form.submit_label),
            ("form.success", self.form.success),
            ("form.missing_required", self.form.missing_required),
        ];
        out.extend(
            CategoryId::all()
                .iter()
                .map(|c| (c.key(), self.responses.get(*c))),
        );
        out
    }
}

// ── ContentStore ──────────────────────────────────────────────────────────────

/// Immutable locale-keyed content table.
#[derive(Debug)]
pub struct ContentStore {
    pub(crate) es: LocaleContent,
    pub(crate) en: LocaleContent,
}

impl ContentStore {
    /// The firm's built-in content.
    pub fn builtin() -> &'static ContentStore {
        &catalog::CONTENT
    }

    pub fn get(&self, locale: Locale) -> &LocaleContent {
        match locale {
            Locale::Es => &self.es,
            Locale::En => &self.en,
        }
    }

    /// String-keyed access for hosts that carry the locale as text.
    pub fn lookup(&self, code: &str) -> Result<&LocaleContent, AppError> {
        Locale::parse(code).map(|locale| self.get(locale))
    }

    /// Check that every entry is filed under its own locale and that no
    /// display string or response is blank.
    pub fn validate(&self) -> Result<(), AppError> {
        for &locale in Locale::all() {
            let content = self.get(locale);
            if content.locale != locale {
                return Err(AppError::Config(format!(
                    "content for '{locale}' is tagged '{}'",
                    content.locale
                )));
            }
            let blank = content
                .fields()
                .into_iter()
                .find(|(_, value)| value.trim().is_empty());
            if let Some((field, _)) = blank {
                return Err(AppError::Config(format!(
                    "content for '{locale}' has an empty '{field}'"
                )));
            }
        }
        Ok(())
    }
}
