//! Ordered keyword rule tables.
//!
//! Each locale has a list of [`KeywordRule`]s evaluated top to bottom; the
//! first rule with any keyword contained in the lowercased input wins.
//! Keyword sets overlap in meaning (a solar *design* question is both
//! renewable and electrical), so table order is part of the behaviour.
//!
//! Keywords are plain lowercase substrings. Accented and unaccented
//! spellings are listed separately where users commonly type both.

use crate::error::AppError;

use super::{CategoryId, Locale};

/// A category and the substrings that route to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub category: CategoryId,
    pub keywords: &'static [&'static str],
}

impl KeywordRule {
    pub const fn new(category: CategoryId, keywords: &'static [&'static str]) -> Self {
        Self { category, keywords }
    }

    /// First keyword contained in `normalized`, if any.
    ///
    /// `normalized` must already be lowercased.
    pub fn first_hit(&self, normalized: &str) -> Option<&'static str> {
        self.keywords.iter().copied().find(|k| normalized.contains(*k))
    }
}

// --- Spanish ---

const ES_PERMITS: &[&str] = &["luma", "permiso", "medición neta", "ogpe", "endoso"];
const ES_RENEWABLE: &[&str] = &["solar", "renovable", "bateria", "batería", "placa"];
const ES_ELECTRICAL: &[&str] = &["subestacion", "transmision", "diseño", "voltaje", "ingenieria"];
const ES_LEGAL: &[&str] = &["ley", "legal", "tribunal", "derecho", "corte", "caso", "demanda"];
const ES_CONTACT: &[&str] = &[
    "cita",
    "correo",
    "email",
    "donde",
    "ubicacion",
    "ubicación",
    "horario",
    "hora",
    "abierto",
    "direccion",
    "ponce",
];

const ES_RULES: &[KeywordRule] = &[
    KeywordRule::new(CategoryId::Permits, ES_PERMITS),
    KeywordRule::new(CategoryId::Renewable, ES_RENEWABLE),
    KeywordRule::new(CategoryId::Electrical, ES_ELECTRICAL),
    KeywordRule::new(CategoryId::Legal, ES_LEGAL),
    KeywordRule::new(CategoryId::Contact, ES_CONTACT),
];

// --- English ---

const EN_PERMITS: &[&str] = &["luma", "permit", "net metering", "ogpe"];
const EN_RENEWABLE: &[&str] = &["solar", "renewable", "battery", "panel"];
const EN_ELECTRICAL: &[&str] = &["substation", "transmission", "design", "engineering"];
const EN_LEGAL: &[&str] = &["law", "legal", "court", "litigation", "case"];
const EN_CONTACT: &[&str] = &[
    "appointment",
    "email",
    "where",
    "location",
    "address",
    "hours",
    "open",
    "schedule",
    "ponce",
];

const EN_RULES: &[KeywordRule] = &[
    KeywordRule::new(CategoryId::Permits, EN_PERMITS),
    KeywordRule::new(CategoryId::Renewable, EN_RENEWABLE),
    KeywordRule::new(CategoryId::Electrical, EN_ELECTRICAL),
    KeywordRule::new(CategoryId::Legal, EN_LEGAL),
    KeywordRule::new(CategoryId::Contact, EN_CONTACT),
];

// ── RuleBook ──────────────────────────────────────────────────────────────────

/// Per-locale rule lists.
#[derive(Debug, Clone, Copy)]
pub struct RuleBook {
    es: &'static [KeywordRule],
    en: &'static [KeywordRule],
}

impl RuleBook {
    pub const fn new(es: &'static [KeywordRule], en: &'static [KeywordRule]) -> Self {
        Self { es, en }
    }

    pub const fn builtin() -> Self {
        Self::new(ES_RULES, EN_RULES)
    }

    /// Rules for `locale`, in evaluation order.
    pub fn rules(&self, locale: Locale) -> &'static [KeywordRule] {
        match locale {
            Locale::Es => self.es,
            Locale::En => self.en,
        }
    }

    /// Reject tables a matcher could never use correctly: rules aimed at
    /// the fallback, empty keyword sets, and keywords that are blank or
    /// not lowercase (those can never match normalized input).
    pub fn validate(&self) -> Result<(), AppError> {
        for &locale in Locale::all() {
            for rule in self.rules(locale) {
                if rule.category == CategoryId::Fallback {
                    return Err(AppError::Config(format!(
                        "'{locale}' has a rule targeting the fallback category"
                    )));
                }
                if rule.keywords.is_empty() {
                    return Err(AppError::Config(format!(
                        "'{locale}' rule for '{}' has no keywords",
                        rule.category
                    )));
                }
                for kw in rule.keywords {
                    if kw.trim().is_empty() || kw.to_lowercase() != *kw {
                        return Err(AppError::Config(format!(
                            "'{locale}' rule for '{}' has unusable keyword '{kw}'",
                            rule.category
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_validate() {
        RuleBook::builtin().validate().unwrap();
    }

    #[test]
    fn builtin_order_is_fixed() {
        let expected = [
            CategoryId::Permits,
            CategoryId::Renewable,
            CategoryId::Electrical,
            CategoryId::Legal,
            CategoryId::Contact,
        ];
        for &locale in Locale::all() {
            let order: Vec<_> = RuleBook::builtin()
                .rules(locale)
                .iter()
                .map(|r| r.category)
                .collect();
            assert_eq!(order, expected, "{locale}");
        }
    }

    #[test]
    fn first_hit_reports_keyword() {
        let rule = KeywordRule::new(CategoryId::Legal, EN_LEGAL);
        assert_eq!(rule.first_hit("a court case"), Some("court"));
        assert_eq!(rule.first_hit("nothing here"), None);
    }

    #[test]
    fn fallback_rule_rejected() {
        const BAD: &[KeywordRule] = &[KeywordRule::new(CategoryId::Fallback, &["x"])];
        let err = RuleBook::new(BAD, EN_RULES).validate().unwrap_err();
        assert!(err.to_string().contains("fallback"));
    }

    #[test]
    fn uppercase_keyword_rejected() {
        const BAD: &[KeywordRule] = &[KeywordRule::new(CategoryId::Permits, &["LUMA"])];
        assert!(RuleBook::new(ES_RULES, BAD).validate().is_err());
    }

    #[test]
    fn empty_keyword_set_rejected() {
        const BAD: &[KeywordRule] = &[KeywordRule::new(CategoryId::Contact, &[])];
        assert!(RuleBook::new(BAD, EN_RULES).validate().is_err());
    }
}
