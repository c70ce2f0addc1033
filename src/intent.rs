//! Intent matching: routes free text to a [`CategoryId`] and its reply.
//!
//! Matching is deliberately simple: lowercase the input, walk the locale's
//! ordered [`RuleBook`] and stop at the first rule with a keyword that is a
//! literal substring of the input. There is no scoring and no word-boundary
//! check, so `"law"` also matches inside `"lawn"`.
//!
//! [`IntentMatcher`] holds only `'static` references and is `Copy`; share it
//! freely between sessions and threads.

use tracing::trace;

use crate::error::AppError;
use crate::knowledge::{CategoryId, ContentStore, Locale, RuleBook};

#[derive(Debug, Clone, Copy)]
pub struct IntentMatcher {
    content: &'static ContentStore,
    rules: RuleBook,
}

impl IntentMatcher {
    pub fn new(content: &'static ContentStore, rules: RuleBook) -> Self {
        Self { content, rules }
    }

    /// Built-in content and rules.
    pub fn builtin() -> Self {
        Self::new(ContentStore::builtin(), RuleBook::builtin())
    }

    pub fn content(&self) -> &'static ContentStore {
        self.content
    }

    /// Validate content and rules together. Run once at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        self.content.validate()?;
        self.rules.validate()
    }

    pub fn classify(&self, text: &str, locale: Locale) -> CategoryId {
        let normalized = text.to_lowercase();
        for rule in self.rules.rules(locale) {
            if let Some(keyword) = rule.first_hit(&normalized) {
                trace!(%locale, category = %rule.category, keyword, "rule matched");
                return rule.category;
            }
        }
        CategoryId::Fallback
    }

    /// Reply text for `text`, always drawn from `locale`'s table.
    pub fn respond(&self, text: &str, locale: Locale) -> &'static str {
        self.response_for(self.classify(text, locale), locale)
    }

    pub fn response_for(&self, category: CategoryId, locale: Locale) -> &'static str {
        self.content.get(locale).responses.get(category)
    }
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classify with the built-in matcher.
pub fn classify(text: &str, locale: Locale) -> CategoryId {
    IntentMatcher::builtin().classify(text, locale)
}

/// Respond with the built-in matcher.
pub fn respond(text: &str, locale: Locale) -> &'static str {
    IntentMatcher::builtin().respond(text, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KeywordRule;

    fn en(text: &str) -> CategoryId {
        classify(text, Locale::En)
    }

    fn es(text: &str) -> CategoryId {
        classify(text, Locale::Es)
    }

    #[test]
    fn english_examples() {
        assert_eq!(en("Do I need a permit from LUMA?"), CategoryId::Permits);
        assert_eq!(en("Can you design a solar battery system?"), CategoryId::Renewable);
        assert_eq!(en("What are your hours?"), CategoryId::Contact);
        assert_eq!(en("asdkjasd"), CategoryId::Fallback);
    }

    #[test]
    fn spanish_examples() {
        assert_eq!(es("¿Necesito un permiso de LUMA?"), CategoryId::Permits);
        assert_eq!(es("Quiero placas solares"), CategoryId::Renewable);
        assert_eq!(es("Diseño de una subestación"), CategoryId::Electrical);
        assert_eq!(es("Tengo un caso en el tribunal"), CategoryId::Legal);
        assert_eq!(es("¿Donde queda la oficina?"), CategoryId::Contact);
        // Accented "dónde" is not in the table.
        assert_eq!(es("¿Dónde?"), CategoryId::Fallback);
        assert_eq!(es("qwerty"), CategoryId::Fallback);
    }

    #[test]
    fn empty_and_blank_fall_back() {
        for locale in Locale::all() {
            assert_eq!(classify("", *locale), CategoryId::Fallback);
            assert_eq!(classify("   \t", *locale), CategoryId::Fallback);
        }
    }

    #[test]
    fn substring_matches_inside_words() {
        // No word boundaries: "law" inside "lawn", "hora" inside "ahora".
        assert_eq!(en("my lawn mower"), CategoryId::Legal);
        assert_eq!(es("ahora mismo"), CategoryId::Contact);
    }

    #[test]
    fn earlier_rule_wins() {
        // "design" is electrical, but "solar" sits in the earlier renewable rule.
        assert_eq!(en("solar design"), CategoryId::Renewable);
        assert_eq!(en("design a solar array"), CategoryId::Renewable);
        // "luma" beats "court".
        assert_eq!(en("court hearing about luma"), CategoryId::Permits);
    }

    #[test]
    fn rule_order_is_data_not_code() {
        const A: &[KeywordRule] = &[
            KeywordRule::new(CategoryId::Contact, &["alpha"]),
            KeywordRule::new(CategoryId::Legal, &["beta"]),
        ];
        const B: &[KeywordRule] = &[
            KeywordRule::new(CategoryId::Legal, &["beta"]),
            KeywordRule::new(CategoryId::Contact, &["alpha"]),
        ];
        let forward = IntentMatcher::new(ContentStore::builtin(), RuleBook::new(A, A));
        let reversed = IntentMatcher::new(ContentStore::builtin(), RuleBook::new(B, B));
        assert_eq!(forward.classify("beta alpha", Locale::En), CategoryId::Contact);
        assert_eq!(reversed.classify("beta alpha", Locale::En), CategoryId::Legal);
    }

    #[test]
    fn uppercase_input_matches() {
        assert_eq!(en("NET METERING"), CategoryId::Permits);
        assert_eq!(es("BATERÍA"), CategoryId::Renewable);
        assert_eq!(es("MEDICIÓN NETA"), CategoryId::Permits);
    }

    #[test]
    fn respond_uses_requested_locale() {
        let m = IntentMatcher::builtin();
        let store = m.content();
        assert_eq!(
            m.respond("permit", Locale::En),
            store.get(Locale::En).responses.permits
        );
        // Same text, Spanish table: "permit" is not a Spanish keyword.
        assert_eq!(
            m.respond("permit", Locale::Es),
            store.get(Locale::Es).responses.fallback
        );
    }

    #[test]
    fn builtin_matcher_validates() {
        IntentMatcher::builtin().validate().unwrap();
    }
}
