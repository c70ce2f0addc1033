//! Law & Energy Consultants FAQ bot.
//!
//! Keyword-triggered, bilingual (Spanish/English) answers to questions about
//! energy permits, renewable systems, electrical engineering, and legal
//! services. Classification is a first-match-wins substring scan over ordered
//! keyword tables; every reply is a fixed localized paragraph.
//!
//! ```
//! use law_energy_bot::{CategoryId, Locale, classify};
//!
//! assert_eq!(classify("How do I get a LUMA permit?", Locale::En), CategoryId::Permits);
//! assert_eq!(classify("hola", Locale::Es), CategoryId::Fallback);
//! ```

pub mod appointment;
pub mod config;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod logger;
pub mod session;
pub mod subsystems;

pub use intent::{IntentMatcher, classify, respond};
pub use knowledge::{CategoryId, ContentStore, Locale};
