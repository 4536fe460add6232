//! Agreebank: agreement cloze examples from Universal Dependencies
//!
//! A pipeline for testing whether masked language models have learned
//! morphosyntactic agreement. It walks dependency-parsed corpora looking for
//! agreement relations between two tokens (determiner ~ noun, modifying
//! adjective ~ noun, predicated adjective ~ subject, verb ~ subject), masks
//! out one of the words, notes the feature values shared, and writes the
//! result as per-language tables for a downstream inference stage.

pub mod config; // Per-language reference data
pub mod conllu; // CoNLL-U file parsing
pub mod extract; // Cloze example extraction driver
pub mod features; // Feature resolution and agreement values
pub mod lexicon; // Word-level feature inventories
pub mod mask; // Cloze masking
pub mod relations; // Agreement relation patterns

// Re-exports for convenience
pub use config::{LANGUAGES, Language};
pub use conllu::{ConlluReader, ParseError, Sentence, Token, TokenId, Upos};
pub use extract::{ClozeExample, ExtractError, LanguageReport, collect_agreement_relations, prepare};
pub use features::{Agreement, FeatValue, Feature, Resolved, agree, agreement_value, feature_value};
pub use mask::{MASK, mask};
pub use relations::{RULES, RelationType, find_subject};
