//! Extractive sentence scoring and budget-constrained selection.

/// Lexical resource loading (nouns, verbs, stopwords, proper nouns).
pub mod lexicon;
/// Multi-feature linguistic sentence scorer.
pub mod scorer;
/// Position-stratified greedy sentence selector.
pub mod selector;

pub use lexicon::Lexicon;
pub use scorer::{score_sentences, ScoredSentence};
pub use selector::{Extraction, StratifiedSelector};
