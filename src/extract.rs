//! Cloze example extraction
//!
//! Walks every token of every sentence looking for instances of the four
//! agreement relation types, masks each side of every instance in turn, and
//! assembles the per-language dataset: concatenated across corpus files,
//! deduplicated on (masked sentence, relation type), filtered down to the
//! relation types attested for the language.
//!
//! Beyond the agreement values themselves, each record carries data for
//! understanding the linguistic contexts in which model performance is
//! affected: the sentence with the other word masked (for linear distance),
//! whether a noun intervenes between the two words, and the number of nouns
//! in the sentence that agree with the masked word.

use crate::config::Language;
use crate::conllu::{ConlluReader, Sentence, Token, Upos};
use crate::features::{Feature, Resolved, agree, feature_value};
use crate::mask::mask;
use crate::relations::{ArgOrder, RULES, RelationType, find_subject};
use log::{info, warn};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Error during extraction
#[derive(Debug)]
pub enum ExtractError {
    /// No corpus files found for a language
    NoExamples(String),
    Pattern(glob::PatternError),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::NoExamples(language) => {
                write!(f, "no cloze examples found for {}", language)
            }
            ExtractError::Pattern(e) => write!(f, "bad glob pattern: {}", e),
            ExtractError::Io(e) => write!(f, "IO error: {}", e),
            ExtractError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<glob::PatternError> for ExtractError {
    fn from(e: glob::PatternError) -> Self {
        ExtractError::Pattern(e)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::Io(e)
    }
}

impl From<csv::Error> for ExtractError {
    fn from(e: csv::Error) -> Self {
        ExtractError::Csv(e)
    }
}

/// One cloze example: an agreement relation instance with one side masked
///
/// Field order is the output column order and must not change; downstream
/// consumers rely on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClozeExample {
    pub uid: String,
    #[serde(rename = "type")]
    pub relation: RelationType,
    pub pos: String,
    pub number: Resolved,
    pub gender: Resolved,
    pub case: Resolved,
    pub person: Resolved,
    pub masked: String,
    pub other_masked: String,
    pub intervening_noun: bool,
    pub num_distractors: usize,
}

/// Output column order
const COLUMNS: [&str; 11] = [
    "uid",
    "type",
    "pos",
    "number",
    "gender",
    "case",
    "person",
    "masked",
    "other_masked",
    "intervening_noun",
    "num_distractors",
];

impl ClozeExample {
    /// True when the masked word carries no value for any tracked feature;
    /// such a record is no evidence of genuine agreement
    pub fn all_features_missing(&self) -> bool {
        [self.number, self.gender, self.case, self.person]
            .iter()
            .all(|value| *value == Resolved::Missing)
    }
}

/// True if a noun lies strictly between `target` and `controller` in linear
/// order. False when the target does not precede the controller.
pub fn intervening_noun(sentence: &Sentence, target: &Token, controller: &Token) -> bool {
    let (Some(from), Some(to)) = (
        sentence.position(target.id),
        sentence.position(controller.id),
    ) else {
        return false;
    };
    if from >= to {
        return false;
    }
    sentence.tokens[from + 1..to]
        .iter()
        .any(|t| t.upos == Some(Upos::Noun))
}

/// Number of nouns in `sentence` that agree with `token` in the tracked
/// features. The true controller counts too when it is a noun.
pub fn count_distractors(sentence: &Sentence, token: &Token) -> usize {
    sentence
        .tokens
        .iter()
        .filter(|t| t.upos == Some(Upos::Noun))
        .filter(|noun| agree(noun, token))
        .count()
}

/// Build one record for a matched relation instance.
///
/// The controller is masked by default; `reverse` masks the target instead,
/// so each instance yields usable examples in both directions.
fn build_example(
    sentence: &Sentence,
    target: &Token,
    controller: &Token,
    relation: RelationType,
    reverse: bool,
) -> ClozeExample {
    let (word_to_mask, other_word) = if reverse {
        (target, controller)
    } else {
        (controller, target)
    };
    ClozeExample {
        uid: sentence.sent_id.clone().unwrap_or_default(),
        relation,
        pos: word_to_mask
            .upos
            .map(|upos| upos.to_string())
            .unwrap_or_else(|| "_".to_string()),
        number: feature_value(word_to_mask, Feature::Number),
        gender: feature_value(word_to_mask, Feature::Gender),
        case: feature_value(word_to_mask, Feature::Case),
        person: feature_value(word_to_mask, Feature::Person),
        masked: mask(sentence, word_to_mask.id),
        other_masked: mask(sentence, other_word.id),
        intervening_noun: intervening_noun(sentence, target, controller),
        num_distractors: count_distractors(sentence, word_to_mask),
    }
}

/// Collect cloze examples from one sentence.
///
/// For each token with a resolvable head, the relation rules are applied in
/// priority order and the first match wins. Records whose token pair
/// disagrees in some feature, or whose masked word has no feature values at
/// all, are dropped here.
fn collect_sentence(sentence: &Sentence, out: &mut Vec<ClozeExample>) {
    for token in &sentence.tokens {
        let Some(head) = sentence.head_of(token) else {
            continue;
        };
        for rule in &RULES {
            let (token1, token2) = match rule.order {
                ArgOrder::DependentHead => (token, head),
                ArgOrder::HeadDependent => (head, token),
            };
            if !(rule.matches)(token1, token2) {
                continue;
            }
            let (target, controller) = if rule.subject_controller {
                // the copula/auxiliary is the agreement target, but the
                // controller is the subject of its lexical head
                match find_subject(token2, sentence) {
                    Some(subject) => (token1, subject),
                    None => break, // no subject, no example
                }
            } else {
                (token1, token2)
            };
            if agree(target, controller) {
                for reverse in [false, true] {
                    let example = build_example(sentence, target, controller, rule.relation, reverse);
                    if !example.all_features_missing() {
                        out.push(example);
                    }
                }
            }
            break; // first matching rule wins for this (token, head) pair
        }
    }
}

/// Collect cloze examples from a stream of sentences.
///
/// Sentences that fail to parse are skipped.
pub fn collect_from_reader<R: BufRead>(reader: ConlluReader<R>) -> Vec<ClozeExample> {
    let mut result = Vec::new();
    for parsed in reader {
        match parsed {
            Ok(sentence) => collect_sentence(&sentence, &mut result),
            Err(e) => warn!("skipping sentence: {}", e),
        }
    }
    result
}

/// Collect cloze examples from one CoNLL-U file
pub fn collect_agreement_relations(path: &Path) -> std::io::Result<Vec<ClozeExample>> {
    Ok(collect_from_reader(ConlluReader::from_file(path)?))
}

/// Extraction counts for one language, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageReport {
    /// distinct examples extracted
    pub total: usize,
    /// examples surviving the validity filter
    pub valid: usize,
}

/// Corpus files for a language, in sorted order for deterministic output
fn corpus_files(language: &Language, ud_dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut files = Vec::new();
    for ext in ["conllu", "conllu.gz"] {
        let pattern = format!("{}/UD_{}*/*.{}", ud_dir.display(), language.name, ext);
        files.extend(glob::glob(&pattern)?.filter_map(Result::ok));
    }
    files.sort();
    Ok(files)
}

/// Deduplicate and filter concatenated examples for one language.
///
/// Duplicate (masked sentence, relation type) pairs keep their first
/// occurrence. Examples whose relation type is not attested for the language
/// are extraction artifacts and are dropped.
fn finalize(
    mut examples: Vec<ClozeExample>,
    language: &Language,
) -> (Vec<ClozeExample>, LanguageReport) {
    let mut seen: FxHashSet<(String, RelationType)> = FxHashSet::default();
    examples.retain(|example| seen.insert((example.masked.clone(), example.relation)));
    let total = examples.len();
    examples.retain(|example| language.relations.contains(&example.relation));
    let valid = examples.len();
    (examples, LanguageReport { total, valid })
}

/// Prepare cloze examples for one language from its UD corpora.
///
/// Returns `ExtractError::NoExamples` when no corpus files exist for the
/// language; callers treat that as a recoverable per-language condition.
pub fn prepare(
    language: &Language,
    ud_dir: &Path,
) -> Result<(Vec<ClozeExample>, LanguageReport), ExtractError> {
    let files = corpus_files(language, ud_dir)?;
    if files.is_empty() {
        return Err(ExtractError::NoExamples(language.name.to_string()));
    }
    let mut examples = Vec::new();
    for path in &files {
        match collect_agreement_relations(path) {
            Ok(mut found) => examples.append(&mut found),
            Err(e) => warn!("failed to read {}: {}", path.display(), e),
        }
    }
    Ok(finalize(examples, language))
}

/// Write examples as CSV with the fixed column order
pub fn write_csv(examples: &[ClozeExample], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(COLUMNS)?;
    for example in examples {
        writer.serialize(example)?;
    }
    writer.flush()?;
    Ok(())
}

/// Run cloze extraction for every language, writing one CSV per language.
///
/// A language with no corpus is logged and skipped; the run continues.
pub fn run(languages: &[Language], ud_dir: &Path, out_dir: &Path) -> Result<(), ExtractError> {
    let mut total = 0;
    let mut valid = 0;
    for language in languages {
        match prepare(language, ud_dir) {
            Ok((examples, report)) => {
                total += report.total;
                valid += report.valid;
                let path = out_dir.join(format!("{}.csv", language.code));
                write_csv(&examples, &path)?;
                info!("prepared cloze examples for {}", language.name);
            }
            Err(ExtractError::NoExamples(name)) => {
                info!("no cloze examples found for {}", name);
            }
            Err(e) => return Err(e),
        }
    }
    if total > 0 {
        info!(
            "{} examples extracted, {} valid ({:.3})",
            total,
            valid,
            valid as f64 / total as f64
        );
    }
    Ok(())
}
