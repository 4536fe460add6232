//! Word-level feature inventories
//!
//! Builds the per-language table of word forms and the feature value bundles
//! they can carry, for checking a model vocabulary against. A word form can
//! take on a bundle of feature values if either data source says it can: the
//! UniMorph inventory specifies bundles directly, and for the Universal
//! Dependencies data a word can take on a bundle if it is ever seen annotated
//! with it in a corpus for that language. Some forms end up with multiple
//! rows because of syncretism.
//!
//! UniMorph uses its own annotation schema; the mappings here convert
//! UniMorph tags to UD feature values for the features we track.

use crate::config::Language;
use crate::conllu::{ConlluReader, Upos};
use crate::extract::ExtractError;
use crate::features::{Feature, NO_VALUE, FeatValue, Resolved, feature_value};
use log::{info, warn};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One row of the word-feature table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LexiconEntry {
    pub word: String,
    pub pos: String,
    pub number: Resolved,
    pub gender: Resolved,
    pub case: Resolved,
    pub person: Resolved,
}

/// Output column order
const COLUMNS: [&str; 6] = ["word", "pos", "number", "gender", "case", "person"];

impl LexiconEntry {
    fn all_features_missing(&self) -> bool {
        [self.number, self.gender, self.case, self.person]
            .iter()
            .all(|value| *value == Resolved::Missing)
    }
}

/// The POS this project cares about
const POS_OF_INTEREST: [Upos; 6] = [
    Upos::Verb,
    Upos::Noun,
    Upos::Pron,
    Upos::Adj,
    Upos::Det,
    Upos::Aux,
];

/// Map a UniMorph tag set to a UD POS: first mappable tag wins
fn map_pos(tags: &[&str]) -> Option<Upos> {
    tags.iter().find_map(|tag| match *tag {
        "V" | "V.PTCP" => Some(Upos::Verb),
        "N" => Some(Upos::Noun),
        "PRO" => Some(Upos::Pron),
        "ADJ" => Some(Upos::Adj),
        "ART" | "DET" => Some(Upos::Det),
        "AUX" => Some(Upos::Aux),
        _ => None,
    })
}

/// Map a UniMorph tag set to a UD value for `feature`: first mappable tag
/// wins, no mappable tag resolves to missing
fn map_feature(tags: &[&str], feature: Feature) -> Resolved {
    let mapped = tags.iter().find_map(|tag| match (feature, *tag) {
        (Feature::Number, "SG") => Some(FeatValue::Sing),
        (Feature::Number, "PL") => Some(FeatValue::Plur),
        (Feature::Gender, "MASC") => Some(FeatValue::Masc),
        (Feature::Gender, "FEM") => Some(FeatValue::Fem),
        (Feature::Gender, "NEUT") => Some(FeatValue::Neut),
        // only the core case values
        (Feature::Case, "NOM") => Some(FeatValue::Nom),
        (Feature::Case, "ACC") => Some(FeatValue::Acc),
        (Feature::Case, "ERG") => Some(FeatValue::Erg),
        (Feature::Case, "ABS") => Some(FeatValue::Abs),
        (Feature::Person, "1") => Some(FeatValue::First),
        (Feature::Person, "2") => Some(FeatValue::Second),
        (Feature::Person, "3") => Some(FeatValue::Third),
        _ => None,
    });
    match mapped {
        Some(value) => Resolved::Value(value),
        None => Resolved::Missing,
    }
}

/// Read word feature values from a UniMorph inventory file.
///
/// Rows are tab-separated (lemma, inflected form, `;`-separated tags);
/// malformed rows are skipped.
pub fn from_unimorph(path: &Path) -> std::io::Result<Vec<LexiconEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut result = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim().split('\t').collect();
        let &[_lemma, inflected, tags] = fields.as_slice() else {
            continue;
        };
        let tags: Vec<&str> = tags.split(';').collect();
        result.push(LexiconEntry {
            word: inflected.to_string(),
            pos: map_pos(&tags)
                .map(|upos| upos.to_string())
                .unwrap_or_else(|| NO_VALUE.to_string()),
            number: map_feature(&tags, Feature::Number),
            gender: map_feature(&tags, Feature::Gender),
            case: map_feature(&tags, Feature::Case),
            person: map_feature(&tags, Feature::Person),
        });
    }
    Ok(result)
}

/// Read word feature values from every UD corpus file for a language.
///
/// Every token whose POS is one of interest contributes a row.
pub fn from_treebanks(language: &Language, ud_dir: &Path) -> Result<Vec<LexiconEntry>, ExtractError> {
    let mut result = Vec::new();
    for ext in ["conllu", "conllu.gz"] {
        let pattern = format!("{}/**/*.{}", ud_dir.display(), ext);
        let mut files: Vec<_> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
        files.sort();
        for path in files {
            if !path.to_string_lossy().contains(language.name) {
                continue;
            }
            let reader = match ConlluReader::from_file(&path) {
                Ok(reader) => reader,
                Err(e) => {
                    warn!("failed to open {}: {}", path.display(), e);
                    continue;
                }
            };
            for sentence in reader.filter_map(Result::ok) {
                for token in &sentence.tokens {
                    let Some(upos) = token.upos.filter(|u| POS_OF_INTEREST.contains(u)) else {
                        continue;
                    };
                    result.push(LexiconEntry {
                        word: token.form.clone(),
                        pos: upos.to_string(),
                        number: feature_value(token, Feature::Number),
                        gender: feature_value(token, Feature::Gender),
                        case: feature_value(token, Feature::Case),
                        person: feature_value(token, Feature::Person),
                    });
                }
            }
        }
    }
    Ok(result)
}

/// Build the word-feature table for one language.
///
/// Word forms are case-folded: feature values are not expected to differ by
/// casing, and the increased coverage outweighs the rare exception. Rows with
/// no value in any tracked feature are dropped. A missing UniMorph inventory
/// means no supplementary data, not an error.
pub fn prepare(
    language: &Language,
    ud_dir: &Path,
    unimorph_dir: &Path,
) -> Result<Vec<LexiconEntry>, ExtractError> {
    let mut entries = from_treebanks(language, ud_dir)?;

    let unimorph_path = unimorph_dir.join(language.code).join(language.code);
    match from_unimorph(&unimorph_path) {
        Ok(mut supplementary) => entries.append(&mut supplementary),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("no UniMorph data for {}", language.name);
        }
        Err(e) => return Err(e.into()),
    }

    for entry in &mut entries {
        entry.word = entry.word.to_lowercase();
    }
    let mut seen: FxHashSet<LexiconEntry> = FxHashSet::default();
    entries.retain(|entry| seen.insert(entry.clone()));
    entries.retain(|entry| !entry.all_features_missing());
    Ok(entries)
}

/// Write a word-feature table as CSV with the fixed column order
pub fn write_csv(entries: &[LexiconEntry], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(COLUMNS)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

/// Build and write the word-feature table for every language
pub fn run(
    languages: &[Language],
    ud_dir: &Path,
    unimorph_dir: &Path,
    out_dir: &Path,
) -> Result<(), ExtractError> {
    for language in languages {
        let entries = prepare(language, ud_dir, unimorph_dir)?;
        let path = out_dir.join(format!("{}.csv", language.code));
        write_csv(&entries, &path)?;
        info!("prepared features for {}", language.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_map_pos_first_mappable_tag() {
        assert_eq!(map_pos(&["V", "SG", "3"]), Some(Upos::Verb));
        assert_eq!(map_pos(&["IND", "N"]), Some(Upos::Noun));
        assert_eq!(map_pos(&["ART"]), Some(Upos::Det));
        assert_eq!(map_pos(&["IND", "PST"]), None);
    }

    #[test]
    fn test_map_feature() {
        assert_eq!(
            map_feature(&["N", "PL"], Feature::Number),
            Resolved::Value(FeatValue::Plur)
        );
        assert_eq!(
            map_feature(&["V", "3", "SG"], Feature::Person),
            Resolved::Value(FeatValue::Third)
        );
        // GEN is not a core case
        assert_eq!(map_feature(&["N", "GEN"], Feature::Case), Resolved::Missing);
    }

    #[test]
    fn test_from_unimorph() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spa");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            "perro\tperros\tN;PL;MASC\n\
             \n\
             malformed line without tabs\n\
             ser\tes\tV;IND;PRS;3;SG\n"
        )
        .unwrap();

        let entries = from_unimorph(&path).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].word, "perros");
        assert_eq!(entries[0].pos, "NOUN");
        assert_eq!(entries[0].number, Resolved::Value(FeatValue::Plur));
        assert_eq!(entries[0].gender, Resolved::Value(FeatValue::Masc));

        assert_eq!(entries[1].pos, "VERB");
        assert_eq!(entries[1].person, Resolved::Value(FeatValue::Third));
        assert_eq!(entries[1].number, Resolved::Value(FeatValue::Sing));
    }

    #[test]
    fn test_prepare_merges_and_dedups() {
        let ud = tempdir().unwrap();
        let treebank = ud.path().join("UD_Spanish-Test");
        fs::create_dir_all(&treebank).unwrap();
        let mut corpus = fs::File::create(treebank.join("es-test.conllu")).unwrap();
        write!(
            corpus,
            "1\tPerros\tperro\tNOUN\t_\tGender=Masc|Number=Plur\t2\tnsubj\t_\t_\n\
             2\tcorren\tcorrer\tVERB\t_\tNumber=Plur|Person=3\t0\troot\t_\t_\n\
             \n"
        )
        .unwrap();

        let unimorph = tempdir().unwrap();
        let code_dir = unimorph.path().join("spa");
        fs::create_dir_all(&code_dir).unwrap();
        let mut inventory = fs::File::create(code_dir.join("spa")).unwrap();
        // same bundle the treebank attests, lowercased differently
        write!(inventory, "perro\tPERROS\tN;PL;MASC\n").unwrap();

        let spanish = config::language("Spanish").unwrap();
        let entries = prepare(spanish, ud.path(), unimorph.path()).unwrap();

        // "perros" appears once after case-folding and dedup
        let perros: Vec<_> = entries.iter().filter(|e| e.word == "perros").collect();
        assert_eq!(perros.len(), 1);
        assert!(entries.iter().any(|e| e.word == "corren"));
    }

    #[test]
    fn test_prepare_without_unimorph() {
        let ud = tempdir().unwrap();
        let treebank = ud.path().join("UD_Spanish-Test");
        fs::create_dir_all(&treebank).unwrap();
        let mut corpus = fs::File::create(treebank.join("es-test.conllu")).unwrap();
        write!(
            corpus,
            "1\tcasa\tcasa\tNOUN\t_\tGender=Fem|Number=Sing\t0\troot\t_\t_\n\
             \n"
        )
        .unwrap();

        let unimorph = tempdir().unwrap(); // empty: no inventory for Spanish
        let spanish = config::language("Spanish").unwrap();
        let entries = prepare(spanish, ud.path(), unimorph.path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "casa");
    }

    #[test]
    fn test_prepare_drops_featureless_rows() {
        let ud = tempdir().unwrap();
        let treebank = ud.path().join("UD_English-Test");
        fs::create_dir_all(&treebank).unwrap();
        let mut corpus = fs::File::create(treebank.join("en-test.conllu")).unwrap();
        // "the" carries no tracked feature values
        write!(
            corpus,
            "1\tthe\tthe\tDET\t_\tDefinite=Def|PronType=Art\t2\tdet\t_\t_\n\
             2\tdogs\tdog\tNOUN\t_\tNumber=Plur\t0\troot\t_\t_\n\
             \n"
        )
        .unwrap();

        let english = config::language("English").unwrap();
        let entries = prepare(english, ud.path(), tempdir().unwrap().path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "dogs");
    }
}
