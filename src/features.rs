//! Morphosyntactic features and agreement values
//!
//! The four features tracked here (number, gender, case, person) are the ones
//! commonly involved in agreement relations cross-linguistically. A token may
//! lack a value for a feature either because the language does not mark that
//! feature on that kind of token or because the annotation is missing; both
//! resolve to `Resolved::Missing` rather than an error.

use crate::conllu::Token;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Sentinel written for a missing feature value.
///
/// A string that table tooling will not read back as NaN, since NaN does not
/// compare equal to itself.
pub const NO_VALUE: &str = "NO VALUE";

/// A tracked agreement feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Number,
    Gender,
    Case,
    Person,
}

impl Feature {
    /// Evaluation order used everywhere features are compared or listed
    pub const ALL: [Feature; 4] = [
        Feature::Number,
        Feature::Gender,
        Feature::Case,
        Feature::Person,
    ];

    /// The title-case key used in CoNLL-U FEATS annotations
    pub fn key(&self) -> &'static str {
        match self {
            Feature::Number => "Number",
            Feature::Gender => "Gender",
            Feature::Case => "Case",
            Feature::Person => "Person",
        }
    }

    /// Parse a feature name, case-insensitively
    pub fn from_name(name: &str) -> Option<Feature> {
        match name.to_lowercase().as_str() {
            "number" => Some(Feature::Number),
            "gender" => Some(Feature::Gender),
            "case" => Some(Feature::Case),
            "person" => Some(Feature::Person),
            _ => None,
        }
    }
}

/// A recognized feature value
///
/// The closed union of values across all four features: singular/plural for
/// number, the three genders, the core cases, and the three persons. A raw
/// annotation value outside this set resolves to missing. Membership is
/// checked against the whole union, not per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatValue {
    Sing,
    Plur,
    Masc,
    Fem,
    Neut,
    Nom,
    Acc,
    Erg,
    Abs,
    First,
    Second,
    Third,
}

impl FeatValue {
    /// Parse a raw CoNLL-U annotation value
    pub fn from_annotation(raw: &str) -> Option<FeatValue> {
        match raw {
            "Sing" => Some(FeatValue::Sing),
            "Plur" => Some(FeatValue::Plur),
            "Masc" => Some(FeatValue::Masc),
            "Fem" => Some(FeatValue::Fem),
            "Neut" => Some(FeatValue::Neut),
            "Nom" => Some(FeatValue::Nom),
            "Acc" => Some(FeatValue::Acc),
            "Erg" => Some(FeatValue::Erg),
            "Abs" => Some(FeatValue::Abs),
            "1" => Some(FeatValue::First),
            "2" => Some(FeatValue::Second),
            "3" => Some(FeatValue::Third),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatValue::Sing => "Sing",
            FeatValue::Plur => "Plur",
            FeatValue::Masc => "Masc",
            FeatValue::Fem => "Fem",
            FeatValue::Neut => "Neut",
            FeatValue::Nom => "Nom",
            FeatValue::Acc => "Acc",
            FeatValue::Erg => "Erg",
            FeatValue::Abs => "Abs",
            FeatValue::First => "1",
            FeatValue::Second => "2",
            FeatValue::Third => "3",
        }
    }
}

impl fmt::Display for FeatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving a feature on a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolved {
    Value(FeatValue),
    Missing,
}

impl Resolved {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolved::Value(value) => value.as_str(),
            Resolved::Missing => NO_VALUE,
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Resolved {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Result of comparing a feature across a token pair
///
/// `Value` when the two tokens genuinely share a value. `Missing` when one
/// side lacks the feature, or both do. `Disagree` when both sides have values
/// and the values differ; most often a bad annotation, though grammatical
/// disagreement does exist (anti-agreement under subject extraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    Value(FeatValue),
    Missing,
    Disagree,
}

/// Per-token feature annotations: feature key to raw annotated values.
///
/// Values are kept sorted so that "first value" is deterministically the
/// lexicographically smallest when an annotation carries a multivalue like
/// `Gender=Masc,Fem`. In-domain data has singleton sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    map: FxHashMap<String, Vec<String>>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, raw: &str) {
        let mut values: Vec<String> = raw.split(',').map(str::to_string).collect();
        values.sort();
        self.map.insert(key.to_string(), values);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.map.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolve the value of `feature` on `token`.
///
/// Returns `Missing` when the feature is absent or its value is not one of
/// the recognized values. Never errors.
pub fn feature_value(token: &Token, feature: Feature) -> Resolved {
    let Some(values) = token.feats.get(feature.key()) else {
        return Resolved::Missing;
    };
    match values.first().and_then(|v| FeatValue::from_annotation(v)) {
        Some(value) => Resolved::Value(value),
        None => Resolved::Missing,
    }
}

/// Compare `feature` across `token1` and `token2`.
///
/// Equal resolutions pass through, covering both a genuinely shared value
/// and both sides missing. Exactly one side missing yields `Missing`; two
/// different values yield `Disagree`.
pub fn agreement_value(token1: &Token, token2: &Token, feature: Feature) -> Agreement {
    let value1 = feature_value(token1, feature);
    let value2 = feature_value(token2, feature);
    if value1 == value2 {
        return match value1 {
            Resolved::Value(value) => Agreement::Value(value),
            Resolved::Missing => Agreement::Missing,
        };
    }
    if value1 == Resolved::Missing || value2 == Resolved::Missing {
        Agreement::Missing
    } else {
        Agreement::Disagree
    }
}

/// True unless any tracked feature evaluates to `Disagree` for the pair.
///
/// All features missing still counts as agreeing here; records with no
/// feature values at all are dropped later at the dataset level.
pub fn agree(token1: &Token, token2: &Token) -> bool {
    Feature::ALL
        .iter()
        .all(|&feature| agreement_value(token1, token2, feature) != Agreement::Disagree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::ConlluReader;
    use crate::conllu::Sentence;

    fn parse(conllu: &str) -> Sentence {
        ConlluReader::from_str(conllu).next().unwrap().unwrap()
    }

    #[test]
    fn test_feature_value_present() {
        let sentence = parse(
            "1\tdogs\tdog\tNOUN\t_\tNumber=Plur\t0\troot\t_\t_\n",
        );
        let dogs = &sentence.tokens[0];

        assert_eq!(
            feature_value(dogs, Feature::Number),
            Resolved::Value(FeatValue::Plur)
        );
        assert_eq!(feature_value(dogs, Feature::Gender), Resolved::Missing);
    }

    #[test]
    fn test_feature_value_unrecognized() {
        // Gen is not one of the core cases we track
        let sentence = parse(
            "1\tdomus\tdomus\tNOUN\t_\tCase=Gen|Number=Sing\t0\troot\t_\t_\n",
        );
        let token = &sentence.tokens[0];

        assert_eq!(feature_value(token, Feature::Case), Resolved::Missing);
        assert_eq!(
            feature_value(token, Feature::Number),
            Resolved::Value(FeatValue::Sing)
        );
    }

    #[test]
    fn test_feature_value_multivalue_picks_smallest() {
        let sentence = parse(
            "1\tleur\tleur\tDET\t_\tGender=Masc,Fem\t0\troot\t_\t_\n",
        );
        let token = &sentence.tokens[0];

        // "Fem" sorts before "Masc"
        assert_eq!(
            feature_value(token, Feature::Gender),
            Resolved::Value(FeatValue::Fem)
        );
    }

    #[test]
    fn test_feature_from_name_case_insensitive() {
        assert_eq!(Feature::from_name("number"), Some(Feature::Number));
        assert_eq!(Feature::from_name("GENDER"), Some(Feature::Gender));
        assert_eq!(Feature::from_name("tense"), None);
    }

    fn pair(conllu: &str) -> Sentence {
        parse(conllu)
    }

    #[test]
    fn test_agreement_value_shared() {
        let sentence = pair(
            "1\tthese\tthis\tDET\t_\tNumber=Plur\t2\tdet\t_\t_\n\
             2\tdogs\tdog\tNOUN\t_\tNumber=Plur\t0\troot\t_\t_\n",
        );
        let (these, dogs) = (&sentence.tokens[0], &sentence.tokens[1]);

        assert_eq!(
            agreement_value(these, dogs, Feature::Number),
            Agreement::Value(FeatValue::Plur)
        );
    }

    #[test]
    fn test_agreement_value_one_side_missing() {
        // "he" marks gender, a predicated adjective does not
        let sentence = pair(
            "1\the\the\tPRON\t_\tGender=Masc|Number=Sing\t2\tnsubj\t_\t_\n\
             2\ttall\ttall\tADJ\t_\tNumber=Sing\t0\troot\t_\t_\n",
        );
        let (he, tall) = (&sentence.tokens[0], &sentence.tokens[1]);

        assert_eq!(
            agreement_value(he, tall, Feature::Gender),
            Agreement::Missing
        );
        assert_eq!(
            agreement_value(he, tall, Feature::Number),
            Agreement::Value(FeatValue::Sing)
        );
    }

    #[test]
    fn test_agreement_value_both_missing() {
        let sentence = pair(
            "1\tthe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n\
             2\tsheep\tsheep\tNOUN\t_\t_\t0\troot\t_\t_\n",
        );
        let (the, sheep) = (&sentence.tokens[0], &sentence.tokens[1]);

        assert_eq!(
            agreement_value(the, sheep, Feature::Number),
            Agreement::Missing
        );
    }

    #[test]
    fn test_agreement_value_disagree() {
        let sentence = pair(
            "1\tthis\tthis\tDET\t_\tNumber=Sing\t2\tdet\t_\t_\n\
             2\tdogs\tdog\tNOUN\t_\tNumber=Plur\t0\troot\t_\t_\n",
        );
        let (this, dogs) = (&sentence.tokens[0], &sentence.tokens[1]);

        assert_eq!(
            agreement_value(this, dogs, Feature::Number),
            Agreement::Disagree
        );
        assert!(!agree(this, dogs));
    }

    #[test]
    fn test_agree_with_missing_features() {
        let sentence = pair(
            "1\the\the\tPRON\t_\tGender=Masc|Number=Sing|Person=3\t2\tnsubj\t_\t_\n\
             2\truns\trun\tVERB\t_\tNumber=Sing|Person=3\t0\troot\t_\t_\n",
        );
        let (he, runs) = (&sentence.tokens[0], &sentence.tokens[1]);

        assert!(agree(he, runs));
    }

    #[test]
    fn test_agree_all_features_missing() {
        let sentence = pair(
            "1\tthe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n\
             2\tsheep\tsheep\tNOUN\t_\t_\t0\troot\t_\t_\n",
        );
        let (the, sheep) = (&sentence.tokens[0], &sentence.tokens[1]);

        // no evidence either way still counts as agreeing at this stage
        assert!(agree(the, sheep));
    }
}
