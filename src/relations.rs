//! Agreement relation patterns over dependency trees
//!
//! Six predicates covering four cross-linguistically common agreement
//! relation types, plus the ordered dispatch table the extraction driver
//! walks. In each relation the target agrees with the controller:
//!
//! * determiner ~ noun
//! * (modifying) adjective ~ noun
//! * (predicated) adjective ~ (subject) noun
//! * verb(-like) ~ (subject) noun
//!
//! The UD schema annotates a predicated adjective or a verb as the head of
//! its nominal subject, so the predicated/verb predicates take the head
//! first. Copulas and auxiliaries are annotated as dependents of the
//! predicate or main verb, so for those the controller is a separately
//! located subject.

use crate::conllu::{Sentence, Token, TokenId, Upos};
use serde::Serialize;
use std::fmt;

/// Type of agreement relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Determiner,
    Modifying,
    Predicated,
    Verb,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Determiner => "determiner",
            RelationType::Modifying => "modifying",
            RelationType::Predicated => "predicated",
            RelationType::Verb => "verb",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if `dependent`'s head pointer names `head`'s word position
fn attaches_to(dependent: &Token, head: &Token) -> bool {
    matches!(
        (dependent.head, head.id),
        (Some(h), TokenId::Single(id)) if h == id
    )
}

/// `token1` is the determiner of `token2`
pub fn is_determiner_relation(token1: &Token, token2: &Token) -> bool {
    token1.upos == Some(Upos::Det)
        && matches!(token1.deprel.as_str(), "det" | "det:predet")
        && token2.upos == Some(Upos::Noun)
        && attaches_to(token1, token2)
}

/// `token1` is an adjective modifying noun `token2`
pub fn is_modifying_adjective_relation(token1: &Token, token2: &Token) -> bool {
    token1.upos == Some(Upos::Adj)
        && token1.deprel == "amod"
        && token2.upos == Some(Upos::Noun)
        && attaches_to(token1, token2)
}

/// `token1` is an adjective predicated of `token2`
pub fn is_predicated_adjective_relation(token1: &Token, token2: &Token) -> bool {
    token1.upos == Some(Upos::Adj)
        && matches!(token2.upos, Some(Upos::Noun) | Some(Upos::Pron))
        && token2.deprel == "nsubj"
        && attaches_to(token2, token1)
}

/// `token1` is a verb with subject `token2`
pub fn is_verb_relation(token1: &Token, token2: &Token) -> bool {
    token1.upos == Some(Upos::Verb)
        && matches!(token2.upos, Some(Upos::Noun) | Some(Upos::Pron))
        && token2.deprel == "nsubj"
        && attaches_to(token2, token1)
}

/// `token1` is a copula dependent of `token2`
///
/// Adjectival predicates are excluded here; those pairs are already captured
/// by [`is_predicated_adjective_relation`].
pub fn is_copula_relation(token1: &Token, token2: &Token) -> bool {
    token1.deprel == "cop" && token2.upos != Some(Upos::Adj) && attaches_to(token1, token2)
}

/// `token1` is an auxiliary dependent of `token2`
pub fn is_auxiliary_relation(token1: &Token, token2: &Token) -> bool {
    token1.upos == Some(Upos::Aux)
        && matches!(token1.deprel.as_str(), "aux" | "aux:pass")
        && token2.upos == Some(Upos::Verb)
        && attaches_to(token1, token2)
}

/// `token1` is the subject of `token2`
pub fn is_subject(token1: &Token, token2: &Token) -> bool {
    matches!(token1.upos, Some(Upos::Noun) | Some(Upos::Pron))
        && token1.deprel == "nsubj"
        && attaches_to(token1, token2)
}

/// Find the subject of `head` in `sentence`, scanning in token order
pub fn find_subject<'a>(head: &Token, sentence: &'a Sentence) -> Option<&'a Token> {
    sentence
        .tokens
        .iter()
        .find(|candidate| is_subject(candidate, head))
}

/// Argument order a rule's predicate expects, relative to the traversal's
/// (dependent, head) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgOrder {
    /// predicate(dependent, head); the dependent is the agreement target
    DependentHead,
    /// predicate(head, dependent); the head is the agreement target
    HeadDependent,
}

/// One entry of the ordered dispatch table
#[derive(Clone, Copy)]
pub struct Rule {
    pub relation: RelationType,
    pub order: ArgOrder,
    /// controller is a separately located subject rather than the pair member
    pub subject_controller: bool,
    pub matches: fn(&Token, &Token) -> bool,
}

/// Relation rules in priority order; the first match wins per (token, head)
/// pair. The predicates are mutually exclusive by POS/relation combination,
/// but the order is still applied as fixed.
pub const RULES: [Rule; 6] = [
    Rule {
        relation: RelationType::Determiner,
        order: ArgOrder::DependentHead,
        subject_controller: false,
        matches: is_determiner_relation,
    },
    Rule {
        relation: RelationType::Modifying,
        order: ArgOrder::DependentHead,
        subject_controller: false,
        matches: is_modifying_adjective_relation,
    },
    Rule {
        relation: RelationType::Predicated,
        order: ArgOrder::HeadDependent,
        subject_controller: false,
        matches: is_predicated_adjective_relation,
    },
    Rule {
        relation: RelationType::Verb,
        order: ArgOrder::HeadDependent,
        subject_controller: false,
        matches: is_verb_relation,
    },
    Rule {
        relation: RelationType::Verb,
        order: ArgOrder::DependentHead,
        subject_controller: true,
        matches: is_copula_relation,
    },
    Rule {
        relation: RelationType::Verb,
        order: ArgOrder::DependentHead,
        subject_controller: true,
        matches: is_auxiliary_relation,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::ConlluReader;

    fn parse(conllu: &str) -> Sentence {
        ConlluReader::from_str(conllu).next().unwrap().unwrap()
    }

    #[test]
    fn test_determiner_relation() {
        let sentence = parse(
            "1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n\
             2\tdogs\tdog\tNOUN\t_\tNumber=Plur\t3\tnsubj\t_\t_\n\
             3\trun\trun\tVERB\t_\t_\t0\troot\t_\t_\n",
        );
        let (the, dogs, run) = (
            &sentence.tokens[0],
            &sentence.tokens[1],
            &sentence.tokens[2],
        );

        assert!(is_determiner_relation(the, dogs));
        assert!(!is_determiner_relation(the, run)); // wrong head
        assert!(!is_determiner_relation(dogs, run)); // not a determiner
    }

    #[test]
    fn test_predeterminer_counts() {
        let sentence = parse(
            "1\tall\tall\tDET\t_\t_\t3\tdet:predet\t_\t_\n\
             2\tthe\tthe\tDET\t_\t_\t3\tdet\t_\t_\n\
             3\tdogs\tdog\tNOUN\t_\tNumber=Plur\t0\troot\t_\t_\n",
        );
        assert!(is_determiner_relation(
            &sentence.tokens[0],
            &sentence.tokens[2]
        ));
    }

    #[test]
    fn test_modifying_adjective_relation() {
        let sentence = parse(
            "1\tbig\tbig\tADJ\t_\t_\t2\tamod\t_\t_\n\
             2\tdogs\tdog\tNOUN\t_\tNumber=Plur\t0\troot\t_\t_\n",
        );
        assert!(is_modifying_adjective_relation(
            &sentence.tokens[0],
            &sentence.tokens[1]
        ));
    }

    #[test]
    fn test_predicated_adjective_relation() {
        // "He tall" with the adjective as head of the nominal, UD-style
        let sentence = parse(
            "1\tHe\the\tPRON\t_\tNumber=Sing\t2\tnsubj\t_\t_\n\
             2\ttall\ttall\tADJ\t_\t_\t0\troot\t_\t_\n",
        );
        let (he, tall) = (&sentence.tokens[0], &sentence.tokens[1]);

        // head goes first
        assert!(is_predicated_adjective_relation(tall, he));
        assert!(!is_predicated_adjective_relation(he, tall));
    }

    #[test]
    fn test_verb_relation() {
        let sentence = parse(
            "1\tdogs\tdog\tNOUN\t_\tNumber=Plur\t2\tnsubj\t_\t_\n\
             2\trun\trun\tVERB\t_\t_\t0\troot\t_\t_\n",
        );
        let (dogs, run) = (&sentence.tokens[0], &sentence.tokens[1]);

        assert!(is_verb_relation(run, dogs));
        assert!(!is_verb_relation(dogs, run));
    }

    #[test]
    fn test_copula_relation_excludes_adjective_predicate() {
        let adjectival = parse(
            "1\tHe\the\tPRON\t_\t_\t3\tnsubj\t_\t_\n\
             2\tis\tbe\tAUX\t_\t_\t3\tcop\t_\t_\n\
             3\ttall\ttall\tADJ\t_\t_\t0\troot\t_\t_\n",
        );
        // adjectival predicates are the predicated rule's territory
        assert!(!is_copula_relation(
            &adjectival.tokens[1],
            &adjectival.tokens[2]
        ));

        let nominal = parse(
            "1\tHe\the\tPRON\t_\t_\t4\tnsubj\t_\t_\n\
             2\tis\tbe\tAUX\t_\t_\t4\tcop\t_\t_\n\
             3\ta\ta\tDET\t_\t_\t4\tdet\t_\t_\n\
             4\tdoctor\tdoctor\tNOUN\t_\tNumber=Sing\t0\troot\t_\t_\n",
        );
        assert!(is_copula_relation(&nominal.tokens[1], &nominal.tokens[3]));
    }

    #[test]
    fn test_auxiliary_relation() {
        let sentence = parse(
            "1\tdogs\tdog\tNOUN\t_\tNumber=Plur\t3\tnsubj\t_\t_\n\
             2\thave\thave\tAUX\t_\t_\t3\taux\t_\t_\n\
             3\trun\trun\tVERB\t_\t_\t0\troot\t_\t_\n",
        );
        let (have, run) = (&sentence.tokens[1], &sentence.tokens[2]);

        assert!(is_auxiliary_relation(have, run));
        assert!(!is_auxiliary_relation(run, have));
    }

    #[test]
    fn test_find_subject() {
        let sentence = parse(
            "1\tHe\the\tPRON\t_\t_\t4\tnsubj\t_\t_\n\
             2\tis\tbe\tAUX\t_\t_\t4\tcop\t_\t_\n\
             3\ta\ta\tDET\t_\t_\t4\tdet\t_\t_\n\
             4\tdoctor\tdoctor\tNOUN\t_\t_\t0\troot\t_\t_\n",
        );
        let doctor = &sentence.tokens[3];
        let subject = find_subject(doctor, &sentence).unwrap();
        assert_eq!(subject.form, "He");

        let is = &sentence.tokens[1];
        assert!(find_subject(is, &sentence).is_none());
    }

    #[test]
    fn test_rule_priority_order() {
        let relations: Vec<_> = RULES.iter().map(|rule| rule.relation).collect();
        assert_eq!(
            relations,
            [
                RelationType::Determiner,
                RelationType::Modifying,
                RelationType::Predicated,
                RelationType::Verb,
                RelationType::Verb,
                RelationType::Verb,
            ]
        );
    }
}
