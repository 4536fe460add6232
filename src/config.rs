//! Per-language reference data
//!
//! Language names follow the Universal Dependencies corpus directories; the
//! ISO codes are used for UniMorph paths and output file names.
//!
//! The extraction method is language-agnostic and sometimes harvests false
//! positives (e.g. noun ~ modifying adjective "agreement" in English, from
//! incorrect annotations). `relations` lists the agreement relation types
//! attested for each language in reference grammars and the linguistics
//! literature, and is applied as a final filter. The lists are conservative:
//! a language is assumed not to have an agreement type unless it is
//! explicitly mentioned somewhere.

use crate::relations::RelationType;
use RelationType::{Determiner, Modifying, Predicated, Verb};

/// Static configuration for one language
#[derive(Debug, Clone, Copy)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
    /// Agreement relation types attested for this language
    pub relations: &'static [RelationType],
}

/// Look up a language by its Universal Dependencies name
pub fn language(name: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.name == name)
}

/// All languages covered by the pipeline
pub const LANGUAGES: &[Language] = &[
    Language { name: "Afrikaans", code: "afr", relations: &[Modifying] },
    Language { name: "Arabic", code: "ara", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Armenian", code: "hye", relations: &[Verb] },
    Language { name: "Basque", code: "eus", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Breton", code: "bre", relations: &[Verb] },
    Language { name: "Catalan", code: "cat", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Croatian", code: "hrv", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Czech", code: "ces", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Danish", code: "dan", relations: &[Determiner, Modifying, Predicated] },
    Language { name: "Dutch", code: "nld", relations: &[Determiner, Modifying, Verb] },
    Language { name: "English", code: "eng", relations: &[Determiner, Verb] },
    Language { name: "Finnish", code: "fin", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "French", code: "fra", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "German", code: "deu", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Greek", code: "ell", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Hebrew", code: "heb", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Hindi", code: "hin", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Hungarian", code: "hun", relations: &[Predicated] },
    Language { name: "Irish", code: "gle", relations: &[Determiner, Modifying, Verb] },
    Language { name: "Italian", code: "ita", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Latin", code: "lat", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Norwegian-Nynorsk", code: "nno", relations: &[Determiner, Modifying, Predicated] },
    Language { name: "Persian", code: "fas", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Polish", code: "pol", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Portuguese", code: "por", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Romanian", code: "ron", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Russian", code: "rus", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Spanish", code: "spa", relations: &[Determiner, Modifying, Predicated, Verb] },
    Language { name: "Swedish", code: "swe", relations: &[Modifying, Predicated] },
    Language { name: "Tamil", code: "tam", relations: &[Modifying, Verb] },
    Language { name: "Telugu", code: "tel", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Turkish", code: "tur", relations: &[Modifying, Predicated] },
    Language { name: "Ukrainian", code: "ukr", relations: &[Modifying, Predicated, Verb] },
    Language { name: "Urdu", code: "urd", relations: &[Modifying, Predicated, Verb] },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_lookup() {
        let english = language("English").unwrap();
        assert_eq!(english.code, "eng");
        assert_eq!(english.relations, &[Determiner, Verb]);

        assert!(language("Klingon").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in LANGUAGES.iter().enumerate() {
            for b in &LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
                assert_ne!(a.name, b.name);
            }
        }
    }
}
