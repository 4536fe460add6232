//! Cloze masking
//!
//! Renders a sentence with one token replaced by the mask placeholder. The
//! complication is multiword tokens in the UD schema: if the word to mask is
//! part of a multiword token, the whole multiword surface form is masked, and
//! whether masked or not the component words of a multiword token are never
//! emitted individually. Inter-token spacing from the source annotation
//! (SpaceAfter) is not preserved; downstream tokenizers split punctuation
//! off anyway.

use crate::conllu::{Sentence, TokenId};

/// Mask placeholder understood by BERT-style vocabularies
pub const MASK: &str = "[MASK]";

/// Render `sentence` with the token at `mask_id` masked out.
///
/// Tokens with an empty or `_` form (ellipsis placeholders) are skipped.
/// Output is the space-joined sequence of surface forms.
pub fn mask(sentence: &Sentence, mask_id: TokenId) -> String {
    let mut pieces: Vec<&str> = Vec::with_capacity(sentence.tokens.len());
    // word positions consumed by an already-rendered multiword token
    let mut skip: Vec<u32> = Vec::new();

    for token in &sentence.tokens {
        if token.form.is_empty() || token.form == "_" {
            continue;
        }
        match token.id {
            TokenId::Range(start, end) => {
                let covers =
                    matches!(mask_id, TokenId::Single(id) if (start..=end).contains(&id));
                pieces.push(if covers { MASK } else { &token.form });
                skip.extend(start..=end);
            }
            TokenId::Single(id) if skip.contains(&id) => continue,
            id => pieces.push(if id == mask_id { MASK } else { &token.form }),
        }
    }

    pieces.join(" ")
}
