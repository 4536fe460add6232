//! CoNLL-U file parsing
//!
//! Parses CoNLL-U format files into Sentence structures. Multiword tokens and
//! empty nodes are kept in the token sequence: masking has to see multiword
//! ranges to suppress their component words, and the extraction loop visits
//! every annotated row. Gzip-compressed files are read transparently.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::features::Features;
use flate2::read::MultiGzDecoder;
use rustc_hash::FxHashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::str::FromStr;

/// Error during CoNLL-U parsing
#[derive(Debug)]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error at line {}: {}", self.line_num, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Token identifier: a word position, a multiword range, or an empty node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenId {
    Single(u32),
    Range(u32, u32),
    Decimal(u32, u32),
}

impl TokenId {
    /// The word positions covered by a multiword range
    pub fn span(&self) -> Option<std::ops::RangeInclusive<u32>> {
        match self {
            TokenId::Range(start, end) => Some(*start..=*end),
            _ => None,
        }
    }

    pub fn is_multiword(&self) -> bool {
        matches!(self, TokenId::Range(_, _))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Single(id) => write!(f, "{}", id),
            TokenId::Range(start, end) => write!(f, "{}-{}", start, end),
            TokenId::Decimal(main, sub) => write!(f, "{}.{}", main, sub),
        }
    }
}

/// Universal POS tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Upos {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upos::Adj => "ADJ",
            Upos::Adp => "ADP",
            Upos::Adv => "ADV",
            Upos::Aux => "AUX",
            Upos::Cconj => "CCONJ",
            Upos::Det => "DET",
            Upos::Intj => "INTJ",
            Upos::Noun => "NOUN",
            Upos::Num => "NUM",
            Upos::Part => "PART",
            Upos::Pron => "PRON",
            Upos::Propn => "PROPN",
            Upos::Punct => "PUNCT",
            Upos::Sconj => "SCONJ",
            Upos::Sym => "SYM",
            Upos::Verb => "VERB",
            Upos::X => "X",
        }
    }
}

impl FromStr for Upos {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADJ" => Ok(Upos::Adj),
            "ADP" => Ok(Upos::Adp),
            "ADV" => Ok(Upos::Adv),
            "AUX" => Ok(Upos::Aux),
            "CCONJ" => Ok(Upos::Cconj),
            "DET" => Ok(Upos::Det),
            "INTJ" => Ok(Upos::Intj),
            "NOUN" => Ok(Upos::Noun),
            "NUM" => Ok(Upos::Num),
            "PART" => Ok(Upos::Part),
            "PRON" => Ok(Upos::Pron),
            "PROPN" => Ok(Upos::Propn),
            "PUNCT" => Ok(Upos::Punct),
            "SCONJ" => Ok(Upos::Sconj),
            "SYM" => Ok(Upos::Sym),
            "VERB" => Ok(Upos::Verb),
            "X" => Ok(Upos::X),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Upos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotated row of a sentence
///
/// Immutable once parsed; owned by its sentence. `head` is `None` for rows
/// annotated `_` (multiword tokens, empty nodes) and `Some(0)` for the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    pub upos: Option<Upos>,
    pub deprel: String,
    pub head: Option<u32>,
    pub feats: Features,
}

/// An ordered sequence of tokens with a sentence-level identifier
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pub sent_id: Option<String>,
    pub text: Option<String>,
    pub tokens: Vec<Token>,
    index: FxHashMap<u32, usize>,
}

impl Sentence {
    /// Look up a token by single word position
    pub fn token(&self, id: u32) -> Option<&Token> {
        self.index.get(&id).map(|&i| &self.tokens[i])
    }

    /// Linear position of a token in the sequence
    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.tokens.iter().position(|t| t.id == id)
    }

    /// Resolve a token's head, if it has one
    ///
    /// Returns `None` for the root, for rows with no head annotation, and
    /// for heads that cannot be resolved in this sentence.
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        token.head.filter(|&h| h != 0).and_then(|h| self.token(h))
    }

    fn push(&mut self, token: Token) {
        if let TokenId::Single(id) = token.id {
            self.index.insert(id, self.tokens.len());
        }
        self.tokens.push(token);
    }
}

/// CoNLL-U reader that iterates over sentences
pub struct ConlluReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl ConlluReader<Box<dyn BufRead>> {
    /// Create a reader from a file path
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self {
            lines: reader.lines(),
            line_num: 0,
        })
    }
}

impl ConlluReader<BufReader<std::io::Cursor<String>>> {
    /// Create a reader from a string
    pub fn from_str(text: &str) -> Self {
        let cursor = std::io::Cursor::new(text.to_string());
        let reader = BufReader::new(cursor);
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl<R: BufRead> Iterator for ConlluReader<R> {
    type Item = Result<Sentence, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut token_lines = Vec::new();
        let mut sent_id = None;
        let mut text = None;

        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if token_lines.is_empty() {
                        return None;
                    }
                    // last sentence without trailing blank line
                    break;
                }
                Some(Err(e)) => {
                    return Some(Err(ParseError {
                        line_num: self.line_num,
                        message: format!("IO error: {}", e),
                    }));
                }
                Some(Ok(line)) => {
                    let line = line.trim();

                    if line.is_empty() {
                        // blank line = sentence boundary
                        if !token_lines.is_empty() {
                            break;
                        }
                        continue;
                    }

                    if let Some(comment) = line.strip_prefix('#') {
                        parse_comment(comment, &mut sent_id, &mut text);
                        continue;
                    }

                    token_lines.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_sentence(token_lines, sent_id, text))
    }
}

/// Parse a comment line (starts with #)
fn parse_comment(comment: &str, sent_id: &mut Option<String>, text: &mut Option<String>) {
    if let Some(eq_pos) = comment.find('=') {
        let key = comment[..eq_pos].trim();
        let value = comment[eq_pos + 1..].trim();
        match key {
            "sent_id" => *sent_id = Some(value.to_string()),
            "text" => *text = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Parse accumulated token lines into a Sentence
fn parse_sentence(
    lines: Vec<(usize, String)>,
    sent_id: Option<String>,
    text: Option<String>,
) -> Result<Sentence, ParseError> {
    let mut sentence = Sentence {
        sent_id,
        text,
        ..Sentence::default()
    };
    for (line_num, line) in lines {
        sentence.push(parse_line(&line, line_num)?);
    }
    Ok(sentence)
}

/// Parse a single CoNLL-U line into a Token
fn parse_line(line: &str, line_num: usize) -> Result<Token, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ParseError {
            line_num,
            message: format!("Expected 10 fields, found {}", fields.len()),
        });
    }

    let id = parse_id(fields[0], line_num)?;
    let form = fields[1].to_string();
    let lemma = if fields[2] == "_" {
        form.clone()
    } else {
        fields[2].to_string()
    };
    let upos = Upos::from_str(fields[3]).ok();
    let feats = parse_features(fields[5]);
    let head = parse_head(fields[6], line_num)?;
    let deprel = fields[7].to_string();

    Ok(Token {
        id,
        form,
        lemma,
        upos,
        deprel,
        head,
        feats,
    })
}

/// Parse ID field (integer, range, or decimal)
fn parse_id(s: &str, line_num: usize) -> Result<TokenId, ParseError> {
    let parse_part = |part: &str| {
        part.parse::<u32>().map_err(|_| ParseError {
            line_num,
            message: format!("Invalid ID: {}", s),
        })
    };
    if let Some((start, end)) = s.split_once('-') {
        Ok(TokenId::Range(parse_part(start)?, parse_part(end)?))
    } else if let Some((main, sub)) = s.split_once('.') {
        Ok(TokenId::Decimal(parse_part(main)?, parse_part(sub)?))
    } else {
        Ok(TokenId::Single(parse_part(s)?))
    }
}

/// Parse HEAD field (0 for root, `_` for rows with no head)
fn parse_head(s: &str, line_num: usize) -> Result<Option<u32>, ParseError> {
    if s == "_" {
        return Ok(None);
    }
    s.parse::<u32>().map(Some).map_err(|_| ParseError {
        line_num,
        message: format!("Invalid HEAD: {}", s),
    })
}

/// Parse FEATS field (key=value|key=value)
fn parse_features(s: &str) -> Features {
    let mut feats = Features::new();

    if s == "_" {
        return feats;
    }

    for pair in s.split('|') {
        if let Some(eq_pos) = pair.find('=') {
            feats.insert(&pair[..eq_pos], &pair[eq_pos + 1..]);
        }
    }

    feats
}
