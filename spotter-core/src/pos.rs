//! # Classes Gramaticais (Part-of-Speech)
//!
//! Conjunto fechado de classes gramaticais no padrão **Universal Dependencies**
//! e um etiquetador de referência, determinístico, baseado em léxico e sufixos.
//!
//! O etiquetador não pretende competir com um modelo estatístico: ele existe
//! para que a demonstração rode de ponta a ponta a partir de texto cru. Quem
//! já tem tokens etiquetados por outro sistema pode construí-los diretamente
//! com [`crate::tokenizer::Token::new`].
//!
//! ## Ordem das regras
//!
//! 1. Léxico de palavras funcionais e verbos frequentes (lowercase).
//! 2. Números (`3`, `2.5`, `1,000`, `15%`) → `NUM`.
//! 3. Pontuação → `PUNCT`; símbolos (`#`, `+`, `$`...) → `SYM`.
//! 4. Palavra desconhecida capitalizada → `PROPN`.
//! 5. Sufixos (`-ly` → `ADV`, `-ing`/`-ed` → `VERB`, `-est`/`-ous`... → `ADJ`).
//! 6. Caso contrário → `NOUN`.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Classe gramatical de um token (Universal Dependencies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    /// Adjetivo: "largest", "great".
    Adj,
    /// Adposição: "of", "in".
    Adp,
    /// Advérbio: "still", "recently".
    Adv,
    /// Verbo auxiliar: "has", "will".
    Aux,
    /// Conjunção coordenativa: "and", "or".
    Cconj,
    /// Determinante: "the", "a".
    Det,
    /// Interjeição.
    Intj,
    /// Substantivo comum.
    Noun,
    /// Numeral.
    Num,
    /// Partícula: "not".
    Part,
    /// Pronome.
    Pron,
    /// Nome próprio: "Berlin", "Rust".
    Propn,
    /// Pontuação.
    Punct,
    /// Conjunção subordinativa: "because".
    Sconj,
    /// Símbolo.
    Sym,
    /// Verbo.
    Verb,
    /// Outro.
    X,
    /// Token ainda não etiquetado.
    Unknown,
}

impl PartOfSpeech {
    /// Nome UD da classe (ex: `PROPN`)
    pub fn name(&self) -> &'static str {
        match self {
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adp => "ADP",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Aux => "AUX",
            PartOfSpeech::Cconj => "CCONJ",
            PartOfSpeech::Det => "DET",
            PartOfSpeech::Intj => "INTJ",
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::Num => "NUM",
            PartOfSpeech::Part => "PART",
            PartOfSpeech::Pron => "PRON",
            PartOfSpeech::Propn => "PROPN",
            PartOfSpeech::Punct => "PUNCT",
            PartOfSpeech::Sconj => "SCONJ",
            PartOfSpeech::Sym => "SYM",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::X => "X",
            PartOfSpeech::Unknown => "UNKNOWN",
        }
    }

    /// Tenta parsear a partir do nome UD (ex: "NOUN" → Some(Noun)); aceita minúsculas.
    pub fn from_name(s: &str) -> Option<Self> {
        let pos = match s.to_ascii_uppercase().as_str() {
            "ADJ" => PartOfSpeech::Adj,
            "ADP" => PartOfSpeech::Adp,
            "ADV" => PartOfSpeech::Adv,
            "AUX" => PartOfSpeech::Aux,
            "CCONJ" => PartOfSpeech::Cconj,
            "DET" => PartOfSpeech::Det,
            "INTJ" => PartOfSpeech::Intj,
            "NOUN" => PartOfSpeech::Noun,
            "NUM" => PartOfSpeech::Num,
            "PART" => PartOfSpeech::Part,
            "PRON" => PartOfSpeech::Pron,
            "PROPN" => PartOfSpeech::Propn,
            "PUNCT" => PartOfSpeech::Punct,
            "SCONJ" => PartOfSpeech::Sconj,
            "SYM" => PartOfSpeech::Sym,
            "VERB" => PartOfSpeech::Verb,
            "X" => PartOfSpeech::X,
            "UNKNOWN" => PartOfSpeech::Unknown,
            _ => return None,
        };
        Some(pos)
    }
}

impl Default for PartOfSpeech {
    fn default() -> Self {
        PartOfSpeech::Unknown
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"^[+-]?\d+([.,]\d+)*%?$").unwrap();

    static ref LEXICON: HashMap<&'static str, PartOfSpeech> = {
        use PartOfSpeech::*;
        let groups: &[(PartOfSpeech, &[&str])] = &[
            (Det, &["the", "a", "an", "this", "that", "these", "those", "every", "each", "some", "any", "no", "both", "all"]),
            (Adp, &["of", "in", "on", "at", "by", "for", "with", "from", "to", "into", "about", "over", "after",
                    "before", "under", "between", "through", "during", "without", "since", "as", "across"]),
            (Cconj, &["and", "or", "but", "nor", "so"]),
            (Sconj, &["if", "because", "while", "although", "though", "whether", "unless"]),
            (Pron, &["i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "my", "your", "his",
                     "her", "its", "our", "their", "myself", "who", "what", "which", "others"]),
            // Cópula como verbo principal; demais auxiliares abaixo
            (Verb, &["is", "are", "was", "were", "am", "maintain", "prefer", "use", "make", "say", "go", "get",
                     "know", "think", "see", "come", "take", "want", "like", "need", "learn", "run", "build"]),
            (Aux, &["be", "been", "being", "has", "have", "had", "do", "does", "did", "will", "would", "can",
                    "could", "shall", "should", "may", "might", "must"]),
            (Part, &["not", "n't"]),
            (Adv, &["also", "still", "very", "then", "later", "now", "never", "always", "often", "here", "there",
                    "too", "just", "only", "even", "when", "where", "how", "why", "again"]),
            (Adj, &["good", "great", "new", "old", "large", "big", "small", "many", "other", "first", "last",
                    "best", "few", "several"]),
            (Intj, &["oh", "hello", "yes", "wow"]),
            (Num, &["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"]),
        ];
        let mut lexicon = HashMap::new();
        for (pos, words) in groups {
            for word in *words {
                lexicon.insert(*word, *pos);
            }
        }
        lexicon
    };
}

const ADJ_SUFFIXES: &[&str] = &["est", "ous", "ful", "able", "ible", "ive", "less", "ish"];
const SYMBOLS: &[char] = &['#', '$', '%', '&', '*', '+', '<', '=', '>', '@', '^', '|', '~', '€', '£'];

/// Etiqueta um único token pelo seu texto literal.
pub fn tag(text: &str) -> PartOfSpeech {
    if text.is_empty() {
        return PartOfSpeech::Unknown;
    }

    let lower = text.to_lowercase();
    if let Some(pos) = LEXICON.get(lower.as_str()) {
        return *pos;
    }

    if NUMBER.is_match(text) {
        return PartOfSpeech::Num;
    }

    if !text.chars().any(char::is_alphanumeric) {
        return if text.chars().all(|c| SYMBOLS.contains(&c)) {
            PartOfSpeech::Sym
        } else {
            PartOfSpeech::Punct
        };
    }

    if text.chars().next().map(char::is_uppercase).unwrap_or(false) {
        return PartOfSpeech::Propn;
    }

    let len = lower.chars().count();
    if len > 3 && lower.ends_with("ly") {
        PartOfSpeech::Adv
    } else if len > 4 && (lower.ends_with("ing") || lower.ends_with("ed")) {
        PartOfSpeech::Verb
    } else if len > 4 && ADJ_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        PartOfSpeech::Adj
    } else {
        PartOfSpeech::Noun
    }
}

/// Verifica se o texto tem forma numérica (usado pela restrição `numeric`).
pub fn is_numeric(text: &str) -> bool {
    NUMBER.is_match(text)
}
