//! # Tokenizador
//!
//! Responsável por dividir o texto bruto em tokens individuais (palavras, pontuações)
//! e atribuir a cada um sua classe gramatical. Cada token preserva sua posição
//! original no texto (offset) para permitir destacar entidades na interface web.
//!
//! ## Regras de segmentação
//!
//! - Palavras separadas por espaços e pontuações.
//! - Abreviações comuns ("Dr.", "Inc.") e números decimais ("2.5") ficam juntos.
//! - Hífens e apóstrofos internos ficam na palavra ("multi-paradigm", "don't").
//! - `#` e `+` logo após uma palavra fazem parte dela, para nomes como "C#" e "C++".
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use spotter_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("I moved from C++ to Rust.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["I", "moved", "from", "C++", "to", "Rust", "."]);
//! ```

use serde::{Deserialize, Serialize};

use crate::pos::{self, PartOfSpeech};

/// Um token extraído do texto original.
///
/// O `Token` é a unidade atômica de processamento do pipeline e é imutável depois
/// de criado. Pertence a exatamente um documento e é identificado por `index`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto literal do token (ex: "Python", ",", "C#").
    pub text: String,
    /// Forma normalizada (lowercase), usada nas comparações sem caixa.
    pub norm: String,
    /// Classe gramatical.
    pub pos: PartOfSpeech,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Cria um token já etiquetado, sem offsets no texto original.
    ///
    /// Útil quando a tokenização vem de outro sistema.
    pub fn new(index: usize, text: impl Into<String>, pos: PartOfSpeech) -> Self {
        let text = text.into();
        Self {
            norm: text.to_lowercase(),
            text,
            pos,
            start: 0,
            end: 0,
            index,
        }
    }
}

/// Abreviações em inglês que não devem ter o ponto tratado como fim de sentença
const ABBREVIATIONS: &[&str] = &[
    "Dr", "Mr", "Mrs", "Ms", "Prof", "St", "Sr", "Jr", "Inc", "Ltd", "Co", "Corp",
    "Gen", "Gov", "Sen", "Rep", "vs", "etc", "approx", "Dept", "Mt", "No",
];

/// Tokeniza e etiqueta um texto.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = tokenize_standard(text);

    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
        token.pos = pos::tag(&token.text);
    }
    tokens
}

fn tokenize_standard(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start = 0;
    let mut current_text = String::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (byte_pos, ch) = chars[i];

        if ch.is_alphanumeric() || (ch == '-' || ch == '#' || ch == '+') && !current_text.is_empty() {
            if current_text.is_empty() {
                current_start = byte_pos;
            }
            current_text.push(ch);
        } else if (ch == '.' || ch == ',') && !current_text.is_empty() {
            let is_abbrev = ch == '.' && ABBREVIATIONS.contains(&current_text.as_str());
            // Número com separador (ex: 2.5, 1,000, 1,000,000)
            let current_is_num = current_text.starts_with(char::is_numeric)
                && current_text.chars().all(|c| c.is_numeric() || c == '.' || c == ',');
            let next_is_num = chars
                .get(i + 1)
                .map(|(_, c)| c.is_numeric())
                .unwrap_or(false);

            if is_abbrev || (current_is_num && next_is_num) {
                current_text.push(ch);
            } else {
                flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
                push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + 1);
            }
        } else if (ch == '\'' || ch == '\u{2019}') && !current_text.is_empty() {
            current_text.push(ch);
        } else if ch.is_whitespace() {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
        } else {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
            push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + ch.len_utf8());
        }
        i += 1;
    }

    flush_token(&mut tokens, &mut current_text, current_start, text.len());

    tokens
}

/// Fecha o token acumulado e adiciona à lista (se não vazio)
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize, end: usize) {
    if !text.is_empty() {
        push_token(tokens, text.clone(), start, end);
        text.clear();
    }
}

fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        norm: text.to_lowercase(),
        text,
        pos: PartOfSpeech::Unknown,
        start,
        end,
        index: 0, // atribuído em `tokenize`
    });
}
