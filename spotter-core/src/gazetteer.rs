//! # Spotter — Gazetteer de Frases Literais
//!
//! Lista de frases conhecidas (ex: nomes de linguagens de programação) casadas
//! literalmente, token a token, contra o documento. A comparação pode ignorar
//! maiúsculas/minúsculas.
//!
//! ## Política de sobreposição
//!
//! Em cada posição inicial o spotter compara **todas** as entradas que começam
//! com aquele token e escolhe a mais longa. Registrar "Python" e "Python 3" e
//! analisar `["Python", "3", "is", "great"]` produz um único span de dois
//! tokens. Depois de uma correspondência, a varredura continua logo após o span,
//! então os spans emitidos nunca se sobrepõem.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{require_label, ConfigurationError};
use crate::pipeline::Recognizer;
use crate::span::{AnnotationStore, EntityAnnotation, Span};
use crate::tokenizer::Token;

/// Gazetteer de frases multi-token com um rótulo de entidade fixo.
#[derive(Debug, Clone)]
pub struct Spotter {
    label: String,
    source: String,
    ignore_case: bool,
    /// Entradas indexadas pelo primeiro token, da mais longa para a mais curta
    entries: HashMap<String, Vec<Vec<String>>>,
    len: usize,
}

impl Spotter {
    /// Cria um spotter vazio que anota suas correspondências com `label`.
    ///
    /// Falha com [`ConfigurationError::EmptyLabel`] se o rótulo for vazio.
    pub fn new(label: impl Into<String>, ignore_case: bool) -> Result<Self, ConfigurationError> {
        let label = label.into();
        require_label(&label)?;
        Ok(Self {
            source: format!("spotter:{label}"),
            label,
            ignore_case,
            entries: HashMap::new(),
            len: 0,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Número de entradas registradas.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registra uma frase, dividida em tokens por espaços em branco.
    ///
    /// Entradas repetidas são ignoradas. Falha com [`ConfigurationError::EmptyEntry`]
    /// se a frase não tiver nenhum token.
    pub fn add_entry(&mut self, phrase: &str) -> Result<(), ConfigurationError> {
        let parts: Vec<String> = phrase.split_whitespace().map(|p| self.key(p)).collect();
        if parts.is_empty() {
            return Err(ConfigurationError::EmptyEntry);
        }

        let bucket = self.entries.entry(parts[0].clone()).or_default();
        if bucket.contains(&parts) {
            return Ok(());
        }
        debug!(label = %self.label, entry = phrase, "entrada de gazetteer registrada");
        bucket.push(parts);
        bucket.sort_by(|a, b| b.len().cmp(&a.len()));
        self.len += 1;
        Ok(())
    }

    /// Registra várias frases; para na primeira inválida.
    pub fn add_entries<'a, I>(&mut self, phrases: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for phrase in phrases {
            self.add_entry(phrase)?;
        }
        Ok(())
    }

    /// Encontra todas as ocorrências, sem sobreposição, da esquerda para a direita.
    pub fn find(&self, tokens: &[Token]) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            match self.longest_at(tokens, i) {
                Some(len) => {
                    spans.push(Span::new(i, i + len));
                    i += len;
                }
                None => i += 1,
            }
        }
        spans
    }

    /// Tamanho da entrada mais longa que casa a partir de `start`.
    fn longest_at(&self, tokens: &[Token], start: usize) -> Option<usize> {
        let candidates = self.entries.get(self.token_key(&tokens[start]))?;

        // Os candidatos já estão do mais longo para o mais curto
        candidates
            .iter()
            .find(|parts| {
                start + parts.len() <= tokens.len()
                    && parts
                        .iter()
                        .zip(&tokens[start..])
                        .all(|(part, token)| part == self.token_key(token))
            })
            .map(|parts| parts.len())
    }

    fn key(&self, text: &str) -> String {
        if self.ignore_case {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }

    fn token_key<'t>(&self, token: &'t Token) -> &'t str {
        if self.ignore_case {
            &token.norm
        } else {
            &token.text
        }
    }
}

impl Recognizer for Spotter {
    fn name(&self) -> &str {
        &self.source
    }

    fn recognize(&self, tokens: &[Token], _store: &AnnotationStore) -> Vec<EntityAnnotation> {
        self.find(tokens)
            .into_iter()
            .map(|span| EntityAnnotation::new(span, self.label.clone(), self.source.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::PartOfSpeech;
    use crate::tokenizer::tokenize;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(i, *w, PartOfSpeech::X))
            .collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let mut spotter = Spotter::new("ProgrammingLanguage", false).unwrap();
        spotter.add_entry("Python").unwrap();
        spotter.add_entry("Python 3").unwrap();

        let spans = spotter.find(&tokens(&["Python", "3", "is", "great"]));
        assert_eq!(spans, vec![Span::new(0, 2)]);
    }

    #[test]
    fn test_longest_match_independent_of_registration_order() {
        let mut spotter = Spotter::new("ProgrammingLanguage", false).unwrap();
        spotter.add_entry("Python 3").unwrap();
        spotter.add_entry("Python").unwrap();

        let spans = spotter.find(&tokens(&["Python", "and", "Python", "3"]));
        assert_eq!(spans, vec![Span::new(0, 1), Span::new(2, 4)]);
    }

    #[test]
    fn test_case_sensitivity() {
        let mut sensitive = Spotter::new("Lang", false).unwrap();
        sensitive.add_entry("Rust").unwrap();
        let mut insensitive = Spotter::new("Lang", true).unwrap();
        insensitive.add_entry("Rust").unwrap();

        let input = tokens(&["rust", "RUST", "Rust"]);
        assert_eq!(sensitive.find(&input), vec![Span::new(2, 3)]);
        assert_eq!(insensitive.find(&input).len(), 3);
    }

    #[test]
    fn test_empty_label_is_rejected() {
        assert_eq!(Spotter::new("", true).unwrap_err(), ConfigurationError::EmptyLabel);
        assert_eq!(Spotter::new("  ", false).unwrap_err(), ConfigurationError::EmptyLabel);
    }

    #[test]
    fn test_empty_entry_is_rejected() {
        let mut spotter = Spotter::new("Lang", true).unwrap();
        assert_eq!(spotter.add_entry(""), Err(ConfigurationError::EmptyEntry));
        assert_eq!(spotter.add_entry("   \t"), Err(ConfigurationError::EmptyEntry));
        assert!(spotter.is_empty());
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut spotter = Spotter::new("Lang", true).unwrap();
        spotter.add_entries(["Java", "java", "Java"]).unwrap();
        assert_eq!(spotter.len(), 1);
    }

    #[test]
    fn test_entry_longer_than_remaining_tokens() {
        let mut spotter = Spotter::new("Lang", false).unwrap();
        spotter.add_entry("Visual Basic .NET").unwrap();
        assert!(spotter.find(&tokens(&["I", "like", "Visual", "Basic"])).is_empty());
    }

    #[test]
    fn test_programming_languages_in_order() {
        let mut spotter = Spotter::new("ProgrammingLanguage", true).unwrap();
        spotter
            .add_entries(["C#", "Python", "Python 3", "C++", "Rust", "Java"])
            .unwrap();

        let doc = tokenize(
            "I started with C# years ago, then picked up Python and later Python 3, \
             dabbled in C++ and Rust, and still maintain some Java services.",
        );
        let found: Vec<String> = spotter.find(&doc).iter().map(|s| s.text(&doc)).collect();

        assert_eq!(found, ["C#", "Python", "Python 3", "C++", "Rust", "Java"]);
    }

    #[test]
    fn test_recognize_annotates_with_label() {
        let mut spotter = Spotter::new("Lang", true).unwrap();
        spotter.add_entry("rust").unwrap();

        let anns = spotter.recognize(&tokens(&["I", "love", "Rust"]), &AnnotationStore::new());
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].label, "Lang");
        assert_eq!(anns[0].source, "spotter:Lang");
        assert_eq!(anns[0].span, Span::new(2, 3));
    }

    #[test]
    fn test_empty_document() {
        let mut spotter = Spotter::new("Lang", true).unwrap();
        spotter.add_entry("rust").unwrap();
        assert!(spotter.find(&[]).is_empty());
    }
}
