//! # Documento Anotado
//!
//! Junta o texto original, seus tokens e o [`AnnotationStore`] produzido pelo
//! pipeline, e converte as anotações em [`Entity`] prontas para exibição
//! (texto da entidade e offsets de byte no texto original).

use serde::{Deserialize, Serialize};

use crate::span::{AnnotationStore, EntityAnnotation};
use crate::tokenizer::{tokenize, Token};

/// Uma entidade identificada no texto, pronta para a UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Texto da entidade (ex: "Python 3")
    pub text: String,
    pub label: String,
    pub source: String,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do token seguinte ao último (exclusivo)
    pub end_token: usize,
    /// Posição de byte inicial no texto original
    pub start: usize,
    /// Posição de byte final no texto original
    pub end: usize,
}

/// Um documento: texto, tokens e anotações. Nada aqui é compartilhado entre documentos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub tokens: Vec<Token>,
    pub annotations: AnnotationStore,
}

impl Document {
    /// Tokeniza e etiqueta o texto; ainda sem anotações.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            tokens: tokenize(&text),
            text,
            annotations: AnnotationStore::new(),
        }
    }

    /// Documento a partir de tokens vindos de outro tokenizador.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let text = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            tokens,
            annotations: AnnotationStore::new(),
        }
    }

    /// Converte as anotações em entidades, na ordem do texto.
    pub fn entities(&self) -> Vec<Entity> {
        self.annotations
            .iter()
            .filter(|ann| !ann.span.is_empty() && ann.span.end <= self.tokens.len())
            .map(|ann| self.entity(ann))
            .collect()
    }

    fn entity(&self, ann: &EntityAnnotation) -> Entity {
        let first = &self.tokens[ann.span.start];
        let last = &self.tokens[ann.span.end - 1];

        // Tokens sem offsets (Token::new) caem no texto reconstruído
        let text = match self.text.get(first.start..last.end) {
            Some(slice) if last.end > first.start => slice.trim().to_string(),
            _ => ann.span.text(&self.tokens),
        };

        Entity {
            text,
            label: ann.label.clone(),
            source: ann.source.clone(),
            start_token: ann.span.start,
            end_token: ann.span.end,
            start: first.start,
            end: last.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::PartOfSpeech;
    use crate::span::Span;

    #[test]
    fn test_entities_use_original_text() {
        let mut doc = Document::new("We ported it to  Python 3 last year.");
        let start = doc.tokens.iter().position(|t| t.text == "Python").unwrap();
        doc.annotations
            .insert(EntityAnnotation::new(Span::new(start, start + 2), "Lang", "test"));

        let entities = doc.entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Python 3");
        assert_eq!(&doc.text[entities[0].start..entities[0].end], "Python 3");
    }

    #[test]
    fn test_entities_from_external_tokens() {
        let tokens = vec![
            Token::new(0, "Visual", PartOfSpeech::Propn),
            Token::new(1, "Basic", PartOfSpeech::Propn),
        ];
        let mut doc = Document::from_tokens(tokens);
        doc.annotations.insert(EntityAnnotation::new(Span::new(0, 2), "Lang", "test"));

        assert_eq!(doc.text, "Visual Basic");
        assert_eq!(doc.entities()[0].text, "Visual Basic");
    }

    #[test]
    fn test_out_of_range_annotations_are_skipped() {
        let mut doc = Document::new("Rust");
        doc.annotations.insert(EntityAnnotation::new(Span::new(0, 3), "Lang", "test"));
        assert!(doc.entities().is_empty());
    }
}
