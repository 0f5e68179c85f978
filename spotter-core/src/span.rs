//! # Spans e Anotações de Entidade
//!
//! Um [`Span`] é um intervalo contíguo `[start, end)` de índices de tokens dentro
//! de um documento. Cada span carrega no máximo uma [`EntityAnnotation`] no
//! [`AnnotationStore`] do documento.
//!
//! ## Regra de conflito
//!
//! Vários reconhecedores podem propor anotações sobrepostas, e isso é permitido.
//! O que não existe são duas anotações com **o mesmo** span: a última escrita
//! vence (`insert` substitui). A camada de correção usa exatamente essa regra
//! para trocar o rótulo de um trecho já anotado.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Intervalo de tokens `[start, end)`.
///
/// # Exemplo
/// Em "I learned Python 3 today", o span de "Python 3" é `Span { start: 2, end: 4 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Índice do token inicial (inclusivo)
    pub start: usize,
    /// Índice do token final (exclusivo)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span invertido: {start}..{end}");
        Self { start, end }
    }

    /// Número de tokens cobertos.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// O token `index` está dentro do span?
    pub fn covers(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// `other` está inteiramente dentro deste span?
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Os tokens cobertos pelo span.
    pub fn tokens<'a>(&self, tokens: &'a [Token]) -> &'a [Token] {
        &tokens[self.start.min(tokens.len())..self.end.min(tokens.len())]
    }

    /// Texto do span reconstruído a partir dos tokens, separados por espaço.
    pub fn text(&self, tokens: &[Token]) -> String {
        self.tokens(tokens)
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Uma entidade atribuída a um span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub span: Span,
    /// Tipo da entidade (ex: "ProgrammingLanguage", "IsA")
    pub label: String,
    /// Quem produziu a anotação (ex: "spotter:ProgrammingLanguage", "neuralyzer")
    pub source: String,
}

impl EntityAnnotation {
    pub fn new(span: Span, label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            span,
            label: label.into(),
            source: source.into(),
        }
    }
}

/// Anotações de um único documento, indexadas pelo span.
///
/// Ordenado por `(start, end)`, então a iteração segue a ordem do texto.
///
/// Serializado como lista de anotações em ordem de span.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<EntityAnnotation>", into = "Vec<EntityAnnotation>")]
pub struct AnnotationStore {
    annotations: BTreeMap<Span, EntityAnnotation>,
    /// Maior span já inserido; limita as buscas por token. Não diminui em remoções.
    longest: usize,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere a anotação; se já houver uma no mesmo span, ela é substituída e devolvida.
    pub fn insert(&mut self, annotation: EntityAnnotation) -> Option<EntityAnnotation> {
        self.longest = self.longest.max(annotation.span.len());
        self.annotations.insert(annotation.span, annotation)
    }

    /// Remove a anotação do span, se existir.
    pub fn remove(&mut self, span: &Span) -> Option<EntityAnnotation> {
        self.annotations.remove(span)
    }

    pub fn get(&self, span: &Span) -> Option<&EntityAnnotation> {
        self.annotations.get(span)
    }

    /// Remove todas as anotações com rótulo `label` contidas em `within`.
    pub fn remove_within(&mut self, within: &Span, label: &str) -> Vec<EntityAnnotation> {
        let doomed: Vec<Span> = self
            .annotations
            .range(Span::new(within.start, within.start)..Span::new(within.end, within.end))
            .filter(|(span, ann)| within.contains(span) && ann.label == label)
            .map(|(span, _)| *span)
            .collect();

        doomed
            .iter()
            .filter_map(|span| self.annotations.remove(span))
            .collect()
    }

    /// Anotações que podem cobrir `index`: só spans que começam a menos de
    /// `longest` tokens antes dele.
    fn candidates_at(&self, index: usize) -> impl Iterator<Item = (&Span, &EntityAnnotation)> {
        let first_start = (index + 1).saturating_sub(self.longest);
        self.annotations
            .range(Span::new(first_start, first_start)..Span::new(index + 1, index + 1))
            .filter(move |(span, _)| span.covers(index))
    }

    /// Algum span com rótulo `label` cobre o token `index`?
    pub fn has_label_at(&self, index: usize, label: &str) -> bool {
        self.candidates_at(index).any(|(_, ann)| ann.label == label)
    }

    /// Rótulos de todas as anotações que cobrem o token `index`.
    pub fn labels_at(&self, index: usize) -> Vec<&str> {
        self.candidates_at(index).map(|(_, ann)| ann.label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityAnnotation> {
        self.annotations.values()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Todas as anotações em ordem de span.
    pub fn to_vec(&self) -> Vec<EntityAnnotation> {
        self.annotations.values().cloned().collect()
    }
}

impl PartialEq for AnnotationStore {
    fn eq(&self, other: &Self) -> bool {
        self.annotations == other.annotations
    }
}

impl FromIterator<EntityAnnotation> for AnnotationStore {
    fn from_iter<I: IntoIterator<Item = EntityAnnotation>>(iter: I) -> Self {
        let mut store = AnnotationStore::new();
        for annotation in iter {
            store.insert(annotation);
        }
        store
    }
}

impl From<Vec<EntityAnnotation>> for AnnotationStore {
    fn from(annotations: Vec<EntityAnnotation>) -> Self {
        annotations.into_iter().collect()
    }
}

impl From<AnnotationStore> for Vec<EntityAnnotation> {
    fn from(store: AnnotationStore) -> Self {
        store.annotations.into_values().collect()
    }
}
