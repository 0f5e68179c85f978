//! # PatternSpotter — Padrões sobre Atributos de Tokens
//!
//! Um padrão é uma sequência ordenada de **unidades**. Cada unidade testa um
//! predicado sobre um token (texto literal, classe gramatical, tipo de entidade
//! já anotado) e tem uma cardinalidade:
//!
//! - `single`: exatamente um token;
//! - `multiple`: um ou mais tokens, consumidos de forma gulosa enquanto o
//!   predicado valer.
//!
//! ## Semântica da correspondência
//!
//! Não há backtracking. Uma unidade `multiple` consome a maior sequência possível
//! antes da próxima unidade ser testada; se a próxima falhar, o padrão inteiro
//! falha naquela posição (não se tenta consumir menos tokens). Um `multiple`
//! que não consome nenhum token também falha.
//!
//! ## Exemplo
//!
//! ```rust
//! use spotter_core::pattern::{PatternSpotter, PatternUnit};
//! use spotter_core::pos::PartOfSpeech::*;
//! use spotter_core::span::AnnotationStore;
//! use spotter_core::tokenizer::tokenize;
//!
//! let mut is_a = PatternSpotter::new("IsA").unwrap();
//! is_a.new_pattern("IsA", vec![
//!     PatternUnit::single().with_token("is").with_pos(&[Verb]),
//!     PatternUnit::multiple().with_pos(&[Noun, Propn, Aux, Det, Adj]),
//! ]).unwrap();
//!
//! let tokens = tokenize("Berlin is the capital and largest city of Germany");
//! let spans = is_a.find(&tokens, &AnnotationStore::new());
//! assert_eq!(spans[0].text(&tokens), "is the capital");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_label, ConfigurationError};
use crate::pipeline::Recognizer;
use crate::pos::{self, PartOfSpeech};
use crate::span::{AnnotationStore, EntityAnnotation, Span};
use crate::tokenizer::Token;

/// Quantos tokens uma unidade consome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exatamente um token.
    Single,
    /// Um ou mais tokens, de forma gulosa.
    Multiple,
}

/// Uma restrição sobre um único token. O conjunto de tipos é fechado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Texto literal do token.
    Token {
        value: String,
        #[serde(default)]
        ignore_case: bool,
    },
    /// Texto literal pertence ao conjunto (sempre sem diferenciar caixa).
    AnyToken(Vec<String>),
    /// Classe gramatical pertence ao conjunto.
    Pos(Vec<PartOfSpeech>),
    /// O token já está coberto por uma anotação com este tipo.
    Entity(String),
    /// O token tem forma numérica.
    Numeric,
}

impl Constraint {
    fn matches(&self, token: &Token, store: &AnnotationStore) -> bool {
        match self {
            Constraint::Token { value, ignore_case: false } => token.text == *value,
            Constraint::Token { value, ignore_case: true } => token.norm == value.to_lowercase(),
            Constraint::AnyToken(values) => values.iter().any(|v| token.norm == v.to_lowercase()),
            Constraint::Pos(set) => set.contains(&token.pos),
            Constraint::Entity(label) => store.has_label_at(token.index, label),
            Constraint::Numeric => pos::is_numeric(&token.text),
        }
    }
}

/// Conjunção de restrições: o token precisa satisfazer todas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub constraints: Vec<Constraint>,
}

impl Predicate {
    fn matches(&self, token: &Token, store: &AnnotationStore) -> bool {
        self.constraints.iter().all(|c| c.matches(token, store))
    }
}

/// Um passo do padrão: cardinalidade + disjunção de predicados.
///
/// Os métodos `with_*` acrescentam restrições à alternativa corrente (a última);
/// [`PatternUnit::or`] abre novas alternativas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternUnit {
    pub cardinality: Cardinality,
    pub alternatives: Vec<Predicate>,
}

impl PatternUnit {
    fn with_cardinality(cardinality: Cardinality) -> Self {
        Self {
            cardinality,
            alternatives: vec![Predicate::default()],
        }
    }

    /// Unidade que casa exatamente um token.
    pub fn single() -> Self {
        Self::with_cardinality(Cardinality::Single)
    }

    /// Unidade que casa um ou mais tokens.
    pub fn multiple() -> Self {
        Self::with_cardinality(Cardinality::Multiple)
    }

    fn push(mut self, constraint: Constraint) -> Self {
        if self.alternatives.is_empty() {
            self.alternatives.push(Predicate::default());
        }
        if let Some(current) = self.alternatives.last_mut() {
            current.constraints.push(constraint);
        }
        self
    }

    /// Exige o texto literal (diferencia maiúsculas).
    pub fn with_token(self, value: impl Into<String>) -> Self {
        self.push(Constraint::Token {
            value: value.into(),
            ignore_case: false,
        })
    }

    /// Exige o texto literal sem diferenciar maiúsculas.
    pub fn with_token_ignore_case(self, value: impl Into<String>) -> Self {
        self.push(Constraint::Token {
            value: value.into(),
            ignore_case: true,
        })
    }

    /// Exige um texto dentre vários (sem diferenciar maiúsculas).
    pub fn with_tokens<S: AsRef<str>>(self, values: &[S]) -> Self {
        self.push(Constraint::AnyToken(
            values.iter().map(|v| v.as_ref().to_string()).collect(),
        ))
    }

    /// Exige uma das classes gramaticais.
    pub fn with_pos(self, set: &[PartOfSpeech]) -> Self {
        self.push(Constraint::Pos(set.to_vec()))
    }

    /// Exige que o token já esteja anotado com o tipo `label`.
    pub fn with_entity(self, label: impl Into<String>) -> Self {
        self.push(Constraint::Entity(label.into()))
    }

    /// Exige forma numérica.
    pub fn numeric(self) -> Self {
        self.push(Constraint::Numeric)
    }

    /// Acrescenta as alternativas de `other` como disjunção.
    pub fn or(mut self, other: PatternUnit) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    fn matches(&self, token: &Token, store: &AnnotationStore) -> bool {
        self.alternatives.iter().any(|p| p.matches(token, store))
    }

    fn validate(&self, pattern: &str, unit: usize) -> Result<(), ConfigurationError> {
        if self.alternatives.is_empty() {
            return Err(ConfigurationError::EmptyPredicate {
                pattern: pattern.to_string(),
                unit,
            });
        }

        for predicate in &self.alternatives {
            if predicate.constraints.is_empty() {
                return Err(ConfigurationError::EmptyPredicate {
                    pattern: pattern.to_string(),
                    unit,
                });
            }

            let mut literal: Option<(&str, bool)> = None;
            for constraint in &predicate.constraints {
                match constraint {
                    Constraint::Token { value, ignore_case } => {
                        if value.is_empty() {
                            return Err(ConfigurationError::EmptyTokenValue {
                                pattern: pattern.to_string(),
                                unit,
                            });
                        }
                        if let Some((first, first_ignore)) = literal {
                            let same = if first_ignore || *ignore_case {
                                first.to_lowercase() == value.to_lowercase()
                            } else {
                                first == value.as_str()
                            };
                            if !same {
                                return Err(ConfigurationError::ConflictingTokens {
                                    pattern: pattern.to_string(),
                                    unit,
                                    first: first.to_string(),
                                    second: value.clone(),
                                });
                            }
                        }
                        literal = Some((value.as_str(), *ignore_case));
                    }
                    Constraint::AnyToken(values) => {
                        if values.is_empty() || values.iter().any(|v| v.is_empty()) {
                            return Err(ConfigurationError::EmptyTokenValue {
                                pattern: pattern.to_string(),
                                unit,
                            });
                        }
                    }
                    Constraint::Pos(set) => {
                        if set.is_empty() {
                            return Err(ConfigurationError::EmptyPosSet {
                                pattern: pattern.to_string(),
                                unit,
                            });
                        }
                    }
                    Constraint::Entity(label) => {
                        if label.is_empty() {
                            return Err(ConfigurationError::EmptyEntityLabel {
                                pattern: pattern.to_string(),
                                unit,
                            });
                        }
                    }
                    Constraint::Numeric => {}
                }
            }
        }
        Ok(())
    }
}

/// Padrão nomeado e validado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub units: Vec<PatternUnit>,
}

impl Pattern {
    /// Valida e cria o padrão.
    pub fn new(name: impl Into<String>, units: Vec<PatternUnit>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if units.is_empty() {
            return Err(ConfigurationError::EmptyPattern(name));
        }
        for (i, unit) in units.iter().enumerate() {
            unit.validate(&name, i)?;
        }
        Ok(Self { name, units })
    }

    /// Padrão que casa a frase literal, token a token (separada por espaços).
    pub fn literal(name: impl Into<String>, phrase: &str) -> Result<Self, ConfigurationError> {
        let units = phrase
            .split_whitespace()
            .map(|word| PatternUnit::single().with_token(word))
            .collect();
        Self::new(name, units)
    }

    /// Tenta casar a partir de `start`; devolve o fim (exclusivo) da correspondência.
    pub fn match_at(&self, tokens: &[Token], store: &AnnotationStore, start: usize) -> Option<usize> {
        let mut pos = start;

        for unit in &self.units {
            match unit.cardinality {
                Cardinality::Single => {
                    if pos < tokens.len() && unit.matches(&tokens[pos], store) {
                        pos += 1;
                    } else {
                        return None;
                    }
                }
                Cardinality::Multiple => {
                    let run_start = pos;
                    while pos < tokens.len() && unit.matches(&tokens[pos], store) {
                        pos += 1;
                    }
                    if pos == run_start {
                        return None;
                    }
                }
            }
        }
        Some(pos)
    }
}

/// Varredura compartilhada pelo [`PatternSpotter`] e pela camada de correção:
/// em cada posição o primeiro padrão que casa vence e a varredura continua no fim dele.
pub(crate) fn scan<'p>(
    patterns: impl Iterator<Item = &'p Pattern> + Clone,
    tokens: &[Token],
    store: &AnnotationStore,
) -> Vec<(Span, &'p Pattern)> {
    let mut found = Vec::new();
    let mut i = 0;

    'outer: while i < tokens.len() {
        for pattern in patterns.clone() {
            if let Some(end) = pattern.match_at(tokens, store, i) {
                found.push((Span::new(i, end), pattern));
                i = end;
                continue 'outer;
            }
        }
        i += 1;
    }
    found
}

/// Reconhecedor baseado em padrões, com um rótulo de entidade fixo.
#[derive(Debug, Clone)]
pub struct PatternSpotter {
    label: String,
    source: String,
    patterns: Vec<Pattern>,
}

impl PatternSpotter {
    /// Cria um spotter sem padrões; o rótulo não pode ser vazio.
    pub fn new(label: impl Into<String>) -> Result<Self, ConfigurationError> {
        let label = label.into();
        require_label(&label)?;
        Ok(Self {
            source: format!("pattern:{label}"),
            label,
            patterns: Vec::new(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Registra um padrão; os padrões são tentados na ordem de registro.
    pub fn new_pattern(&mut self, name: impl Into<String>, units: Vec<PatternUnit>) -> Result<(), ConfigurationError> {
        let pattern = Pattern::new(name, units)?;
        debug!(label = %self.label, pattern = %pattern.name, units = pattern.units.len(), "padrão registrado");
        self.patterns.push(pattern);
        Ok(())
    }

    /// Encontra os spans casados, sem sobreposição, da esquerda para a direita.
    pub fn find(&self, tokens: &[Token], store: &AnnotationStore) -> Vec<Span> {
        scan(self.patterns.iter(), tokens, store)
            .into_iter()
            .map(|(span, _)| span)
            .collect()
    }
}

impl Recognizer for PatternSpotter {
    fn name(&self) -> &str {
        &self.source
    }

    fn recognize(&self, tokens: &[Token], store: &AnnotationStore) -> Vec<EntityAnnotation> {
        self.find(tokens, store)
            .into_iter()
            .map(|span| EntityAnnotation::new(span, self.label.clone(), self.source.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::PartOfSpeech::*;
    use crate::tokenizer::tokenize;

    fn tagged(words: &[(&str, PartOfSpeech)]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, (w, p))| Token::new(i, *w, *p))
            .collect()
    }

    fn is_a() -> PatternSpotter {
        let mut spotter = PatternSpotter::new("IsA").unwrap();
        spotter
            .new_pattern(
                "IsA",
                vec![
                    PatternUnit::single().with_token("is").with_pos(&[Verb]),
                    PatternUnit::multiple().with_pos(&[Noun, Propn, Aux, Det, Adj]),
                ],
            )
            .unwrap();
        spotter
    }

    #[test]
    fn test_berlin_is_a() {
        let tokens = tokenize("Berlin is the capital and largest city of Germany");
        let anns = is_a().recognize(&tokens, &AnnotationStore::new());

        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].label, "IsA");
        // Começa em "is" e para antes do primeiro token fora do conjunto ("and" é CCONJ)
        assert_eq!(anns[0].span, Span::new(1, 4));
        assert_eq!(tokens[anns[0].span.end].pos, Cconj);
    }

    #[test]
    fn test_multiple_consumes_whole_run() {
        let tokens = tagged(&[
            ("is", Verb),
            ("the", Det),
            ("capital", Noun),
            ("and", Det),
            ("largest", Adj),
            ("city", Noun),
            ("of", Adj),
            (".", Punct),
        ]);
        let spans = is_a().find(&tokens, &AnnotationStore::new());
        assert_eq!(spans, vec![Span::new(0, 7)]);
    }

    #[test]
    fn test_multiple_with_zero_tokens_fails() {
        let tokens = tagged(&[("is", Verb), ("and", Cconj), ("the", Det)]);
        assert!(is_a().find(&tokens, &AnnotationStore::new()).is_empty());
    }

    #[test]
    fn test_no_backtracking() {
        // O multiple engole todos os NOUN; o single NOUN seguinte nunca casa
        let mut spotter = PatternSpotter::new("X").unwrap();
        spotter
            .new_pattern(
                "greedy",
                vec![PatternUnit::multiple().with_pos(&[Noun]), PatternUnit::single().with_pos(&[Noun])],
            )
            .unwrap();

        let tokens = tagged(&[("a", Noun), ("b", Noun), ("c", Noun)]);
        assert!(spotter.find(&tokens, &AnnotationStore::new()).is_empty());
    }

    #[test]
    fn test_first_registered_pattern_wins() {
        let mut spotter = PatternSpotter::new("X").unwrap();
        spotter
            .new_pattern("short", vec![PatternUnit::single().with_pos(&[Propn])])
            .unwrap();
        spotter
            .new_pattern(
                "long",
                vec![PatternUnit::single().with_pos(&[Propn]), PatternUnit::single().numeric()],
            )
            .unwrap();

        let tokens = tagged(&[("Python", Propn), ("3", Num)]);
        assert_eq!(spotter.find(&tokens, &AnnotationStore::new()), vec![Span::new(0, 1)]);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let mut spotter = PatternSpotter::new("Pair").unwrap();
        spotter
            .new_pattern("pair", vec![PatternUnit::single().with_pos(&[Noun]), PatternUnit::single().with_pos(&[Noun])])
            .unwrap();

        let tokens = tagged(&[("a", Noun), ("b", Noun), ("c", Noun), ("d", Noun), ("e", Noun)]);
        assert_eq!(
            spotter.find(&tokens, &AnnotationStore::new()),
            vec![Span::new(0, 2), Span::new(2, 4)]
        );
    }

    #[test]
    fn test_disjunction_and_entity_constraint() {
        let tokens = tagged(&[("Amazon", Propn), ("was", Verb), ("founded", Verb)]);
        let store: AnnotationStore =
            vec![EntityAnnotation::new(Span::new(0, 1), "Location", "test")].into_iter().collect();

        let mut spotter = PatternSpotter::new("Event").unwrap();
        spotter
            .new_pattern(
                "event",
                vec![
                    PatternUnit::single().with_entity("Location"),
                    PatternUnit::single()
                        .with_token("is")
                        .or(PatternUnit::single().with_token("was")),
                ],
            )
            .unwrap();

        assert_eq!(spotter.find(&tokens, &store), vec![Span::new(0, 2)]);
        assert!(spotter.find(&tokens, &AnnotationStore::new()).is_empty());
    }

    #[test]
    fn test_token_case_options() {
        let tokens = tagged(&[("Rust", Propn), ("RUST", Propn)]);
        let mut spotter = PatternSpotter::new("Lang").unwrap();
        spotter
            .new_pattern("ci", vec![PatternUnit::single().with_token_ignore_case("rust")])
            .unwrap();
        assert_eq!(spotter.find(&tokens, &AnnotationStore::new()).len(), 2);

        let mut spotter = PatternSpotter::new("Lang").unwrap();
        spotter
            .new_pattern("any", vec![PatternUnit::single().with_tokens(&["go", "rust"])])
            .unwrap();
        assert_eq!(spotter.find(&tokens, &AnnotationStore::new()).len(), 2);
    }

    #[test]
    fn test_configuration_errors() {
        let mut spotter = PatternSpotter::new("X").unwrap();

        assert_eq!(
            spotter.new_pattern("empty", vec![]),
            Err(ConfigurationError::EmptyPattern("empty".to_string()))
        );
        assert!(matches!(
            spotter.new_pattern("bare", vec![PatternUnit::single()]),
            Err(ConfigurationError::EmptyPredicate { unit: 0, .. })
        ));
        assert!(matches!(
            spotter.new_pattern("pos", vec![PatternUnit::single().with_token("a"), PatternUnit::multiple().with_pos(&[])]),
            Err(ConfigurationError::EmptyPosSet { unit: 1, .. })
        ));
        assert!(matches!(
            spotter.new_pattern("tok", vec![PatternUnit::single().with_token("")]),
            Err(ConfigurationError::EmptyTokenValue { .. })
        ));
        assert!(matches!(
            spotter.new_pattern("ent", vec![PatternUnit::single().with_entity("")]),
            Err(ConfigurationError::EmptyEntityLabel { .. })
        ));
        assert!(matches!(
            spotter.new_pattern("conflict", vec![PatternUnit::single().with_token("is").with_token("was")]),
            Err(ConfigurationError::ConflictingTokens { .. })
        ));
        assert!(spotter.patterns().is_empty());
        assert_eq!(PatternSpotter::new(" ").unwrap_err(), ConfigurationError::EmptyLabel);
    }

    #[test]
    fn test_numeric_matches_whole_grouped_number() {
        let mut spotter = PatternSpotter::new("Amount").unwrap();
        spotter
            .new_pattern("amount", vec![PatternUnit::single().numeric()])
            .unwrap();

        let tokens = tokenize("It costs 1,000,000 dollars");
        let spans = spotter.find(&tokens, &AnnotationStore::new());
        assert_eq!(spans, vec![Span::new(2, 3)]);
        assert_eq!(spans[0].text(&tokens), "1,000,000");
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = Pattern::literal("amazon", "Amazon Web Services").unwrap();
        let tokens = tokenize("We deploy on Amazon Web Services daily");
        assert_eq!(pattern.match_at(&tokens, &AnnotationStore::new(), 3), Some(6));
        assert!(Pattern::literal("empty", "  ").is_err());
    }

    #[test]
    fn test_units_deserialize_from_json() {
        let json = r#"[
            {"cardinality": "single", "alternatives": [{"constraints": [{"token": {"value": "is"}}, {"pos": ["VERB"]}]}]},
            {"cardinality": "multiple", "alternatives": [{"constraints": [{"pos": ["NOUN", "DET"]}]}]}
        ]"#;
        let units: Vec<PatternUnit> = serde_json::from_str(json).unwrap();
        assert_eq!(
            units,
            vec![
                PatternUnit::single().with_token("is").with_pos(&[Verb]),
                PatternUnit::multiple().with_pos(&[Noun, Det]),
            ]
        );
    }
}
