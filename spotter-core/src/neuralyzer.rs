//! # Neuralyzer — Camada de Correção
//!
//! Os reconhecedores erram de forma previsível: um gazetteer de lugares marca
//! "Amazon" como rio mesmo quando o texto fala da empresa. O Neuralyzer
//! "apaga a memória" dessas anotações e ensina as corretas.
//!
//! ## Ordem de execução
//!
//! Roda uma única vez por documento, **depois** de todos os outros
//! reconhecedores, e é o único estágio que altera anotações escritas antes:
//!
//! 1. Regras *forget*, na ordem de registro: cada correspondência remove as
//!    anotações do tipo alvo que estão dentro do span casado.
//! 2. Regras *add*, na ordem de registro: cada correspondência grava uma nova
//!    anotação, substituindo a que existir no mesmo span.
//!
//! Aplicar o mesmo conjunto de regras duas vezes produz o mesmo resultado que
//! aplicar uma vez.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_label, ConfigurationError};
use crate::pattern::{scan, Pattern, PatternUnit};
use crate::span::{AnnotationStore, EntityAnnotation};
use crate::tokenizer::Token;

/// Fonte gravada nas anotações criadas pelas regras *add*.
pub const NEURALYZER_SOURCE: &str = "neuralyzer";

/// Uma regra de correção: padrão + tipo de entidade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    /// Tipo esquecido (forget) ou atribuído (add).
    pub label: String,
    pub pattern: Pattern,
}

/// Uma alteração aplicada a um documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// A anotação foi removida pela regra `rule`.
    Forgotten { rule: String, annotation: EntityAnnotation },
    /// A anotação foi gravada pela regra `rule` (`replaced` é a que existia no mesmo span).
    Added {
        rule: String,
        annotation: EntityAnnotation,
        replaced: Option<EntityAnnotation>,
    },
}

/// Conjunto de regras *forget* e *add*.
#[derive(Debug, Clone, Default)]
pub struct Neuralyzer {
    forget: Vec<CorrectionRule>,
    add: Vec<CorrectionRule>,
}

impl Neuralyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forget_rules(&self) -> &[CorrectionRule] {
        &self.forget
    }

    pub fn add_rules(&self) -> &[CorrectionRule] {
        &self.add
    }

    pub fn is_empty(&self) -> bool {
        self.forget.is_empty() && self.add.is_empty()
    }

    /// Ensina a esquecer anotações do tipo `label` onde `units` casar.
    pub fn teach_forget_pattern(
        &mut self,
        label: impl Into<String>,
        name: impl Into<String>,
        units: Vec<PatternUnit>,
    ) -> Result<(), ConfigurationError> {
        let rule = make_rule(label.into(), Pattern::new(name, units)?)?;
        debug!(label = %rule.label, pattern = %rule.pattern.name, "regra forget registrada");
        self.forget.push(rule);
        Ok(())
    }

    /// Ensina a anotar com o tipo `label` onde `units` casar.
    pub fn teach_add_pattern(
        &mut self,
        label: impl Into<String>,
        name: impl Into<String>,
        units: Vec<PatternUnit>,
    ) -> Result<(), ConfigurationError> {
        let rule = make_rule(label.into(), Pattern::new(name, units)?)?;
        debug!(label = %rule.label, pattern = %rule.pattern.name, "regra add registrada");
        self.add.push(rule);
        Ok(())
    }

    /// Atalho: esquece `label` sobre a frase literal (ex: "Amazon").
    pub fn teach_forget_word(&mut self, label: impl Into<String>, phrase: &str) -> Result<(), ConfigurationError> {
        let rule = make_rule(label.into(), Pattern::literal(phrase, phrase)?)?;
        debug!(label = %rule.label, phrase, "regra forget registrada");
        self.forget.push(rule);
        Ok(())
    }

    /// Atalho: anota a frase literal com `label`.
    pub fn teach_add_word(&mut self, label: impl Into<String>, phrase: &str) -> Result<(), ConfigurationError> {
        let rule = make_rule(label.into(), Pattern::literal(phrase, phrase)?)?;
        debug!(label = %rule.label, phrase, "regra add registrada");
        self.add.push(rule);
        Ok(())
    }

    /// Aplica todas as regras ao documento e devolve as alterações feitas.
    pub fn apply(&self, tokens: &[Token], store: &mut AnnotationStore) -> Vec<Correction> {
        let mut corrections = Vec::new();

        for rule in &self.forget {
            for (span, _) in scan(std::iter::once(&rule.pattern), tokens, store) {
                for annotation in store.remove_within(&span, &rule.label) {
                    corrections.push(Correction::Forgotten {
                        rule: rule.pattern.name.clone(),
                        annotation,
                    });
                }
            }
        }

        for rule in &self.add {
            for (span, _) in scan(std::iter::once(&rule.pattern), tokens, store) {
                let annotation = EntityAnnotation::new(span, rule.label.clone(), NEURALYZER_SOURCE);
                let replaced = store.insert(annotation.clone());
                corrections.push(Correction::Added {
                    rule: rule.pattern.name.clone(),
                    annotation,
                    replaced,
                });
            }
        }

        if !corrections.is_empty() {
            debug!(count = corrections.len(), "correções aplicadas");
        }
        corrections
    }
}

fn make_rule(label: String, pattern: Pattern) -> Result<CorrectionRule, ConfigurationError> {
    require_label(&label)?;
    Ok(CorrectionRule { label, pattern })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::pos::PartOfSpeech;
    use crate::span::Span;
    use crate::tokenizer::tokenize;

    fn amazon_neuralyzer() -> Neuralyzer {
        let mut neuralyzer = Neuralyzer::new();
        neuralyzer
            .teach_forget_pattern(
                "Location",
                "Amazon",
                vec![PatternUnit::single().with_token("Amazon").with_entity("Location")],
            )
            .unwrap();
        neuralyzer
            .teach_add_pattern("Organization", "Amazon", vec![PatternUnit::single().with_token("Amazon")])
            .unwrap();
        neuralyzer
    }

    fn location_store() -> AnnotationStore {
        vec![EntityAnnotation::new(Span::new(0, 1), "Location", "spotter:Location")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_forget_then_add() {
        let tokens = tokenize("Amazon is hiring in Seattle");
        let mut store = location_store();

        let corrections = amazon_neuralyzer().apply(&tokens, &mut store);

        assert_eq!(store.len(), 1);
        let ann = store.get(&Span::new(0, 1)).unwrap();
        assert_eq!(ann.label, "Organization");
        assert_eq!(ann.source, NEURALYZER_SOURCE);
        assert!(matches!(corrections[0], Correction::Forgotten { .. }));
        assert!(matches!(corrections[1], Correction::Added { replaced: None, .. }));
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let tokens = tokenize("Amazon ships from Amazon warehouses");
        let neuralyzer = amazon_neuralyzer();
        let mut store: AnnotationStore = vec![
            EntityAnnotation::new(Span::new(0, 1), "Location", "spotter:Location"),
            EntityAnnotation::new(Span::new(3, 4), "Location", "spotter:Location"),
        ]
        .into_iter()
        .collect();

        neuralyzer.apply(&tokens, &mut store);
        let once = store.clone();
        neuralyzer.apply(&tokens, &mut store);

        assert_eq!(store, once);
        assert!(store.iter().all(|a| a.label == "Organization"));
    }

    #[test]
    fn test_forget_only_removes_target_label() {
        let tokens = tokenize("Amazon Web Services");
        let mut store: AnnotationStore = vec![
            EntityAnnotation::new(Span::new(0, 1), "Location", "a"),
            EntityAnnotation::new(Span::new(0, 3), "Product", "b"),
        ]
        .into_iter()
        .collect();

        let mut neuralyzer = Neuralyzer::new();
        neuralyzer.teach_forget_word("Location", "Amazon Web Services").unwrap();
        neuralyzer.apply(&tokens, &mut store);

        assert_eq!(store.to_vec().len(), 1);
        assert_eq!(store.get(&Span::new(0, 3)).unwrap().label, "Product");
    }

    #[test]
    fn test_add_overwrites_exact_span() {
        let tokens = vec![Token::new(0, "Jaguar", PartOfSpeech::Propn)];
        let mut store: AnnotationStore =
            vec![EntityAnnotation::new(Span::new(0, 1), "Animal", "a")].into_iter().collect();

        let mut neuralyzer = Neuralyzer::new();
        neuralyzer.teach_add_word("Brand", "Jaguar").unwrap();
        let corrections = neuralyzer.apply(&tokens, &mut store);

        assert_eq!(store.get(&Span::new(0, 1)).unwrap().label, "Brand");
        match &corrections[0] {
            Correction::Added { replaced: Some(old), .. } => assert_eq!(old.label, "Animal"),
            other => panic!("correção inesperada: {:?}", other),
        }
    }

    #[test]
    fn test_forget_needs_existing_label() {
        let tokens = tokenize("Amazon is hiring");
        let mut store = AnnotationStore::new();
        let mut neuralyzer = Neuralyzer::new();
        neuralyzer
            .teach_forget_pattern(
                "Location",
                "Amazon",
                vec![PatternUnit::single().with_token("Amazon").with_entity("Location")],
            )
            .unwrap();

        assert!(neuralyzer.apply(&tokens, &mut store).is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_word_rules_are_logged() {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let mut neuralyzer = Neuralyzer::new();
        tracing::subscriber::with_default(subscriber, || {
            neuralyzer.teach_forget_word("Location", "Amazon").unwrap();
            neuralyzer.teach_add_word("Organization", "Amazon").unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("regra forget registrada"), "{output}");
        assert!(output.contains("regra add registrada"), "{output}");
        assert!(output.contains("Organization"));
        assert_eq!(neuralyzer.forget_rules().len(), 1);
        assert_eq!(neuralyzer.add_rules().len(), 1);
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let mut neuralyzer = Neuralyzer::new();
        assert_eq!(
            neuralyzer.teach_add_pattern("", "x", vec![PatternUnit::single().with_token("x")]),
            Err(ConfigurationError::EmptyLabel)
        );
        assert!(matches!(
            neuralyzer.teach_forget_pattern("Location", "none", vec![]),
            Err(ConfigurationError::EmptyPattern(_))
        ));
        assert!(neuralyzer.teach_add_word("Org", " ").is_err());
        assert!(neuralyzer.is_empty());
    }
}
