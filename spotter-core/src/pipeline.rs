//! # Pipeline — Orquestrador com Eventos Observáveis
//!
//! O pipeline executa, em ordem fixa, os reconhecedores registrados (gazetteers e
//! padrões) e, por último, a camada de correção ([`Neuralyzer`]). Cada passo
//! emite eventos via um canal Rust (`mpsc`), permitindo que o servidor WebSocket
//! transmita o progresso em tempo real para o cliente.
//!
//! ## Registro × processamento
//!
//! Registrar reconhecedores e regras exige `&mut Pipeline`; processar exige só
//! `&Pipeline`. O borrow checker garante, então, que nenhuma tabela muda
//! enquanto há documentos em processamento, e um único pipeline pode ser
//! compartilhado entre threads (ver [`Pipeline::process_batch`]).

use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Document;
use crate::neuralyzer::{Correction, Neuralyzer};
use crate::span::{AnnotationStore, EntityAnnotation};
use crate::tokenizer::Token;

/// Capacidade comum a todos os reconhecedores do pipeline.
///
/// `store` contém as anotações feitas pelos reconhecedores anteriores, para
/// padrões que dependem de um tipo de entidade já atribuído.
pub trait Recognizer: Send + Sync {
    /// Nome usado como fonte das anotações e nos eventos.
    fn name(&self) -> &str;

    /// Propõe anotações para a sequência de tokens; nunca falha.
    fn recognize(&self, tokens: &[Token], store: &AnnotationStore) -> Vec<EntityAnnotation>;
}

/// Eventos emitidos pelo pipeline durante o processamento.
///
/// Estes eventos permitem que a UI visualize passo a passo quem anotou o quê e
/// quais correções foram aplicadas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Tokenização concluída (só nos métodos que recebem texto).
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: Um reconhecedor anotou um span.
    SpanAnnotated {
        recognizer: String,
        annotation: EntityAnnotation,
        text: String,
        /// Anotação anterior no mesmo span, sobrescrita por esta.
        replaced: Option<EntityAnnotation>,
    },
    /// **Passo 3a**: A camada de correção removeu uma anotação.
    AnnotationForgotten {
        rule: String,
        annotation: EntityAnnotation,
        text: String,
    },
    /// **Passo 3b**: A camada de correção gravou uma anotação.
    AnnotationAdded {
        rule: String,
        annotation: EntityAnnotation,
        text: String,
        replaced: Option<EntityAnnotation>,
    },
    /// **Conclusão**: Anotações finais em ordem de span.
    Done {
        annotations: Vec<EntityAnnotation>,
        total_tokens: usize,
        processing_ms: u64,
    },
}

/// O pipeline de reconhecimento.
///
/// # Modos de Uso
/// - **Sync**: [`Pipeline::process`] / [`Pipeline::analyze`].
/// - **Streaming**: [`Pipeline::process_streaming`] / [`Pipeline::analyze_streaming`] (via WebSocket).
/// - **Lote**: [`Pipeline::process_batch`] / [`Pipeline::analyze_batch`], em paralelo com rayon.
#[derive(Default)]
pub struct Pipeline {
    recognizers: Vec<Box<dyn Recognizer>>,
    neuralyzer: Neuralyzer,
}

impl Pipeline {
    /// Pipeline vazio: nenhum reconhecedor, nenhuma correção.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acrescenta um reconhecedor ao fim da lista.
    pub fn add<R: Recognizer + 'static>(&mut self, recognizer: R) -> &mut Self {
        debug!(recognizer = recognizer.name(), "reconhecedor adicionado ao pipeline");
        self.recognizers.push(Box::new(recognizer));
        self
    }

    /// Variante encadeável de [`Pipeline::add`].
    pub fn with<R: Recognizer + 'static>(mut self, recognizer: R) -> Self {
        self.add(recognizer);
        self
    }

    /// Define a camada de correção (substitui a anterior).
    pub fn set_neuralyzer(&mut self, neuralyzer: Neuralyzer) -> &mut Self {
        self.neuralyzer = neuralyzer;
        self
    }

    pub fn neuralyzer(&self) -> &Neuralyzer {
        &self.neuralyzer
    }

    /// Acesso à camada de correção para ensinar regras novas.
    pub fn neuralyzer_mut(&mut self) -> &mut Neuralyzer {
        &mut self.neuralyzer
    }

    /// Nomes dos reconhecedores, na ordem de execução.
    pub fn recognizer_names(&self) -> Vec<&str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    /// Processa os tokens de forma síncrona e retorna as anotações finais.
    ///
    /// Processar a mesma sequência duas vezes produz o mesmo resultado.
    pub fn process(&self, tokens: &[Token]) -> Vec<EntityAnnotation> {
        let (tx, rx) = mpsc::channel();
        self.process_streaming(tokens, tx);

        let mut annotations = vec![];
        // Consome todos os eventos até o fim
        while let Ok(event) = rx.recv() {
            if let PipelineEvent::Done { annotations: anns, .. } = event {
                annotations = anns;
            }
        }
        annotations
    }

    /// Tokeniza, etiqueta e anota o texto.
    pub fn analyze(&self, text: &str) -> Document {
        let mut document = Document::new(text);
        self.process_document(&mut document);
        document
    }

    /// Anota um documento já tokenizado, descartando anotações anteriores.
    pub fn process_document(&self, document: &mut Document) {
        document.annotations = self.process(&document.tokens).into_iter().collect();
    }

    /// Executa o pipeline enviando eventos de progresso em tempo real.
    ///
    /// # Fluxo de Eventos
    /// 1. `SpanAnnotated` (loop): cada span de cada reconhecedor, na ordem de registro.
    /// 2. `AnnotationForgotten` / `AnnotationAdded` (loop): correções.
    /// 3. `Done`: resultado final consolidado.
    pub fn process_streaming(&self, tokens: &[Token], tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let mut store = AnnotationStore::new();

        for recognizer in &self.recognizers {
            let found = recognizer.recognize(tokens, &store);
            debug!(recognizer = recognizer.name(), spans = found.len(), "reconhecedor executado");

            for annotation in found {
                let replaced = store.insert(annotation.clone());
                let _ = tx.send(PipelineEvent::SpanAnnotated {
                    recognizer: recognizer.name().to_string(),
                    text: annotation.span.text(tokens),
                    annotation,
                    replaced,
                });
            }
        }

        // Correções sempre por último: precisam ver a saída final dos reconhecedores
        for correction in self.neuralyzer.apply(tokens, &mut store) {
            let event = match correction {
                Correction::Forgotten { rule, annotation } => PipelineEvent::AnnotationForgotten {
                    rule,
                    text: annotation.span.text(tokens),
                    annotation,
                },
                Correction::Added {
                    rule,
                    annotation,
                    replaced,
                } => PipelineEvent::AnnotationAdded {
                    rule,
                    text: annotation.span.text(tokens),
                    annotation,
                    replaced,
                },
            };
            let _ = tx.send(event);
        }

        let _ = tx.send(PipelineEvent::Done {
            annotations: store.to_vec(),
            total_tokens: tokens.len(),
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    /// Como [`Pipeline::process_streaming`], mas a partir de texto cru.
    pub fn analyze_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let document = Document::new(text);
        let _ = tx.send(PipelineEvent::TokenizationDone {
            total: document.tokens.len(),
            tokens: document.tokens.clone(),
        });
        self.process_streaming(&document.tokens, tx);
    }

    /// Processa vários documentos em paralelo; a ordem da saída segue a entrada.
    pub fn process_batch(&self, documents: &[Vec<Token>]) -> Vec<Vec<EntityAnnotation>> {
        documents.par_iter().map(|tokens| self.process(tokens)).collect()
    }

    /// Tokeniza e anota vários textos em paralelo.
    pub fn analyze_batch(&self, texts: &[&str]) -> Vec<Document> {
        texts.par_iter().map(|text| self.analyze(text)).collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("recognizers", &self.recognizer_names())
            .field("neuralyzer", &self.neuralyzer)
            .finish()
    }
}
