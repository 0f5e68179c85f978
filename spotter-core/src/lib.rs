//! # spotter-core — Reconhecimento de Entidades por Regras
//!
//! Este crate anota trechos (spans) de texto já tokenizado com tipos de entidade,
//! usando três mecanismos declarativos em vez de um modelo estatístico:
//!
//! - **Gazetteers** ([`gazetteer`]): listas de frases literais, com a
//!   correspondência mais longa em cada posição.
//! - **Padrões** ([`pattern`]): sequências de unidades que testam texto, classe
//!   gramatical ou tipo de entidade já atribuído, com cardinalidade `single`
//!   ou `multiple` (gulosa, sem backtracking).
//! - **Correções** ([`neuralyzer`]): regras que esquecem anotações erradas e
//!   ensinam as corretas, sempre depois dos demais reconhecedores.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: Texto bruto (String) ou tokens vindos de outro sistema.
//! 2.  **Tokenização** ([`tokenizer`]) e **etiquetagem** ([`pos`]): tokens com offsets e classe gramatical.
//! 3.  **Reconhecedores**, na ordem de registro, escrevendo no [`span::AnnotationStore`] do documento.
//! 4.  **Correção** ([`neuralyzer`]): forget, depois add.
//! 5.  **Saída**: [`document::Document`] com as anotações finais.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use spotter_core::{Pipeline, Spotter};
//!
//! let mut languages = Spotter::new("ProgrammingLanguage", true).unwrap();
//! languages.add_entries(["Python", "Python 3", "Rust"]).unwrap();
//!
//! let pipeline = Pipeline::new().with(languages);
//! let doc = pipeline.analyze("We moved from Python 3 to Rust.");
//!
//! for entity in doc.entities() {
//!     println!("Entidade: {} ({})", entity.text, entity.label);
//! }
//! assert_eq!(doc.entities().len(), 2);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta os reconhecedores e a correção.
//! - [`config`]: Pipeline completo descrito em JSON.
//! - [`demo`]: Textos e pipeline de demonstração.

pub mod config;
pub mod demo;
pub mod document;
pub mod error;
pub mod gazetteer;
pub mod neuralyzer;
pub mod pattern;
pub mod pipeline;
pub mod pos;
pub mod span;
pub mod tokenizer;

pub use config::PipelineConfig;
pub use document::{Document, Entity};
pub use error::{ConfigurationError, Error, Result};
pub use gazetteer::Spotter;
pub use neuralyzer::{Correction, Neuralyzer};
pub use pattern::{Cardinality, Constraint, Pattern, PatternSpotter, PatternUnit};
pub use pipeline::{Pipeline, PipelineEvent, Recognizer};
pub use pos::PartOfSpeech;
pub use span::{AnnotationStore, EntityAnnotation, Span};
pub use tokenizer::{tokenize, Token};
