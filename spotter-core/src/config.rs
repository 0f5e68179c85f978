//! # Configuração de Pipeline em JSON
//!
//! Descreve um pipeline completo (gazetteers, spotters de padrões e regras de
//! correção) em um documento JSON. [`PipelineConfig::build`] valida tudo com as
//! mesmas regras do registro programático e devolve um [`Pipeline`] pronto.
//!
//! ```json
//! {
//!   "gazetteers": [
//!     { "label": "ProgrammingLanguage", "ignore_case": true, "entries": ["Rust", "Python 3"] }
//!   ],
//!   "pattern_spotters": [
//!     { "label": "IsA", "patterns": [{ "name": "IsA", "units": [
//!       { "cardinality": "single", "alternatives": [{ "constraints": [{ "token": { "value": "is" } }] }] }
//!     ] }] }
//!   ],
//!   "corrections": {
//!     "forget": [{ "label": "Location", "name": "Amazon", "units": [] }],
//!     "add": []
//!   }
//! }
//! ```
//!
//! A ordem dos reconhecedores no pipeline é: todos os gazetteers, na ordem do
//! arquivo, e depois todos os spotters de padrões.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::gazetteer::Spotter;
use crate::neuralyzer::Neuralyzer;
use crate::pattern::{PatternSpotter, PatternUnit};
use crate::pipeline::Pipeline;

/// Um gazetteer: rótulo + lista de frases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerConfig {
    pub label: String,
    #[serde(default)]
    pub ignore_case: bool,
    pub entries: Vec<String>,
}

/// Um padrão nomeado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub name: String,
    pub units: Vec<PatternUnit>,
}

/// Um spotter de padrões com rótulo fixo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpotterConfig {
    pub label: String,
    pub patterns: Vec<PatternConfig>,
}

/// Uma regra de correção.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    pub label: String,
    pub name: String,
    pub units: Vec<PatternUnit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionsConfig {
    #[serde(default)]
    pub forget: Vec<CorrectionConfig>,
    #[serde(default)]
    pub add: Vec<CorrectionConfig>,
}

/// Descrição completa de um pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub gazetteers: Vec<GazetteerConfig>,
    #[serde(default)]
    pub pattern_spotters: Vec<PatternSpotterConfig>,
    #[serde(default)]
    pub corrections: CorrectionsConfig,
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Valida a configuração e constrói o pipeline.
    pub fn build(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();

        for gazetteer in &self.gazetteers {
            let mut spotter = Spotter::new(gazetteer.label.as_str(), gazetteer.ignore_case)?;
            spotter.add_entries(gazetteer.entries.iter().map(String::as_str))?;
            pipeline.add(spotter);
        }

        for config in &self.pattern_spotters {
            let mut spotter = PatternSpotter::new(config.label.as_str())?;
            for pattern in &config.patterns {
                spotter.new_pattern(pattern.name.as_str(), pattern.units.clone())?;
            }
            pipeline.add(spotter);
        }

        let mut neuralyzer = Neuralyzer::new();
        for rule in &self.corrections.forget {
            neuralyzer.teach_forget_pattern(rule.label.as_str(), rule.name.as_str(), rule.units.clone())?;
        }
        for rule in &self.corrections.add {
            neuralyzer.teach_add_pattern(rule.label.as_str(), rule.name.as_str(), rule.units.clone())?;
        }
        pipeline.set_neuralyzer(neuralyzer);

        info!(
            gazetteers = self.gazetteers.len(),
            pattern_spotters = self.pattern_spotters.len(),
            forget_rules = self.corrections.forget.len(),
            add_rules = self.corrections.add.len(),
            "pipeline construído a partir da configuração"
        );
        Ok(pipeline)
    }
}
