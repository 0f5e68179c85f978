//! # Dados de Demonstração
//!
//! Textos de exemplo e o pipeline usado pela interface web quando nenhuma
//! configuração externa é informada:
//!
//! - gazetteer `ProgrammingLanguage` (sem diferenciar maiúsculas);
//! - gazetteer `Location`, que marca "Amazon" como lugar (o rio);
//! - padrão `IsA` ("is" + sequência de substantivos, determinantes, adjetivos);
//! - correção que troca `Location` por `Organization` em "Amazon".

use crate::error::ConfigurationError;
use crate::gazetteer::Spotter;
use crate::neuralyzer::Neuralyzer;
use crate::pattern::{PatternSpotter, PatternUnit};
use crate::pipeline::Pipeline;
use crate::pos::PartOfSpeech::*;

pub const PROGRAMMING_LANGUAGES: &[&str] = &[
    "C#", "C++", "C", "Python", "Python 3", "Rust", "Java", "JavaScript", "TypeScript", "Go",
    "Haskell", "Kotlin", "Swift", "Ruby", "Scala", "Visual Basic", "F#",
];

pub const LOCATIONS: &[&str] = &[
    "Amazon", "Berlin", "Germany", "Seattle", "Brazil", "Paris", "France", "London", "Lisbon", "Portugal",
];

/// Textos de demonstração: (assunto, texto).
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Linguagens",
            "I started with C# years ago, then picked up Python and later Python 3, dabbled in C++ and Rust, and still maintain some Java services.",
        ),
        (
            "Definições",
            "Berlin is the capital and largest city of Germany. Lisbon is the capital of Portugal.",
        ),
        (
            "Correção",
            "Amazon opened a new office in Seattle and hired engineers from Brazil and Portugal.",
        ),
        (
            "Misto",
            "Rust is a systems language. The Amazon team in Berlin rewrote a Java service in Rust and kept a small Python 3 tool.",
        ),
    ]
}

/// Pipeline de demonstração.
pub fn sample_pipeline() -> Result<Pipeline, ConfigurationError> {
    let mut languages = Spotter::new("ProgrammingLanguage", true)?;
    languages.add_entries(PROGRAMMING_LANGUAGES.iter().copied())?;

    let mut locations = Spotter::new("Location", false)?;
    locations.add_entries(LOCATIONS.iter().copied())?;

    let mut is_a = PatternSpotter::new("IsA")?;
    is_a.new_pattern(
        "IsA",
        vec![
            PatternUnit::single().with_token("is").with_pos(&[Verb]),
            PatternUnit::multiple().with_pos(&[Noun, Propn, Aux, Det, Adj]),
        ],
    )?;

    // O gazetteer de lugares conhece o rio; nestes textos "Amazon" é a empresa
    let mut neuralyzer = Neuralyzer::new();
    neuralyzer.teach_forget_pattern(
        "Location",
        "Amazon",
        vec![PatternUnit::single().with_token("Amazon").with_entity("Location")],
    )?;
    neuralyzer.teach_add_pattern("Organization", "Amazon", vec![PatternUnit::single().with_token("Amazon")])?;

    let mut pipeline = Pipeline::new().with(languages).with(locations).with(is_a);
    pipeline.set_neuralyzer(neuralyzer);
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(text: &str) -> Vec<(String, String)> {
        sample_pipeline()
            .unwrap()
            .analyze(text)
            .entities()
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    #[test]
    fn test_sample_pipeline_builds() {
        let pipeline = sample_pipeline().unwrap();
        assert_eq!(
            pipeline.recognizer_names(),
            ["spotter:ProgrammingLanguage", "spotter:Location", "pattern:IsA"]
        );
        assert_eq!(pipeline.neuralyzer().forget_rules().len(), 1);
        assert_eq!(pipeline.neuralyzer().add_rules().len(), 1);
    }

    #[test]
    fn test_languages_text() {
        let (_, text) = demo_texts()[0];
        let langs: Vec<String> = entities(text)
            .into_iter()
            .filter(|(_, label)| label == "ProgrammingLanguage")
            .map(|(text, _)| text)
            .collect();
        assert_eq!(langs, ["C#", "Python", "Python 3", "C++", "Rust", "Java"]);
    }

    #[test]
    fn test_is_a_text() {
        let found = entities("Berlin is the capital and largest city of Germany");
        assert_eq!(
            found,
            vec![
                ("Berlin".to_string(), "Location".to_string()),
                ("is the capital".to_string(), "IsA".to_string()),
                ("Germany".to_string(), "Location".to_string()),
            ]
        );
    }

    #[test]
    fn test_amazon_is_corrected() {
        let (_, text) = demo_texts()[2];
        let found = entities(text);
        assert!(found.contains(&("Amazon".to_string(), "Organization".to_string())));
        assert!(!found.contains(&("Amazon".to_string(), "Location".to_string())));
        assert!(found.contains(&("Seattle".to_string(), "Location".to_string())));
    }
}
