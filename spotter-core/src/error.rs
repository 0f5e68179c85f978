//! # Erros de Configuração
//!
//! Todos os erros deste crate acontecem no **registro** (gazetteers, padrões,
//! regras de correção) ou no carregamento da configuração. O processamento de
//! documentos é total: uma sequência de tokens sem nenhuma correspondência
//! simplesmente produz uma lista vazia de anotações.

use thiserror::Error;

/// Resultado padrão das operações que carregam ou constroem pipelines.
pub type Result<T> = std::result::Result<T, Error>;

/// Erro de registro: a configuração pedida não pode ser aceita.
///
/// É sempre devolvido de forma síncrona para quem chamou `add_entry`,
/// `new_pattern`, `teach_forget_pattern` ou `teach_add_pattern`. Não há
/// retentativa: corrija a configuração e registre novamente.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Entrada de gazetteer vazia (ou só com espaços).
    #[error("entrada de gazetteer vazia")]
    EmptyEntry,

    /// Padrão sem nenhuma unidade.
    #[error("padrão '{0}' não tem unidades")]
    EmptyPattern(String),

    /// Uma alternativa de unidade sem nenhuma restrição casaria qualquer token.
    #[error("padrão '{pattern}': unidade {unit} tem uma alternativa sem restrições")]
    EmptyPredicate { pattern: String, unit: usize },

    /// Restrição de classe gramatical com conjunto vazio nunca casa.
    #[error("padrão '{pattern}': unidade {unit} exige POS de um conjunto vazio")]
    EmptyPosSet { pattern: String, unit: usize },

    /// Restrição de token literal vazia (ou conjunto de literais vazio).
    #[error("padrão '{pattern}': unidade {unit} exige um token vazio")]
    EmptyTokenValue { pattern: String, unit: usize },

    /// Restrição de tipo de entidade sem rótulo.
    #[error("padrão '{pattern}': unidade {unit} exige um tipo de entidade vazio")]
    EmptyEntityLabel { pattern: String, unit: usize },

    /// Duas restrições literais diferentes na mesma conjunção nunca casam juntas.
    #[error("padrão '{pattern}': unidade {unit} exige ao mesmo tempo '{first}' e '{second}'")]
    ConflictingTokens {
        pattern: String,
        unit: usize,
        first: String,
        second: String,
    },

    /// Rótulo de entidade vazio para um spotter ou regra de correção.
    #[error("rótulo de entidade vazio")]
    EmptyLabel,
}

/// Rótulos de entidade não podem ser vazios (spotters e regras de correção).
pub(crate) fn require_label(label: &str) -> std::result::Result<(), ConfigurationError> {
    if label.trim().is_empty() {
        return Err(ConfigurationError::EmptyLabel);
    }
    Ok(())
}

/// Erro ao carregar ou construir um pipeline a partir de configuração.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuração foi lida, mas é inválida.
    #[error("configuração inválida: {0}")]
    Configuration(#[from] ConfigurationError),

    /// O JSON de configuração não pôde ser interpretado.
    #[error("JSON de configuração inválido: {0}")]
    Json(#[from] serde_json::Error),

    /// Falha de leitura do arquivo de configuração.
    #[error("erro de IO: {0}")]
    Io(#[from] std::io::Error),
}
