//! Leitura de registros de telemetria a partir de arquivo TOML.
//!
//! ```toml
//! [[records]]
//! OBJID = 31835597
//! TIMESTAMP = 1643307381
//! LATITUDE = 57.928123
//! LONGITUDE = 40.006641
//! INPUTS = { a1 = 7555, d2 = true, rs3 = 249 }
//! ```

use crate::types::TelemetryRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Erros ao carregar um arquivo de registros.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("Erro ao ler {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Erro ao parsear registros: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Conteúdo de um arquivo de registros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsFile {
    pub records: Vec<TelemetryRecord>,
}

/// Interpreta registros a partir de texto TOML.
pub fn parse_records(content: &str) -> Result<Vec<TelemetryRecord>, RecordsError> {
    let file: RecordsFile = toml::from_str(content)?;
    Ok(file.records)
}

/// Carrega registros de um arquivo TOML.
pub fn load_records(path: &Path) -> Result<Vec<TelemetryRecord>, RecordsError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecordsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_records(&content)?;
    info!("{} registros carregados de {}", records.len(), path.display());
    Ok(records)
}
