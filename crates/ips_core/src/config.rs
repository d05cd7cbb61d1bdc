//! Configuração unificada via TOML (`config.toml` ao lado do executável).

use crate::protocol::{PacketEncoder, TimeReference};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Erros ao salvar a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro ao serializar configuração: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao gravar configuração: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuração do encoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Fuso da data/hora do pacote: "local" ou "utc"
    pub time_reference: TimeReference,
}

impl EncoderConfig {
    pub fn build(&self) -> PacketEncoder {
        PacketEncoder::new(self.time_reference)
    }
}

/// Destino dos pacotes codificados.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Imprime cada pacote em uma linha
    #[default]
    Stdout,
    /// Um datagrama UDP por pacote
    Udp,
}

/// Configuração do Sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub mode: OutputMode,
    /// IP do servidor de monitoramento
    pub dest_ip: String,
    /// Porta UDP
    pub port: u16,
    /// IP local para bind (vazio = auto)
    pub bind_ip: String,
    /// Arquivo TOML de registros (vazio = registro de exemplo)
    pub records_path: String,
    /// Pausa entre pacotes em segundos
    pub interval_secs: f64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Stdout,
            dest_ip: "127.0.0.1".into(),
            port: 20332,
            bind_ip: String::new(),
            records_path: String::new(),
            interval_secs: 0.0,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub encoder: EncoderConfig,
    pub sender: SenderConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML; em caso de erro usa o padrão.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sender.mode == OutputMode::Udp {
            if self.sender.port == 0 {
                errors.push("Porta do sender não pode ser 0".into());
            }
            if self.sender.dest_ip.is_empty() {
                errors.push("IP de destino obrigatório no modo udp".into());
            }
        }
        if !(0.0..=3600.0).contains(&self.sender.interval_secs) {
            errors.push(format!(
                "Intervalo do sender inválido: {} (0.0–3600.0)",
                self.sender.interval_secs
            ));
        }

        errors
    }
}
