//! Erros internos de codificação.
//!
//! Nenhum destes erros sai do encoder: cada componente converte o erro no
//! seu próprio sentinela (`NA`) e registra via `tracing`.

/// Falha ao formatar um campo do pacote.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("Valor não numérico: {0}")]
    NotNumeric(String),

    #[error("Valor não inteiro: {0}")]
    NotInteger(String),

    #[error("Porta {port} com valor não binário: {value}")]
    NotBinaryDigit { port: String, value: String },

    #[error("Valor não finito: {0}")]
    NonFinite(f64),

    #[error("Entradas digitais demais para a máscara: {0} (máximo 64)")]
    TooManyDigitalPorts(usize),

    #[error("Porta de entrada com chave vazia")]
    EmptyPortKey,

    #[error("Timestamp fora do intervalo representável: {0}")]
    Timestamp(i64),
}
