//! # IPS Core
//!
//! Codifica registros de telemetria de rastreadores GPS/IoT em pacotes de
//! dados `#D#` do protocolo Wialon IPS (texto ASCII separado por `;`).
//!
//! ## Módulos
//! - [`types`] – Registro de telemetria, valores escalares e portas de I/O
//! - [`coords`] – Coordenadas em graus + minutos (NMEA)
//! - [`inputs`] – Entradas analógicas (volts) e digitais (máscara de bits)
//! - [`params`] – Lista de parâmetros `nome:tipo:valor`
//! - [`protocol`] – Montagem do pacote completo
//! - [`records`] – Leitura de registros em TOML
//! - [`config`] – Configuração unificada via TOML

pub mod config;
pub mod coords;
pub mod error;
pub mod inputs;
pub mod params;
pub mod protocol;
pub mod records;
pub mod types;

// Re-exports convenientes
pub use config::AppConfig;
pub use error::EncodeError;
pub use protocol::{EncodedPacket, PacketEncoder, TimeReference, encode_record};
pub use types::{Inputs, Scalar, TelemetryRecord};
