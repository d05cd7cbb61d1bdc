//! # IPS Sender
//!
//! Codifica registros de telemetria em pacotes `#D#` e imprime ou envia
//! cada pacote via UDP para o servidor de monitoramento.
//!
//! ## Uso
//! ```bash
//! ips_sender                    # Registros de config.toml (ou exemplo)
//! ips_sender registros.toml     # Arquivo de registros explícito
//! ```

mod sample;

use ips_core::config::{AppConfig, OutputMode, SenderConfig};
use ips_core::records::load_records;
use ips_core::{EncodedPacket, TelemetryRecord};
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Configuração inválida: {e}");
        }
        return ExitCode::FAILURE;
    }

    // ── Registros ──
    let records_path = std::env::args()
        .nth(1)
        .or_else(|| Some(config.sender.records_path.clone()).filter(|p| !p.is_empty()));
    let records = match records_path {
        Some(path) => match load_records(&PathBuf::from(path)) {
            Ok(records) => records,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("Nenhum arquivo de registros configurado, usando registro de exemplo");
            vec![sample::sample_record()]
        }
    };

    // ── Saída ──
    let output = match Output::open(&config.sender) {
        Ok(output) => output,
        Err(e) => {
            error!("Falha ao criar socket UDP: {e}");
            return ExitCode::FAILURE;
        }
    };

    let encoder = config.encoder.build();
    let interval = Duration::from_secs_f64(config.sender.interval_secs);

    for (i, record) in records.iter().enumerate() {
        if i > 0 && !interval.is_zero() {
            std::thread::sleep(interval);
        }
        let packet = encoder.encode(record);
        if let Err(e) = output.emit(record, &packet) {
            error!("Erro ao enviar pacote: {e}");
        }
    }

    ExitCode::SUCCESS
}

/// Destino dos pacotes.
enum Output {
    Stdout,
    Udp { sock: UdpSocket, dest_addr: String },
}

impl Output {
    fn open(cfg: &SenderConfig) -> std::io::Result<Self> {
        match cfg.mode {
            OutputMode::Stdout => Ok(Output::Stdout),
            OutputMode::Udp => {
                let sock = UdpSocket::bind(if cfg.bind_ip.is_empty() {
                    "0.0.0.0:0".to_string()
                } else {
                    format!("{}:0", cfg.bind_ip)
                })?;
                let dest_addr = format!("{}:{}", cfg.dest_ip, cfg.port);
                info!("Modo UDP → {dest_addr}");
                Ok(Output::Udp { sock, dest_addr })
            }
        }
    }

    fn emit(&self, record: &TelemetryRecord, packet: &EncodedPacket) -> std::io::Result<()> {
        match self {
            Output::Stdout => {
                println!("{packet}");
            }
            Output::Udp { sock, dest_addr } => {
                let sent = sock.send_to(packet.as_str().as_bytes(), dest_addr.as_str())?;
                info!(
                    "→ {} bytes para {} | objeto {}",
                    sent,
                    dest_addr,
                    record
                        .object_id
                        .as_ref()
                        .map_or_else(|| "?".to_string(), ToString::to_string)
                );
            }
        }
        Ok(())
    }
}
