//! Entradas analógicas e digitais do pacote `#D#`.
//!
//! - Analógicas: tensões em volts com 3 casas, separadas por vírgula,
//!   numeração a partir de 1. Ex.: `14.770,0.020,3.600`.
//! - Digitais: um inteiro onde cada bit é uma entrada, começando pelo bit
//!   menos significativo.
//!
//! As portas são ordenadas pela chave como texto, então `a10` vem antes de
//! `a2` e `d10` antes de `d2`.

use crate::error::EncodeError;
use crate::protocol::NA;
use crate::types::{Inputs, PortClass, Scalar};
use std::collections::BTreeMap;
use tracing::warn;

/// Valor emitido para uma porta analógica zerada.
const ANALOG_ZERO: &str = "0.0";

/// Maior quantidade de portas digitais que cabe na máscara.
const MAX_DIGITAL_PORTS: usize = u64::BITS as usize;

// ──────────────────────────────────────────────
// Analógicas
// ──────────────────────────────────────────────

/// Lista de entradas analógicas em volts, ou `NA` se não houver nenhuma.
pub fn encode_analog_inputs(inputs: &Inputs) -> String {
    let Some(ports) = inputs.as_map() else {
        return NA.to_string();
    };

    match analog_volts(ports) {
        Ok(volts) if volts.is_empty() => NA.to_string(),
        Ok(volts) => volts.join(","),
        Err(e) => {
            warn!(target: "ips_core::inputs", error = %e, "Entradas analógicas descartadas");
            NA.to_string()
        }
    }
}

fn analog_volts(ports: &BTreeMap<String, Scalar>) -> Result<Vec<String>, EncodeError> {
    check_port_keys(ports)?;
    PortClass::Analog
        .select(ports)
        .map(|(_, value)| {
            if value.is_truthy() {
                value.milli_to_units()
            } else {
                Ok(ANALOG_ZERO.to_string())
            }
        })
        .collect()
}

// ──────────────────────────────────────────────
// Digitais
// ──────────────────────────────────────────────

/// Máscara das entradas digitais. `None` é transmitido como `NA`.
pub fn encode_digital_inputs(inputs: &Inputs) -> Option<u64> {
    let ports = inputs.as_map()?;

    digital_mask(ports).unwrap_or_else(|e| {
        warn!(target: "ips_core::inputs", error = %e, "Entradas digitais descartadas");
        None
    })
}

fn digital_mask(ports: &BTreeMap<String, Scalar>) -> Result<Option<u64>, EncodeError> {
    check_port_keys(ports)?;
    let count = PortClass::Digital.select(ports).count();
    if count == 0 {
        return Ok(None);
    }
    if count > MAX_DIGITAL_PORTS {
        return Err(EncodeError::TooManyDigitalPorts(count));
    }

    // Chave maior primeiro: a menor termina no bit 0.
    let mut mask = 0u64;
    for (port, value) in PortClass::Digital.select(ports).rev() {
        let bit = binary_digit(port, value)?;
        mask = (mask << 1) | bit;
    }
    Ok(Some(mask))
}

/// Uma chave vazia não tem classe; o campo inteiro vira `NA`.
fn check_port_keys(ports: &BTreeMap<String, Scalar>) -> Result<(), EncodeError> {
    if ports.contains_key("") {
        return Err(EncodeError::EmptyPortKey);
    }
    Ok(())
}

fn binary_digit(port: &str, value: &Scalar) -> Result<u64, EncodeError> {
    let not_binary = || EncodeError::NotBinaryDigit {
        port: port.to_string(),
        value: value.to_string(),
    };
    match value.as_digit_int().map_err(|_| not_binary())? {
        0 => Ok(0),
        1 => Ok(1),
        _ => Err(not_binary()),
    }
}
