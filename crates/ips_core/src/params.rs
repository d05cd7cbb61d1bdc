//! Lista de parâmetros adicionais `nome:tipo:valor`.
//!
//! Tipos do protocolo: `1` inteiro, `2` fracionário. A lista é tudo ou
//! nada: qualquer valor inválido transforma o campo inteiro em `NA`.

use crate::error::EncodeError;
use crate::protocol::NA;
use crate::types::{PortClass, Scalar, TelemetryRecord, format_float};
use std::fmt;
use tracing::warn;

/// Código de tipo de um parâmetro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Integer = 1,
    Float = 2,
}

/// Um parâmetro já formatado.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
    pub value: String,
}

impl Param {
    fn new(name: impl Into<String>, kind: ParamType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.kind as u8, self.value)
    }
}

/// Codifica a lista de parâmetros do registro.
///
/// Lista vazia resulta em texto vazio; erro em qualquer item resulta em `NA`.
pub fn encode_params(record: &TelemetryRecord) -> String {
    match collect_params(record) {
        Ok(params) => params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        Err(e) => {
            warn!(target: "ips_core::params", error = %e, "Lista de parâmetros descartada");
            NA.to_string()
        }
    }
}

/// Parâmetros na ordem fixa do pacote.
pub fn collect_params(record: &TelemetryRecord) -> Result<Vec<Param>, EncodeError> {
    let mut params = Vec::new();

    if let Some(status) = truthy(&record.status) {
        params.push(Param::new("status", ParamType::Integer, status.numeric_text()?));
    }
    if let Some(u) = truthy(&record.external_voltage) {
        params.push(Param::new("pwr_ext", ParamType::Float, u.milli_to_units()?));
    }
    if let Some(u_bat) = truthy(&record.internal_battery_voltage) {
        params.push(Param::new("pwr_int", ParamType::Float, u_bat.milli_to_units()?));
    }
    if let Some(mileage) = truthy(&record.mileage) {
        params.push(Param::new("mileage", ParamType::Float, mileage.numeric_text()?));
    }
    if let Some(engine) = present(&record.engine) {
        params.push(Param::new("engine", ParamType::Integer, engine.as_int()?.to_string()));
    }
    if let Some(jamm) = present(&record.jamming_detected) {
        params.push(Param::new("jam", ParamType::Integer, jamm.as_digit_int()?.to_string()));
    }

    // Os companheiros de temperatura `rsN_t` também casam com o prefixo e
    // entram na numeração.
    if let Some(ports) = record.inputs.as_map() {
        for (i, (_, value)) in PortClass::Rs485.select(ports).enumerate() {
            params.push(Param::new(
                format!("rs485fuel_level{}", i + 1),
                ParamType::Integer,
                times_ten(value)?,
            ));
        }
    }

    Ok(params)
}

fn truthy(field: &Option<Scalar>) -> Option<&Scalar> {
    field.as_ref().filter(|v| v.is_truthy())
}

fn present(field: &Option<Scalar>) -> Option<&Scalar> {
    field.as_ref().filter(|v| !matches!(v, Scalar::Null))
}

/// Leitura bruta do sensor de combustível × 10.
fn times_ten(value: &Scalar) -> Result<String, EncodeError> {
    match value {
        Scalar::Int(i) => i
            .checked_mul(10)
            .map(|v| v.to_string())
            .ok_or_else(|| EncodeError::NotNumeric(value.to_string())),
        Scalar::Bool(b) => Ok(if *b { "10" } else { "0" }.to_string()),
        Scalar::Float(f) => Ok(format_float(f * 10.0)),
        other => Err(EncodeError::NotNumeric(other.to_string())),
    }
}
