//! Serialização do pacote de dados `#D#` (Wialon IPS).
//!
//! Formato do pacote (campos separados por `;`):
//!
//! ```text
//! #D#data;hora;lat1;lat2;lon1;lon2;speed;course;height;sats;hdop;inputs;outputs;adc;ibutton;params;
//! ```
//!
//! - `data;hora`: `ddmmyy;HHMMSS`
//! - `lat1;lat2;lon1;lon2`: ver [`crate::coords`]
//! - `inputs`/`adc`: ver [`crate::inputs`]
//! - `params`: ver [`crate::params`]
//! - `outputs` e `ibutton` não são preenchidos e vão sempre como `NA`
//!
//! Cada campo tem seu próprio fallback: um valor inválido vira `NA` sem
//! afetar os demais.

use crate::coords::encode_coordinates;
use crate::error::EncodeError;
use crate::inputs::{encode_analog_inputs, encode_digital_inputs};
use crate::params::encode_params;
use crate::types::{Scalar, TelemetryRecord};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Sentinela de valor indisponível.
pub const NA: &str = "NA";

/// Prefixo do pacote de dados.
pub const PACKET_PREFIX: &str = "#D#";

/// Separador de campos.
pub const SEPARATOR: char = ';';

/// Formato `ddmmyy;HHMMSS`.
const DATE_TIME_FORMAT: &str = "%d%m%y;%H%M%S";

const DATE_TIME_NA: &str = "NA;NA";

/// Quantidade de campos após o prefixo, contando data/hora e coordenadas
/// campo a campo.
pub const PACKET_FIELDS: usize = 17;

// ──────────────────────────────────────────────
// Pacote
// ──────────────────────────────────────────────

/// Pacote já codificado, pronto para envio.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPacket(String);

impl EncodedPacket {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Campos entre o prefixo e o `;` final (para diagnóstico).
    pub fn fields(&self) -> Vec<&str> {
        let body = self.0.strip_prefix(PACKET_PREFIX).unwrap_or(&self.0);
        let body = body.strip_suffix(SEPARATOR).unwrap_or(body);
        body.split(SEPARATOR).collect()
    }
}

impl fmt::Display for EncodedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedPacket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ──────────────────────────────────────────────
// Encoder
// ──────────────────────────────────────────────

/// Fuso usado para a data/hora do pacote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeReference {
    /// Fuso local do processo
    #[default]
    Local,
    Utc,
}

/// Serializador de registros em pacotes `#D#`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketEncoder {
    pub time_reference: TimeReference,
}

impl PacketEncoder {
    pub fn new(time_reference: TimeReference) -> Self {
        Self { time_reference }
    }

    /// Codifica um registro. Nunca falha: campos inválidos viram `NA`.
    pub fn encode(&self, record: &TelemetryRecord) -> EncodedPacket {
        let inputs = &record.inputs;
        let fields = [
            self.date_time(record.timestamp.unwrap_or(0)),
            encode_coordinates(record.latitude.as_ref(), record.longitude.as_ref()),
            numeric_field(&record.speed),
            numeric_field(&record.course),
            numeric_field(&record.altitude),
            numeric_field(&record.satellites),
            numeric_field(&record.hdop),
            // outputs
            NA.to_string(),
            encode_digital_inputs(inputs).map_or_else(|| NA.to_string(), |mask| mask.to_string()),
            NA.to_string(),
            encode_analog_inputs(inputs),
            // ibutton
            NA.to_string(),
            encode_params(record),
        ];

        let packet = format!("{PACKET_PREFIX}{}{SEPARATOR}", fields.join(";"));
        debug!(target: "ips_core::protocol", object_id = ?record.object_id, %packet, "Pacote codificado");
        EncodedPacket(packet)
    }

    fn date_time(&self, timestamp: i64) -> String {
        self.format_timestamp(timestamp).unwrap_or_else(|e| {
            warn!(target: "ips_core::protocol", error = %e, "Data/hora descartada");
            DATE_TIME_NA.to_string()
        })
    }

    fn format_timestamp(&self, timestamp: i64) -> Result<String, EncodeError> {
        let utc = DateTime::from_timestamp(timestamp, 0).ok_or(EncodeError::Timestamp(timestamp))?;
        let formatted = match self.time_reference {
            TimeReference::Local => utc.with_timezone(&Local).format(DATE_TIME_FORMAT).to_string(),
            TimeReference::Utc => utc.format(DATE_TIME_FORMAT).to_string(),
        };
        Ok(formatted)
    }
}

/// Codifica um registro com data/hora no fuso local.
pub fn encode_record(record: &TelemetryRecord) -> EncodedPacket {
    PacketEncoder::default().encode(record)
}

/// Campo numérico simples: ausente ou não numérico vira `NA`.
fn numeric_field(field: &Option<Scalar>) -> String {
    let Some(value) = field else {
        return NA.to_string();
    };
    value.numeric_text().unwrap_or_else(|e| {
        warn!(target: "ips_core::protocol", error = %e, "Campo descartado");
        NA.to_string()
    })
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Inputs;

    fn utc() -> PacketEncoder {
        PacketEncoder::new(TimeReference::Utc)
    }

    fn sample_record() -> TelemetryRecord {
        TelemetryRecord {
            object_id: Some(Scalar::Int(31835597)),
            timestamp: Some(1643307381),
            latitude: Some(Scalar::Float(57.928123)),
            longitude: Some(Scalar::Float(40.006641)),
            altitude: Some(Scalar::Int(133)),
            course: Some(Scalar::Int(359)),
            speed: Some(Scalar::Int(86)),
            satellites: Some(Scalar::Int(17)),
            hdop: Some(Scalar::Int(6)),
            status: Some(Scalar::Int(4096)),
            external_voltage: Some(Scalar::Int(28583)),
            internal_battery_voltage: Some(Scalar::Int(149)),
            alarm: Some(Scalar::Int(1)),
            inputs: [
                ("a1", Scalar::Int(7555)),
                ("a2", Scalar::Int(0)),
                ("d1", Scalar::Int(0)),
                ("d2", Scalar::Bool(true)),
                ("c1", Scalar::Int(0)),
                ("rs1", Scalar::Int(0)),
                ("rs2", Scalar::Int(0)),
                ("rs3", Scalar::Int(249)),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn end_to_end_sample() {
        let packet = utc().encode(&sample_record());
        assert_eq!(
            packet.as_str(),
            "#D#270122;181621;5755.6874;N;04000.3985;E;86;359;133;17;6;NA;2;NA;7.555,0.0;NA;\
             status:1:4096,pwr_ext:2:28.583,pwr_int:2:0.149,\
             rs485fuel_level1:1:0,rs485fuel_level2:1:0,rs485fuel_level3:1:2490;"
        );
    }

    #[test]
    fn field_layout_is_fixed() {
        let packet = utc().encode(&sample_record());
        assert!(packet.as_str().starts_with(PACKET_PREFIX));
        assert!(packet.as_str().ends_with(';'));

        let fields = packet.fields();
        assert_eq!(fields.len(), PACKET_FIELDS);
        assert_eq!(fields[11], NA);
        assert_eq!(fields[12], "2");
        assert_eq!(fields[13], NA);
        assert_eq!(fields[14], "7.555,0.0");
        assert_eq!(fields[15], NA);
    }

    #[test]
    fn empty_record_is_saturated_with_na() {
        let packet = utc().encode(&TelemetryRecord::default());
        assert_eq!(
            packet.as_str(),
            "#D#010170;000000;NA;NA;NA;NA;NA;NA;NA;NA;NA;NA;NA;NA;NA;NA;;"
        );
        assert_eq!(packet.fields().len(), PACKET_FIELDS);
    }

    #[test]
    fn bad_field_does_not_mask_others() {
        let record = TelemetryRecord {
            latitude: Some(Scalar::Text("north".into())),
            longitude: Some(Scalar::Float(40.0)),
            inputs: [("a1", Scalar::Text("x".into())), ("d1", Scalar::Int(1))]
                .into_iter()
                .collect(),
            ..sample_record()
        };
        let packet = utc().encode(&record);
        let fields = packet.fields();
        assert_eq!(&fields[2..6], [NA, NA, NA, NA]);
        assert_eq!(fields[6], "86");
        assert_eq!(fields[12], "1");
        assert_eq!(fields[14], NA);
        assert!(fields[16].starts_with("status:1:4096"));
    }

    #[test]
    fn absent_inputs() {
        let record = TelemetryRecord {
            inputs: Inputs::Absent,
            ..sample_record()
        };
        let packet = utc().encode(&record);
        let fields = packet.fields();
        assert_eq!(fields[12], NA);
        assert_eq!(fields[14], NA);
        assert_eq!(fields[16], "status:1:4096,pwr_ext:2:28.583,pwr_int:2:0.149");
    }

    #[test]
    fn speed_zero_is_emitted() {
        let record = TelemetryRecord {
            speed: Some(Scalar::Int(0)),
            hdop: Some(Scalar::Float(0.9)),
            ..Default::default()
        };
        let packet = utc().encode(&record);
        let fields = packet.fields();
        assert_eq!(fields[6], "0");
        assert_eq!(fields[10], "0.9");
    }

    #[test]
    fn text_values_cannot_break_field_layout() {
        let record = TelemetryRecord {
            speed: Some(Scalar::Text("8;6".into())),
            course: Some(Scalar::Text("north".into())),
            altitude: Some(Scalar::Bool(true)),
            ..Default::default()
        };
        let packet = utc().encode(&record);
        let fields = packet.fields();
        assert_eq!(fields.len(), PACKET_FIELDS);
        assert_eq!(fields[6], NA);
        assert_eq!(fields[7], NA);
        assert_eq!(fields[8], "1");
        assert_eq!(
            packet.as_str(),
            "#D#010170;000000;NA;NA;NA;NA;NA;NA;1;NA;NA;NA;NA;NA;NA;NA;;"
        );
    }

    #[test]
    fn out_of_range_timestamp_is_na() {
        let record = TelemetryRecord {
            timestamp: Some(i64::MAX),
            ..Default::default()
        };
        let packet = utc().encode(&record);
        assert!(packet.as_str().starts_with("#D#NA;NA;NA;NA;NA;NA;"));
    }

    #[test]
    fn encoding_is_idempotent() {
        let record = sample_record();
        assert_eq!(encode_record(&record), encode_record(&record));
        assert_eq!(utc().encode(&record), utc().encode(&record));
    }

    #[test]
    fn local_time_keeps_layout() {
        let packet = encode_record(&sample_record());
        let fields = packet.fields();
        assert_eq!(fields.len(), PACKET_FIELDS);
        assert_eq!(fields[0].len(), 6);
        assert_eq!(fields[1].len(), 6);
    }
}
