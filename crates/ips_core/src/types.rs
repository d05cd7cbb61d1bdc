//! Definição do registro de telemetria recebido do parser do dispositivo.
//!
//! Os nomes serde seguem as chaves do parser upstream (`TIMESTAMP`, `U`,
//! `U_BAT`, `INPUTS`…); os nomes longos são aceitos como alias.

use crate::error::EncodeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ──────────────────────────────────────────────
// Scalar
// ──────────────────────────────────────────────

/// Valor escalar dinâmico como entregue pelo parser upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Scalar {
    /// `Null`, `false`, zero e texto vazio contam como ausentes.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Int(i) => *i != 0,
            Scalar::Float(f) => *f != 0.0,
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Null => false,
        }
    }

    /// Coerção numérica. Booleanos valem 0/1; texto e `Null` falham.
    pub fn as_f64(&self) -> Result<f64, EncodeError> {
        match self {
            Scalar::Bool(b) => Ok(f64::from(u8::from(*b))),
            Scalar::Int(i) => Ok(*i as f64),
            Scalar::Float(f) => Ok(*f),
            other => Err(EncodeError::NotNumeric(other.to_string())),
        }
    }

    /// Coerção para inteiro: floats são truncados e texto é interpretado
    /// como inteiro decimal.
    pub fn as_int(&self) -> Result<i64, EncodeError> {
        match self {
            Scalar::Bool(b) => Ok(i64::from(*b)),
            Scalar::Int(i) => Ok(*i),
            Scalar::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Scalar::Float(f) => Err(EncodeError::NonFinite(*f)),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| EncodeError::NotInteger(s.clone())),
            Scalar::Null => Err(EncodeError::NotInteger(self.to_string())),
        }
    }

    /// Inteiro estrito: só `Bool` e `Int` são aceitos, sem conversão.
    pub fn as_digit_int(&self) -> Result<i64, EncodeError> {
        match self {
            Scalar::Bool(b) => Ok(i64::from(*b)),
            Scalar::Int(i) => Ok(*i),
            other => Err(EncodeError::NotInteger(other.to_string())),
        }
    }

    /// Converte milésimos (mV) para unidades com 3 casas decimais.
    pub fn milli_to_units(&self) -> Result<String, EncodeError> {
        let units = self.as_f64()? / 1000.0;
        if units.is_finite() {
            Ok(format!("{units:.3}"))
        } else {
            Ok(format_float(units))
        }
    }

    /// Valor numérico como vai no pacote. Booleanos viram 0/1; texto e
    /// `Null` falham, já que poderiam carregar `;` ou `,` para o fio.
    pub fn numeric_text(&self) -> Result<String, EncodeError> {
        match self {
            Scalar::Bool(b) => Ok(u8::from(*b).to_string()),
            Scalar::Int(i) => Ok(i.to_string()),
            Scalar::Float(f) => Ok(format_float(*f)),
            other => Err(EncodeError::NotNumeric(other.to_string())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(true) => f.write_str("True"),
            Scalar::Bool(false) => f.write_str("False"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => f.write_str(&format_float(*v)),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Null => f.write_str(crate::protocol::NA),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

/// Representação mais curta que preserva o valor; floats inteiros mantêm
/// o `.0` (`249.0`) e fora de `1e-4 <= |v| < 1e16` usa expoente com sinal
/// e dois dígitos (`1e+16`, `1.5e-05`), como os sistemas receptores esperam.
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let shortest = format!("{v:e}");
        let (mantissa, exponent) = shortest.split_once('e').unwrap_or((shortest.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ──────────────────────────────────────────────
// Portas de I/O
// ──────────────────────────────────────────────

/// Classe de porta, identificada pelo prefixo da chave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortClass {
    /// `a1`, `a2`… (mV)
    Analog,
    /// `d1`, `d2`… (0/1)
    Digital,
    /// `rs1`, `rs2`… e os companheiros de temperatura `rs1_t`…
    Rs485,
}

impl PortClass {
    pub fn prefix(self) -> &'static str {
        match self {
            PortClass::Analog => "a",
            PortClass::Digital => "d",
            PortClass::Rs485 => "rs",
        }
    }

    pub fn matches(self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }

    /// Portas desta classe em ordem lexicográfica crescente da chave
    /// (`a10` vem antes de `a2`).
    pub fn select(
        self,
        ports: &BTreeMap<String, Scalar>,
    ) -> impl DoubleEndedIterator<Item = (&String, &Scalar)> {
        ports.iter().filter(move |(key, _)| self.matches(key))
    }
}

/// Entradas do dispositivo: ausentes ou um mapa chave → valor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInputs", into = "RawInputs")]
pub enum Inputs {
    #[default]
    Absent,
    Present(BTreeMap<String, Scalar>),
}

impl Inputs {
    pub fn as_map(&self) -> Option<&BTreeMap<String, Scalar>> {
        match self {
            Inputs::Absent => None,
            Inputs::Present(ports) => Some(ports),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Inputs::Absent)
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Inputs::Present(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Forma de fio: o parser upstream manda o marcador `"NA"` quando não há
/// entradas.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawInputs {
    Ports(BTreeMap<String, Scalar>),
    Marker(String),
}

impl From<RawInputs> for Inputs {
    fn from(raw: RawInputs) -> Self {
        match raw {
            RawInputs::Ports(ports) => Inputs::Present(ports),
            RawInputs::Marker(_) => Inputs::Absent,
        }
    }
}

impl From<Inputs> for RawInputs {
    fn from(inputs: Inputs) -> Self {
        match inputs {
            Inputs::Absent => RawInputs::Marker(crate::protocol::NA.into()),
            Inputs::Present(ports) => RawInputs::Ports(ports),
        }
    }
}

// ──────────────────────────────────────────────
// Registro completo
// ──────────────────────────────────────────────

/// Um relatório do dispositivo, já decodificado pelo parser upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Identificador do objeto (não entra no pacote)
    #[serde(rename = "OBJID", alias = "ObjectId", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Scalar>,
    /// Segundos desde a época Unix (UTC); ausente = 0
    #[serde(rename = "TIMESTAMP", alias = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Graus decimais
    #[serde(rename = "LATITUDE", alias = "Latitude", default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Scalar>,
    /// Graus decimais
    #[serde(rename = "LONGITUDE", alias = "Longitude", default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Scalar>,
    #[serde(rename = "ALTITUDE", alias = "Altitude", default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<Scalar>,
    #[serde(rename = "COURSE", alias = "Course", default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Scalar>,
    #[serde(rename = "SPEED", alias = "Speed", default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Scalar>,
    #[serde(rename = "SATELLITES", alias = "Satellites", default, skip_serializing_if = "Option::is_none")]
    pub satellites: Option<Scalar>,
    #[serde(rename = "HDOP", alias = "Hdop", default, skip_serializing_if = "Option::is_none")]
    pub hdop: Option<Scalar>,
    /// Bitfield de status do dispositivo
    #[serde(rename = "STATUS", alias = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Scalar>,
    /// Alimentação externa (mV)
    #[serde(rename = "U", alias = "ExternalVoltage", default, skip_serializing_if = "Option::is_none")]
    pub external_voltage: Option<Scalar>,
    /// Bateria interna (mV)
    #[serde(rename = "U_BAT", alias = "InternalBatteryVoltage", default, skip_serializing_if = "Option::is_none")]
    pub internal_battery_voltage: Option<Scalar>,
    #[serde(rename = "MILEAGE", alias = "Mileage", default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<Scalar>,
    /// Ignição ligada/desligada
    #[serde(rename = "ENGINE", alias = "Engine", default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<Scalar>,
    /// Jamming GSM detectado (0/1)
    #[serde(rename = "JAMM", alias = "JammingDetected", default, skip_serializing_if = "Option::is_none")]
    pub jamming_detected: Option<Scalar>,
    /// Botão de pânico (recebido, não transmitido)
    #[serde(rename = "ALARM", alias = "Alarm", default, skip_serializing_if = "Option::is_none")]
    pub alarm: Option<Scalar>,
    #[serde(rename = "INPUTS", alias = "Inputs", default)]
    pub inputs: Inputs,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_upstream_rules() {
        assert!(!Scalar::Int(0).is_truthy());
        assert!(!Scalar::Float(0.0).is_truthy());
        assert!(!Scalar::Bool(false).is_truthy());
        assert!(!Scalar::Text(String::new()).is_truthy());
        assert!(!Scalar::Null.is_truthy());
        assert!(Scalar::Int(-1).is_truthy());
        assert!(Scalar::Text("0".into()).is_truthy());
    }

    #[test]
    fn display_is_verbatim() {
        assert_eq!(Scalar::Int(86).to_string(), "86");
        assert_eq!(Scalar::Float(249.0).to_string(), "249.0");
        assert_eq!(Scalar::Float(1234.5).to_string(), "1234.5");
        assert_eq!(Scalar::Bool(true).to_string(), "True");
        assert_eq!(Scalar::Null.to_string(), "NA");
    }

    #[test]
    fn coercions() {
        assert_eq!(Scalar::Bool(true).as_f64(), Ok(1.0));
        assert!(Scalar::Text("57.9".into()).as_f64().is_err());
        assert_eq!(Scalar::Float(3.9).as_int(), Ok(3));
        assert_eq!(Scalar::Text(" 5 ".into()).as_int(), Ok(5));
        assert!(Scalar::Text("on".into()).as_int().is_err());
        assert!(Scalar::Float(1.0).as_digit_int().is_err());
    }

    #[test]
    fn float_display_uses_exponent_outside_plain_range() {
        assert_eq!(Scalar::Float(1e16).to_string(), "1e+16");
        assert_eq!(Scalar::Float(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(Scalar::Float(-2.5e20).to_string(), "-2.5e+20");
        assert_eq!(Scalar::Float(1e-4).to_string(), "0.0001");
        assert_eq!(Scalar::Float(9999999999999998.0).to_string(), "9999999999999998.0");
        assert_eq!(Scalar::Float(0.0).to_string(), "0.0");
        assert_eq!(Scalar::Float(f64::NAN).to_string(), "nan");
    }

    #[test]
    fn numeric_text_rejects_text_and_null() {
        assert_eq!(Scalar::Int(86).numeric_text(), Ok("86".into()));
        assert_eq!(Scalar::Float(0.9).numeric_text(), Ok("0.9".into()));
        assert_eq!(Scalar::Bool(true).numeric_text(), Ok("1".into()));
        assert!(Scalar::Text("8;6".into()).numeric_text().is_err());
        assert!(Scalar::Null.numeric_text().is_err());
    }

    #[test]
    fn milli_to_units_non_finite() {
        assert_eq!(Scalar::Float(f64::NAN).milli_to_units().unwrap(), "nan");
        assert_eq!(Scalar::Float(f64::NEG_INFINITY).milli_to_units().unwrap(), "-inf");
    }

    #[test]
    fn milli_to_units_has_three_decimals() {
        assert_eq!(Scalar::Int(28583).milli_to_units().unwrap(), "28.583");
        assert_eq!(Scalar::Int(149).milli_to_units().unwrap(), "0.149");
        assert_eq!(Scalar::Int(1200).milli_to_units().unwrap(), "1.200");
    }

    #[test]
    fn port_selection_is_lexicographic() {
        let inputs: Inputs = [("a2", 1), ("a10", 2), ("d1", 3), ("a1", 4)]
            .into_iter()
            .collect();
        let ports = inputs.as_map().unwrap();
        let keys: Vec<&str> = PortClass::Analog
            .select(ports)
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["a1", "a10", "a2"]);
    }

    #[test]
    fn record_from_toml_with_upstream_keys() {
        let text = r#"
OBJID = 31835597
TIMESTAMP = 1643307381
LATITUDE = 57.928123
Longitude = 40.006641
U = 28583
ENGINE = true

[INPUTS]
a1 = 7555
d2 = true
rs3 = 249
"#;
        let record: TelemetryRecord = toml::from_str(text).unwrap();
        assert_eq!(record.timestamp, Some(1643307381));
        assert_eq!(record.latitude, Some(Scalar::Float(57.928123)));
        assert_eq!(record.longitude, Some(Scalar::Float(40.006641)));
        assert_eq!(record.external_voltage, Some(Scalar::Int(28583)));
        assert_eq!(record.engine, Some(Scalar::Bool(true)));
        let ports = record.inputs.as_map().unwrap();
        assert_eq!(ports.get("d2"), Some(&Scalar::Bool(true)));
        assert_eq!(ports.get("rs3"), Some(&Scalar::Int(249)));
    }

    #[test]
    fn na_marker_means_absent_inputs() {
        let record: TelemetryRecord = toml::from_str(r#"INPUTS = "NA""#).unwrap();
        assert!(record.inputs.is_absent());

        let record: TelemetryRecord = toml::from_str("SPEED = 10").unwrap();
        assert!(record.inputs.is_absent());
    }
}
