//! Coordenadas no formato NMEA 0183 (graus + minutos decimais).
//!
//! ```text
//! 57.928123, 40.006641  →  5755.6874;N;04000.3985;E
//! ```

use crate::error::EncodeError;
use crate::types::Scalar;
use tracing::warn;

/// Sentinela dos quatro campos de coordenadas.
pub const COORDS_NA: &str = "NA;NA;NA;NA";

/// Um eixo decomposto em graus inteiros e minutos decimais.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreesMinutes {
    pub degrees: f64,
    pub minutes: f64,
    pub hemisphere: char,
}

impl DegreesMinutes {
    /// Decompõe graus decimais. O sinal escolhe o hemisfério e é removido
    /// antes da divisão.
    pub fn from_decimal(value: f64, positive: char, negative: char) -> Result<Self, EncodeError> {
        if !value.is_finite() {
            return Err(EncodeError::NonFinite(value));
        }
        let (magnitude, hemisphere) = if value < 0.0 {
            (value.abs(), negative)
        } else {
            (value, positive)
        };
        Ok(Self {
            degrees: magnitude.floor(),
            minutes: magnitude.fract() * 60.0,
            hemisphere,
        })
    }
}

/// Codifica o par latitude/longitude em `DDMM.MMMM;H;DDDMM.MMMM;H`.
///
/// Qualquer lado ausente, zero ou inválido resulta em [`COORDS_NA`].
pub fn encode_coordinates(lat: Option<&Scalar>, lon: Option<&Scalar>) -> String {
    let (Some(lat), Some(lon)) = (
        lat.filter(|v| v.is_truthy()),
        lon.filter(|v| v.is_truthy()),
    ) else {
        return COORDS_NA.to_string();
    };

    match try_encode(lat, lon) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(target: "ips_core::coords", %lat, %lon, error = %e, "Coordenadas descartadas");
            COORDS_NA.to_string()
        }
    }
}

fn try_encode(lat: &Scalar, lon: &Scalar) -> Result<String, EncodeError> {
    let lat = DegreesMinutes::from_decimal(lat.as_f64()?, 'N', 'S')?;
    let lon = DegreesMinutes::from_decimal(lon.as_f64()?, 'E', 'W')?;
    Ok(format!(
        "{:02.0}{:07.4};{};{:03.0}{:07.4};{}",
        lat.degrees, lat.minutes, lat.hemisphere, lon.degrees, lon.minutes, lon.hemisphere
    ))
}
