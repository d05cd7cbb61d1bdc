//! Registro de exemplo, usado quando nenhum arquivo é configurado.

use ips_core::{Scalar, TelemetryRecord};

pub fn sample_record() -> TelemetryRecord {
    TelemetryRecord {
        object_id: Some(Scalar::Int(31835597)),
        timestamp: Some(1643307381),
        latitude: Some(Scalar::Float(57.928123474121094)),
        longitude: Some(Scalar::Float(40.00664138793945)),
        altitude: Some(Scalar::Int(133)),
        course: Some(Scalar::Int(359)),
        speed: Some(Scalar::Int(86)),
        external_voltage: Some(Scalar::Int(28583)),
        internal_battery_voltage: Some(Scalar::Int(149)),
        satellites: Some(Scalar::Int(17)),
        alarm: Some(Scalar::Int(1)),
        hdop: Some(Scalar::Int(6)),
        status: Some(Scalar::Int(4096)),
        inputs: [
            ("a1", Scalar::Int(7555)),
            ("a2", Scalar::Int(0)),
            ("a3", Scalar::Int(0)),
            ("a4", Scalar::Int(0)),
            ("a5", Scalar::Int(0)),
            ("a6", Scalar::Int(0)),
            ("d1", Scalar::Int(0)),
            ("d2", Scalar::Bool(true)),
            ("c1", Scalar::Int(0)),
            ("c2", Scalar::Int(0)),
            ("rs1", Scalar::Int(0)),
            ("rs2", Scalar::Int(0)),
            ("rs3", Scalar::Int(249)),
            ("rs1_t", Scalar::Int(0)),
            ("rs2_t", Scalar::Int(0)),
            ("rs3_t", Scalar::Int(-1)),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    }
}
