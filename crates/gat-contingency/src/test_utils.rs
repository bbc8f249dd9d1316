//! Shared network fixture for tests and examples.

use gat_core::{
    Branch, Country, ElementType, GatResult, Injection, Kilovolts, Network, Substation,
    VoltageLevel,
};

/// Network `test-grid`, three countries and one piece of every equipment type.
///
/// | id | type | terminals |
/// |----|------|-----------|
/// | `GEN_FR`, `GEN_BE`, `GEN_IT` | generator | FR 400, BE 400, IT 400 |
/// | `LOAD_FR` | load | FR 220 |
/// | `LINE_FR_BE_400` | line | FR 400 / BE 400 |
/// | `LINE_FR_IT_400` | line | FR 400 / IT 400 |
/// | `LINE_FR_BE_220` | line | FR 220 / BE 220 |
/// | `TWT_FR` | transformer | FR 400 / FR 20 |
/// | `TWT_BE` | transformer | BE 220 / BE 400 |
/// | `HVDC_FR_IT` | HVDC line | FR 400 / IT 400 |
/// | `SHUNT_BE` | shunt | BE 220 |
/// | `SVC_IT` | SVC | IT 400 |
/// | `BBS_FR` | busbar section | FR 400 |
/// | `DL_BE` | dangling line | BE 400 |
/// | `LOAD_XX` | load | 20 kV, substation without country |
pub fn create_test_network() -> GatResult<Network> {
    let mut network = Network::new("test-grid");
    network.add_substation(Substation::new("S_FR", Some(Country::FR)))?;
    network.add_substation(Substation::new("S_BE", Some(Country::BE)))?;
    network.add_substation(Substation::new("S_IT", Some(Country::IT)))?;
    network.add_substation(Substation::new("S_XX", None))?;

    for (id, substation, kv) in [
        ("VL_FR_400", "S_FR", 400.0),
        ("VL_FR_220", "S_FR", 220.0),
        ("VL_FR_20", "S_FR", 20.0),
        ("VL_BE_400", "S_BE", 400.0),
        ("VL_BE_220", "S_BE", 220.0),
        ("VL_IT_400", "S_IT", 400.0),
        ("VL_XX_20", "S_XX", 20.0),
    ] {
        network.add_voltage_level(VoltageLevel::new(id, substation, Kilovolts(kv)))?;
    }

    for (id, element_type, vl) in [
        ("GEN_FR", ElementType::Generator, "VL_FR_400"),
        ("GEN_BE", ElementType::Generator, "VL_BE_400"),
        ("GEN_IT", ElementType::Generator, "VL_IT_400"),
        ("LOAD_FR", ElementType::Load, "VL_FR_220"),
        ("LOAD_XX", ElementType::Load, "VL_XX_20"),
        ("SHUNT_BE", ElementType::ShuntCompensator, "VL_BE_220"),
        ("SVC_IT", ElementType::StaticVarCompensator, "VL_IT_400"),
        ("BBS_FR", ElementType::BusbarSection, "VL_FR_400"),
        ("DL_BE", ElementType::DanglingLine, "VL_BE_400"),
    ] {
        network.add_injection(Injection::new(id, element_type, vl))?;
    }

    for (id, element_type, vl1, vl2) in [
        ("LINE_FR_BE_400", ElementType::Line, "VL_FR_400", "VL_BE_400"),
        ("LINE_FR_IT_400", ElementType::Line, "VL_FR_400", "VL_IT_400"),
        ("LINE_FR_BE_220", ElementType::Line, "VL_FR_220", "VL_BE_220"),
        ("TWT_FR", ElementType::TwoWindingsTransformer, "VL_FR_400", "VL_FR_20"),
        ("TWT_BE", ElementType::TwoWindingsTransformer, "VL_BE_220", "VL_BE_400"),
        ("HVDC_FR_IT", ElementType::HvdcLine, "VL_FR_400", "VL_IT_400"),
    ] {
        network.add_branch(Branch::new(id, element_type, vl1, vl2))?;
    }

    Ok(network)
}
