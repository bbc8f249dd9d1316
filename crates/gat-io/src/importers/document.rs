//! Network snapshot documents (JSON or YAML).
//!
//! ```yaml
//! id: grid-2024-01
//! substations:
//!   - id: S_FR
//!     country: FR
//!     voltageLevels:
//!       - { id: VL_FR_400, nominalVoltage: 400 }
//!       - { id: VL_FR_225, nominalVoltage: 225 }
//! injections:
//!   - { id: GEN_FR, type: GENERATOR, voltageLevel: VL_FR_400 }
//! branches:
//!   - { id: L1, type: LINE, voltageLevel1: VL_FR_400, voltageLevel2: VL_FR_225,
//!       connected2: false }
//! variants:
//!   - id: N-1
//!     disconnected:
//!       - { element: L1 }
//! ```
//!
//! Connection flags on the equipment apply to the initial variant. Each extra
//! variant starts as a copy of the initial one and then opens the listed
//! terminals (both sides of a branch when no side is given).

use anyhow::{anyhow, Result};
use gat_core::{
    Branch, Category, Country, Diagnostics, ElementType, Injection, Kilovolts, Network, Substation,
    TerminalSide, VoltageLevel, INITIAL_VARIANT_ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDocument {
    pub id: String,
    #[serde(default)]
    pub substations: Vec<SubstationRecord>,
    #[serde(default)]
    pub injections: Vec<InjectionRecord>,
    #[serde(default)]
    pub branches: Vec<BranchRecord>,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstationRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub voltage_levels: Vec<VoltageLevelRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoltageLevelRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub nominal_voltage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub voltage_level: String,
    #[serde(default = "connected")]
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub voltage_level1: String,
    pub voltage_level2: String,
    #[serde(default = "connected")]
    pub connected1: bool,
    #[serde(default = "connected")]
    pub connected2: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub id: String,
    #[serde(default)]
    pub disconnected: Vec<TerminalRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalRecord {
    pub element: String,
    #[serde(default)]
    pub side: Option<TerminalSide>,
}

fn connected() -> bool {
    true
}

impl NetworkDocument {
    /// Build the network, skipping (and reporting) records that do not fit.
    ///
    /// Only a missing network id aborts the build.
    pub fn into_network(self, diag: &mut Diagnostics) -> Result<Network> {
        if self.id.trim().is_empty() {
            return Err(anyhow!("network document has no id"));
        }
        let mut network = Network::new(self.id);

        for record in self.substations {
            let entity = format!("Substation {}", record.id);
            let country = match record.country.as_deref().map(str::parse::<Country>) {
                Some(Ok(country)) => Some(country),
                Some(Err(err)) => {
                    diag.warning(Category::Parse, err.to_string()).on(&entity);
                    None
                }
                None => None,
            };
            let mut substation = Substation::new(&record.id, country);
            if let Some(name) = record.name {
                substation.name = name;
            }
            if let Err(err) = network.add_substation(substation) {
                diag.error(Category::Structure, err.to_string()).on(entity);
                continue;
            }

            for vl in record.voltage_levels {
                let mut voltage_level =
                    VoltageLevel::new(&vl.id, &record.id, Kilovolts(vl.nominal_voltage));
                if let Some(name) = vl.name {
                    voltage_level.name = name;
                }
                if let Err(err) = network.add_voltage_level(voltage_level) {
                    diag.error(Category::Structure, err.to_string())
                        .on(format!("VoltageLevel {}", vl.id));
                }
            }
        }

        let mut initial_open = Vec::new();

        for record in self.injections {
            let entity = format!("{} {}", record.element_type, record.id);
            if network.voltage_level(&record.voltage_level).is_none() {
                diag.error(
                    Category::Reference,
                    format!("unknown voltage level '{}'", record.voltage_level),
                )
                .on(entity);
                continue;
            }
            let mut injection =
                Injection::new(&record.id, record.element_type, &record.voltage_level);
            if let Some(name) = record.name {
                injection.name = name;
            }
            match network.add_injection(injection) {
                Ok(_) if !record.connected => initial_open.push((record.id, TerminalSide::One)),
                Ok(_) => {}
                Err(err) => {
                    diag.error(Category::Structure, err.to_string()).on(entity);
                }
            }
        }

        for record in self.branches {
            let entity = format!("{} {}", record.element_type, record.id);
            let missing = [&record.voltage_level1, &record.voltage_level2]
                .into_iter()
                .find(|vl| network.voltage_level(vl).is_none());
            if let Some(vl) = missing {
                diag.error(Category::Reference, format!("unknown voltage level '{vl}'"))
                    .on(entity);
                continue;
            }
            let mut branch = Branch::new(
                &record.id,
                record.element_type,
                &record.voltage_level1,
                &record.voltage_level2,
            );
            if let Some(name) = record.name {
                branch.name = name;
            }
            match network.add_branch(branch) {
                Ok(_) => {
                    if !record.connected1 {
                        initial_open.push((record.id.clone(), TerminalSide::One));
                    }
                    if !record.connected2 {
                        initial_open.push((record.id, TerminalSide::Two));
                    }
                }
                Err(err) => {
                    diag.error(Category::Structure, err.to_string()).on(entity);
                }
            }
        }

        for (element, side) in initial_open {
            network.set_terminal_connected_in(INITIAL_VARIANT_ID, &element, side, false)?;
        }

        for variant in self.variants {
            let entity = format!("Variant {}", variant.id);
            if let Err(err) = network.clone_variant(INITIAL_VARIANT_ID, &variant.id) {
                diag.error(Category::Structure, err.to_string()).on(entity);
                continue;
            }
            for terminal in variant.disconnected {
                let sides = match terminal.side {
                    Some(side) => vec![side],
                    None => match network.view(Some(&variant.id))?.element(&terminal.element) {
                        Some(element) => element.terminals().into_iter().map(|(s, _)| s).collect(),
                        None => Vec::new(),
                    },
                };
                if sides.is_empty() {
                    diag.warning(
                        Category::Reference,
                        format!("unknown element '{}'", terminal.element),
                    )
                    .on(&entity);
                }
                for side in sides {
                    if let Err(err) = network.set_terminal_connected_in(
                        &variant.id,
                        &terminal.element,
                        side,
                        false,
                    ) {
                        diag.warning(Category::Reference, err.to_string()).on(&entity);
                    }
                }
            }
        }

        network.validate_into(diag);
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
id: doc-grid
substations:
  - id: S_FR
    country: FR
    voltageLevels:
      - { id: VL_FR_400, nominalVoltage: 400 }
  - id: S_BE
    country: be
    voltageLevels:
      - { id: VL_BE_400, nominalVoltage: 400 }
  - id: S_ZZ
    country: ZZ
injections:
  - { id: GEN_FR, type: GENERATOR, voltageLevel: VL_FR_400 }
  - { id: GEN_OFF, type: GENERATOR, voltageLevel: VL_BE_400, connected: false }
  - { id: GEN_LOST, type: GENERATOR, voltageLevel: VL_NOWHERE }
branches:
  - { id: L1, type: LINE, voltageLevel1: VL_FR_400, voltageLevel2: VL_BE_400 }
variants:
  - id: N-1
    disconnected:
      - { element: L1 }
      - { element: GEN_FR, side: ONE }
"#;

    #[test]
    fn test_document_builds_network() {
        let document: NetworkDocument = serde_yaml::from_str(YAML).unwrap();
        let mut diag = Diagnostics::new();
        let network = document.into_network(&mut diag).unwrap();

        assert_eq!(network.id, "doc-grid");
        assert_eq!(network.element_count(), 3);
        assert_eq!(
            network.substation("S_BE").unwrap().country,
            Some(Country::BE)
        );
        // unknown country code and dangling voltage level reference are reported
        assert_eq!(network.substation("S_ZZ").unwrap().country, None);
        assert!(diag.has_errors());
        assert_eq!(diag.about("Substation S_ZZ").count(), 2);
        let lost: Vec<_> = diag.about("GENERATOR GEN_LOST").collect();
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].category, Category::Reference);
    }

    #[test]
    fn test_connection_state_and_variants() {
        let document: NetworkDocument = serde_yaml::from_str(YAML).unwrap();
        let network = document.into_network(&mut Diagnostics::new()).unwrap();

        let initial = network.view(None).unwrap();
        let gen_off = initial.element("GEN_OFF").unwrap();
        assert!(initial.is_disconnected(&gen_off));
        let line = initial.element("L1").unwrap();
        assert!(!initial.is_disconnected(&line));

        let n1 = network.view(Some("N-1")).unwrap();
        let line = n1.element("L1").unwrap();
        assert!(n1.is_disconnected(&line));
        let gen_fr = n1.element("GEN_FR").unwrap();
        assert!(n1.is_disconnected(&gen_fr));
        // variants inherit the initial state
        assert!(n1.is_disconnected(&n1.element("GEN_OFF").unwrap()));
    }

    #[test]
    fn test_countries_outside_europe_are_kept() {
        let yaml = concat!(
            "id: levant\n",
            "substations:\n",
            "  - { id: S_LB, country: lb }\n",
            "  - { id: S_KZ, country: KZ }\n",
        );
        let document: NetworkDocument = serde_yaml::from_str(yaml).unwrap();
        let mut diag = Diagnostics::new();
        let network = document.into_network(&mut diag).unwrap();

        assert_eq!(network.substation("S_LB").unwrap().country, Some(Country::LB));
        assert_eq!(network.substation("S_KZ").unwrap().country, Some(Country::KZ));
        assert!(diag.issues().iter().all(|i| i.category != Category::Parse));
    }

    #[test]
    fn test_variant_ids_must_be_new() {
        let yaml = concat!(
            "id: grid\n",
            "substations:\n  - id: S1\n    country: FR\n",
            "    voltageLevels:\n      - { id: VL1, nominalVoltage: 400 }\n",
            "injections:\n  - { id: G1, type: GENERATOR, voltageLevel: VL1 }\n",
            "variants:\n",
            "  - { id: InitialState, disconnected: [{ element: G1 }] }\n",
            "  - { id: N-1 }\n",
            "  - { id: N-1, disconnected: [{ element: G1 }] }\n",
        );
        let document: NetworkDocument = serde_yaml::from_str(yaml).unwrap();
        let mut diag = Diagnostics::new();
        let network = document.into_network(&mut diag).unwrap();

        assert_eq!(diag.about("Variant InitialState").count(), 1);
        assert_eq!(diag.about("Variant N-1").count(), 1);
        // the rejected entries changed nothing
        for variant in [None, Some("N-1")] {
            let view = network.view(variant).unwrap();
            assert!(!view.is_disconnected(&view.element("G1").unwrap()));
        }
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let document = NetworkDocument::default();
        assert!(document.into_network(&mut Diagnostics::new()).is_err());
    }
}
