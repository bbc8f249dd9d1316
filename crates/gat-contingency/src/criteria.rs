//! Country and nominal-voltage predicates over equipment terminals.
//!
//! Empty country sets and absent voltage filters are unconstrained. For
//! two-terminal equipment the declared side-1/side-2 filters are not tied to
//! the physical terminal numbering: a match is accepted when either assignment
//! of the two terminals to the two filter slots satisfies the country pair and
//! the voltage pair together.

use crate::numerical::NumericalFilter;
use gat_core::{Country, GatError, GatResult, Kilovolts, NetworkView, Terminal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of allowed countries. Empty means any country (including none).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryFilter(BTreeSet<Country>);

impl CountryFilter {
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse ISO codes; an unknown code is an invalid definition.
    pub fn parse<I, S>(codes: I) -> GatResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .map(|code| {
                code.as_ref()
                    .parse::<Country>()
                    .map_err(|err| match err {
                        GatError::Validation(msg) => GatError::InvalidDefinition(msg),
                        other => other,
                    })
            })
            .collect::<GatResult<BTreeSet<_>>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.0.iter()
    }

    /// Whether an element located in `country` passes this filter.
    pub fn admits(&self, country: Option<Country>) -> bool {
        self.0.is_empty() || country.is_some_and(|c| self.0.contains(&c))
    }
}

impl FromIterator<Country> for CountryFilter {
    fn from_iter<T: IntoIterator<Item = Country>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Single-country criterion used by injections.
pub fn injection_matches(country: Option<Country>, allowed: &CountryFilter) -> bool {
    allowed.admits(country)
}

/// Order-insensitive two-country criterion used by two-terminal equipment.
pub fn two_sided_matches(
    country_a: Option<Country>,
    country_b: Option<Country>,
    allowed_a: &CountryFilter,
    allowed_b: &CountryFilter,
) -> bool {
    (allowed_a.admits(country_a) && allowed_b.admits(country_b))
        || (allowed_b.admits(country_a) && allowed_a.admits(country_b))
}

/// Absent filter, or a filter on an unknown voltage that places no constraint, matches.
pub fn voltage_matches(filter: Option<&NumericalFilter>, voltage: Option<Kilovolts>) -> bool {
    match filter {
        None => true,
        Some(filter) if filter.is_unconstrained() => true,
        Some(filter) => voltage.is_some_and(|v| filter.matches(v.value())),
    }
}

/// What the filters can see of one terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalProfile {
    pub country: Option<Country>,
    pub nominal_voltage: Option<Kilovolts>,
}

impl TerminalProfile {
    pub fn of(view: &NetworkView<'_>, terminal: &Terminal) -> Self {
        Self {
            country: view.country(terminal),
            nominal_voltage: view.nominal_voltage(terminal),
        }
    }

    fn satisfies(&self, countries: &CountryFilter, voltage: Option<&NumericalFilter>) -> bool {
        injection_matches(self.country, countries)
            && voltage_matches(voltage, self.nominal_voltage)
    }
}

pub fn injection_criteria_match(
    terminal: &TerminalProfile,
    countries: &CountryFilter,
    voltage: Option<&NumericalFilter>,
) -> bool {
    terminal.satisfies(countries, voltage)
}

pub fn two_terminal_criteria_match(
    terminal1: &TerminalProfile,
    terminal2: &TerminalProfile,
    countries1: &CountryFilter,
    countries2: &CountryFilter,
    voltage1: Option<&NumericalFilter>,
    voltage2: Option<&NumericalFilter>,
) -> bool {
    if !two_sided_matches(terminal1.country, terminal2.country, countries1, countries2) {
        return false;
    }
    let direct =
        terminal1.satisfies(countries1, voltage1) && terminal2.satisfies(countries2, voltage2);
    let crossed =
        terminal1.satisfies(countries2, voltage2) && terminal2.satisfies(countries1, voltage1);
    direct || crossed
}
