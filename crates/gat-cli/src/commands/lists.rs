use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use gat_cli::cli::{ListSource, ListsCommands, NetworkTarget, OutputFormat};
use gat_cli::config::AppConfig;
use gat_contingency::{
    load_store_from_path, ContingencyListDefinition, ContingencyListMetadata,
    ContingencyListService, CountryFilter, FormContingencyList, InMemoryDefinitionStore,
    NumericalFilter,
};
use gat_io::DirectoryNetworkProvider;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::{info, warn};
use uuid::Uuid;

use super::{output_format, write_json};

pub fn handle(command: &ListsCommands, config: &AppConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        ListsCommands::Validate { source, format } => {
            validate(source, output_format(*format, config)?, &mut out)
        }
        ListsCommands::Metadata { source, format } => {
            metadata(source, output_format(*format, config)?, &mut out)
        }
        ListsCommands::Export {
            source,
            target,
            format,
        } => export(source, target, config, output_format(*format, config)?, &mut out),
        ListsCommands::Count {
            source,
            target,
            format,
        } => count(source, target, config, output_format(*format, config)?, &mut out),
        ListsCommands::Inspect {
            source,
            target,
            format,
        } => inspect(source, target, config, output_format(*format, config)?, &mut out),
    }
}

/// Lists loaded from a file plus the ids a command should act on.
struct LoadedLists {
    store: InMemoryDefinitionStore,
    metadata: Vec<ContingencyListMetadata>,
    ids: Vec<Uuid>,
}

fn load(source: &ListSource) -> Result<LoadedLists> {
    let (store, metadata) = load_store_from_path(&source.lists)?;
    let ids = if source.ids.is_empty() {
        metadata.iter().map(|m| m.id).collect()
    } else {
        source.ids.clone()
    };
    Ok(LoadedLists {
        store,
        metadata,
        ids,
    })
}

/// Evaluation inputs after applying configured defaults.
struct Target {
    directory: PathBuf,
    network: Option<String>,
    variant: Option<String>,
}

impl Target {
    fn resolve(target: &NetworkTarget, config: &AppConfig) -> Self {
        let variant = target
            .variant
            .clone()
            .or_else(|| config.evaluation.default_variant.clone());
        if target.network.is_none() && variant.is_some() {
            info!("no network given, variant is ignored");
        }
        Self {
            directory: target
                .network_dir
                .clone()
                .unwrap_or_else(|| config.networks.directory.clone()),
            network: target.network.clone(),
            variant,
        }
    }

    fn service(
        &self,
        store: InMemoryDefinitionStore,
    ) -> ContingencyListService<InMemoryDefinitionStore, DirectoryNetworkProvider> {
        ContingencyListService::new(store, DirectoryNetworkProvider::new(&self.directory))
    }

    fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidatedList {
    #[serde(flatten)]
    metadata: ContingencyListMetadata,
    summary: String,
}

fn validate<W: Write>(source: &ListSource, format: OutputFormat, out: &mut W) -> Result<()> {
    let loaded = load(source)?;
    let mut validated = Vec::new();
    for id in &loaded.ids {
        match loaded.store.list(id) {
            Some(list) => validated.push(ValidatedList {
                summary: describe(&list.definition),
                metadata: list.metadata,
            }),
            None => warn!(list = %id, "list id not present in file"),
        }
    }

    match format {
        OutputFormat::Plain => {
            {
                let mut writer = TabWriter::new(&mut *out);
                writeln!(writer, "ID\tTYPE\tDEFINITION")?;
                for list in &validated {
                    writeln!(
                        writer,
                        "{}\t{}\t{}",
                        list.metadata.id, list.metadata.list_type, list.summary
                    )?;
                }
                writer.flush()?;
            }
            writeln!(
                out,
                "{} valid list(s) in {}",
                validated.len(),
                source.lists.display()
            )?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &validated),
    }
}

fn metadata<W: Write>(source: &ListSource, format: OutputFormat, out: &mut W) -> Result<()> {
    let loaded = load(source)?;
    let listed = if source.ids.is_empty() {
        loaded.metadata
    } else {
        loaded.store.metadata_for(&loaded.ids)
    };

    match format {
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(out);
            writeln!(writer, "ID\tTYPE\tMODIFIED")?;
            for entry in &listed {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    entry.id,
                    entry.list_type,
                    entry.modification_date.to_rfc3339()
                )?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &listed),
    }
}

fn export<W: Write>(
    source: &ListSource,
    target: &NetworkTarget,
    config: &AppConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let loaded = load(source)?;
    let target = Target::resolve(target, config);
    let service = target.service(loaded.store);
    let export = service
        .export_contingency_lists(&loaded.ids, target.network(), target.variant())
        .context("exporting contingency lists")?;

    match format {
        OutputFormat::Plain => {
            {
                let mut writer = TabWriter::new(&mut *out);
                writeln!(writer, "CONTINGENCY\tELEMENTS")?;
                for contingency in &export.contingencies {
                    let elements: Vec<&str> = contingency.element_ids().collect();
                    writeln!(writer, "{}\t{}", contingency.id, elements.join(", "))?;
                }
                writer.flush()?;
            }
            write_not_found_lists(out, &export.not_found_list_ids)
        }
        OutputFormat::Json => write_json(out, &export),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountReport {
    count: usize,
}

fn count<W: Write>(
    source: &ListSource,
    target: &NetworkTarget,
    config: &AppConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let loaded = load(source)?;
    let target = Target::resolve(target, config);
    let service = target.service(loaded.store);
    let count = service
        .contingency_count(&loaded.ids, target.network(), target.variant())
        .context("counting contingencies")?;

    match format {
        OutputFormat::Plain => {
            writeln!(out, "{count}")?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &CountReport { count }),
    }
}

fn inspect<W: Write>(
    source: &ListSource,
    target: &NetworkTarget,
    config: &AppConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let loaded = load(source)?;
    let target = Target::resolve(target, config);
    let service = target.service(loaded.store);
    let detailed = service
        .evaluation_results(&loaded.ids, target.network(), target.variant())
        .context("evaluating contingency lists")?;

    match format {
        OutputFormat::Plain => {
            {
                let mut writer = TabWriter::new(&mut *out);
                writeln!(writer, "ID\tELEMENTS\tNOT FOUND\tDISCONNECTED")?;
                for result in &detailed.results {
                    let elements = result
                        .contingency
                        .as_ref()
                        .map(|c| c.element_ids().collect::<Vec<_>>().join(", "))
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(
                        writer,
                        "{}\t{}\t{}\t{}",
                        result.id,
                        elements,
                        join_or_dash(result.not_found_elements.as_ref()),
                        join_or_dash(result.disconnected_elements.as_ref()),
                    )?;
                }
                writer.flush()?;
            }
            write_not_found_lists(out, &detailed.not_found_list_ids)
        }
        OutputFormat::Json => write_json(out, &detailed),
    }
}

fn write_not_found_lists<W: Write>(out: &mut W, ids: &[Uuid]) -> Result<()> {
    for id in ids {
        writeln!(out, "list not found: {id}")?;
    }
    Ok(())
}

fn join_or_dash<'a, I>(ids: Option<I>) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let joined = ids
        .map(|ids| {
            ids.into_iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

/// One-line rendering of a definition, e.g. `LINE nominalVoltage1 <= 225 countries1 FR`.
fn describe(definition: &ContingencyListDefinition) -> String {
    match definition {
        ContingencyListDefinition::Form(form) => describe_form(form),
        ContingencyListDefinition::Identifiers(list) => {
            format!("{} contingency group(s)", list.groups().len())
        }
    }
}

fn describe_form(form: &FormContingencyList) -> String {
    let mut parts = vec![form.equipment_type().to_string()];
    let mut voltage = |name: &str, filter: Option<&NumericalFilter>| {
        if let Some(filter) = filter {
            parts.push(format!("{name} {filter}"));
        }
    };
    voltage("nominalVoltage", form.nominal_voltage());
    voltage("nominalVoltage1", form.nominal_voltage1());
    voltage("nominalVoltage2", form.nominal_voltage2());

    for (name, countries) in [
        ("countries", form.countries()),
        ("countries1", form.countries1()),
        ("countries2", form.countries2()),
    ] {
        if let Some(codes) = country_codes(countries) {
            parts.push(format!("{name} {codes}"));
        }
    }
    parts.join(" ")
}

fn country_codes(filter: &CountryFilter) -> Option<String> {
    if filter.is_empty() {
        return None;
    }
    Some(
        filter
            .iter()
            .map(|country| country.code())
            .collect::<Vec<_>>()
            .join(","),
    )
}
