//! Subcommand execution.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use v2v_builder::{
    Builder, DataVolume, Inventory, ProvisionerCatalog, Ref, Task, VirtualMachineSpec,
};

use crate::cli::{Command, OutputFormat};
use crate::config::Config;

/// Everything built for one VM.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmPlan {
    pub data_volumes: Vec<DataVolume>,
    pub virtual_machine: VirtualMachineSpec,
    pub tasks: Vec<Task>,
    pub labels: BTreeMap<String, String>,
}

/// Importer credential payloads, rendered as text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayloads {
    pub secret: BTreeMap<String, String>,
    pub config_map: BTreeMap<String, String>,
}

/// Data-volume name: the VM identifier plus a short random suffix.
pub fn data_volume_name(vm: &Ref) -> String {
    let base = if vm.id.is_empty() { &vm.name } else { &vm.id };
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", base, &suffix[..8])
}

/// Build and name the data volumes for `vm`.
pub fn named_data_volumes<S, D, C>(
    builder: &Builder<S, D, C>,
    vm: &Ref,
    config: &Config,
) -> Result<Vec<DataVolume>>
where
    S: Inventory,
    D: Inventory,
    C: ProvisionerCatalog,
{
    let specs = builder.data_volumes(vm, &config.credential_refs())?;
    Ok(specs
        .into_iter()
        .map(|spec| DataVolume {
            name: data_volume_name(vm),
            spec,
        })
        .collect())
}

/// Build everything for `vm`.
pub fn vm_plan<S, D, C>(builder: &Builder<S, D, C>, vm: &Ref, config: &Config) -> Result<VmPlan>
where
    S: Inventory,
    D: Inventory,
    C: ProvisionerCatalog,
{
    let data_volumes = named_data_volumes(builder, vm, config)?;
    let virtual_machine = builder.virtual_machine(vm, &data_volumes)?;
    let tasks = builder.tasks(vm)?;
    let labels = builder.template_labels(vm)?;

    info!(
        vm = %vm,
        volumes = data_volumes.len(),
        tasks = tasks.len(),
        "VM plan built"
    );

    Ok(VmPlan {
        data_volumes,
        virtual_machine,
        tasks,
        labels,
    })
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to render JSON")
        }
    }
}

/// Read a provider secret (YAML map of string values).
pub fn load_provider_secret<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Vec<u8>>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read provider secret: {}", path.display()))?;
    let data: BTreeMap<String, String> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse provider secret: {}", path.display()))?;
    Ok(data
        .into_iter()
        .map(|(key, value)| (key, value.into_bytes()))
        .collect())
}

/// Run a subcommand and return the rendered document.
pub fn execute<S, D, C>(
    builder: &Builder<S, D, C>,
    command: &Command,
    config: &Config,
    format: OutputFormat,
) -> Result<String>
where
    S: Inventory,
    D: Inventory,
    C: ProvisionerCatalog,
{
    match command {
        Command::Volumes(vm) => {
            let specs = builder.data_volumes(&vm.reference(), &config.credential_refs())?;
            render(&specs, format)
        }
        Command::Machine(vm) => {
            let vm = vm.reference();
            let data_volumes = named_data_volumes(builder, &vm, config)?;
            render(&builder.virtual_machine(&vm, &data_volumes)?, format)
        }
        Command::Tasks(vm) => render(&builder.tasks(&vm.reference())?, format),
        Command::Labels(vm) => render(&builder.template_labels(&vm.reference())?, format),
        Command::Plan(vm) => render(&vm_plan(builder, &vm.reference(), config)?, format),
        Command::Credentials { provider_secret } => {
            let provider = load_provider_secret(provider_secret)?;
            let payloads = CredentialPayloads {
                secret: builder.secret(&provider),
                config_map: builder
                    .config_map(&provider)
                    .into_iter()
                    .map(|(key, value)| (key, String::from_utf8_lossy(&value).into_owned()))
                    .collect(),
            };
            render(&payloads, format)
        }
    }
}
