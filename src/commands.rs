use std::io::{self, Write};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use dialoguer::Select;
use tracing::{info, warn};

use crate::catalog::ModelCatalog;
use crate::cli::{ImageArgs, SearchArgs};
use crate::config_store::{ConfigStore, MODEL_ID_KEY};
use crate::error::GencliError;
use crate::model_gateway::ModelGateway;
use crate::normalize::normalize;
use crate::output::emit;
use crate::request::{GenerateRequest, build_image_request, build_text_request};

pub const CLI_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
const UPDATE_PROGRAM: &str = "cargo";
const UPDATE_ARGS: &[&str] = &["install", "--git", env!("CARGO_PKG_REPOSITORY"), "gencli"];

/// Interactive choice of one catalog entry. `None` means the user backed out.
pub trait ModelPicker {
    fn pick(&self, current: &str, options: &[&'static str]) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPicker;

impl ModelPicker for DialoguerPicker {
    fn pick(&self, current: &str, options: &[&'static str]) -> Result<Option<String>> {
        let selection = Select::new()
            .with_prompt(format!("Choose a model (current: {current})"))
            .items(options)
            .default(0)
            .interact_opt()
            .context("Failed to read model selection")?;
        Ok(selection.and_then(|idx| options.get(idx).map(|name| (*name).to_string())))
    }
}

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Output>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Output> {
        Command::new(program).args(args).output()
    }
}

/// Turns recoverable failures into the text shown to the user; anything else
/// stays an error for the caller to exit on.
fn render_outcome(
    outcome: std::result::Result<String, GencliError>,
) -> std::result::Result<String, GencliError> {
    match outcome {
        Ok(text) => Ok(normalize(&text)),
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "rendering request failure as output");
            Ok(format!("Error: {err}"))
        }
        Err(err) => Err(err),
    }
}

/// Model from the config file. Ids outside the catalog are sent unchanged.
fn active_model(store: &ConfigStore) -> Result<String> {
    let model_id = store.model_id()?;
    if !ModelCatalog::current().contains_wire_id(&model_id) {
        warn!(model = %model_id, "configured model is not in the catalog; sending it as-is");
    }
    Ok(model_id)
}

async fn generate_text(
    gateway: &dyn ModelGateway,
    request: &GenerateRequest,
) -> std::result::Result<String, GencliError> {
    let response = gateway.generate(request).await?;
    Ok(response.text)
}

pub async fn search(
    args: &SearchArgs,
    store: &ConfigStore,
    gateway: &dyn ModelGateway,
    out: &mut impl Write,
) -> Result<()> {
    let model_id = active_model(store)?;
    let request = build_text_request(
        &args.query,
        &args.words,
        &args.output.language,
        args.output.temperature,
        &model_id,
    )?;
    info!(model = %model_id, "running search");

    let text = render_outcome(generate_text(gateway, &request).await)?;
    emit(&text, &args.output.destination(), out)?;
    Ok(())
}

pub async fn image(
    args: &ImageArgs,
    store: &ConfigStore,
    gateway: &dyn ModelGateway,
    out: &mut impl Write,
) -> Result<()> {
    let model_id = active_model(store)?;
    info!(model = %model_id, image_path = %args.path.display(), "running image query");

    let outcome = match build_image_request(
        &args.query,
        &args.path,
        &args.format,
        &args.output.language,
        &model_id,
    ) {
        Ok(request) => {
            let request = request.with_temperature(args.output.temperature);
            generate_text(gateway, &request).await
        }
        Err(err) => Err(err),
    };

    let text = render_outcome(outcome)?;
    emit(&text, &args.output.destination(), out)?;
    Ok(())
}

pub fn change_model(
    store: &mut ConfigStore,
    picker: &dyn ModelPicker,
    out: &mut impl Write,
) -> Result<()> {
    let current = store.model_id()?;
    writeln!(out, "Current model: {current}")?;

    let catalog = ModelCatalog::current();
    let Some(selected) = picker.pick(&current, &catalog.display_names())? else {
        writeln!(out, "Model unchanged: {current}")?;
        return Ok(());
    };

    let model_id = catalog.resolve_selection(&selected);
    store.set(MODEL_ID_KEY, model_id)?;
    info!(previous = %current, model = model_id, "model selection updated");
    writeln!(out, "Model updated to: {model_id}")?;
    Ok(())
}

pub fn print_version(out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "gencli version: {CLI_VERSION} \nTo check and update the latest version, run 'gencli update'"
    )?;
    Ok(())
}

pub fn update(runner: &dyn CommandRunner, out: &mut impl Write) -> Result<()> {
    info!(program = UPDATE_PROGRAM, args = ?UPDATE_ARGS, "updating gencli");
    let output = runner
        .run(UPDATE_PROGRAM, UPDATE_ARGS)
        .context("failed to update CLI")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("failed to update CLI: {}", stderr.trim()));
    }

    writeln!(out, "CLI updated successfully to the latest version (If any).")?;
    Ok(())
}
