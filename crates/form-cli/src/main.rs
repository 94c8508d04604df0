use clap::{Parser, Subcommand, ValueEnum};
use component_form::{
    layout_rows as component_layout_rows, paginate_form as component_paginate,
    render_text as component_render_text, visibility as component_visibility,
};
use form_spec::{
    AnswerMap, FormDocument, PaginationConfig, RenderProfile, ValidationResult, form_schema,
    import_template, validate,
};
use serde_json::{Value, json};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const CONFIG_ENV: &str = "FORMPAGE_CONFIG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form layout and pagination CLI",
    long_about = "Evaluates field visibility, derives row layouts, previews paginated exports and validates submissions"
)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(long, global = true, alias = "debug")]
    verbose: bool,
    /// Pagination config JSON (defaults to FORMPAGE_CONFIG when set).
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProfileArg {
    Pdf,
    BlankPdf,
    Preview,
}

impl From<ProfileArg> for RenderProfile {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Pdf => RenderProfile::Pdf,
            ProfileArg::BlankPdf => RenderProfile::BlankPdf,
            ProfileArg::Preview => RenderProfile::Preview,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Print which fields are visible for the given answers.
    Visibility {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
    },
    /// Print the layout rows the form renders with.
    Layout {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Keep hidden fields, as the builder does while editing.
        #[arg(long)]
        all: bool,
    },
    /// Paginate the form and print the pages.
    Paginate {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Overrides the profile from the config file.
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Validate answers against a form.
    Validate {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Derive a persisted row structure from a template's flat field list.
    ImportTemplate {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Write the form with its new rows here instead of stdout.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
    },
    /// Print the JSON schema of the form document.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Visibility { form, answers } => run_visibility(&form, answers.as_deref()),
        Command::Layout { form, answers, all } => run_layout(&form, answers.as_deref(), all),
        Command::Paginate {
            form,
            answers,
            profile,
            format,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(profile) = profile {
                config.profile = profile.into();
            }
            run_paginate(&form, answers.as_deref(), config, format)
        }
        Command::Validate { form, answers } => run_validate(&form, &answers),
        Command::ImportTemplate { form, out } => run_import_template(&form, out.as_deref()),
        Command::Schema => print_json(&form_schema()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `--config` first, then `FORMPAGE_CONFIG`, then built-in defaults.
fn load_config(path: Option<&Path>) -> CliResult<PaginationConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading pagination config");
            let contents = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(PaginationConfig::default()),
    }
}

fn read_form(path: &Path) -> CliResult<(FormDocument, String)> {
    let form_json = fs::read_to_string(path)?;
    let form: FormDocument = serde_json::from_str(&form_json)?;
    Ok((form, form_json))
}

fn read_answers(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            let _: Value = serde_json::from_str(&contents)?;
            Ok(contents)
        }
        None => Ok("{}".to_string()),
    }
}

fn component_config(form_json: String, pagination: &PaginationConfig) -> String {
    json!({ "form_json": form_json, "pagination": pagination }).to_string()
}

/// The component reports failures as `{"error": "..."}`.
fn component_output(output: String) -> CliResult<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&output)
        && let Some(Value::String(error)) = map.get("error")
    {
        return Err(error.clone().into());
    }
    Ok(output)
}

fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_component_json(output: String) -> CliResult<()> {
    let value: Value = serde_json::from_str(&component_output(output)?)?;
    print_json(&value)
}

fn run_visibility(form_path: &Path, answers_path: Option<&Path>) -> CliResult<()> {
    let (form, form_json) = read_form(form_path)?;
    let answers = read_answers(answers_path)?;
    let config = component_config(form_json, &PaginationConfig::default());
    print_component_json(component_visibility(&form.id, &config, &answers))
}

fn run_layout(form_path: &Path, answers_path: Option<&Path>, all: bool) -> CliResult<()> {
    let (form, form_json) = read_form(form_path)?;
    let answers = read_answers(answers_path)?;
    let config = component_config(form_json, &PaginationConfig::default());
    print_component_json(component_layout_rows(&form.id, &config, &answers, !all))
}

fn run_paginate(
    form_path: &Path,
    answers_path: Option<&Path>,
    pagination: PaginationConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let (form, form_json) = read_form(form_path)?;
    let answers = read_answers(answers_path)?;
    info!(form = %form.id, profile = pagination.profile.as_str(), "paginating");
    let config = component_config(form_json, &pagination);

    match format {
        OutputFormat::Json => print_component_json(component_paginate(&form.id, &config, &answers)),
        OutputFormat::Text => {
            let text = component_output(component_render_text(&form.id, &config, &answers))?;
            println!("{text}");
            Ok(())
        }
    }
}

fn run_validate(form_path: &Path, answers_path: &Path) -> CliResult<()> {
    let (form, _) = read_form(form_path)?;
    let answers_json = fs::read_to_string(answers_path)?;
    let answers: AnswerMap = serde_json::from_str(&answers_json)?;

    let result = validate(&form, &answers);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {} - {}",
                error.path.as_deref().unwrap_or("<unknown>"),
                error.message
            );
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required answers: {}",
            result.missing_required.join(", ")
        );
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            result.unknown_fields.join(", ")
        );
    }
}

fn run_import_template(form_path: &Path, out: Option<&Path>) -> CliResult<()> {
    let (mut form, _) = read_form(form_path)?;
    if !form.rows.is_empty() {
        return Err(format!("form '{}' already has a row structure", form.id).into());
    }

    form.rows = import_template(&form.fields);
    form.fields.clear();
    let rendered = serde_json::to_string_pretty(&form)?;
    match out {
        Some(path) => {
            fs::write(path, rendered)?;
            println!("Wrote {} rows to {}", form.rows.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
