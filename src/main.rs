use genconsole::cli::commands::{
    ListCommand, PageCommand, RepoCommand, RunCommand, UploadImageCommand, ValidateCommand,
};
use genconsole::cli::output::*;
use genconsole::cli::{Cli, Command};
use genconsole::core::config::PipelineConfig;
use genconsole::repo::{AnalysisKind, CacheAnalyzer, RepoInspector};
use genconsole::shell::{PageInit, PAGES};
use genconsole::{
    catalog, BackendConfig, ConsoleSettings, HttpBackend, Pipeline, RenderEvent, Shell, WizardController,
};

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let mut settings =
        ConsoleSettings::load(cli.config.as_deref()).context("Failed to load console settings")?;
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
        settings.validate().context("Invalid --base-url")?;
    }
    let backend = HttpBackend::new(BackendConfig::new().with_base_url(settings.base_url.clone()));

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd, &settings, backend).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::List(cmd) => list_pipelines(cmd)?,
        Command::Page(cmd) => open_page(cmd, backend).await?,
        Command::Repo(cmd) => run_repo_command(cmd, &settings, backend).await?,
        Command::UploadImage(cmd) => upload_image(cmd, &backend).await?,
    }

    Ok(())
}

fn load_pipeline(cmd: &RunCommand) -> Result<Pipeline> {
    cmd.check_use_case().map_err(|e| anyhow!(e))?;

    if let Some(path) = &cmd.file {
        let config = PipelineConfig::from_file(path).context("Failed to load pipeline config")?;
        return Ok(config.to_pipeline()?);
    }

    let name = cmd
        .pipeline
        .as_deref()
        .ok_or_else(|| anyhow!("Either --pipeline or --file is required"))?;
    let pipeline = match (name, cmd.use_case.as_deref()) {
        ("image_to_code", Some(use_case)) => catalog::image_to_code_for(use_case)?,
        _ => catalog::pipeline(name)?,
    };
    Ok(pipeline)
}

async fn run_pipeline(cmd: &RunCommand, settings: &ConsoleSettings, backend: HttpBackend) -> Result<()> {
    let pipeline = load_pipeline(cmd)?;

    println!("{} Loaded pipeline: {}", INFO, style(&pipeline.title).bold());

    let last = match &cmd.through {
        Some(step_id) => pipeline
            .position(step_id)
            .ok_or_else(|| anyhow!("Unknown step: {}", step_id))?,
        None => pipeline.len().saturating_sub(1),
    };
    for step_id in &cmd.regenerate {
        if pipeline.position(step_id).is_none() {
            bail!("Unknown step: {}", step_id);
        }
    }

    let mut options = settings.wizard_options();
    if let Some(concurrency) = cmd.concurrency {
        options.concurrency = concurrency.into();
    }
    if let Some(staleness) = cmd.staleness {
        options.staleness = staleness.into();
    }

    let image = match &cmd.image {
        Some(path) => Some(upload_file(&backend, path).await?),
        None => None,
    };

    // Render events are buffered and printed once the spinner is cleared
    let events: Arc<Mutex<Vec<RenderEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let controller = WizardController::configure(pipeline, backend)
        .context("Invalid pipeline")?
        .with_options(options)
        .with_render_handler(move |event| {
            if let Ok(mut events) = sink.lock() {
                events.push(event);
            }
        });

    for (key, value) in &cmd.field {
        controller.set_field(key.clone(), value.clone()).await;
        println!(
            "{} Field override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }
    controller
        .update_fields(|fields| settings.apply_defaults(fields))
        .await;
    if let Some(image) = image {
        controller.set_field("image_data", image).await;
    }

    let max_lines = if cmd.full { None } else { Some(PREVIEW_LINES) };
    let steps: Vec<(String, String)> = controller.pipeline().steps[..=last]
        .iter()
        .map(|s| (s.id.clone(), s.label.clone()))
        .collect();
    let regenerations = cmd.regenerate.iter().filter_map(|id| {
        let step = controller.pipeline().step(id)?;
        Some((step.id.clone(), format!("{} (regenerate)", step.label)))
    });
    let queue: Vec<(String, String)> = steps.into_iter().chain(regenerations).collect();

    println!("{} Running {} step(s)\n", ROCKET, queue.len());

    let mut failed = false;
    for (step_id, label) in &queue {
        let spinner = create_spinner();
        start_spinner(&spinner, label.clone());
        let result = controller.trigger(step_id).await;
        spinner.finish_and_clear();

        let drained = events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default();
        for event in &drained {
            if let Some(line) = format_render_event(event, max_lines) {
                println!("{}", line);
            }
        }

        if let Err(e) = result {
            if !e.is_generation_failure() {
                println!("{} {}", WARN, style(&e).yellow());
            }
            error!("{}", e);
            failed = true;
            break;
        }
    }

    let snapshot = controller.snapshot().await;
    println!();
    for step in &snapshot.steps {
        println!("{}", format_step_summary(step));
    }

    if cmd.json {
        println!("\n{}", serde_json::to_string_pretty(&snapshot)?);
    }

    if failed {
        println!(
            "\n{} {} {}",
            CROSS,
            style(&snapshot.pipeline).bold(),
            style("failed").red()
        );
        std::process::exit(1);
    }

    println!(
        "\n{} {} completed {}",
        CHECK,
        style(&snapshot.pipeline).bold(),
        style("successfully").green()
    );
    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = PipelineConfig::from_file(&cmd.file);

    match result {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            println!("  Fields: {}", style(config.fields.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

fn list_pipelines(cmd: &ListCommand) -> Result<()> {
    let mut pipelines = Vec::new();
    for name in catalog::names() {
        pipelines.push(catalog::pipeline(name)?);
    }

    if cmd.json {
        let data = serde_json::json!({
            "pipelines": pipelines.iter().map(|p| serde_json::json!({
                "name": p.name,
                "title": p.title,
                "route": p.route,
                "steps": p.step_ids().collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
            "pages": PAGES,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Built-in pipelines:", INFO);
    for pipeline in &pipelines {
        println!(
            "  {} - {} ({})",
            style(&pipeline.name).bold(),
            pipeline.title,
            style(pipeline.step_ids().collect::<Vec<_>>().join(" → ")).dim()
        );
    }

    println!("\n{} Pages:", INFO);
    for page in PAGES {
        println!(
            "  {} - {} {}",
            style(page.id).bold(),
            page.title,
            style(format!("[{}]", page.category)).dim()
        );
    }

    Ok(())
}

async fn open_page(cmd: &PageCommand, backend: HttpBackend) -> Result<()> {
    let shell = Shell::new(backend);
    let opened = shell.open(&cmd.id).await?;

    println!("{} {}", CHECK, style(opened.page.title).bold());
    println!("  {}", style(opened.breadcrumb()).dim());
    println!("  Fragment: {} ({} bytes)", opened.page.url, opened.html.len());

    match &opened.init {
        PageInit::Static => {}
        PageInit::Wizard(pipeline) => println!(
            "  Wizard: {} ({})",
            style(&pipeline.name).cyan(),
            pipeline.step_ids().collect::<Vec<_>>().join(" → ")
        ),
        PageInit::RepoInspection => println!("  Tool: {}", style("repository inspection").cyan()),
        PageInit::RepoCacheAnalysis => println!("  Tool: {}", style("repository cache analysis").cyan()),
    }

    if cmd.html {
        println!("\n{}", opened.html);
    }
    Ok(())
}

async fn run_repo_command(cmd: &RepoCommand, settings: &ConsoleSettings, backend: HttpBackend) -> Result<()> {
    match cmd {
        RepoCommand::Inspect {
            url,
            analysis,
            question,
            model,
        } => {
            let kind: AnalysisKind = analysis.parse()?;
            let model = model.as_deref().unwrap_or(&settings.model_name);
            let mut inspector = RepoInspector::new(backend);

            let spinner = create_spinner();
            start_spinner(&spinner, "Cloning and indexing repository...".to_string());
            let indexed = inspector.clone_and_index(url).await;
            spinner.finish_and_clear();
            let indexed = indexed?;
            println!("{} {}", CHECK, indexed.message);
            println!("  Found {} files.", style(indexed.index.len()).cyan());

            let spinner = create_spinner();
            start_spinner(&spinner, "Generating analysis...".to_string());
            let response = inspector.analyze(kind, question.as_deref(), model).await;
            spinner.finish_and_clear();
            println!("\n{}", response?.content);
        }
        RepoCommand::Process { url, ttl } => {
            let mut analyzer = CacheAnalyzer::new(backend);
            let processed = analyzer.process(url, *ttl).await?;
            println!("{} {}", CHECK, style(&processed.message).green());
            println!(
                "  {} characters in {} files",
                style(processed.char_count).cyan(),
                processed.code_index.len()
            );
        }
        RepoCommand::Analyze {
            url,
            ttl,
            analysis,
            question,
            model,
            full,
        } => {
            let kinds = analysis
                .iter()
                .map(|a| a.parse::<AnalysisKind>())
                .collect::<Result<Vec<_>, _>>()?;
            let model = model.as_deref().unwrap_or(&settings.model_name);
            let mut analyzer = CacheAnalyzer::new(backend);

            let processed = analyzer.process(url, *ttl).await?;
            println!("{} {}", CHECK, style(&processed.message).green());

            for kind in kinds {
                let spinner = create_spinner();
                start_spinner(&spinner, format!("Running {} analysis...", kind));
                let result = analyzer.analyze(kind, question.as_deref(), model).await;
                spinner.finish_and_clear();

                match result {
                    Ok(result) => {
                        let text = if *full {
                            result.analysis
                        } else {
                            format_output(&result.analysis, PREVIEW_LINES)
                        };
                        println!("\n{} {}\n{}", CHECK, style(kind.display_name()).bold(), text);
                    }
                    Err(e) => println!("{} {}: {}", CROSS, style(kind).red(), e),
                }
            }

            if !analyzer.ledger().is_empty() {
                println!("\n{} Estimated cost:", INFO);
                for row in analyzer.ledger().rows() {
                    println!("{}", format_cost_row(row));
                }
            }
        }
        RepoCommand::Caches { json } => {
            let caches = CacheAnalyzer::new(backend).list_caches().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&caches)?);
            } else if caches.is_empty() {
                println!("{} No active caches found.", INFO);
            } else {
                println!("{} Active caches:", INFO);
                for cache in &caches {
                    println!("{}", format_cache_entry(cache));
                }
            }
        }
        RepoCommand::DeleteCache { name } => {
            let message = CacheAnalyzer::new(backend).delete_cache(name).await?;
            println!("{} {}", CHECK, message);
        }
        RepoCommand::History { json } => {
            let history = CacheAnalyzer::new(backend).history().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("{} No saved analyses.", INFO);
            } else {
                for entry in &history {
                    println!(
                        "  {} {} {}",
                        style(&entry.timestamp).dim(),
                        style(&entry.analysis_type).bold(),
                        entry.repo_url
                    );
                }
            }
        }
    }
    Ok(())
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Upload an image and return its data URL
async fn upload_file(backend: &HttpBackend, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    let uploaded = backend
        .upload_image(&filename, bytes, mime_type(path))
        .await
        .context("Error uploading image")?;
    println!(
        "{} Uploaded {} ({} chars of image data)",
        CHECK,
        style(&uploaded.filename).bold(),
        uploaded.image_data.len()
    );
    Ok(uploaded.image_data)
}

async fn upload_image(cmd: &UploadImageCommand, backend: &HttpBackend) -> Result<()> {
    let image_data = upload_file(backend, &cmd.file).await?;
    let preview: String = image_data.chars().take(64).collect();
    println!("  {}...", style(preview).dim());
    Ok(())
}
