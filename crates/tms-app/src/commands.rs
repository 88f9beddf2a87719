use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use tms_store::{TranslationRecord, TranslationStore};
use tms_translator::AUTO;

use crate::cli::{Command, ExportFormat};
use crate::session::Session;
use crate::state::AppState;

pub async fn run(state: AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Languages { provider, target } => languages(&state, provider, target).await,
        Command::Translate {
            project,
            provider,
            to,
            from,
            edit,
            note,
            save,
            text,
        } => {
            let request = TranslateRequest {
                project,
                provider,
                to,
                from,
                edit,
                note,
                save,
                text,
            };
            translate(&state, request).await
        }
        Command::Update {
            id,
            text,
            note,
            user,
        } => {
            blocking(state.store, move |store| {
                store.update(id, &text, note.as_deref(), user.as_deref())
            })
            .await?;
            println!("Updated translation {id}");
            Ok(())
        }
        Command::List {
            project,
            limit,
            json,
        } => {
            let records = blocking(state.store, move |store| {
                store.list_by_project(project.as_deref(), limit)
            })
            .await?;
            print_records(&records, json)
        }
        Command::Projects => {
            let projects = blocking(state.store, |store| store.list_projects()).await?;
            for project in projects {
                println!("{project}");
            }
            Ok(())
        }
        Command::Search {
            query,
            project,
            limit,
        } => {
            let records = blocking(state.store, move |store| {
                store.search(project.as_deref(), &query, limit)
            })
            .await?;
            print_records(&records, false)
        }
        Command::Stats { project, json } => {
            let name = project.clone();
            let stats = blocking(state.store, move |store| store.project_stats(&name)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Project:            {project}");
                println!("Total translations: {}", stats.total);
                println!("Completed:          {}", stats.completed);
                println!("Pending:            {}", stats.pending);
            }
            Ok(())
        }
        Command::Export {
            project,
            output,
            format,
        } => export(state.store, project, output, format).await,
    }
}

struct TranslateRequest {
    project: String,
    provider: Option<String>,
    to: Option<String>,
    from: Option<String>,
    edit: Option<String>,
    note: Option<String>,
    save: bool,
    text: String,
}

async fn languages(state: &AppState, provider: Option<String>, target: bool) -> anyhow::Result<()> {
    let kind = state.provider_kind(provider.as_deref())?;
    let translator = state.translator(kind)?;

    let catalog = if target {
        translator.target_languages().await
    } else {
        translator.source_languages().await
    }
    .with_context(|| format!("failed to fetch languages from {}", kind))?;

    if !target {
        println!("{AUTO:<10} Auto-detect");
    }
    for (code, name) in catalog.sorted_by_name() {
        println!("{code:<10} {name}");
    }
    Ok(())
}

async fn translate(state: &AppState, request: TranslateRequest) -> anyhow::Result<()> {
    if request.text.trim().is_empty() {
        anyhow::bail!("Nothing to translate");
    }

    let kind = state.provider_kind(request.provider.as_deref())?;
    let translator = state.translator(kind)?;
    let mut session = Session::start(&request.project, translator, state.config.alternatives_count)
        .await
        .with_context(|| format!("failed to initialize {}", kind))?;

    let target_lang = match request.to.or_else(|| session.default_target().map(str::to_string)) {
        Some(code) => code,
        None => anyhow::bail!("{} offers no target languages, pass --to", kind),
    };
    let source_lang = request
        .from
        .unwrap_or_else(|| session.default_source().to_string());

    let outcome = session
        .translate(&request.text, &target_lang, &source_lang)
        .await
        .with_context(|| format!("Translation error ({})", kind))?
        .clone();

    println!(
        "{} -> {}",
        session.source_languages().display_name(&outcome.source_lang),
        session.target_languages().display_name(&target_lang)
    );
    println!("{}", outcome.text);
    if !outcome.alternatives_note.is_empty() {
        println!();
        println!("{}", outcome.alternatives_note);
    }

    if !request.save {
        return Ok(());
    }

    let final_text = request.edit.as_deref().unwrap_or(&outcome.text);
    let record = session.prepare_record(
        &request.text,
        final_text,
        &source_lang,
        &target_lang,
        request.note.as_deref(),
    )?;

    let id = blocking(state.store.clone(), move |store| store.insert(&record)).await?;
    println!("Saved translation {id} to project '{}'", session.project());
    Ok(())
}

async fn export(
    store: TranslationStore,
    project: Option<String>,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let target = output.clone();
    let count = blocking(store, move |store| {
        let project = project.as_deref();
        match &target {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                let count = write_export(store, project, format, &mut writer)?;
                writer.flush()?;
                Ok(count)
            }
            None => {
                let stdout = io::stdout();
                let count = write_export(store, project, format, stdout.lock())?;
                if format == ExportFormat::Json {
                    println!();
                }
                Ok(count)
            }
        }
    })
    .await?;

    if let Some(path) = output {
        tracing::info!("Exported {} translations to {}", count, path.display());
    }
    Ok(())
}

fn write_export<W: Write>(
    store: &TranslationStore,
    project: Option<&str>,
    format: ExportFormat,
    writer: W,
) -> Result<usize, tms_store::StoreError> {
    match format {
        ExportFormat::Json => store.export_json(project, writer),
        ExportFormat::Csv => store.export_csv(project, writer),
    }
}

/// Run a store operation on the blocking pool
async fn blocking<T, F>(store: TranslationStore, op: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&TranslationStore) -> Result<T, tms_store::StoreError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(&store))
        .await
        .context("store task panicked")?;
    Ok(result?)
}

fn print_records(records: &[TranslationRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No translations found");
        return Ok(());
    }

    for record in records {
        println!(
            "#{} [{}] {} {} -> {} ({})",
            record.id,
            record.project,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.source_lang.as_deref().unwrap_or("?"),
            record.target_lang.as_deref().unwrap_or("?"),
            record.provider
        );
        println!("  {}", record.source_text);
        if record.is_completed() {
            println!("  {}", record.target_text.as_deref().unwrap_or_default());
        } else {
            println!("  (pending)");
        }
        if let Some(note) = record.note.as_deref().filter(|n| !n.is_empty()) {
            for line in note.lines() {
                println!("  | {line}");
            }
        }
    }
    Ok(())
}
