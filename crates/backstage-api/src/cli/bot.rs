//! Bot account CLI commands: list, show, add, edit, enable, disable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use backstage_core::actions::IconUpload;
use backstage_core::editor::{
    BotEditorForm, EditorMode, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH, SubmitError,
    is_valid_username,
};
use backstage_core::row::BotRow;
use backstage_types::bot::{Bot, BotState};
use backstage_types::error::{FormField, LoadError};

use super::spinner;
use crate::state::AppState;

/// Field values for `bots add` / `bots edit`. `None` means "not given".
pub struct BotFields {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<PathBuf>,
}

impl BotFields {
    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.display_name.is_none()
            && self.description.is_none()
            && self.icon.is_none()
    }
}

/// List bot accounts: enabled bots first, then a "Disabled" section.
pub async fn list_bots(state: &AppState, filter: &str, json: bool) -> Result<()> {
    let spinner = spinner("Loading bot accounts...");
    let loaded = state.load_bots().await;
    spinner.finish_and_clear();

    match loaded {
        Ok(_) => {}
        Err(err @ (LoadError::Bots(_) | LoadError::Cancelled)) => return Err(err.into()),
        Err(err) => {
            if !json {
                println!(
                    "  {} Some details failed to load: {err}",
                    style("!").yellow().bold()
                );
            }
        }
    }

    let view = state.controller.view(filter).filtered();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(view.header).bold());
    println!("  {}", style(view.help_text).dim());
    println!();

    if view.is_empty() {
        println!("  {} {}", style("i").blue().bold(), view.empty_text);
        println!(
            "  {}: {}",
            view.add_text,
            style("backstage bots add").yellow()
        );
        println!();
        return Ok(());
    }

    if !view.enabled.is_empty() {
        println!("{}", bot_table(&view.enabled));
        println!();
    }

    if let Some(section) = &view.disabled {
        println!("  {}", style(section.heading).yellow().bold());
        println!("{}", bot_table(&section.rows));
        println!();
    }

    let total = view.enabled.len() + view.disabled.as_ref().map_or(0, |s| s.rows.len());
    println!(
        "  {} bot{}",
        style(total).bold(),
        if total == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show a bot with owner, tokens and timestamps.
pub async fn show_bot(state: &AppState, key: &str, json: bool) -> Result<()> {
    let bot = state.resolve_bot(key).await?;
    let row = state.row_for(&bot);

    if json {
        println!("{}", serde_json::to_string_pretty(&row)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(bot.label()).cyan().bold(),
        style(format!("@{}", bot.username)).dim()
    );
    if !bot.description.is_empty() {
        println!("  {}", style(&bot.description).dim());
    }
    println!();

    println!("  {}", style("── Details ──").dim());
    println!("  {}      {}", style("Status:").bold(), format_state(bot.state()));
    println!("  {}       {}", style("Owner:").bold(), row.owner_label());
    println!(
        "  {}          {}",
        style("ID:").bold(),
        style(bot.user_id.as_str()).dim()
    );
    println!("  {}        {}", style("Edit:").bold(), row.edit_link());
    println!();

    println!("  {}", style("── Tokens ──").dim());
    if row.access_tokens.is_empty() {
        println!("  (none)");
    } else {
        println!("{}", super::token::token_table(&row));
    }
    println!();

    println!("  {}", style("── Timestamps ──").dim());
    if let Some(created) = bot.created_at() {
        println!(
            "  {}     {}",
            style("Created:").bold(),
            created.format("%Y-%m-%d %H:%M UTC")
        );
    }
    if let Some(disabled) = bot.disabled_at() {
        println!(
            "  {}    {}",
            style("Disabled:").bold(),
            disabled.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!();

    Ok(())
}

/// Create a bot via interactive prompts or one-shot flags.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// backstage bots add
///
/// # One-shot with flags
/// backstage bots add --username helper --display-name "Helper" \
///     --description "Posts build results" --icon ./helper.png
/// ```
pub async fn add_bot(state: &AppState, fields: BotFields, json: bool) -> Result<()> {
    let mut form = BotEditorForm::new(state.team.clone(), state.config.max_file_size);
    let interactive = !json;

    let username = match fields.username {
        Some(u) => u,
        None if interactive => prompt_username(None)?,
        None => anyhow::bail!("--username is required with --json"),
    };
    form.set_input(FormField::Username, &username);

    let display_name = match fields.display_name {
        Some(d) => d,
        None if interactive => Input::<String>::new()
            .with_prompt("Display name")
            .default(form.input_value(FormField::Username).to_string())
            .interact_text()?,
        None => form.input_value(FormField::Username).to_string(),
    };
    form.set_input(FormField::DisplayName, &display_name);

    let description = match fields.description {
        Some(d) => d,
        None if interactive => Input::<String>::new()
            .with_prompt("Description")
            .interact_text()?,
        None => anyhow::bail!("--description is required with --json"),
    };
    form.set_input(FormField::Description, &description);

    if let Some(path) = &fields.icon {
        attach_icon(&mut form, path).await?;
    }

    submit(state, form, "Creating bot...", json).await
}

/// Edit an existing bot. Only changed fields are sent.
pub async fn edit_bot(state: &AppState, key: &str, fields: BotFields, json: bool) -> Result<()> {
    let bot = state.resolve_bot(key).await?;
    let mut form = BotEditorForm::for_bot(&bot, state.team.clone(), state.config.max_file_size);

    if fields.is_empty() && !json {
        let username = prompt_username(Some(&bot.username))?;
        form.set_input(FormField::Username, &username);
        let display_name: String = Input::new()
            .with_prompt("Display name")
            .default(bot.display_name.clone())
            .interact_text()?;
        form.set_input(FormField::DisplayName, &display_name);
        let description: String = Input::new()
            .with_prompt("Description")
            .default(bot.description.clone())
            .interact_text()?;
        form.set_input(FormField::Description, &description);
    } else {
        if let Some(u) = &fields.username {
            form.set_input(FormField::Username, u);
        }
        if let Some(d) = &fields.display_name {
            form.set_input(FormField::DisplayName, d);
        }
        if let Some(d) = &fields.description {
            form.set_input(FormField::Description, d);
        }
    }

    if let Some(path) = &fields.icon {
        attach_icon(&mut form, path).await?;
    }

    submit(state, form, &format!("Updating {}...", bot.username), json).await
}

/// Re-enable a disabled bot.
pub async fn enable_bot(state: &AppState, key: &str, json: bool) -> Result<()> {
    let bot = state.resolve_bot(key).await?;
    if bot.is_enabled() {
        if !json {
            println!("  Bot '{}' is already enabled.", bot.username);
        } else {
            println!("{}", serde_json::to_string_pretty(&bot)?);
        }
        return Ok(());
    }

    let spinner = spinner(format!("Enabling {}...", bot.username));
    let result = state.controller.enable_bot(&bot.user_id).await;
    spinner.finish_and_clear();
    let bot = result?;

    print_state_change(&bot, json)
}

/// Disable a bot, with confirmation unless `force`.
pub async fn disable_bot(state: &AppState, key: &str, force: bool, json: bool) -> Result<()> {
    let bot = state.resolve_bot(key).await?;
    if !bot.is_enabled() {
        if !json {
            println!("  Bot '{}' is already disabled.", bot.username);
        } else {
            println!("{}", serde_json::to_string_pretty(&bot)?);
        }
        return Ok(());
    }

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Disable bot '{}'? Its tokens stop working until it is enabled again.",
                style(&bot.username).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let spinner = spinner(format!("Disabling {}...", bot.username));
    let result = state.controller.disable_bot(&bot.user_id).await;
    spinner.finish_and_clear();
    let bot = result?;

    print_state_change(&bot, json)
}

// --- Helpers ---

async fn submit(state: &AppState, mut form: BotEditorForm, message: &str, json: bool) -> Result<()> {
    let creating = form.mode() == EditorMode::Create;
    let spinner = spinner(message);
    let result = form.submit(state.actions.as_ref()).await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(SubmitError::Invalid(err)) => {
            tracing::debug!(field = err.field().input_id(), "Bot form rejected");
            return Err(anyhow!("{err} ({})", flag_for(err.field())));
        }
        Err(err) => {
            if let (true, EditorMode::Edit(user_id)) = (creating, form.mode()) {
                eprintln!(
                    "  {} Bot created as {} but the icon upload failed. Retry with: {}",
                    style("!").yellow().bold(),
                    user_id,
                    style(format!("backstage bots edit {user_id} --icon <path>")).yellow()
                );
            }
            return Err(err.into());
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "bot": outcome.bot,
                "redirect": outcome.redirect,
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Saved bot {}",
        style("✓").green().bold(),
        style(format!("@{}", outcome.bot.username)).cyan()
    );
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(outcome.bot.user_id.as_str()).dim()
    );
    println!("  {}  {}", style("Next:").bold(), outcome.redirect);
    println!();

    Ok(())
}

async fn attach_icon(form: &mut BotEditorForm, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read icon {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());
    form.select_icon(IconUpload::new(file_name, bytes))?;
    Ok(())
}

fn prompt_username(current: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt("Username")
        .validate_with(|value: &String| -> Result<(), String> {
            if is_valid_username(&value.trim().to_lowercase()) {
                Ok(())
            } else {
                Err(format!(
                    "{MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters, starting with a letter; \
                     letters, numbers, '.', '-' and '_' only"
                ))
            }
        });
    if let Some(current) = current {
        input = input.default(current.to_string());
    }
    Ok(input.interact_text()?)
}

fn print_state_change(bot: &Bot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bot)?);
    } else {
        println!(
            "  {} Bot '{}' is now {}.",
            style("✓").green().bold(),
            bot.username,
            format_state(bot.state())
        );
    }
    Ok(())
}

fn bot_table(rows: &[BotRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Bot").fg(Color::White),
        Cell::new("Username").fg(Color::White),
        Cell::new("Description").fg(Color::White),
        Cell::new("Owner").fg(Color::White),
        Cell::new("Tokens").fg(Color::White),
    ]);

    for row in rows {
        let name_color = match row.state() {
            BotState::Enabled => Color::Cyan,
            BotState::Disabled => Color::DarkGrey,
        };
        table.add_row(vec![
            Cell::new(row.bot.label()).fg(name_color),
            Cell::new(format!("@{}", row.bot.username)),
            Cell::new(truncate(&row.bot.description, 50)),
            Cell::new(row.owner_label()).fg(Color::DarkGrey),
            Cell::new(format!(
                "{}/{}",
                row.active_token_count(),
                row.access_tokens.len()
            )),
        ]);
    }

    table
}

fn format_state(state: BotState) -> String {
    match state {
        BotState::Enabled => format!("{}", style("● enabled").green()),
        BotState::Disabled => format!("{}", style("○ disabled").yellow()),
    }
}

/// Command-line flag that sets a form input.
fn flag_for(field: FormField) -> &'static str {
    match field {
        FormField::Username => "--username",
        FormField::DisplayName => "--display-name",
        FormField::Description => "--description",
        FormField::Icon => "--icon",
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
