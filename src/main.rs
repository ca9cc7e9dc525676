//! Hometab CLI application entry point
//!
//! Runs the start-page search engine against a vault directory.
//!
//! # Usage
//!
//! ```bash
//! # Search notes, headings and aliases
//! hometab search "weekly review" --vault ~/notes
//!
//! # Only images, as JSON
//! hometab search logo --filter image --json
//!
//! # Open the best web match in the browser
//! hometab web docs.rs --open
//!
//! # Recently opened and bookmarked files (default command)
//! hometab
//! ```
//!
//! # Configuration
//!
//! Settings are stored in the user's config directory
//! (`~/.config/hometab/settings.toml` on Linux) and created on first run.

use async_trait::async_trait;
use colored::Colorize;
use hometab::cli::{Cli, Commands, ConfigCommands, PickerKind};
use hometab::config::{HomeTabSettings, SettingsStore};
use hometab::files::{BookmarkedFileManager, JsonBookmarks, RecentFileManager};
use hometab::host::{FsVault, HostContext, HostError, SystemWorkspace};
use hometab::index::SearchFileIndex;
use hometab::model::{FilterSpec, LinkRecord};
use hometab::notice::ConsoleNotifier;
use hometab::searchbar::{Backends, SearchBar, Suggestion};
use hometab::strategy::{
    DisplayProps, FontStrategy, IconStrategy, ImageStrategy, NoSuggestion, SuggesterStrategy,
    SystemFonts, WebBackend, WebStrategy,
};
use hometab::suggest::{NullView, SelectMode, SuggesterOptions};
use hometab::{HomeTabError, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Browser side for the CLI: vault bookmarks and the system browser
struct BrowserBackend {
    settings: HomeTabSettings,
    bookmarks: JsonBookmarks,
}

#[async_trait(?Send)]
impl WebBackend for BrowserBackend {
    fn search_engine_url(&self, query: &str) -> String {
        self.settings.search_engine_url(query)
    }

    async fn bookmarks(&self) -> Vec<LinkRecord> {
        self.bookmarks.links()
    }

    /// Browsers keep their history to themselves
    async fn history(&self) -> Vec<LinkRecord> {
        Vec::new()
    }

    async fn navigate(&self, url: &str, _new_tab: bool) -> std::result::Result<(), HostError> {
        open::that(url)?;
        Ok(())
    }
}

/// Everything a command needs, built once per run
struct App {
    settings: HomeTabSettings,
    store: SettingsStore,
    vault: Rc<FsVault>,
    host: HostContext,
    web: Rc<BrowserBackend>,
}

impl App {
    fn open(cli: &Cli, settings_path: PathBuf, settings: HomeTabSettings) -> Result<Self> {
        let vault = Rc::new(FsVault::open(&cli.vault)?);
        let workspace = Rc::new(SystemWorkspace::new(vault.root()));
        let host = HostContext::new(vault.clone(), vault.clone(), workspace);
        let web = Rc::new(BrowserBackend {
            settings: settings.clone(),
            bookmarks: JsonBookmarks::for_vault(vault.root()),
        });
        Ok(Self {
            store: SettingsStore::new(settings.clone(), settings_path),
            settings,
            vault,
            host,
            web,
        })
    }

    fn search_bar(&self, max: Option<usize>) -> SearchBar {
        let mut settings = self.settings.clone();
        if let Some(max) = max {
            settings.max_results = max;
        }
        let index = Rc::new(RefCell::new(SearchFileIndex::new(
            self.host.clone(),
            settings.index_options(),
            settings.search_options(),
        )));
        let backends = Backends {
            full_text: None,
            web: Some(self.web.clone()),
        };
        // Each CLI query is final, nothing to debounce
        SearchBar::with_options(
            self.host.clone(),
            index,
            &settings,
            backends,
            Rc::new(NullView),
            Rc::new(ConsoleNotifier::new()),
            SuggesterOptions::default().with_debounce(Duration::ZERO),
        )
    }
}

/// Print suggestions as highlighted lines or as JSON
fn print_props(props: &[DisplayProps], json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(props)
            .map_err(|e| HomeTabError::InvalidInput(format!("Failed to encode results: {e}")))?;
        println!("{text}");
        return Ok(());
    }
    if props.is_empty() {
        println!("{}", "No results".dimmed());
        return Ok(());
    }
    for item in props {
        let label: String = item
            .label
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let c = c.to_string();
                let index = u32::try_from(i).unwrap_or(u32::MAX);
                if item.label_matches.contains(&index) {
                    c.bold().yellow().to_string()
                } else {
                    c
                }
            })
            .collect();
        let mut line = format!("  {label}");
        if let Some(badge) = &item.badge {
            line.push_str(&format!(" [{badge}]"));
        }
        if let Some(detail) = &item.detail {
            line.push_str(&format!("  {}", detail.dimmed()));
        }
        println!("{line}");
        if !item.excerpt.is_empty() {
            let excerpt: String = item
                .excerpt
                .iter()
                .map(|s| {
                    if s.highlighted {
                        s.text.bold().to_string()
                    } else {
                        s.text.dimmed().to_string()
                    }
                })
                .collect();
            println!("    {excerpt}");
        }
    }
    Ok(())
}

async fn handle_search_command(
    app: &App,
    query: &str,
    filter: Option<&str>,
    max: Option<usize>,
    json: bool,
    open: bool,
) -> Result<()> {
    let bar = app.search_bar(max);
    if let Some(key) = filter {
        if FilterSpec::from_key(key).is_none() {
            return Err(HomeTabError::InvalidInput(format!("Unknown filter '{key}'")));
        }
        bar.update_active_strategy(key).await;
    }

    bar.handle_input(query).await;
    let suggestions = bar.suggestions();
    let props: Vec<DisplayProps> = suggestions.iter().map(|s| bar.display_props(s)).collect();
    print_props(&props, json)?;

    if open && let Some(first) = suggestions.first() {
        bar.suggester().use_selected(SelectMode::Default).await;
        if let Suggestion::File(result) = first {
            let recent = RecentFileManager::new(app.store.clone(), app.vault.clone());
            recent.record_open(&result.item.path);
        }
    }
    bar.destroy();
    Ok(())
}

async fn handle_web_command(app: &App, query: &str, json: bool, open: bool) -> Result<()> {
    let strategy = WebStrategy::new(app.web.clone(), app.settings.max_results);
    let results = strategy.get_suggestions(query).await;
    let props: Vec<DisplayProps> = results
        .iter()
        .map(|r| strategy.display_props(r, query))
        .collect();
    print_props(&props, json)?;

    if open && let Some(first) = results.into_iter().next() {
        strategy
            .use_selected_item(first, SelectMode::Default, query)
            .await?;
    }
    Ok(())
}

/// Labels of a picker, falling back to its no-suggestion list
async fn picker_labels<S: SuggesterStrategy>(strategy: &S, query: &str) -> Vec<DisplayProps> {
    let mut items = strategy.get_suggestions(query).await;
    if items.is_empty()
        && let NoSuggestion::Show(fallback) = strategy.on_no_suggestion(query)
    {
        items = fallback;
    }
    items
        .iter()
        .map(|item| strategy.display_props(item, query))
        .collect()
}

async fn handle_pick_command(app: &App, kind: PickerKind, query: &str) -> Result<()> {
    let props = match kind {
        PickerKind::Icon => picker_labels(&IconStrategy::default(), query).await,
        PickerKind::Font => {
            let strategy = FontStrategy::new(Rc::new(SystemFonts::default()));
            picker_labels(&strategy, query).await
        }
        PickerKind::Image => picker_labels(&ImageStrategy::new(app.vault.as_ref()), query).await,
    };
    print_props(&props, false)
}

fn handle_recent_command(app: &App, json: bool) -> Result<()> {
    let recent = RecentFileManager::new(app.store.clone(), app.vault.clone());
    let bookmarks = BookmarkedFileManager::new(
        Rc::new(JsonBookmarks::for_vault(app.vault.root())),
        app.store.clone(),
        app.vault.clone(),
    );
    if app.settings.show_bookmarked_files {
        bookmarks.refresh();
    }

    let recent_paths: Vec<String> = if app.settings.show_recent_files {
        recent.files().into_iter().map(|f| f.path).collect()
    } else {
        Vec::new()
    };
    let bookmarked: Vec<String> = bookmarks.files().into_iter().map(|f| f.path).collect();

    if json {
        let value = serde_json::json!({ "recent": recent_paths, "bookmarked": bookmarked });
        println!("{value:#}");
        return Ok(());
    }

    println!("{}", "Recent files".bold());
    for path in &recent_paths {
        println!("  {path}");
    }
    println!("{}", "Bookmarked files".bold());
    for path in &bookmarked {
        println!("  {path}");
    }
    Ok(())
}

fn handle_config_command(path: &Path, settings: &HomeTabSettings, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(settings).map_err(|e| {
                ::config::ConfigError::Message(format!("Failed to serialize settings: {e}"))
            })?;
            print!("{text}");
        }
    }
    Ok(())
}

async fn run(cli: Cli, settings_path: PathBuf, settings: HomeTabSettings) -> Result<()> {
    let command = cli.get_command();
    if let Commands::Config { command } = &command {
        return handle_config_command(&settings_path, &settings, command);
    }

    let app = App::open(&cli, settings_path, settings)?;
    match &command {
        Commands::Search {
            query,
            filter,
            max,
            json,
            open,
        } => handle_search_command(&app, query, filter.as_deref(), *max, *json, *open).await?,
        Commands::Web { query, json, open } => {
            handle_web_command(&app, query, *json, *open).await?;
        }
        Commands::Pick { kind, query } => handle_pick_command(&app, *kind, query).await?,
        Commands::Recent { json } => handle_recent_command(&app, *json)?,
        Commands::Config { .. } => {}
    }

    if app.store.is_save_pending() {
        app.store.flush();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings_path = match &cli.settings {
        Some(path) => path.clone(),
        None => HomeTabSettings::settings_path()?,
    };
    let settings = HomeTabSettings::load_from(&settings_path)?;
    if let Err(e) = settings.validate() {
        tracing::warn!("{e}");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run(cli, settings_path, settings))
}
