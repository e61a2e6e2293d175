mod alerts;
mod api;
mod calendar;
mod config;
mod lessons;
mod loader;
mod location;
mod models;
mod network;
mod orchestrator;
mod selector;
mod storage;
mod store;
mod teacher_table;
mod tui;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, Level};
use url::Url;

use api::ScheduleClient;
use config::Config;
use location::{Location, ShareLink};
use storage::FileStorage;
use tui::App;

/// Command-line overrides on top of the config file.
#[derive(Debug, Default, PartialEq)]
struct Args {
    init: bool,
    help: bool,
    groups: Option<String>,
    teachers: Option<String>,
    link: Option<String>,
    allow_multiple: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--init" => out.init = true,
            "--help" | "-h" => out.help = true,
            "--allow-multiple" => out.allow_multiple = true,
            "--groups" => out.groups = Some(it.next().context("--groups needs a value")?),
            "--teachers" => out.teachers = Some(it.next().context("--teachers needs a value")?),
            "--link" => out.link = Some(it.next().context("--link needs a value")?),
            other => bail!("Unknown argument: {other}"),
        }
    }
    Ok(out)
}

fn print_help() {
    println!("schedule-tui — A terminal viewer for university class schedules");
    println!();
    println!("USAGE:");
    println!("  schedule-tui                     Start the TUI");
    println!("  schedule-tui --init              Generate a default config file");
    println!("  schedule-tui --groups A,B        Open with these groups selected");
    println!("  schedule-tui --teachers 12,34    Open with these teacher ids selected");
    println!("  schedule-tui --link <url>        Open a shared link (selection in #fragment)");
    println!("  schedule-tui --allow-multiple    Start in multi-select mode");
    println!();
    println!("CONFIG:");
    println!("  File: ~/.config/schedule-tui/config.toml");
    println!("  Env overrides: SCHEDULE_API_URL, SCHEDULE_DEFAULT_GROUP");
    println!("  Log level: SCHEDULE_TUI_LOG (error|warn|info|debug|trace)");
    println!();
    println!("KEYBINDINGS:");
    println!("  Tab / 1-3         Switch tabs");
    println!("  v                 Cycle month / week / day");
    println!("  h / l             Previous / next period");
    println!("  t                 Jump to today");
    println!("  j / k             Move through lessons or table rows");
    println!("  s                 Select group or teacher");
    println!("  m                 Toggle multi-select");
    println!("  f  /  /           Lesson-type filter  /  text search");
    println!("  c / p / b         Split colors / grouping / group by date");
    println!("  Enter             Expand a row in the teacher summary");
    println!("  r                 Refresh");
    println!("  q / Ctrl+C        Quit");
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("schedule-tui")) else {
        return Ok(());
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("schedule-tui.log"))
        .with_context(|| "Failed to open log file")?;

    let level = std::env::var("SCHEDULE_TUI_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

/// Share links for both pages, with selections from the command line
/// written into their fragments.
fn share_links(config: &Config, args: &Args) -> Result<(ShareLink, ShareLink)> {
    let base = Url::parse(&config.share_url)
        .with_context(|| format!("Invalid share_url: {}", config.share_url))?;
    let base = ShareLink::new(base);
    let mut groups = base.clone();
    let mut teachers = base.page("teachers");

    if let Some(link) = &args.link {
        let url = Url::parse(link).with_context(|| format!("Invalid link: {link}"))?;
        let is_teachers = url.path().trim_end_matches('/').ends_with("teachers");
        if is_teachers {
            teachers = ShareLink::new(url);
        } else {
            groups = ShareLink::new(url);
        }
    }
    if let Some(list) = &args.groups {
        groups.set_fragment(list);
    }
    if let Some(list) = &args.teachers {
        teachers.set_fragment(list);
    }
    Ok((groups, teachers))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.init {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit it to change the default group or API address, then run schedule-tui.");
        return Ok(());
    }

    if args.help {
        print_help();
        return Ok(());
    }

    init_logging()?;

    let mut config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `schedule-tui --init` to generate a config file."
    })?;
    if args.allow_multiple {
        config.allow_multiple = true;
    }

    let client = ScheduleClient::new(&config.api_url)?;
    let (group_link, teacher_link) = share_links(&config, &args)?;
    info!(api = %config.api_url, "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(
        &config,
        client,
        group_link,
        teacher_link,
        Box::new(FileStorage::open()),
    );
    let result = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        })) = tui::event::poll_event(Duration::from_millis(100))?
        {
            tui::event::handle_key(&mut app, code, modifiers);
        }

        if !app.running {
            break;
        }

        // Apply finished background work without blocking.
        app.tick();
    }

    info!("exiting");
    Ok(())
}
