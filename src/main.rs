// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::sync::mpsc;

mod app;
mod config;
mod events;
mod extract;
mod poll;
mod ui;

use app::App;
use config::Settings;
use extract::Profile;
use poll::{PollOutcome, Poller};

#[derive(Parser, Debug)]
#[command(name = "aqwatch")]
#[command(about = "Terminal dashboard for an HTTP-polled air-quality sensor")]
struct Args {
    /// Sensor status URL (default: http://purpleair-1a9c/json)
    #[arg(short, long)]
    url: Option<String>,

    /// Poll interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Extraction profile: which fixed field table to read
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Path to a TOML config file (AQWATCH_* env vars also apply)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a one-shot connectivity diagnostic and exit
    #[arg(long, conflicts_with = "once")]
    check: bool,

    /// Poll once, print the raw JSON document, and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.url = url;
    }
    if let Some(interval) = args.interval {
        settings.interval_secs = interval;
    }
    if let Some(timeout) = args.timeout {
        settings.timeout_secs = timeout;
    }
    if let Some(profile) = args.profile {
        settings.profile = profile;
    }
    // Flags may have replaced validated values
    settings.validate()?;

    if args.check {
        return run_check(&settings);
    }
    if args.once {
        return run_once(&settings);
    }
    run_tui(settings)
}

/// Install a stderr trace subscriber for the headless modes.
///
/// The TUI owns the terminal, so no subscriber is installed there; poller
/// trace lines are advisory and simply have nowhere to go.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

/// One-shot connectivity diagnostic: DNS resolution plus a single timed
/// poll attempt, printed to stdout.
fn run_check(settings: &Settings) -> Result<()> {
    init_tracing();
    let target = settings.target()?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        println!("=== NETWORK CONNECTIVITY TEST ===");
        let mut ok = true;

        if let Some(host) = target.host_str() {
            println!("Testing DNS resolution for: {}", host);
            let port = target.port_or_known_default().unwrap_or(80);
            match tokio::net::lookup_host((host, port)).await {
                Ok(mut addrs) => match addrs.next() {
                    Some(addr) => println!("  resolved to: {}", addr.ip()),
                    None => {
                        println!("  no addresses returned");
                        ok = false;
                    }
                },
                Err(e) => {
                    println!("  DNS resolution failed: {}", e);
                    ok = false;
                }
            }
        }

        println!("Testing HTTP connectivity to: {}", target);
        let started = Instant::now();
        let poller = Poller::new(target.clone(), settings.interval(), settings.timeout());
        match poller.attempt().await {
            PollOutcome::Success(body) => {
                println!(
                    "  HTTP request successful in {:.2}s",
                    started.elapsed().as_secs_f64()
                );
                println!(
                    "  top-level keys: {}",
                    body.as_object().map(|o| o.len()).unwrap_or(0)
                );
            }
            PollOutcome::Failure(reason) => {
                println!("  {}", reason);
                ok = false;
            }
        }

        println!("=== END NETWORK TEST ===");
        if ok {
            Ok(())
        } else {
            anyhow::bail!("connectivity test failed")
        }
    })
}

/// Single poll attempt; raw JSON to stdout, classified failure as an error.
fn run_once(settings: &Settings) -> Result<()> {
    init_tracing();
    let target = settings.target()?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let poller = Poller::new(target, settings.interval(), settings.timeout());
        match poller.attempt().await {
            PollOutcome::Success(raw) => {
                println!("{}", serde_json::to_string_pretty(&raw)?);
                Ok(())
            }
            PollOutcome::Failure(reason) => anyhow::bail!(reason),
        }
    })
}

/// Run the dashboard: poller task on a background runtime, render loop on
/// the main thread.
fn run_tui(settings: Settings) -> Result<()> {
    let target = settings.target()?;

    let rt = tokio::runtime::Runtime::new()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let poller = Poller::new(target.clone(), settings.interval(), settings.timeout());
    let poll_task = rt.spawn(poller.run(tx));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(settings.profile, target.to_string(), settings.interval());

    let result = run_app(&mut terminal, &mut app, rx);

    // The poller holds nothing needing graceful release beyond its socket,
    // which the OS reclaims with the runtime.
    poll_task.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut outcomes: mpsc::UnboundedReceiver<PollOutcome>,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 10;

    while app.running {
        // Hand poller outcomes to the dashboard state; this loop is the
        // only writer, so no lock guards the app.
        while let Ok(outcome) = outcomes.try_recv() {
            app.on_poll_result(outcome);
        }

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(6),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);

            let panels = Layout::horizontal([
                Constraint::Percentage(55),
                Constraint::Percentage(45),
            ])
            .split(chunks[1]);

            ui::log::render(frame, app, panels[0]);
            ui::values::render(frame, app, panels[1]);

            ui::common::render_status_bar(frame, app, chunks[2]);

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for terminal events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
