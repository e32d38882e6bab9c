use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::event::Event;
use ratatui::DefaultTerminal;
use tokio::sync::{mpsc, watch};

use sniper_feed::config::Config;
use sniper_feed::event::AppEvent;
use sniper_feed::feed::FeedClient;
use sniper_feed::input::{parse_key, UiCommand};
use sniper_feed::ui::{self, headless, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+ for wss endpoints)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    let headless = std::env::args().skip(1).any(|arg| arg == "--headless");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Check config/default.toml or SNIPER_FEED_WS_URL");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create(&config.logging.file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let endpoint = config.endpoint()?;
    tracing::info!(
        url = %endpoint,
        max_alerts = config.ui.max_alerts,
        reconnect = config.reconnect.enabled,
        headless,
        "Starting sniper-feed"
    );

    let (app_tx, app_rx) = mpsc::channel::<AppEvent>(config.feed.channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let feed = FeedClient::new(endpoint.clone(), config.reconnect.clone()).spawn(app_tx);
    let app_state = AppState::new(&config.ui.title, endpoint.as_str(), config.ui.max_alerts);

    let result = if headless {
        run_headless(app_state, app_rx, shutdown_rx).await;
        Ok(())
    } else {
        let mut terminal = ratatui::try_init()?;
        let res = run_tui(&mut terminal, app_state, app_rx, &shutdown_tx, &shutdown_rx, &config);
        ratatui::restore();
        res
    };

    feed.close().await;
    tracing::info!("Shutdown complete");
    if !headless {
        println!("Goodbye! Check {} for details.", config.logging.file.display());
    }
    result
}

fn run_tui(
    terminal: &mut DefaultTerminal,
    mut app_state: AppState,
    mut app_rx: mpsc::Receiver<AppEvent>,
    shutdown_tx: &watch::Sender<bool>,
    shutdown_rx: &watch::Receiver<bool>,
    config: &Config,
) -> Result<()> {
    app_state.push_log(format!("sniper-feed started | {}", app_state.endpoint));

    loop {
        terminal.draw(|frame| ui::render(frame, &app_state))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                match parse_key(&key) {
                    Some(UiCommand::Quit) => {
                        tracing::info!("User quit");
                        let _ = shutdown_tx.send(true);
                        break;
                    }
                    Some(cmd) => app_state.handle_command(cmd),
                    None => {}
                }
            }
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }

        if *shutdown_rx.borrow() {
            break;
        }
    }
    Ok(())
}

/// Print each alert as it arrives instead of drawing the TUI.
async fn run_headless(
    mut app_state: AppState,
    mut app_rx: mpsc::Receiver<AppEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            evt = app_rx.recv() => {
                let Some(evt) = evt else { break };
                let is_alert = matches!(evt, AppEvent::Alert(_));
                if let Some(notice) = headless::event_notice(&evt) {
                    eprintln!("{}", notice);
                }
                app_state.apply(evt);
                if is_alert {
                    if let Some(entry) = app_state.alerts.latest() {
                        println!("{}", headless::alert_report(entry));
                    }
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
    tracing::info!(
        received = app_state.received_count,
        discarded = app_state.decode_failures,
        buffered = app_state.alerts.len(),
        "Headless feed stopped"
    );
}
