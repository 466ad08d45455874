use anyhow::Context;
use chrono::{DateTime, Local};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod app;
mod clock;
mod color;
mod config;
mod display;
mod effects;
mod error;
mod frame_loop;
mod hud;
mod particles;
mod scene;
mod scheduler;
mod settings;
mod store;
mod surface;

use app::{App, Control};
use color::parse_hex_color;
use config::Config;
use display::Display;
use store::FileStore;

fn print_usage() {
    eprintln!("termcountdown - New Year countdown with snow, fire and fireworks");
    eprintln!();
    eprintln!("Usage: termcountdown [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config PATH      Read settings from a TOML file");
    eprintln!("  --store PATH       Where the chosen target is saved");
    eprintln!("  --target DATETIME  Count down to an RFC 3339 instant (not saved)");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --log-file PATH    Write logs to a file");
    eprintln!();
    eprintln!("Press 's' to change the target, 'q', ESC, or Ctrl+C to exit");
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    store: Option<PathBuf>,
    target: Option<DateTime<Local>>,
    bg_color: Option<(u8, u8, u8)>,
    log_file: Option<PathBuf>,
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    eprintln!("Run with --help for usage");
    std::process::exit(1);
}

const FLAGS: [&str; 5] = ["--config", "--store", "--target", "--bg-color", "--log-file"];

/// `Ok(None)` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "help" | "--help" | "-h") {
            return Ok(None);
        }
        if !FLAGS.contains(&flag) {
            return Err(format!("Unknown option: {}", flag));
        }
        let Some(value) = args.get(i + 1) else {
            return Err(format!("{} requires a value", flag));
        };

        match flag {
            "--config" => parsed.config = Some(PathBuf::from(value)),
            "--store" => parsed.store = Some(PathBuf::from(value)),
            "--log-file" => parsed.log_file = Some(PathBuf::from(value)),
            "--target" => match DateTime::parse_from_rfc3339(value) {
                Ok(t) => parsed.target = Some(t.with_timezone(&Local)),
                Err(_) => {
                    return Err(format!(
                        "Invalid target: {}\nExpected format: RFC 3339 (e.g., 2031-01-01T00:00:00+01:00)",
                        value
                    ));
                }
            },
            _ => match parse_hex_color(value) {
                Some(color) => parsed.bg_color = Some(color),
                None => {
                    return Err(format!(
                        "Invalid hex color: {}\nExpected format: RRGGBB (e.g., 1a1b26)",
                        value
                    ));
                }
            },
        }
        i += 2;
    }

    Ok(Some(parsed))
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    use env_logger::{Builder, Env, Target};

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        // stderr is hidden behind the alternate screen
        None => Builder::from_env(Env::default().default_filter_or("off")).init(),
    }
    Ok(())
}

fn run<W: Write>(out: &mut W, app: &mut App, display: &mut Display) -> std::io::Result<()> {
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    const FIXED_DT: f32 = 1.0 / 60.0;

    loop {
        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key, Local::now(), Instant::now()) == Control::Quit {
                        break;
                    }
                }
                Event::Resize(cols, rows) => {
                    let (cols, height) = (cols as usize, rows as usize * 2);
                    app.resize(cols, height);
                    display.resize(cols, height);
                    execute!(out, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        let mut stepped = false;
        while accumulator >= FIXED_DT {
            app.frame();
            accumulator -= FIXED_DT;
            stepped = true;
        }

        app.update(Local::now(), now);
        if stepped {
            app.draw(display, out, now)?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args(&env::args().collect::<Vec<_>>()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(message) => usage_error(&message),
    };
    init_logging(args.log_file.as_ref())?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some((r, g, b)) = args.bg_color {
        config.display.background = format!("{:02x}{:02x}{:02x}", r, g, b);
    }
    if let Some(path) = args.store {
        config.display.store_path = Some(path);
    }
    config.validate().context("Invalid configuration")?;

    let store = FileStore::new(config.display.store_path());
    log::info!("Target store: {}", store.path().display());

    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = terminal::size().and_then(|(cols, rows)| {
        let (cols, height) = (cols as usize, rows as usize * 2);
        let mut app = App::new(
            &config,
            Box::new(store),
            args.target,
            (cols, height),
            Local::now(),
            Instant::now(),
        );
        let mut display = Display::new(cols, height, config.background());
        run(&mut stdout, &mut app, &mut display)
    });

    // Restore the terminal even when the loop failed
    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    result.context("Terminal session failed")
}
