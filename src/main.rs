//! Law & Energy bot: entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config, apply CLI overrides
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Validate content and keyword tables
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run comms channels until shutdown or console EOF

use std::io::Write as _;

use tokio_util::sync::CancellationToken;
use tracing::info;

use law_energy_bot::config::{self, Config};
use law_energy_bot::error::AppError;
use law_energy_bot::intent::IntentMatcher;
use law_energy_bot::knowledge::{CategoryId, Locale};
use law_energy_bot::{logger, subsystems};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;

    // Without -i the console is off so the process is daemon-safe.
    if !args.interactive {
        config.comms.pty.enabled = false;
    }
    if let Some(code) = args.locale.as_deref() {
        config.chat.default_locale = Locale::parse(code)?;
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        bot_name = %config.bot_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        default_locale = %config.chat.default_locale,
        interactive = %args.interactive,
        "config loaded"
    );

    let matcher = IntentMatcher::builtin();
    matcher.validate()?;

    // Shared shutdown token: Ctrl-C cancels it, all tasks watch it.
    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    print_startup_summary(&config, args.interactive);

    let comms = subsystems::comms::start(&config, matcher, shutdown.clone());
    let result = comms.join().await;

    // The console may have exited on EOF; stop everything else too.
    shutdown.cancel();

    if args.interactive {
        println!("\nBye :) ...");
        let _ = std::io::stdout().flush();
    }
    let _ = std::io::stderr().flush();

    result
}

fn print_startup_summary(config: &Config, interactive: bool) {
    let fit = |text: String| -> String {
        const WIDTH: usize = 58;
        let char_count = text.chars().count();
        if char_count >= WIDTH {
            let mut out = text.chars().take(WIDTH - 1).collect::<String>();
            out.push('…');
            out
        } else {
            format!("{text:<WIDTH$}")
        }
    };

    let pid = std::process::id();
    let mode_text = if interactive { "interactive" } else { "daemon" };

    let locales = Locale::all()
        .iter()
        .map(|l| {
            if *l == config.chat.default_locale {
                format!("{} (default)", l.code())
            } else {
                l.code().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let categories = CategoryId::all()
        .iter()
        .map(CategoryId::key)
        .collect::<Vec<_>>()
        .join(", ");

    let mut comms_lines = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        let pty_status = if config.comms.pty.enabled { "enabled" } else { "disabled (use -i)" };
        comms_lines.push(format!("⌨️  pty: {pty_status}"));
    }

    #[cfg(feature = "channel-axum")]
    {
        if config.comms.axum_channel.enabled {
            comms_lines.push(format!("🧩 axum: {}", config.comms.axum_channel.bind));
        } else {
            comms_lines.push("🧩 axum: disabled".to_string());
        }
    }

    #[cfg(not(feature = "channel-axum"))]
    if config.comms.axum_channel.enabled {
        comms_lines.push("🧩 axum: configured but not compiled in".to_string());
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ ⚖️  Law & Energy · Consultants, LLC                          ║");
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 🧾 Bot: {:<52}║", config.bot_name);
    println!("║ 🧠 PID: {:<52}║", pid);
    println!("║ 🛰️  Mode: {:<51}║", mode_text);
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 🌐 Content                                                   ║");
    println!("║   {}║", fit(format!("locales: {locales}")));
    println!("║   {}║", fit(format!("categories: {categories}")));
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 📡 Comms                                                     ║");
    for line in comms_lines {
        println!("║   {}║", fit(line));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");

    if interactive {
        println!("💡 Type /help for help");
    }
}

struct CliArgs {
    log_level: Option<&'static str>,
    interactive: bool,
    config_path: Option<String>,
    locale: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut interactive = false;
    let mut config_path = None;
    let mut locale = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: law-energy-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -i, --interactive          Run in interactive mode (enables the console)");
                println!("  -f, --config <PATH>        Path to configuration file (default: {})", config::DEFAULT_CONFIG_PATH);
                println!("  -l, --lang <CODE>          Default language for new sessions (es, en)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-i" | "--interactive" => interactive = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "-l" | "--lang" => {
                if let Some(code) = iter.next() {
                    locale = Some(code);
                } else {
                    eprintln!("error: -l/--lang requires a language code");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v picks a tier instead of the configured level:
    //   -v → warn, -vv → info, -vvv → debug, -vvvv+ → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, interactive, config_path, locale }
}
