//! PTY (console) channel: one conversation on stdin/stdout.
//!
//! Lines starting with `/` are commands (`/help` lists them); anything else
//! is a chat turn. Replies are revealed word by word on a terminal and
//! printed in one go when stdout is piped. Runs until `/quit`, EOF on stdin,
//! or the shutdown token is cancelled (Ctrl-C).
//!
//! Stdin is read on a plain OS thread that forwards lines over an mpsc
//! channel. A blocking read there never holds up runtime shutdown; the
//! thread is simply abandoned when the process exits.

use std::io::{BufRead as _, IsTerminal as _, Write as _};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::appointment::{self, AppointmentError, AppointmentRequest};
use crate::error::AppError;
use crate::knowledge::{LocaleContent, Locale};
use crate::session::Conversation;
use crate::subsystems::runtime::{Channel, ChannelFuture};

use super::state::{CommsEvent, CommsState};
use super::typewriter::{render_markdown, reveal};

const BRAND_HEADER: &str = "Law & Energy";
const BRAND_CAPTION: &str = "Consultants, LLC";
const RULE: &str = "─────────────────────────────────────────────";

/// Lines read from stdin. Closed on EOF or read error.
type Input = mpsc::Receiver<String>;

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(channel_id: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), state }
    }
}

impl Channel for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture {
        let input = spawn_stdin_reader();
        Box::pin(run_pty(self.channel_id, self.state, input, shutdown))
    }
}

/// Forward stdin lines from a detached thread.
fn spawn_stdin_reader() -> Input {
    let (tx, rx) = mpsc::channel::<String>(16);
    let spawned = std::thread::Builder::new()
        .name("pty-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("pty read error: {e}");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        // `rx` sees a closed channel, which reads as EOF.
        warn!("pty stdin reader not started: {e}");
    }
    rx
}

// ── Commands ─────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Help,
    /// `/lang` alone toggles; `/lang <code>` selects.
    Lang(Option<&'a str>),
    Contact,
    Appointment,
    History,
    Quit,
    Unknown(&'a str),
    Chat(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Chat(line));
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    Some(match name {
        "help" | "ayuda" => Command::Help,
        "lang" | "idioma" => Command::Lang(arg),
        "contact" | "contacto" => Command::Contact,
        "appointment" | "cita" => Command::Appointment,
        "history" | "historial" => Command::History,
        "quit" | "exit" | "salir" => Command::Quit,
        other => Command::Unknown(other),
    })
}

fn toggle(locale: Locale) -> Locale {
    match locale {
        Locale::Es => Locale::En,
        Locale::En => Locale::Es,
    }
}

// ── run_pty ──────────────────────────────────────────────────────────────────

async fn run_pty(
    channel_id: String,
    state: Arc<CommsState>,
    mut input: Input,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let ansi = std::io::stdout().is_terminal();
    let content_store = state.matcher().content();
    let mut conversation = Conversation::new(state.chat().default_locale);

    state.report_event(CommsEvent::SessionStarted {
        channel_id: channel_id.clone(),
        session_id: conversation.id(),
    });
    info!(%channel_id, session_id = %conversation.id(), locale = %conversation.locale(), "pty channel started");
    print_banner(content_store.get(conversation.locale()), ansi);

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let Some(line) = next_line(&mut input, &shutdown).await else { break };
        let content = content_store.get(conversation.locale());

        match parse_command(&line) {
            None => continue,
            Some(Command::Quit) => break,
            Some(Command::Help) => print_help(),
            Some(Command::Lang(code)) => {
                let next = match code {
                    None => Ok(toggle(conversation.locale())),
                    Some(code) => Locale::parse(code),
                };
                match next {
                    Ok(locale) => {
                        conversation.set_locale(locale);
                        debug!(%channel_id, %locale, "locale switched");
                        print_banner(content_store.get(locale), ansi);
                    }
                    Err(e) => println!("{e} — try /lang es or /lang en"),
                }
            }
            Some(Command::Contact) => print_office(content),
            Some(Command::History) => {
                if conversation.is_empty() {
                    println!("(no messages yet)");
                } else {
                    print!("{}", conversation.to_markdown());
                }
            }
            Some(Command::Appointment) => {
                if appointment_form(&mut input, &shutdown, content, ansi).await.is_none() {
                    break;
                }
            }
            Some(Command::Unknown(name)) => println!("unknown command /{name} — type /help"),
            Some(Command::Chat(text)) => {
                show_thinking(content, &state, ansi).await;
                let (next, turn) = state.take_turn(&channel_id, conversation, text);
                conversation = next;
                let rendered = render_markdown(turn.reply, ansi);
                reveal(&mut std::io::stdout(), &rendered, state.chat().reveal_delay, ansi).await?;
            }
        }
    }

    state.report_event(CommsEvent::ChannelShutdown { channel_id });
    Ok(())
}

/// Next line from stdin, or `None` once stdin is closed or on shutdown.
async fn next_line(input: &mut Input, shutdown: &CancellationToken) -> Option<String> {
    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!("pty channel shutting down");
            None
        }

        line = input.recv() => {
            if line.is_none() {
                info!("pty stdin closed");
            }
            line
        }
    }
}

async fn show_thinking(content: &LocaleContent, state: &CommsState, ansi: bool) {
    let delay = state.chat().thinking_delay;
    if !ansi || delay.is_zero() {
        return;
    }
    print!("\x1b[2m{}\x1b[0m", content.thinking);
    let _ = std::io::stdout().flush();
    tokio::time::sleep(delay).await;
    print!("\r\x1b[2K");
    let _ = std::io::stdout().flush();
}

async fn appointment_form(
    input: &mut Input,
    shutdown: &CancellationToken,
    content: &LocaleContent,
    ansi: bool,
) -> Option<()> {
    let form = &content.form;
    println!("{}", render_markdown(form.heading, ansi));

    let request = AppointmentRequest {
        name: ask(input, shutdown, form.name_label).await?,
        email: ask(input, shutdown, form.email_label).await?,
        phone: ask(input, shutdown, form.phone_label).await?,
        description: ask(input, shutdown, form.description_label).await?,
    };

    match appointment::submit(&request, content) {
        Ok(receipt) => println!("{}", receipt.message),
        Err(e) => {
            debug!("appointment rejected: {e}");
            println!("{}", rejection(&e, content));
        }
    }
    Some(())
}

/// Localized rejection followed by the labels of the blank fields.
fn rejection(error: &AppointmentError, content: &LocaleContent) -> String {
    let AppointmentError::MissingRequired(fields) = error;
    let labels: Vec<&str> = fields.iter().map(|f| f.label(&content.form)).collect();
    format!("{} ({})", error.user_message(content), labels.join(", "))
}

async fn ask(input: &mut Input, shutdown: &CancellationToken, label: &str) -> Option<String> {
    print!("  {label}: ");
    let _ = std::io::stdout().flush();
    next_line(input, shutdown).await.map(|s| s.trim().to_string())
}

// ── Output ───────────────────────────────────────────────────────────────────

fn print_banner(content: &LocaleContent, ansi: bool) {
    println!("{RULE}");
    println!(" {BRAND_HEADER} · {BRAND_CAPTION}");
    println!(" {} — {}", content.title, content.subtitle);
    println!(" {}", render_markdown(content.welcome, ansi));
    println!(" {}", content.placeholder);
    println!(" [{}]  /help · /lang · /quit", content.locale.label());
    println!("{RULE}");
}

fn print_office(content: &LocaleContent) {
    let office = &content.office;
    println!("{}: {}", office.location_label, office.address);
    println!("{}: {}", office.email_label, office.email);
    println!("{}: {}", office.hours_label, office.hours);
}

fn print_help() {
    println!("Commands:");
    println!("  /help                 show this help");
    println!("  /lang [es|en]         switch language (toggles without argument)");
    println!("  /contact              office address, e-mail and hours");
    println!("  /appointment          request an appointment");
    println!("  /history              show this conversation");
    println!("  /quit                 leave");
    println!("Anything else is sent as a question.");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::intent::IntentMatcher;
    use crate::knowledge::ContentStore;

    fn state() -> (Arc<CommsState>, mpsc::Receiver<CommsEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let state = CommsState::new(IntentMatcher::builtin(), Config::test_default().chat, tx);
        (Arc::new(state), rx)
    }

    #[tokio::test]
    async fn cancel_ends_run_while_stdin_open() {
        let (state, _events) = state();
        // Sender held: stdin never reaches EOF.
        let (_line_tx, input) = mpsc::channel::<String>(4);
        let shutdown = CancellationToken::new();

        let run = tokio::spawn(run_pty("pty0".into(), state, input, shutdown.clone()));
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), run).await;
        assert!(matches!(result, Ok(Ok(Ok(())))), "run_pty did not stop on cancel");
    }

    #[tokio::test]
    async fn quit_reports_channel_shutdown() {
        let (state, mut events) = state();
        let (line_tx, input) = mpsc::channel::<String>(4);
        line_tx.send("/quit".into()).await.unwrap();

        run_pty("pty0".into(), state, input, CancellationToken::new()).await.unwrap();

        assert!(matches!(events.recv().await, Some(CommsEvent::SessionStarted { .. })));
        match events.recv().await {
            Some(CommsEvent::ChannelShutdown { channel_id }) => assert_eq!(channel_id, "pty0"),
            other => panic!("expected ChannelShutdown, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_stdin_ends_run() {
        let (state, _events) = state();
        let (line_tx, input) = mpsc::channel::<String>(4);
        line_tx.send("/contact".into()).await.unwrap();
        drop(line_tx);

        let run = run_pty("pty0".into(), state, input, CancellationToken::new());
        assert!(tokio::time::timeout(Duration::from_secs(1), run).await.is_ok());
    }

    #[test]
    fn rejection_lists_missing_field_labels() {
        let content = ContentStore::builtin().get(Locale::En);
        let err = appointment::submit(&AppointmentRequest::default(), content).unwrap_err();
        let shown = rejection(&err, content);
        assert!(shown.starts_with(content.form.missing_required));
        assert!(shown.ends_with("(Full Name, Phone Number)"), "{shown}");
    }

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(parse_command("  solar panels? "), Some(Command::Chat("solar panels?")));
    }

    #[test]
    fn blank_line_ignored() {
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn lang_with_and_without_argument() {
        assert_eq!(parse_command("/lang"), Some(Command::Lang(None)));
        assert_eq!(parse_command("/lang  en "), Some(Command::Lang(Some("en"))));
        assert_eq!(parse_command("/idioma es"), Some(Command::Lang(Some("es"))));
    }

    #[test]
    fn spanish_aliases() {
        assert_eq!(parse_command("/cita"), Some(Command::Appointment));
        assert_eq!(parse_command("/salir"), Some(Command::Quit));
        assert_eq!(parse_command("/contacto"), Some(Command::Contact));
    }

    #[test]
    fn unknown_command_named() {
        assert_eq!(parse_command("/frobnicate now"), Some(Command::Unknown("frobnicate")));
    }

    #[test]
    fn toggle_flips_locale() {
        assert_eq!(toggle(Locale::Es), Locale::En);
        assert_eq!(toggle(toggle(Locale::Es)), Locale::Es);
    }
}
