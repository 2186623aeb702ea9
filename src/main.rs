use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use sankara_connect::recognition::UNSUPPORTED_NOTICE;
use sankara_connect::render::render_message;
use sankara_connect::speech::select_voice;
use sankara_connect::{
    ChatMessage, ChatService, ChatSession, CommandPlatform, Config, GeminiClient, Language, Role,
    SpeechDispatcher, SpeechRecognizer, VoiceInput, WhisperRecognizer,
};

/// SankaraConnect - bilingual assistant for Sankara College
#[derive(Parser)]
#[command(name = "sankara", version, about)]
struct Cli {
    /// Conversation language (en, ta)
    #[arg(short, long)]
    language: Option<Language>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable speech output
    #[arg(long)]
    no_speech: bool,

    /// Speak every reply as it arrives
    #[arg(long)]
    auto_speak: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive conversation (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// Question to ask
        question: String,
        /// Read the reply aloud
        #[arg(long)]
        speak: bool,
    },
    /// Speak text through the segment-aware dispatcher
    Speak {
        /// Text to speak
        #[arg(default_value = "Hello! வணக்கம்! This is a test of the speech system.")]
        text: String,
    },
    /// List synthesizer voices and the ones that would be chosen
    Voices,
    /// Transcribe a WAV recording
    Transcribe {
        /// Path to a WAV file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; stdout is reserved for the conversation
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,sankara_connect=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_with_options(cli.no_speech)?;
    if let Some(language) = cli.language {
        config.language = language;
    }
    if cli.auto_speak {
        config.speech.auto_speak = true;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat(config).await,
        Command::Ask { question, speak } => ask(config, &question, speak).await,
        Command::Speak { text } => speak(&config, &text).await,
        Command::Voices => voices(&config),
        Command::Transcribe { path } => transcribe(config, &path).await,
    }
}

/// Build the chat service from configuration
fn build_chat(config: &mut Config) -> anyhow::Result<Arc<dyn ChatService>> {
    let api_key = config
        .api_keys
        .gemini
        .take()
        .context("GEMINI_API_KEY is not set (or api_keys.gemini in config.toml)")?;

    let client = GeminiClient::new(
        api_key,
        config.llm.model.clone(),
        config.llm.base_url.clone(),
        config.llm.timeout,
        &config.assistant,
    )?;
    tracing::debug!(model = client.model(), "chat service ready");

    Ok(Arc::new(client))
}

/// Build the speech dispatcher; falls back to a silent one when no
/// synthesizer is available
fn build_speech(config: &Config) -> (SpeechDispatcher, Option<Arc<CommandPlatform>>) {
    if !config.speech.enabled {
        return (SpeechDispatcher::unavailable(), None);
    }

    match CommandPlatform::find(&config.speech.command) {
        Ok(platform) => {
            let platform = Arc::new(platform);
            (SpeechDispatcher::new(platform.clone()), Some(platform))
        }
        Err(e) => {
            tracing::warn!(error = %e, "speech output unavailable");
            (SpeechDispatcher::unavailable(), None)
        }
    }
}

/// Build the voice input recognizer, if an API key is configured
fn build_recognizer(config: &mut Config) -> Option<WhisperRecognizer> {
    let api_key = config.api_keys.openai.take()?;
    match WhisperRecognizer::new(api_key, config.recognition.model.clone()) {
        Ok(recognizer) => Some(recognizer),
        Err(e) => {
            tracing::warn!(error = %e, "voice input unavailable");
            None
        }
    }
}

/// One line of user input in the interactive loop
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    Help,
    Language(Language),
    Speak,
    Stop,
    Listen(PathBuf),
    Suggestion(usize),
    Text(String),
    Invalid(String),
}

/// Parse one line; `suggestions` is how many follow-ups the last reply offers
fn parse_input(line: &str, suggestions: usize) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    // A number only picks a suggestion that exists; otherwise it is a question
    if let Ok(n) = line.parse::<usize>()
        && (1..=suggestions).contains(&n)
    {
        return Input::Suggestion(n - 1);
    }

    let Some(command) = line.strip_prefix('/') else {
        return Input::Text(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    match name {
        "quit" | "exit" | "q" => Input::Quit,
        "help" | "?" => Input::Help,
        "speak" | "listen-reply" => Input::Speak,
        "stop" => Input::Stop,
        "lang" | "language" => arg
            .parse()
            .map_or_else(|e| Input::Invalid(format!("{e}")), Input::Language),
        "voice" | "mic" if !arg.is_empty() => Input::Listen(PathBuf::from(arg)),
        "voice" | "mic" => Input::Invalid("usage: /voice <recording.wav>".to_string()),
        other => Input::Invalid(format!("unknown command: /{other}")),
    }
}

const HELP: &str = "\
Type a question and press Enter.
  1-3              ask one of the suggested follow-ups
  /lang en|ta      switch language (restarts the conversation)
  /speak           read the last reply aloud
  /stop            stop speaking
  /voice <file>    ask by voice from a WAV recording
  /quit            leave";

fn prompt(language: Language) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\n{}\n› ", language.placeholder())?;
    stdout.flush()
}

/// Interactive conversation
async fn chat(mut config: Config) -> anyhow::Result<()> {
    let service = build_chat(&mut config)?;
    let recognizer = build_recognizer(&mut config);
    let (speech, _platform) = build_speech(&config);

    let mut session =
        ChatSession::new(service, speech, config.language).with_auto_speak(config.speech.auto_speak);
    let mut voice = VoiceInput::new(recognizer.is_some(), session.language());

    if let Some(greeting) = session.last_message() {
        println!("{}", render_message(greeting));
    }
    println!("\n(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(session.language())?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let suggestions = last_reply(&session).map_or(0, |m| m.suggestions().len());
        let text = match parse_input(&line, suggestions) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Invalid(reason) => {
                println!("{reason}");
                continue;
            }
            Input::Language(language) => {
                session.set_language(language);
                voice.set_language(language);
                if let Some(greeting) = session.last_message() {
                    println!("{}", render_message(greeting));
                }
                continue;
            }
            Input::Speak => {
                speak_last_reply(&mut session);
                continue;
            }
            Input::Stop => {
                session.stop_speaking();
                continue;
            }
            Input::Suggestion(index) => {
                let Some(id) = last_reply_id(&session) else {
                    continue;
                };
                match session.send_suggestion(&id, index).await {
                    Ok(Some(reply)) => println!("{}", render_message(reply)),
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
                continue;
            }
            Input::Listen(path) => {
                let Some(transcript) = listen(&mut voice, recognizer.as_ref(), &path).await else {
                    continue;
                };
                println!("you (voice) › {transcript}");
                transcript
            }
            Input::Text(text) => text,
        };

        if let Some(reply) = session.send(&text).await {
            println!("{}", render_message(reply));
        }
    }

    session.stop_speaking();
    Ok(())
}

fn last_reply(session: &ChatSession) -> Option<&ChatMessage> {
    session
        .messages()
        .iter()
        .rev()
        .find(|m| m.role() == Role::Model)
}

fn last_reply_id(session: &ChatSession) -> Option<String> {
    last_reply(session).map(|m| m.id().to_string())
}

fn speak_last_reply(session: &mut ChatSession) {
    if !session.speech().is_available() {
        println!("Speech output is not available.");
        return;
    }
    if let Some(id) = last_reply_id(session)
        && let Err(e) = session.speak(&id)
    {
        tracing::warn!(error = %e, "failed to speak reply");
    }
}

/// Run one voice input round; returns the transcript to send
async fn listen(
    voice: &mut VoiceInput,
    recognizer: Option<&WhisperRecognizer>,
    path: &Path,
) -> Option<String> {
    match voice.toggle() {
        Ok(true) => {}
        Ok(false) => return None,
        Err(_) => {
            println!("{UNSUPPORTED_NOTICE}");
            return None;
        }
    }

    let Some(recognizer) = recognizer else {
        voice.stop();
        return None;
    };
    let audio = match tokio::fs::read(path).await {
        Ok(audio) => audio,
        Err(e) => {
            println!("could not read {}: {e}", path.display());
            voice.stop();
            return None;
        }
    };

    println!("(listening in {}...)", voice.locale());
    let event = recognizer.recognize(audio, voice.language()).await;
    let transcript = voice.handle(event);
    if transcript.is_none() {
        println!("Didn't catch that. Try again?");
    }
    transcript
}

/// Ask one question and print the reply
async fn ask(mut config: Config, question: &str, speak: bool) -> anyhow::Result<()> {
    let service = build_chat(&mut config)?;
    let (speech, platform) = build_speech(&config);
    let mut session = ChatSession::new(service, speech, config.language);

    let Some(reply) = session.send(question).await else {
        anyhow::bail!("question is empty");
    };
    println!("{}", render_message(reply));

    if speak {
        let id = reply.id().to_string();
        session.speak(&id)?;
        if let Some(platform) = platform {
            platform.drain().await;
        }
    }

    Ok(())
}

/// Speak text and wait for playback to finish
async fn speak(config: &Config, text: &str) -> anyhow::Result<()> {
    let (mut speech, platform) = build_speech(config);
    let Some(platform) = platform else {
        anyhow::bail!(
            "no speech synthesizer available (install {} or set SANKARA_SPEECH_COMMAND)",
            config.speech.command
        );
    };

    println!("Speaking: \"{text}\"");
    speech.speak_text(text);
    platform.drain().await;

    Ok(())
}

/// Print the synthesizer's voices and the per-language choice
fn voices(config: &Config) -> anyhow::Result<()> {
    let (speech, platform) = build_speech(config);
    let Some(platform) = platform else {
        anyhow::bail!("no speech synthesizer available");
    };

    println!("Synthesizer: {}", platform.program().display());
    for voice in speech.voices() {
        println!("  {:<12} {}", voice.lang, voice.name);
    }

    for language in [Language::English, Language::Tamil] {
        let chosen = select_voice(language, speech.voices())
            .map_or_else(|| "(platform default)".to_string(), |v| v.name.clone());
        println!("{language} ({}): {chosen}", language.locale_tag());
    }

    Ok(())
}

/// Transcribe a recording
async fn transcribe(mut config: Config, path: &Path) -> anyhow::Result<()> {
    let recognizer = build_recognizer(&mut config)
        .context("OPENAI_API_KEY is not set (or api_keys.openai in config.toml)")?;

    let audio = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut voice = VoiceInput::new(true, config.language);
    voice.toggle()?;
    let event = recognizer.recognize(audio, config.language).await;
    tracing::debug!(?event, "recognition finished");

    match voice.handle(event) {
        Some(transcript) => println!("{transcript}"),
        None => anyhow::bail!("no speech recognized"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_text_and_suggestions() {
        assert_eq!(parse_input("   ", 3), Input::Empty);
        assert_eq!(parse_input("2", 3), Input::Suggestion(1));
        assert_eq!(parse_input("4", 3), Input::Text("4".to_string()));
        assert_eq!(
            parse_input(" What are the fees? ", 3),
            Input::Text("What are the fees?".to_string())
        );
    }

    #[test]
    fn test_parse_input_number_without_suggestion_is_text() {
        assert_eq!(parse_input("1", 0), Input::Text("1".to_string()));
        assert_eq!(parse_input("2", 1), Input::Text("2".to_string()));
        assert_eq!(parse_input("1", 1), Input::Suggestion(0));
        assert_eq!(parse_input("0", 3), Input::Text("0".to_string()));
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(parse_input("/quit", 0), Input::Quit);
        assert_eq!(parse_input("/lang ta", 0), Input::Language(Language::Tamil));
        assert_eq!(parse_input("/speak", 0), Input::Speak);
        assert_eq!(
            parse_input("/voice q.wav", 0),
            Input::Listen(PathBuf::from("q.wav"))
        );
        assert!(matches!(parse_input("/voice", 0), Input::Invalid(_)));
        assert!(matches!(parse_input("/lang fr", 0), Input::Invalid(_)));
        assert!(matches!(parse_input("/dance", 0), Input::Invalid(_)));
    }
}
