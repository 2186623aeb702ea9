//! System speech synthesizer driven as a child process
//!
//! Wraps an installed `espeak-ng`. Utterances are played one at a time by a
//! background task in submission order. Cancellation bumps a generation
//! counter: queued utterances from an older generation are skipped and the
//! process currently speaking is killed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::process::Command;
use tokio::sync::{Notify, mpsc, watch};

use super::{SpeechPlatform, Utterance, Voice};
use crate::{Error, Result};

/// Synthesizer looked up on `PATH` when none is configured
pub const DEFAULT_COMMAND: &str = "espeak-ng";

/// Words per minute at rate 1.0 (espeak-ng default)
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

struct Queued {
    generation: u64,
    utterance: Utterance,
}

/// Utterances submitted but not yet played or skipped
#[derive(Default)]
struct Backlog {
    count: AtomicUsize,
    idle: Notify,
}

impl Backlog {
    fn push(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn pop(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Speech platform backed by a command-line synthesizer
pub struct CommandPlatform {
    program: PathBuf,
    queue: mpsc::UnboundedSender<Queued>,
    generation: Arc<AtomicU64>,
    cancel: watch::Sender<u64>,
    backlog: Arc<Backlog>,
    voices: Vec<Voice>,
}

impl CommandPlatform {
    /// Locate `program` on `PATH` and start the playback task
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] if the program cannot be found
    pub fn find(program: &str) -> Result<Self> {
        let program = which::which(program)
            .map_err(|e| Error::CapabilityMissing(format!("speech synthesizer {program}: {e}")))?;

        let voices = list_voices(&program);
        let generation = Arc::new(AtomicU64::new(0));
        let backlog = Arc::new(Backlog::default());
        let (queue, rx) = mpsc::unbounded_channel();
        let (cancel, cancel_rx) = watch::channel(0);

        tokio::spawn(play_queue(
            program.clone(),
            rx,
            cancel_rx,
            Arc::clone(&generation),
            Arc::clone(&backlog),
        ));

        tracing::info!(
            program = %program.display(),
            voices = voices.len(),
            "speech synthesizer ready"
        );

        Ok(Self {
            program,
            queue,
            generation,
            cancel,
            backlog,
            voices,
        })
    }

    /// Path of the synthesizer binary
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Wait until every submitted utterance has been played or skipped
    pub async fn drain(&self) {
        loop {
            let idle = self.backlog.idle.notified();
            if self.backlog.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }
}

impl SpeechPlatform for CommandPlatform {
    fn cancel_all(&self) {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel.send_replace(next);
    }

    fn enqueue(&self, utterance: Utterance) {
        let generation = self.generation.load(Ordering::SeqCst);
        self.backlog.push();
        if self.queue.send(Queued { generation, utterance }).is_err() {
            self.backlog.pop();
            tracing::warn!("speech playback task has stopped, dropping utterance");
        }
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Play queued utterances until the platform is dropped
async fn play_queue(
    program: PathBuf,
    mut rx: mpsc::UnboundedReceiver<Queued>,
    mut cancel_rx: watch::Receiver<u64>,
    generation: Arc<AtomicU64>,
    backlog: Arc<Backlog>,
) {
    while let Some(item) = rx.recv().await {
        play_one(&program, &item, &mut cancel_rx, &generation).await;
        backlog.pop();
    }

    tracing::debug!("speech playback task finished");
}

async fn play_one(
    program: &Path,
    item: &Queued,
    cancel_rx: &mut watch::Receiver<u64>,
    generation: &AtomicU64,
) {
    cancel_rx.mark_unchanged();

    if item.generation != generation.load(Ordering::SeqCst) {
        tracing::trace!(text = %item.utterance.text, "skipping cancelled utterance");
        return;
    }

    let mut child = match speak_command(program, &item.utterance).spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(error = %e, "failed to start speech synthesizer");
            return;
        }
    };

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) if !status.success() => {
                tracing::warn!(%status, "speech synthesizer exited with failure");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed waiting for speech synthesizer"),
        },
        _ = cancel_rx.changed() => {
            tracing::debug!("speech cancelled");
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "synthesizer already exited");
            }
        }
    }
}

fn speak_command(program: &Path, utterance: &Utterance) -> Command {
    let voice = utterance.voice.as_ref().map_or_else(
        || primary_subtag(&utterance.lang),
        |v| v.lang.clone(),
    );

    let mut cmd = Command::new(program);
    cmd.arg("-v")
        .arg(voice)
        .arg("-s")
        .arg(words_per_minute(utterance.rate).to_string())
        .arg("--")
        .arg(&utterance.text)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    cmd
}

/// `ta-IN` → `ta`
fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .to_lowercase()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn words_per_minute(rate: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * rate.max(0.1)).round() as u32
}

/// Ask the synthesizer for its voices, empty on any failure
fn list_voices(program: &Path) -> Vec<Voice> {
    match std::process::Command::new(program).arg("--voices").output() {
        Ok(output) if output.status.success() => {
            parse_voice_listing(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            tracing::warn!(status = %output.status, "voice listing failed");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to list voices");
            Vec::new()
        }
    }
}

/// Parse `espeak-ng --voices` output
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  ta              --/M      Tamil              dra/ta
/// ```
#[must_use]
pub fn parse_voice_listing(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let lang = cols.next()?;
            let _age_gender = cols.next()?;
            let name = cols.next()?;
            Some(Voice::new(name, lang))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  ta              --/M      Tamil              dra/ta
";

    #[test]
    fn test_parse_voice_listing() {
        let voices = parse_voice_listing(LISTING);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1], Voice::new("English_(America)", "en-us"));
        assert_eq!(voices[2], Voice::new("Tamil", "ta"));
    }

    #[test]
    fn test_parse_voice_listing_garbage() {
        assert!(parse_voice_listing("").is_empty());
        assert!(parse_voice_listing("no header here\n 5 ta --/M Tamil").is_empty());
    }

    #[test]
    fn test_words_per_minute() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(words_per_minute(1.4), 245);
        assert_eq!(words_per_minute(1.25), 219);
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("ta-IN"), "ta");
        assert_eq!(primary_subtag("en_US"), "en");
        assert_eq!(primary_subtag("ta"), "ta");
    }

    #[test]
    fn test_missing_program_is_capability_missing() {
        let err = CommandPlatform::find("definitely-not-a-speech-synth-xyz")
            .err()
            .unwrap();
        assert!(matches!(err, Error::CapabilityMissing(_)));
    }
}
