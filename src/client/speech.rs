// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Read-aloud playback with an estimated progress indicator.
//!
//! Speech engines rarely report position, so progress is wall-clock time
//! since the utterance started, clamped to a duration estimated from the
//! word count.

use crate::models::Language;
use crate::reading_time::{word_count, LISTEN_WORDS_PER_MINUTE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// How often progress is republished while speaking.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Text-to-speech backend.
pub trait SpeechEngine: Send + Sync + 'static {
    /// Start speaking `text` in `locale` (BCP 47).
    ///
    /// The receiver resolves when the utterance ends, with `Err` if the engine
    /// failed. A dropped sender counts as ended.
    fn speak(&self, text: &str, locale: &str) -> oneshot::Receiver<Result<(), String>>;

    /// Stop any utterance in progress.
    fn cancel(&self);
}

/// Estimated time to speak `text`.
pub fn estimate_duration(text: &str) -> Duration {
    let words = word_count(text) as f64;
    Duration::from_secs_f64(words / LISTEN_WORDS_PER_MINUTE as f64 * 60.0)
}

/// Playback state published to views.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeechState {
    pub is_playing: bool,
    /// Estimated position, never past `duration`
    pub progress: Duration,
    /// Estimated length of the current (or last) utterance
    pub duration: Duration,
}

impl SpeechState {
    /// Progress as a fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.progress.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        }
    }
}

/// Speaks summary text and tracks estimated progress.
///
/// Dropping the player stops speech.
pub struct SpeechPlayer<E: SpeechEngine> {
    engine: Arc<E>,
    language: Language,
    state: Arc<watch::Sender<SpeechState>>,
    /// Current utterance; a poll task only publishes while it matches
    generation: Arc<AtomicU64>,
    poll: Mutex<Option<JoinHandle<()>>>,
}

impl<E: SpeechEngine> SpeechPlayer<E> {
    pub fn new(engine: E, language: Language) -> Self {
        let (state, _) = watch::channel(SpeechState::default());
        Self {
            engine: Arc::new(engine),
            language,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            poll: Mutex::new(None),
        }
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn subscribe(&self) -> watch::Receiver<SpeechState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SpeechState {
        *self.state.borrow()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().is_playing
    }

    /// Speak `text`, replacing anything currently playing.
    pub fn speak(&self, text: &str) {
        let utterance = self.halt();

        let duration = estimate_duration(text);
        self.state.send_replace(SpeechState {
            is_playing: true,
            progress: Duration::ZERO,
            duration,
        });

        tracing::debug!(
            locale = self.language.speech_locale(),
            estimated_secs = duration.as_secs_f64(),
            "Starting speech"
        );
        let mut finished = self.engine.speak(text, self.language.speech_locale());

        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let handle = tokio::spawn(async move {
            let current = || generation.load(Ordering::SeqCst) == utterance;
            let started = Instant::now();
            let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    result = &mut finished => {
                        if let Ok(Err(e)) = result {
                            tracing::warn!(error = %e, "Speech engine error");
                        }
                        // Checked under the channel lock so a newer speak always lands last
                        state.send_if_modified(|s| {
                            if !current() {
                                return false;
                            }
                            s.is_playing = false;
                            s.progress = Duration::ZERO;
                            true
                        });
                        break;
                    }
                    _ = ticker.tick() => {
                        let elapsed = started.elapsed().min(duration);
                        let published = state.send_if_modified(|s| {
                            if !current() {
                                return false;
                            }
                            s.progress = elapsed;
                            true
                        });
                        if !published {
                            break;
                        }
                    }
                }
            }
        });

        *self.poll.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stop speaking and reset progress.
    pub fn stop(&self) {
        self.halt();
        self.state.send_modify(|s| {
            s.is_playing = false;
            s.progress = Duration::ZERO;
        });
    }

    /// Stop if playing, otherwise speak `text`.
    pub fn toggle(&self, text: &str) {
        if self.is_playing() {
            self.stop();
        } else {
            self.speak(text);
        }
    }

    /// Retire the current utterance and return the next generation.
    fn halt(&self) -> u64 {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.engine.cancel();
        if let Some(handle) = self
            .poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        next
    }
}

impl<E: SpeechEngine> Drop for SpeechPlayer<E> {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct FakeEngine {
        cancels: AtomicUsize,
        locales: Mutex<Vec<String>>,
        finish: Mutex<Option<oneshot::Sender<Result<(), String>>>>,
    }

    impl FakeEngine {
        fn finish(&self) {
            if let Some(tx) = self.finish.lock().unwrap().take() {
                let _ = tx.send(Ok(()));
            }
        }
    }

    impl SpeechEngine for Arc<FakeEngine> {
        fn speak(&self, _text: &str, locale: &str) -> oneshot::Receiver<Result<(), String>> {
            let (tx, rx) = oneshot::channel();
            self.locales.lock().unwrap().push(locale.to_string());
            *self.finish.lock().unwrap() = Some(tx);
            rx
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn words(n: usize) -> String {
        vec!["शब्द"; n].join(" ")
    }

    #[test]
    fn test_estimate_duration_at_150_wpm() {
        assert_eq!(estimate_duration(&words(150)), Duration::from_secs(60));
        assert_eq!(estimate_duration(&words(75)), Duration::from_secs(30));
        assert_eq!(estimate_duration(""), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_tracks_elapsed_time_and_resets_on_end() {
        let engine = Arc::new(FakeEngine::default());
        let player = SpeechPlayer::new(engine.clone(), Language::Hi);
        let mut rx = player.subscribe();

        player.speak(&words(150));
        assert!(player.is_playing());
        assert_eq!(engine.locales.lock().unwrap().as_slice(), ["hi-IN"]);

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let state = player.state();
        assert!(state.progress >= Duration::from_millis(900));
        assert!(state.progress <= Duration::from_millis(1050));
        assert_eq!(state.duration, Duration::from_secs(60));

        engine.finish();
        let ended = *rx.wait_for(|s| !s.is_playing).await.unwrap();
        assert_eq!(ended.progress, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_clamped_to_estimate() {
        let engine = Arc::new(FakeEngine::default());
        let player = SpeechPlayer::new(engine.clone(), Language::En);

        player.speak("one two three");
        tokio::time::sleep(Duration::from_secs(5)).await;

        let state = player.state();
        assert!(state.is_playing);
        assert_eq!(state.progress, state.duration);
        assert!((state.duration.as_secs_f64() - 1.2).abs() < 1e-6);
        assert_eq!(state.fraction(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_engine_and_resets() {
        let engine = Arc::new(FakeEngine::default());
        let player = SpeechPlayer::new(engine.clone(), Language::En);

        player.toggle(&words(10));
        tokio::time::sleep(Duration::from_millis(300)).await;
        let cancels_before = engine.cancels.load(Ordering::SeqCst);

        player.toggle(&words(10));
        assert!(!player.is_playing());
        assert_eq!(player.state().progress, Duration::ZERO);
        assert_eq!(engine.cancels.load(Ordering::SeqCst), cancels_before + 1);

        // No further progress updates after stop.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(player.state().progress, Duration::ZERO);
    }

    /// Engine whose cancel resolves the pending utterance, as real engines do.
    #[derive(Default)]
    struct EagerEngine {
        pending: Mutex<Vec<oneshot::Sender<Result<(), String>>>>,
    }

    impl SpeechEngine for Arc<EagerEngine> {
        fn speak(&self, _text: &str, _locale: &str) -> oneshot::Receiver<Result<(), String>> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push(tx);
            rx
        }

        fn cancel(&self) {
            for tx in self.pending.lock().unwrap().drain(..) {
                let _ = tx.send(Err("interrupted".to_string()));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_replaced_utterance_cannot_end_the_new_one() {
        let engine = Arc::new(EagerEngine::default());
        let player = SpeechPlayer::new(engine.clone(), Language::En);

        for _ in 0..50 {
            player.speak(&words(300));
            // Let the poll task park on the engine before it is replaced.
            tokio::task::yield_now().await;
            player.speak(&words(300));
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert!(player.is_playing());
        }

        player.stop();
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_ignored() {
        let engine = Arc::new(FakeEngine::default());
        let player = SpeechPlayer::new(engine.clone(), Language::En);

        player.speak(&words(150));
        let first = player.generation.load(Ordering::SeqCst);
        player.speak(&words(150));
        assert_eq!(player.generation.load(Ordering::SeqCst), first + 1);

        tokio::time::sleep(Duration::from_millis(350)).await;
        let state = player.state();
        assert!(state.is_playing);
        assert!(state.progress >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_engine() {
        let engine = Arc::new(FakeEngine::default());
        let player = SpeechPlayer::new(engine.clone(), Language::En);
        player.speak(&words(10));
        let cancels_before = engine.cancels.load(Ordering::SeqCst);

        drop(player);
        assert_eq!(engine.cancels.load(Ordering::SeqCst), cancels_before + 1);
    }
}
