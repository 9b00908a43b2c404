//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};
use voice_chat_relay::voice::{
    RecognitionConfig, RecognitionEvent, RecognitionHandle, RecognitionService, RecognitionSink,
    SynthesisService, Utterance, UtteranceOutcome, Voice,
};
use voice_chat_relay::{Error, Locale, ReplyProvider, Result};

/// What the fake recognizer has been asked to do
#[derive(Debug, Default)]
pub struct RecognitionLog {
    pub created: usize,
    pub configs: Vec<RecognitionConfig>,
    pub starts: usize,
    pub stops: usize,
    pub running: bool,
    /// Host keeps the recognizer busy after `stop()`
    pub sticky: bool,
    sink: Option<RecognitionSink>,
}

/// Recognition capability that records calls and lets tests fire callbacks
#[derive(Clone, Default)]
pub struct FakeRecognition {
    log: Arc<Mutex<RecognitionLog>>,
}

impl FakeRecognition {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A recognizer that never releases on `stop()`, so restarts fail
    #[must_use]
    pub fn sticky() -> Arc<Self> {
        let fake = Self::default();
        fake.log.lock().unwrap().sticky = true;
        Arc::new(fake)
    }

    /// Inspect the call log
    pub fn with_log<R>(&self, f: impl FnOnce(&RecognitionLog) -> R) -> R {
        f(&self.log.lock().unwrap())
    }

    /// Deliver a callback for the current run
    pub fn fire(&self, event: RecognitionEvent) {
        let log = self.log.lock().unwrap();
        let sink = log.sink.as_ref().expect("recognizer never started");
        sink.send(event).expect("session dropped the run");
    }

    /// Sink of the current run, kept to fire late callbacks after a restart
    pub fn current_sink(&self) -> RecognitionSink {
        self.log.lock().unwrap().sink.clone().expect("recognizer never started")
    }

    /// The last lang the handle was configured with
    pub fn last_lang(&self) -> Option<&'static str> {
        self.with_log(|log| log.configs.last().map(|c| c.lang))
    }
}

impl RecognitionService for FakeRecognition {
    fn create(&self) -> Result<Box<dyn RecognitionHandle>> {
        self.log.lock().unwrap().created += 1;
        Ok(Box::new(FakeHandle {
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeHandle {
    log: Arc<Mutex<RecognitionLog>>,
}

impl RecognitionHandle for FakeHandle {
    fn configure(&mut self, config: &RecognitionConfig) {
        self.log.lock().unwrap().configs.push(config.clone());
    }

    fn start(&mut self, events: RecognitionSink) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.running {
            return Err(Error::Recognition("recognition has already started".into()));
        }
        log.running = true;
        log.starts += 1;
        log.sink = Some(events);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        if log.running && !log.sticky {
            log.running = false;
            // Stopping a real recognizer ends the run asynchronously
            if let Some(sink) = &log.sink {
                let _ = sink.send(RecognitionEvent::End);
            }
        }
        Ok(())
    }
}

/// Recognition capability on a host that does not actually support it
pub struct UnsupportedRecognition;

impl RecognitionService for UnsupportedRecognition {
    fn is_supported(&self) -> bool {
        false
    }

    fn create(&self) -> Result<Box<dyn RecognitionHandle>> {
        Err(Error::Recognition("not supported".into()))
    }
}

/// Synthesis capability that records calls and holds utterances until told
pub struct FakeSynthesis {
    voices: Mutex<Vec<Voice>>,
    voices_changed: broadcast::Sender<()>,
    pub calls: Mutex<Vec<&'static str>>,
    pub spoken: Mutex<Vec<Utterance>>,
    playing: Mutex<Vec<oneshot::Sender<UtteranceOutcome>>>,
}

impl FakeSynthesis {
    #[must_use]
    pub fn new(voices: Vec<Voice>) -> Arc<Self> {
        let (voices_changed, _) = broadcast::channel(4);
        Arc::new(Self {
            voices: Mutex::new(voices),
            voices_changed,
            calls: Mutex::new(Vec::new()),
            spoken: Mutex::new(Vec::new()),
            playing: Mutex::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn with_default_voices() -> Arc<Self> {
        Self::new(vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Piya", "bn-IN"),
        ])
    }

    /// Replace the catalog and fire the change notification
    pub fn load_voices(&self, voices: Vec<Voice>) {
        *self.voices.lock().unwrap() = voices;
        let _ = self.voices_changed.send(());
    }

    pub fn spoken_count(&self) -> usize {
        self.spoken.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Finish the utterance currently playing
    pub fn finish(&self) {
        if let Some(done) = self.playing.lock().unwrap().pop() {
            let _ = done.send(UtteranceOutcome::Ended);
        }
    }

    /// Fail the utterance currently playing
    pub fn fail(&self, reason: &str) {
        if let Some(done) = self.playing.lock().unwrap().pop() {
            let _ = done.send(UtteranceOutcome::Failed(reason.to_string()));
        }
    }
}

impl SynthesisService for FakeSynthesis {
    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()> {
        self.voices_changed.subscribe()
    }

    fn resume(&self) -> Result<()> {
        self.calls.lock().unwrap().push("resume");
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        self.calls.lock().unwrap().push("cancel");
        for done in self.playing.lock().unwrap().drain(..) {
            let _ = done.send(UtteranceOutcome::Interrupted);
        }
        Ok(())
    }

    fn speak(&self, utterance: Utterance) -> Result<oneshot::Receiver<UtteranceOutcome>> {
        self.calls.lock().unwrap().push("speak");
        let (tx, rx) = oneshot::channel();
        self.spoken.lock().unwrap().push(utterance);
        self.playing.lock().unwrap().push(tx);
        Ok(rx)
    }
}

/// Reply provider that counts calls and answers from a script
pub struct ScriptedProvider {
    reply: Result<String>,
    pub calls: Mutex<Vec<(String, Locale)>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(Error::Upstream("upstream unavailable".into())),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReplyProvider for ScriptedProvider {
    async fn reply(&self, message: &str, locale: Locale) -> Result<String> {
        self.calls.lock().unwrap().push((message.to_string(), locale));
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(Error::Upstream(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Yield to the runtime until `done` holds
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
