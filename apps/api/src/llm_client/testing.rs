//! Scripted `TextGenerator` used by unit tests across the crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationError, TextGenerator};

type Script = dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync;

/// Fake provider. Clones share the call counter, so a test can keep one handle
/// while the chain owns another.
#[derive(Clone)]
pub struct FakeGenerator {
    name: String,
    script: Arc<Script>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FakeGenerator {
    pub fn scripted<F>(name: &str, script: F) -> Self
    where
        F: Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            script: Arc::new(script),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(name: &str, text: &str) -> Self {
        let text = text.to_string();
        Self::scripted(name, move |_| Ok(text.clone()))
    }

    pub fn failing(name: &str) -> Self {
        Self::scripted(name, |_| {
            Err(GenerationError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        })
    }

    /// Sleeps past the one-second fake timeout before answering.
    pub fn hanging(name: &str, delay: Duration) -> Self {
        let mut fake = Self::replying(name, "too late");
        fake.delay = Some(delay);
        fake
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(&self) -> Arc<dyn TextGenerator> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(prompt)
    }
}
