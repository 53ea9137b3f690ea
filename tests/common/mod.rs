#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;
use yt_summarize::core::{GenerateRequest, ModelGateway};
use yt_summarize::GatewayError;

/// Gateway that replays scripted outcomes and records every call.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<(Instant, GenerateRequest)>>,
}

impl ScriptedGateway {
    /// Answers every call with `text`.
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Fails `failures` times, then answers with `text`.
    pub fn failing_then(failures: usize, text: &str) -> Self {
        let script = (1..=failures)
            .map(|n| Err(GatewayError::Other(format!("failure {}", n))))
            .collect();
        Self {
            script: Mutex::new(script),
            fallback: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Fails every call with a numbered error.
    pub fn always_failing() -> Self {
        Self::default()
    }

    pub fn scripted(outcomes: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), request.clone()));
            calls.len()
        };

        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => Err(GatewayError::Other(format!("failure {}", call_number))),
        }
    }
}
