use std::future::Future;

use anyhow::Result;

/// Event names for one instrumented step.
#[derive(Debug, Clone, Copy)]
pub struct EventTriple {
    pub attempt: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
}

pub const SUBMIT_REQUEST: EventTriple = EventTriple {
    attempt: "SUBMIT_REQUEST_ATTEMPT",
    success: "SUBMIT_REQUEST_SUCCESS",
    failure: "SUBMIT_REQUEST_FAIL",
};

/// In-process event sink. Transporting events anywhere is out of scope; the
/// log doubles as the record the submission flow is verified against.
#[derive(Debug, Default)]
pub struct EventLog {
    verbose: bool,
    events: Vec<&'static str>,
}

impl EventLog {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, name: &'static str) {
        if self.verbose {
            eprintln!("[event] {name}");
        }
        self.events.push(name);
    }

    pub fn names(&self) -> &[&'static str] {
        &self.events
    }
}

/// Runs one step between an attempt event and a success/failure event. The
/// error passes through untouched.
pub async fn with_analytics<T, F>(log: &mut EventLog, events: EventTriple, step: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    log.record(events.attempt);
    match step.await {
        Ok(value) => {
            log.record(events.success);
            Ok(value)
        }
        Err(err) => {
            log.record(events.failure);
            Err(err)
        }
    }
}
