#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Value, json};
use veogen::core::request::PredictRequest;
use veogen::{Error, OperationClient, OperationStatus, PollPolicy, SubmitResponse};

/// Test double for the remote service.
///
/// Each submission hands out the next queued operation name; status queries
/// pop scripted responses for that operation and report "not done" once the
/// script runs dry.
#[derive(Default)]
pub struct ScriptedClient {
    names: RefCell<VecDeque<Option<String>>>,
    submit_errors: RefCell<VecDeque<Option<Error>>>,
    scripts: RefCell<HashMap<String, VecDeque<Result<Value, Error>>>>,
    pub prompts: RefCell<Vec<String>>,
    pub payloads: RefCell<Vec<Value>>,
    pub submits: Cell<usize>,
    pub fetches: Cell<usize>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an operation whose status queries return `responses` in order.
    pub fn operation(self, name: &str, responses: Vec<Value>) -> Self {
        self.names.borrow_mut().push_back(Some(name.to_string()));
        self.submit_errors.borrow_mut().push_back(None);
        self.scripts
            .borrow_mut()
            .insert(name.to_string(), responses.into_iter().map(Ok).collect());
        self
    }

    /// Queue an operation whose first status query fails at the transport level.
    pub fn failing_poll(self, name: &str, status: u16) -> Self {
        self.names.borrow_mut().push_back(Some(name.to_string()));
        self.submit_errors.borrow_mut().push_back(None);
        self.scripts.borrow_mut().insert(
            name.to_string(),
            VecDeque::from([Err(Error::Transport {
                status,
                body: "backend unavailable".into(),
            })]),
        );
        self
    }

    /// Queue a submission that is rejected by the service.
    pub fn rejected_submit(self, status: u16, body: &str) -> Self {
        self.names.borrow_mut().push_back(None);
        self.submit_errors.borrow_mut().push_back(Some(Error::Transport {
            status,
            body: body.to_string(),
        }));
        self
    }

    /// Queue a submission whose response has no operation name.
    pub fn nameless_submit(self) -> Self {
        self.names.borrow_mut().push_back(None);
        self.submit_errors.borrow_mut().push_back(None);
        self
    }
}

impl OperationClient for ScriptedClient {
    fn submit(&self, payload: &PredictRequest<'_>) -> veogen::Result<SubmitResponse> {
        self.submits.set(self.submits.get() + 1);
        self.prompts
            .borrow_mut()
            .push(payload.instances[0].prompt.to_string());
        self.payloads
            .borrow_mut()
            .push(serde_json::to_value(payload).expect("payload serializes"));
        if let Some(Some(err)) = self.submit_errors.borrow_mut().pop_front() {
            self.names.borrow_mut().pop_front();
            return Err(err);
        }
        let name = self.names.borrow_mut().pop_front().flatten();
        Ok(SubmitResponse { name })
    }

    fn fetch(&self, operation: &str) -> veogen::Result<OperationStatus> {
        self.fetches.set(self.fetches.get() + 1);
        let next = self
            .scripts
            .borrow_mut()
            .get_mut(operation)
            .and_then(|q| q.pop_front());
        match next {
            Some(Ok(body)) => Ok(serde_json::from_value(body).expect("valid status body")),
            Some(Err(e)) => Err(e),
            None => Ok(serde_json::from_value(pending()).expect("valid status body")),
        }
    }
}

pub fn pending() -> Value {
    json!({ "name": "op", "done": false })
}

pub fn done_with_video(uri: &str) -> Value {
    json!({
        "name": "op",
        "done": true,
        "response": { "videos": [ { "gcsUri": uri, "mimeType": "video/mp4" } ] }
    })
}

pub fn done_with_error(message: &str) -> Value {
    json!({ "name": "op", "done": true, "error": { "code": 3, "message": message } })
}

pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::ZERO,
        max_attempts,
    }
}

/// Write a small fake image and return its path as a string.
pub fn write_image(dir: &Path, name: &str) -> String {
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nfake-image-bytes").expect("write image");
    path.to_string_lossy().into_owned()
}
