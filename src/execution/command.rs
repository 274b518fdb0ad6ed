//! Decision engine backed by an external process
//!
//! The process is started once per scenario. It receives a
//! [`DecisionRequest`] as JSON on stdin and must print the resulting facts as
//! a JSON object on stdout, either flat (`{"Decision.approved": true}`) or
//! nested one level (`{"Decision": {"approved": true}}`).

use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use super::helper::{DecisionEngine, DecisionRequest, FactMap};

/// Runs `program args...` for every evaluation
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl DecisionEngine for CommandEngine {
    fn evaluate(&self, request: &DecisionRequest<'_>) -> Result<FactMap, String> {
        let input = serde_json::to_vec(request).map_err(|e| e.to_string())?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("Failed to start '{}': {}", self.program.display(), e))?;

        // Feed stdin while the output is drained, so neither pipe can fill up
        // and block the other. The child is always reaped.
        let stdin = child.stdin.take();
        let (sent, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(&input),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let sent = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("request writer panicked")));
            (sent, output)
        });

        let output = output
            .map_err(|e| format!("Failed to wait for '{}': {}", self.program.display(), e))?;

        if !output.status.success() {
            return Err(format!(
                "'{}' exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        match sent {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                return Err(format!("Failed to send request: {}", e));
            }
            Err(_) => tracing::debug!("'{}' did not read the whole request", self.program.display()),
            Ok(()) => {}
        }

        let value: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("Invalid engine output: {}", e))?;
        flatten(value)
    }
}

fn flatten(value: Value) -> Result<FactMap, String> {
    let Value::Object(map) = value else {
        return Err(format!("Engine output must be a JSON object, got {value}"));
    };

    let mut facts = FactMap::new();
    for (name, value) in map {
        match value {
            Value::Object(fields) if !name.contains('.') => {
                for (field, value) in fields {
                    facts.insert(format!("{name}.{field}"), value);
                }
            }
            value => {
                facts.insert(name, value);
            }
        }
    }
    Ok(facts)
}
