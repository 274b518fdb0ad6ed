//! Machine-readable event stream, one JSON object per line

use serde::Serialize;
use std::io::Write;

use super::{ExecutionListener, ExecutionResult};
use crate::tree::Descriptor;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Started {
        node: &'a Descriptor,
    },
    Finished {
        node: &'a Descriptor,
        result: &'a ExecutionResult,
    },
}

/// Writes every notification as a JSON line
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) {
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out));
        if let Err(e) = written {
            tracing::warn!("Failed to write report event: {}", e);
        }
    }
}

impl<W: Write> ExecutionListener for JsonReporter<W> {
    fn execution_started(&mut self, node: &Descriptor) {
        self.emit(&Event::Started { node });
    }

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
        self.emit(&Event::Finished { node, result });
    }
}
