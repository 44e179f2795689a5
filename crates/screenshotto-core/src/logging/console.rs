//! Console output that waits for `--debug`
//!
//! Logging starts before the command line is parsed, so the console does not
//! yet know its threshold. Until [`ConsoleLayer::set_debug`] is called every
//! event is held in memory; then the buffer is replayed at the chosen
//! threshold and later events go straight through.

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

use super::format::Record;

enum Mode {
    Buffering(Vec<Record>),
    PassThrough(Level),
}

struct ConsoleState {
    mode: Mode,
    sink: Box<dyn Write + Send>,
}

impl ConsoleState {
    fn emit(&mut self, record: &Record) {
        let _ = self.sink.write_all(record.console_line().as_bytes());
        let _ = self.sink.flush();
    }
}

/// Buffered console layer; clones share the same buffer
#[derive(Clone)]
pub struct ConsoleLayer {
    state: Arc<Mutex<ConsoleState>>,
}

impl ConsoleLayer {
    /// Console layer writing to stderr
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Console layer writing to `sink`
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConsoleState {
                mode: Mode::Buffering(Vec::new()),
                sink,
            })),
        }
    }

    /// Flushes the buffer at `DEBUG` (`debug`) or `INFO` and passes later
    /// events through at that threshold. May be called again to change the
    /// threshold.
    pub fn set_debug(&self, debug: bool) {
        let threshold = if debug { Level::DEBUG } else { Level::INFO };
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let previous = std::mem::replace(&mut state.mode, Mode::PassThrough(threshold));
        if let Mode::Buffering(buffer) = previous {
            for record in buffer.iter().filter(|r| r.level <= threshold) {
                state.emit(record);
            }
        }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match &mut state.mode {
            Mode::Buffering(buffer) => buffer.push(Record::from_event(event)),
            Mode::PassThrough(threshold) => {
                if *event.metadata().level() <= *threshold {
                    let record = Record::from_event(event);
                    state.emit(&record);
                }
            }
        }
    }
}
