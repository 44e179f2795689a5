//! Drops an event that repeats the previous one

use std::sync::Mutex;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

use super::format::MessageVisitor;

/// Disables an event for every output when its target, level and message
/// match the event just before it.
#[derive(Default)]
pub struct DuplicateFilter {
    last: Mutex<Option<(String, Level, String)>>,
}

impl<S: Subscriber> Layer<S> for DuplicateFilter {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        let meta = event.metadata();
        let current = (
            meta.target().to_string(),
            *meta.level(),
            MessageVisitor::message_of(event),
        );
        let Ok(mut last) = self.last.lock() else {
            return true;
        };
        if last.as_ref() == Some(&current) {
            return false;
        }
        *last = Some(current);
        true
    }
}
