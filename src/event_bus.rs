use crate::events::*;
use crate::logging::Logger;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

pub(crate) struct EventHandlers {
    pub(crate) target_registered_handlers: Vec<HandlerPtr<TargetRegisteredEvent>>,
    pub(crate) vote_cast_handlers: Vec<HandlerPtr<VoteCastEvent>>,
    pub(crate) target_purged_handlers: Vec<HandlerPtr<TargetPurgedEvent>>,
    pub(crate) stale_entries_removed_handlers: Vec<HandlerPtr<StaleEntriesRemovedEvent>>,
}

impl EventHandlers {
    pub(crate) fn new(
        log_events: bool,
        on_target_registered: Option<HandlerPtr<TargetRegisteredEvent>>,
        on_vote_cast: Option<HandlerPtr<VoteCastEvent>>,
        on_target_purged: Option<HandlerPtr<TargetPurgedEvent>>,
        on_stale_entries_removed: Option<HandlerPtr<StaleEntriesRemovedEvent>>,
    ) -> EventHandlers {
        let mut handlers = EventHandlers {
            target_registered_handlers: Vec::new(),
            vote_cast_handlers: Vec::new(),
            target_purged_handlers: Vec::new(),
            stale_entries_removed_handlers: Vec::new(),
        };

        if log_events {
            handlers
                .target_registered_handlers
                .push(TargetRegisteredEvent::get_logger());
            handlers.vote_cast_handlers.push(VoteCastEvent::get_logger());
            handlers
                .target_purged_handlers
                .push(TargetPurgedEvent::get_logger());
            handlers
                .stale_entries_removed_handlers
                .push(StaleEntriesRemovedEvent::get_logger());
        }

        if let Some(handler) = on_target_registered {
            handlers.target_registered_handlers.push(handler);
        }
        if let Some(handler) = on_vote_cast {
            handlers.vote_cast_handlers.push(handler);
        }
        if let Some(handler) = on_target_purged {
            handlers.target_purged_handlers.push(handler);
        }
        if let Some(handler) = on_stale_entries_removed {
            handlers.stale_entries_removed_handlers.push(handler);
        }

        handlers
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.target_registered_handlers.is_empty()
            && self.vote_cast_handlers.is_empty()
            && self.target_purged_handlers.is_empty()
            && self.stale_entries_removed_handlers.is_empty()
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::TargetRegistered(target_registered_event) => self
                .target_registered_handlers
                .iter()
                .for_each(|handler| handler(&target_registered_event)),

            Event::VoteCast(vote_cast_event) => self
                .vote_cast_handlers
                .iter()
                .for_each(|handler| handler(&vote_cast_event)),

            Event::TargetPurged(target_purged_event) => self
                .target_purged_handlers
                .iter()
                .for_each(|handler| handler(&target_purged_event)),

            Event::StaleEntriesRemoved(stale_entries_removed_event) => self
                .stale_entries_removed_handlers
                .iter()
                .for_each(|handler| handler(&stale_entries_removed_event)),
        }
    }
}

pub(crate) fn start_event_bus(
    event_handlers: EventHandlers,
    event_subscriber: Receiver<Event>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => return,
        }

        match event_subscriber.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => event_handlers.fire_handlers(event),
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => return,
        }
    })
}
