use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{ControlId, ControlValue, UnitStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSignal {
    ControlValueChanged,
    ControlParametersChanged,
    OutputFormatsChanged,
    StatusChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitEvent {
    ControlValueChanged { id: ControlId, value: ControlValue },
    /// Enabled state, hints or entries of a control changed.
    ControlParametersChanged { id: ControlId },
    OutputFormatsChanged,
    StatusChanged { old: UnitStatus },
}

impl UnitEvent {
    pub fn signal(&self) -> UnitSignal {
        match self {
            UnitEvent::ControlValueChanged { .. } => UnitSignal::ControlValueChanged,
            UnitEvent::ControlParametersChanged { .. } => UnitSignal::ControlParametersChanged,
            UnitEvent::OutputFormatsChanged => UnitSignal::OutputFormatsChanged,
            UnitEvent::StatusChanged { .. } => UnitSignal::StatusChanged,
        }
    }
}

type Handler = Rc<dyn Fn(&UnitEvent)>;

/// Change notifications of a unit.
///
/// Handlers run on the thread that emits, in connection order. Emission works
/// on a snapshot of the handler list, so a handler may connect or disconnect
/// handlers (including itself) while it runs.
#[derive(Default)]
pub struct UnitSignals {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(HandlerId, UnitSignal, Handler)>>,
}

impl UnitSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect<F>(&self, signal: UnitSignal, handler: F) -> HandlerId
    where
        F: Fn(&UnitEvent) + 'static,
    {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.handlers
            .borrow_mut()
            .push((id, signal, Rc::new(handler)));
        id
    }

    /// Returns false if the handler was not (or no longer) connected.
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _, _)| *handler_id != id);
        handlers.len() != before
    }

    pub fn emit(&self, event: &UnitEvent) {
        let signal = event.signal();
        let matching: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(_, s, _)| *s == signal)
            .map(|(_, _, h)| h.clone())
            .collect();

        for handler in matching {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}
