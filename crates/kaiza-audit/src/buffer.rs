// buffer.rs — the pre-session buffer.
//
// A bounded FIFO with a single consumer: `initialize`. Its only job is to
// not lose events that arrive before the ledger path is known; it must
// never grow into a general-purpose buffering layer.

use kaiza_errors::KaizaError;

use crate::entry::AuditEntry;
use crate::log::AuditLog;

const MAX_BUFFERED: usize = 256;

#[derive(Debug, Default)]
pub struct PreSessionBuffer {
    events: Vec<AuditEntry>,
}

impl PreSessionBuffer {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Queue an event. Marks it `buffered=true` regardless of the caller's
    /// setting, since anything reaching this queue was necessarily observed
    /// before the ledger path existed.
    pub fn push(&mut self, entry: AuditEntry) -> Result<(), KaizaError> {
        if self.events.len() >= MAX_BUFFERED {
            return Err(KaizaError::InternalError(
                "pre-session buffer exhausted before initialize".to_string(),
            ));
        }
        self.events.push(entry.buffered());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Flush every buffered event to `log`, in arrival order, as part of
    /// the session's opening entries. Consumes the buffer.
    pub fn flush(self, log: &AuditLog) -> Result<Vec<AuditEntry>, KaizaError> {
        let mut written = Vec::with_capacity(self.events.len());
        for entry in self.events {
            written.push(log.append(entry)?);
        }
        Ok(written)
    }
}
