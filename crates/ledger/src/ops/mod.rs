use crate::{LedgerError, LedgerStore, MemoryStore, ResultLedger, Snapshot, Threshold};

mod balances;
mod expenses;
mod groups;
mod insights;
mod settlements;

/// Entry point of every ledger query and command.
///
/// Holds no balances: each call reads (or writes) one snapshot through the
/// store and recomputes what it needs from the records.
#[derive(Debug)]
pub struct Engine<S: LedgerStore = MemoryStore> {
    store: S,
    threshold: Threshold,
}

impl<S: LedgerStore> Engine<S> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder::default()
    }

    /// Significance threshold applied to reported balances.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a read-only block against one consistent snapshot.
    fn with_snapshot<T>(
        &self,
        f: impl FnOnce(&Self, &Snapshot) -> ResultLedger<T>,
    ) -> ResultLedger<T> {
        self.store.read(|snapshot| f(self, snapshot))
    }

    /// Run a block inside a store write, committing on success and discarding
    /// the changes on error.
    fn with_tx<T>(&self, f: impl FnOnce(&Self, &mut Snapshot) -> ResultLedger<T>) -> ResultLedger<T> {
        self.store
            .write(|snapshot| f(self, snapshot))
            .inspect_err(log_rejection)
    }
}

fn log_rejection(err: &LedgerError) {
    match err {
        LedgerError::Authorization(reason) => {
            tracing::warn!("write refused, not authorized: {reason}");
        }
        LedgerError::Consistency(reason) => {
            tracing::warn!("write refused, inconsistent state: {reason}");
        }
        LedgerError::Validation(_) | LedgerError::NotFound(_) => {}
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Debug)]
pub struct EngineBuilder<S: LedgerStore = MemoryStore> {
    store: Option<S>,
    threshold: Threshold,
}

impl<S: LedgerStore> Default for EngineBuilder<S> {
    fn default() -> Self {
        Self {
            store: None,
            threshold: Threshold::DEFAULT,
        }
    }
}

impl<S: LedgerStore> EngineBuilder<S> {
    /// Pass the required record store
    pub fn store(mut self, store: S) -> EngineBuilder<S> {
        self.store = Some(store);
        self
    }

    /// Override the default significance threshold
    pub fn threshold(mut self, threshold: Threshold) -> EngineBuilder<S> {
        self.threshold = threshold;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultLedger<Engine<S>> {
        let store = self.store.ok_or_else(|| {
            LedgerError::Validation("a record store is required to build the engine".to_string())
        })?;
        Ok(Engine {
            store,
            threshold: self.threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoneyCents;

    #[test]
    fn builder_requires_a_store() {
        let result = Engine::<MemoryStore>::builder().build();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn builder_keeps_threshold() {
        let threshold = Threshold::new(MoneyCents::new(25)).unwrap();
        let engine = Engine::builder()
            .store(MemoryStore::default())
            .threshold(threshold)
            .build()
            .unwrap();
        assert_eq!(engine.threshold(), threshold);
    }

    #[test]
    fn normalizes_text() {
        assert_eq!(normalize_required_text("  Trip ", "name").unwrap(), "Trip");
        assert!(normalize_required_text("   ", "name").is_err());
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
    }
}
