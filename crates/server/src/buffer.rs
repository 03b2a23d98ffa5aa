//! Accumulation buffer for detected sign labels

use parking_lot::Mutex;

/// Ordered labels collected between commits
#[derive(Debug, Default)]
pub struct AccumulationBuffer {
    labels: Mutex<Vec<String>>,
}

impl AccumulationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, label: impl Into<String>) {
        self.labels.lock().push(label.into());
    }

    /// Append a batch under a single lock acquisition
    pub fn extend<I>(&self, labels: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.labels.lock().extend(labels);
    }

    /// Take everything collected so far, leaving the buffer empty
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.labels.lock())
    }

    /// Discard all labels, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut labels = self.labels.lock();
        let dropped = labels.len();
        labels.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.labels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.labels.lock().clone()
    }
}
