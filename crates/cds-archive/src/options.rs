#[derive(Clone, Debug, Default)]
pub struct ExtractOptions {
    /// Upper bound on the sum of extracted file sizes.
    pub max_total_bytes: Option<u64>,
}

impl ExtractOptions {
    pub fn max_total_bytes(mut self, limit: u64) -> Self {
        self.max_total_bytes = Some(limit);
        self
    }

    /// Bytes still allowed after `written`, or `None` when unlimited.
    pub(crate) fn remaining(&self, written: u64) -> Option<u64> {
        self.max_total_bytes
            .map(|limit| limit.saturating_sub(written))
    }
}
