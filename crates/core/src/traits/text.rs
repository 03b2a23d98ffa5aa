//! Text refinement trait

use async_trait::async_trait;

use crate::{RefinedResult, Result};

/// Turns raw sign labels ("ME GO STORE") into natural text
#[async_trait]
pub trait TextRefiner: Send + Sync + 'static {
    async fn refine(&self, text: &str) -> Result<RefinedResult>;

    fn name(&self) -> &str;
}
