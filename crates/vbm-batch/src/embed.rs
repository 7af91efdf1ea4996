//! Seam for attaching text embeddings to finished records.

use tracing::info;
use vbm_core::{ErrorInfo, PanelError};

use crate::record::CompiledRecord;

/// Texts sent per embedder call unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// External text embedding service.
pub trait Embedder {
    /// Returns one vector per input text, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PanelError>;
}

/// Embeds every record description in batches of `batch_size` and stores the
/// vectors on the records. Returns the number of embedded records.
pub fn attach_embeddings<E: Embedder + ?Sized>(
    records: &mut [CompiledRecord],
    embedder: &E,
    batch_size: usize,
) -> Result<usize, PanelError> {
    let batch_size = batch_size.max(1);
    let mut embedded = 0;
    for chunk in records.chunks_mut(batch_size) {
        let texts: Vec<String> = chunk
            .iter()
            .map(|record| record.description.clone())
            .collect();
        let vectors = embedder.embed(&texts)?;
        if vectors.len() != texts.len() {
            return Err(PanelError::Io(
                ErrorInfo::new(
                    "embedding-count",
                    format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
                )
                .with_context("offset", embedded.to_string()),
            ));
        }
        for (record, vector) in chunk.iter_mut().zip(vectors) {
            record.embedding = Some(vector.into_iter().map(Some).collect());
        }
        embedded += texts.len();
    }
    info!(embedded, batch_size, "attached embeddings");
    Ok(embedded)
}
