//! Asynchronous project loading.
//!
//! [`begin_project_load`] validates the document and clears the canvas
//! synchronously, then hands back a [`PendingLoad`] with one ticket per layer.
//! Decoding runs on Tokio's blocking pool and results may complete in any
//! order. Each result carries the ticket it was issued with, and
//! [`apply_decoded`] drops results whose layer changed in the meantime.

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use paint_core::ProjectDocument;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};
use crate::image::decode_data_url;
use crate::layer::{LayerStack, LayerTicket, Placement};
use crate::stamp::StampPainter;

/// One layer raster waiting to be decoded.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    /// Target layer and the generation it must still have.
    pub ticket: LayerTicket,
    /// Encoded raster.
    pub source: String,
}

/// Result of decoding one layer raster.
#[derive(Debug)]
pub struct DecodedLayer {
    /// Ticket issued when the load began.
    pub ticket: LayerTicket,
    /// Decoded pixels or the decode failure.
    pub result: RenderResult<Pixmap>,
}

/// Stream of decode completions in completion order.
pub type DecodeStream = FuturesUnordered<BoxFuture<'static, DecodedLayer>>;

/// A project load whose rasters have not been decoded yet.
#[derive(Debug, Clone, Default)]
pub struct PendingLoad {
    jobs: Vec<DecodeJob>,
}

impl PendingLoad {
    /// Jobs in layer order.
    #[must_use]
    pub fn jobs(&self) -> &[DecodeJob] {
        &self.jobs
    }

    /// Start every decode on the blocking pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(self) -> DecodeStream {
        self.jobs
            .into_iter()
            .map(|job| {
                let DecodeJob { ticket, source } = job;
                tokio::task::spawn_blocking(move || decode_data_url(&source))
                    .map(move |joined| DecodedLayer {
                        ticket,
                        result: joined
                            .map_err(|e| RenderError::Task(e.to_string()))
                            .and_then(|r| r),
                    })
                    .boxed()
            })
            .collect()
    }

    /// Decode every layer and collect the results in completion order.
    pub async fn decode_all(self) -> Vec<DecodedLayer> {
        self.spawn().collect().await
    }
}

/// Validate a document, reset the canvas to it, and issue decode tickets.
///
/// All layers are cleared and the stamp list replaced before this returns;
/// layer pixels arrive later through [`apply_decoded`]. Starting another
/// load, resizing or clearing makes the outstanding tickets stale.
///
/// # Errors
///
/// Returns [`paint_core::CanvasError::InvalidProject`] without touching the
/// canvas if the document does not fit the stack.
pub fn begin_project_load(
    stack: &mut LayerStack,
    painter: &mut StampPainter,
    doc: &ProjectDocument,
) -> RenderResult<PendingLoad> {
    doc.validate(stack.len())?;

    stack.clear_all();
    painter.replace(doc.stamps.clone());

    let jobs = doc
        .drawings
        .iter()
        .enumerate()
        .map(|(index, source)| {
            Ok(DecodeJob {
                ticket: stack.ticket(index)?,
                source: source.clone(),
            })
        })
        .collect::<RenderResult<Vec<_>>>()?;

    tracing::debug!(
        "Project load started: {} layers pending, {} stamps",
        jobs.len(),
        doc.stamps.len()
    );
    Ok(PendingLoad { jobs })
}

/// Write one decode result to its layer if the ticket is still current.
///
/// Returns `true` when pixels were written. Decode failures leave the layer
/// cleared and are logged.
pub fn apply_decoded(stack: &mut LayerStack, decoded: &DecodedLayer) -> bool {
    match &decoded.result {
        Ok(pixmap) => stack.apply(&decoded.ticket, pixmap, Placement::Origin),
        Err(e) => {
            tracing::warn!("Layer {} left blank: {}", decoded.ticket.index, e);
            false
        }
    }
}
