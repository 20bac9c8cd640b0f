//! The query-callable embedding functions.
//!
//! - `generate_embeddings(method, model, texts)`: one call, one array of vectors
//! - `generate_embeddings_with_ids(method, model, ids, texts)`: set-returning,
//!   one `(sentence_id, embedding)` row per invocation
//!
//! Both run validate -> assemble -> invoke; the first then materializes the
//! whole batch, the second builds a cursor and streams it.

use tracing::{debug, info};

use gembed_backend::{CapabilityCatalog, EmbeddingBackend, StaticCatalog};
use gembed_types::Settings;

use crate::assemble::{assemble_texts, assemble_with_ids};
use crate::cursor::{EmbeddingCursor, EmbeddingRow};
use crate::error::GembedError;
use crate::invoke::invoke;
use crate::materialize::materialize;
use crate::srf::{FuncCallContext, RowProducer, SrfStep, ValuePerCall};
use crate::validate::validate_call;
use crate::vector::Vector;

/// Embedding functions bound to a catalog and a backend.
#[derive(Debug)]
pub struct Gembed<C, B> {
    catalog: C,
    backend: B,
}

impl<B: EmbeddingBackend> Gembed<StaticCatalog, B> {
    /// Build with the catalog from `settings`.
    pub fn from_settings(settings: &Settings, backend: B) -> Result<Self, GembedError> {
        let catalog = StaticCatalog::from_settings(&settings.catalog)?;
        info!(
            methods = settings.catalog.methods.len(),
            "Embedding functions configured"
        );
        Ok(Self::new(catalog, backend))
    }
}

#[cfg(feature = "ffi")]
impl Gembed<gembed_backend::NativeBackend, gembed_backend::NativeBackend> {
    /// Catalog and backend both provided by the native library.
    pub fn native() -> Self {
        Self::new(
            gembed_backend::NativeBackend::new(),
            gembed_backend::NativeBackend::new(),
        )
    }
}

impl<C: CapabilityCatalog, B: EmbeddingBackend> Gembed<C, B> {
    pub fn new(catalog: C, backend: B) -> Self {
        Self { catalog, backend }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Embed `texts` in one backend call.
    ///
    /// Returns `None` (SQL NULL) for an empty collection without calling the
    /// backend. Vector `i` of the result belongs to `texts[i]`.
    pub fn generate_embeddings<S: AsRef<str>>(
        &self,
        method: &str,
        model: &str,
        texts: &[Option<S>],
    ) -> Result<Option<Vec<Vector>>, GembedError> {
        let call = validate_call(&self.catalog, method, model)?;

        let Some(request) = assemble_texts(call, texts)? else {
            return Ok(None);
        };

        let batch = invoke(&self.backend, request)?;
        materialize(batch).map(Some)
    }

    /// Set-returning embedding of `texts` paired with `ids`.
    ///
    /// The returned producer holds only the call's arguments; the engine
    /// keeps the cursor in a `FuncCallContext` between invocations.
    pub fn generate_embeddings_with_ids<'a, S: AsRef<str>>(
        &'a self,
        method: &'a str,
        model: &'a str,
        ids: &'a [Option<i32>],
        texts: &'a [Option<S>],
    ) -> GenerateEmbeddingsWithIds<'a, C, B, S> {
        GenerateEmbeddingsWithIds {
            functions: self,
            method,
            model,
            ids,
            texts,
        }
    }

    /// Drive `generate_embeddings_with_ids` with a fresh context.
    pub fn stream_embeddings_with_ids<'a, S: AsRef<str>>(
        &'a self,
        method: &'a str,
        model: &'a str,
        ids: &'a [Option<i32>],
        texts: &'a [Option<S>],
    ) -> ValuePerCall<GenerateEmbeddingsWithIds<'a, C, B, S>> {
        ValuePerCall::new(self.generate_embeddings_with_ids(method, model, ids, texts))
    }
}

/// Arguments of one `generate_embeddings_with_ids` request.
#[derive(Debug)]
pub struct GenerateEmbeddingsWithIds<'a, C, B, S> {
    functions: &'a Gembed<C, B>,
    method: &'a str,
    model: &'a str,
    ids: &'a [Option<i32>],
    texts: &'a [Option<S>],
}

impl<C: CapabilityCatalog, B: EmbeddingBackend, S: AsRef<str>> GenerateEmbeddingsWithIds<'_, C, B, S> {
    /// First-call work: validate, assemble, invoke, build the cursor.
    fn open_cursor(&self) -> Result<EmbeddingCursor, GembedError> {
        let call = validate_call(&self.functions.catalog, self.method, self.model)?;

        let Some(assembled) = assemble_with_ids(call, self.ids, self.texts)? else {
            return Ok(EmbeddingCursor::empty());
        };

        let batch = invoke(&self.functions.backend, assembled.request)?;
        EmbeddingCursor::build(assembled.ids, batch)
    }
}

impl<C: CapabilityCatalog, B: EmbeddingBackend, S: AsRef<str>> RowProducer
    for GenerateEmbeddingsWithIds<'_, C, B, S>
{
    type State = EmbeddingCursor;
    type Row = EmbeddingRow;

    fn produce(
        &self,
        ctx: &mut FuncCallContext<EmbeddingCursor>,
    ) -> Result<SrfStep<EmbeddingRow>, GembedError> {
        ctx.begin_call();
        if ctx.is_done() {
            return Ok(SrfStep::Done);
        }

        if ctx.is_first_call() {
            match self.open_cursor() {
                Ok(cursor) => {
                    ctx.init(cursor);
                }
                Err(e) => {
                    ctx.finish();
                    return Err(e);
                }
            }
        }

        let row = ctx.state_mut().and_then(EmbeddingCursor::next_row);
        match row {
            Some(row) => Ok(SrfStep::Next(row)),
            None => {
                debug!(calls = ctx.call_count(), "No more embedding rows");
                ctx.finish();
                Ok(SrfStep::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gembed_backend::{Script, TrackingBackend};
    use gembed_types::{CatalogSettings, MethodEntry, ModelEntry};

    fn functions(backend: TrackingBackend) -> Gembed<StaticCatalog, TrackingBackend> {
        let settings = Settings {
            catalog: CatalogSettings {
                methods: vec![MethodEntry::new("fastembed", vec![ModelEntry::text("m1")])],
            },
            ..Settings::default()
        };
        Gembed::from_settings(&settings, backend).unwrap()
    }

    #[test]
    fn test_generate_embeddings() {
        let gembed = functions(TrackingBackend::with_vectors(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ]));
        let vectors = gembed
            .generate_embeddings("fastembed", "m1", &[Some("a"), Some("b")])
            .unwrap()
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(vectors[1].as_slice(), &[0.0, 1.0, 0.0]);
        assert_eq!(gembed.backend().call_count(), 1);
        assert_eq!(gembed.backend().outstanding(), 0);
    }

    #[test]
    fn test_generate_embeddings_empty_is_null() {
        let gembed = functions(TrackingBackend::new(3));
        let texts: [Option<&str>; 0] = [];
        assert!(gembed
            .generate_embeddings("fastembed", "m1", &texts)
            .unwrap()
            .is_none());
        assert_eq!(gembed.backend().call_count(), 0);
    }

    #[test]
    fn test_invalid_method_checked_before_empty() {
        let gembed = functions(TrackingBackend::new(3));
        let texts: [Option<&str>; 0] = [];
        let err = gembed.generate_embeddings("grpc", "m1", &texts).unwrap_err();
        assert!(matches!(err, GembedError::InvalidMethod { .. }));
        assert!(err.to_string().contains("(use 'fastembed')"));
    }

    #[test]
    fn test_with_ids_streams_rows() {
        let gembed = functions(TrackingBackend::with_vectors(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
        ]));
        let ids = [Some(7), Some(9)];
        let texts = [Some("a"), Some("b")];
        let producer = gembed.generate_embeddings_with_ids("fastembed", "m1", &ids, &texts);
        let mut ctx = FuncCallContext::new();

        let first = producer.produce(&mut ctx).unwrap().into_row().unwrap();
        assert_eq!(first.sentence_id, 7);
        assert_eq!(first.embedding.as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(ctx.state().map(EmbeddingCursor::position), Some(1));

        let second = producer.produce(&mut ctx).unwrap().into_row().unwrap();
        assert_eq!(second.sentence_id, 9);

        assert!(producer.produce(&mut ctx).unwrap().is_done());
        assert!(ctx.state().is_none());
        assert_eq!(gembed.backend().call_count(), 1);
    }

    #[test]
    fn test_with_ids_backend_failure_exposes_no_cursor() {
        let backend = TrackingBackend::new(3);
        backend.script(Script::Fail {
            status: -7,
            with_batch: true,
        });
        let gembed = functions(backend);
        let ids = [Some(1)];
        let texts = [Some("a")];
        let producer = gembed.generate_embeddings_with_ids("fastembed", "m1", &ids, &texts);
        let mut ctx = FuncCallContext::new();

        let err = producer.produce(&mut ctx).unwrap_err();
        assert_eq!(err, GembedError::Backend { code: -7 });
        assert!(ctx.state().is_none());
        assert_eq!(gembed.backend().outstanding(), 0);

        // The request is over; no second backend call
        assert!(producer.produce(&mut ctx).unwrap().is_done());
        assert_eq!(gembed.backend().call_count(), 1);
    }
}
