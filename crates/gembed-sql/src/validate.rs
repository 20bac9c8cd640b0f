//! Request validation against the capability catalog.
//!
//! Runs before anything is allocated for the request, so an invalid method or
//! model fails without touching the backend.

use tracing::debug;

use gembed_backend::{CapabilityCatalog, InputKind, MethodId, ModelId};

use crate::error::GembedError;

/// Method and model resolved for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedCall {
    pub method: MethodId,
    pub model: ModelId,
}

/// Resolve `method` and then `model` (for text input) in `catalog`.
pub fn validate_call<C: CapabilityCatalog + ?Sized>(
    catalog: &C,
    method: &str,
    model: &str,
) -> Result<ValidatedCall, GembedError> {
    let method_id = catalog
        .method_id(method)
        .ok_or_else(|| GembedError::InvalidMethod {
            method: method.to_string(),
            hint: method_hint(&catalog.method_names()),
        })?;

    let model_id = catalog
        .model_id(method_id, model, InputKind::Text)
        .ok_or_else(|| GembedError::ModelNotAllowed(model.to_string()))?;

    debug!(
        method = %method,
        model = %model,
        method_id = method_id.0,
        model_id = model_id.0,
        "Embedding request validated"
    );

    Ok(ValidatedCall {
        method: method_id,
        model: model_id,
    })
}

/// `'a'`, `'a' or 'b'`, `'a', 'b' or 'c'`.
fn method_hint(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    match quoted.split_last() {
        None => "a configured method".to_string(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gembed_backend::StaticCatalog;

    #[test]
    fn test_validate_default_catalog() {
        let catalog = StaticCatalog::default();
        let call = validate_call(&catalog, "grpc", "sentence-transformers/all-MiniLM-L6-v2")
            .unwrap();
        assert_eq!(call.method, MethodId(1));
        assert_eq!(call.model, ModelId(0));
    }

    #[test]
    fn test_invalid_method_message() {
        let err = validate_call(&StaticCatalog::default(), "openai", "m1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid embedding method: openai (use 'fastembed' or 'grpc')"
        );
    }

    #[test]
    fn test_model_not_allowed() {
        let err = validate_call(&StaticCatalog::default(), "fastembed", "m9").unwrap_err();
        assert_eq!(err, GembedError::ModelNotAllowed("m9".to_string()));
    }

    #[test]
    fn test_method_hint_shapes() {
        assert_eq!(method_hint(&[]), "a configured method");
        assert_eq!(method_hint(&["a".to_string()]), "'a'");
        assert_eq!(
            method_hint(&["a".to_string(), "b".to_string(), "c".to_string()]),
            "'a', 'b' or 'c'"
        );
    }
}
