use std::sync::Arc;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use press_core::Error;
use crate::{error::ApiError, AppState};

/// Proof that the request carried the configured admin token.
#[derive(Debug, Clone, Copy)]
pub struct Operator;

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Operator {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            tracing::warn!("Mutation refused: no admin token is configured");
            return Err(Error::Unauthorized.into());
        };
        match bearer_token(parts) {
            Some(token) if token == expected => Ok(Operator),
            _ => Err(Error::Unauthorized.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer s3cret"))), Some("s3cret"));
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
