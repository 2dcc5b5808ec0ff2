use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tower::Layer;
use tower::Service;

use super::error::AuthorizationError;
use super::policy::AccessPolicy;
use super::propagation::PropagationSpec;
use crate::config::ValidatorConfig;
use crate::error::{JoseError, Result};
use crate::jose::types::Claims;
use crate::jose::validator::{ClaimSource, Validator};

type BoxFuture<T, E> = std::pin::Pin<Box<dyn std::future::Future<Output = std::result::Result<T, E>> + Send>>;

struct JoseState<C> {
    validator: Validator<C>,
    policy: AccessPolicy,
    propagation: Option<PropagationSpec>,
}

/// Middleware layer that authenticates, authorizes and propagates claims
///
/// On success the verified [`Claims`] are stored in the request extensions and
/// the propagated headers are set on the request before the inner service runs.
pub struct JoseLayer<C> {
    state: Arc<JoseState<C>>,
}

impl<C> Clone for JoseLayer<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<C: ClaimSource> JoseLayer<C> {
    /// Assemble the layer from explicit parts
    pub fn new(validator: Validator<C>, policy: AccessPolicy, propagation: Option<PropagationSpec>) -> Self {
        Self {
            state: Arc::new(JoseState {
                validator,
                policy,
                propagation,
            }),
        }
    }

    /// Assemble the layer from the `[validator]` configuration section
    pub fn from_config(config: &ValidatorConfig, source: C) -> Result<Self> {
        let validator = Validator::new(config, source)?;
        Ok(Self::new(validator, config.access_policy(), config.propagation_spec()?))
    }
}

impl<S, C> Layer<S> for JoseLayer<C> {
    type Service = JoseMiddleware<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        JoseMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

pub struct JoseMiddleware<S, C> {
    inner: S,
    state: Arc<JoseState<C>>,
}

impl<S: Clone, C> Clone for JoseMiddleware<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            state: self.state.clone(),
        }
    }
}

// Inbound copies of every configured header are removed before derived values
// are set.
fn set_propagated_headers(request: &mut Request, spec: &PropagationSpec, claims: &Claims) {
    for rule in spec.rules() {
        if let Ok(name) = HeaderName::try_from(rule.to_header.as_str()) {
            request.headers_mut().remove(name);
        }
    }

    for (name, value) in spec.propagate(claims) {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                request.headers_mut().insert(name, value);
            }
            _ => tracing::warn!("Cannot set propagated header {}: invalid name or value", name),
        }
    }
}

impl<S, C> Service<Request> for JoseMiddleware<S, C>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    C: ClaimSource + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let state = self.state.clone();

        Box::pin(async move {
            let claims = match state.validator.validate(request.headers()).await {
                Ok(claims) => claims,
                Err(JoseError::MissingToken) => {
                    return Ok(AuthorizationError::MissingToken.into_response());
                }
                Err(e) => {
                    tracing::debug!("Token rejected: {}", e);
                    return Ok(AuthorizationError::InvalidToken(e.to_string()).into_response());
                }
            };

            if let Err(denied) = state.policy.authorize(&claims) {
                return Ok(denied.into_response());
            }

            if let Some(spec) = &state.propagation {
                set_propagated_headers(&mut request, spec, &claims);
            }

            request.extensions_mut().insert(claims);
            inner.call(request).await
        })
    }
}

/// Middleware layer enforcing an additional per-route policy
///
/// Expects [`Claims`] in the request extensions, as stored by [`JoseLayer`].
#[derive(Clone)]
pub struct RequirePolicy {
    policy: Arc<AccessPolicy>,
}

impl RequirePolicy {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl<S> Layer<S> for RequirePolicy {
    type Service = RequirePolicyMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePolicyMiddleware {
            inner,
            policy: self.policy.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequirePolicyMiddleware<S> {
    inner: S,
    policy: Arc<AccessPolicy>,
}

impl<S> Service<Request> for RequirePolicyMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let decision = match request.extensions().get::<Claims>() {
                Some(claims) => policy.authorize(claims),
                None => Err(AuthorizationError::MissingToken),
            };

            if let Err(denied) = decision {
                return Ok(denied.into_response());
            }

            inner.call(request).await
        })
    }
}
