//! Asynchronous HTTP built-in
//!
//! `http_get_json(url, ?Result)` fetches a URL while the resolver is
//! suspended, parses the body as JSON and unifies the result with the second
//! argument. Every failure mode — a non-`Str` URL, connection errors,
//! non-success status codes, unparseable bodies — yields nothing: network
//! trouble is a failed goal, not a failed query.

use std::time::Duration;

use async_stream::try_stream;
use reqwest::Client;

use crate::bindings::Bindings;
use crate::builtin::{expect_arity, Builtin};
use crate::resolve::Resolver;
use crate::stream::{self, Solutions};
use crate::term::{Goal, Term};
use crate::unify::unify;

/// Handler for `http_get_json`. The client configuration is fixed at
/// registration time; each invocation owns its connection and releases it on
/// every exit path, including cancellation.
#[derive(Debug, Clone)]
pub struct HttpGetJson {
    timeout: Duration,
}

impl HttpGetJson {
    /// Creates a handler with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        HttpGetJson { timeout }
    }
}

impl Default for HttpGetJson {
    fn default() -> Self {
        HttpGetJson {
            timeout: Duration::from_secs(30),
        }
    }
}

async fn fetch(url: &str, timeout: Duration) -> Option<serde_json::Value> {
    let client = Client::builder().timeout(timeout).build().ok()?;
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        tracing::debug!(url, status = %response.status(), "http_get_json non-success status");
        return None;
    }
    response.json().await.ok()
}

impl Builtin for HttpGetJson {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        if let Err(error) = expect_arity("http_get_json", goal, 2) {
            return stream::fault(error);
        }
        let url = bindings.walk(&goal.args[0]);
        let target = goal.args[1].clone();
        let bindings = bindings.clone();
        let timeout = self.timeout;
        Box::pin(try_stream! {
            if let Term::Str(url) = url {
                match fetch(&url, timeout).await {
                    Some(body) => {
                        let fetched = Term::from_json(body);
                        if let Some(unified) = unify(&target, &fetched, &bindings) {
                            yield unified;
                        }
                    }
                    None => {
                        tracing::debug!(url = url.as_str(), "http_get_json fetch failed");
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinRegistry;
    use crate::knowledge::KnowledgeBase;
    use crate::resolve::ResolveContext;
    use crate::stream::SolutionStream;
    use crate::term::Compound;
    use crate::trace::NullTrace;
    use std::sync::Arc;

    fn resolver() -> Resolver {
        Resolver::new(
            Arc::new(ResolveContext::new(
                Arc::new(KnowledgeBase::new()),
                Arc::new(BuiltinRegistry::standard()),
                25,
                Arc::new(NullTrace),
            )),
            0,
        )
    }

    // Network round-trips against a local server live in tests/http_builtin_test.rs;
    // these cover the argument-shape failure modes that never touch the network.

    #[tokio::test]
    async fn test_atom_url_fails_silently() -> anyhow::Result<()> {
        let goal = Compound::new("http_get_json", [Term::from("not-a-url"), Term::var("R")]);
        let solutions = HttpGetJson::default()
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unbound_url_fails_silently() -> anyhow::Result<()> {
        let goal = Compound::new("http_get_json", [Term::var("Url"), Term::var("R")]);
        let solutions = HttpGetJson::default()
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }
}
