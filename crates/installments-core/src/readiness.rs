//! Client Handle Readiness
//!
//! The Stripe.js client and the mounted card element arrive asynchronously.
//! Until both exist a submit is a silent no-op, reported as `NotReady` so
//! callers and tests can tell it apart from a real failure.

/// Which handle is still missing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotReady {
    /// Stripe.js has not loaded or was not initialized
    GatewayClient,
    /// The secure card input is not mounted
    CardElement,
}

impl std::fmt::Display for NotReady {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotReady::GatewayClient => f.write_str("gateway client not initialized"),
            NotReady::CardElement => f.write_str("card element not mounted"),
        }
    }
}

/// Result of a capability check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Readiness<T> {
    Ready(T),
    NotReady(NotReady),
}

impl<T> Readiness<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Readiness<U> {
        match self {
            Readiness::Ready(value) => Readiness::Ready(f(value)),
            Readiness::NotReady(missing) => Readiness::NotReady(missing),
        }
    }

    pub fn into_result(self) -> crate::Result<T> {
        match self {
            Readiness::Ready(value) => Ok(value),
            Readiness::NotReady(missing) => Err(crate::FlowError::NotReady(missing)),
        }
    }
}

/// Gateway client only (next actions, tokenization prerequisites)
pub fn client_readiness<S>(client: Option<S>) -> Readiness<S> {
    match client {
        Some(client) => Readiness::Ready(client),
        None => Readiness::NotReady(NotReady::GatewayClient),
    }
}

/// Gateway client and mounted card element, as needed for tokenization
pub fn card_readiness<S, E>(client: Option<S>, element: Option<E>) -> Readiness<(S, E)> {
    match (client, element) {
        (Some(client), Some(element)) => Readiness::Ready((client, element)),
        (None, _) => Readiness::NotReady(NotReady::GatewayClient),
        (Some(_), None) => Readiness::NotReady(NotReady::CardElement),
    }
}
