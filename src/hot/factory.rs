//! Router factory contract.

use std::sync::Arc;

use axum::Router;

/// Error type factories may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a router from an empty shell and the shared application context.
///
/// Called once by `initialize` and again on every reload. The shell carries
/// a fallback that lets unmatched requests continue to the host's own routes,
/// so implementations should add routes to it rather than replace its
/// fallback.
pub trait RouterFactory<C>: Send + Sync + 'static {
    fn build(&self, shell: Router, context: &Arc<C>) -> Result<Router, BoxError>;
}

impl<C, F> RouterFactory<C> for F
where
    F: Fn(Router, &Arc<C>) -> Result<Router, BoxError> + Send + Sync + 'static,
{
    fn build(&self, shell: Router, context: &Arc<C>) -> Result<Router, BoxError> {
        self(shell, context)
    }
}

/// Pins a closure to the factory signature so its argument types are inferred.
///
/// ```
/// use std::sync::Arc;
/// use axum::routing::get;
/// use hot_router::hot::factory_fn;
///
/// let factory = factory_fn(|shell, greeting: &Arc<String>| {
///     let greeting = greeting.to_string();
///     Ok(shell.route("/", get(move || async move { greeting })))
/// });
/// # let _ = factory;
/// ```
pub fn factory_fn<C, F>(f: F) -> F
where
    F: Fn(Router, &Arc<C>) -> Result<Router, BoxError> + Send + Sync + 'static,
{
    f
}
