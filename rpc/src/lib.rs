pub mod router;

pub use router::{
    Handler, HandlerError, HandlerFunction, Outcome, Reply, Request, Router,
};

/// Build a [`Router`] from `path => handler` pairs.
///
/// ```ignore
/// let router = rpc::routes! {
///     "Impl/Insert" => handlers::insert,
///     "Impl/Get" => handlers::get,
/// };
/// ```
#[macro_export]
macro_rules! routes {
    ($($path:expr => $handler:expr),* $(,)?) => {{
        let mut router = $crate::router::Router::new();
        $(
            router.add($path, $handler);
        )*
        router
    }};
}
