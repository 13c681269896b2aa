//! Decoradores de edges: envuelven un `EdgeRunner` y preservan su
//! interfaz, añadiendo throttling, reintentos o enrutamiento condicional.

mod adaptive_rate_limit;
mod conditional;
mod rate_limit;
mod retry;

pub use adaptive_rate_limit::AdaptiveRateLimit;
pub use conditional::{Conditional, IfFalse};
pub use rate_limit::RateLimit;
pub use retry::Retry;
