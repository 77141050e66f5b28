pub mod fetch;
pub mod proxy;

pub use fetch::*;
pub use proxy::*;
