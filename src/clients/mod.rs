#[cfg(feature = "anthropic")]
pub mod claude;
#[cfg(feature = "deepseek")]
pub mod deepseek;
pub mod flexible;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod mock;

#[cfg(feature = "anthropic")]
pub use claude::*;
#[cfg(feature = "deepseek")]
pub use deepseek::*;
pub use flexible::*;
#[cfg(feature = "gemini")]
pub use gemini::*;
pub use mock::*;
