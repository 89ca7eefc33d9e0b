pub mod engine;

pub use engine::PeriodicTask;
pub use tokio_util::sync::CancellationToken;
