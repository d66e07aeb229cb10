mod health;
mod model;
mod router;
mod state;

pub use model::ModelInfo;
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
