mod surreal;
mod traits;

pub use surreal::SurrealStore;
pub use traits::{Collection, NewRecord, Store};
