mod secret;
mod units;

pub use secret::Secret;
pub use units::{kg_to_arrobas, round2, ARROBA_KG};
