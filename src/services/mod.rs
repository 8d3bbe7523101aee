// Service exports
pub mod refresh;
pub mod store;
pub mod supabase;

pub use refresh::{refresh_once, spawn_refresh_task};
pub use store::{OfferStore, StaticOfferStore, StoreError};
pub use supabase::SupabaseStore;
