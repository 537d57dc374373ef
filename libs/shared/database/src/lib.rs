pub mod error;
pub mod firestore;
pub mod migration;
pub mod supabase;

pub use error::DatabaseError;
