pub mod error;
pub mod preprocess;
pub mod state;
pub mod store;
pub mod text;

pub use error::StoreError;
pub use store::{TransactionOutcome, VocabularyStore, WordStore};
