mod error;
mod record;
mod schema;
mod store;

pub use error::StoreError;
pub use record::{NewTranslation, ProjectStats, TranslationRecord};
pub use store::{DEFAULT_LIST_LIMIT, TranslationStore};
