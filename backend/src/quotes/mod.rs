pub mod repository_sqlx;

pub use repository_sqlx::{SqlxQuoteSource, insert_quote};
