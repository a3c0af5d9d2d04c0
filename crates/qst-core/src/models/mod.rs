pub mod quote;

pub use quote::{seed_quotes, Origin, Quote, FIRST_LOCAL_ID};
