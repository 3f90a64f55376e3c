mod fetcher;
mod measurement;

pub use fetcher::*;
pub use measurement::*;
