pub mod bank_of_china;
pub mod board;
pub mod caching;
pub mod cib;
pub mod extract;
pub mod fallback;
pub mod fetcher;
pub mod normalize;

pub use caching::CachingRateProvider;
pub use fallback::{FallbackRateProvider, RateOrigin, RatesOutcome};
