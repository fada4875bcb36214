pub mod yahoo;

pub use yahoo::YahooQuoteClient;
