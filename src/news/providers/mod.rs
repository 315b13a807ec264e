pub mod data_news;
pub mod fixture;

pub use data_news::DataNewsProvider;
pub use fixture::FixtureCorpus;
