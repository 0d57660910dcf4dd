pub mod feed_reader;
pub mod station_reader;

pub use feed_reader::FeedReader;
pub use station_reader::StationReader;
