pub mod cache;
pub mod preview;
pub mod publish;
pub mod sitemap;
pub mod snapshot;
