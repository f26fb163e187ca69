pub mod refresher;

pub use refresher::AggregateRefresher;
