mod account_link;
mod stats_channel;

pub use account_link::AccountLink;
pub use stats_channel::StatsChannel;
