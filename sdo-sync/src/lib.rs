pub mod archive;
pub mod config;
pub mod inventory;
pub mod io;
pub mod prune;
pub mod sync;
pub mod transfer;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::archive::{date_url, list_files, parse_listing, HttpListing, ListingSource};
pub use crate::config::{Channel, SyncConfig, CHANNELS};
pub use crate::inventory::{channel_inventory, ChannelInventory, FrameMeta};
pub use crate::prune::{prune_all, prune_channel};
pub use crate::sync::{run, save_report, sync_channel, ChannelReport, RunReport};
pub use crate::transfer::{FileTransfer, HttpTransfer, TransferError, WgetTransfer};
