//! Download link generation
//!
//! A download link is `http://<lan-address>:<port>/download/<stored-name>` plus a QR code of
//! that URL. Address discovery and visual encoding sit behind traits so tests and deployments
//! can substitute their own.

mod address;
mod encoder;
mod generator;

pub use address::{select_lan_address, AddressProvider, LanAddressProvider, StaticAddressProvider};
pub use encoder::{LinkEncoder, QrCodeEncoder};
pub use generator::{GeneratedLink, LinkGenerator};
