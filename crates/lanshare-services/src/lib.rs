//! LAN Share Services Layer
//!
//! Business services behind the HTTP surface: the in-memory file registry, download link
//! generation, upload ingestion, download resolution, deletion and the expiration sweeper.
//! Handlers in lanshare-api stay thin and delegate here.

pub mod cleanup;
pub mod content_type;
pub mod deletion;
pub mod download;
pub mod filename;
pub mod ingest;
pub mod link;
pub mod registry;

pub use cleanup::{ExpirationSweeper, SweepReport, SweeperHandle};
pub use deletion::DeletionService;
pub use download::{DownloadResolver, ResolvedDownload};
pub use filename::{FilenameDecoder, Latin1Utf8Repair, Passthrough};
pub use ingest::{IncomingFile, IngestionService};
pub use link::{
    AddressProvider, GeneratedLink, LanAddressProvider, LinkEncoder, LinkGenerator,
    QrCodeEncoder, StaticAddressProvider,
};
pub use registry::FileRegistry;
