pub mod access;
pub mod database;
pub mod directory;
pub mod donations;
pub mod memory;
pub mod metrics;
pub mod reporting;
pub mod repository;

pub use access::AccessControl;
pub use database::PgRepository;
pub use directory::DirectoryService;
pub use donations::DonationService;
pub use memory::InMemoryRepository;
pub use metrics::{get_metrics, init_metrics};
pub use repository::{Approval, DirectoryRepository, Store, TempleRepository};
