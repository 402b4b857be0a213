//! Domain models for temple-service.

mod account;
mod directory;
mod payment;
mod receipt;
mod role;

pub use account::TempleAccount;
pub use directory::{
    require_text, CommitteeMember, CommitteeMemberInput, CommitteeMemberPublic, CommitteeRole,
    ContactInput, GalleryItem, GalleryItemInput, GalleryItemUpdate, Jatre, JatreInput,
    TempleContact,
};
pub use payment::{PaymentConfirmation, PaymentDetails, PaymentMode, PaymentStatus};
pub use receipt::{DonationReport, DonorDetail, Receipt, ReceiptIssuer};
pub use role::{Caller, UserRole};
