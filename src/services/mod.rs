pub mod admin_registry;
pub mod upload_signer;

pub use admin_registry::{
    AdminAllowList, AdminChange, AdminRegistry, AdminStatus, AdminStore, ChangeOutcome, DocumentAdminStore,
    RegistryError, ADMIN_EMAILS_KEY,
};
pub use upload_signer::{
    CloudinaryClient, ProviderError, SigningError, UploadCredentials, UploadProvider, UploadSignatureGrant,
    UploadSigner,
};
