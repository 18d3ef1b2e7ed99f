pub mod directory;
pub mod model;

pub use directory::{
    DirectoryError, MemoryTenantStore, PgTenantStore, StoreError, TenantDirectory, TenantStore,
};
pub use model::Tenant;
