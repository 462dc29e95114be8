pub use stockroom_core::*;

#[cfg(feature = "server")]
pub mod server {
    pub use stockroom_server::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use stockroom_fs::*;
}

#[cfg(feature = "memory")]
pub mod memory {
    pub use stockroom_memory::*;
}

#[cfg(feature = "mock_auth")]
pub mod auth_mock {
    pub use stockroom_auth_mock::*;
}

pub mod prelude {
    pub use stockroom_core::prelude::*;

    #[cfg(feature = "server")]
    pub use stockroom_server::prelude::*;

    #[cfg(feature = "fs")]
    pub use stockroom_fs::FileSystemBlobStorage;

    #[cfg(feature = "memory")]
    pub use stockroom_memory::{InMemoryAssetRepository, InMemoryBlobStorage, InMemoryRecordStore};

    #[cfg(feature = "mock_auth")]
    pub use stockroom_auth_mock::{AllowAllAuth, StaticTokenAuth};
}
