use stockroom_core::prelude::*;

#[derive(Clone)]
pub struct AppState<R, B, X, A>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    pub assets: R,
    pub blobs: B,
    pub records: X,
    pub auth: A,
    pub read_policy: ReadPolicy,
}
