pub mod id;
pub mod record;
pub mod store;

pub use self::id::{generate, IdStrategy, SessionId};
pub use self::record::{
    EntryMethod, Identity, Role, RoleData, SessionRecord, VehicleDescriptor, WorkflowData,
};
pub use self::store::{DirStorage, MemoryStorage, SessionStore, Storage, StoreError};
