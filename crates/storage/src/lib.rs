// JsonDB Storage Layer
//
// One JSON file per database, rewritten whole on every mutation, plus an
// async storage interface with file and in-memory backends

pub mod codec;
pub mod file;
pub mod lock;
pub mod memory;
pub mod store;
pub mod trait_;

pub use file::{create_file_storage, JsonFileStorage};
pub use memory::{create_memory_storage, MemoryStorage};
pub use store::Store;
pub use trait_::*;
