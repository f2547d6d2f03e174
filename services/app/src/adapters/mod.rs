pub mod backend;
pub mod console;
pub mod store;

pub use backend::HttpBackendAdapter;
pub use console::ConsoleInteractionAdapter;
pub use store::FileStoreAdapter;
