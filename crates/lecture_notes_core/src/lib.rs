pub mod domain;
pub mod ports;

pub use domain::{ChatReply, Document, HealthReport, NoteConversion, PhotoRef};
pub use ports::{
    BackendService, DocumentStoreService, InteractionService, PortError, PortResult,
};
