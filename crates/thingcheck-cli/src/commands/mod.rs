pub mod batch;
pub mod ingest;
pub mod inspect;
pub mod token;
pub mod verify;
