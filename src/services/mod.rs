pub mod ingest;
pub mod recommendation;
pub mod storage;
pub mod training;
