// Document intake: extraction, reply parsing, upload storage and the
// pipeline that ties them to the analysis client and the assessment store.

pub mod extractor;
pub mod handlers;
pub mod parser;
pub mod pipeline;
pub mod storage;
