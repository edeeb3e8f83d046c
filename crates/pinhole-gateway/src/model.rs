mod url;

pub use url::{
    CreateUrlRequest, CreateUrlResponse, Envelope, ErrorResponse, HealthResponse, MappingView,
    Owner,
};
