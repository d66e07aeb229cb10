//! Route paths and `OpenAPI` tags.

pub const SYSTEM_TAG: &str = "System";
pub const PRICING_TAG: &str = "Pricing";

pub const OPENAPI_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs";

/// Number of features in a fare feature vector.
pub const FARE_FEATURE_COUNT: usize = 6;
