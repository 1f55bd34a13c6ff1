//! Constants used throughout the cTAKES core crate.
//!
//! Service URLs are the defaults of the upstream deployments. The core never contacts them;
//! they are exported for whichever transport layer talks to the services.

/// Default cTAKES REST analyze endpoint.
pub const DEFAULT_CTAKES_REST_URL: &str = "http://localhost:8080/ctakes-web-rest/service/analyze";

/// Default cNLP transformers negation endpoint.
pub const DEFAULT_CNLP_NEGATION_URL: &str = "http://localhost:8000/negation/process";

/// Default cNLP transformers term-exists endpoint.
pub const DEFAULT_CNLP_TERM_EXISTS_URL: &str = "http://localhost:8000/termexists/process";

/// Environment variable naming the cTAKES REST endpoint.
pub const ENV_CTAKES_REST_URL: &str = "URL_CTAKES_REST";

/// Environment variable naming the negation endpoint.
pub const ENV_CNLP_NEGATION_URL: &str = "URL_CNLP_NEGATION";

/// Environment variable naming the term-exists endpoint.
pub const ENV_CNLP_TERM_EXISTS_URL: &str = "URL_CNLP_TERM_EXISTS";

/// Environment variable toggling the post-reconciliation span check.
pub const ENV_VERIFY_SPANS: &str = "CTAKES_VERIFY_SPANS";

/// Wire label suffix shared by all regular semantic categories.
pub const MENTION_SUFFIX: &str = "Mention";

/// Wire label of the custom-dictionary category.
pub const IDENTIFIED_ANNOTATION_LABEL: &str = "IdentifiedAnnotation";
