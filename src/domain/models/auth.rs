use serde::{Deserialize, Serialize};

pub const SESSION_AUDIENCE: &str = "spark-portal";
pub const SESSION_ISSUER: &str = "spark-club";

/// Payload of the `spark_session` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub role: String,
    pub csrf: String,
}
