use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Claims carried by booking tokens. Older tokens put the user id in `id`
/// instead of `sub`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Option<String>,
    pub id: Option<String>,
    pub exp: Option<u64>,
}

impl JwtClaims {
    pub fn principal_id(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// The caller as asserted by a verified token. Authorization decisions are
/// made against the user record it resolves to, never against these claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
}
