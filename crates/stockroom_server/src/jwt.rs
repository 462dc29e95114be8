use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use stockroom_core::prelude::{AuthError, Principal};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The principal id.
    pub sub: String,
    pub exp: usize,
}

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Mints and checks principal tokens signed with the server secret.
///
/// Only HS256 is accepted; a token signed with any other algorithm is invalid even
/// when the secret matches.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn mint(&self, subject: String, duration_seconds: u64) -> Result<String, anyhow::Error> {
        let expiration = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() + duration_seconds;
        let claims = Claims {
            sub: subject,
            exp: expiration as usize,
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let Claims { sub, .. } = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        if sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(Principal::new(sub))
    }
}
