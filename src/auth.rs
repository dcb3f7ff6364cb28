use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::{RentifyError, RentifyResult};
use crate::models::{AuthPayload, User};

pub fn hash_password(password: &str, cost: u32) -> RentifyResult<String> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> RentifyResult<bool> {
    Ok(verify(password, hash)?)
}

pub fn create_jwt(user: &User, secret: &[u8], ttl_secs: u64) -> RentifyResult<String> {
    let expiration = Utc::now().timestamp().max(0) as usize + ttl_secs as usize;

    let claims = AuthPayload {
        sub: user.id.clone(),
        role: user.role,
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).map_err(signing_error)
}

/// Failing to sign is a server fault, unlike a bad token from a client.
fn signing_error(err: jsonwebtoken::errors::Error) -> RentifyError {
    RentifyError::Internal(format!("could not sign token: {}", err))
}

pub fn validate_jwt(token: &str, secret: &[u8]) -> RentifyResult<AuthPayload> {
    let token_data = decode::<AuthPayload>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
