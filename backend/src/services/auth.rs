//! Authentication service for profile registration, login and recovery
//!
//! Profiles live in the global `userProfiles` slot. A corrupted profile slot
//! is actively cleared, unlike data slots which are merely read as empty.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::Store;
use shared::{
    validate_password, validate_recovery_phrase, validate_username, UserProfile, PROFILES_KEY,
};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new profile
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    /// 12-word phrase used for password recovery.
    pub recovery_phrase: String,
}

/// Input for recovering a forgotten password
#[derive(Debug, Deserialize)]
pub struct RecoverInput {
    pub username: String,
    pub recovery_phrase: String,
    pub new_password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication token response
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new profile
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthTokens> {
        validate_username(&input.username).map_err(|msg| AppError::Validation {
            field: "username".to_string(),
            message: msg.to_string(),
            message_hi: "उपयोगकर्ता नाम अमान्य है".to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
            message_hi: "पासवर्ड बहुत छोटा है".to_string(),
        })?;
        validate_recovery_phrase(&input.recovery_phrase).map_err(|msg| AppError::Validation {
            field: "recovery_phrase".to_string(),
            message: msg.to_string(),
            message_hi: "रिकवरी वाक्यांश में 12 शब्द होने चाहिए".to_string(),
        })?;

        let mut profiles = self.load_profiles().await?;
        if profiles
            .iter()
            .any(|profile| profile.username.eq_ignore_ascii_case(&input.username))
        {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|err| AppError::Internal(format!("Password hashing failed: {}", err)))?;

        profiles.push(UserProfile {
            username: input.username.clone(),
            password_hash,
            recovery_phrase_hash: hash_recovery_phrase(&input.recovery_phrase),
        });
        self.store.save_collection(PROFILES_KEY, &profiles).await?;

        tracing::info!(username = %input.username, "registered new profile");
        self.generate_tokens(&input.username)
    }

    /// Authenticate with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let profiles = self.load_profiles().await?;
        let profile = profiles
            .iter()
            .find(|profile| profile.username == username)
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &profile.password_hash)
            .map_err(|err| AppError::Internal(format!("Password verification failed: {}", err)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.generate_tokens(username)
    }

    /// Reset a password using the recovery phrase
    pub async fn recover(&self, input: RecoverInput) -> AppResult<()> {
        validate_password(&input.new_password).map_err(|msg| AppError::Validation {
            field: "new_password".to_string(),
            message: msg.to_string(),
            message_hi: "पासवर्ड बहुत छोटा है".to_string(),
        })?;

        let mut profiles = self.load_profiles().await?;
        let profile = profiles
            .iter_mut()
            .find(|profile| profile.username == input.username)
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        if profile.recovery_phrase_hash != hash_recovery_phrase(&input.recovery_phrase) {
            return Err(AppError::Unauthorized {
                message: "Recovery phrase does not match".to_string(),
                message_hi: "रिकवरी वाक्यांश मेल नहीं खाता".to_string(),
            });
        }

        profile.password_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|err| AppError::Internal(format!("Password hashing failed: {}", err)))?;
        self.store.save_collection(PROFILES_KEY, &profiles).await?;
        Ok(())
    }

    /// Load the profile list, clearing the slot when it is unreadable.
    async fn load_profiles(&self) -> AppResult<Vec<UserProfile>> {
        match self.store.get_raw(PROFILES_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(profiles) => Ok(profiles),
                Err(err) => {
                    tracing::error!(%err, "profile slot corrupted, clearing it");
                    self.store.delete(PROFILES_KEY).await?;
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Generate the access token
    fn generate_tokens(&self, username: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| AppError::Internal(format!("Token generation failed: {}", err)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}

/// Hash a recovery phrase after normalizing case and spacing, so the same
/// twelve words always match regardless of formatting.
pub fn hash_recovery_phrase(phrase: &str) -> String {
    let normalized = phrase
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let digest = Sha256::digest(normalized.as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_phrase_hash_ignores_formatting() {
        let a = hash_recovery_phrase("alpha beta gamma delta");
        let b = hash_recovery_phrase("  Alpha   BETA gamma\tdelta ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_recovery_phrase_hash_differs_for_different_phrases() {
        let a = hash_recovery_phrase("alpha beta gamma delta");
        let b = hash_recovery_phrase("alpha beta gamma epsilon");
        assert_ne!(a, b);
    }
}
