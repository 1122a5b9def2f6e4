use crate::application_port::{AccessToken, AuthError, IssuedToken, TokenCodec};
use crate::domain_model::{Principal, UserId};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub ttl: Duration,
    pub signing_key: Vec<u8>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String, // user id
    jti: String, // username
    iat: i64,
    nbf: i64,
    exp: i64,
}

/// HS256 bearer tokens. Temporal validation is done here rather than by
/// `jsonwebtoken` so that expiry is strict (`now < exp`) with no leeway.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[cfg.issuer.as_str()]);
        validation.set_required_spec_claims(&["iss", "sub", "exp", "nbf"]);

        JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(&cfg.signing_key),
            decoding_key: DecodingKey::from_secret(&cfg.signing_key),
            validation,
            cfg,
        }
    }

    fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let exp_dt = now + self.cfg.ttl;
        let claims = Claims {
            iss: self.cfg.issuer.clone(),
            sub: principal.subject().to_string(),
            jti: principal.label().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp_dt.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing: {e}")))?;
        Ok(IssuedToken {
            token: AccessToken(token),
            expires_at: exp_dt,
        })
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims = data.claims;

        let now = now.timestamp();
        if now < claims.nbf || now >= claims.exp {
            return Err(AuthError::InvalidToken);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Principal::new(UserId(claims.sub), claims.jti))
    }
}

impl TokenCodec for JwtHs256Codec {
    fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        self.issue_at(principal, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.verify_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            issuer: "inkpost".to_string(),
            ttl: Duration::hours(24),
            signing_key: secret.as_bytes().to_vec(),
        })
    }

    fn alice() -> Principal {
        Principal::new(UserId::from("user-alice"), "alice")
    }

    #[test]
    fn issued_token_verifies_to_same_principal() {
        let codec = codec("secret");
        let issued = codec.issue(&alice()).unwrap();
        let principal = codec.verify(&issued.token.0).unwrap();
        assert_eq!(principal, alice());
        assert_eq!(principal.subject().as_str(), "user-alice");
        assert_eq!(principal.label(), "alice");
    }

    #[test]
    fn token_has_three_parts_and_expires_after_window() {
        let codec = codec("secret");
        let now = Utc::now();
        let issued = codec.issue_at(&alice(), now).unwrap();
        assert_eq!(issued.token.0.split('.').count(), 3);
        assert_eq!(
            issued.expires_at.timestamp(),
            (now + Duration::hours(24)).timestamp()
        );
    }

    #[test]
    fn expiry_is_strict() {
        let codec = codec("secret");
        let now = Utc::now();
        let issued = codec.issue_at(&alice(), now).unwrap();
        let exp = now + Duration::hours(24);

        assert!(codec.verify_at(&issued.token.0, exp - Duration::seconds(1)).is_ok());
        assert!(matches!(
            codec.verify_at(&issued.token.0, exp),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected_by_wall_clock() {
        let codec = codec("secret");
        let issued = codec
            .issue_at(&alice(), Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(
            codec.verify(&issued.token.0),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_not_yet_valid_is_rejected() {
        let codec = codec("secret");
        let issued = codec
            .issue_at(&alice(), Utc::now() + Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            codec.verify(&issued.token.0),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let issued = codec("other-secret").issue(&alice()).unwrap();
        assert!(matches!(
            codec("secret").verify(&issued.token.0),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let foreign = JwtHs256Codec::new(JwtConfig {
            issuer: "someone-else".to_string(),
            ttl: Duration::hours(1),
            signing_key: b"secret".to_vec(),
        });
        let issued = foreign.issue(&alice()).unwrap();
        assert!(codec("secret").verify(&issued.token.0).is_err());
    }

    #[test]
    fn other_hmac_algorithm_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "inkpost".to_string(),
            sub: "user-alice".to_string(),
            jti: "alice".to_string(),
            iat: now,
            nbf: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(matches!(
            codec("secret").verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = codec("secret");
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert!(matches!(codec.verify(token), Err(AuthError::InvalidToken)));
        }
        let mut token = codec.issue(&alice()).unwrap().token.0;
        token.push('x');
        assert!(matches!(codec.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = JwtConfig {
            issuer: "inkpost".to_string(),
            ttl: Duration::hours(1),
            signing_key: b"top-secret".to_vec(),
        };
        assert!(!format!("{cfg:?}").contains("top-secret"));
    }
}
