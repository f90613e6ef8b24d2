use crate::redis::model::{parse_json, RedisKey, RedisValue};
use kernel::model::auth::{AccessToken, ExternalIdentity};
use shared::error::AppError;

pub struct AuthorizationKey(String);
pub struct CachedIdentity(pub ExternalIdentity);

impl From<&AccessToken> for AuthorizationKey {
    fn from(token: &AccessToken) -> Self {
        Self(token.0.clone())
    }
}

impl RedisKey for AuthorizationKey {
    type Value = CachedIdentity;

    fn inner(&self) -> String {
        format!("auth:{}", self.0)
    }
}

impl RedisValue for CachedIdentity {
    fn inner(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl TryFrom<String> for CachedIdentity {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_json(&value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_identity_survives_redis_string_form() {
        let identity = ExternalIdentity {
            subject: "auth0|abc".into(),
            email: "member@example.com".into(),
            name: "Member".into(),
        };
        let raw = CachedIdentity(identity.clone()).inner();
        let restored = CachedIdentity::try_from(raw).unwrap();
        assert_eq!(restored.0, identity);
        assert_eq!(
            AuthorizationKey::from(&AccessToken("tok".into())).inner(),
            "auth:tok"
        );
    }
}
