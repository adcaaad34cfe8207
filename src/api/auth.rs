use super::types::{Credentials, MessageResponse, NewPreferenceProfile, PreferenceProfile, TokenResponse, User};
use super::Backend;
use crate::config::SecretString;
use crate::gateway::{Call, Collaborator, Failure};

impl Backend {
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, Failure> {
        let call = Call::post(Collaborator::Auth, "/auth/signup").json(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        self.gateway().call(call).await?.json()
    }

    /// Form-encoded, as OAuth2 password flow expects.
    pub async fn login(&self, email: &str, password: &str) -> Result<SecretString, Failure> {
        let call = Call::post(Collaborator::Auth, "/auth/login")
            .form(&[("username", email), ("password", password)]);
        let token: TokenResponse = self.gateway().call(call).await?.json()?;
        if token.access_token.trim().is_empty() {
            return Err(Failure::ValidationError {
                message: "Empty access token".to_string(),
            });
        }
        Ok(SecretString::new(token.access_token))
    }

    pub async fn me(&self) -> Result<User, Failure> {
        let call = Call::get(Collaborator::Auth, "/auth/me").authed();
        self.gateway().call(call).await?.json()
    }

    pub async fn preferences(&self) -> Result<Vec<PreferenceProfile>, Failure> {
        let call = Call::get(Collaborator::Auth, "/preferences").authed();
        self.gateway().call(call).await?.json()
    }

    pub async fn save_preference(&self, profile: &NewPreferenceProfile) -> Result<PreferenceProfile, Failure> {
        let call = Call::post(Collaborator::Auth, "/preferences").authed().json(profile)?;
        self.gateway().call(call).await?.json()
    }

    pub async fn delete_preference(&self, id: i64) -> Result<(), Failure> {
        let call = Call::delete(Collaborator::Auth, format!("/preferences/{}", id)).authed();
        let _: MessageResponse = self.gateway().call(call).await?.json()?;
        Ok(())
    }
}
