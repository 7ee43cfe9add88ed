//! Canned share messages for the station and the app.
//!
//! A terminal has no share sheet, so the payload is handed to the system's
//! mail client through a `mailto:` URL.

use thiserror::Error;

use crate::auth::UserProfile;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Please log in to share RadioRadioX content.")]
    LoginRequired,

    #[error("Failed to share content: {0}")]
    Open(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Station,
    App,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 2] = [ShareTarget::Station, ShareTarget::App];

    pub fn card_title(self) -> &'static str {
        match self {
            ShareTarget::Station => "Share Radio Station",
            ShareTarget::App => "Share Mobile App",
        }
    }

    pub fn card_description(self) -> &'static str {
        match self {
            ShareTarget::Station => "Tell your friends about RadioRadioX",
            ShareTarget::App => "Recommend the RadioRadioX app",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub message: String,
    pub url: String,
}

impl SharePayload {
    pub fn for_target(target: ShareTarget, config: &Config) -> Self {
        match target {
            ShareTarget::Station => Self {
                title: "RadioRadioX".to_string(),
                message: "🎵 Check out RadioRadioX - Your favorite internet radio station! Listen now at RadioRadioX.com".to_string(),
                url: config.station_url.clone(),
            },
            ShareTarget::App => Self {
                title: "RadioRadioX App".to_string(),
                message: "📱 Download the RadioRadioX app and listen to great music anywhere!"
                    .to_string(),
                url: config.app_url.clone(),
            },
        }
    }

    /// Message body: the canned text, a blank line, then the link.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.message, self.url)
    }

    /// `mailto:` URL with the title as subject and [`Self::text`] as body.
    ///
    /// Spaces are encoded as `%20`; mail clients do not treat `+` as a space.
    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:?subject={}&body={}",
            encode_component(&self.title),
            encode_component(&self.text())
        )
    }
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Builds the payload for a signed-in listener; guests are refused.
pub fn prepare(
    target: ShareTarget,
    user: Option<&UserProfile>,
    config: &Config,
) -> Result<SharePayload, ShareError> {
    if user.is_none() {
        return Err(ShareError::LoginRequired);
    }
    Ok(SharePayload::for_target(target, config))
}

/// Hands the payload to the system mail client.
pub fn hand_off(payload: &SharePayload) -> Result<(), ShareError> {
    let url = payload.mailto_url();
    open::that(&url)?;
    tracing::info!(title = %payload.title, "Shared content");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listener() -> UserProfile {
        UserProfile {
            email: "a@b.com".to_string(),
            name: "Al".to_string(),
        }
    }

    #[test]
    fn test_guest_cannot_share() {
        let config = Config::default();
        for target in ShareTarget::ALL {
            assert!(matches!(
                prepare(target, None, &config),
                Err(ShareError::LoginRequired)
            ));
        }
    }

    #[test]
    fn test_station_payload() {
        let config = Config::default();
        let payload = prepare(ShareTarget::Station, Some(&listener()), &config).unwrap();
        assert_eq!(payload.title, "RadioRadioX");
        assert_eq!(
            payload.text(),
            "🎵 Check out RadioRadioX - Your favorite internet radio station! Listen now at RadioRadioX.com\n\nhttps://radioradiox.com"
        );
    }

    #[test]
    fn test_app_payload_uses_configured_url() {
        let config = Config {
            app_url: "https://example.com/get".to_string(),
            ..Config::default()
        };
        let payload = SharePayload::for_target(ShareTarget::App, &config);
        assert_eq!(payload.title, "RadioRadioX App");
        assert!(payload.text().ends_with("\n\nhttps://example.com/get"));
    }

    #[test]
    fn test_mailto_encoding() {
        let payload = SharePayload {
            title: "Radio X".to_string(),
            message: "a&b".to_string(),
            url: "https://x.test/?q=1".to_string(),
        };
        assert_eq!(
            payload.mailto_url(),
            "mailto:?subject=Radio%20X&body=a%26b%0A%0Ahttps%3A%2F%2Fx.test%2F%3Fq%3D1"
        );
    }
}
