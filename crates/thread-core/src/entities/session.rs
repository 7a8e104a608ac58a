//! Author identity - explicit session values, never ambient state

/// Stock avatar shown when the identity provider has no picture
pub const DEFAULT_AVATAR_URL: &str =
    "https://res.cloudinary.com/dfcsc86hq/image/upload/v1710148876/udyyvroza4g9oyct0kvf.png";

/// Identity as returned by the external provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
}

/// The author identity passed into every operation that writes on behalf of
/// a user. Fields may be empty; accessors substitute the fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub email: String,
    pub picture: String,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            picture: picture.into(),
        }
    }

    /// Session for a signed-out viewer
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session from a provider profile
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.display_name.clone(),
            email: profile.email.clone(),
            picture: profile.avatar_url.clone(),
        }
    }

    /// Display name, falling back to `"Unknown User"`
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown User"
        } else {
            &self.name
        }
    }

    /// Email, falling back to `"unknown@example.com"`
    pub fn author_email(&self) -> &str {
        if self.email.is_empty() {
            "unknown@example.com"
        } else {
            &self.email
        }
    }

    /// Avatar URL, falling back to the stock avatar
    pub fn avatar_url(&self) -> &str {
        if self.picture.is_empty() {
            DEFAULT_AVATAR_URL
        } else {
            &self.picture
        }
    }
}
