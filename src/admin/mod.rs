//! Admin surfaces: the product edit selector and the settings page

mod nonce;
pub mod selector;
pub mod settings_page;

pub use nonce::NonceIssuer;
#[allow(unused_imports)]
pub use selector::{SelectorOption, render_selector, selector_options};
pub use settings_page::{
    MENU, MenuEntry, SettingsSubmission, SubmissionOutcome, handle_submission,
    render_settings_page,
};

use serde::{Deserialize, Serialize};

/// The user making an admin request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdminUser {
    pub login: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl AdminUser {
    pub fn new<I, S>(login: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            login: login.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let user = AdminUser::new("admin", ["manage_options", "edit_products"]);
        assert!(user.can("manage_options"));
        assert!(!user.can("delete_site"));
        assert!(!AdminUser::default().can("manage_options"));
    }
}
