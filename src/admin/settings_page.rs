//! Settings page: menu entry, form handling and rendering

use super::{AdminUser, NonceIssuer};
use crate::error::{RelatedError, Result};
use crate::relations::{EmptyBehavior, Settings};
use crate::store::OptionStore;
use crate::template::TemplateEngine;
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Admin menu registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub parent: &'static str,
    pub page_title: &'static str,
    pub menu_title: &'static str,
    pub capability: &'static str,
    pub slug: &'static str,
    pub priority: i32,
}

pub const MENU: MenuEntry = MenuEntry {
    parent: "woocommerce",
    page_title: "Custom Related Products",
    menu_title: "Custom Related Products",
    capability: "manage_options",
    slug: "custom_related_products",
    priority: 99,
};

pub const NONCE_ACTION: &str = "custom_related_products";
pub const NONCE_FIELD: &str = "_custom_related_products_nonce";

/// Posted settings form fields
///
/// A checkbox is present only when checked, so `reciprocate` carries its
/// value only to mark presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsSubmission {
    #[serde(rename = "submit_custom_related_products")]
    pub submit: Option<String>,
    #[serde(rename = "crpr_empty_behavior")]
    pub empty_behavior: Option<String>,
    #[serde(rename = "reciprocate_related_ids")]
    pub reciprocate: Option<String>,
    #[serde(rename = "_custom_related_products_nonce")]
    pub nonce: Option<String>,
}

impl SettingsSubmission {
    fn settings(&self) -> Result<Settings> {
        let empty_behavior = EmptyBehavior::from_form(self.empty_behavior.as_deref().unwrap_or(""))?;
        Ok(Settings {
            empty_behavior,
            reciprocate: self.reciprocate.is_some(),
        })
    }
}

/// Result of handling a settings request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Nothing submitted; show the current settings
    Displayed,
    Saved(Settings),
}

/// Handle a request to the settings page
///
/// Every request needs the menu capability; a submission also needs a valid
/// token. Nothing is written unless the whole form is valid.
pub fn handle_submission<S: OptionStore + ?Sized>(
    options: &mut S,
    user: &AdminUser,
    nonces: &NonceIssuer,
    form: &SettingsSubmission,
) -> Result<SubmissionOutcome> {
    authorize(user)?;

    if form.submit.is_none() {
        return Ok(SubmissionOutcome::Displayed);
    }

    if !nonces.verify(NONCE_ACTION, &user.login, form.nonce.as_deref()) {
        warn!(user = %user.login, "settings submission with invalid token");
        return Err(RelatedError::InvalidNonce {
            action: NONCE_ACTION.to_string(),
        });
    }

    let settings = form.settings()?;
    settings.save(options)?;
    info!(user = %user.login, ?settings, "settings saved");

    Ok(SubmissionOutcome::Saved(settings))
}

/// Settings page markup with the current values and a fresh token
pub fn render_settings_page<S: OptionStore + ?Sized>(
    engine: &TemplateEngine,
    options: &S,
    user: &AdminUser,
    nonces: &NonceIssuer,
    saved: bool,
) -> Result<String> {
    authorize(user)?;
    let settings = Settings::load(options)?;

    engine.render(
        "settings.html",
        context! {
            title => MENU.page_title,
            slug => MENU.slug,
            nonce_field => NONCE_FIELD,
            nonce => nonces.create(NONCE_ACTION, &user.login),
            show_none => settings.empty_behavior == EmptyBehavior::None,
            reciprocate => settings.reciprocate,
            saved => saved,
        },
    )
}

fn authorize(user: &AdminUser) -> Result<()> {
    if user.can(MENU.capability) {
        Ok(())
    } else {
        warn!(user = %user.login, "settings page access denied");
        Err(RelatedError::Forbidden {
            user: user.login.clone(),
            capability: MENU.capability.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::settings::{EMPTY_BEHAVIOR_OPTION, RECIPROCATE_OPTION};
    use crate::store::SqliteStore;

    fn admin() -> AdminUser {
        AdminUser::new("admin", ["manage_options"])
    }

    fn issuer() -> NonceIssuer {
        NonceIssuer::new("test-secret")
    }

    fn submission(empty_behavior: &str, reciprocate: bool) -> SettingsSubmission {
        SettingsSubmission {
            submit: Some("Save".into()),
            empty_behavior: Some(empty_behavior.into()),
            reciprocate: reciprocate.then(|| "on".to_string()),
            nonce: Some(issuer().create(NONCE_ACTION, "admin")),
        }
    }

    #[test]
    fn test_submission_saves_settings() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let outcome =
            handle_submission(&mut store, &admin(), &issuer(), &submission("none", true)).unwrap();

        let expected = Settings {
            empty_behavior: EmptyBehavior::None,
            reciprocate: true,
        };
        assert_eq!(outcome, SubmissionOutcome::Saved(expected));
        assert_eq!(Settings::load(&store).unwrap(), expected);
    }

    #[test]
    fn test_defaults_delete_options() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        handle_submission(&mut store, &admin(), &issuer(), &submission("none", true)).unwrap();
        handle_submission(&mut store, &admin(), &issuer(), &submission("", false)).unwrap();

        assert!(store.get_option(EMPTY_BEHAVIOR_OPTION).unwrap().is_none());
        assert!(store.get_option(RECIPROCATE_OPTION).unwrap().is_none());
    }

    #[test]
    fn test_display_without_submit() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let outcome = handle_submission(
            &mut store,
            &admin(),
            &issuer(),
            &SettingsSubmission::default(),
        )
        .unwrap();
        assert_eq!(outcome, SubmissionOutcome::Displayed);
    }

    #[test]
    fn test_requires_capability() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let editor = AdminUser::new("editor", ["edit_products"]);

        let err = handle_submission(&mut store, &editor, &issuer(), &submission("none", true))
            .unwrap_err();
        assert!(matches!(err, RelatedError::Forbidden { .. }));
        assert!(err.is_request_fatal());
        assert_eq!(Settings::load(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_requires_valid_token() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let mut form = submission("none", true);
        form.nonce = Some("forged".into());
        let err = handle_submission(&mut store, &admin(), &issuer(), &form).unwrap_err();
        assert!(matches!(err, RelatedError::InvalidNonce { .. }));

        form.nonce = None;
        let err = handle_submission(&mut store, &admin(), &issuer(), &form).unwrap_err();
        assert!(matches!(err, RelatedError::InvalidNonce { .. }));

        assert_eq!(Settings::load(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_behavior_writes_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = handle_submission(&mut store, &admin(), &issuer(), &submission("random", true))
            .unwrap_err();

        assert!(matches!(err, RelatedError::InvalidOption { .. }));
        assert!(store.get_option(RECIPROCATE_OPTION).unwrap().is_none());
    }

    #[test]
    fn test_submission_from_form_fields() {
        let form: SettingsSubmission = serde_json::from_value(serde_json::json!({
            "submit_custom_related_products": "Save",
            "crpr_empty_behavior": "none",
            "_custom_related_products_nonce": "abc",
        }))
        .unwrap();

        assert!(form.submit.is_some());
        assert_eq!(form.empty_behavior.as_deref(), Some("none"));
        assert!(form.reciprocate.is_none());
    }

    #[test]
    fn test_render_reflects_settings() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        Settings {
            empty_behavior: EmptyBehavior::None,
            reciprocate: true,
        }
        .save(&mut store)
        .unwrap();

        let engine = TemplateEngine::new().unwrap();
        let html = render_settings_page(&engine, &store, &admin(), &issuer(), true).unwrap();

        assert!(html.contains("Settings saved"));
        assert!(html.contains(r#"<option value="none" selected="selected">"#));
        assert!(html.contains(r#"name="reciprocate_related_ids" checked"#));
        assert!(html.contains(&issuer().create(NONCE_ACTION, "admin")));
        assert!(html.contains("admin.php?page=custom_related_products"));
    }

    #[test]
    fn test_render_defaults() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = TemplateEngine::new().unwrap();
        let html = render_settings_page(&engine, &store, &admin(), &issuer(), false).unwrap();

        assert!(!html.contains("Settings saved"));
        assert!(!html.contains(r#"selected="selected""#));
        assert!(!html.contains("checked"));
    }

    #[test]
    fn test_render_requires_capability() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = TemplateEngine::new().unwrap();
        let err = render_settings_page(&engine, &store, &AdminUser::default(), &issuer(), false)
            .unwrap_err();
        assert!(matches!(err, RelatedError::Forbidden { .. }));
    }
}
