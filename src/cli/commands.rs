//! CLI command implementations

use super::output::{HookInfo, OutputEvent, OutputHandler};
use crate::admin::settings_page::NONCE_ACTION;
use crate::admin::{self, MENU, NonceIssuer, SettingsSubmission, SubmissionOutcome};
use crate::config::AppConfig;
use crate::relations::{
    EntityId, ExtensionPoint, RelatedList, Settings, Taxonomy, hooks, pipeline, save,
};
use crate::store::{Product, SqliteStore};
use crate::template::TemplateEngine;
use anyhow::{Context, Result};

/// Print an entity's stored related list
pub fn show(store: &SqliteStore, entity: EntityId, handler: &dyn OutputHandler) -> Result<()> {
    let list = RelatedList::load(store, entity)?;
    handler.emit(OutputEvent::RelatedList {
        entity,
        present: list.is_some(),
        ids: list.map(|l| l.ids().to_vec()).unwrap_or_default(),
    });
    Ok(())
}

/// Save an edit-form selection
///
/// A form with nothing selected sends no field at all, so no IDs behaves like
/// `clear` and deletes the list.
pub fn save_related(
    store: &mut SqliteStore,
    entity: EntityId,
    ids: &[String],
    clear: bool,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let settings = Settings::load(store)?;
    let submitted = (!clear && !ids.is_empty()).then_some(ids);

    let report = save::save_related(store, &settings, entity, submitted)
        .with_context(|| format!("saving related products for {}", entity))?;

    handler.emit(OutputEvent::Saved { report });
    Ok(())
}

/// Evaluate the display-forcing decision
pub fn force_display(
    store: &SqliteStore,
    entity: EntityId,
    host_value: bool,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let value = hooks::force_display(store, entity, host_value)?;
    handler.emit(OutputEvent::Decision {
        hook: ExtensionPoint::ForceDisplay.hook_name().to_string(),
        entity,
        host_value,
        value,
    });
    Ok(())
}

/// Evaluate the taxonomy-relevance decision
pub fn relevance(
    store: &SqliteStore,
    entity: EntityId,
    taxonomy: Taxonomy,
    host_value: bool,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let settings = Settings::load(store)?;
    let value = hooks::relate_by_taxonomy(store, &settings, entity, taxonomy, host_value)?;

    let hook = ExtensionPoint::ALL
        .into_iter()
        .find(|point| point.taxonomy() == Some(taxonomy))
        .map(ExtensionPoint::hook_name)
        .unwrap_or_default();
    handler.emit(OutputEvent::Decision {
        hook: hook.to_string(),
        entity,
        host_value,
        value,
    });
    Ok(())
}

/// Print the related-products query the host would run
pub fn query(
    store: &SqliteStore,
    entity: EntityId,
    limit: usize,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let settings = Settings::load(store)?;
    match pipeline::build_query(store, &settings, entity, limit)? {
        Some(query) => handler.emit(OutputEvent::Query {
            entity,
            sql: query.to_sql(),
        }),
        None => handler.emit(OutputEvent::Info {
            message: format!("no related products query for {}", entity),
        }),
    }
    Ok(())
}

/// Look up the related products shown for an entity
pub fn related_products(
    store: &SqliteStore,
    entity: EntityId,
    limit: usize,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let settings = Settings::load(store)?;
    let ids = pipeline::related_products(store, &settings, entity, limit)?;
    handler.emit(OutputEvent::RelatedProducts { entity, ids });
    Ok(())
}

/// Render the product edit screen selector
pub fn selector(
    engine: &TemplateEngine,
    store: &SqliteStore,
    entity: EntityId,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let html = admin::render_selector(engine, store, entity)?;
    handler.emit(OutputEvent::Markup { html });
    Ok(())
}

/// Print the current settings
pub fn settings_show(store: &SqliteStore, handler: &dyn OutputHandler) -> Result<()> {
    let settings = Settings::load(store)?;
    handler.emit(OutputEvent::Settings { settings });
    Ok(())
}

/// Issue a settings-form token for the configured admin user
pub fn settings_token(config: &AppConfig, handler: &dyn OutputHandler) -> Result<()> {
    let nonces = nonce_issuer(config)?;
    let user = config.admin_user();
    handler.emit(OutputEvent::Token {
        action: NONCE_ACTION.to_string(),
        token: nonces.create(NONCE_ACTION, &user.login),
    });
    Ok(())
}

/// Submit the settings form
pub fn settings_submit(
    store: &mut SqliteStore,
    config: &AppConfig,
    empty_behavior: Option<String>,
    reciprocate: bool,
    token: Option<String>,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let nonces = nonce_issuer(config)?;
    let user = config.admin_user();

    let form = SettingsSubmission {
        submit: Some("Save".to_string()),
        empty_behavior,
        reciprocate: reciprocate.then(|| "on".to_string()),
        nonce: token,
    };

    match admin::handle_submission(store, &user, &nonces, &form)? {
        SubmissionOutcome::Saved(settings) => {
            handler.emit(OutputEvent::SettingsSaved { settings })
        }
        SubmissionOutcome::Displayed => settings_show(store, handler)?,
    }
    Ok(())
}

/// Render the settings page
pub fn settings_render(
    engine: &TemplateEngine,
    store: &SqliteStore,
    config: &AppConfig,
    saved: bool,
    handler: &dyn OutputHandler,
) -> Result<()> {
    let nonces = nonce_issuer(config)?;
    let user = config.admin_user();
    let html = admin::render_settings_page(engine, store, &user, &nonces, saved)?;
    handler.emit(OutputEvent::Markup { html });
    Ok(())
}

/// Add or replace a catalog product
pub fn catalog_add(
    store: &mut SqliteStore,
    product: Product,
    categories: &[u64],
    tags: &[u64],
    handler: &dyn OutputHandler,
) -> Result<()> {
    store.upsert_product(&product, categories, tags)?;
    handler.emit(OutputEvent::Info {
        message: format!("✓ Stored product {}", product.formatted_name()),
    });
    Ok(())
}

/// List catalog products
pub fn catalog_list(store: &SqliteStore, handler: &dyn OutputHandler) -> Result<()> {
    let products = store.list_products()?;
    handler.emit(OutputEvent::Catalog { products });
    Ok(())
}

/// List the registered callbacks and the admin menu entry
pub fn list_hooks(handler: &dyn OutputHandler) {
    let mut hooks: Vec<HookInfo> = ExtensionPoint::ALL
        .iter()
        .map(|point| HookInfo {
            name: point.hook_name().to_string(),
            priority: point.priority(),
        })
        .collect();
    hooks.push(HookInfo {
        name: format!("admin_menu ({} > {})", MENU.parent, MENU.slug),
        priority: MENU.priority,
    });

    handler.emit(OutputEvent::Hooks { hooks });
}

fn nonce_issuer(config: &AppConfig) -> Result<NonceIssuer> {
    let secret = config
        .admin
        .nonce_secret
        .as_deref()
        .context("admin.nonce_secret is not configured")?;
    Ok(NonceIssuer::new(secret))
}
