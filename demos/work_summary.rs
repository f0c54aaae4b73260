//! Work summary example: configure the integration, then preview the sync

use civicrm_user_sync::utils::{MemoryCrm, MemoryRoleDirectory, MemorySettingsStore};
use civicrm_user_sync::{CrmMatchProvider, Operation, Role, Settings, SyncManager, UsernameSource};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("CiviCRM User Sync - Work Summary Example\n");

    // 1. Seed an in-memory CRM
    let crm = MemoryCrm::new();
    crm.insert("Group", 1, json!({"title": "Members"}));
    crm.insert("Tag", 3, json!({"name": "Newsletter"}));
    for (id, first, last) in [(10, "Ada", "Lovelace"), (11, "Alan", "Turing")] {
        crm.insert(
            "Contact",
            id,
            json!({
                "domain_id": 1,
                "is_deleted": false,
                "group": [1],
                "tag": [],
                "first_name": first,
                "last_name": last,
            }),
        );
    }
    crm.insert("UFMatch", 1, json!({"domain_id": 1, "contact_id": 11, "uf_id": 2}));
    crm.insert("UFMatch", 2, json!({"domain_id": 1, "contact_id": 12, "uf_id": 3}));

    let roles = MemoryRoleDirectory::with_roles(vec![
        Role::new("anonymous", "Anonymous user"),
        Role::new("authenticated", "Authenticated user"),
        Role::new("member", "Member"),
    ]);
    let store = MemorySettingsStore::new();

    // 2. Save settings
    let mut settings = Settings::default();
    settings.groups.insert(1);
    settings.roles.insert("member".to_string());
    settings.username = UsernameSource::FirstAndLastName;
    settings.operations = [Operation::Create, Operation::Update].into_iter().collect();

    let provider = CrmMatchProvider::new(crm.clone(), store.clone());
    let mut manager = SyncManager::new(provider, store, crm, roles);

    let options = manager.settings_options().await?;
    println!("Assignable roles:");
    for (id, label) in &options.roles {
        println!("  {id} - {label}");
    }
    println!();

    manager.save_settings(&settings).await?;

    // 3. Preview the work
    let summary = manager.work_summary().await?;
    println!("{summary}\n");

    let plan = manager.plan().await?;
    for operation in Operation::ALL {
        println!("{} queue:", operation.label());
        for item in plan.items_for(operation) {
            println!(
                "  contact {} user {:?} username {:?}",
                item.contact_id, item.user_id, item.username
            );
        }
    }
    println!(
        "Skipped (disabled operations): {} to block",
        plan.skipped.to_block
    );

    Ok(())
}
