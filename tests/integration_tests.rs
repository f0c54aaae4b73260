//! Integration tests for civicrm-user-sync

use civicrm_user_sync::{
    reconcile,
    utils::{
        MemoryCrm, MemoryMatchProvider, MemoryRoleDirectory, MemorySettingsStore,
        StrictSettingsValidator,
    },
    CandidateMatches, Contact, CrmMatchProvider, ExistingMatches, MatchProvider, Operation, Role,
    Settings, SettingsStore, SyncError, SyncManager, TomlSettingsStore, UserMatch, UsernameSource,
    WorkSummary,
};
use serde_json::json;

fn seeded_crm() -> MemoryCrm {
    let crm = MemoryCrm::new();
    crm.insert("Group", 1, json!({"title": "Members"}));
    crm.insert("Group", 2, json!({"title": "Staff"}));
    crm.insert("Tag", 7, json!({"name": "Volunteer"}));

    let contact = |group: u64, first: &str, last: &str| {
        json!({
            "domain_id": 1,
            "is_deleted": false,
            "group": [group],
            "tag": [],
            "email": format!("{}@example.org", first.to_lowercase()),
            "display_name": format!("{first} {last}"),
            "first_name": first,
            "last_name": last,
        })
    };
    crm.insert("Contact", 10, contact(1, "Ada", "Lovelace"));
    crm.insert("Contact", 11, contact(1, "Alan", "Turing"));
    crm.insert("Contact", 12, contact(2, "Grace", "Hopper"));

    crm.insert(
        "UFMatch",
        1,
        json!({"domain_id": 1, "contact_id": 11, "uf_id": 101, "uf_name": "Alan TURING"}),
    );
    crm.insert(
        "UFMatch",
        2,
        json!({"domain_id": 1, "contact_id": 12, "uf_id": 102, "uf_name": "Grace HOPPER"}),
    );
    crm.insert(
        "UFMatch",
        3,
        json!({"domain_id": 1, "contact_id": 13, "uf_id": 103, "uf_name": "Ada LOVELACE"}),
    );
    crm
}

fn roles() -> MemoryRoleDirectory {
    MemoryRoleDirectory::with_roles(vec![
        Role::new("anonymous", "Anonymous user"),
        Role::new("authenticated", "Authenticated user"),
        Role::new("member", "Member"),
    ])
}

#[tokio::test]
async fn test_complete_sync_planning_workflow() {
    let crm = seeded_crm();
    let store = MemorySettingsStore::new();

    // Configure the integration through the settings manager
    let mut settings = Settings::default();
    settings.groups.insert(1);
    settings.roles.insert("member".to_string());
    settings.username = UsernameSource::FirstAndLastName;
    settings.operations = Operation::ALL.into_iter().collect();

    let mut manager = SyncManager::new(
        CrmMatchProvider::new(crm.clone(), store.clone()),
        store,
        crm,
        roles(),
    );
    manager.save_settings(&settings).await.unwrap();

    let options = manager.settings_options().await.unwrap();
    assert_eq!(options.groups.len(), 2);
    assert!(!options.roles.contains_key("authenticated"));
    assert_eq!(manager.settings().await.unwrap(), settings);

    // Group 1 holds 10 and 11; 12 moved to group 2 and 13 is gone
    let summary = manager.work_summary().await.unwrap();
    assert_eq!(
        summary,
        WorkSummary {
            to_create: 1,
            to_update: 1,
            to_block: 2,
        }
    );
    assert_eq!(
        summary.to_string(),
        "Users to create: 1, to update: 1, to block: 2."
    );

    let plan = manager.plan().await.unwrap();
    let ops: Vec<(Operation, u64, Option<u64>)> = plan
        .items
        .iter()
        .map(|item| (item.operation, item.contact_id, item.user_id))
        .collect();
    assert_eq!(
        ops,
        vec![
            (Operation::Create, 10, None),
            (Operation::Update, 11, Some(101)),
            (Operation::Block, 12, Some(102)),
            (Operation::Block, 13, Some(103)),
        ]
    );
    // The blocked account still holds "Ada LOVELACE"
    assert_eq!(plan.items[0].username.as_deref(), Some("Ada LOVELACE 2"));
}

#[tokio::test]
async fn test_summary_counts_match_action_sets() {
    let crm = seeded_crm();
    let provider = CrmMatchProvider::new(crm.clone(), MemorySettingsStore::new());

    let existing = provider.existing_matches().await.unwrap();
    let candidates = provider.candidate_matches().await.unwrap();
    let actions = reconcile(&candidates, &existing);

    let manager = SyncManager::new(provider, MemorySettingsStore::new(), crm, roles());
    let summary = manager.work_summary().await.unwrap();

    assert_eq!(summary, WorkSummary::from_action_sets(&actions));
    assert_eq!(summary.to_create, actions.to_create.len());
    assert_eq!(summary.to_update, actions.to_update.len());
    assert_eq!(summary.to_block, actions.to_block.len());
}

#[tokio::test]
async fn test_saved_settings_reach_the_next_summary() {
    let crm = seeded_crm();
    let store = MemorySettingsStore::new();
    let mut manager = SyncManager::new(
        CrmMatchProvider::new(crm.clone(), store.clone()),
        store,
        crm,
        roles(),
    );

    // Every group applies: 10 is new, 11 and 12 have accounts, 13 is gone
    let before = manager.work_summary().await.unwrap();
    assert_eq!((before.to_create, before.to_update, before.to_block), (1, 2, 1));

    let mut settings = Settings::default();
    settings.groups.insert(2);
    settings.operations = Operation::ALL.into_iter().collect();
    manager.save_settings(&settings).await.unwrap();

    // Only 12 is left in group 2
    let after = manager.work_summary().await.unwrap();
    assert_eq!((after.to_create, after.to_update, after.to_block), (0, 1, 2));

    let plan = manager.plan().await.unwrap();
    assert_eq!(plan.items.len(), after.total());
}

#[tokio::test]
async fn test_duplicate_user_match_is_reported() {
    let crm = seeded_crm();
    crm.insert(
        "UFMatch",
        4,
        json!({"domain_id": 1, "contact_id": 11, "uf_id": 104}),
    );
    let provider = CrmMatchProvider::new(crm, MemorySettingsStore::new());

    let result = provider.existing_matches().await;
    assert!(matches!(result, Err(SyncError::MalformedRecord { .. })));
}

#[tokio::test]
async fn test_provider_failure_propagates() {
    let crm = seeded_crm();
    crm.insert("UFMatch", 4, json!({"domain_id": 1, "uf_id": 104}));

    let manager = SyncManager::new(
        CrmMatchProvider::new(crm.clone(), MemorySettingsStore::new()),
        MemorySettingsStore::new(),
        crm,
        roles(),
    );

    let result = manager.work_summary().await;
    assert!(matches!(result, Err(SyncError::MalformedRecord { .. })));
}

#[tokio::test]
async fn test_strict_validator_rejects_bad_role_names() {
    let mut manager = SyncManager::with_validator(
        MemoryMatchProvider::default(),
        MemorySettingsStore::new(),
        seeded_crm(),
        roles(),
        Box::new(StrictSettingsValidator),
    );

    let mut settings = Settings::default();
    settings.roles.insert("Member Role".to_string());

    let result = manager.save_settings(&settings).await;
    assert!(matches!(result, Err(SyncError::Validation(_))));
}

#[tokio::test]
async fn test_toml_store_with_sync_manager() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("civicrm_user.toml");

    let mut manager = SyncManager::new(
        MemoryMatchProvider::default(),
        TomlSettingsStore::new(&path),
        seeded_crm(),
        roles(),
    );
    assert_eq!(manager.settings().await.unwrap(), Settings::default());

    let mut settings = Settings::default();
    settings.domain_id = 3;
    settings.tags.insert(7);
    settings.user_readonly = true;
    manager.save_settings(&settings).await.unwrap();

    let reloaded = TomlSettingsStore::new(&path).load().await.unwrap();
    assert_eq!(reloaded, Some(settings));
}

#[test]
fn test_reconcile_scenarios() {
    let candidates = |ids: &[u64]| -> CandidateMatches {
        ids.iter().map(|id| (*id, Contact::new(*id))).collect()
    };
    let existing = |ids: &[u64]| -> ExistingMatches {
        ids.iter()
            .map(|id| (*id, UserMatch::new(*id, id + 100)))
            .collect()
    };

    let actions = reconcile(&candidates(&[]), &existing(&[]));
    assert_eq!(actions.counts(), (0, 0, 0));

    let actions = reconcile(&candidates(&[]), &existing(&[1, 2]));
    assert_eq!(actions.to_block.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(actions.counts(), (0, 0, 2));

    let actions = reconcile(&candidates(&[1]), &existing(&[]));
    assert_eq!(actions.to_create.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(actions.counts(), (1, 0, 0));
}
