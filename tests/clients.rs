mod common;

use archflow::actions::clients;
use archflow::error::ActionError;
use archflow::models::{ClientCategory, ClientLegalType, ClientStatus, Page};
use chrono::Utc;
use pretty_assertions::assert_eq;

use common::{client_input, editor, viewer, MemoryStore};

#[tokio::test]
async fn create_persists_exact_fields() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let mut input = client_input("Casa Verde Ltda", "contato@casaverde.com.br");
    input.phone = Some("+55 11 5555-0101".into());
    input.website = Some("https://casaverde.com.br".into());
    input.legal_type = Some(ClientLegalType::Company);
    input.category = Some(ClientCategory::Residential);
    input.status = ClientStatus::Active;
    input.tags = vec!["vip".into()];

    let client = clients::create_client(&store, &session, input.clone()).await.unwrap();

    assert_eq!(client.name, input.name);
    assert_eq!(client.email, input.email);
    assert_eq!(client.phone, input.phone);
    assert_eq!(client.website, input.website);
    assert_eq!(client.status, ClientStatus::Active);
    assert_eq!(client.tags, vec!["vip".to_string()]);
    assert_eq!(client.user_id, Some(session.user_id));
    assert_eq!(client.deleted_at, None);
}

#[tokio::test]
async fn invalid_email_is_rejected_before_any_store_call() {
    let store = MemoryStore::new();
    let session = editor(&store);

    let err = clients::create_client(&store, &session, client_input("Casa Verde", "not-an-email"))
        .await
        .unwrap_err();

    let errors = err.field_errors().expect("validation error");
    assert!(errors.contains("email"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn short_name_and_bad_website_are_both_reported() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let mut input = client_input("A", "a@b.co");
    input.website = Some("ftp://files".into());

    let err = clients::create_client(&store, &session, input).await.unwrap_err();

    let errors = err.field_errors().unwrap();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "website"]);
}

#[tokio::test]
async fn viewers_cannot_create_clients() {
    let store = MemoryStore::new();
    let session = viewer(&store);

    let err = clients::create_client(&store, &session, client_input("Casa Verde", "a@b.co"))
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Unauthorized));
    assert!(store.clients().is_empty());
}

#[tokio::test]
async fn soft_delete_marks_inactive_and_hides_client() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let mut input = client_input("Casa Verde", "a@b.co");
    input.status = ClientStatus::Active;
    let client = clients::create_client(&store, &session, input).await.unwrap();
    let at = Utc::now();

    clients::soft_delete_client_at(&store, &session, client.id, at).await.unwrap();

    let stored = store.clients().into_iter().find(|c| c.id == client.id).unwrap();
    assert_eq!(stored.deleted_at, Some(at));
    assert_eq!(stored.status, ClientStatus::Inactive);
    let err = clients::get_client(&store, &session, client.id).await.unwrap_err();
    assert!(matches!(err, ActionError::NotFound("Client")));

    // A second delete finds nothing live
    let err = clients::soft_delete_client(&store, &session, client.id).await.unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));
}

#[tokio::test]
async fn update_replaces_fields() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let client = clients::create_client(&store, &session, client_input("Casa Verde", "a@b.co"))
        .await
        .unwrap();

    let mut input = client_input("Casa Azul", "azul@b.co");
    input.notes = Some("moved to a new office".into());
    let updated = clients::update_client(&store, &session, client.id, input).await.unwrap();

    assert_eq!(updated.id, client.id);
    assert_eq!(updated.name, "Casa Azul");
    assert_eq!(updated.notes.as_deref(), Some("moved to a new office"));
    assert_eq!(updated.created_at, client.created_at);
}

#[tokio::test]
async fn list_searches_and_paginates() {
    let store = MemoryStore::new();
    let session = editor(&store);
    for n in 0..12 {
        let name = format!("Residencia {n}");
        clients::create_client(&store, &session, client_input(&name, &format!("r{n}@studio.com")))
            .await
            .unwrap();
    }
    clients::create_client(&store, &session, client_input("Oficina Sul", "sul@oficina.com"))
        .await
        .unwrap();

    let first = clients::list_clients(&store, &session, None, Page::first(clients::DEFAULT_PAGE_SIZE))
        .await
        .unwrap();
    assert_eq!(first.total, 13);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.data.len(), 10);

    let found = clients::list_clients(&store, &session, Some("OFICINA"), Page::first(10))
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.data[0].name, "Oficina Sul");
}

#[tokio::test]
async fn store_failure_becomes_readable_message() {
    let store = MemoryStore::new();
    let session = editor(&store);
    store.fail("create_client");

    let err = clients::create_client(&store, &session, client_input("Casa Verde", "a@b.co"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to create client.");
}
