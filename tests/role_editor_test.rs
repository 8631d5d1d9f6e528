use std::sync::Arc;
use std::time::Duration;

use resource_console::clients::{EditorClient, RoleClient};
use resource_console::confirm::GatePhase;
use resource_console::framework::mock::MockGateway;
use resource_console::framework::{DetailState, EditorContext, EditorError, SaveOutcome};
use resource_console::gateway::{AssociationScope, GatewayError};
use resource_console::model::{Role, RoleDraft, UserSummary};
use resource_console::runtime::{Console, ConsoleConfig, ErrorChannel, ErrorReporter};

const WAIT: Duration = Duration::from_secs(2);

fn admin() -> Role {
    Role::new(2, "admin", "all access")
}

fn console(mock: &MockGateway<Role>) -> Console {
    Console::new(ConsoleConfig::default(), mock.gateway())
}

/// Opens role 2 and waits until its first read settles.
async fn open_loaded(console: &Console) -> RoleClient {
    let editor = console.open_role(2);
    let client = editor.client.clone();
    client.wait_loaded(WAIT).await.unwrap();
    client
}

#[tokio::test]
async fn test_loaded_record_fills_draft_and_disables_save() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);

    let client = open_loaded(&console).await;
    let view = client.view(console.config());

    assert!(!view.show_spinner);
    assert_eq!(view.field("name").unwrap().value, "admin");
    assert_eq!(view.field("note").unwrap().value, "all access");
    assert!(view.show_save);
    assert!(!view.save_enabled);
    assert!(view.show_delete);
    assert!(!view.confirm_dialog);
    mock.verify();
}

#[tokio::test]
async fn test_editing_enables_save_and_reverting_disables_it() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    assert!(client.set_name("auditor").await.unwrap());
    assert!(client.view(console.config()).save_enabled);

    client.set_name("admin").await.unwrap();
    assert!(!client.view(console.config()).save_enabled);

    client.set_note("").await.unwrap();
    assert!(client.view(console.config()).save_enabled);
}

#[tokio::test]
async fn test_blank_name_blocks_save_without_request() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("   ").await.unwrap();
    let outcome = client.save().await.unwrap();

    let SaveOutcome::Invalid(errors) = outcome else {
        panic!("expected field errors, got {outcome:?}");
    };
    assert_eq!(errors.get("name"), Some("name is required"));

    let view = client.view(console.config());
    assert_eq!(view.field_errors().count(), 1);
    assert_eq!(view.field("name").unwrap().error, Some("name is required"));
    assert!(view.save_enabled, "invalid drafts keep the button enabled");
    assert!(mock.updates().is_empty());
    assert_eq!(console.errors().current(), None);
    mock.verify();
}

#[tokio::test]
async fn test_save_sends_draft_and_rebaselines_to_response() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    // The server trims the note.
    mock.expect_update(2)
        .return_ok(Role::new(2, "auditor", "read only"));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("auditor").await.unwrap();
    client.set_note("read only  ").await.unwrap();
    assert_eq!(client.save().await.unwrap(), SaveOutcome::Submitted);
    let snapshot = client.wait_settled(WAIT).await.unwrap();

    assert_eq!(
        mock.updates(),
        vec![(
            2,
            RoleDraft {
                name: "auditor".into(),
                note: "read only  ".into(),
            }
        )]
    );
    let ready = snapshot.ready().unwrap();
    assert_eq!(ready.record, Role::new(2, "auditor", "read only"));
    assert_eq!(ready.draft.note, "read only");
    assert!(!ready.is_dirty());
    assert!(!client.view(console.config()).save_enabled);
    mock.verify();
}

#[tokio::test]
async fn test_save_in_flight_ignores_duplicate_submissions() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let release = mock.expect_update(2).hold_ok(Role::new(2, "auditor", "all access"));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("auditor").await.unwrap();
    assert_eq!(client.save().await.unwrap(), SaveOutcome::Submitted);
    assert!(!client.view(console.config()).save_enabled);
    assert_eq!(client.save().await.unwrap(), SaveOutcome::Ignored);

    release.release();
    client.wait_settled(WAIT).await.unwrap();
    assert_eq!(mock.updates().len(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_save_payload_is_captured_at_submit() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let release = mock.expect_update(2).hold_ok(Role::new(2, "auditor", "all access"));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("auditor").await.unwrap();
    client.save().await.unwrap();
    client.set_note("typed while saving").await.unwrap();

    release.release();
    client.wait_settled(WAIT).await.unwrap();
    assert_eq!(mock.updates()[0].1.note, "all access");
}

#[tokio::test]
async fn test_save_settling_after_teardown_is_discarded() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let release = mock.expect_update(2).hold_ok(Role::new(2, "auditor", ""));
    let console = console(&mock);

    let editor = console.open_role(2);
    let client = editor.client.clone();
    client.wait_loaded(WAIT).await.unwrap();
    client.set_name("auditor").await.unwrap();
    client.save().await.unwrap();

    editor.shutdown().await.unwrap();
    release.release();
    tokio::task::yield_now().await;

    let snapshot = client.snapshot();
    let ready = snapshot.ready().unwrap();
    assert_eq!(ready.record, admin());
    assert!(ready.is_saving);
    assert_eq!(console.errors().current(), None);
    assert_eq!(
        client.set_name("late").await,
        Err(resource_console::role_editor::RoleError::Editor(
            EditorError::ControllerClosed
        ))
    );
}

#[tokio::test]
async fn test_failed_save_keeps_draft_and_reports() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_update(2)
        .return_err(GatewayError::Transport("connection reset".into()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("auditor").await.unwrap();
    client.save().await.unwrap();
    let snapshot = client.wait_settled(WAIT).await.unwrap();

    let ready = snapshot.ready().unwrap();
    assert_eq!(ready.draft.name, "auditor");
    assert_eq!(ready.record, admin());
    assert!(client.view(console.config()).save_enabled);
    assert_eq!(
        console.errors().current().as_deref(),
        Some("Transport error: connection reset")
    );
    mock.verify();
}

#[tokio::test]
async fn test_server_rejection_is_reported_globally() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_update(2)
        .return_err(GatewayError::ValidationRejected("name taken".into()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("owner").await.unwrap();
    client.save().await.unwrap();
    client.wait_settled(WAIT).await.unwrap();

    let view = client.view(console.config());
    assert_eq!(view.field_errors().count(), 0);
    assert_eq!(
        console.errors().current().as_deref(),
        Some("Rejected by server: name taken")
    );
}

#[tokio::test]
async fn test_delete_asks_for_confirmation_and_cancel_sends_nothing() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    assert!(client.delete().await.unwrap());
    assert!(client.view(console.config()).confirm_dialog);
    assert!(mock.deletes().is_empty());

    assert!(client.cancel().await.unwrap());
    assert!(!client.view(console.config()).confirm_dialog);
    assert!(!client.cancel().await.unwrap());
    assert!(mock.deletes().is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_confirm_without_pending_sends_nothing() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    assert!(!client.confirm().await.unwrap());
    assert!(mock.deletes().is_empty());
}

#[tokio::test]
async fn test_confirmed_delete_closes_editor() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let release = mock.expect_delete(2).hold_ok(());
    let console = console(&mock);

    let editor = console.open_role(2);
    let client = editor.client.clone();
    client.wait_loaded(WAIT).await.unwrap();

    client.delete().await.unwrap();
    assert!(client.confirm().await.unwrap());
    let view = client.view(console.config());
    assert!(view.is_deleting);
    assert!(view.confirm_dialog);
    assert!(!client.confirm().await.unwrap());

    release.release();
    client.wait_settled(WAIT).await.unwrap();

    assert!(client.view(console.config()).navigate_away);
    assert!(matches!(client.snapshot().state, DetailState::Closed));
    assert_eq!(mock.deletes(), vec![2]);
    editor.shutdown().await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_conflicting_delete_resets_gate() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_delete(2)
        .return_err(GatewayError::Conflict("role in use".into()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.delete().await.unwrap();
    client.confirm().await.unwrap();
    let snapshot = client.wait_settled(WAIT).await.unwrap();

    let ready = snapshot.ready().unwrap();
    assert_eq!(ready.gate.phase(), GatePhase::Idle);
    assert_eq!(ready.record, admin());
    assert!(!client.view(console.config()).confirm_dialog);
    assert_eq!(
        console.errors().current().as_deref(),
        Some("Conflict: role in use")
    );
    mock.verify();
}

#[tokio::test]
async fn test_missing_record_renders_nothing_actionable() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(None);
    let console = console(&mock);
    let client = open_loaded(&console).await;

    let view = client.view(console.config());
    assert!(!view.show_spinner);
    assert!(view.fields.is_empty());
    assert!(!view.show_save);
    assert!(!view.show_delete);
    assert!(!client.delete().await.unwrap());
    assert_eq!(client.save().await.unwrap(), SaveOutcome::Ignored);
    assert_eq!(console.errors().current(), None);
    mock.verify();
}

#[tokio::test]
async fn test_not_found_error_is_treated_as_missing() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2)
        .return_err(GatewayError::NotFound("/roles/2".into()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    assert!(matches!(client.snapshot().state, DetailState::Empty));
    assert_eq!(console.errors().current(), None);
}

#[tokio::test]
async fn test_loading_shows_only_spinner() {
    let mock = MockGateway::<Role>::new();
    let release = mock.expect_read_one(2).hold_ok(Some(admin()));
    let console = console(&mock);
    let editor = console.open_role(2);

    let view = editor.client.view(console.config());
    assert!(view.show_spinner);
    assert!(view.fields.is_empty());
    assert!(!view.show_save);
    assert!(!view.show_delete);

    release.release();
    editor.client.wait_loaded(WAIT).await.unwrap();
    assert!(!editor.client.view(console.config()).show_spinner);
}

#[tokio::test]
async fn test_failed_read_reports_and_reload_recovers() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2)
        .return_err(GatewayError::Transport("connection refused".into()));
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let editor = console.open_role(2);

    let mut banner = console.errors().subscribe();
    banner.wait_for(Option::is_some).await.unwrap();
    assert!(editor.client.view(console.config()).show_spinner);

    console.errors().dismiss();
    assert!(editor.client.reload().await.unwrap());
    let snapshot = editor.client.wait_loaded(WAIT).await.unwrap();
    assert_eq!(snapshot.ready().unwrap().record, admin());
    mock.verify();
}

#[tokio::test]
async fn test_read_returning_another_record_is_rejected() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(Role::new(3, "other", "")));
    let console = console(&mock);
    let editor = console.open_role(2);

    let mut banner = console.errors().subscribe();
    banner.wait_for(Option::is_some).await.unwrap();
    assert!(matches!(editor.client.snapshot().state, DetailState::Loading));
}

#[tokio::test]
async fn test_reload_is_ignored_while_saving() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let release = mock.expect_update(2).hold_ok(Role::new(2, "auditor", ""));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("auditor").await.unwrap();
    client.save().await.unwrap();
    assert!(!client.reload().await.unwrap());

    release.release();
    client.wait_settled(WAIT).await.unwrap();
    mock.verify();
}

#[tokio::test]
async fn test_reload_settling_during_save_keeps_save_guard_and_draft() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let read = mock
        .expect_read_one(2)
        .hold_ok(Some(Role::new(2, "admin", "edited elsewhere")));
    let update = mock.expect_update(2).hold_ok(Role::new(2, "a", "all access"));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    assert!(client.reload().await.unwrap());
    client.set_name("a").await.unwrap();
    assert_eq!(client.save().await.unwrap(), SaveOutcome::Submitted);

    read.release();
    let snapshot = client
        .inner()
        .wait_until(|s| s.ready().is_some_and(|r| r.record.note == "edited elsewhere"))
        .await
        .unwrap();
    let ready = snapshot.ready().unwrap();
    assert!(ready.is_saving);
    assert_eq!(ready.draft.name, "a");

    client.set_name("b").await.unwrap();
    assert_eq!(client.save().await.unwrap(), SaveOutcome::Ignored);
    assert_eq!(mock.updates().len(), 1);

    update.release();
    client.wait_settled(WAIT).await.unwrap();
    assert_eq!(mock.updates().len(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_reload_keeps_unsaved_edits() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_read_one(2)
        .return_ok(Some(Role::new(2, "admin", "edited elsewhere")));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("").await.unwrap();
    client.save().await.unwrap();
    client.reload().await.unwrap();
    let snapshot = client
        .inner()
        .wait_until(|s| s.ready().is_some_and(|r| r.record.note == "edited elsewhere"))
        .await
        .unwrap();

    let ready = snapshot.ready().unwrap();
    assert_eq!(ready.draft.name, "");
    assert_eq!(ready.field_errors.get("name"), Some("name is required"));
    mock.verify();
}

#[tokio::test]
async fn test_missing_record_on_reload_does_not_strand_a_delete() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let read = mock.expect_read_one(2).hold_ok(None);
    let delete = mock.expect_delete(2).hold_ok(());
    let console = console(&mock);
    let client = open_loaded(&console).await;

    assert!(client.reload().await.unwrap());
    client.delete().await.unwrap();
    assert!(client.confirm().await.unwrap());

    read.release();
    // Let the empty read settle while the delete is still running.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.snapshot().ready().is_some_and(|r| r.is_deleting()));

    delete.release();
    client.wait_settled(WAIT).await.unwrap();
    assert!(matches!(client.snapshot().state, DetailState::Closed));
    mock.verify();
}

#[tokio::test]
async fn test_changing_a_field_clears_only_its_error() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    client.set_name("").await.unwrap();
    client.save().await.unwrap();

    client.set_note("still failing").await.unwrap();
    let view = client.view(console.config());
    assert_eq!(view.field("name").unwrap().error, Some("name is required"));

    client.set_name("a").await.unwrap();
    let view = client.view(console.config());
    assert_eq!(view.field("name").unwrap().error, None);
}

#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    let console = console(&mock);
    let client = open_loaded(&console).await;

    let result = client.inner().change_field("email", "x@example.com").await;
    assert_eq!(result, Err(EditorError::UnknownField("email".into())));
}

#[tokio::test]
async fn test_association_lists_use_configured_labels() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_read_associated(AssociationScope::Members(2))
        .return_ok(vec![UserSummary::new(1, "ada@example.com").with_name("Ada", "Lovelace")]);
    mock.expect_read_associated(AssociationScope::Org(7)).return_ok(vec![
        UserSummary::new(1, "ada@example.com").with_name("Ada", "Lovelace"),
        UserSummary::new(4, "bob@example.com"),
    ]);
    let config = ConsoleConfig {
        operator_org: Some(7),
        ..ConsoleConfig::default()
    };
    let console = Console::new(config, mock.gateway());
    let editor = console.open_role(2);

    editor
        .client
        .inner()
        .wait_until(|s| s.members.len() == 1 && s.directory.len() == 2)
        .await
        .unwrap();

    let view = editor.client.view(console.config());
    assert_eq!(view.members, vec!["Ada Lovelace"]);
    assert_eq!(view.directory, vec!["Ada Lovelace", "bob@example.com"]);

    let emails_only = ConsoleConfig {
        enable_names: false,
        ..console.config().clone()
    };
    assert_eq!(editor.client.view(&emails_only).members, vec!["ada@example.com"]);
    mock.verify();
}

#[tokio::test]
async fn test_association_failure_degrades_to_empty_list() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_read_one(2).return_ok(Some(admin()));
    mock.expect_read_associated(AssociationScope::Members(2))
        .return_ok(vec![UserSummary::new(1, "ada@example.com")]);
    mock.expect_read_associated(AssociationScope::Members(2))
        .return_err(GatewayError::Transport("timeout".into()));
    let console = console(&mock);
    let editor = console.open_role(2);
    let client = editor.client.clone();

    client.inner().wait_until(|s| s.members.len() == 1).await.unwrap();
    client.reload().await.unwrap();
    let snapshot = client
        .inner()
        .wait_until(|s| s.members.is_empty())
        .await
        .unwrap();

    assert!(snapshot.ready().is_some());
    assert_eq!(console.errors().current(), None);
}

#[tokio::test]
async fn test_dropping_every_client_stops_the_editor() {
    let mock = MockGateway::<Role>::new();
    mock.expect_read_one(2).return_ok(Some(admin()));

    let (actor, client) = resource_console::role_editor::new(2, 8);
    let ctx = EditorContext {
        gateway: mock.gateway(),
        errors: Arc::new(ErrorChannel::new()),
        config: ConsoleConfig::default(),
    };
    let handle = tokio::spawn(actor.run(ctx));
    client.wait_loaded(WAIT).await.unwrap();

    let other = client.clone();
    drop(client);
    assert!(!handle.is_finished());
    drop(other);
    tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_errors_can_be_reported_by_hosts() {
    let mock = MockGateway::<Role>::new();
    let console = console(&mock);
    console.errors().report("session expired".to_string());
    assert_eq!(console.errors().dismiss().as_deref(), Some("session expired"));
    assert_eq!(console.errors().current(), None);
}
