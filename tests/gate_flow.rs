//! End-to-end flows through the public API: lead submission granting
//! access, admin console lifecycle, and the navigation guard table.

use std::sync::Arc;
use std::time::Duration;

use leadgate::{
    Gate, GateConfig, LeadError, LeadForm, ManualClock, MemoryStore, ResourceError, ResourceKind,
    ResourceUpload, StoreError, ViewState,
};

fn test_gate(config: GateConfig) -> (Gate, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    let gate = Gate::with_store_and_clock(
        config.with_submit_delay(Duration::ZERO),
        Arc::new(MemoryStore::new()),
        Arc::new(clock.clone()),
    )
    .expect("test config is valid");
    (gate, clock)
}

fn demo_form(email: &str) -> LeadForm {
    LeadForm {
        full_name: "Jane Doe".into(),
        email: email.into(),
        company_name: "Co".into(),
        revenue_range: "$100k - $1M".into(),
        phone: "555-0100".into(),
        message: "Send me the report".into(),
    }
}

#[tokio::test]
async fn submission_grants_access_to_protected_view() {
    let (gate, _clock) = test_gate(GateConfig::default());

    let receipt = gate.leads.submit(demo_form("jane@co.com")).await.unwrap();
    assert_eq!(gate.leads.leads().len(), 1);

    // The returned token is immediately valid once stored in the session.
    gate.session.save_user_token(&receipt.token).unwrap();
    assert!(gate.session.is_user_authenticated().unwrap());

    let mut controller = gate.controller();
    assert_eq!(
        controller.request_view(ViewState::Protected).unwrap(),
        ViewState::Protected
    );
}

#[tokio::test]
async fn rejected_submission_leaves_no_trace() {
    let (gate, _clock) = test_gate(GateConfig::default());

    let err = gate.leads.submit(demo_form("not-an-email")).await.unwrap_err();
    assert!(matches!(err, LeadError::InvalidEmail));

    assert!(gate.leads.leads().is_empty());
    assert!(!gate.session.is_user_authenticated().unwrap());

    let mut controller = gate.controller();
    assert_eq!(
        controller.request_view(ViewState::Protected).unwrap(),
        ViewState::DemoForm
    );
}

#[tokio::test]
async fn admin_login_logout_gates_the_dashboard() {
    let (gate, _clock) = test_gate(GateConfig::default());
    let mut controller = gate.controller();

    assert_eq!(
        controller.request_view(ViewState::AdminDashboard).unwrap(),
        ViewState::AdminLogin
    );

    // Default seed account from the directory.
    assert!(gate.login_admin("admin", "password").unwrap());
    assert_eq!(
        controller.request_view(ViewState::AdminDashboard).unwrap(),
        ViewState::AdminDashboard
    );

    gate.session.logout_admin().unwrap();
    assert_eq!(
        controller.request_view(ViewState::AdminDashboard).unwrap(),
        ViewState::AdminLogin
    );
}

#[tokio::test]
async fn bad_credentials_do_not_create_a_session() {
    let (gate, _clock) = test_gate(GateConfig::default());

    assert!(!gate.login_admin("admin", "wrong").unwrap());
    assert!(!gate.login_admin("nobody", "password").unwrap());
    assert!(!gate.session.is_admin_authenticated().unwrap());
}

#[tokio::test]
async fn admin_directory_enforces_unique_usernames() {
    let (gate, _clock) = test_gate(GateConfig::default());

    assert!(!gate.admins.create("admin", "x").unwrap());
    assert!(gate.admins.create("newuser", "x").unwrap());
    assert_eq!(
        gate.admins.usernames().unwrap(),
        vec!["admin".to_string(), "newuser".to_string()]
    );
}

#[tokio::test]
async fn full_visitor_and_admin_journey() {
    let (gate, _clock) = test_gate(GateConfig::default());
    let mut controller = gate.controller();

    // Visitor: landing, form, submit, protected resources.
    controller.request_view(ViewState::DemoForm).unwrap();
    let receipt = gate.leads.submit(demo_form("ceo@startup.io")).await.unwrap();
    gate.session.save_user_token(&receipt.token).unwrap();
    assert_eq!(
        controller.request_view(ViewState::Protected).unwrap(),
        ViewState::Protected
    );
    let seeded = gate.resources.list().unwrap();
    assert_eq!(seeded.len(), 2);

    // Admin: log in, review the lead, upload a resource, clean up a seed.
    assert!(gate.login_admin("admin", "password").unwrap());
    assert_eq!(
        controller.request_view(ViewState::AdminDashboard).unwrap(),
        ViewState::AdminDashboard
    );
    assert_eq!(gate.leads.leads()[0].form.email, "ceo@startup.io");

    let uploaded = gate
        .resources
        .add(ResourceUpload {
            file_name: "q3_numbers.csv".into(),
            content_type: "text/csv".into(),
            bytes: b"a,b\n1,2\n".to_vec(),
        })
        .unwrap();
    assert_eq!(uploaded.kind, ResourceKind::Csv);

    let remaining = gate.resources.delete("default-1").unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].id, uploaded.id);
}

#[tokio::test]
async fn oversized_upload_surfaces_quota_error_without_partial_write() {
    let clock = ManualClock::new(0);
    let gate = Gate::with_store_and_clock(
        GateConfig::default()
            .with_submit_delay(Duration::ZERO)
            .with_store_capacity_bytes(2_048),
        Arc::new(MemoryStore::with_capacity_bytes(2_048)),
        Arc::new(clock),
    )
    .unwrap();

    let before = gate.resources.list().unwrap();
    let err = gate
        .resources
        .add(ResourceUpload {
            file_name: "huge.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![0u8; 16 * 1024],
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ResourceError::Store(StoreError::QuotaExceeded { .. })
    ));
    assert_eq!(gate.resources.list().unwrap(), before);
}
