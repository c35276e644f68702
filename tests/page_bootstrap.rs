mod common;

use build_configurator::{
    PageController, PageOptions, PageRequest,
    domain::{ConfigurationState, FormType, PageMode},
    form::{DiffField, FormError},
};
use common::{RecordingService, configuration, view_record};

fn page(service: RecordingService, request: PageRequest) -> PageController<RecordingService> {
    PageController::new(service, request, PageOptions::default())
}

#[tokio::test]
async fn approved_configuration_skips_the_diff() {
    let service = RecordingService::new()
        .with_configuration(configuration("core", ConfigurationState::Approved))
        .with_views(vec![view_record("https://git.example.com/core.git")]);
    let mut page = page(service, PageRequest::open(PageMode::Edit, "core"));

    page.init_page().await.unwrap();

    assert!(page.service().called("get_configuration"));
    assert!(!page.service().called("get_diff_configuration"));
    assert!(!page.service().called("load_deleted_views"));
    assert!(page.form().diff.is_empty());
    assert!(page.form().project_name_locked);
    assert_eq!(page.form().views.len(), 1);
    assert_eq!(page.form().views.project_number(), 1);
    assert_eq!(page.status().message(), "Loaded configuration 'core'");
}

#[tokio::test]
async fn pending_configuration_is_compared_with_the_approved_one() {
    let mut approved = configuration("core", ConfigurationState::Approved);
    approved.pre_script = Some("make".to_string());
    approved
        .build_machine_configuration
        .insert("win-01".to_string(), true);
    let mut service = RecordingService::new()
        .with_configuration(configuration("core", ConfigurationState::Updated))
        .with_approved(approved)
        .with_views(vec![view_record("https://git.example.com/core.git")]);
    service.deleted = vec![view_record("https://git.example.com/legacy.git")];
    let mut page = page(service, PageRequest::open(PageMode::ApproveReject, "core"));

    page.init_page().await.unwrap();

    assert_eq!(page.service().count("get_diff_configuration"), 1);
    assert!(page.service().called("load_deleted_views"));
    let form = page.form();
    assert_eq!(form.diff.old_text(DiffField::PreScript), Some("make"));
    assert_eq!(form.diff.old_text(DiffField::Scm), None);
    assert!(form.diff.machine_changed("win-01"));
    assert!(!form.diff.machine_changed("linux-01"));
    assert_eq!(form.views.deleted().len(), 1);
    assert_eq!(form.views.project_number(), 1, "deleted views take no ordinal");
    assert_eq!(
        form.creator_label.as_deref(),
        Some("Created by:  Full name of jdoe")
    );
    assert_eq!(form.chrome.save_label, "Approve");
    assert!(form.chrome.reject_visible);
}

#[tokio::test]
async fn pending_configuration_without_approved_copy_shows_nothing() {
    let service = RecordingService::new()
        .with_configuration(configuration("core", ConfigurationState::New))
        .with_views(vec![view_record("https://git.example.com/core.git")]);
    let mut page = page(service, PageRequest::open(PageMode::Edit, "core"));

    page.init_page().await.unwrap();

    assert!(page.service().called("get_diff_configuration"));
    assert!(!page.service().called("load_deleted_views"));
    assert!(!page.form().diff.has_approved());
}

#[tokio::test]
async fn create_page_starts_with_one_view_and_defaults() {
    let mut page = page(RecordingService::new(), PageRequest::create());

    page.init_page().await.unwrap();

    let form = page.form();
    assert_eq!(form.form_type, FormType::Create);
    assert_eq!(form.poll_scm_trigger.field.value, "H * * * *");
    assert!(!form.comments_enabled);
    assert_eq!(form.views.len(), 1);
    assert_eq!(form.views.views()[0].local_directory_path.value, ".");
    assert_eq!(form.views.views()[0].builders().len(), 1);
    assert_eq!(
        form.machines.nodes().map(|(node, _)| node).collect::<Vec<_>>(),
        ["linux-01", "win-01"]
    );
    assert!(!page.service().called("get_configuration"));
}

#[tokio::test]
async fn missing_configuration_is_reported_on_the_status_line() {
    let mut page = page(
        RecordingService::new(),
        PageRequest::parse("name=ghost&type=edit").unwrap(),
    );

    let err = page.init_page().await.unwrap_err();

    assert!(matches!(err, FormError::Service(_)));
    assert!(page.status().is_error());
    assert!(page.status().message().contains("ghost"));
}
