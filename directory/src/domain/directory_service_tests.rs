//! Tests for the directory workflows.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    FixtureEmployeeDirectory, FixtureSkillService, FixtureViewportLock, MirrorKey,
    MockEmployeeDirectory, MockSkillService, SkillServiceError,
};
use crate::domain::{EmployeeDraft, SessionState};
use crate::outbound::mirror::InMemoryMirror;

type Session = EditSessionService<InMemoryMirror, FixtureViewportLock>;

fn session() -> (Arc<InMemoryMirror>, Session) {
    let mirror = Arc::new(InMemoryMirror::new());
    let session = EditSessionService::new(Arc::clone(&mirror), Arc::new(FixtureViewportLock));
    (mirror, session)
}

fn service<D, S>(directory: D, skills: S) -> EmployeeDirectoryService<D, S>
where
    D: EmployeeDirectory,
    S: SkillService,
{
    EmployeeDirectoryService::new(
        Arc::new(directory),
        Arc::new(skills),
        Arc::new(DraftStore::default()),
    )
}

fn employee(id: &str, first_name: &str) -> EmployeeRecord {
    EmployeeRecord {
        id: Some(EmployeeId::new(id)),
        first_name: first_name.to_owned(),
        ..EmployeeRecord::empty()
    }
}

fn saved_skill(id: u64, name: &str, seniority: &str) -> SkillRecord {
    SkillRecord {
        id: Some(SkillId::new(id)),
        ..SkillRecord::new(name, 2, seniority)
    }
}

#[tokio::test]
async fn fetch_replaces_the_list() {
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_fetch_all()
        .times(1)
        .returning(|| Ok(vec![employee("AB0001", "Ada"), employee("AB0002", "Alan")]));
    let service = service(directory, FixtureSkillService);

    let count = service.fetch_employees().await.expect("fetch");

    assert_eq!(count, 2);
    assert_eq!(service.employees()[1].first_name, "Alan");
    assert_eq!(service.active_query(), ListQuery::All);
}

#[tokio::test]
async fn failed_fetch_keeps_the_previous_list() {
    let mut directory = MockEmployeeDirectory::new();
    let mut calls = 0;
    directory.expect_fetch_all().times(2).returning(move || {
        calls += 1;
        if calls == 1 {
            Ok(vec![employee("AB0001", "Ada")])
        } else {
            Err(EmployeeDirectoryError::timeout("10s elapsed"))
        }
    });
    let service = service(directory, FixtureSkillService);
    service.fetch_employees().await.expect("first fetch");

    let error = service.fetch_employees().await.expect_err("second fetch fails");

    assert!(matches!(
        error,
        DirectoryError::Employees(EmployeeDirectoryError::Timeout { .. })
    ));
    assert_eq!(service.employees().len(), 1);
}

#[tokio::test]
async fn refresh_reruns_the_active_search() {
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_search()
        .withf(|term| term == "ada")
        .times(2)
        .returning(|_| Ok(vec![employee("AB0001", "Ada")]));
    directory.expect_fetch_all().never();
    let service = service(directory, FixtureSkillService);

    service.search_employees("ada").await.expect("search");
    service.refresh().await.expect("refresh");

    assert_eq!(service.active_query(), ListQuery::Search("ada".to_owned()));
}

#[tokio::test]
async fn filter_is_forwarded_and_remembered() {
    let filter = EmployeeFilter::default().with_skill("Rust");
    let expected = filter.clone();
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_filter()
        .withf(move |candidate| candidate == &expected)
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let service = service(directory, FixtureSkillService);

    service.filter_employees(&filter).await.expect("filter");

    assert_eq!(service.active_query(), ListQuery::Filter(filter));
}

#[test]
fn skills_are_deduplicated_by_name() {
    let skills = vec![
        saved_skill(1, "Rust", "Junior"),
        saved_skill(2, "Go", "Senior"),
        saved_skill(3, "Rust", "Senior"),
    ];

    let unique = dedupe_skills_by_name(skills);

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0], saved_skill(3, "Rust", "Senior"));
    assert_eq!(unique[1].name, "Go");
}

#[tokio::test]
async fn fetch_skills_stores_the_catalogue() {
    let mut skills = MockSkillService::new();
    skills.expect_list().times(1).returning(|| {
        Ok(vec![
            saved_skill(1, "Rust", "Junior"),
            saved_skill(2, "Rust", "Lead"),
        ])
    });
    let service = service(FixtureEmployeeDirectory, skills);

    assert_eq!(service.fetch_skills().await.expect("fetch skills"), 1);
    assert_eq!(service.skill_catalogue()[0].seniority, "Lead");
}

#[tokio::test]
async fn create_posts_the_draft_and_closes_the_session() {
    let (mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_create()
        .withf(|record| record.first_name == "Grace" && record.id.is_none())
        .times(1)
        .returning(|record| {
            Ok(EmployeeRecord {
                id: Some(EmployeeId::new("GH1906")),
                ..record.clone()
            })
        });
    directory
        .expect_fetch_all()
        .times(1)
        .returning(|| Ok(vec![employee("GH1906", "Grace")]));
    let mut skills = MockSkillService::new();
    skills
        .expect_create()
        .withf(|owner, skill| owner.as_str() == "GH1906" && skill.name == "COBOL")
        .times(1)
        .returning(|owner, skill| Ok(skill.for_employee(owner)));
    skills
        .expect_create()
        .withf(|_, skill| skill.name == "Fortran")
        .times(1)
        .returning(|_, _| Err(SkillServiceError::transport("connection reset")));
    let service = service(directory, skills);

    let epoch = session.open_for_create(Some(service.draft()));
    service.draft().with(|draft| {
        draft.new_employee.first_name = "Grace".to_owned();
        draft.new_employee.skills = vec![
            SkillRecord::new("COBOL", 30, "Lead"),
            SkillRecord::new("Fortran", 5, "Senior"),
        ];
        draft.message = Some(FieldMessages::single("email", "stale"));
    });

    let created = service
        .create_employee(&session, epoch)
        .await
        .expect("create");

    assert_eq!(created.id, Some(EmployeeId::new("GH1906")));
    assert_eq!(session.state(), SessionState::Closed);
    assert!(service.draft().snapshot().message.is_none());
    assert_eq!(service.employees().len(), 1);
    assert_eq!(
        mirror.get(MirrorKey::DataChanged).expect("get"),
        Some("false".to_owned())
    );
}

#[tokio::test]
async fn rejected_create_reports_field_messages() {
    let (_mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory.expect_create().times(1).returning(|_| {
        Err(EmployeeDirectoryError::rejected(FieldMessages::single(
            "email",
            "Enter a valid email address.",
        )))
    });
    directory.expect_fetch_all().never();
    let service = service(directory, FixtureSkillService);
    let epoch = session.open_for_create(Some(service.draft()));

    let error = service
        .create_employee(&session, epoch)
        .await
        .expect_err("create rejected");

    assert!(matches!(
        error,
        DirectoryError::Employees(EmployeeDirectoryError::Rejected { .. })
    ));
    assert_eq!(session.state(), SessionState::Creating);
    let draft = service.draft().snapshot();
    assert!(crate::domain::field_has_error("email", &draft));
}

#[tokio::test]
async fn stale_create_completion_leaves_the_new_session_alone() {
    let (_mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_create()
        .times(1)
        .returning(|_| Err(EmployeeDirectoryError::rejected(FieldMessages::single("email", "taken"))));
    let service = service(directory, FixtureSkillService);

    let dispatched = session.open_for_create(Some(service.draft()));
    session.close_modal(Some(service.draft())).expect("close");
    session
        .open_for_update(Some(&employee("AB0001", "Ada")), Some(service.draft()))
        .expect("reopen");

    service
        .create_employee(&session, dispatched)
        .await
        .expect_err("create rejected");

    assert_eq!(session.state(), SessionState::Updating);
    assert!(service.draft().snapshot().message.is_none());
}

#[tokio::test]
async fn update_syncs_skills_and_closes_the_session() {
    let (mirror, session) = session();
    let record = EmployeeRecord {
        skills: vec![
            saved_skill(7, "Rust", "Senior"),
            SkillRecord::new("Go", 3, "Junior"),
            SkillRecord::new("Zig", 0, "Junior"),
        ],
        ..employee("AB0001", "Ada")
    };
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_update()
        .withf(|id, _| id.as_str() == "AB0001")
        .times(1)
        .returning(|_, record| Ok(record.clone()));
    directory.expect_fetch_all().times(1).returning(|| Ok(Vec::new()));
    let mut skills = MockSkillService::new();
    skills
        .expect_update()
        .withf(|id, skill| *id == SkillId::new(7) && skill.name == "Rust")
        .times(1)
        .returning(|_, _| Ok(()));
    skills
        .expect_create()
        .withf(|owner, skill| owner.as_str() == "AB0001" && skill.name == "Go")
        .times(1)
        .returning(|owner, skill| Ok(skill.for_employee(owner)));
    let service = service(directory, skills);

    session
        .open_for_update(Some(&record), Some(service.draft()))
        .expect("open");
    let epoch = session.epoch();
    service.draft().with(|draft| {
        draft.data_changed = true;
        draft.updated_data = Some(record.clone());
    });

    service
        .update_employee(&session, epoch, &record)
        .await
        .expect("update");

    assert_eq!(session.state(), SessionState::Closed);
    let draft = service.draft().snapshot();
    assert!(!draft.data_changed);
    assert!(draft.updated_data.is_none());
    assert_eq!(mirror.get(MirrorKey::EmployeeData).expect("get"), None);
}

#[tokio::test]
async fn failed_update_still_closes_and_refreshes() {
    let (_mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_update()
        .times(1)
        .returning(|id, _| Err(EmployeeDirectoryError::not_found(id.as_str())));
    directory.expect_fetch_all().times(1).returning(|| Ok(Vec::new()));
    let mut skills = MockSkillService::new();
    skills.expect_update().never();
    skills.expect_create().never();
    let service = service(directory, skills);
    let record = employee("AB0001", "Ada");
    session
        .open_for_update(Some(&record), Some(service.draft()))
        .expect("open");

    let error = service
        .update_employee(&session, session.epoch(), &record)
        .await
        .expect_err("update fails");

    assert!(matches!(
        error,
        DirectoryError::Employees(EmployeeDirectoryError::NotFound { .. })
    ));
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn unsaved_records_cannot_be_updated() {
    let (_mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory.expect_update().never();
    directory.expect_fetch_all().returning(|| Ok(Vec::new()));
    let service = service(directory, FixtureSkillService);

    let error = service
        .update_employee(&session, session.epoch(), &EmployeeRecord::empty())
        .await
        .expect_err("missing id");

    assert_eq!(error, DirectoryError::MissingEmployeeId(MissingEmployeeId));
}

#[tokio::test]
async fn delete_removes_the_employee_and_marks_the_mirror_clean() {
    let (mirror, session) = session();
    mirror
        .set(MirrorKey::DataChanged, "true")
        .expect("seed mirror");
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_fetch_all()
        .returning(|| Ok(vec![employee("AB0001", "Ada"), employee("AB0002", "Alan")]));
    directory
        .expect_delete()
        .with(eq(EmployeeId::new("AB0001")))
        .times(1)
        .returning(|_| Ok(()));
    let service = service(directory, FixtureSkillService);
    service.fetch_employees().await.expect("fetch");
    service.draft().with(|draft| draft.data_changed = true);

    service
        .delete_employee(&session, session.epoch(), &EmployeeId::new("AB0001"))
        .await
        .expect("delete");

    let remaining = service.employees();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, Some(EmployeeId::new("AB0002")));
    assert!(!service.draft().snapshot().data_changed);
    assert_eq!(
        mirror.get(MirrorKey::DataChanged).expect("get"),
        Some("false".to_owned())
    );
}

#[rstest]
#[case("")]
#[case("a@b")]
#[tokio::test]
async fn short_emails_are_not_checked(#[case] email: &str) {
    let (_mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory.expect_email_exists().never();
    let service = service(directory, FixtureSkillService);

    let checked = service
        .check_email_exists(&session, session.epoch(), email)
        .await
        .expect("check");

    assert_eq!(checked, None);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn email_check_updates_the_draft_message(#[case] taken: bool) {
    let (_mirror, session) = session();
    let mut directory = MockEmployeeDirectory::new();
    directory
        .expect_email_exists()
        .withf(|email| email == "ada@example.com")
        .times(1)
        .returning(move |_| Ok(taken));
    let service = service(directory, FixtureSkillService);
    service
        .draft()
        .with(|draft| draft.message = Some(FieldMessages::single("postcode", "Too long")));

    let checked = service
        .check_email_exists(&session, session.epoch(), "ada@example.com")
        .await
        .expect("check");

    assert_eq!(checked, Some(taken));
    let draft: EmployeeDraft = service.draft().snapshot();
    let expected = taken.then(|| FieldMessages::single("email", EMAIL_TAKEN_MESSAGE));
    assert_eq!(draft.message, expected);
}

#[tokio::test]
async fn skill_deletes_surface_failures() {
    let mut skills = MockSkillService::new();
    skills
        .expect_delete()
        .with(eq(SkillId::new(4)))
        .times(1)
        .returning(|id| Err(SkillServiceError::not_found(id.to_string())));
    let service = service(FixtureEmployeeDirectory, skills);

    let error = service
        .delete_skill(SkillId::new(4))
        .await
        .expect_err("delete fails");

    assert_eq!(
        error,
        DirectoryError::Skills(SkillServiceError::not_found("4"))
    );
}
