//! Full passes against in-memory membership and directory fakes.

use std::cell::{Cell, RefCell};

use memberbridge_conscribo::{CallError, ConscriboError};
use memberbridge_core::{AccountPatch, DirectoryAccount, ExternalId, MemberCode, Person, UserName};
use memberbridge_directory::DirectoryError;
use memberbridge_sync::{
    pipeline::run_pass, Directory, MembershipSource, Outcome, ReconcileOptions, StaleReason,
    SyncError,
};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeSource {
    auth_status: Option<u16>,
    roster_fails: bool,
    people: Vec<Person>,
}

impl FakeSource {
    fn with(people: Vec<Person>) -> Self {
        Self {
            auth_status: None,
            roster_fails: false,
            people,
        }
    }
}

impl MembershipSource for FakeSource {
    type Session = String;

    fn authenticate(&self) -> Result<String, ConscriboError> {
        match self.auth_status {
            Some(status) => Err(ConscriboError::Auth(CallError::Status {
                status,
                body: String::new(),
            })),
            None => Ok("session".into()),
        }
    }

    fn list_people(&self, session: &String) -> Result<Vec<Person>, ConscriboError> {
        assert_eq!(session, "session");
        if self.roster_fails {
            return Err(ConscriboError::Fetch {
                command: "listRelations",
                source: CallError::Rejected {
                    notifications: vec!["Session expired".into()],
                },
            });
        }
        Ok(self.people.clone())
    }
}

#[derive(Default)]
struct FakeDirectory {
    accounts: Vec<DirectoryAccount>,
    list_fails: bool,
    list_calls: Cell<usize>,
    inserts: RefCell<Vec<DirectoryAccount>>,
    updates: RefCell<Vec<(AccountPatch, String)>>,
}

impl FakeDirectory {
    fn with(accounts: Vec<DirectoryAccount>) -> Self {
        Self {
            accounts,
            ..Default::default()
        }
    }

    fn mutations(&self) -> usize {
        self.inserts.borrow().len() + self.updates.borrow().len()
    }
}

impl Directory for FakeDirectory {
    fn list_all_accounts(&self) -> Result<Vec<DirectoryAccount>, DirectoryError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.list_fails {
            return Err(DirectoryError::Api {
                status: 401,
                message: "Invalid Credentials".into(),
            });
        }
        Ok(self.accounts.clone())
    }

    // Primary addresses are unique, as in the real service.
    fn insert(&self, account: &DirectoryAccount) -> Result<(), DirectoryError> {
        let taken = self
            .accounts
            .iter()
            .chain(self.inserts.borrow().iter())
            .any(|a| a.primary_email == account.primary_email);
        if taken {
            return Err(DirectoryError::Api {
                status: 409,
                message: "Entity already exists.".into(),
            });
        }
        self.inserts.borrow_mut().push(account.clone());
        Ok(())
    }

    fn update(&self, patch: &AccountPatch, primary_email: &str) -> Result<(), DirectoryError> {
        self.updates
            .borrow_mut()
            .push((patch.clone(), primary_email.to_owned()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn options() -> ReconcileOptions {
    ReconcileOptions {
        domain: "aegee-delft.nl".into(),
        org_unit: "/Member".into(),
        compare_names: false,
        dry_run: false,
    }
}

fn person(first: &str, last: &str, email: &str, code: &str) -> Person {
    Person {
        voornaam: first.into(),
        achternaam: last.into(),
        email: email.into(),
        code: MemberCode::from(code),
        membership_ended: String::new(),
    }
}

fn account(primary: &str, first: &str, last: &str, recovery: &str, code: &str) -> DirectoryAccount {
    DirectoryAccount {
        id: Some(format!("id-{code}")),
        primary_email: primary.into(),
        name: UserName::new(first, last),
        recovery_email: Some(recovery.into()),
        external_ids: vec![ExternalId::conscribo(&MemberCode::from(code))],
        org_unit_path: Some("/Member".into()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// 1. Decisions
// ---------------------------------------------------------------------------

#[test]
fn new_member_is_inserted_with_reserved_id() {
    let source = FakeSource::with(vec![person("Ada", "Lovelace", "ada@x.org", "42")]);
    let directory = FakeDirectory::default();

    let report = run_pass(&source, &directory, &options()).expect("pass");

    let inserts = directory.inserts.borrow();
    assert_eq!(inserts.len(), 1);
    let created = &inserts[0];
    assert_eq!(created.primary_email, "adalovelace@aegee-delft.nl");
    assert_eq!(
        created.external_ids,
        vec![ExternalId {
            kind: "custom".into(),
            custom_type: Some("conscriboID".into()),
            value: "42".into(),
        }]
    );
    assert_eq!(created.recovery_email.as_deref(), Some("ada@x.org"));
    assert_eq!(created.change_password_at_next_login, Some(true));
    assert_eq!(created.org_unit_path.as_deref(), Some("/Member"));
    assert!(created.password.as_deref().is_some_and(|p| !p.is_empty()));
    assert!(directory.updates.borrow().is_empty());

    assert_eq!(
        report.records[0].outcome,
        Outcome::Inserted {
            primary_email: "adalovelace@aegee-delft.nl".into()
        }
    );
}

#[test]
fn synced_member_causes_no_mutation() {
    let source = FakeSource::with(vec![person("Ada", "Lovelace", "ada@x.org", "42")]);
    let directory = FakeDirectory::with(vec![account(
        "adalovelace@aegee-delft.nl",
        "Ada",
        "Lovelace",
        "ada@x.org",
        "42",
    )]);

    let report = run_pass(&source, &directory, &options()).expect("pass");

    assert_eq!(directory.mutations(), 0);
    assert!(matches!(report.records[0].outcome, Outcome::Unchanged { .. }));
}

#[test]
fn stale_member_is_updated_by_existing_primary_address() {
    // Renamed and new email: the derived address would differ, but the
    // existing address must be kept.
    let source = FakeSource::with(vec![person("Ada", "King", "countess@x.org", "42")]);
    let directory = FakeDirectory::with(vec![account(
        "adalovelace@aegee-delft.nl",
        "Ada",
        "Lovelace",
        "ada@x.org",
        "42",
    )]);

    let report = run_pass(&source, &directory, &options()).expect("pass");

    assert!(directory.inserts.borrow().is_empty());
    let updates = directory.updates.borrow();
    assert_eq!(updates.len(), 1);
    let (patch, key) = &updates[0];
    assert_eq!(key, "adalovelace@aegee-delft.nl");
    assert_eq!(patch.recovery_email.as_deref(), Some("countess@x.org"));
    assert_eq!(
        patch.external_ids,
        Some(vec![ExternalId::conscribo(&MemberCode::from("42"))])
    );
    assert_eq!(patch.name, Some(UserName::new("Ada", "King")));

    match &report.records[0].outcome {
        Outcome::Updated {
            primary_email,
            reasons,
        } => {
            assert_eq!(primary_email, "adalovelace@aegee-delft.nl");
            assert_eq!(reasons, &[StaleReason::RecoveryEmail]);
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[rstest]
#[case(false, 0)]
#[case(true, 1)]
fn name_drift_updates_only_when_enabled(#[case] compare_names: bool, #[case] updates: usize) {
    let source = FakeSource::with(vec![person("Ada", "King", "ada@x.org", "42")]);
    let directory = FakeDirectory::with(vec![account(
        "adalovelace@aegee-delft.nl",
        "Ada",
        "Lovelace",
        "ada@x.org",
        "42",
    )]);
    let options = ReconcileOptions {
        compare_names,
        ..options()
    };

    run_pass(&source, &directory, &options).expect("pass");
    assert_eq!(directory.updates.borrow().len(), updates);
}

// ---------------------------------------------------------------------------
// 2. Failure handling
// ---------------------------------------------------------------------------

#[test]
fn auth_failure_aborts_before_any_directory_call() {
    let source = FakeSource {
        auth_status: Some(401),
        ..FakeSource::with(vec![person("Ada", "Lovelace", "ada@x.org", "42")])
    };
    let directory = FakeDirectory::default();

    let err = run_pass(&source, &directory, &options()).unwrap_err();

    assert!(matches!(err, SyncError::Membership(ConscriboError::Auth(_))), "got: {err}");
    assert_eq!(directory.list_calls.get(), 0);
    assert_eq!(directory.mutations(), 0);
}

#[test]
fn roster_failure_is_not_an_empty_roster() {
    let source = FakeSource {
        roster_fails: true,
        ..FakeSource::with(vec![])
    };
    let directory = FakeDirectory::default();

    let err = run_pass(&source, &directory, &options()).unwrap_err();
    assert!(matches!(err, SyncError::Membership(ConscriboError::Fetch { .. })));
    assert_eq!(directory.mutations(), 0);
}

#[test]
fn snapshot_failure_aborts_pass() {
    let source = FakeSource::with(vec![person("Ada", "Lovelace", "ada@x.org", "42")]);
    let directory = FakeDirectory {
        list_fails: true,
        ..Default::default()
    };

    let err = run_pass(&source, &directory, &options()).unwrap_err();
    assert!(matches!(err, SyncError::Directory(_)));
    assert_eq!(directory.mutations(), 0);
}

#[test]
fn name_collision_fails_second_insert_and_pass_continues() {
    let source = FakeSource::with(vec![
        person("Jan", "Jansen", "jan1@x.org", "1"),
        person("Jan", "Jansen", "jan2@x.org", "2"),
        person("Piet", "Pietersen", "piet@x.org", "3"),
    ]);
    let directory = FakeDirectory::default();

    let report = run_pass(&source, &directory, &options()).expect("pass");

    let summary = report.summary();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.failed, 1);
    match &report.records[1].outcome {
        Outcome::Failed {
            primary_email,
            error,
            ..
        } => {
            assert_eq!(primary_email, "janjansen@aegee-delft.nl");
            assert!(error.contains("409"), "got: {error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    let inserted: Vec<_> = directory
        .inserts
        .borrow()
        .iter()
        .map(|a| a.primary_email.clone())
        .collect();
    assert_eq!(
        inserted,
        ["janjansen@aegee-delft.nl", "pietpietersen@aegee-delft.nl"]
    );
}

#[test]
fn member_without_code_is_still_inserted() {
    let source = FakeSource::with(vec![person("Ada", "Lovelace", "ada@x.org", "")]);
    let directory = FakeDirectory::default();

    let report = run_pass(&source, &directory, &options()).expect("pass");

    let inserts = directory.inserts.borrow();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].primary_email, "adalovelace@aegee-delft.nl");
    assert!(matches!(report.records[0].outcome, Outcome::Inserted { .. }));
}

#[test]
fn member_without_code_never_claims_an_existing_account() {
    let mut unlinked = account("adalovelace@aegee-delft.nl", "Ada", "Lovelace", "ada@x.org", "");
    unlinked.external_ids.clear();
    let source = FakeSource::with(vec![person("Ada", "Lovelace", "ada@x.org", " ")]);
    let directory = FakeDirectory::with(vec![unlinked]);

    let report = run_pass(&source, &directory, &options()).expect("pass");

    // Classified as new; the directory rejects the duplicate address.
    assert!(directory.updates.borrow().is_empty());
    assert!(matches!(report.records[0].outcome, Outcome::Failed { .. }));
}

#[test]
fn member_without_name_is_skipped() {
    let source = FakeSource::with(vec![person(" ", "", "blank@x.org", "9")]);
    let directory = FakeDirectory::default();

    let report = run_pass(&source, &directory, &options()).expect("pass");

    assert_eq!(directory.mutations(), 0);
    assert_eq!(report.summary().skipped, 1);
}

// ---------------------------------------------------------------------------
// 3. Dry run and report
// ---------------------------------------------------------------------------

#[test]
fn dry_run_issues_no_mutations() {
    let source = FakeSource::with(vec![
        person("Ada", "Lovelace", "ada@x.org", "42"),
        person("Grace", "Hopper", "grace@new.org", "7"),
    ]);
    let directory = FakeDirectory::with(vec![account(
        "gracehopper@aegee-delft.nl",
        "Grace",
        "Hopper",
        "grace@old.org",
        "7",
    )]);
    let options = ReconcileOptions {
        dry_run: true,
        ..options()
    };

    let report = run_pass(&source, &directory, &options).expect("pass");

    assert_eq!(directory.mutations(), 0);
    assert!(report.dry_run);
    assert!(matches!(report.records[0].outcome, Outcome::WouldInsert { .. }));
    assert!(matches!(report.records[1].outcome, Outcome::WouldUpdate { .. }));
}

#[test]
fn report_preserves_roster_order_and_sizes() {
    let source = FakeSource::with(vec![
        person("Zoe", "Zee", "z@x.org", "3"),
        person("Ada", "Lovelace", "ada@x.org", "1"),
    ]);
    let directory = FakeDirectory::with(vec![account(
        "other@aegee-delft.nl",
        "Other",
        "Person",
        "o@x.org",
        "99",
    )]);

    let report = run_pass(&source, &directory, &options()).expect("pass");

    assert_eq!(report.roster_size, 2);
    assert_eq!(report.directory_size, 1);
    assert_eq!(directory.list_calls.get(), 1);
    let names: Vec<_> = report.records.iter().map(|r| r.person.as_str()).collect();
    assert_eq!(names, ["Zoe Zee", "Ada Lovelace"]);
    assert!(report.finished_at >= report.started_at);
}
