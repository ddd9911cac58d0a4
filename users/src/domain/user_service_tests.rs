//! Tests for account creation and courier lookups.

use mockall::predicate::eq;
use rstest::{fixture, rstest};
use service_core::ErrorCode;

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockUserRepository};
use crate::domain::{Email, PasswordHash};

const EMAIL: &str = "courier@x.com";

fn stored(id: i64, role: Role) -> User {
    User::new(
        UserId::new(id),
        Email::new(EMAIL).expect("valid email"),
        role,
        AccountStatus::Active,
        PasswordHash::new("hashed"),
    )
}

#[fixture]
fn credentials() -> Credentials {
    Credentials::for_new_account(EMAIL, "pw123456").expect("valid credentials")
}

fn hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("hashed")));
    hasher
}

fn service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
) -> UserService<MockUserRepository, MockPasswordHasher> {
    UserService::new(Arc::new(users), Arc::new(hasher))
}

#[rstest]
#[case::signup(Role::User)]
#[case::courier(Role::Courier)]
#[tokio::test]
async fn new_accounts_are_active_with_the_requested_role(
    credentials: Credentials,
    #[case] role: Role,
) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users
        .expect_insert()
        .withf(move |new| {
            new.role == role
                && new.status == AccountStatus::Active
                && new.password_hash.as_str() == "hashed"
                && new.email.as_ref() == EMAIL
        })
        .times(1)
        .returning(move |new| Ok(stored(3, new.role)));
    let accounts = service(users, hasher());

    let user = accounts
        .create_account(&credentials, role)
        .await
        .expect("account created");

    assert_eq!(user.role(), role);
    assert_eq!(user.status(), AccountStatus::Active);
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected_before_hashing(credentials: Credentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(stored(1, Role::User))));
    users.expect_insert().never();
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().never();
    let accounts = service(users, hasher);

    let err = AccountsCommand::sign_up(&accounts, &credentials)
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn unique_index_race_is_reported_as_duplicate(credentials: Credentials) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users
        .expect_insert()
        .returning(|new| Err(UserRepositoryError::duplicate_email(new.email.as_ref())));
    let accounts = service(users, hasher());

    let err = accounts
        .create_account(&credentials, Role::User)
        .await
        .expect_err("lost the race");

    assert!(matches!(err, AccountError::DuplicateEmail(email) if email == EMAIL));
}

#[rstest]
#[case::courier(Role::Courier, true)]
#[case::user(Role::User, false)]
#[case::admin(Role::Admin, false)]
#[tokio::test]
async fn find_courier_only_returns_couriers(#[case] role: Role, #[case] found: bool) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .with(eq(UserId::new(5)))
        .returning(move |_| Ok(Some(stored(5, role))));
    let couriers = service(users, MockPasswordHasher::new());

    let result = CouriersQuery::find_courier(&couriers, UserId::new(5)).await;

    match result {
        Ok(user) => {
            assert!(found);
            assert_eq!(user.role(), Role::Courier);
        }
        Err(err) => {
            assert!(!found);
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    }
}

#[tokio::test]
async fn unknown_courier_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));
    let couriers = service(users, MockPasswordHasher::new());

    let err = couriers
        .courier(UserId::new(404))
        .await
        .expect_err("absent");

    assert!(matches!(err, AccountError::CourierNotFound(id) if id == UserId::new(404)));
}

#[tokio::test]
async fn list_couriers_queries_the_courier_role() {
    let mut users = MockUserRepository::new();
    users
        .expect_list_by_role()
        .with(eq(Role::Courier))
        .returning(|_| Ok(vec![stored(2, Role::Courier), stored(4, Role::Courier)]));
    let couriers = service(users, MockPasswordHasher::new());

    let listed = CouriersQuery::list_couriers(&couriers)
        .await
        .expect("listed");

    let ids: Vec<_> = listed.iter().map(User::id).collect();
    assert_eq!(ids, vec![UserId::new(2), UserId::new(4)]);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_keeps_an_existing_active_admin(credentials: Credentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(stored(1, Role::Admin))));
    users.expect_insert().never();
    let accounts = service(users, MockPasswordHasher::new());

    let admin = accounts
        .ensure_admin(&credentials)
        .await
        .expect("existing admin");

    assert_eq!(admin.id(), UserId::new(1));
}

#[rstest]
#[case::plain_user(Role::User, AccountStatus::Active)]
#[case::courier(Role::Courier, AccountStatus::Active)]
#[case::frozen_admin(Role::Admin, AccountStatus::Frozen)]
#[case::blocked_admin(Role::Admin, AccountStatus::Blocked)]
#[tokio::test]
async fn ensure_admin_refuses_an_email_held_by_another_account(
    credentials: Credentials,
    #[case] role: Role,
    #[case] status: AccountStatus,
) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(move |_| {
        Ok(Some(User::new(
            UserId::new(7),
            Email::new(EMAIL).expect("valid email"),
            role,
            status,
            PasswordHash::new("hashed"),
        )))
    });
    users.expect_insert().never();
    let accounts = service(users, MockPasswordHasher::new());

    let err = accounts
        .ensure_admin(&credentials)
        .await
        .expect_err("bootstrap must not reuse the account");

    assert!(matches!(
        &err,
        AccountError::BootstrapConflict { role: found, status: held, .. }
            if *found == role && *held == status
    ));
    assert_eq!(Error::from(err).code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_creates_a_missing_account(credentials: Credentials) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users
        .expect_insert()
        .withf(|new| new.role == Role::Admin)
        .times(1)
        .returning(|new| Ok(stored(1, new.role)));
    let accounts = service(users, hasher());

    let admin = accounts
        .ensure_admin(&credentials)
        .await
        .expect("admin created");

    assert_eq!(admin.role(), Role::Admin);
}
