use std::error::Error;

use axum::async_trait;
use db::{agent, lead, token, user, ActiveValue, Database, DatabaseConnection, EntityTrait};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use serde::Serialize;

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

/// Create an organisor account with an authentication token.
///
/// Returns the user identifier, the organisation profile identifier and
/// the token value.
pub(crate) async fn create_organisor(
    db: &DatabaseConnection,
    username: &str,
) -> (i64, i64, String) {
    let (user, profile) = user::create_with_profile(
        db,
        user::ActiveModel {
            username: ActiveValue::Set(String::from(username)),
            first_name: ActiveValue::Set(String::new()),
            last_name: ActiveValue::Set(String::new()),
            email: ActiveValue::Set(format!("{username}@example.com")),
            password_hash: ActiveValue::Set(String::new()),
            is_organisor: ActiveValue::Set(true),
            is_agent: ActiveValue::Set(false),
            ..Default::default()
        },
    )
    .await
    .expect("unable to create organisor");

    let (model, token) = token::generate_token(user.id);

    token::Entity::insert(model)
        .exec_without_returning(db)
        .await
        .expect("unable to insert token");

    (user.id, profile.id, token)
}

/// Create an agent account within an organisation, with an authentication
/// token for the backing user.
///
/// Returns the user identifier, the agent identifier and the token value.
pub(crate) async fn create_agent(
    db: &DatabaseConnection,
    organisation_id: i64,
    username: &str,
) -> (i64, i64, String) {
    let (user, _) = user::create_with_profile(
        db,
        user::ActiveModel {
            username: ActiveValue::Set(String::from(username)),
            first_name: ActiveValue::Set(String::new()),
            last_name: ActiveValue::Set(String::new()),
            email: ActiveValue::Set(format!("{username}@example.com")),
            password_hash: ActiveValue::Set(String::new()),
            is_organisor: ActiveValue::Set(false),
            is_agent: ActiveValue::Set(true),
            ..Default::default()
        },
    )
    .await
    .expect("unable to create agent user");

    let agent = agent::Entity::insert(agent::ActiveModel {
        user_id: ActiveValue::Set(user.id),
        organisation_id: ActiveValue::Set(organisation_id),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create agent");

    let (model, token) = token::generate_token(user.id);

    token::Entity::insert(model)
        .exec_without_returning(db)
        .await
        .expect("unable to insert token");

    (user.id, agent.id, token)
}

/// Insert a lead directly, bypassing the API.
pub(crate) async fn create_lead(
    db: &DatabaseConnection,
    organisation_id: i64,
    agent_id: Option<i64>,
    first_name: &str,
) -> i64 {
    lead::Entity::insert(lead::ActiveModel {
        first_name: ActiveValue::Set(String::from(first_name)),
        last_name: ActiveValue::Set(String::from("Smith")),
        age: ActiveValue::Set(30),
        organisation_id: ActiveValue::Set(organisation_id),
        agent_id: ActiveValue::Set(agent_id),
        phone_number: ActiveValue::Set(String::from("555-1234")),
        email: ActiveValue::Set(format!("{}@example.com", first_name.to_lowercase())),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create lead")
    .id
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
