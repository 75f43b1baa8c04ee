//! Organisation scoping of entity access.
//!
//! Every read and write in the system is restricted to the requesting
//! user's organisation. Organisors own the organisation outright, agents
//! reach it through their agent record and additionally only ever see the
//! leads assigned to them. [`Scope`] resolves a requester into one of
//! those two shapes once, and the selects it produces carry the matching
//! filters, so no caller re-implements the role branching.

use derive_more::{Display, Error, From};
use sea_orm::{entity::prelude::*, ConnectionTrait, QuerySelect, Select};

use crate::{agent, category, lead, user_profile};

/// Errors that may occur during scope resolution.
///
/// The missing-row variants are precondition violations: a role flag
/// without its backing row cannot be produced by this codebase, so they
/// are reported distinctly instead of dissolving into empty result sets.
#[derive(Debug, Display, Error, From)]
pub enum ScopeError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Organisor user without a profile row.
    #[display(fmt = "organisor user has no profile")]
    MissingProfile,

    /// Agent user without an agent row.
    #[display(fmt = "agent user has no agent record")]
    MissingAgentRecord,
}

/// Organisation scope of an authenticated requester.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// The requester owns the organisation.
    Organisor { organisation_id: i64 },

    /// The requester works for the organisation as an agent.
    Agent { organisation_id: i64, agent_id: i64 },
}

impl Scope {
    /// Resolve the scope of a user from its role flag.
    pub async fn resolve<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        is_organisor: bool,
    ) -> Result<Self, ScopeError> {
        if is_organisor {
            let organisation_id: i64 = user_profile::Entity::find()
                .select_only()
                .column(user_profile::Column::Id)
                .filter(user_profile::Column::UserId.eq(user_id))
                .into_tuple()
                .one(conn)
                .await?
                .ok_or(ScopeError::MissingProfile)?;

            Ok(Scope::Organisor { organisation_id })
        } else {
            let (agent_id, organisation_id) = agent::Entity::find()
                .select_only()
                .columns([agent::Column::Id, agent::Column::OrganisationId])
                .filter(agent::Column::UserId.eq(user_id))
                .into_tuple()
                .one(conn)
                .await?
                .ok_or(ScopeError::MissingAgentRecord)?;

            Ok(Scope::Agent {
                organisation_id,
                agent_id,
            })
        }
    }

    /// Owning profile identifier, used both for filtering and for stamping
    /// newly created entities.
    pub fn organisation(&self) -> i64 {
        match *self {
            Scope::Organisor { organisation_id } | Scope::Agent { organisation_id, .. } => {
                organisation_id
            }
        }
    }

    /// Leads visible to the requester: the whole organisation for an
    /// organisor, only the assigned ones for an agent.
    pub fn leads(&self) -> Select<lead::Entity> {
        let select =
            lead::Entity::find().filter(lead::Column::OrganisationId.eq(self.organisation()));

        match *self {
            Scope::Organisor { .. } => select,
            Scope::Agent { agent_id, .. } => select.filter(lead::Column::AgentId.eq(agent_id)),
        }
    }

    /// Agents of the requester's organisation.
    pub fn agents(&self) -> Select<agent::Entity> {
        agent::Entity::find().filter(agent::Column::OrganisationId.eq(self.organisation()))
    }

    /// Categories of the requester's organisation.
    pub fn categories(&self) -> Select<category::Entity> {
        category::Entity::find().filter(category::Column::OrganisationId.eq(self.organisation()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use sea_orm::{
        ActiveValue, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    };
    use time::{OffsetDateTime, PrimitiveDateTime};

    use super::{Scope, ScopeError};
    use crate::{agent, category, lead, token, user, user_profile};

    /// Create every table of the schema on an empty test database.
    pub(crate) async fn create_tables(db: &DatabaseConnection) {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let statements = [
            schema.create_table_from_entity(user::Entity),
            schema.create_table_from_entity(user_profile::Entity),
            schema.create_table_from_entity(token::Entity),
            schema.create_table_from_entity(agent::Entity),
            schema.create_table_from_entity(category::Entity),
            schema.create_table_from_entity(lead::Entity),
        ];

        for statement in statements {
            db.execute(backend.build(&statement))
                .await
                .expect("unable to create table");
        }
    }

    fn timestamp() -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc();

        PrimitiveDateTime::new(now.date(), now.time())
    }

    async fn create_organisor(db: &DatabaseConnection, username: &str) -> (i64, i64) {
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

        (user.id, profile.id)
    }

    async fn create_agent(db: &DatabaseConnection, organisation_id: i64, username: &str) -> (i64, i64) {
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

        (user.id, agent.id)
    }

    async fn create_lead(
        db: &DatabaseConnection,
        organisation_id: i64,
        agent_id: Option<i64>,
        first_name: &str,
    ) -> i64 {
        lead::Entity::insert(lead::ActiveModel {
            first_name: ActiveValue::Set(String::from(first_name)),
            last_name: ActiveValue::Set(String::from("Lead")),
            age: ActiveValue::Set(30),
            organisation_id: ActiveValue::Set(organisation_id),
            agent_id: ActiveValue::Set(agent_id),
            phone_number: ActiveValue::Set(String::from("555-0000")),
            email: ActiveValue::Set(String::from("lead@example.com")),
            created_at: ActiveValue::Set(timestamp()),
            ..Default::default()
        })
        .exec_with_returning(db)
        .await
        .expect("unable to create lead")
        .id
    }

    async fn setup() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("unable to create test database");

        create_tables(&db).await;

        db
    }

    #[tokio::test]
    async fn organisor_sees_only_own_organisation() {
        let db = setup().await;

        let (first_user, first_org) = create_organisor(&db, "first").await;
        let (_, second_org) = create_organisor(&db, "second").await;

        let own = create_lead(&db, first_org, None, "Own").await;
        create_lead(&db, second_org, None, "Foreign").await;

        let scope = Scope::resolve(&db, first_user, true).await.unwrap();
        assert_eq!(scope, Scope::Organisor { organisation_id: first_org });

        let leads = scope.leads().all(&db).await.unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, own);
    }

    #[tokio::test]
    async fn agent_sees_only_assigned_leads() {
        let db = setup().await;

        let (_, organisation) = create_organisor(&db, "boss").await;
        let (first_user, first_agent) = create_agent(&db, organisation, "first_agent").await;
        let (_, second_agent) = create_agent(&db, organisation, "second_agent").await;

        let mine = create_lead(&db, organisation, Some(first_agent), "Mine").await;
        create_lead(&db, organisation, Some(second_agent), "Colleague").await;
        create_lead(&db, organisation, None, "Unassigned").await;

        let scope = Scope::resolve(&db, first_user, false).await.unwrap();
        assert_eq!(
            scope,
            Scope::Agent {
                organisation_id: organisation,
                agent_id: first_agent
            }
        );

        let leads = scope.leads().all(&db).await.unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, mine);
    }

    #[tokio::test]
    async fn categories_scoped_by_organisation_for_agents() {
        let db = setup().await;

        let (_, organisation) = create_organisor(&db, "boss").await;
        let (_, other_organisation) = create_organisor(&db, "rival").await;
        let (agent_user, _) = create_agent(&db, organisation, "worker").await;

        category::Entity::insert(category::ActiveModel {
            name: ActiveValue::Set(String::from("New")),
            organisation_id: ActiveValue::Set(organisation),
            ..Default::default()
        })
        .exec_without_returning(&db)
        .await
        .unwrap();

        category::Entity::insert(category::ActiveModel {
            name: ActiveValue::Set(String::from("Foreign")),
            organisation_id: ActiveValue::Set(other_organisation),
            ..Default::default()
        })
        .exec_without_returning(&db)
        .await
        .unwrap();

        let scope = Scope::resolve(&db, agent_user, false).await.unwrap();
        let categories = scope.categories().all(&db).await.unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "New");
    }

    #[tokio::test]
    async fn missing_agent_record_is_reported() {
        let db = setup().await;

        // A user flagged as agent, but without the agent row itself.
        let (user, _) = user::create_with_profile(
            &db,
            user::ActiveModel {
                username: ActiveValue::Set(String::from("broken")),
                first_name: ActiveValue::Set(String::new()),
                last_name: ActiveValue::Set(String::new()),
                email: ActiveValue::Set(String::from("broken@example.com")),
                password_hash: ActiveValue::Set(String::new()),
                is_organisor: ActiveValue::Set(false),
                is_agent: ActiveValue::Set(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = Scope::resolve(&db, user.id, false).await.unwrap_err();

        assert!(matches!(err, ScopeError::MissingAgentRecord));
    }
}
