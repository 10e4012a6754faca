use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fitbot_model::profile::{ActivityLevel, ProfilePatch, Sex, UserProfile};
use log::debug;

use crate::{connection::Connection, Error, Result};

const UPSERT_QUERY: &str = "INSERT INTO user_profile
    (user_id, chat_id, name, sex, age, height_cm, weight_kg, activity, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (user_id) DO UPDATE SET
    chat_id = excluded.chat_id,
    name = COALESCE(excluded.name, user_profile.name),
    sex = COALESCE(excluded.sex, user_profile.sex),
    age = COALESCE(excluded.age, user_profile.age),
    height_cm = COALESCE(excluded.height_cm, user_profile.height_cm),
    weight_kg = COALESCE(excluded.weight_kg, user_profile.weight_kg),
    activity = COALESCE(excluded.activity, user_profile.activity),
    updated_at = excluded.updated_at";

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    chat_id: i64,
    name: Option<String>,
    sex: Option<String>,
    age: Option<i64>,
    height_cm: Option<i64>,
    weight_kg: Option<f64>,
    activity: Option<i64>,
    updated_at: i64,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = Error;

    fn try_from(row: ProfileRow) -> Result<Self> {
        let user_id = row.user_id;
        let corrupt = |reason: String| Error::CorruptRow { user_id, reason };

        let sex = row
            .sex
            .map(|s| Sex::from_str(&s).map_err(|_| corrupt(format!("invalid sex {:?}", s))))
            .transpose()?;
        let age = row
            .age
            .map(|a| u16::try_from(a).map_err(|_| corrupt(format!("invalid age {}", a))))
            .transpose()?;
        let height_cm = row
            .height_cm
            .map(|h| u16::try_from(h).map_err(|_| corrupt(format!("invalid height {}", h))))
            .transpose()?;
        let activity = row
            .activity
            .map(|a| {
                ActivityLevel::from_tier(a)
                    .ok_or_else(|| corrupt(format!("invalid activity {}", a)))
            })
            .transpose()?;
        let updated_at = DateTime::from_timestamp(row.updated_at, 0)
            .ok_or_else(|| corrupt(format!("invalid timestamp {}", row.updated_at)))?;

        Ok(UserProfile {
            user_id,
            chat_id: row.chat_id,
            name: row.name,
            sex,
            age,
            height_cm,
            weight_kg: row.weight_kg,
            activity,
            updated_at,
        })
    }
}

#[mockall::automock]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, user_id: i64) -> Result<Option<UserProfile>>;

    /// Creates the profile if needed and overwrites only the fields set in
    /// `patch`. Runs as a single statement, so concurrent writers for the same
    /// user never lose each other's fields.
    async fn upsert(&self, user_id: i64, chat_id: i64, patch: ProfilePatch) -> Result<()>;
}

#[derive(Clone)]
pub struct ProfileRepositoryImpl {
    connection: Connection,
}

impl ProfileRepositoryImpl {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ProfileRepository for ProfileRepositoryImpl {
    async fn get(&self, user_id: i64) -> Result<Option<UserProfile>> {
        debug!("Fetching profile of user {}", user_id);
        sqlx::query_as::<_, ProfileRow>("SELECT * FROM user_profile WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.connection.pool())
            .await?
            .map(UserProfile::try_from)
            .transpose()
    }

    async fn upsert(&self, user_id: i64, chat_id: i64, patch: ProfilePatch) -> Result<()> {
        debug!("Storing profile of user {}: {:?}", user_id, patch);
        sqlx::query(UPSERT_QUERY)
            .bind(user_id)
            .bind(chat_id)
            .bind(patch.name)
            .bind(patch.sex.map(|s| s.to_string()))
            .bind(patch.age.map(i64::from))
            .bind(patch.height_cm.map(i64::from))
            .bind(patch.weight_kg)
            .bind(patch.activity.map(|a| i64::from(a.tier())))
            .bind(Utc::now().timestamp())
            .execute(self.connection.pool())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repository() -> ProfileRepositoryImpl {
        ProfileRepositoryImpl::new(Connection::in_memory().await.unwrap())
    }

    fn full_patch() -> ProfilePatch {
        ProfilePatch {
            name: Some("Ace".to_owned()),
            sex: Some(Sex::Male),
            age: Some(22),
            height_cm: Some(175),
            weight_kg: Some(76.0),
            activity: Some(ActivityLevel::Moderate),
        }
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_user() {
        let repository = repository().await;
        assert_eq!(repository.get(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn first_write_creates_profile() {
        let repository = repository().await;
        repository.upsert(1, 10, full_patch()).await.unwrap();

        let profile = repository.get(1).await.unwrap().unwrap();
        assert_eq!(profile.user_id, 1);
        assert_eq!(profile.chat_id, 10);
        assert_eq!(profile.name.as_deref(), Some("Ace"));
        assert_eq!(profile.sex, Some(Sex::Male));
        assert_eq!(profile.age, Some(22));
        assert_eq!(profile.height_cm, Some(175));
        assert_eq!(profile.weight_kg, Some(76.0));
        assert_eq!(profile.activity, Some(ActivityLevel::Moderate));
    }

    #[tokio::test]
    async fn first_write_with_single_field_leaves_the_rest_empty() {
        let repository = repository().await;
        repository
            .upsert(
                1,
                10,
                ProfilePatch {
                    age: Some(30),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let profile = repository.get(1).await.unwrap().unwrap();
        assert_eq!(profile.age, Some(30));
        assert_eq!(profile.name, None);
        assert_eq!(profile.sex, None);
        assert_eq!(profile.height_cm, None);
        assert_eq!(profile.weight_kg, None);
        assert_eq!(profile.activity, None);
    }

    #[tokio::test]
    async fn later_write_only_overwrites_supplied_fields() {
        let repository = repository().await;
        repository.upsert(1, 10, full_patch()).await.unwrap();
        let before = repository.get(1).await.unwrap().unwrap();

        repository
            .upsert(
                1,
                11,
                ProfilePatch {
                    weight_kg: Some(74.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = repository.get(1).await.unwrap().unwrap();
        assert_eq!(after.weight_kg, Some(74.5));
        assert_eq!(after.chat_id, 11);
        assert_eq!(after.name, before.name);
        assert_eq!(after.sex, before.sex);
        assert_eq!(after.age, before.age);
        assert_eq!(after.height_cm, before.height_cm);
        assert_eq!(after.activity, before.activity);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn profiles_are_keyed_by_user() {
        let repository = repository().await;
        repository.upsert(1, 10, full_patch()).await.unwrap();
        repository
            .upsert(
                2,
                20,
                ProfilePatch {
                    name: Some("Bo".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            repository.get(1).await.unwrap().unwrap().name.as_deref(),
            Some("Ace")
        );
        assert_eq!(
            repository.get(2).await.unwrap().unwrap().name.as_deref(),
            Some("Bo")
        );
    }

    #[tokio::test]
    async fn concurrent_writes_for_one_user_keep_every_field() {
        let repository = repository().await;
        let (a, b, c) = tokio::join!(
            repository.upsert(
                1,
                10,
                ProfilePatch {
                    name: Some("Ace".to_owned()),
                    ..Default::default()
                }
            ),
            repository.upsert(
                1,
                10,
                ProfilePatch {
                    height_cm: Some(175),
                    ..Default::default()
                }
            ),
            repository.upsert(
                1,
                10,
                ProfilePatch {
                    weight_kg: Some(76.0),
                    ..Default::default()
                }
            ),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profile")
            .fetch_one(repository.connection.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let profile = repository.get(1).await.unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ace"));
        assert_eq!(profile.height_cm, Some(175));
        assert_eq!(profile.weight_kg, Some(76.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_a_file_database_keep_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("fitbot.db").display());
        let repository = ProfileRepositoryImpl::new(Connection::establish(&url, 4).await.unwrap());

        let patches = || {
            [
                ProfilePatch {
                    name: Some("Ace".to_owned()),
                    ..Default::default()
                },
                ProfilePatch {
                    sex: Some(Sex::Male),
                    ..Default::default()
                },
                ProfilePatch {
                    age: Some(22),
                    ..Default::default()
                },
                ProfilePatch {
                    height_cm: Some(175),
                    ..Default::default()
                },
                ProfilePatch {
                    weight_kg: Some(76.0),
                    ..Default::default()
                },
                ProfilePatch {
                    activity: Some(ActivityLevel::Moderate),
                    ..Default::default()
                },
            ]
        };

        let mut handles = Vec::new();
        for user_id in 1..=8 {
            for patch in patches() {
                let repository = repository.clone();
                handles.push(tokio::spawn(async move {
                    repository.upsert(user_id, user_id * 10, patch).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profile")
            .fetch_one(repository.connection.pool())
            .await
            .unwrap();
        assert_eq!(count, 8);

        for user_id in 1..=8 {
            let profile = repository.get(user_id).await.unwrap().unwrap();
            assert_eq!(profile.chat_id, user_id * 10, "User #{}", user_id);
            assert_eq!(profile.name.as_deref(), Some("Ace"), "User #{}", user_id);
            assert_eq!(profile.sex, Some(Sex::Male), "User #{}", user_id);
            assert_eq!(profile.age, Some(22), "User #{}", user_id);
            assert_eq!(profile.height_cm, Some(175), "User #{}", user_id);
            assert_eq!(profile.weight_kg, Some(76.0), "User #{}", user_id);
            assert_eq!(
                profile.activity,
                Some(ActivityLevel::Moderate),
                "User #{}",
                user_id
            );
        }

        repository.connection.close().await;
    }

    #[tokio::test]
    async fn invalid_stored_value_is_reported_as_corrupt() {
        let repository = repository().await;
        sqlx::query(
            "INSERT INTO user_profile (user_id, chat_id, age, updated_at) VALUES (7, 7, 70000, 0)",
        )
        .execute(repository.connection.pool())
        .await
        .unwrap();

        let result = repository.get(7).await;
        assert!(matches!(result, Err(Error::CorruptRow { user_id: 7, .. })));
    }
}
