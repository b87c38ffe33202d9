use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::foster::FosterStats;
use crate::domain::user::UserRole;
use crate::repository::FosterReader;
use crate::services::ServiceResult;

/// Counters shown on the admin dashboard.
pub fn load_dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<FosterStats>
where
    R: FosterReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;
    load_stats(repo)
}

pub fn load_stats<R>(repo: &R) -> ServiceResult<FosterStats>
where
    R: FosterReader + ?Sized,
{
    repo.foster_stats().map_err(|err| {
        log::error!("Failed to compute foster stats: {err}");
        err.into()
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::{ServiceError, test_user};

    #[test]
    fn dashboard_is_admin_only() {
        let mut repo = MockRepository::new();
        repo.expect_foster_stats().times(0);

        let result = load_dashboard(&repo, &test_user(UserRole::User));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn stats_come_from_repository() {
        let mut repo = MockRepository::new();
        repo.expect_foster_stats().times(1).returning(|| {
            Ok(FosterStats {
                nr_of_pets: 3,
                nr_of_fosters: 2,
                nr_of_fostered_pets: 1,
                avg_foster_duration: 14.0,
            })
        });

        let stats = load_dashboard(&repo, &test_user(UserRole::Admin)).unwrap();

        assert_eq!(stats.nr_of_fostered_pets, 1);
    }
}
