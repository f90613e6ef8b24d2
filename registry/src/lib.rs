use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    identity::HttpIdentityProvider,
    mail::build_mailer,
    redis::RedisClient,
    repository::{
        analytics::AnalyticsRepositoryImpl, auth::AuthRepositoryImpl, book::BookRepositoryImpl,
        booking::BookingRepositoryImpl, forum::ForumRepositoryImpl,
        health::HealthCheckRepositoryImpl, library::LibraryRepositoryImpl,
        membership::MembershipRepositoryImpl, seat::SeatRepositoryImpl, user::UserRepositoryImpl,
    },
};
use kernel::{
    repository::{
        analytics::AnalyticsRepository, auth::AuthRepository, book::BookRepository,
        booking::BookingRepository, forum::ForumRepository, health::HealthCheckRepository,
        library::LibraryRepository, membership::MembershipRepository, seat::SeatRepository,
        user::UserRepository,
    },
    service::{identity::IdentityProvider, mailer::Mailer},
};
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    user_repository: Arc<dyn UserRepository>,
    library_repository: Arc<dyn LibraryRepository>,
    seat_repository: Arc<dyn SeatRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    book_repository: Arc<dyn BookRepository>,
    forum_repository: Arc<dyn ForumRepository>,
    analytics_repository: Arc<dyn AnalyticsRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn Mailer>,
    loan_period_days: i64,
}

/// Individual components of an [`AppRegistry`], for wiring in
/// alternative implementations such as test doubles.
pub struct AppRegistryParts {
    pub health_check_repository: Arc<dyn HealthCheckRepository>,
    pub auth_repository: Arc<dyn AuthRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub library_repository: Arc<dyn LibraryRepository>,
    pub seat_repository: Arc<dyn SeatRepository>,
    pub booking_repository: Arc<dyn BookingRepository>,
    pub membership_repository: Arc<dyn MembershipRepository>,
    pub book_repository: Arc<dyn BookRepository>,
    pub forum_repository: Arc<dyn ForumRepository>,
    pub analytics_repository: Arc<dyn AnalyticsRepository>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn Mailer>,
    pub loan_period_days: i64,
}

impl From<AppRegistryParts> for AppRegistry {
    fn from(parts: AppRegistryParts) -> Self {
        let AppRegistryParts {
            health_check_repository,
            auth_repository,
            user_repository,
            library_repository,
            seat_repository,
            booking_repository,
            membership_repository,
            book_repository,
            forum_repository,
            analytics_repository,
            identity_provider,
            mailer,
            loan_period_days,
        } = parts;
        Self {
            health_check_repository,
            auth_repository,
            user_repository,
            library_repository,
            seat_repository,
            booking_repository,
            membership_repository,
            book_repository,
            forum_repository,
            analytics_repository,
            identity_provider,
            mailer,
            loan_period_days,
        }
    }
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, redis_client: Arc<RedisClient>, app_config: AppConfig) -> Self {
        AppRegistryParts {
            health_check_repository: Arc::new(HealthCheckRepositoryImpl::new(pool.clone())),
            auth_repository: Arc::new(AuthRepositoryImpl::new(
                redis_client.clone(),
                app_config.auth.ttl,
            )),
            user_repository: Arc::new(UserRepositoryImpl::new(pool.clone())),
            library_repository: Arc::new(LibraryRepositoryImpl::new(pool.clone())),
            seat_repository: Arc::new(SeatRepositoryImpl::new(pool.clone())),
            booking_repository: Arc::new(BookingRepositoryImpl::new(pool.clone())),
            membership_repository: Arc::new(MembershipRepositoryImpl::new(pool.clone())),
            book_repository: Arc::new(BookRepositoryImpl::new(pool.clone())),
            forum_repository: Arc::new(ForumRepositoryImpl::new(pool.clone())),
            analytics_repository: Arc::new(AnalyticsRepositoryImpl::new(pool)),
            identity_provider: Arc::new(HttpIdentityProvider::new(&app_config.identity)),
            mailer: build_mailer(&app_config.mail),
            loan_period_days: app_config.lending.loan_period_days,
        }
        .into()
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn library_repository(&self) -> Arc<dyn LibraryRepository> {
        self.library_repository.clone()
    }

    pub fn seat_repository(&self) -> Arc<dyn SeatRepository> {
        self.seat_repository.clone()
    }

    pub fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    pub fn membership_repository(&self) -> Arc<dyn MembershipRepository> {
        self.membership_repository.clone()
    }

    pub fn book_repository(&self) -> Arc<dyn BookRepository> {
        self.book_repository.clone()
    }

    pub fn forum_repository(&self) -> Arc<dyn ForumRepository> {
        self.forum_repository.clone()
    }

    pub fn analytics_repository(&self) -> Arc<dyn AnalyticsRepository> {
        self.analytics_repository.clone()
    }

    pub fn identity_provider(&self) -> Arc<dyn IdentityProvider> {
        self.identity_provider.clone()
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.mailer.clone()
    }

    pub fn loan_period_days(&self) -> i64 {
        self.loan_period_days
    }
}
