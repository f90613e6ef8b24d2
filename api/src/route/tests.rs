use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use kernel::{
    model::{
        auth::ExternalIdentity,
        booking::{BookingSeat, BookingStatus, BookingUser, BookingWindow, SeatBooking},
        forum::LikeState,
        id::{BookingId, LibraryId, PostId, SeatId, UserId},
        library::{Library, LibraryOwner, LibraryStatus, OpeningHours},
        list::PaginatedList,
        role::Role,
        user::User,
    },
    repository::{
        analytics::MockAnalyticsRepository, auth::MockAuthRepository, book::MockBookRepository,
        booking::MockBookingRepository, forum::MockForumRepository,
        health::MockHealthCheckRepository, library::MockLibraryRepository,
        membership::MockMembershipRepository, seat::MockSeatRepository,
        user::MockUserRepository,
    },
    service::{identity::MockIdentityProvider, mailer::MockMailer},
};
use registry::{AppRegistry, AppRegistryParts};
use serde_json::{json, Value};
use shared::error::AppError;
use tower::ServiceExt;

use super::{health::build_health_check_routers, v1::routes};

const TOKEN: &str = "valid-token";

#[derive(Default)]
struct Mocks {
    health: MockHealthCheckRepository,
    auth: MockAuthRepository,
    user: MockUserRepository,
    library: MockLibraryRepository,
    seat: MockSeatRepository,
    booking: MockBookingRepository,
    forum: MockForumRepository,
    identity: MockIdentityProvider,
    mailer: MockMailer,
}

impl Mocks {
    // TOKEN をキャッシュ済みのトークンとして扱い、user をログインユーザーにする
    fn sign_in(&mut self, user: &User) {
        let identity = ExternalIdentity {
            subject: user.external_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        };
        self.auth
            .expect_fetch_identity_from_cache()
            .returning(move |token| Ok((token.0 == TOKEN).then(|| identity.clone())));
        let user = user.clone();
        self.user
            .expect_find_by_external_id()
            .returning(move |_| Ok(Some(user.clone())));
        self.identity
            .expect_fetch_identity()
            .returning(|_| Ok(None));
    }

    fn into_app(self) -> Router {
        let registry: AppRegistry = AppRegistryParts {
            health_check_repository: Arc::new(self.health),
            auth_repository: Arc::new(self.auth),
            user_repository: Arc::new(self.user),
            library_repository: Arc::new(self.library),
            seat_repository: Arc::new(self.seat),
            booking_repository: Arc::new(self.booking),
            membership_repository: Arc::new(MockMembershipRepository::new()),
            book_repository: Arc::new(MockBookRepository::new()),
            forum_repository: Arc::new(self.forum),
            analytics_repository: Arc::new(MockAnalyticsRepository::new()),
            identity_provider: Arc::new(self.identity),
            mailer: Arc::new(self.mailer),
            loan_period_days: 14,
        }
        .into();
        Router::new()
            .merge(build_health_check_routers())
            .merge(routes())
            .with_state(registry)
    }
}

fn user(role: Role, library_id: Option<LibraryId>) -> User {
    User {
        user_id: UserId::new(),
        external_id: "sub|42".into(),
        name: "Sam".into(),
        email: "sam@example.com".into(),
        phone: None,
        role,
        library_id,
        created_at: Utc::now(),
    }
}

fn library(owner: &User, status: LibraryStatus) -> Library {
    Library {
        library_id: LibraryId::new(),
        name: "Maple Reading Room".into(),
        description: String::new(),
        address: "1 Main St".into(),
        city: "Springfield".into(),
        phone: "555-0100".into(),
        email: "maple@example.com".into(),
        status,
        is_active: status == LibraryStatus::Approved,
        rejection_reason: None,
        approved_at: None,
        created_at: Utc::now(),
        owner: LibraryOwner {
            owner_id: owner.user_id,
            owner_name: owner.name.clone(),
            owner_email: owner.email.clone(),
        },
        opening_hours: vec![],
    }
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn health_check_does_not_require_a_token() {
    let mut mocks = Mocks::default();
    mocks.health.expect_check_db().returning(|| true);
    let app = mocks.into_app();

    let req = Request::get("/health/db").body(Body::empty()).unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = Mocks::default().into_app();

    let req = Request::get("/api/v1/users/me").body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Unauthorized"));
}

#[tokio::test]
async fn token_rejected_by_provider_is_unauthorized() {
    let mut mocks = Mocks::default();
    mocks
        .auth
        .expect_fetch_identity_from_cache()
        .returning(|_| Ok(None));
    mocks.identity.expect_fetch_identity().returning(|_| Ok(None));
    let app = mocks.into_app();

    let (status, _) = send(app, request(Method::GET, "/api/v1/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn member_cannot_list_users() {
    let mut mocks = Mocks::default();
    mocks.sign_in(&user(Role::Member, None));
    let app = mocks.into_app();

    let (status, body) = send(app, request(Method::GET, "/api/v1/users", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Forbidden"));
}

#[tokio::test]
async fn duplicate_registration_is_bad_request() {
    let mut mocks = Mocks::default();
    mocks.sign_in(&user(Role::Member, None));
    mocks.library.expect_register().times(1).returning(|_| {
        Err(AppError::DuplicateEntity(
            "a library with the same name or email already exists".into(),
        ))
    });
    let app = mocks.into_app();

    let body = json!({
        "name": "Maple Reading Room",
        "address": "1 Main St",
        "city": "Springfield",
        "phone": "555-0100",
        "email": "maple@example.com",
        "openingHours": [
            { "dayOfWeek": 1, "openTime": "09:00", "closeTime": "18:00", "isClosed": false }
        ]
    });
    let (status, body) = send(
        app,
        request(Method::POST, "/api/v1/libraries/register", Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn registration_with_bad_opening_hours_never_reaches_the_repository() {
    let mut mocks = Mocks::default();
    mocks.sign_in(&user(Role::Member, None));
    mocks.library.expect_register().never();
    let app = mocks.into_app();

    let body = json!({
        "name": "Maple Reading Room",
        "address": "1 Main St",
        "city": "Springfield",
        "phone": "555-0100",
        "email": "maple@example.com",
        "openingHours": [
            { "dayOfWeek": 1, "openTime": "18:00", "closeTime": "09:00", "isClosed": false }
        ]
    });
    let (status, _) = send(
        app,
        request(Method::POST, "/api/v1/libraries/register", Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn super_admin_approves_pending_library() {
    let admin = user(Role::SuperAdmin, None);
    let owner = user(Role::Member, None);
    let approved = library(&owner, LibraryStatus::Approved);
    let library_id = approved.library_id;

    let mut mocks = Mocks::default();
    mocks.sign_in(&admin);
    mocks
        .library
        .expect_approve()
        .withf(move |id| *id == library_id)
        .times(1)
        .returning(move |_| Ok(approved.clone()));
    mocks.mailer.expect_send().returning(|_| Ok(()));
    let app = mocks.into_app();

    let (status, body) = send(
        app,
        request(
            Method::POST,
            &format!("/api/v1/admin/libraries/{library_id}/approve"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("APPROVED"));
    assert_eq!(body["data"]["isActive"], json!(true));
}

#[tokio::test]
async fn library_admin_cannot_approve() {
    let mut mocks = Mocks::default();
    mocks.sign_in(&user(Role::Admin, Some(LibraryId::new())));
    mocks.library.expect_approve().never();
    let app = mocks.into_app();

    let uri = format!("/api/v1/admin/libraries/{}/approve", LibraryId::new());
    let (status, _) = send(app, request(Method::POST, &uri, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn library_list_reports_pagination_flags() {
    let owner = user(Role::Admin, None);
    let item = library(&owner, LibraryStatus::Approved);

    let mut mocks = Mocks::default();
    mocks
        .library
        .expect_find_all()
        .withf(|options| options.public_only && options.list.offset == 1 && options.list.limit == 1)
        .returning(move |options| {
            Ok(PaginatedList {
                total: 3,
                limit: options.list.limit,
                offset: options.list.offset,
                items: vec![item.clone()],
            })
        });
    let app = mocks.into_app();

    let req = Request::get("/api/v1/libraries?page=2&limit=1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["currentPage"], json!(2));
    assert_eq!(pagination["totalPages"], json!(3));
    assert_eq!(pagination["totalCount"], json!(3));
    assert_eq!(pagination["hasNextPage"], json!(true));
    assert_eq!(pagination["hasPrevPage"], json!(true));
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn page_zero_is_rejected() {
    let app = Mocks::default().into_app();

    let req = Request::get("/api/v1/libraries?page=0")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pending_library_is_hidden_from_anonymous_viewers() {
    let owner = user(Role::Member, None);
    let pending = library(&owner, LibraryStatus::Pending);
    let library_id = pending.library_id;

    let mut mocks = Mocks::default();
    mocks
        .library
        .expect_find_by_id()
        .returning(move |_| Ok(Some(pending.clone())));
    let app = mocks.into_app();

    let req = Request::get(format!("/api/v1/libraries/{library_id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn liking_a_post_returns_the_new_state() {
    let member = user(Role::Member, None);
    let member_id = member.user_id;
    let post_id = PostId::new();

    let mut mocks = Mocks::default();
    mocks.sign_in(&member);
    mocks
        .forum
        .expect_toggle_post_like()
        .withf(move |event| event.post_id == post_id && event.user_id == member_id)
        .times(1)
        .returning(|_| {
            Ok(LikeState {
                is_liked: true,
                like_count: 8,
            })
        });
    let app = mocks.into_app();

    let uri = format!("/api/v1/forum/posts/{post_id}/like");
    let (status, body) = send(app, request(Method::POST, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "isLiked": true, "likeCount": 8 }));
}

#[tokio::test]
async fn post_list_with_invalid_token_is_served_anonymously() {
    let mut mocks = Mocks::default();
    mocks
        .auth
        .expect_fetch_identity_from_cache()
        .returning(|_| Ok(None));
    mocks.identity.expect_fetch_identity().returning(|_| Ok(None));
    mocks
        .forum
        .expect_find_posts()
        .withf(|options| options.viewer.is_none())
        .returning(|options| {
            Ok(PaginatedList {
                total: 0,
                limit: options.list.limit,
                offset: options.list.offset,
                items: vec![],
            })
        });
    let app = mocks.into_app();

    let (status, body) = send(app, request(Method::GET, "/api/v1/forum/posts", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalCount"], json!(0));
    assert_eq!(body["data"]["pagination"]["hasNextPage"], json!(false));
}

#[tokio::test]
async fn reject_without_a_body_has_no_reason() {
    let admin = user(Role::SuperAdmin, None);
    let owner = user(Role::Member, None);
    let rejected = library(&owner, LibraryStatus::Rejected);
    let library_id = rejected.library_id;

    let mut mocks = Mocks::default();
    mocks.sign_in(&admin);
    mocks
        .library
        .expect_reject()
        .withf(move |event| event.library_id == library_id && event.reason.is_none())
        .times(1)
        .returning(move |_| Ok(rejected.clone()));
    mocks.mailer.expect_send().returning(|_| Ok(()));
    let app = mocks.into_app();

    // Content-Type も本文もないリクエスト
    let uri = format!("/api/v1/admin/libraries/{library_id}/reject");
    let (status, body) = send(app, request(Method::POST, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("REJECTED"));
}

#[tokio::test]
async fn reject_with_a_reason_passes_it_through() {
    let admin = user(Role::SuperAdmin, None);
    let owner = user(Role::Member, None);
    let rejected = library(&owner, LibraryStatus::Rejected);
    let library_id = rejected.library_id;

    let mut mocks = Mocks::default();
    mocks.sign_in(&admin);
    mocks
        .library
        .expect_reject()
        .withf(|event| event.reason.as_deref() == Some("incomplete address"))
        .times(1)
        .returning(move |_| Ok(rejected.clone()));
    mocks.mailer.expect_send().returning(|_| Ok(()));
    let app = mocks.into_app();

    let uri = format!("/api/v1/admin/libraries/{library_id}/reject");
    let body = json!({ "reason": "incomplete address" });
    let (status, _) = send(app, request(Method::POST, &uri, Some(body))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_path_id_uses_the_error_envelope() {
    let mut mocks = Mocks::default();
    mocks.library.expect_find_by_id().never();
    let app = mocks.into_app();

    let req = Request::get("/api/v1/libraries/not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("BadRequest"));
}

#[tokio::test]
async fn malformed_json_body_uses_the_error_envelope() {
    let mut mocks = Mocks::default();
    mocks.sign_in(&user(Role::Member, None));
    mocks.library.expect_register().never();
    let app = mocks.into_app();

    let req = Request::post("/api/v1/libraries/register")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("BadRequest"));
}

#[tokio::test]
async fn token_cache_failure_falls_back_to_the_provider() {
    let member = user(Role::Member, None);
    let identity = ExternalIdentity {
        subject: member.external_id.clone(),
        email: member.email.clone(),
        name: member.name.clone(),
    };

    let mut mocks = Mocks::default();
    mocks
        .auth
        .expect_fetch_identity_from_cache()
        .returning(|_| Err(AppError::ExternalServiceError("cache unavailable".into())));
    mocks
        .identity
        .expect_fetch_identity()
        .times(1)
        .returning(move |_| Ok(Some(identity.clone())));
    mocks.auth.expect_cache_identity().returning(|_, _| Ok(()));
    let found = member.clone();
    mocks
        .user
        .expect_find_by_external_id()
        .returning(move |_| Ok(Some(found.clone())));
    let app = mocks.into_app();

    let (status, body) = send(app, request(Method::GET, "/api/v1/users/me", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!(member.email));
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn next_week() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(7)
}

// date の曜日に 09:00 - 18:00 の開館時間を持つ図書館
fn library_open_on(owner: &User, status: LibraryStatus, date: NaiveDate, is_closed: bool) -> Library {
    Library {
        opening_hours: vec![OpeningHours {
            day_of_week: date.weekday().num_days_from_sunday() as i16,
            open_time: time("09:00"),
            close_time: time("18:00"),
            is_closed,
        }],
        ..library(owner, status)
    }
}

fn booking_body(date: NaiveDate, start: &str, end: &str) -> Value {
    json!({
        "seatId": SeatId::new().to_string(),
        "date": date.format("%Y-%m-%d").to_string(),
        "startTime": start,
        "endTime": end,
    })
}

async fn create_booking_with(library: Option<Library>, body: Value) -> (StatusCode, Value) {
    let member = user(Role::Member, None);
    let library_id = library
        .as_ref()
        .map(|l| l.library_id)
        .unwrap_or_else(LibraryId::new);

    let mut mocks = Mocks::default();
    mocks.sign_in(&member);
    mocks
        .library
        .expect_find_by_id()
        .returning(move |_| Ok(library.clone()));
    mocks.booking.expect_create().never();
    let app = mocks.into_app();

    let uri = format!("/api/v1/libraries/{library_id}/bookings");
    send(app, request(Method::POST, &uri, Some(body))).await
}

#[tokio::test]
async fn booking_in_the_past_is_rejected() {
    let owner = user(Role::Admin, None);
    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let library = library_open_on(&owner, LibraryStatus::Approved, yesterday, false);

    let (status, body) =
        create_booking_with(Some(library), booking_body(yesterday, "10:00", "11:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("BadRequest"));
}

#[tokio::test]
async fn booking_at_a_pending_library_is_rejected() {
    let owner = user(Role::Admin, None);
    let date = next_week();
    let library = library_open_on(&owner, LibraryStatus::Pending, date, false);

    let (status, _) = create_booking_with(Some(library), booking_body(date, "10:00", "11:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_at_an_inactive_library_is_rejected() {
    let owner = user(Role::Admin, None);
    let date = next_week();
    let library = Library {
        is_active: false,
        ..library_open_on(&owner, LibraryStatus::Approved, date, false)
    };

    let (status, _) = create_booking_with(Some(library), booking_body(date, "10:00", "11:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_outside_opening_hours_is_rejected() {
    let owner = user(Role::Admin, None);
    let date = next_week();
    let library = library_open_on(&owner, LibraryStatus::Approved, date, false);

    let (status, _) = create_booking_with(Some(library), booking_body(date, "20:00", "21:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_on_a_closed_day_is_rejected() {
    let owner = user(Role::Admin, None);
    let date = next_week();
    let library = library_open_on(&owner, LibraryStatus::Approved, date, true);

    let (status, _) = create_booking_with(Some(library), booking_body(date, "10:00", "11:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_at_an_unknown_library_is_not_found() {
    let (status, _) = create_booking_with(None, booking_body(next_week(), "10:00", "11:00")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn member_cannot_cancel_someone_elses_booking() {
    let member = user(Role::Member, None);
    let booking_id = BookingId::new();
    let date = next_week();
    let booking = SeatBooking {
        booking_id,
        library_id: LibraryId::new(),
        library_name: "Maple Reading Room".into(),
        user: BookingUser {
            user_id: UserId::new(),
            name: "Alex".into(),
            email: "alex@example.com".into(),
        },
        seat: BookingSeat {
            seat_id: SeatId::new(),
            seat_number: "A-1".into(),
            seat_type_name: "Standard".into(),
        },
        window: BookingWindow::new(date, time("10:00"), time("11:00")).unwrap(),
        status: BookingStatus::Confirmed,
        price: 500,
        created_at: Utc::now(),
        cancelled_at: None,
        payment: None,
    };

    let mut mocks = Mocks::default();
    mocks.sign_in(&member);
    mocks
        .booking
        .expect_find_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    mocks.booking.expect_cancel().never();
    let app = mocks.into_app();

    let uri = format!("/api/v1/bookings/{booking_id}/cancel");
    let (status, body) = send(app, request(Method::POST, &uri, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Forbidden"));
}

#[tokio::test]
async fn availability_of_an_unknown_library_is_not_found() {
    let mut mocks = Mocks::default();
    mocks.library.expect_find_by_id().returning(|_| Ok(None));
    mocks.seat.expect_find_availability().never();
    let app = mocks.into_app();

    let uri = format!(
        "/api/v1/libraries/{}/seats/availability?date={}&startTime=10:00&endTime=11:00",
        LibraryId::new(),
        next_week().format("%Y-%m-%d"),
    );
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_of_a_pending_library_is_not_found() {
    let owner = user(Role::Admin, None);
    let pending = library(&owner, LibraryStatus::Pending);
    let library_id = pending.library_id;

    let mut mocks = Mocks::default();
    mocks
        .library
        .expect_find_by_id()
        .returning(move |_| Ok(Some(pending.clone())));
    mocks.seat.expect_find_availability().never();
    let app = mocks.into_app();

    let uri = format!(
        "/api/v1/libraries/{library_id}/seats/availability?date={}&startTime=10:00&endTime=11:00",
        next_week().format("%Y-%m-%d"),
    );
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
