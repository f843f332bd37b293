//! In-memory repositories and fixtures for service tests

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use ride_common::auth::JwtService;
use ride_core::entities::{Circle, Invitation, Membership, NewRide, Profile, Rating, Ride, User};
use ride_core::traits::{
    CircleMember, CircleOrdering, CircleQuery, CircleRepository, CircleSortField,
    InvitationRedemption, InvitationRepository, MembershipRepository, RatingRepository,
    RepoResult, RideRepository, UserRepository,
};
use ride_core::{DomainError, Snowflake, SnowflakeGenerator};
use ride_queue::{QueueError, QueueResult, Task, TaskDispatcher};
use uuid::Uuid;

use super::context::ServiceContext;

#[derive(Default)]
struct State {
    users: Vec<User>,
    passwords: HashMap<Snowflake, String>,
    profiles: HashMap<Snowflake, Profile>,
    circles: Vec<Circle>,
    memberships: Vec<Membership>,
    invitations: Vec<Invitation>,
    rides: Vec<Ride>,
    passengers: Vec<(Snowflake, Snowflake)>,
    ratings: Vec<Rating>,
}

impl State {
    fn member(&self, membership: &Membership) -> Option<CircleMember> {
        let user = self.users.iter().find(|u| u.id == membership.user_id)?.clone();
        let profile = self.profiles.get(&user.id)?.clone();
        Some(CircleMember {
            membership: membership.clone(),
            user,
            profile,
        })
    }

    fn active_count(&self, circle_id: Snowflake) -> usize {
        self.memberships
            .iter()
            .filter(|m| m.circle_id == circle_id && m.is_active)
            .count()
    }
}

/// Every repository trait over one shared in-memory state
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.state.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.state.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self.state.lock().users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.state.lock().users.iter().any(|u| u.email == email))
    }

    async fn create(&self, user: &User, profile: &Profile, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        state.users.push(user.clone());
        state.passwords.insert(user.id, password_hash.to_string());
        state.profiles.insert(user.id, profile.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| DomainError::UserNotFound(user.id.to_string()))?;
        *stored = user.clone();
        Ok(())
    }

    async fn set_verified(&self, username: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.username == username) {
            user.is_verified = true;
        }
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self.state.lock().passwords.get(&id).cloned())
    }

    async fn find_profile(&self, user_id: Snowflake) -> RepoResult<Option<Profile>> {
        Ok(self.state.lock().profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, profile: &Profile) -> RepoResult<()> {
        let mut state = self.state.lock();
        if let Some(stored) = state.profiles.get_mut(&profile.user_id) {
            stored.picture.clone_from(&profile.picture);
            stored.biography.clone_from(&profile.biography);
            stored.updated_at = profile.updated_at;
        }
        Ok(())
    }
}

#[async_trait]
impl CircleRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Circle>> {
        Ok(self.state.lock().circles.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug_name: &str) -> RepoResult<Option<Circle>> {
        Ok(self
            .state
            .lock()
            .circles
            .iter()
            .find(|c| c.slug_name == slug_name)
            .cloned())
    }

    async fn slug_exists(&self, slug_name: &str) -> RepoResult<bool> {
        Ok(self.state.lock().circles.iter().any(|c| c.slug_name == slug_name))
    }

    async fn list_public(&self, query: &CircleQuery) -> RepoResult<Vec<Circle>> {
        let state = self.state.lock();
        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let mut circles: Vec<Circle> = state
            .circles
            .iter()
            .filter(|c| c.is_public)
            .filter(|c| query.is_verified.is_none_or(|v| c.is_verified == v))
            .filter(|c| query.is_limited.is_none_or(|v| c.is_limited == v))
            .filter(|c| {
                search.as_ref().is_none_or(|s| {
                    c.slug_name.to_lowercase().contains(s) || c.name.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();

        match query.ordering {
            CircleOrdering::Popularity => circles.sort_by_key(|c| {
                (
                    Reverse(state.active_count(c.id)),
                    Reverse(c.rides_offered),
                    Reverse(c.rides_taken),
                )
            }),
            CircleOrdering::By { field, descending } => {
                circles.sort_by(|a, b| {
                    let ord = match field {
                        CircleSortField::RidesOffered => a.rides_offered.cmp(&b.rides_offered),
                        CircleSortField::RidesTaken => a.rides_taken.cmp(&b.rides_taken),
                        CircleSortField::Name => a.name.cmp(&b.name),
                        CircleSortField::Created => a.created_at.cmp(&b.created_at),
                        CircleSortField::MembersLimit => a.members_limit.cmp(&b.members_limit),
                    };
                    if descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                });
            }
        }

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(circles.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Circle>> {
        let state = self.state.lock();
        Ok(state
            .circles
            .iter()
            .filter(|c| {
                state
                    .memberships
                    .iter()
                    .any(|m| m.circle_id == c.id && m.user_id == user_id && m.is_active)
            })
            .cloned()
            .collect())
    }

    async fn create_with_founder(&self, circle: &Circle, founder: &Membership) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.circles.iter().any(|c| c.slug_name == circle.slug_name) {
            return Err(DomainError::SlugAlreadyExists);
        }
        state.circles.push(circle.clone());
        state.memberships.push(founder.clone());
        Ok(())
    }

    async fn update(&self, circle: &Circle) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .circles
            .iter_mut()
            .find(|c| c.id == circle.id)
            .ok_or_else(|| DomainError::CircleNotFound(circle.slug_name.clone()))?;
        *stored = circle.clone();
        Ok(())
    }

    async fn set_verified(&self, slug_names: &[String], verified: bool) -> RepoResult<u64> {
        let mut state = self.state.lock();
        let mut changed = 0;
        for circle in state
            .circles
            .iter_mut()
            .filter(|c| slug_names.contains(&c.slug_name) && c.is_verified != verified)
        {
            circle.is_verified = verified;
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn find(&self, circle_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<Membership>> {
        Ok(self
            .state
            .lock()
            .memberships
            .iter()
            .find(|m| m.circle_id == circle_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_active_member(
        &self,
        circle_id: Snowflake,
        username: &str,
    ) -> RepoResult<Option<CircleMember>> {
        let state = self.state.lock();
        let Some(user) = state.users.iter().find(|u| u.username == username) else {
            return Ok(None);
        };
        Ok(state
            .memberships
            .iter()
            .find(|m| m.circle_id == circle_id && m.user_id == user.id && m.is_active)
            .and_then(|m| state.member(m)))
    }

    async fn list_active_members(&self, circle_id: Snowflake) -> RepoResult<Vec<CircleMember>> {
        let state = self.state.lock();
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.circle_id == circle_id && m.is_active)
            .filter_map(|m| state.member(m))
            .collect())
    }

    async fn list_invited_by(
        &self,
        circle_id: Snowflake,
        inviter: Snowflake,
    ) -> RepoResult<Vec<CircleMember>> {
        let state = self.state.lock();
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.circle_id == circle_id && m.is_active && m.invited_by == Some(inviter))
            .filter_map(|m| state.member(m))
            .collect())
    }

    async fn count_active(&self, circle_id: Snowflake) -> RepoResult<i64> {
        Ok(i64::try_from(self.state.lock().active_count(circle_id)).unwrap_or(i64::MAX))
    }

    async fn redeem_invitation(&self, redemption: &InvitationRedemption) -> RepoResult<()> {
        let mut state = self.state.lock();
        let new = &redemption.membership;

        let invitation = state
            .invitations
            .iter()
            .position(|i| i.id == redemption.invitation_id && !i.used)
            .ok_or(DomainError::InvalidInvitation)?;
        let existing = state
            .memberships
            .iter()
            .position(|m| m.circle_id == new.circle_id && m.user_id == new.user_id);
        if existing.is_some_and(|i| state.memberships[i].is_active) {
            return Err(DomainError::AlreadyMember);
        }

        let invitation = &mut state.invitations[invitation];
        invitation.used = true;
        invitation.used_by = Some(new.user_id);
        invitation.used_at = Some(Utc::now());

        match existing {
            Some(i) => state.memberships[i].rejoin(new),
            None => state.memberships.push(new.clone()),
        }

        if let Some(issuer) = state
            .memberships
            .iter_mut()
            .find(|m| m.id == redemption.issuer_membership_id)
        {
            issuer.used_invitations += 1;
            issuer.remaining_invitations = (issuer.remaining_invitations - 1).max(0);
        }
        Ok(())
    }

    async fn deactivate(&self, membership_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let membership = state
            .memberships
            .iter_mut()
            .find(|m| m.id == membership_id)
            .ok_or(DomainError::MembershipNotFound)?;
        membership.is_active = false;
        Ok(())
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Invitation>> {
        Ok(self
            .state
            .lock()
            .invitations
            .iter()
            .find(|i| i.code == code)
            .cloned())
    }

    async fn list_unused(
        &self,
        circle_id: Snowflake,
        issued_by: Snowflake,
    ) -> RepoResult<Vec<Invitation>> {
        Ok(self
            .state
            .lock()
            .invitations
            .iter()
            .filter(|i| i.circle_id == circle_id && i.issued_by == issued_by && !i.used)
            .cloned()
            .collect())
    }

    async fn create_many(&self, invitations: &[Invitation]) -> RepoResult<()> {
        self.state.lock().invitations.extend_from_slice(invitations);
        Ok(())
    }
}

#[async_trait]
impl RideRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ride>> {
        Ok(self.state.lock().rides.iter().find(|r| r.id == id).cloned())
    }

    async fn list_available(
        &self,
        circle_id: Snowflake,
        departs_after: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>> {
        let mut rides: Vec<Ride> = self
            .state
            .lock()
            .rides
            .iter()
            .filter(|r| {
                r.offered_in == circle_id
                    && r.is_active
                    && r.available_seats >= 1
                    && r.departure_date >= departs_after
            })
            .cloned()
            .collect();
        rides.sort_by_key(|r| (r.departure_date, r.id));
        Ok(rides)
    }

    async fn list_passengers(&self, ride_id: Snowflake) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        Ok(state
            .passengers
            .iter()
            .filter(|(ride, _)| *ride == ride_id)
            .filter_map(|(_, user)| state.users.iter().find(|u| u.id == *user).cloned())
            .collect())
    }

    async fn is_passenger(&self, ride_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self.state.lock().passengers.contains(&(ride_id, user_id)))
    }

    async fn create_offer(&self, ride: &Ride, membership_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.rides.push(ride.clone());
        if let Some(circle) = state.circles.iter_mut().find(|c| c.id == ride.offered_in) {
            circle.rides_offered += 1;
        }
        if let Some(membership) = state.memberships.iter_mut().find(|m| m.id == membership_id) {
            membership.rides_offered += 1;
        }
        if let Some(profile) = state.profiles.get_mut(&ride.offered_by) {
            profile.rides_offered += 1;
        }
        Ok(())
    }

    async fn update(&self, ride: &Ride) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .rides
            .iter_mut()
            .find(|r| r.id == ride.id)
            .ok_or(DomainError::RideNotFound(ride.id))?;
        *stored = ride.clone();
        Ok(())
    }

    async fn add_passenger(
        &self,
        ride: &Ride,
        user_id: Snowflake,
        membership_id: Snowflake,
    ) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.passengers.contains(&(ride.id, user_id)) {
            return Err(DomainError::AlreadyPassenger);
        }
        let stored = state
            .rides
            .iter_mut()
            .find(|r| r.id == ride.id && r.is_active && r.available_seats > 0)
            .ok_or(DomainError::RideFull)?;
        stored.available_seats -= 1;
        state.passengers.push((ride.id, user_id));

        if let Some(profile) = state.profiles.get_mut(&user_id) {
            profile.rides_taken += 1;
        }
        if let Some(membership) = state.memberships.iter_mut().find(|m| m.id == membership_id) {
            membership.rides_taken += 1;
        }
        if let Some(circle) = state.circles.iter_mut().find(|c| c.id == ride.offered_in) {
            circle.rides_taken += 1;
        }
        Ok(())
    }

    async fn finish(&self, ride_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let ride = state
            .rides
            .iter_mut()
            .find(|r| r.id == ride_id)
            .ok_or(DomainError::RideNotFound(ride_id))?;
        ride.is_active = false;
        Ok(())
    }

    async fn disable_finished(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut state = self.state.lock();
        let mut disabled = 0;
        for ride in state
            .rides
            .iter_mut()
            .filter(|r| r.is_active && r.arrival_date <= now)
        {
            ride.is_active = false;
            disabled += 1;
        }
        Ok(disabled)
    }

    async fn list_departing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>> {
        let mut rides: Vec<Ride> = self
            .state
            .lock()
            .rides
            .iter()
            .filter(|r| r.departure_date >= from && r.departure_date < to)
            .cloned()
            .collect();
        rides.sort_by_key(|r| (r.departure_date, r.id));
        Ok(rides)
    }
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn exists(&self, ride_id: Snowflake, rating_user: Snowflake) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .ratings
            .iter()
            .any(|r| r.ride_id == ride_id && r.rating_user == rating_user))
    }

    async fn create_and_refresh(&self, rating: &Rating) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state
            .ratings
            .iter()
            .any(|r| r.ride_id == rating.ride_id && r.rating_user == rating.rating_user)
        {
            return Err(DomainError::AlreadyRated);
        }
        state.ratings.push(rating.clone());

        let average = |values: Vec<i32>| {
            let count = values.len() as f64;
            f64::from(values.iter().sum::<i32>()) / count
        };
        let ride_scores: Vec<i32> = state
            .ratings
            .iter()
            .filter(|r| r.ride_id == rating.ride_id)
            .map(|r| r.rating)
            .collect();
        let user_scores: Vec<i32> = state
            .ratings
            .iter()
            .filter(|r| r.rated_user == rating.rated_user)
            .map(|r| r.rating)
            .collect();
        let ride_average = average(ride_scores);
        let reputation = average(user_scores);

        if let Some(ride) = state.rides.iter_mut().find(|r| r.id == rating.ride_id) {
            ride.rating = Some(ride_average);
        }
        if let Some(profile) = state.profiles.get_mut(&rating.rated_user) {
            profile.reputation = reputation;
        }
        Ok(())
    }
}

/// Records dispatched tasks instead of queueing them
#[derive(Default)]
pub struct RecordingDispatcher {
    tasks: Mutex<Vec<Task>>,
    failing: Mutex<bool>,
}

impl RecordingDispatcher {
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn fail(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

#[async_trait]
impl TaskDispatcher for RecordingDispatcher {
    async fn dispatch(&self, task: Task) -> QueueResult<Uuid> {
        if *self.failing.lock() {
            let err = serde_json::from_str::<Task>("{}").unwrap_err();
            return Err(QueueError::Serialization(err));
        }
        self.tasks.lock().push(task);
        Ok(Uuid::new_v4())
    }
}

pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub store: Arc<MemoryStore>,
    pub dispatcher: Arc<RecordingDispatcher>,
    ids: Arc<SnowflakeGenerator>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let ids = Arc::new(SnowflakeGenerator::new(7));
        let ctx = ServiceContext::builder()
            .user_repo(store.clone())
            .circle_repo(store.clone())
            .membership_repo(store.clone())
            .invitation_repo(store.clone())
            .ride_repo(store.clone())
            .rating_repo(store.clone())
            .dispatcher(dispatcher.clone())
            .jwt_service(Arc::new(JwtService::new(
                "service-tests-secret-at-least-32-bytes",
                3600,
                3 * 24 * 3600,
            )))
            .snowflake_generator(ids.clone())
            .build()
            .unwrap();
        Self {
            ctx: Arc::new(ctx),
            store,
            dispatcher,
            ids,
        }
    }

    fn insert_user(&self, username: &str, verified: bool, staff: bool) -> User {
        let mut user = User::new(
            self.ids.generate(),
            format!("{username}@example.com"),
            username.to_string(),
            "Test".to_string(),
            "Rider".to_string(),
        );
        user.is_verified = verified;
        user.is_staff = staff;

        let mut state = self.store.state.lock();
        state.profiles.insert(user.id, Profile::new(user.id));
        state.passwords.insert(user.id, "unused".to_string());
        state.users.push(user.clone());
        user
    }

    /// A verified account
    pub fn user(&self, username: &str) -> User {
        self.insert_user(username, true, false)
    }

    pub fn unverified_user(&self, username: &str) -> User {
        self.insert_user(username, false, false)
    }

    pub fn staff(&self, username: &str) -> User {
        self.insert_user(username, true, true)
    }

    pub fn circle(&self, slug: &str, founder: &User) -> Circle {
        let circle = Circle::new(self.ids.generate(), slug.to_uppercase(), slug.to_string());
        self.insert_circle(circle, founder)
    }

    pub fn limited_circle(&self, slug: &str, founder: &User, limit: i32) -> Circle {
        let circle = Circle::new(self.ids.generate(), slug.to_uppercase(), slug.to_string())
            .with_limit(true, limit);
        self.insert_circle(circle, founder)
    }

    fn insert_circle(&self, circle: Circle, founder: &User) -> Circle {
        let mut state = self.store.state.lock();
        state
            .memberships
            .push(Membership::founder(self.ids.generate(), founder.id, circle.id));
        state.circles.push(circle.clone());
        circle
    }

    fn circle_id(&self, slug: &str) -> Snowflake {
        self.store
            .state
            .lock()
            .circles
            .iter()
            .find(|c| c.slug_name == slug)
            .map(|c| c.id)
            .unwrap()
    }

    /// Add an active plain member without spending an invitation
    pub fn join(&self, slug: &str, user_id: Snowflake) -> Membership {
        let membership = Membership::new(self.ids.generate(), user_id, self.circle_id(slug));
        self.store.state.lock().memberships.push(membership.clone());
        membership
    }

    /// Store an unused code issued by `issuer`, ignoring their quota
    pub fn invitation(&self, slug: &str, issuer: &User) -> String {
        let invitation = Invitation::issue(self.ids.generate(), issuer.id, self.circle_id(slug));
        let code = invitation.code.clone();
        self.store.state.lock().invitations.push(invitation);
        code
    }

    pub fn membership_of(&self, slug: &str, user_id: Snowflake) -> Option<Membership> {
        let circle_id = self.circle_id(slug);
        self.store
            .state
            .lock()
            .memberships
            .iter()
            .find(|m| m.circle_id == circle_id && m.user_id == user_id)
            .cloned()
    }

    pub fn profile_of(&self, user_id: Snowflake) -> Profile {
        self.store.state.lock().profiles[&user_id].clone()
    }

    /// Insert a ride directly, bypassing the departure window
    pub fn ride(
        &self,
        slug: &str,
        offered_by: Snowflake,
        departure: DateTime<Utc>,
        seats: i32,
    ) -> Snowflake {
        let ride = Ride::offer(
            self.ids.generate(),
            offered_by,
            self.circle_id(slug),
            NewRide {
                available_seats: seats,
                comments: String::new(),
                departure_location: "Ciudad Universitaria".to_string(),
                departure_date: departure,
                arrival_location: "Polanco".to_string(),
                arrival_date: departure + Duration::hours(1),
            },
        );
        let id = ride.id;
        self.store.state.lock().rides.push(ride);
        id
    }

    pub fn ride_by_id(&self, id: Snowflake) -> Ride {
        self.store
            .state
            .lock()
            .rides
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .unwrap()
    }

    pub fn set_seats(&self, id: Snowflake, seats: i32) {
        self.with_ride(id, |ride| ride.available_seats = seats);
    }

    /// Move a ride's schedule by `by`
    pub fn shift_ride(&self, id: Snowflake, by: Duration) {
        self.with_ride(id, |ride| {
            ride.departure_date += by;
            ride.arrival_date += by;
        });
    }

    fn with_ride(&self, id: Snowflake, f: impl FnOnce(&mut Ride)) {
        let mut state = self.store.state.lock();
        let ride = state.rides.iter_mut().find(|r| r.id == id).unwrap();
        f(ride);
    }
}
