//! In-memory backends that record every call.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use inovoid_bff::{AuthBackend, NotificationBackend, NotificationSource, ProfileBackend};
use inovoid_client::{ApiError, Notification, NotificationKind, PostTitle, Profile, ProfileSummary, User};
use inovoid_realtime::{RealtimeError, Subscription};
use tokio::sync::mpsc;

pub fn boom() -> ApiError {
    ApiError::Server {
        status: 500,
        code: None,
        message: "boom".into(),
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// Notification for `u1` created `minute` minutes after a fixed instant.
pub fn notif(id: &str, minute: i64, read: bool) -> Notification {
    Notification {
        id: id.into(),
        user_id: "u1".into(),
        actor_id: Some("u2".into()),
        post_id: Some(format!("post-{}", id)),
        kind: NotificationKind::Like,
        read,
        created_at: base_time() + chrono::Duration::minutes(minute),
        actor: Some(ProfileSummary {
            id: "u2".into(),
            full_name: Some("Ana".into()),
            ..Default::default()
        }),
        post: Some(PostTitle {
            id: format!("post-{}", id),
            title: Some("Hello".into()),
        }),
    }
}

#[derive(Default)]
pub struct FakeNotifications {
    rows: Mutex<Vec<Notification>>,
    calls: Mutex<Vec<&'static str>>,
    pub fail_count: AtomicBool,
    pub fail_list: AtomicBool,
}

impl FakeNotifications {
    pub fn with_rows(rows: Vec<Notification>) -> Arc<Self> {
        let fake = Self::default();
        *fake.rows.lock().unwrap() = rows;
        Arc::new(fake)
    }

    /// A row the server created.
    pub fn insert(&self, row: Notification) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NotificationBackend for FakeNotifications {
    async fn unread_count(&self, user_id: &str) -> Result<u64, ApiError> {
        self.record("count");
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(boom());
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|n| n.user_id == user_id && !n.read).count() as u64)
    }

    async fn recent(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        self.record("list");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(boom());
        }
        let mut rows: Vec<Notification> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(20);
        Ok(rows)
    }

    async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.record("mark_read");
        for n in self.rows.lock().unwrap().iter_mut() {
            if n.id == notification_id {
                n.read = true;
            }
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<(), ApiError> {
        self.record("mark_all_read");
        for n in self.rows.lock().unwrap().iter_mut() {
            if n.user_id == user_id {
                n.read = true;
            }
        }
        Ok(())
    }
}

/// Realtime source the test pushes rows into.
#[derive(Default)]
pub struct FakeRealtime {
    senders: Mutex<Vec<mpsc::Sender<Notification>>>,
    /// Per-call connect latency, consumed in call order.
    pub delays: Mutex<VecDeque<Duration>>,
    pub subscribes: AtomicUsize,
    pub refuse: AtomicBool,
}

impl FakeRealtime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delay_next(&self, delays: &[u64]) {
        self.delays
            .lock()
            .unwrap()
            .extend(delays.iter().map(|ms| Duration::from_millis(*ms)));
    }

    fn latest(&self) -> Option<mpsc::Sender<Notification>> {
        self.senders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|tx| !tx.is_closed())
            .cloned()
    }

    /// Subscriptions whose receiving end is still held.
    pub fn live(&self) -> usize {
        self.senders.lock().unwrap().iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Deliver a row on the newest live subscription. False if none is left.
    pub async fn push(&self, row: Notification) -> bool {
        match self.latest() {
            Some(tx) => tx.send(row).await.is_ok(),
            None => false,
        }
    }

    pub fn is_closed(&self, index: usize) -> bool {
        self.senders
            .lock()
            .unwrap()
            .get(index)
            .map(|tx| tx.is_closed())
            .unwrap_or(true)
    }
}

#[async_trait]
impl NotificationSource for FakeRealtime {
    async fn subscribe(&self, _user_id: &str) -> Result<Subscription<Notification>, RealtimeError> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(RealtimeError::Closed("refused".into()));
        }
        let (tx, subscription) = Subscription::channel(16);
        self.senders.lock().unwrap().push(tx);
        Ok(subscription)
    }
}

pub fn user(id: &str, email: &str) -> User {
    User {
        id: id.into(),
        email: Some(email.into()),
        user_metadata: serde_json::Value::Null,
    }
}

#[derive(Default)]
pub struct FakeAuth {
    pub user: Mutex<Option<User>>,
    pub password: Mutex<Option<String>>,
    pub last_metadata: Mutex<Option<serde_json::Value>>,
    pub confirm_email: AtomicBool,
    pub sign_outs: AtomicUsize,
}

impl FakeAuth {
    pub fn signed_in(user: User) -> Arc<Self> {
        let fake = Self::default();
        *fake.user.lock().unwrap() = Some(user);
        Arc::new(fake)
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn current_user(&self) -> Option<User> {
        self.user.lock().unwrap().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        if password != "secret" {
            return Err(ApiError::Server {
                status: 400,
                code: Some("invalid_credentials".into()),
                message: "Invalid login credentials".into(),
            });
        }
        let user = user("u1", email);
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, email: &str, _password: &str, metadata: serde_json::Value) -> Result<Option<User>, ApiError> {
        *self.last_metadata.lock().unwrap() = Some(metadata);
        if self.confirm_email.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let user = user("u1", email);
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(Some(user))
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.user.lock().unwrap() = None;
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ApiError> {
        if new_password.len() < 6 {
            return Err(ApiError::Server {
                status: 422,
                code: Some("weak_password".into()),
                message: "Password should be at least 6 characters".into(),
            });
        }
        if self.user.lock().unwrap().is_none() {
            return Err(ApiError::Auth("not signed in".into()));
        }
        *self.password.lock().unwrap() = Some(new_password.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProfiles {
    pub profile: Mutex<Option<Profile>>,
    pub fail: AtomicBool,
}

impl FakeProfiles {
    pub fn with(profile: Option<Profile>) -> Arc<Self> {
        let fake = Self::default();
        *fake.profile.lock().unwrap() = profile;
        Arc::new(fake)
    }
}

#[async_trait]
impl ProfileBackend for FakeProfiles {
    async fn profile(&self, _user_id: &str) -> Result<Option<Profile>, ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(boom());
        }
        Ok(self.profile.lock().unwrap().clone())
    }
}

/// Poll `cond` until it holds, failing the test after about a second.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}
