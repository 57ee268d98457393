//! In-memory social store for testing
//!
//! Every repository shares one mutex-guarded set of tables, so each
//! multi-table write is applied atomically just like its PostgreSQL
//! transaction.

use agora_db::{
    ActivityRepository, ActivityRow, CreateActivity, CreateImage, CreatePost, CreateUser,
    CreateVerificationSession, DbResult, FeedPostRow, FollowProfileRow, FollowRepository,
    HashtagRow, ImageRepository, LikeRepository, PostHashtagRow, PostImageRow, PostLikerRow,
    PostRepository, PostRow, UpdateProfile, UserRepository, UserRow,
};
use agora_social_core::{BlobError, BlobStore, SocialStore};
use agora_types::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
pub struct Tables {
    pub users: HashMap<Uuid, UserRow>,
    pub follows: BTreeSet<(Uuid, Uuid)>,
    pub posts: HashMap<Uuid, PostRow>,
    pub images: HashMap<Uuid, PostImageRow>,
    pub hashtags: HashMap<Uuid, HashtagRow>,
    pub post_hashtags: BTreeSet<(Uuid, Uuid)>,
    /// (post_id, user_id) in insertion order
    pub likes: Vec<(Uuid, Uuid)>,
    pub activities: Vec<ActivityRow>,
}

impl Tables {
    fn user_by_username(&self, username: &str) -> Option<&UserRow> {
        self.users
            .values()
            .find(|u| u.username.as_deref() == Some(username))
    }

    fn summary(&self, user_id: Uuid) -> FollowProfileRow {
        let user = self.users.get(&user_id);
        FollowProfileRow {
            user_id,
            username: user.and_then(|u| u.username.clone()),
            image: user.and_then(|u| u.image.clone()),
        }
    }

    fn newest_first(posts: &mut [PostRow]) {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }

    fn tagged_with(&self, name: &str) -> Vec<(Uuid, Uuid)> {
        let Some(hashtag) = self.hashtags.values().find(|h| h.name == name) else {
            return Vec::new();
        };
        self.post_hashtags
            .iter()
            .filter(|(_, h)| *h == hashtag.id)
            .copied()
            .collect()
    }

    fn recount(&mut self, post_id: Uuid) -> i64 {
        let count = self.likes.iter().filter(|(p, _)| *p == post_id).count() as i64;
        if let Some(post) = self.posts.get_mut(&post_id) {
            post.likes_count = count;
        }
        count
    }

    fn activity(&mut self, activity: CreateActivity) {
        self.activities.push(ActivityRow {
            id: activity.id,
            username: activity.username,
            kind: activity.kind.as_str().to_string(),
            actor_username: activity.actor_username,
            actor_image: activity.actor_image,
            post_id: activity.post_id,
            post_image_id: activity.post_image_id,
            created_at: Utc::now(),
        });
    }
}

/// Shared table handle implementing every repository trait
#[derive(Default, Clone)]
pub struct MemoryRepo {
    tables: Arc<Mutex<Tables>>,
}

/// In-memory [`SocialStore`]
#[derive(Default, Clone)]
pub struct MemoryStore {
    repo: MemoryRepo,
    /// Clock used for new posts; each post advances it one second
    clock: Arc<Mutex<Option<DateTime<Utc>>>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.repo.tables.lock().unwrap()
    }

    /// Insert a verified user with a username
    pub fn add_user(&self, username: &str) -> UserId {
        let id = Uuid::now_v7();
        let row = UserRow {
            id,
            email: format!("{username}@example.com"),
            hashed_password: "x".to_string(),
            username: Some(username.to_string()),
            first_name: None,
            last_name: None,
            description: None,
            location: None,
            gender: "male".to_string(),
            image: Some(format!("/user_images/user_{id}/avatar.png")),
            is_active: true,
            is_verified: true,
            is_superuser: false,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        };
        self.tables().users.insert(id, row);
        UserId(id)
    }

    /// A verified user who never picked a username
    pub fn add_user_without_username(&self, email: &str) -> UserId {
        let id = self.add_user(email);
        if let Some(user) = self.tables().users.get_mut(&id.0) {
            user.email = email.to_string();
            user.username = None;
        }
        id
    }

    pub fn user(&self, id: UserId) -> UserRow {
        self.tables().users.get(&id.0).cloned().unwrap()
    }

    /// Give new posts strictly increasing timestamps starting at `start`
    pub fn start_clock(&self, start: DateTime<Utc>) {
        *self.clock.lock().unwrap() = Some(start);
    }

    fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock().unwrap();
        match clock.as_mut() {
            Some(now) => {
                *now += Duration::seconds(1);
                *now
            }
            None => Utc::now(),
        }
    }
}

impl SocialStore for MemoryStore {
    type Users = MemoryStore;
    type Follows = MemoryRepo;
    type Likes = MemoryRepo;
    type Posts = MemoryStore;
    type Images = MemoryRepo;
    type Activities = MemoryRepo;

    fn users(&self) -> &Self::Users {
        self
    }

    fn follows(&self) -> &Self::Follows {
        &self.repo
    }

    fn likes(&self) -> &Self::Likes {
        &self.repo
    }

    fn posts(&self) -> &Self::Posts {
        self
    }

    fn images(&self) -> &Self::Images {
        &self.repo
    }

    fn activities(&self) -> &Self::Activities {
        &self.repo
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        Ok(self.tables().user_by_username(username).cloned())
    }

    async fn find_all(&self) -> DbResult<Vec<UserRow>> {
        Ok(self.tables().users.values().cloned().collect())
    }

    async fn create_with_verification(
        &self,
        _user: CreateUser,
        _verification: CreateVerificationSession,
    ) -> DbResult<UserRow> {
        unimplemented!("registration is covered by agora-auth-core")
    }

    async fn update_profile(&self, _id: Uuid, _profile: UpdateProfile) -> DbResult<Option<UserRow>> {
        unimplemented!("profile edits are covered by agora-auth-core")
    }

    async fn update_image(&self, id: Uuid, image: &str) -> DbResult<()> {
        if let Some(user) = self.tables().users.get_mut(&id) {
            user.image = Some(image.to_string());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let mut t = self.tables();

        let edges: Vec<(Uuid, Uuid)> = t
            .follows
            .iter()
            .filter(|(follower, following)| *follower == id || *following == id)
            .copied()
            .collect();
        for (follower, following) in edges {
            t.follows.remove(&(follower, following));
            if follower == id {
                if let Some(user) = t.users.get_mut(&following) {
                    user.followers_count = (user.followers_count - 1).max(0);
                }
            } else if let Some(user) = t.users.get_mut(&follower) {
                user.following_count = (user.following_count - 1).max(0);
            }
        }

        let liked: Vec<Uuid> = t
            .likes
            .iter()
            .filter(|(_, user_id)| *user_id == id)
            .map(|(post_id, _)| *post_id)
            .collect();
        t.likes.retain(|(_, user_id)| *user_id != id);
        for post_id in liked {
            t.recount(post_id);
        }

        let owned: Vec<Uuid> = t
            .posts
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            t.posts.remove(&post_id);
            t.likes.retain(|(p, _)| *p != post_id);
            t.post_hashtags.retain(|(p, _)| *p != post_id);
        }
        t.images.retain(|_, image| image.user_id != id);
        t.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for MemoryRepo {
    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> DbResult<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .follows
            .contains(&(follower_id, following_id)))
    }

    async fn follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        activity: CreateActivity,
    ) -> DbResult<bool> {
        let mut t = self.tables.lock().unwrap();
        if !t.follows.insert((follower_id, following_id)) {
            return Ok(false);
        }
        if let Some(u) = t.users.get_mut(&follower_id) {
            u.following_count += 1;
        }
        if let Some(u) = t.users.get_mut(&following_id) {
            u.followers_count += 1;
        }
        t.activity(activity);
        Ok(true)
    }

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> DbResult<bool> {
        let mut t = self.tables.lock().unwrap();
        if !t.follows.remove(&(follower_id, following_id)) {
            return Ok(false);
        }
        if let Some(u) = t.users.get_mut(&follower_id) {
            u.following_count = (u.following_count - 1).max(0);
        }
        if let Some(u) = t.users.get_mut(&following_id) {
            u.followers_count = (u.followers_count - 1).max(0);
        }
        Ok(true)
    }

    async fn followers_of(&self, user_id: Uuid) -> DbResult<Vec<FollowProfileRow>> {
        let t = self.tables.lock().unwrap();
        Ok(t.follows
            .iter()
            .filter(|(_, following)| *following == user_id)
            .map(|(follower, _)| t.summary(*follower))
            .collect())
    }

    async fn following_of(&self, user_id: Uuid) -> DbResult<Vec<FollowProfileRow>> {
        let t = self.tables.lock().unwrap();
        Ok(t.follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, following)| t.summary(*following))
            .collect())
    }
}

#[async_trait]
impl LikeRepository for MemoryRepo {
    async fn like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        activity: CreateActivity,
    ) -> DbResult<Option<i64>> {
        let mut t = self.tables.lock().unwrap();
        if t.likes.contains(&(post_id, user_id)) {
            return Ok(None);
        }
        t.likes.push((post_id, user_id));
        let count = t.recount(post_id);
        t.activity(activity);
        Ok(Some(count))
    }

    async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> DbResult<Option<i64>> {
        let mut t = self.tables.lock().unwrap();
        let before = t.likes.len();
        t.likes.retain(|like| *like != (post_id, user_id));
        if t.likes.len() == before {
            return Ok(None);
        }
        Ok(Some(t.recount(post_id)))
    }

    async fn likers_of(&self, post_ids: &[Uuid]) -> DbResult<Vec<PostLikerRow>> {
        let t = self.tables.lock().unwrap();
        Ok(t.likes
            .iter()
            .filter(|(post_id, _)| post_ids.contains(post_id))
            .map(|(post_id, user_id)| PostLikerRow {
                post_id: *post_id,
                user_id: *user_id,
                username: t.users.get(user_id).and_then(|u| u.username.clone()),
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PostRow>> {
        Ok(self.tables().posts.get(&id).cloned())
    }

    async fn create(&self, post: CreatePost) -> DbResult<(PostRow, Vec<HashtagRow>)> {
        let created_at = self.tick();
        let mut t = self.tables();

        let row = PostRow {
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            image_id: post.image_id,
            likes_count: 0,
            created_at,
        };
        t.posts.insert(row.id, row.clone());

        let mut tags = Vec::new();
        for name in post.hashtags {
            let existing = t.hashtags.values().find(|h| h.name == name).cloned();
            let hashtag = match existing {
                Some(h) => h,
                None => {
                    let h = HashtagRow {
                        id: Uuid::now_v7(),
                        name,
                    };
                    t.hashtags.insert(h.id, h.clone());
                    h
                }
            };
            t.post_hashtags.insert((row.id, hashtag.id));
            tags.push(hashtag);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok((row, tags))
    }

    async fn count(&self, hashtag: Option<&str>) -> DbResult<i64> {
        let t = self.tables();
        Ok(match hashtag {
            Some(name) => t.tagged_with(name).len() as i64,
            None => t.posts.len() as i64,
        })
    }

    async fn feed_page(
        &self,
        offset: i64,
        limit: i64,
        hashtag: Option<&str>,
    ) -> DbResult<Vec<FeedPostRow>> {
        let t = self.tables();

        let links: Vec<(Uuid, Option<Uuid>)> = match hashtag {
            Some(name) => t
                .tagged_with(name)
                .into_iter()
                .map(|(post_id, hashtag_id)| (post_id, Some(hashtag_id)))
                .collect(),
            None => t.posts.keys().map(|id| (*id, None)).collect(),
        };
        let link_of: HashMap<Uuid, Option<Uuid>> = links.into_iter().collect();

        let mut posts: Vec<PostRow> = link_of
            .keys()
            .filter_map(|id| t.posts.get(id).cloned())
            .collect();
        Tables::newest_first(&mut posts);

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| {
                let hashtag_id = link_of.get(&p.id).copied().flatten();
                FeedPostRow {
                    author_name: t.users.get(&p.user_id).map(|u| u.display_name()),
                    link_post_id: hashtag_id.map(|_| p.id),
                    link_hashtag_id: hashtag_id,
                    id: p.id,
                    user_id: p.user_id,
                    title: p.title,
                    content: p.content,
                    image_id: p.image_id,
                    likes_count: p.likes_count,
                    created_at: p.created_at,
                }
            })
            .collect())
    }

    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<PostRow>> {
        let t = self.tables();
        let mut posts: Vec<PostRow> = t
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Tables::newest_first(&mut posts);
        Ok(posts)
    }

    async fn hashtags_of(&self, post_ids: &[Uuid]) -> DbResult<Vec<PostHashtagRow>> {
        let t = self.tables();
        let mut rows: Vec<PostHashtagRow> = t
            .post_hashtags
            .iter()
            .filter(|(post_id, _)| post_ids.contains(post_id))
            .filter_map(|(post_id, hashtag_id)| {
                t.hashtags.get(hashtag_id).map(|h| PostHashtagRow {
                    post_id: *post_id,
                    hashtag_id: h.id,
                    name: h.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_hashtag(&self, name: &str) -> DbResult<Option<HashtagRow>> {
        Ok(self
            .tables()
            .hashtags
            .values()
            .find(|h| h.name == name)
            .cloned())
    }

    async fn find_by_hashtag(&self, hashtag_id: Uuid) -> DbResult<Vec<PostRow>> {
        let t = self.tables();
        let mut posts: Vec<PostRow> = t
            .post_hashtags
            .iter()
            .filter(|(_, h)| *h == hashtag_id)
            .filter_map(|(post_id, _)| t.posts.get(post_id).cloned())
            .collect();
        Tables::newest_first(&mut posts);
        Ok(posts)
    }
}

#[async_trait]
impl ImageRepository for MemoryRepo {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PostImageRow>> {
        Ok(self.tables.lock().unwrap().images.get(&id).cloned())
    }

    async fn create(&self, image: CreateImage) -> DbResult<PostImageRow> {
        let row = PostImageRow {
            id: image.id,
            user_id: image.user_id,
            image: Some(image.image),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .images
            .insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ActivityRepository for MemoryRepo {
    async fn find_by_username(
        &self,
        username: &str,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<ActivityRow>> {
        let t = self.tables.lock().unwrap();
        Ok(t.activities
            .iter()
            .rev()
            .filter(|a| a.username == username)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Blob store that keeps files in memory
#[derive(Default, Clone)]
pub struct MemoryBlobStore {
    pub files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, folder_key: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let mut files = self.files.lock().unwrap();
        let path = format!("/{folder_key}/{}.bin", files.len());
        files.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }
}
