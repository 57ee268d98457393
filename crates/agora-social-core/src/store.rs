//! Repository bundle used by the social services

use agora_db::{
    ActivityRepository, FollowRepository, ImageRepository, LikeRepository, PgActivityRepository,
    PgFollowRepository, PgImageRepository, PgLikeRepository, PgPostRepository, PgUserRepository,
    PostRepository, Repositories, UserRepository,
};

/// The repositories the social services need
pub trait SocialStore: Send + Sync + 'static {
    type Users: UserRepository;
    type Follows: FollowRepository;
    type Likes: LikeRepository;
    type Posts: PostRepository;
    type Images: ImageRepository;
    type Activities: ActivityRepository;

    fn users(&self) -> &Self::Users;
    fn follows(&self) -> &Self::Follows;
    fn likes(&self) -> &Self::Likes;
    fn posts(&self) -> &Self::Posts;
    fn images(&self) -> &Self::Images;
    fn activities(&self) -> &Self::Activities;
}

impl SocialStore for Repositories {
    type Users = PgUserRepository;
    type Follows = PgFollowRepository;
    type Likes = PgLikeRepository;
    type Posts = PgPostRepository;
    type Images = PgImageRepository;
    type Activities = PgActivityRepository;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn follows(&self) -> &Self::Follows {
        &self.follows
    }

    fn likes(&self) -> &Self::Likes {
        &self.likes
    }

    fn posts(&self) -> &Self::Posts {
        &self.posts
    }

    fn images(&self) -> &Self::Images {
        &self.images
    }

    fn activities(&self) -> &Self::Activities {
        &self.activities
    }
}
