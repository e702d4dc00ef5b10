//! Handler-level API tests over in-memory repositories.
//!
//! The repository traits are implemented on a shared in-memory store so the
//! full router (middleware, extractors, services and wire shapes) runs
//! without a database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use foglio::application::blogs::BlogService;
use foglio::application::pagination::PageParams;
use foglio::application::repos::{
    AuthorRef, BlogAggregate, BlogListRecord, BlogQueryFilter, BlogSort, BlogsRepo,
    BlogsWriteRepo, CommentThread, CreateBlogParams, CreateSessionParams, CreateUserParams,
    EngagementRepo, LikeOutcome, RepoError, ReplyThread, SessionsRepo, UpdateBlogFields,
    UsersRepo,
};
use foglio::application::sessions::{AdminDirectory, SessionService};
use foglio::application::users::UserService;
use foglio::domain::entities::{
    BlogRecord, CommentRecord, ReplyRecord, SessionRecord, UserRecord,
};
use foglio::infra::http::{self, AppState};
use foglio_api_types::BlogStatus;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
struct MemoryRepos {
    users: Mutex<Vec<UserRecord>>,
    sessions: Mutex<Vec<SessionRecord>>,
    blogs: Mutex<Vec<BlogRecord>>,
    blog_likes: Mutex<Vec<(Uuid, Uuid)>>,
    comments: Mutex<Vec<CommentRecord>>,
    comment_likes: Mutex<Vec<(Uuid, Uuid)>>,
    replies: Mutex<Vec<ReplyRecord>>,
    clock: Mutex<i64>,
}

impl MemoryRepos {
    /// Strictly increasing timestamps so ordering assertions are stable.
    async fn next_timestamp(&self) -> OffsetDateTime {
        let mut tick = self.clock.lock().await;
        *tick += 1;
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(1_700_000_000 + *tick)
    }

    async fn like_count(&self, blog_id: Uuid) -> i64 {
        self.blog_likes
            .lock()
            .await
            .iter()
            .filter(|(blog, _)| *blog == blog_id)
            .count() as i64
    }

    async fn comment_count(&self, blog_id: Uuid) -> i64 {
        self.comments
            .lock()
            .await
            .iter()
            .filter(|comment| comment.blog_id == blog_id)
            .count() as i64
    }

    async fn author_ref(&self, author_id: Uuid) -> Option<AuthorRef> {
        self.users
            .lock()
            .await
            .iter()
            .find(|user| user.id == author_id)
            .map(|user| AuthorRef {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                avatar: user.avatar.clone(),
            })
    }

    async fn list_record(&self, blog: &BlogRecord) -> BlogListRecord {
        BlogListRecord {
            id: blog.id,
            slug: blog.slug.clone(),
            title: blog.title.clone(),
            author: self.author_ref(blog.author_id).await,
            categories: blog.categories.clone(),
            tags: blog.tags.clone(),
            featured_image: blog.featured_image.clone(),
            status: blog.status,
            views: blog.views,
            like_count: self.like_count(blog.id).await,
            comment_count: self.comment_count(blog.id).await,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }

    async fn aggregate(&self, blog: BlogRecord) -> BlogAggregate {
        let author = self.author_ref(blog.author_id).await;
        let likes: Vec<Uuid> = self
            .blog_likes
            .lock()
            .await
            .iter()
            .filter(|(blog_id, _)| *blog_id == blog.id)
            .map(|(_, user)| *user)
            .collect();

        let comment_likes = self.comment_likes.lock().await.clone();
        let replies = self.replies.lock().await.clone();
        let comments = self
            .comments
            .lock()
            .await
            .iter()
            .filter(|comment| comment.blog_id == blog.id)
            .map(|comment| CommentThread {
                comment: comment.clone(),
                like_count: comment_likes
                    .iter()
                    .filter(|(comment_id, _)| *comment_id == comment.id)
                    .count() as i64,
                replies: replies
                    .iter()
                    .filter(|reply| reply.comment_id == comment.id)
                    .map(|reply| ReplyThread {
                        reply: reply.clone(),
                        like_count: 0,
                    })
                    .collect(),
            })
            .collect();

        BlogAggregate {
            blog,
            author,
            likes,
            comments,
        }
    }

    fn matches(blog: &BlogRecord, filter: &BlogQueryFilter) -> bool {
        if let Some(category) = filter.category.as_ref()
            && !blog.categories.contains(category)
        {
            return false;
        }
        if let Some(tag) = filter.tag.as_ref()
            && !blog.tags.contains(tag)
        {
            return false;
        }
        if let Some(search) = filter.search.as_ref()
            && !blog
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl UsersRepo for MemoryRepos {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let now = self.next_timestamp().await;
        let mut users = self.users.lock().await;
        if users.iter().any(|user| user.email == params.email) {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            password_hash: params.password_hash,
            bio: String::new(),
            avatar: None,
            role: Default::default(),
            interested_topics: params.interested_topics,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: String,
        bio: String,
    ) -> Result<UserRecord, RepoError> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(RepoError::NotFound)?;
        user.name = name;
        user.bio = bio;
        Ok(user.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let mut users = self.users.lock().await.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[async_trait]
impl SessionsRepo for MemoryRepos {
    async fn insert_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<SessionRecord, RepoError> {
        let session = SessionRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            prefix: params.prefix,
            token_hash: params.token_hash,
            expires_at: params.expires_at,
            created_at: self.next_timestamp().await,
        };
        self.sessions.lock().await.push(session.clone());
        Ok(session)
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self
            .sessions
            .lock()
            .await
            .iter()
            .find(|session| session.prefix == prefix)
            .cloned())
    }
}

#[async_trait]
impl BlogsRepo for MemoryRepos {
    async fn list_public(
        &self,
        filter: &BlogQueryFilter,
        sort: BlogSort,
        page: PageParams,
    ) -> Result<(Vec<BlogListRecord>, u64), RepoError> {
        let blogs: Vec<BlogRecord> = self
            .blogs
            .lock()
            .await
            .iter()
            .filter(|blog| blog.status == BlogStatus::Published)
            .filter(|blog| Self::matches(blog, filter))
            .cloned()
            .collect();

        let mut records = Vec::with_capacity(blogs.len());
        for blog in &blogs {
            records.push(self.list_record(blog).await);
        }

        match sort {
            BlogSort::Trending => records.sort_by(|a, b| b.views.cmp(&a.views)),
            BlogSort::Latest => records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            BlogSort::Recent => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            BlogSort::MostLiked => records.sort_by(|a, b| b.like_count.cmp(&a.like_count)),
        }

        let total = records.len() as u64;
        let items = records
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BlogListRecord>, RepoError> {
        let mut blogs: Vec<BlogRecord> = self
            .blogs
            .lock()
            .await
            .iter()
            .filter(|blog| blog.author_id == author_id)
            .cloned()
            .collect();
        blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut records = Vec::with_capacity(blogs.len());
        for blog in &blogs {
            records.push(self.list_record(blog).await);
        }
        Ok(records)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>, RepoError> {
        Ok(self
            .blogs
            .lock()
            .await
            .iter()
            .find(|blog| blog.id == id)
            .cloned())
    }

    async fn find_aggregate_by_id(&self, id: Uuid) -> Result<Option<BlogAggregate>, RepoError> {
        let blog = BlogsRepo::find_by_id(self, id).await?;
        match blog {
            Some(blog) => Ok(Some(self.aggregate(blog).await)),
            None => Ok(None),
        }
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        Ok(self
            .blogs
            .lock()
            .await
            .iter()
            .any(|blog| blog.slug == slug && Some(blog.id) != exclude))
    }

    async fn view_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogAggregate>, RepoError> {
        let blog = {
            let mut blogs = self.blogs.lock().await;
            match blogs
                .iter_mut()
                .find(|blog| blog.slug == slug && blog.status == BlogStatus::Published)
            {
                Some(blog) => {
                    blog.views += 1;
                    blog.clone()
                }
                None => return Ok(None),
            }
        };
        Ok(Some(self.aggregate(blog).await))
    }
}

#[async_trait]
impl BlogsWriteRepo for MemoryRepos {
    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, RepoError> {
        let now = self.next_timestamp().await;
        let blog = BlogRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            author_id: params.author_id,
            content: params.content,
            categories: params.categories,
            tags: params.tags,
            featured_image: params.featured_image,
            status: params.status,
            views: 0,
            seo: params.seo,
            created_at: now,
            updated_at: now,
        };
        self.blogs.lock().await.push(blog.clone());
        Ok(blog)
    }

    async fn update_blog(
        &self,
        id: Uuid,
        fields: UpdateBlogFields,
    ) -> Result<BlogRecord, RepoError> {
        let now = self.next_timestamp().await;
        let mut blogs = self.blogs.lock().await;
        let blog = blogs
            .iter_mut()
            .find(|blog| blog.id == id)
            .ok_or(RepoError::NotFound)?;

        if let Some(slug) = fields.slug {
            blog.slug = slug;
        }
        if let Some(title) = fields.title {
            blog.title = title;
        }
        if let Some(content) = fields.content {
            blog.content = content;
        }
        if let Some(categories) = fields.categories {
            blog.categories = categories;
        }
        if let Some(tags) = fields.tags {
            blog.tags = tags;
        }
        if let Some(featured_image) = fields.featured_image {
            blog.featured_image = Some(featured_image);
        }
        if let Some(status) = fields.status {
            blog.status = status;
        }
        if let Some(seo) = fields.seo {
            blog.seo = seo;
        }
        blog.updated_at = now;
        Ok(blog.clone())
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), RepoError> {
        let mut blogs = self.blogs.lock().await;
        let before = blogs.len();
        blogs.retain(|blog| blog.id != id);
        if blogs.len() == before {
            return Err(RepoError::NotFound);
        }
        drop(blogs);

        let comment_ids: Vec<Uuid> = self
            .comments
            .lock()
            .await
            .iter()
            .filter(|comment| comment.blog_id == id)
            .map(|comment| comment.id)
            .collect();
        self.comments
            .lock()
            .await
            .retain(|comment| comment.blog_id != id);
        self.replies
            .lock()
            .await
            .retain(|reply| !comment_ids.contains(&reply.comment_id));
        self.comment_likes
            .lock()
            .await
            .retain(|(comment_id, _)| !comment_ids.contains(comment_id));
        self.blog_likes
            .lock()
            .await
            .retain(|(blog_id, _)| *blog_id != id);
        Ok(())
    }
}

#[async_trait]
impl EngagementRepo for MemoryRepos {
    async fn toggle_blog_like(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        if BlogsRepo::find_by_id(self, blog_id).await?.is_none() {
            return Err(RepoError::NotFound);
        }
        let mut likes = self.blog_likes.lock().await;
        let liked = if likes.contains(&(blog_id, user_id)) {
            likes.retain(|entry| entry != &(blog_id, user_id));
            false
        } else {
            likes.push((blog_id, user_id));
            true
        };
        let likes_count = likes.iter().filter(|(blog, _)| *blog == blog_id).count() as i64;
        Ok(LikeOutcome { liked, likes_count })
    }

    async fn add_comment(
        &self,
        blog_id: Uuid,
        user_id: Option<Uuid>,
        content: String,
    ) -> Result<CommentRecord, RepoError> {
        if BlogsRepo::find_by_id(self, blog_id).await?.is_none() {
            return Err(RepoError::NotFound);
        }
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            blog_id,
            user_id,
            content,
            created_at: self.next_timestamp().await,
        };
        self.comments.lock().await.push(comment.clone());
        Ok(comment)
    }

    async fn toggle_comment_like(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        let belongs = self
            .comments
            .lock()
            .await
            .iter()
            .any(|comment| comment.id == comment_id && comment.blog_id == blog_id);
        if !belongs {
            return Err(RepoError::NotFound);
        }

        let mut likes = self.comment_likes.lock().await;
        let liked = if likes.contains(&(comment_id, user_id)) {
            likes.retain(|entry| entry != &(comment_id, user_id));
            false
        } else {
            likes.push((comment_id, user_id));
            true
        };
        let likes_count = likes
            .iter()
            .filter(|(comment, _)| *comment == comment_id)
            .count() as i64;
        Ok(LikeOutcome { liked, likes_count })
    }

    async fn add_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        user_id: Option<Uuid>,
        content: String,
    ) -> Result<ReplyRecord, RepoError> {
        let belongs = self
            .comments
            .lock()
            .await
            .iter()
            .any(|comment| comment.id == comment_id && comment.blog_id == blog_id);
        if !belongs {
            return Err(RepoError::NotFound);
        }
        let reply = ReplyRecord {
            id: Uuid::new_v4(),
            comment_id,
            user_id,
            content,
            created_at: self.next_timestamp().await,
        };
        self.replies.lock().await.push(reply.clone());
        Ok(reply)
    }
}

fn build_router(admin_emails: &[&str]) -> Router {
    let repos = Arc::new(MemoryRepos::default());
    let state = AppState {
        blogs: Arc::new(BlogService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
        )),
        users: Arc::new(UserService::new(repos.clone())),
        sessions: Arc::new(SessionService::new(repos.clone(), repos.clone(), None)),
        admins: Arc::new(AdminDirectory::new(admin_emails.iter().copied())),
    };
    http::build_router(state)
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn register(router: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        router,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "password": "secret123",
                "interestedTopics": ["rust"],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().expect("token").to_string()
}

async fn create_blog(router: &Router, token: &str, title: &str, body: Value) -> Value {
    let (status, body) = send(
        router,
        request(
            Method::POST,
            "/api/blogs/create-new-blogs",
            Some(token),
            Some(json!({
                "title": title,
                "content": body,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn registration_and_login_round_trip() {
    let router = build_router(&[]);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret123",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["token"].as_str().unwrap().starts_with("fg_"));
    assert!(body["user"].get("passwordHash").is_none());

    // Same email again is a conflict.
    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Imposter",
                "email": "ada@example.com",
                "password": "secret123",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");

    let (status, _) = send(
        &router,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "secret123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/auth/me", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");
}

#[tokio::test]
async fn registration_validates_fields() {
    let router = build_router(&[]);
    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": "", "email": "nope", "password": "123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 3);
}

#[tokio::test]
async fn create_requires_auth_title_and_content() {
    let router = build_router(&[]);

    let (status, _) = send(
        &router,
        request(
            Method::POST,
            "/api/blogs/create-new-blogs",
            None,
            Some(json!({"title": "x"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register(&router, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/blogs/create-new-blogs",
            Some(&token),
            Some(json!({"content": [{"type": "paragraph", "value": "Hi"}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/blogs/create-new-blogs",
            Some(&token),
            Some(json!({"title": "No content"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Content must be a non-empty array");

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/blogs/create-new-blogs",
            Some(&token),
            Some(json!({"title": "Bad content", "content": "{not json"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Content must be valid JSON array");
}

#[tokio::test]
async fn create_normalizes_content_and_derives_slug() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    let body = create_blog(
        &router,
        &token,
        "Hello World",
        json!([
            {"type": "quote", "value": "closing thought", "position": 9},
            {"type": "paragraph", "value": "Hi"},
            {"type": "image", "value": "/uploads/a.png", "position": 4},
            {"type": "paragraph", "value": "   "}
        ]),
    )
    .await;

    assert_eq!(body["slug"], "hello-world");
    assert_eq!(body["status"], "draft");
    assert_eq!(body["views"], 0);

    // Blank paragraph dropped; remaining blocks ordered by position and
    // renumbered contiguously.
    let content = body["content"].as_array().expect("content");
    assert_eq!(content.len(), 3);
    assert_eq!(content[0]["type"], "paragraph");
    assert_eq!(content[1]["type"], "image");
    assert_eq!(content[2]["type"], "quote");
    assert_eq!(content[0]["position"], 0);
    assert_eq!(content[1]["position"], 1);
    assert_eq!(content[2]["position"], 2);

    // A second blog with the same title gets a suffixed slug.
    let body = create_blog(
        &router,
        &token,
        "Hello World",
        json!([{"type": "paragraph", "value": "again"}]),
    )
    .await;
    assert_eq!(body["slug"], "hello-world-2");
}

#[tokio::test]
async fn drafts_are_invisible_until_published_and_views_count_reads() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    let blog = create_blog(
        &router,
        &token,
        "Hello World",
        json!([{"type": "paragraph", "value": "Hi"}]),
    )
    .await;
    let id = blog["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        request(Method::GET, "/api/blogs/hello-world", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        request(
            Method::PATCH,
            &format!("/api/blogs/{id}"),
            Some(&token),
            Some(json!({"status": "published"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/blogs/hello-world", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"], 1);
    assert_eq!(body["author"]["name"], "Ada");

    let (_, body) = send(
        &router,
        request(Method::GET, "/api/blogs/hello-world", None, None),
    )
    .await;
    assert_eq!(body["views"], 2);
}

#[tokio::test]
async fn update_and_delete_enforce_ownership() {
    let router = build_router(&[]);
    let owner = register(&router, "Ada", "ada@example.com").await;
    let intruder = register(&router, "Eve", "eve@example.com").await;

    let blog = create_blog(
        &router,
        &owner,
        "Ownership",
        json!([{"type": "paragraph", "value": "mine"}]),
    )
    .await;
    let id = blog["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        request(
            Method::PATCH,
            &format!("/api/blogs/{id}"),
            Some(&intruder),
            Some(json!({"title": "Stolen"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    let (status, _) = send(
        &router,
        request(
            Method::DELETE,
            &format!("/api/blogs/{id}"),
            Some(&intruder),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &router,
        request(
            Method::DELETE,
            &format!("/api/blogs/{id}"),
            Some(&owner),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Blog deleted successfully");

    let (status, _) = send(
        &router,
        request(
            Method::GET,
            &format!("/api/blogs/user-blogs/{id}"),
            Some(&owner),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn title_change_regenerates_slug() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    let blog = create_blog(
        &router,
        &token,
        "First Title",
        json!([{"type": "paragraph", "value": "x"}]),
    )
    .await;
    let id = blog["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        request(
            Method::PATCH,
            &format!("/api/blogs/{id}"),
            Some(&token),
            Some(json!({"title": "Second Title"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "second-title");

    // Updating without touching the title keeps the slug.
    let (status, body) = send(
        &router,
        request(
            Method::PATCH,
            &format!("/api/blogs/{id}"),
            Some(&token),
            Some(json!({"tags": ["rust"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "second-title");
    assert_eq!(body["tags"][0], "rust");
}

#[tokio::test]
async fn like_toggle_alternates_membership() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    let blog = create_blog(
        &router,
        &token,
        "Likeable",
        json!([{"type": "paragraph", "value": "x"}]),
    )
    .await;
    let id = blog["id"].as_str().unwrap().to_string();
    let uri = format!("/api/blogs/{id}/like");

    let (status, body) = send(&router, request(Method::POST, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likesCount"], 1);
    assert_eq!(body["liked"], true);

    let (_, body) = send(&router, request(Method::POST, &uri, Some(&token), None)).await;
    assert_eq!(body["likesCount"], 0);
    assert_eq!(body["liked"], false);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{}/like", Uuid::new_v4()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found");
}

#[tokio::test]
async fn comments_and_replies_append_with_validation() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    let blog = create_blog(
        &router,
        &token,
        "Discussion",
        json!([{"type": "paragraph", "value": "x"}]),
    )
    .await;
    let id = blog["id"].as_str().unwrap().to_string();

    // Whitespace-only content is rejected and nothing is appended.
    let (status, body) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{id}/comments"),
            Some(&token),
            Some(json!({"content": "   "})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["errors"].as_array().unwrap().is_empty());

    let (status, comment) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{id}/comments"),
            Some(&token),
            Some(json!({"content": "First!"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], "First!");
    assert!(comment["createdAt"].is_string() || comment["createdAt"].is_array());
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{id}/comments/{comment_id}/like"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likesCount"], 1);
    assert_eq!(body["liked"], true);

    let (status, reply) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{id}/comments/{comment_id}/replies"),
            Some(&token),
            Some(json!({"content": "Welcome"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["content"], "Welcome");

    // Replying to a comment that is not on this blog is a 404.
    let (status, body) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{id}/comments/{}/replies", Uuid::new_v4()),
            Some(&token),
            Some(json!({"content": "lost"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found");

    // The public aggregate carries the whole thread.
    let (status, _) = send(
        &router,
        request(
            Method::PATCH,
            &format!("/api/blogs/{id}"),
            Some(&token),
            Some(json!({"status": "published"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &router,
        request(Method::GET, "/api/blogs/discussion", None, None),
    )
    .await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["likesCount"], 1);
    assert_eq!(comments[0]["replies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_meta_and_engagement_counts() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    for index in 0..3 {
        let blog = create_blog(
            &router,
            &token,
            &format!("Post {index}"),
            json!([{"type": "paragraph", "value": "x"}]),
        )
        .await;
        let id = blog["id"].as_str().unwrap().to_string();
        let (status, _) = send(
            &router,
            request(
                Method::PATCH,
                &format!("/api/blogs/{id}"),
                Some(&token),
                Some(json!({"status": "published"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        if index == 0 {
            send(
                &router,
                request(
                    Method::POST,
                    &format!("/api/blogs/{id}/like"),
                    Some(&token),
                    None,
                ),
            )
            .await;
            send(
                &router,
                request(
                    Method::POST,
                    &format!("/api/blogs/{id}/comments"),
                    Some(&token),
                    Some(json!({"content": "nice"})),
                ),
            )
            .await;
        }
    }

    // A draft must not appear in public listings.
    create_blog(
        &router,
        &token,
        "Hidden Draft",
        json!([{"type": "paragraph", "value": "x"}]),
    )
    .await;

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/blogs/all?page=1&limit=2", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first.
    assert_eq!(items[0]["title"], "Post 2");

    let liked: Vec<&Value> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["title"] == "Post 0")
        .collect();
    // Post 0 is on page 2.
    assert!(liked.is_empty());

    let (_, body) = send(
        &router,
        request(Method::GET, "/api/blogs/all?page=2&limit=2", None, None),
    )
    .await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Post 0");
    assert_eq!(items[0]["totalLikes"], 1);
    assert_eq!(items[0]["totalComments"], 1);
}

#[tokio::test]
async fn filtered_listing_supports_filters_and_sorts() {
    let router = build_router(&[]);
    let ada = register(&router, "Ada", "ada@example.com").await;
    let bob = register(&router, "Bob", "bob@example.com").await;

    let mut ids = Vec::new();
    for (title, category) in [("Rust Tips", "tech"), ("Garden Notes", "life")] {
        let blog = send(
            &router,
            request(
                Method::POST,
                "/api/blogs/create-new-blogs",
                Some(&ada),
                Some(json!({
                    "title": title,
                    "content": [{"type": "paragraph", "value": "x"}],
                    "categories": [category],
                    "tags": ["daily"],
                    "status": "published",
                })),
            ),
        )
        .await
        .1;
        ids.push(blog["id"].as_str().unwrap().to_string());
    }

    // Both readers like the second blog, one likes the first.
    for token in [&ada, &bob] {
        send(
            &router,
            request(
                Method::POST,
                &format!("/api/blogs/{}/like", ids[1]),
                Some(token),
                None,
            ),
        )
        .await;
    }
    send(
        &router,
        request(
            Method::POST,
            &format!("/api/blogs/{}/like", ids[0]),
            Some(&ada),
            None,
        ),
    )
    .await;

    let (status, body) = send(
        &router,
        request(
            Method::GET,
            "/api/public-blogs?category=tech",
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "Rust Tips");

    let (_, body) = send(
        &router,
        request(Method::GET, "/api/public-blogs?search=garden", None, None),
    )
    .await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "Garden Notes");

    let (_, body) = send(
        &router,
        request(
            Method::GET,
            "/api/public-blogs?sortBy=mostLiked",
            None,
            None,
        ),
    )
    .await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data[0]["title"], "Garden Notes");
    assert_eq!(data[0]["totalLikes"], 2);
    assert_eq!(data[1]["totalLikes"], 1);

    let (_, body) = send(
        &router,
        request(Method::GET, "/api/public-blogs?tag=missing-tag", None, None),
    )
    .await;
    assert_eq!(body["meta"]["total"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn user_blogs_include_drafts_and_enforce_scope() {
    let router = build_router(&[]);
    let ada = register(&router, "Ada", "ada@example.com").await;
    let bob = register(&router, "Bob", "bob@example.com").await;

    let blog = create_blog(
        &router,
        &ada,
        "Private Draft",
        json!([{"type": "paragraph", "value": "x"}]),
    )
    .await;
    let id = blog["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/blogs/user-blogs", Some(&ada), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "draft");

    let (status, body) = send(
        &router,
        request(
            Method::GET,
            &format!("/api/blogs/user-blogs/{id}"),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found or access denied");

    let (status, body) = send(
        &router,
        request(
            Method::GET,
            &format!("/api/blogs/user-blogs/{id}"),
            Some(&ada),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Private Draft");
}

#[tokio::test]
async fn admin_listing_requires_allow_listed_email() {
    let router = build_router(&["root@example.com"]);
    let user = register(&router, "Ada", "ada@example.com").await;
    let admin = register(&router, "Root", "root@example.com").await;

    let (status, _) = send(
        &router,
        request(Method::GET, "/api/admin/users", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/admin/users", Some(&user), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden: Admins only");

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/admin/users", Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn profile_update_round_trips() {
    let router = build_router(&[]);
    let token = register(&router, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &router,
        request(
            Method::PUT,
            "/api/auth/update-profile",
            Some(&token),
            Some(json!({"name": "Ada L.", "bio": "Analyst"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["name"], "Ada L.");

    let (_, body) = send(
        &router,
        request(Method::GET, "/api/auth/me", Some(&token), None),
    )
    .await;
    assert_eq!(body["name"], "Ada L.");
    assert_eq!(body["bio"], "Analyst");

    let (status, _) = send(
        &router,
        request(
            Method::PUT,
            "/api/auth/update-profile",
            Some(&token),
            Some(json!({"bio": "nameless"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_tokens_are_rejected() {
    let router = build_router(&[]);
    register(&router, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &router,
        request(
            Method::GET,
            "/api/blogs/user-blogs",
            Some("fg_bogus_0123456789abcdef0123456789abcdef"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/blogs/user-blogs", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}
